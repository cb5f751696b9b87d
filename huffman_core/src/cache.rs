//! A small write-through cache used while serializing the container
//! header, modeled as an owned builder rather than the reference
//! implementation's out-parameter over an externally-owned growable
//! buffer: writes accumulate in a fixed-size cache and spill into the
//! growable output only once the cache fills, and `finish` hands back the
//! owned bytes.

const CACHE_SIZE: usize = 1024;

pub(crate) struct ByteCache {
    cache: Vec<u8>,
    out: Vec<u8>,
}

impl ByteCache {
    pub fn new() -> Self {
        Self {
            cache: Vec::with_capacity(CACHE_SIZE),
            out: Vec::new(),
        }
    }

    pub fn write(&mut self, bytes: &[u8]) {
        if bytes.len() > CACHE_SIZE - self.cache.len() {
            self.flush();
            if bytes.len() >= CACHE_SIZE {
                self.out.extend_from_slice(bytes);
                return;
            }
        }
        self.cache.extend_from_slice(bytes);
    }

    fn flush(&mut self) {
        if !self.cache.is_empty() {
            self.out.append(&mut self.cache);
        }
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.flush();
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_small_writes() {
        let mut cache = ByteCache::new();
        cache.write(&[1, 2, 3]);
        cache.write(&[4, 5]);
        assert_eq!(cache.finish(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn spills_large_writes() {
        let mut cache = ByteCache::new();
        cache.write(&[0xaa; 2048]);
        cache.write(&[1, 2, 3]);
        let out = cache.finish();
        assert_eq!(out.len(), 2051);
        assert_eq!(&out[2048..], &[1, 2, 3]);
    }
}
