use assert_cmd::prelude::*;
use std::io::Write;
use std::process::Command;

type StdResult = Result<(), Box<dyn std::error::Error>>;

fn round_trip(backend: &str, workers: &str) -> StdResult {
    let mut source = tempfile::NamedTempFile::new()?;
    write!(
        source,
        "the quick brown fox jumps over the lazy dog, {backend} {workers}"
    )?;
    let original = std::fs::read(source.path())?;

    let temp_dir = tempfile::tempdir()?;
    let packed_path = temp_dir.path().join("packed.ppk");
    let restored_path = temp_dir.path().join("restored.bin");

    Command::cargo_bin("purgepack")?
        .arg("-c")
        .arg("-i")
        .arg(source.path())
        .arg("-o")
        .arg(&packed_path)
        .arg("-b")
        .arg(backend)
        .arg("-w")
        .arg(workers)
        .assert()
        .success();

    Command::cargo_bin("purgepack")?
        .arg("-d")
        .arg("-i")
        .arg(&packed_path)
        .arg("-o")
        .arg(&restored_path)
        .assert()
        .success();

    let restored = std::fs::read(&restored_path)?;
    assert_eq!(original, restored);
    Ok(())
}

#[test]
fn round_trips_through_workshare_backend() -> StdResult {
    round_trip("workshare", "4")
}

#[test]
fn round_trips_through_threadpool_backend() -> StdResult {
    round_trip("threadpool", "4")
}

#[test]
fn round_trips_through_distributed_backend() -> StdResult {
    round_trip("distributed", "4")
}

#[test]
fn single_worker_round_trips() -> StdResult {
    round_trip("workshare", "1")
}

#[test]
fn rejects_both_compress_and_decompress() -> StdResult {
    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("irrelevant.bin");
    std::fs::write(&path, b"data")?;
    Command::cargo_bin("purgepack")?
        .arg("-c")
        .arg("-d")
        .arg("-i")
        .arg(&path)
        .assert()
        .failure();
    Ok(())
}
