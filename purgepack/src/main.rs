use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::{arg, crate_version, Command};
use log::{error, info};

use distributed_backend::DistributedCoordinator;
use huffman_core::{decode, encode, EncodeOptions};
use shared_files::HuffmanError;
use threadpool_backend::ThreadpoolCoordinator;
use workshare_backend::WorkshareCoordinator;

const RCH: &str = "unreachable was reached";

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn main() -> ExitCode {
    env_logger::init();

    let long_help =
"Examples:
---------
Compress:    `purgepack -c -i input.bin -o output.ppk`
Decompress:  `purgepack -d -i output.ppk -o restored.bin`";

    let cmd = Command::new("purgepack")
        .about("Parallel Huffman compressor")
        .after_long_help(long_help)
        .version(crate_version!())
        .arg(arg!(-i --input <PATH> "input path, defaults to standard input"))
        .arg(arg!(-o --output <PATH> "output path, defaults to standard output"))
        .arg(arg!(-c --compress "compress (default)"))
        .arg(arg!(-d --decompress "decompress"))
        .arg(arg!(-m --memory "operate in-memory (always on, kept for interface completeness)"))
        .arg(
            arg!(-w --workers <N> "worker count, defaults to available parallelism")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(-b --backend <NAME> "backend")
                .value_parser(["workshare", "threadpool", "distributed"])
                .default_value("workshare"),
        )
        .arg(arg!(-s --stats "print compression statistics to stderr"))
        .mut_arg("version", |version| version.short('v'));

    let matches = cmd.get_matches();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("purgepack: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(matches: &clap::ArgMatches) -> Result<(), HuffmanError> {
    let decompress = matches.get_flag("decompress");
    let compress = matches.get_flag("compress");
    if decompress && compress {
        return Err(HuffmanError::BadArgs(
            "-c and -d are mutually exclusive".to_string(),
        ));
    }

    let worker_count = matches
        .get_one::<usize>("workers")
        .copied()
        .unwrap_or_else(default_worker_count);
    if worker_count == 0 {
        return Err(HuffmanError::BadArgs("worker count must be at least 1".to_string()));
    }
    let backend = matches.get_one::<String>("backend").expect(RCH).as_str();
    let collect_stats = matches.get_flag("stats");

    let input = read_input(matches.get_one::<String>("input"))?;

    info!(
        "backend={backend} workers={worker_count} operation={}",
        if decompress { "decompress" } else { "compress" }
    );

    let (output, stats) = if decompress {
        let outcome = decode(&input, collect_stats)?;
        (outcome.data, outcome.stats)
    } else {
        let options = EncodeOptions {
            worker_count,
            collect_stats,
        };
        let outcome = match backend {
            "workshare" => encode(&input, &WorkshareCoordinator::new(worker_count), &options)?,
            "threadpool" => encode(&input, &ThreadpoolCoordinator::new(worker_count), &options)?,
            "distributed" => encode(&input, &DistributedCoordinator::new(worker_count), &options)?,
            other => {
                return Err(HuffmanError::BadArgs(format!("unknown backend {other}")));
            }
        };
        (outcome.container, outcome.stats)
    };

    write_output(matches.get_one::<String>("output"), &output)?;

    if let Some(stats) = stats {
        eprintln!("{stats}");
    }

    Ok(())
}

fn read_input(path: Option<&String>) -> Result<Vec<u8>, HuffmanError> {
    match path {
        Some(path) => fs::read(path).map_err(HuffmanError::IoFailure),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(HuffmanError::IoFailure)?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&String>, data: &[u8]) -> Result<(), HuffmanError> {
    match path {
        Some(path) => fs::write(path, data).map_err(HuffmanError::IoFailure),
        None => io::stdout().write_all(data).map_err(HuffmanError::IoFailure),
    }
}
