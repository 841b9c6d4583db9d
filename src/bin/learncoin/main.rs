// LearnCoin Arena Runner
// Drives one seeded economy and prints a JSON report of where the coins went.
//
// Usage:
//   cargo run --release --bin learncoin                          # 100 blocks, default config
//   cargo run --release --bin learncoin -- --ticks 500 --seed 7
//   cargo run --release --bin learncoin -- --config arena.json
//   cargo run --release --bin learncoin -- --snapshots out.jsonl # one JSON line per snapshot
//   cargo run --release --bin learncoin -- --realtime --ticks 0  # real interval clock, forever
//
// Logging goes through env_logger; set RUST_LOG=debug for full snapshots.

mod report;

use learncoin_arena::clock::Clock;
use learncoin_arena::snapshot::{JsonLinesSink, LogSink};
use learncoin_arena::{SimConfig, Simulation};
use std::path::PathBuf;
use std::time::Instant;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    ticks: u64,
    seed: Option<u64>,
    config: Option<PathBuf>,
    snapshots: Option<PathBuf>,
    realtime: bool,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        ticks: 100,
        seed: None,
        config: None,
        snapshots: None,
        realtime: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--ticks" => {
                i += 1;
                if i < args.len() {
                    cli.ticks = args[i].parse().unwrap_or(100);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().ok();
                }
            }
            "--config" => {
                i += 1;
                if i < args.len() {
                    cli.config = Some(PathBuf::from(&args[i]));
                }
            }
            "--snapshots" => {
                i += 1;
                if i < args.len() {
                    cli.snapshots = Some(PathBuf::from(&args[i]));
                }
            }
            "--realtime" => {
                cli.realtime = true;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = parse_args();

    let mut config = match &cli.config {
        Some(path) => match SimConfig::from_json_file(path) {
            Ok(c) => c,
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => SimConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let mut sim = match Simulation::with_config(config.clone()) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    sim.add_sink(LogSink);
    if let Some(path) = &cli.snapshots {
        match std::fs::File::create(path) {
            Ok(file) => sim.add_sink(JsonLinesSink::new(std::io::BufWriter::new(file))),
            Err(e) => {
                log::error!("cannot create {}: {}", path.display(), e);
                std::process::exit(2);
            }
        }
    }

    let started = Instant::now();
    let clock_report = if cli.realtime {
        let clock = match Clock::from_config(&config) {
            Ok(clock) => clock,
            Err(e) => {
                log::error!("invalid clock: {}", e);
                std::process::exit(2);
            }
        };
        let max = if cli.ticks == 0 { None } else { Some(cli.ticks) };
        Some(clock.run(&mut sim, max))
    } else {
        for _ in 0..cli.ticks {
            sim.tick_core();
        }
        None
    };

    let report = report::RunReport::new(&sim, clock_report, started.elapsed());
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("failed to serialize report: {}", e),
    }

    // Dropping the simulation flushes buffered snapshot writers.
    drop(sim);
}
