use std::path::PathBuf;
use std::process;

use cobble_bench::report::{self, Baseline};
use cobble_bench::runner::BenchmarkRunner;
use cobble_bench::scenes;

const USAGE: &str = "\
Usage: bench-runner [OPTIONS]
  --baseline <path>              Compare against a saved JSON baseline
  --output <path>                Write this run as a JSON baseline
  --regression-threshold <pct>   Allowed slowdown in percent (default: 10)
  --frames <n>                   Edit/rebuild/physics frames per scene (default: 120)";

struct Args {
    baseline: Option<PathBuf>,
    output: Option<PathBuf>,
    threshold_pct: f64,
    frames: u32,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Option<Args>, String> {
    let mut args = Args {
        baseline: None,
        output: None,
        threshold_pct: 10.0,
        frames: 120,
    };
    while let Some(flag) = raw.next() {
        if flag == "--help" || flag == "-h" {
            return Ok(None);
        }
        let mut value = || raw.next().ok_or_else(|| format!("missing value for {flag}"));
        match flag.as_str() {
            "--baseline" => args.baseline = Some(PathBuf::from(value()?)),
            "--output" => args.output = Some(PathBuf::from(value()?)),
            "--regression-threshold" => {
                let v = value()?;
                args.threshold_pct = v
                    .parse()
                    .map_err(|_| format!("invalid --regression-threshold value: {v}"))?;
            }
            "--frames" => {
                let v = value()?;
                args.frames = v
                    .parse()
                    .map_err(|_| format!("invalid --frames value: {v}"))?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(Some(args))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            eprintln!("{USAGE}");
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            process::exit(1);
        }
    };

    let runner = BenchmarkRunner::new(args.frames).unwrap_or_else(|e| {
        log::error!("Failed to load block types: {e}");
        process::exit(1);
    });

    let results: Vec<_> = scenes::standard_scenes()
        .iter()
        .map(|scene| runner.run_scene(scene))
        .collect();

    println!("\n## Benchmark Results\n");
    println!("{}", report::format_markdown(&results));

    if let Some(path) = &args.output {
        let baseline = Baseline {
            timestamp: run_timestamp(),
            results: results.clone(),
        };
        match report::save_baseline(path, &baseline) {
            Ok(()) => log::info!("Saved baseline to {}", path.display()),
            Err(e) => {
                log::error!("Failed to save baseline to {}: {e}", path.display());
                process::exit(1);
            }
        }
    }

    if let Some(path) = &args.baseline {
        let Some(baseline) = report::load_baseline(path) else {
            log::warn!("Baseline file not found: {}", path.display());
            return;
        };
        let regressions = report::compare(&results, &baseline, args.threshold_pct);
        println!("{}", report::format_comparison(&regressions, args.threshold_pct));
        if !regressions.is_empty() {
            log::error!("{} regressions against {}", regressions.len(), path.display());
            process::exit(1);
        }
    }

    log::info!("Benchmark complete.");
}

fn run_timestamp() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("bench-{secs}")
}
