use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;

use jacobi_laplace::report::{self, DEFAULT_RESULTS_FILE, USAGE};
use jacobi_laplace::{solve, Boundary, SolverConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(msg) => {
            tracing::error!("{}", msg);
            eprint!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let solution = match solve(&config) {
        Ok(solution) => solution,
        Err(e) => {
            tracing::error!("{}", e);
            eprint!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let written = File::create(DEFAULT_RESULTS_FILE).and_then(|file| {
        let mut out = BufWriter::new(file);
        report::write_results(&mut out, &config, &solution)
    });
    match written {
        Ok(()) => tracing::info!("results written to {}", DEFAULT_RESULTS_FILE),
        Err(e) => {
            tracing::error!("failed to write {}: {}", DEFAULT_RESULTS_FILE, e);
            return ExitCode::FAILURE;
        }
    }

    print!("{}", report::summary(&config, &solution));
    ExitCode::SUCCESS
}

/// `N numWorkers [L T R B E]` or `--config <file>`.
fn parse_args(args: &[String]) -> Result<SolverConfig, String> {
    if let [flag, path] = args {
        if flag == "--config" {
            return SolverConfig::load(path).map_err(|e| e.to_string());
        }
    }

    match args.len() {
        2 | 7 => {}
        0 => return Err("missing arguments".to_string()),
        n => return Err(format!("expected 2 or 7 arguments, got {n}")),
    }

    let size = parse::<usize>(&args[0], "N")?;
    let workers = parse::<usize>(&args[1], "numWorkers")?;
    let mut config = SolverConfig::new(size, workers);

    if args.len() == 7 {
        config.boundary = Boundary {
            left: parse(&args[2], "L")?,
            top: parse(&args[3], "T")?,
            right: parse(&args[4], "R")?,
            bottom: parse(&args[5], "B")?,
        };
        config.epsilon = parse(&args[6], "E")?;
    }
    Ok(config)
}

fn parse<T: std::str::FromStr>(arg: &str, name: &str) -> Result<T, String> {
    arg.parse()
        .map_err(|_| format!("{name} must be a number, got {arg:?}"))
}
