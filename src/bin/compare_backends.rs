use jacobi_laplace::{solve, Backend, ConvergencePolicy, Solution, SolverConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Largest cell-wise difference between two solutions.
fn max_abs_diff(a: &Solution, b: &Solution) -> f64 {
    a.snapshot()
        .iter()
        .zip(b.snapshot())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let size = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(128);
    let workers = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(4);
    let base = SolverConfig::new(size, workers).with_epsilon(1e-3);

    println!("=== Jacobi backend comparison: N = {size}, workers = {workers} ===\n");

    let runs = [
        ("single", base.clone().with_backend(Backend::Single)),
        ("threaded/global", base.clone().with_backend(Backend::Threaded)),
        (
            "threaded/local",
            base.clone()
                .with_backend(Backend::Threaded)
                .with_convergence(ConvergencePolicy::Local),
        ),
        ("rayon", base.clone().with_backend(Backend::Rayon)),
    ];

    let mut reference: Option<Solution> = None;
    for (name, config) in runs {
        let solution = match solve(&config) {
            Ok(solution) => solution,
            Err(e) => {
                tracing::error!("{}: {}", name, e);
                std::process::exit(1);
            }
        };
        let drift = reference
            .as_ref()
            .map(|r| max_abs_diff(r, &solution))
            .unwrap_or(0.0);
        println!(
            "{name:16} iterations {:6}  time {:>12?}  max |cell - single| {:e}",
            solution.iterations(),
            solution.elapsed(),
            drift
        );
        if reference.is_none() {
            reference = Some(solution);
        }
    }
}
