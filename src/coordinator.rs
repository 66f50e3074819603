//! Builds the grid and the worker pool, runs it, and packages the result.

use std::time::{Duration, Instant};

use crate::config::{Backend, SolverConfig};
use crate::error::SolveError;
use crate::grid::Grid;
use crate::implementations::rayon::relax_rayon;
use crate::implementations::single::relax_single;
use crate::implementations::threaded::{relax_threaded, RelaxParams, WorkerReport};
use crate::partition::partition;

/// Final state of a run, read by the I/O layer once every worker is done.
#[derive(Debug, Clone)]
pub struct Solution {
    grid: Grid,
    iterations: usize,
    elapsed: Duration,
    max_diff: f64,
    converged: bool,
    workers: Vec<WorkerReport>,
}

impl Solution {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Final grid, row-major, boundary cells included.
    pub fn snapshot(&self) -> &[f64] {
        self.grid.snapshot()
    }

    /// Iterations run by the longest-running worker.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Wall-clock time from starting the workers to joining the last one.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Largest max-change reported by any worker in its last iteration.
    pub fn max_diff(&self) -> f64 {
        self.max_diff
    }

    /// True when every worker stopped on epsilon rather than the cap.
    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn workers(&self) -> &[WorkerReport] {
        &self.workers
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }
}

/// Validate `config`, run the selected backend to completion and return
/// the final grid.
pub fn solve(config: &SolverConfig) -> Result<Solution, SolveError> {
    config.validate()?;
    let ranges = partition(config.size, config.workers)?;
    let mut grid = Grid::new(config.size, config.boundary);

    tracing::info!(
        "solving {}x{} grid with {} workers ({:?} backend, {:?} convergence, epsilon {})",
        config.size,
        config.size,
        config.workers,
        config.backend,
        config.convergence,
        config.epsilon
    );

    let start = Instant::now();
    let workers = match config.backend {
        Backend::Threaded => {
            let params = RelaxParams {
                epsilon: config.epsilon,
                max_iters: config.max_iters,
                policy: config.convergence,
            };
            relax_threaded(&mut grid, &ranges, params)?
        }
        Backend::Rayon => vec![relax_rayon(
            &mut grid,
            config.workers,
            config.epsilon,
            config.max_iters,
        )?],
        Backend::Single => vec![relax_single(&mut grid, config.epsilon, config.max_iters)],
    };
    let elapsed = start.elapsed();

    let iterations = workers.iter().map(|w| w.iterations).max().unwrap_or(0);
    let max_diff = workers.iter().map(|w| w.last_diff).fold(0.0, f64::max);
    let converged = workers.iter().all(|w| w.converged);

    if converged {
        tracing::info!("converged after {} iterations in {:?}", iterations, elapsed);
    } else {
        tracing::warn!(
            "stopped at the iteration cap ({}) with max change {:e}",
            iterations,
            max_diff
        );
    }

    Ok(Solution {
        grid,
        iterations,
        elapsed,
        max_diff,
        converged,
        workers,
    })
}
