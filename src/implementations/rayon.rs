use rayon::prelude::*;

use crate::error::SolveError;
use crate::grid::{average, Grid};
use crate::implementations::threaded::WorkerReport;
use crate::partition::RowRange;

// Rows of the destination are handed to rayon as disjoint chunks, so each
// task writes only its own row and no locking is needed.
fn par_sweep(src: &[f64], dst: &mut [f64], width: usize, n: usize) -> f64 {
    dst[width..(n + 1) * width]
        .par_chunks_mut(width)
        .enumerate()
        .map(|(r, dst_row)| {
            // r is 0-based within the interior; the grid row is r + 1
            let row = (r + 1) * width;
            let mut max_diff = 0.0_f64;
            for j in 1..=n {
                let idx = row + j;
                let v = average(src[idx - width], src[idx + width], src[idx - 1], src[idx + 1]);
                dst_row[j] = v;
                max_diff = max_diff.max((v - src[idx]).abs());
            }
            max_diff
        })
        .reduce(|| 0.0, f64::max)
}

/// Data-parallel backend on a private pool of `workers` threads.
/// Stops on the global max change, like the sequential reference.
pub fn relax_rayon(
    grid: &mut Grid,
    workers: usize,
    epsilon: f64,
    max_iters: usize,
) -> Result<WorkerReport, SolveError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("jacobi-rayon-{i}"))
        .build()?;

    let (width, n) = (grid.width(), grid.n());
    let current = &mut grid.current;
    let scratch = &mut grid.scratch;

    let (iterations, last_diff, converged) = pool.install(|| {
        let mut iterations = 0;
        loop {
            iterations += 1;
            par_sweep(current, scratch, width, n);
            let diff = par_sweep(scratch, current, width, n);
            tracing::trace!(iterations, diff, "rayon iteration done");
            if diff < epsilon {
                break (iterations, diff, true);
            }
            if iterations >= max_iters {
                break (iterations, diff, false);
            }
        }
    });

    Ok(WorkerReport {
        id: 0,
        rows: RowRange { first: 1, last: n + 1 },
        iterations,
        last_diff,
        converged,
    })
}
