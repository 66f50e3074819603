use crate::grid::{average, Grid};
use crate::implementations::threaded::WorkerReport;
use crate::partition::RowRange;

/// One stencil pass over every interior cell from `src` into `dst`.
/// Returns the max of `|dst - src|` over the interior.
pub(crate) fn sweep(src: &[f64], dst: &mut [f64], width: usize, n: usize) -> f64 {
    let mut max_diff = 0.0_f64;
    for i in 1..=n {
        for j in 1..=n {
            let idx = i * width + j;
            let v = average(src[idx - width], src[idx + width], src[idx - 1], src[idx + 1]);
            dst[idx] = v;
            max_diff = max_diff.max((v - src[idx]).abs());
        }
    }
    max_diff
}

/// Sequential reference: the same two-pass iteration as the threaded engine,
/// on one thread, stopping on the global max change.
pub fn relax_single(grid: &mut Grid, epsilon: f64, max_iters: usize) -> WorkerReport {
    let (width, n) = (grid.width(), grid.n());
    let current = &mut grid.current;
    let scratch = &mut grid.scratch;

    let mut iterations = 0;
    let (last_diff, converged) = loop {
        iterations += 1;
        sweep(current, scratch, width, n);
        let diff = sweep(scratch, current, width, n);
        if diff < epsilon {
            break (diff, true);
        }
        if iterations >= max_iters {
            break (diff, false);
        }
    };

    WorkerReport {
        id: 0,
        rows: RowRange { first: 1, last: n + 1 },
        iterations,
        last_diff,
        converged,
    }
}
