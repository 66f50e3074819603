use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crate::barrier::Barrier;
use crate::config::ConvergencePolicy;
use crate::error::SolveError;
use crate::grid::{average, Grid};
use crate::partition::RowRange;

/*
  One OS thread per row band, all reading and writing the same two buffers.

  Each iteration runs three barrier-separated phases:
    A. stencil current -> scratch over the band
    B. stencil scratch -> current over the band, tracking the max change,
       then publish that max into the worker's own diff slot
    C. decide whether to stop (own slot, or every slot under Global)

  A worker writes only inside [first, last) and reads rows first-1 and last
  of the other buffer, which belong to a neighbour or to the boundary. The
  barrier between phases orders those reads after the neighbour's writes,
  so no per-cell locking is needed.
*/

/// Raw pointer to one of the grid buffers, shareable across the workers.
#[derive(Clone, Copy)]
struct BufferPtr {
    data: *mut f64,
}

// SAFETY: workers write disjoint row bands and only read other bands after a
// barrier has ordered those writes before the read.
unsafe impl Send for BufferPtr {}
unsafe impl Sync for BufferPtr {}

impl BufferPtr {
    // Going through a method makes closures capture the whole wrapper,
    // not the bare `*mut f64` field.
    fn as_ptr(self) -> *mut f64 {
        self.data
    }
}

/// Per-worker max-diff slot, padded to a cache line.
#[repr(align(64))]
struct DiffSlot(AtomicU64);

/// PerWorkerMaxDiff: one slot per worker, written only by its owner.
struct DiffBoard {
    slots: Vec<DiffSlot>,
}

impl DiffBoard {
    fn new(workers: usize) -> Self {
        DiffBoard {
            slots: (0..workers).map(|_| DiffSlot(AtomicU64::new(0))).collect(),
        }
    }

    // Relaxed is enough: the barrier after publishing provides the ordering.
    fn publish(&self, worker: usize, diff: f64) {
        self.slots[worker].0.store(diff.to_bits(), Ordering::Relaxed);
    }

    fn get(&self, worker: usize) -> f64 {
        f64::from_bits(self.slots[worker].0.load(Ordering::Relaxed))
    }

    fn max(&self) -> f64 {
        (0..self.slots.len()).map(|w| self.get(w)).fold(0.0, f64::max)
    }
}

/// Where a worker is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Initializing,
    Relaxing(Phase),
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    StencilToScratch,
    StencilToCurrent,
    PublishDiff,
}

/// What a worker hands back to the coordinator when it is joined.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerReport {
    pub id: usize,
    pub rows: RowRange,
    /// Iterations this worker completed.
    pub iterations: usize,
    /// Max change seen in its last iteration.
    pub last_diff: f64,
    /// False when the worker stopped because of the iteration cap.
    pub converged: bool,
}

/// Run parameters shared by every worker.
#[derive(Debug, Clone, Copy)]
pub struct RelaxParams {
    pub epsilon: f64,
    pub max_iters: usize,
    pub policy: ConvergencePolicy,
}

/// Everything the workers share for the duration of one run.
struct Shared<'a> {
    current: BufferPtr,
    scratch: BufferPtr,
    width: usize,
    n: usize,
    barrier: &'a Barrier,
    diffs: &'a DiffBoard,
    params: RelaxParams,
}

/// Owns one row band of the grid and relaxes it until it stops.
pub struct RelaxationWorker<'a> {
    id: usize,
    rows: RowRange,
    state: WorkerState,
    shared: &'a Shared<'a>,
}

impl<'a> RelaxationWorker<'a> {
    fn new(id: usize, rows: RowRange, shared: &'a Shared<'a>) -> Self {
        RelaxationWorker {
            id,
            rows,
            state: WorkerState::Initializing,
            shared,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    fn run(mut self) -> WorkerReport {
        let shared = self.shared;
        let params = shared.params;
        let mut iterations = 0;
        let mut local_max;
        let converged = loop {
            iterations += 1;

            self.state = WorkerState::Relaxing(Phase::StencilToScratch);
            // SAFETY: writes scratch rows in `self.rows` only; reads current,
            // whose last writes happened before the previous barrier.
            unsafe {
                relax_band(
                    shared.current.as_ptr(),
                    shared.scratch.as_ptr(),
                    shared.width,
                    shared.n,
                    self.rows,
                );
            }
            shared.barrier.arrive_and_wait(self.id);

            self.state = WorkerState::Relaxing(Phase::StencilToCurrent);
            // SAFETY: as above with the buffers swapped; every band's scratch
            // writes were completed before the barrier just passed.
            local_max = unsafe {
                relax_band(
                    shared.scratch.as_ptr(),
                    shared.current.as_ptr(),
                    shared.width,
                    shared.n,
                    self.rows,
                )
            };

            self.state = WorkerState::Relaxing(Phase::PublishDiff);
            shared.diffs.publish(self.id, local_max);
            shared.barrier.arrive_and_wait(self.id);

            let diff = match params.policy {
                ConvergencePolicy::Local => shared.diffs.get(self.id),
                ConvergencePolicy::Global => shared.diffs.max(),
            };
            tracing::trace!(worker = self.id, iterations, diff, "iteration done");

            if diff < params.epsilon {
                break true;
            }
            if iterations >= params.max_iters {
                break false;
            }
            shared.barrier.arrive_and_wait(self.id);
        };

        // Still take part in the final barrier of this iteration, then drop
        // out so workers that keep going never wait on this one.
        shared.barrier.arrive_and_leave(self.id);
        self.state = WorkerState::Stopped;

        tracing::debug!(
            "worker {} stopped after {} iterations (rows {}..{}, diff {:e}, converged {})",
            self.id,
            iterations,
            self.rows.first,
            self.rows.last,
            local_max,
            converged
        );
        WorkerReport {
            id: self.id,
            rows: self.rows,
            iterations,
            last_diff: local_max,
            converged,
        }
    }
}

/// Run the barrier-synchronized engine over `grid` in place.
pub fn relax_threaded(
    grid: &mut Grid,
    ranges: &[RowRange],
    params: RelaxParams,
) -> Result<Vec<WorkerReport>, SolveError> {
    let barrier = Barrier::new(ranges.len());
    let diffs = DiffBoard::new(ranges.len());
    let shared = Shared {
        current: BufferPtr {
            data: grid.current.as_mut_ptr(),
        },
        scratch: BufferPtr {
            data: grid.scratch.as_mut_ptr(),
        },
        width: grid.width(),
        n: grid.n(),
        barrier: &barrier,
        diffs: &diffs,
        params,
    };

    thread::scope(|scope| {
        let handles: Vec<_> = ranges
            .iter()
            .enumerate()
            .map(|(id, &rows)| {
                let worker = RelaxationWorker::new(id, rows, &shared);
                debug_assert_eq!(worker.state(), WorkerState::Initializing);
                scope.spawn(move || worker.run())
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(worker, handle)| {
                handle
                    .join()
                    .map_err(|_| SolveError::WorkerPanicked { worker })
            })
            .collect()
    })
}

/// One stencil pass over rows `rows` from `src` into `dst`.
/// Returns the max of `|dst - src|` over the cells written.
///
/// # Safety
/// Both pointers must address `width * width` cells. No other thread may
/// write `dst` rows in `rows`, nor `src` rows `rows.first - 1 ..= rows.last`,
/// during the call.
#[inline(always)]
unsafe fn relax_band(
    src: *const f64,
    dst: *mut f64,
    width: usize,
    n: usize,
    rows: RowRange,
) -> f64 {
    let mut max_diff = 0.0_f64;
    for i in rows.rows() {
        let row = i * width;
        // SAFETY: 1 <= i <= n and 1 <= j <= n keep every offset in bounds.
        unsafe {
            let up = src.add(row - width);
            let mid = src.add(row);
            let down = src.add(row + width);
            let out = dst.add(row);
            for j in 1..=n {
                let v = average(*up.add(j), *down.add(j), *mid.add(j - 1), *mid.add(j + 1));
                *out.add(j) = v;
                max_diff = max_diff.max((v - *mid.add(j)).abs());
            }
        }
    }
    max_diff
}
