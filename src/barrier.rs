//! Reusable counting barrier for the relaxation workers.
//!
//! Works like `std::sync::Barrier` (block on a condition variable until the
//! last participant arrives, then release everyone at once), but a worker can
//! also arrive for the current generation and drop out of every later one.
//! Workers that converge early use that to stop without leaving the rest of
//! the pool waiting on them.

use std::sync::{Condvar, Mutex, MutexGuard};

#[derive(Debug)]
struct BarrierState {
    /// Arrivals in the current generation.
    arrived: usize,
    /// Participants the current generation waits for.
    participants: usize,
    /// Arrivals this generation that will not take part in the next one.
    leaving: usize,
    generation: u64,
}

/// Barrier for a fixed pool of workers. It can be used any number of times.
#[derive(Debug)]
pub struct Barrier {
    state: Mutex<BarrierState>,
    released: Condvar,
}

/// Returned by [`Barrier::arrive_and_wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    leader: bool,
    generation: u64,
}

impl BarrierWaitResult {
    /// True for exactly one worker per generation: the last to arrive.
    pub fn is_leader(&self) -> bool {
        self.leader
    }

    /// The generation this call completed (0-based).
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Barrier {
    pub fn new(participants: usize) -> Self {
        Barrier {
            state: Mutex::new(BarrierState {
                arrived: 0,
                participants,
                leaving: 0,
                generation: 0,
            }),
            released: Condvar::new(),
        }
    }

    /// Participants the current generation is waiting for.
    pub fn participants(&self) -> usize {
        self.lock().participants
    }

    /// Block until every participant has arrived for this generation.
    pub fn arrive_and_wait(&self, worker_id: usize) -> BarrierWaitResult {
        let mut state = self.lock();
        let generation = state.generation;
        if self.arrive(&mut state) {
            tracing::trace!(worker_id, generation, "barrier released");
            return BarrierWaitResult {
                leader: true,
                generation,
            };
        }
        while state.generation == generation {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        BarrierWaitResult {
            leader: false,
            generation,
        }
    }

    /// Arrive for this generation, then stop participating. Does not block.
    pub fn arrive_and_leave(&self, worker_id: usize) {
        let mut state = self.lock();
        debug_assert!(state.participants > state.leaving, "barrier has no participants left");
        state.leaving += 1;
        let generation = state.generation;
        self.arrive(&mut state);
        tracing::trace!(worker_id, generation, "left barrier");
    }

    /// Record one arrival; returns true if it completed the generation.
    fn arrive(&self, state: &mut BarrierState) -> bool {
        state.arrived += 1;
        if state.arrived < state.participants {
            return false;
        }
        state.arrived = 0;
        state.participants -= state.leaving;
        state.leaving = 0;
        state.generation += 1;
        self.released.notify_all();
        true
    }

    // A panicking worker never holds this lock across user code, so the
    // state is still consistent after poisoning.
    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Each worker bumps a counter before every wait. Nobody may get past
    /// round `r` before all `n` increments of that round have happened.
    fn run_rounds(n: usize, rounds: usize) {
        let barrier = Barrier::new(n);
        let arrivals = AtomicUsize::new(0);
        let leaders = AtomicUsize::new(0);

        thread::scope(|s| {
            for id in 0..n {
                let barrier = &barrier;
                let arrivals = &arrivals;
                let leaders = &leaders;
                s.spawn(move || {
                    for round in 0..rounds {
                        arrivals.fetch_add(1, Ordering::SeqCst);
                        let result = barrier.arrive_and_wait(id);
                        assert_eq!(result.generation(), round as u64);
                        assert!(arrivals.load(Ordering::SeqCst) >= (round + 1) * n);
                        if result.is_leader() {
                            leaders.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        assert_eq!(arrivals.load(Ordering::SeqCst), n * rounds);
        assert_eq!(leaders.load(Ordering::SeqCst), rounds);
    }

    #[test]
    fn single_participant_never_blocks() {
        let barrier = Barrier::new(1);
        for round in 0..10 {
            let result = barrier.arrive_and_wait(0);
            assert!(result.is_leader());
            assert_eq!(result.generation(), round);
        }
    }

    #[test]
    fn releases_only_after_every_arrival() {
        for n in [2, 3, 4, 8, 16] {
            run_rounds(n, 200);
        }
    }

    #[test]
    fn leaving_worker_counts_for_its_last_generation() {
        let barrier = Barrier::new(3);
        let rounds_done = AtomicUsize::new(0);

        thread::scope(|s| {
            // worker 0 leaves after its second generation
            let b = &barrier;
            s.spawn(move || {
                b.arrive_and_wait(0);
                b.arrive_and_leave(0);
            });
            for id in 1..3 {
                let b = &barrier;
                let done = &rounds_done;
                s.spawn(move || {
                    for _ in 0..50 {
                        b.arrive_and_wait(id);
                    }
                    done.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        assert_eq!(rounds_done.load(Ordering::SeqCst), 2);
        assert_eq!(barrier.participants(), 2);
    }

    #[test]
    fn leaving_before_others_arrive_does_not_release_early() {
        let barrier = Barrier::new(2);
        barrier.arrive_and_leave(1);
        assert_eq!(barrier.participants(), 2);
        // worker 0 completes the generation; later generations are solo
        assert!(barrier.arrive_and_wait(0).is_leader());
        assert_eq!(barrier.participants(), 1);
        assert_eq!(barrier.arrive_and_wait(0).generation(), 1);
    }

    #[test]
    fn everyone_leaving_together_empties_the_barrier() {
        let barrier = Barrier::new(4);
        thread::scope(|s| {
            for id in 0..4 {
                let b = &barrier;
                s.spawn(move || {
                    b.arrive_and_wait(id);
                    b.arrive_and_leave(id);
                });
            }
        });
        assert_eq!(barrier.participants(), 0);
    }
}
