//! Collective workgroup barrier for simulated work items.
//!
//! ## Semantics
//! * Built for a fixed participant count (the workgroup size).
//! * A call to [`GroupBarrier::wait`] returns only after **all** participants
//!   have called it for the same round (generation).
//! * Reusable: once a round completes, the next round starts immediately.
//!
//! There is no point-to-point path and no timeout. If one participant never
//! arrives, the others stay blocked, which is how a divergent barrier behaves
//! on hardware.
//!
//! The one exception is a panicking participant: the simulator poisons the
//! barrier so that blocked peers unwind too, instead of hanging the host.
//!
//! ## Memory visibility
//! Arrival and release go through one `Mutex`, so every write a participant
//! made before `wait` happens-before every read another participant makes
//! after it.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct BarrierState {
    arrived: u32,
    generation: u64,
    poisoned: bool,
}

/// A reusable all-or-nothing rendezvous for one workgroup.
#[derive(Debug)]
pub struct GroupBarrier {
    participants: u32,
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl GroupBarrier {
    /// Creates a barrier for `participants` work items.
    ///
    /// A zero count is treated as one so that `wait` never blocks forever on
    /// an empty group.
    pub fn new(participants: u32) -> Self {
        Self {
            participants: participants.max(1),
            state: Mutex::new(BarrierState { arrived: 0, generation: 0, poisoned: false }),
            released: Condvar::new(),
        }
    }

    /// Number of work items that must arrive to complete a round.
    #[inline]
    pub fn participants(&self) -> u32 {
        self.participants
    }

    /// Number of rounds completed so far.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// `true` once a participant panicked.
    pub fn is_poisoned(&self) -> bool {
        self.lock().poisoned
    }

    /// Marks the barrier as abandoned and wakes every blocked participant.
    pub fn poison(&self) {
        let mut state = self.lock();
        state.poisoned = true;
        self.released.notify_all();
    }

    /// Blocks until every participant has arrived for the current round.
    ///
    /// Returns `true` on exactly one participant per round (the last to
    /// arrive).
    ///
    /// ## Panics
    /// If the barrier is, or becomes, poisoned while waiting.
    pub fn wait(&self) -> bool {
        let mut state = self.lock();
        if state.poisoned {
            drop(state);
            panic!("workgroup barrier poisoned by a panicking work item");
        }
        let round = state.generation;
        state.arrived += 1;

        if state.arrived == self.participants {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.released.notify_all();
            return true;
        }

        while state.generation == round && !state.poisoned {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.generation == round {
            drop(state);
            panic!("workgroup barrier poisoned by a panicking work item");
        }
        false
    }

    // A panicking kernel never holds this lock across user code, so a
    // poisoned state is still consistent.
    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn single_participant_never_blocks() {
        let barrier = GroupBarrier::new(1);
        assert!(barrier.wait());
        assert!(barrier.wait());
        assert_eq!(barrier.generation(), 2);
    }

    #[test]
    fn zero_participants_behaves_like_one() {
        let barrier = GroupBarrier::new(0);
        assert_eq!(barrier.participants(), 1);
        assert!(barrier.wait());
    }

    #[test]
    fn no_thread_passes_before_all_arrive() {
        const N: u32 = 8;
        let barrier = GroupBarrier::new(N);
        let arrived = AtomicU32::new(0);
        let leaders = AtomicU32::new(0);

        std::thread::scope(|s| {
            for _ in 0..N {
                s.spawn(|| {
                    arrived.fetch_add(1, Ordering::Relaxed);
                    if barrier.wait() {
                        leaders.fetch_add(1, Ordering::Relaxed);
                    }
                    assert_eq!(arrived.load(Ordering::Relaxed), N);
                });
            }
        });

        assert_eq!(leaders.load(Ordering::Relaxed), 1);
        assert_eq!(barrier.generation(), 1);
    }

    #[test]
    fn poison_releases_blocked_waiters() {
        let barrier = GroupBarrier::new(2);

        std::thread::scope(|s| {
            let waiter = s.spawn(|| barrier.wait());
            barrier.poison();
            assert!(waiter.join().is_err());
        });

        assert!(barrier.is_poisoned());
        assert_eq!(barrier.generation(), 0);
    }

    #[test]
    fn rounds_are_reusable() {
        const N: u32 = 4;
        const ROUNDS: u32 = 16;
        let barrier = GroupBarrier::new(N);
        let counter = AtomicU32::new(0);

        std::thread::scope(|s| {
            for _ in 0..N {
                s.spawn(|| {
                    for round in 0..ROUNDS {
                        counter.fetch_add(1, Ordering::Relaxed);
                        barrier.wait();
                        assert_eq!(counter.load(Ordering::Relaxed), (round + 1) * N);
                        barrier.wait();
                    }
                });
            }
        });

        assert_eq!(barrier.generation(), u64::from(ROUNDS) * 2);
    }
}
