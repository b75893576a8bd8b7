use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// A single-shot timer supporting early-fire and in-flight shortening (spec
/// §4.C, §5, §9). Built on `Condvar::wait_timeout` over a deadline kept
/// behind the same mutex as the "fire now" flag, so both [`early_fire`] and
/// [`shrink_to`] are just a store plus a broadcast — a canceled or
/// shortened wait is observed as an immediate condition, never an error.
///
/// [`early_fire`]: Self::early_fire
/// [`shrink_to`]: Self::shrink_to
#[derive(Default)]
pub struct PhaseTimer {
    state: Mutex<TimerState>,
    condvar: Condvar,
}

#[derive(Default)]
struct TimerState {
    deadline: Option<Instant>,
    fire_now: bool,
}

impl PhaseTimer {
    pub fn new() -> Self {
        Self { state: Mutex::new(TimerState::default()), condvar: Condvar::new() }
    }

    /// Blocks the calling thread until `duration` elapses, [`early_fire`] is
    /// called, or the deadline is pulled in by [`shrink_to`].
    ///
    /// An `early_fire` landing before `wait` is even called is not lost: the
    /// flag is sticky and only cleared once a wait consumes it, so a request
    /// racing ahead of the worker still collapses the very next wait.
    ///
    /// [`early_fire`]: Self::early_fire
    /// [`shrink_to`]: Self::shrink_to
    pub fn wait(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap();
        state.deadline = Some(Instant::now() + duration);
        loop {
            if state.fire_now {
                break;
            }
            let deadline = state.deadline.expect("deadline set above and never cleared mid-wait");
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let (guard, _timeout) = self.condvar.wait_timeout(state, deadline - now).unwrap();
            state = guard;
        }
        state.fire_now = false;
        state.deadline = None;
    }

    /// Wakes every thread currently blocked in [`wait`](Self::wait) without
    /// waiting for the remaining duration to elapse (spec §4.C early-fire,
    /// used for emergency pre-emption).
    pub fn early_fire(&self) {
        let mut state = self.state.lock().unwrap();
        state.fire_now = true;
        self.condvar.notify_all();
    }

    /// Time left on an in-flight wait, or `None` if nothing is waiting.
    /// Used by the pedestrian-button extension to compute the new deadline
    /// relative to what is actually left, not the phase's nominal duration
    /// (spec §4.C).
    pub fn remaining(&self) -> Option<Duration> {
        let state = self.state.lock().unwrap();
        state.deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Pulls the deadline of an in-flight wait in to `remaining` from now,
    /// if that is sooner than the current deadline (spec §4.C pedestrian-
    /// button extension: "shorten remaining phase timer by 5s"). A no-op if
    /// nothing is currently waiting, or if `remaining` would push the
    /// deadline further out.
    pub fn shrink_to(&self, remaining: Duration) {
        let mut state = self.state.lock().unwrap();
        let candidate = Instant::now() + remaining;
        let shrinks = state.deadline.is_some_and(|current| candidate < current);
        if shrinks {
            state.deadline = Some(candidate);
            self.condvar.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn wait_returns_after_duration_elapses() {
        let timer = PhaseTimer::new();
        let start = Instant::now();
        timer.wait(Duration::from_millis(20));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn early_fire_wakes_a_waiting_thread_promptly() {
        let timer = Arc::new(PhaseTimer::new());
        let waiter = Arc::clone(&timer);
        let handle = thread::spawn(move || {
            let start = Instant::now();
            waiter.wait(Duration::from_secs(30));
            start.elapsed()
        });

        thread::sleep(Duration::from_millis(20));
        timer.early_fire();
        let elapsed = handle.join().unwrap();
        assert!(elapsed < Duration::from_secs(1));
    }

    #[test]
    fn shrink_to_pulls_the_deadline_in() {
        let timer = Arc::new(PhaseTimer::new());
        let waiter = Arc::clone(&timer);
        let handle = thread::spawn(move || {
            let start = Instant::now();
            waiter.wait(Duration::from_secs(30));
            start.elapsed()
        });

        thread::sleep(Duration::from_millis(20));
        timer.shrink_to(Duration::from_millis(20));
        let elapsed = handle.join().unwrap();
        assert!(elapsed < Duration::from_secs(1));
    }

    #[test]
    fn shrink_to_is_a_noop_when_it_would_lengthen_the_wait() {
        let timer = Arc::new(PhaseTimer::new());
        let waiter = Arc::clone(&timer);
        let handle = thread::spawn(move || {
            let start = Instant::now();
            waiter.wait(Duration::from_millis(30));
            start.elapsed()
        });

        timer.shrink_to(Duration::from_secs(30));
        let elapsed = handle.join().unwrap();
        assert!(elapsed < Duration::from_secs(1));
    }
}
