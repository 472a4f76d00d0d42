//! Cooperative virtual-time scheduler.
//!
//! Repeating timers are registered with `schedule_repeating` and yield their
//! handle each time they come due. Nothing runs on its own: the owner pulls
//! due timers with `next_due_before` and dispatches them, so every callback
//! runs on the caller's thread, one at a time.

use std::time::Duration;

/// Handle to a scheduled repeating timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Timer {
    handle: TimerHandle,
    interval: Duration,
    next_due: Duration,
}

/// Single-threaded scheduler driven by an explicit virtual clock
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since the scheduler was created
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Register a timer that first fires one `interval` from now
    pub fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle {
        let interval = interval.max(Duration::from_millis(1));
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            handle,
            interval,
            next_due: self.now + interval,
        });
        tracing::trace!("Scheduled timer {:?} every {:?}", handle, interval);
        handle
    }

    /// Cancel a timer; returns false if it was not scheduled
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        let removed = self.timers.len() != before;
        if removed {
            tracing::trace!("Cancelled timer {:?}", handle);
        }
        removed
    }

    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    /// Number of outstanding timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Pop the earliest timer due at or before `deadline`
    ///
    /// Moves the clock to the due time and re-arms the timer for its next
    /// interval. Ties fire in registration order.
    pub fn next_due_before(&mut self, deadline: Duration) -> Option<TimerHandle> {
        let timer = self
            .timers
            .iter_mut()
            .filter(|t| t.next_due <= deadline)
            .min_by_key(|t| (t.next_due, t.handle))?;

        self.now = self.now.max(timer.next_due);
        timer.next_due += timer.interval;
        Some(timer.handle)
    }

    /// Move the clock forward without firing anything
    ///
    /// Callers drain `next_due_before(deadline)` first; the clock never goes
    /// backwards.
    pub fn advance_to(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut Scheduler, until: Duration) -> Vec<(TimerHandle, Duration)> {
        let mut fired = Vec::new();
        while let Some(handle) = scheduler.next_due_before(until) {
            fired.push((handle, scheduler.now()));
        }
        scheduler.advance_to(until);
        fired
    }

    #[test]
    fn test_repeating_timer_fires_every_interval() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_repeating(Duration::from_secs(1));

        let fired = drain(&mut scheduler, Duration::from_secs(3));
        assert_eq!(
            fired,
            vec![
                (handle, Duration::from_secs(1)),
                (handle, Duration::from_secs(2)),
                (handle, Duration::from_secs(3)),
            ]
        );
        assert_eq!(scheduler.now(), Duration::from_secs(3));
    }

    #[test]
    fn test_timers_interleave_by_due_time_then_registration() {
        let mut scheduler = Scheduler::new();
        let fast = scheduler.schedule_repeating(Duration::from_secs(1));
        let slow = scheduler.schedule_repeating(Duration::from_secs(2));

        let order: Vec<_> = drain(&mut scheduler, Duration::from_secs(2))
            .into_iter()
            .map(|(h, _)| h)
            .collect();
        assert_eq!(order, vec![fast, fast, slow]);
    }

    #[test]
    fn test_cancel_removes_timer() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_repeating(Duration::from_secs(1));
        assert!(scheduler.is_scheduled(handle));

        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert_eq!(scheduler.pending(), 0);
        assert!(drain(&mut scheduler, Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn test_new_timer_starts_from_current_time() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_to(Duration::from_millis(1500));
        let handle = scheduler.schedule_repeating(Duration::from_secs(1));

        assert_eq!(scheduler.next_due_before(Duration::from_secs(2)), None);
        assert_eq!(
            scheduler.next_due_before(Duration::from_millis(2500)),
            Some(handle)
        );
    }
}
