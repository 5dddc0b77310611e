use std::time::{Duration, Instant};

/// Decides when the next scan cycle should start. Knows nothing about the
/// UI; the host polls it from its own loop.
#[derive(Debug)]
pub struct Scheduler {
    interval: Duration,
    /// `None` means a run is due right away.
    next_due: Option<Instant>,
}

impl Scheduler {
    /// A fresh scheduler is due immediately so the first cycle runs at start.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.next_due {
            Some(due) => now >= due,
            None => true,
        }
    }

    /// Record that a cycle has actually started at `now`.
    pub fn mark_started(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    /// Ask for a run on the next poll, e.g. after settings change.
    /// Stays pending until the host calls `mark_started`.
    pub fn trigger_now(&mut self) {
        self.next_due = None;
    }

    pub fn time_until_due(&self, now: Instant) -> Duration {
        match self.next_due {
            Some(due) => due.saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_due_at_startup() {
        let sched = Scheduler::new(HOUR);
        let now = Instant::now();
        assert!(sched.is_due(now));
        assert_eq!(sched.time_until_due(now), Duration::ZERO);
    }

    #[test]
    fn test_not_due_until_interval_elapses() {
        let mut sched = Scheduler::new(HOUR);
        let start = Instant::now();
        sched.mark_started(start);

        assert!(!sched.is_due(start));
        assert!(!sched.is_due(start + HOUR - Duration::from_secs(1)));
        assert!(sched.is_due(start + HOUR));
        assert_eq!(
            sched.time_until_due(start + Duration::from_secs(600)),
            HOUR - Duration::from_secs(600)
        );
    }

    #[test]
    fn test_trigger_now_stays_pending_until_started() {
        let mut sched = Scheduler::new(HOUR);
        let start = Instant::now();
        sched.mark_started(start);
        sched.trigger_now();

        let later = start + Duration::from_secs(5);
        assert!(sched.is_due(later));
        assert!(sched.is_due(later + Duration::from_secs(5)));

        sched.mark_started(later);
        assert!(!sched.is_due(later + Duration::from_secs(5)));
    }
}
