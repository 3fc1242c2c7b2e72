//! Debounced autosave scheduling.
//!
//! # Invariants
//! - Each mutation restarts the quiet period.
//! - A save is due once, when the quiet period has elapsed since the last
//!   mutation; taking it clears the dirty flag.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct AutosaveScheduler {
    debounce: Duration,
    dirty_since: Option<Instant>,
    last_change: Option<Instant>,
}

impl AutosaveScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            dirty_since: None,
            last_change: None,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Records a mutation at `now`.
    pub fn mark_dirty(&mut self, now: Instant) {
        self.dirty_since.get_or_insert(now);
        self.last_change = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.last_change.is_some()
    }

    /// Instant the first unsaved mutation happened.
    pub fn dirty_since(&self) -> Option<Instant> {
        self.dirty_since
    }

    /// Instant at which a save becomes due, if anything is unsaved.
    pub fn due_at(&self) -> Option<Instant> {
        self.last_change.map(|changed| changed + self.debounce)
    }

    pub fn poll(&self, now: Instant) -> bool {
        self.due_at().is_some_and(|due| now >= due)
    }

    /// Consumes a due save. Returns `false` while still debouncing.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if !self.poll(now) {
            return false;
        }
        self.mark_saved();
        true
    }

    /// Clears the dirty state after an explicit save.
    pub fn mark_saved(&mut self) {
        self.dirty_since = None;
        self.last_change = None;
    }
}

#[cfg(test)]
mod tests {
    use super::AutosaveScheduler;
    use std::time::{Duration, Instant};

    #[test]
    fn clean_scheduler_is_never_due() {
        let scheduler = AutosaveScheduler::new(Duration::from_secs(10));
        assert!(!scheduler.poll(Instant::now() + Duration::from_secs(3600)));
    }

    #[test]
    fn later_mutations_push_the_deadline() {
        let start = Instant::now();
        let mut scheduler = AutosaveScheduler::new(Duration::from_secs(10));
        scheduler.mark_dirty(start);
        scheduler.mark_dirty(start + Duration::from_secs(8));

        assert!(!scheduler.poll(start + Duration::from_secs(10)));
        assert!(scheduler.poll(start + Duration::from_secs(18)));
        assert_eq!(scheduler.dirty_since(), Some(start));
    }

    #[test]
    fn take_due_fires_once() {
        let start = Instant::now();
        let mut scheduler = AutosaveScheduler::new(Duration::from_millis(100));
        scheduler.mark_dirty(start);
        assert!(!scheduler.take_due(start + Duration::from_millis(50)));
        assert!(scheduler.take_due(start + Duration::from_millis(100)));
        assert!(!scheduler.take_due(start + Duration::from_millis(500)));
        assert!(!scheduler.is_dirty());
    }
}
