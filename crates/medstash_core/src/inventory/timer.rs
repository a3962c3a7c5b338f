//! Caller-driven timers for the undo grace window and search debounce.
//!
//! Both timers are plain deadline trackers: the caller passes `now` on every
//! call, so any event loop (or a test) can drive them.

use crate::config::InventoryConfig;
use crate::model::medication::MedicationId;
use std::time::{Duration, Instant};

pub const DEFAULT_UNDO_GRACE: Duration = Duration::from_millis(5000);
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(150);

/// Grace window between `request_delete` and the automatic `confirm_delete`.
#[derive(Debug, Clone)]
pub struct UndoCountdown {
    grace: Duration,
    armed: Option<(MedicationId, Instant)>,
}

impl Default for UndoCountdown {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_GRACE)
    }
}

impl UndoCountdown {
    pub fn new(grace: Duration) -> Self {
        Self { grace, armed: None }
    }

    pub fn from_config(config: &InventoryConfig) -> Self {
        Self::new(Duration::from_millis(config.undo_grace_ms))
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Arms the countdown for `id`, replacing any previous one.
    pub fn start(&mut self, id: MedicationId, now: Instant) {
        self.armed = Some((id, now));
    }

    /// Disarms the countdown (undo, dismiss, or teardown).
    pub fn cancel(&mut self) -> Option<MedicationId> {
        self.armed.take().map(|(id, _)| id)
    }

    pub fn pending_id(&self) -> Option<MedicationId> {
        self.armed.map(|(id, _)| id)
    }

    /// Time left before the countdown fires, `None` when disarmed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let (_, started_at) = self.armed?;
        Some(self.grace.saturating_sub(now.saturating_duration_since(started_at)))
    }

    /// Remaining share of the window in `0.0..=1.0`, for progress bars.
    pub fn progress(&self, now: Instant) -> Option<f32> {
        let remaining = self.remaining(now)?;
        if self.grace.is_zero() {
            return Some(0.0);
        }
        Some(remaining.as_secs_f32() / self.grace.as_secs_f32())
    }

    /// Returns the armed id once the window has elapsed, disarming it.
    ///
    /// The caller then runs `confirm_delete`.
    pub fn poll(&mut self, now: Instant) -> Option<MedicationId> {
        if self.remaining(now)?.is_zero() {
            return self.cancel();
        }
        None
    }
}

/// Coalesces rapid query edits into one update after a quiet period.
#[derive(Debug, Clone)]
pub struct QueryDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for QueryDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

impl QueryDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn from_config(config: &InventoryConfig) -> Self {
        Self::new(Duration::from_millis(config.search_debounce_ms))
    }

    /// Records a new query and restarts the quiet period.
    pub fn push(&mut self, query: impl Into<String>, now: Instant) {
        self.pending = Some((query.into(), now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the latest query once `delay` has passed since the last push.
    pub fn take_ready(&mut self, now: Instant) -> Option<String> {
        let (_, pushed_at) = self.pending.as_ref()?;
        if now.saturating_duration_since(*pushed_at) < self.delay {
            return None;
        }
        self.pending.take().map(|(query, _)| query)
    }

    /// Returns the pending query immediately (e.g. on Enter).
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(query, _)| query)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{QueryDebouncer, UndoCountdown, DEFAULT_UNDO_GRACE};
    use std::time::{Duration, Instant};

    #[test]
    fn countdown_fires_once_after_grace() {
        let start = Instant::now();
        let mut countdown = UndoCountdown::default();
        assert_eq!(countdown.grace(), DEFAULT_UNDO_GRACE);

        countdown.start(7, start);
        assert_eq!(countdown.poll(start + Duration::from_millis(4999)), None);
        assert_eq!(countdown.poll(start + Duration::from_millis(5000)), Some(7));
        assert_eq!(countdown.poll(start + Duration::from_millis(6000)), None);
    }

    #[test]
    fn cancelled_countdown_never_fires() {
        let start = Instant::now();
        let mut countdown = UndoCountdown::new(Duration::from_millis(100));
        countdown.start(3, start);
        assert_eq!(countdown.cancel(), Some(3));
        assert_eq!(countdown.poll(start + Duration::from_secs(1)), None);
        assert_eq!(countdown.remaining(start), None);
    }

    #[test]
    fn countdown_progress_drains_to_zero() {
        let start = Instant::now();
        let mut countdown = UndoCountdown::new(Duration::from_millis(1000));
        countdown.start(1, start);

        let full = countdown.progress(start).expect("armed countdown has progress");
        assert!((full - 1.0).abs() < f32::EPSILON);
        let half = countdown
            .progress(start + Duration::from_millis(500))
            .expect("armed countdown has progress");
        assert!((half - 0.5).abs() < 0.01);
        let done = countdown
            .progress(start + Duration::from_millis(2000))
            .expect("armed countdown has progress");
        assert_eq!(done, 0.0);
    }

    #[test]
    fn debouncer_coalesces_to_latest_query() {
        let start = Instant::now();
        let mut debouncer = QueryDebouncer::new(Duration::from_millis(150));

        debouncer.push("i", start);
        debouncer.push("ib", start + Duration::from_millis(100));
        assert_eq!(debouncer.take_ready(start + Duration::from_millis(200)), None);
        assert_eq!(
            debouncer.take_ready(start + Duration::from_millis(250)),
            Some("ib".to_string())
        );
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn debouncer_flush_and_cancel() {
        let start = Instant::now();
        let mut debouncer = QueryDebouncer::default();
        debouncer.push("ibu", start);
        assert_eq!(debouncer.flush(), Some("ibu".to_string()));

        debouncer.push("para", start);
        debouncer.cancel();
        assert_eq!(debouncer.take_ready(start + Duration::from_secs(1)), None);
    }
}
