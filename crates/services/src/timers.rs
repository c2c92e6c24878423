//! Deferred session work expressed as explicit deadlines.

use chrono::{DateTime, Utc};

/// Delay between accepting a scale and moving on.
pub const ADVANCE_DELAY_MS: i64 = 500;
/// Delay between completing a scale and celebrating it.
pub const CELEBRATION_DELAY_MS: i64 = 100;

/// A timer whose deadline has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DueTimer {
    Advance,
    Celebration { scale: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingCelebration {
    due_at: DateTime<Utc>,
    scale: String,
}

/// At most one pending advance and one pending celebration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTimers {
    advance: Option<DateTime<Utc>>,
    celebration: Option<PendingCelebration>,
}

impl SessionTimers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any advance already pending.
    pub fn schedule_advance(&mut self, due_at: DateTime<Utc>) {
        self.advance = Some(due_at);
    }

    pub fn cancel_advance(&mut self) -> bool {
        self.advance.take().is_some()
    }

    pub fn schedule_celebration(&mut self, due_at: DateTime<Utc>, scale: impl Into<String>) {
        self.celebration = Some(PendingCelebration {
            due_at,
            scale: scale.into(),
        });
    }

    pub fn cancel_all(&mut self) {
        self.advance = None;
        self.celebration = None;
    }

    #[must_use]
    pub fn has_pending_advance(&self) -> bool {
        self.advance.is_some()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.advance.is_none() && self.celebration.is_none()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        let celebration = self.celebration.as_ref().map(|c| c.due_at);
        match (self.advance, celebration) {
            (Some(a), Some(c)) => Some(a.min(c)),
            (a, c) => a.or(c),
        }
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<DueTimer> {
        let mut due: Vec<(DateTime<Utc>, DueTimer)> = Vec::new();
        if let Some(at) = self.advance.filter(|at| *at <= now) {
            self.advance = None;
            due.push((at, DueTimer::Advance));
        }
        if self.celebration.as_ref().is_some_and(|c| c.due_at <= now) {
            if let Some(c) = self.celebration.take() {
                due.push((c.due_at, DueTimer::Celebration { scale: c.scale }));
            }
        }
        due.sort_by_key(|(at, _)| *at);
        due.into_iter().map(|(_, timer)| timer).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use scaled_core::time::fixed_now;

    #[test]
    fn nothing_fires_before_its_deadline() {
        let now = fixed_now();
        let mut timers = SessionTimers::new();
        timers.schedule_advance(now + Duration::milliseconds(ADVANCE_DELAY_MS));

        assert!(timers.take_due(now + Duration::milliseconds(499)).is_empty());
        assert!(timers.has_pending_advance());
        assert_eq!(
            timers.take_due(now + Duration::milliseconds(500)),
            vec![DueTimer::Advance]
        );
        assert!(timers.is_idle());
    }

    #[test]
    fn due_timers_come_out_in_deadline_order() {
        let now = fixed_now();
        let mut timers = SessionTimers::new();
        timers.schedule_advance(now + Duration::milliseconds(ADVANCE_DELAY_MS));
        timers.schedule_celebration(now + Duration::milliseconds(CELEBRATION_DELAY_MS), "A Minor");

        assert_eq!(
            timers.next_deadline(),
            Some(now + Duration::milliseconds(CELEBRATION_DELAY_MS))
        );
        assert_eq!(
            timers.take_due(now + Duration::seconds(1)),
            vec![
                DueTimer::Celebration {
                    scale: "A Minor".into()
                },
                DueTimer::Advance
            ]
        );
    }

    #[test]
    fn rescheduling_replaces_the_pending_advance() {
        let now = fixed_now();
        let mut timers = SessionTimers::new();
        timers.schedule_advance(now);
        timers.schedule_advance(now + Duration::seconds(2));

        assert!(timers.take_due(now + Duration::seconds(1)).is_empty());
        assert!(timers.cancel_advance());
        assert!(!timers.cancel_advance());
    }

    #[test]
    fn cancel_all_clears_everything() {
        let now = fixed_now();
        let mut timers = SessionTimers::new();
        timers.schedule_advance(now);
        timers.schedule_celebration(now, "C Major");
        timers.cancel_all();

        assert!(timers.is_idle());
        assert_eq!(timers.next_deadline(), None);
    }
}
