//! Auto-reconnect planning: when the backend reports not-connected and no
//! request is mid-flight, schedule a single reconnect attempt after a fixed
//! delay. Every status or loading change recomputes (resets) the timer.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ReconnectPlanner {
    delay: Duration,
    deadline: Option<Instant>,
}

impl ReconnectPlanner {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn note_status(&mut self, connected: bool, in_flight: bool, now: Instant) {
        self.deadline = if !connected && !in_flight {
            Some(now + self.delay)
        } else {
            None
        };
    }

    /// True exactly once per elapsed deadline; the attempt is consumed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_secs(5);

    #[test]
    fn disconnected_status_schedules_an_attempt_after_the_delay() {
        let mut planner = ReconnectPlanner::new(DELAY);
        let now = Instant::now();

        planner.note_status(false, false, now);

        assert!(!planner.take_due(now + Duration::from_secs(4)));
        assert!(planner.take_due(now + Duration::from_secs(5)));
    }

    #[test]
    fn attempt_fires_only_once() {
        let mut planner = ReconnectPlanner::new(DELAY);
        let now = Instant::now();
        planner.note_status(false, false, now);

        assert!(planner.take_due(now + DELAY));
        assert!(!planner.take_due(now + Duration::from_secs(60)));
    }

    #[test]
    fn connected_status_cancels_a_pending_attempt() {
        let mut planner = ReconnectPlanner::new(DELAY);
        let now = Instant::now();
        planner.note_status(false, false, now);

        planner.note_status(true, false, now + Duration::from_secs(2));

        assert!(!planner.take_due(now + Duration::from_secs(60)));
    }

    #[test]
    fn in_flight_request_defers_scheduling() {
        let mut planner = ReconnectPlanner::new(DELAY);
        let now = Instant::now();

        planner.note_status(false, true, now);

        assert!(!planner.take_due(now + Duration::from_secs(60)));
    }

    #[test]
    fn repeated_disconnected_reports_reset_the_timer() {
        let mut planner = ReconnectPlanner::new(DELAY);
        let now = Instant::now();
        planner.note_status(false, false, now);

        // A fresh status observation 3 s later pushes the deadline out.
        planner.note_status(false, false, now + Duration::from_secs(3));

        assert!(!planner.take_due(now + Duration::from_secs(5)));
        assert!(planner.take_due(now + Duration::from_secs(8)));
    }
}
