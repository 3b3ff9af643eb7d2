use serde::{Deserialize, Serialize};

pub const CRITICAL_TIME_THRESHOLD: u32 = 5;
pub const WARNING_TIME_THRESHOLD: u32 = 10;

/// Identifies one run of the countdown. Ticks carrying an older handle are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickOutcome {
    Ignored,
    Running(u32),
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeStatus {
    Normal,
    Warning,
    Critical,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedRating {
    Lightning,
    Fast,
    Normal,
    Slow,
    VerySlow,
}

/// Per-question countdown, advanced one second at a time by the host's interval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    pub total_time: u32,
    pub time_remaining: u32,
    pub bonus_added: u32,
    pub is_active: bool,
    pub is_paused: bool,
    handle: Option<TimerHandle>,
    next_handle: u64,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            total_time: 0,
            time_remaining: 0,
            bonus_added: 0,
            is_active: false,
            is_paused: false,
            handle: None,
            next_handle: 0,
        }
    }
}

impl TimerState {
    /// Resets the countdown to `total_time` and invalidates any previous handle.
    pub fn start(&mut self, total_time: u32) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.total_time = total_time;
        self.time_remaining = total_time;
        self.bonus_added = 0;
        self.is_active = true;
        self.is_paused = false;
        self.handle = Some(handle);
        handle
    }

    /// Invalidates the current handle; the remaining time is kept for display.
    pub fn stop(&mut self) {
        self.handle = None;
        self.is_active = false;
        self.is_paused = false;
    }

    pub fn handle(&self) -> Option<TimerHandle> {
        self.handle
    }

    /// First handle number `start` will issue next.
    pub fn next_handle(&self) -> u64 {
        self.next_handle
    }

    /// Reissues the live handle numbered at or above `min_next`, so no handle
    /// issued before that point can match. A stopped timer stays stopped.
    pub fn rehandle(&mut self, min_next: u64) {
        self.next_handle = self.next_handle.max(min_next);
        if self.handle.is_some() {
            self.handle = Some(TimerHandle(self.next_handle));
            self.next_handle += 1;
        }
    }

    pub fn pause(&mut self) {
        if self.is_active {
            self.is_paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.is_paused = false;
    }

    pub fn add_time(&mut self, seconds: u32) {
        self.time_remaining = self.time_remaining.saturating_add(seconds);
        self.bonus_added = self.bonus_added.saturating_add(seconds);
    }

    pub fn tick(&mut self, handle: TimerHandle) -> TickOutcome {
        if self.handle != Some(handle) || !self.is_active || self.is_paused {
            return TickOutcome::Ignored;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.stop();
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.time_remaining)
        }
    }

    /// Seconds spent on the current question.
    pub fn elapsed(&self) -> u32 {
        (self.total_time + self.bonus_added).saturating_sub(self.time_remaining)
    }

    pub fn percentage(&self) -> f64 {
        if self.total_time == 0 {
            return 0.0;
        }
        (self.time_remaining as f64 / self.total_time as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn status(&self) -> TimeStatus {
        match self.time_remaining {
            0 => TimeStatus::Expired,
            t if t <= CRITICAL_TIME_THRESHOLD => TimeStatus::Critical,
            t if t <= WARNING_TIME_THRESHOLD => TimeStatus::Warning,
            _ => TimeStatus::Normal,
        }
    }

    pub fn speed_rating(&self) -> SpeedRating {
        if self.total_time == 0 {
            return SpeedRating::VerySlow;
        }
        let used = self.elapsed() as f64 / self.total_time as f64 * 100.0;
        if used < 20.0 {
            SpeedRating::Lightning
        } else if used < 40.0 {
            SpeedRating::Fast
        } else if used < 60.0 {
            SpeedRating::Normal
        } else if used < 80.0 {
            SpeedRating::Slow
        } else {
            SpeedRating::VerySlow
        }
    }

    /// `mm:ss`
    pub fn formatted(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.time_remaining / 60,
            self.time_remaining % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_expires() {
        let mut timer = TimerState::default();
        let handle = timer.start(3);
        assert_eq!(timer.tick(handle), TickOutcome::Running(2));
        assert_eq!(timer.tick(handle), TickOutcome::Running(1));
        assert_eq!(timer.tick(handle), TickOutcome::Expired);
        assert!(!timer.is_active);
        // expired timers ignore further ticks
        assert_eq!(timer.tick(handle), TickOutcome::Ignored);
        assert_eq!(timer.time_remaining, 0);
    }

    #[test]
    fn test_stale_handle_ignored() {
        let mut timer = TimerState::default();
        let first = timer.start(10);
        let second = timer.start(10);
        assert_ne!(first, second);
        assert_eq!(timer.tick(first), TickOutcome::Ignored);
        assert_eq!(timer.time_remaining, 10);
        assert_eq!(timer.tick(second), TickOutcome::Running(9));

        timer.stop();
        assert_eq!(timer.tick(second), TickOutcome::Ignored);
        assert_eq!(timer.time_remaining, 9);
    }

    #[test]
    fn test_rehandle_invalidates_earlier_handles() {
        let mut earlier = TimerState::default();
        let old = earlier.start(10);

        let mut timer = TimerState::default();
        let restored = timer.start(8);
        assert_eq!(old, restored);

        timer.rehandle(earlier.next_handle());
        let fresh = timer.handle().unwrap();
        assert_ne!(fresh, old);
        assert_eq!(timer.tick(old), TickOutcome::Ignored);
        assert_eq!(timer.time_remaining, 8);
        assert_eq!(timer.tick(fresh), TickOutcome::Running(7));
        assert!(timer.next_handle() > earlier.next_handle());

        timer.stop();
        timer.rehandle(50);
        assert_eq!(timer.handle(), None);
        assert_eq!(timer.next_handle(), 50);
    }

    #[test]
    fn test_pause_preserves_remaining() {
        let mut timer = TimerState::default();
        let handle = timer.start(10);
        timer.tick(handle);
        timer.pause();
        for _ in 0..20 {
            assert_eq!(timer.tick(handle), TickOutcome::Ignored);
        }
        assert_eq!(timer.time_remaining, 9);
        timer.resume();
        assert_eq!(timer.tick(handle), TickOutcome::Running(8));
    }

    #[test]
    fn test_bonus_time_and_elapsed() {
        let mut timer = TimerState::default();
        let handle = timer.start(10);
        timer.tick(handle);
        timer.tick(handle);
        assert_eq!(timer.elapsed(), 2);
        timer.add_time(5);
        assert_eq!(timer.time_remaining, 13);
        assert_eq!(timer.elapsed(), 2);
    }

    #[test]
    fn test_status_and_format() {
        let mut timer = TimerState::default();
        timer.start(75);
        assert_eq!(timer.status(), TimeStatus::Normal);
        assert_eq!(timer.formatted(), "01:15");
        assert_eq!(timer.speed_rating(), SpeedRating::Lightning);

        timer.time_remaining = 8;
        assert_eq!(timer.status(), TimeStatus::Warning);
        timer.time_remaining = 5;
        assert_eq!(timer.status(), TimeStatus::Critical);
        assert_eq!(timer.speed_rating(), SpeedRating::VerySlow);
        timer.time_remaining = 0;
        assert_eq!(timer.status(), TimeStatus::Expired);
        assert_eq!(timer.percentage(), 0.0);
    }
}
