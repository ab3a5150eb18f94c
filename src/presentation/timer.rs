use std::fmt;

/// The thresholds, in seconds, at which the remaining time is considered urgent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerThresholds {
    pub warning: u32,
    pub danger: u32,
}

impl Default for TimerThresholds {
    fn default() -> Self {
        Self { warning: 30, danger: 10 }
    }
}

/// How urgent the remaining time on a slide is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerLevel {
    Normal,
    Warning,
    Danger,
}

/// The remaining time on the current slide, as shown to the presenter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimerDisplay {
    /// The seconds left. This can dip below zero right before expiry is noticed.
    pub remaining: i64,

    /// The bonus seconds that were added to this slide when it was shown.
    pub used_bonus: u64,

    pub level: TimerLevel,
}

impl TimerDisplay {
    pub fn new(remaining: i64, used_bonus: u64, thresholds: &TimerThresholds) -> Self {
        let level = if remaining <= i64::from(thresholds.danger) {
            TimerLevel::Danger
        } else if remaining <= i64::from(thresholds.warning) {
            TimerLevel::Warning
        } else {
            TimerLevel::Normal
        };
        Self { remaining, used_bonus, level }
    }
}

impl fmt::Display for TimerDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let remaining = self.remaining.max(0);
        write!(f, "{}:{:02}", remaining / 60, remaining % 60)?;
        if self.used_bonus > 0 {
            write!(f, " (+{}s)", self.used_bonus)?;
        }
        Ok(())
    }
}
