use std::time::{Duration, Instant};

/// The period between two countdown ticks.
pub(crate) const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A repeating tick schedule.
///
/// There's no background thread involved: the owner polls it with the current time and it reports
/// whether a tick is due. Dropping it cancels it.
#[derive(Debug)]
pub(crate) struct Countdown {
    next_tick: Instant,
    period: Duration,
}

impl Countdown {
    /// Arm a countdown whose first tick happens one period after `now`.
    pub(crate) fn arm(now: Instant, period: Duration) -> Self {
        Self { next_tick: now + period, period }
    }

    /// The instant at which the next tick is due.
    pub(crate) fn deadline(&self) -> Instant {
        self.next_tick
    }

    /// Consume one due tick, if any.
    ///
    /// Calling this in a loop until it returns `false` catches up on every tick that elapsed
    /// since the last call.
    pub(crate) fn try_fire(&mut self, now: Instant) -> bool {
        if now >= self.next_tick {
            self.next_tick += self.period;
            true
        } else {
            false
        }
    }
}
