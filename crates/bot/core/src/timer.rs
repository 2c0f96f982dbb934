//! Tick countdowns.
//!
//! Every cadence in the bot (role assignment, rush attempts, squad updates, structure
//! production, support power rescans) is an [`IntervalTimer`]. There is no wall clock:
//! a timer only advances when its owner calls [`IntervalTimer::tick`].

/// A countdown that fires when it runs out and then restarts from its period.
///
/// A zero period is allowed: such a timer fires on every tick unless it has been
/// postponed with [`IntervalTimer::delay`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalTimer {
    period: u32,
    countdown: i64,
}

impl IntervalTimer {
    /// Creates a timer whose first expiry is one full period away.
    pub const fn new(period: u32) -> Self {
        Self {
            period,
            countdown: period as i64,
        }
    }

    /// Creates a timer with an explicit first countdown.
    ///
    /// Used to stagger bots so they do not all act on the same tick.
    pub const fn with_countdown(period: u32, countdown: i64) -> Self {
        Self { period, countdown }
    }

    /// Advances the timer by one tick and reports whether it fired.
    pub fn tick(&mut self) -> bool {
        self.countdown -= 1;
        if self.countdown <= 0 {
            self.countdown = self.period as i64;
            true
        } else {
            false
        }
    }

    /// Postpones the next expiry by `ticks`.
    pub fn delay(&mut self, ticks: u32) {
        self.countdown += ticks as i64;
    }

    /// Overrides the remaining countdown.
    pub fn set_countdown(&mut self, countdown: i64) {
        self.countdown = countdown;
    }

    pub const fn remaining(&self) -> i64 {
        self.countdown
    }

    pub const fn period(&self) -> u32 {
        self.period
    }
}
