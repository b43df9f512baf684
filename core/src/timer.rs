//! Stopwatch-style timers driven by simulated time.
//!
//! Timers never sample a wall clock. Owners feed them the `dt` carried by
//! [`Event::TimeAdvanced`](crate::Event::TimeAdvanced) through `advance`, so
//! replays of the same event stream always observe the same elapsed times.

use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum TimerState {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// Measures time elapsed since [`Timer::start`], optionally frozen by
/// [`Timer::stop`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    elapsed: Duration,
    state: TimerState,
}

impl Timer {
    /// Creates a timer that has not been started. Its elapsed time is zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
            state: TimerState::Idle,
        }
    }

    /// Resets the reference point and clears any previous stop.
    pub fn start(&mut self) {
        self.elapsed = Duration::ZERO;
        self.state = TimerState::Running;
    }

    /// Freezes the elapsed time.
    pub fn stop(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Stopped;
        }
    }

    /// Accumulates simulated time while running.
    pub fn advance(&mut self, dt: Duration) {
        if self.state == TimerState::Running {
            self.elapsed = self.elapsed.saturating_add(dt);
        }
    }

    /// Time accumulated since the last start, up to the stop if stopped.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Stopwatch over a bounded window, used to display time left in a cooldown.
///
/// The countdown does not enforce expiry. Whoever started it decides when
/// the window is over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountdownTimer {
    timer: Timer,
    duration: Duration,
}

impl CountdownTimer {
    /// Creates a countdown that has not been started.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timer: Timer::new(),
            duration: Duration::ZERO,
        }
    }

    /// Starts a new window of the provided length.
    pub fn start(&mut self, duration: Duration) {
        self.duration = duration;
        self.timer.start();
    }

    /// Freezes the countdown.
    pub fn stop(&mut self) {
        self.timer.stop();
    }

    /// Accumulates simulated time while running.
    pub fn advance(&mut self, dt: Duration) {
        self.timer.advance(dt);
    }

    /// Time accumulated since the window started.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    /// Length of the current window.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Time left in the window, never below zero.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.timer.elapsed())
    }
}
