//! Reading session stopwatch
//!
//! An in-process timer with pause/resume. It owns no persisted state:
//! callers take the value returned by [`Timer::stop`] and record it via
//! [`Database::add_reading_session`](crate::db::Database::add_reading_session).

use crate::error::{Error, Result};
use std::time::{Duration, Instant};

/// Where the timer currently is in its start/pause/resume/stop cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum TimerState {
    /// Not measuring; the accumulator may still hold a finished total
    #[default]
    Idle,
    /// Actively measuring since `started`
    Running { started: Instant },
    /// Measurement frozen; elapsed time does not advance
    Paused,
}

impl TimerState {
    fn name(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running { .. } => "running",
            TimerState::Paused => "paused",
        }
    }
}

/// Elapsed-time tracker with pause/resume semantics.
///
/// Transitions from a state that does not permit them return
/// [`Error::InvalidState`]; in particular `start()` on a timer that is
/// already running or paused is rejected rather than resetting, so an
/// accidental double start can never discard accumulated time.
#[derive(Debug, Default)]
pub struct Timer {
    state: TimerState,
    accumulated: Duration,
}

impl Timer {
    /// Create an idle timer with nothing accumulated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin measuring. Valid only from idle.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            TimerState::Idle => {
                self.accumulated = Duration::ZERO;
                self.state = TimerState::Running {
                    started: Instant::now(),
                };
                Ok(())
            }
            state => Err(Error::InvalidState {
                op: "start",
                state: state.name(),
            }),
        }
    }

    /// Freeze the elapsed total. Valid only while running.
    pub fn pause(&mut self) -> Result<()> {
        match self.state {
            TimerState::Running { started } => {
                self.accumulated += started.elapsed();
                self.state = TimerState::Paused;
                Ok(())
            }
            state => Err(Error::InvalidState {
                op: "pause",
                state: state.name(),
            }),
        }
    }

    /// Continue measuring after a pause. The paused interval is excluded.
    pub fn resume(&mut self) -> Result<()> {
        match self.state {
            TimerState::Paused => {
                self.state = TimerState::Running {
                    started: Instant::now(),
                };
                Ok(())
            }
            state => Err(Error::InvalidState {
                op: "resume",
                state: state.name(),
            }),
        }
    }

    /// Finish measuring and return the total elapsed seconds.
    ///
    /// Valid from running or paused; the timer goes back to idle with its
    /// accumulator cleared, ready for the next session.
    pub fn stop(&mut self) -> Result<f64> {
        match self.state {
            TimerState::Running { started } => {
                self.accumulated += started.elapsed();
            }
            TimerState::Paused => {}
            state => {
                return Err(Error::InvalidState {
                    op: "stop",
                    state: state.name(),
                })
            }
        }
        let elapsed = self.accumulated.as_secs_f64();
        self.accumulated = Duration::ZERO;
        self.state = TimerState::Idle;
        Ok(elapsed)
    }

    /// Discard any in-progress measurement and go back to idle.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.state = TimerState::Idle;
    }

    /// Elapsed seconds so far: the accumulated total plus, while running,
    /// the live in-flight interval. Stable while paused; `0.0` when idle.
    pub fn elapsed_secs(&self) -> f64 {
        let live = match self.state {
            TimerState::Running { started } => started.elapsed(),
            _ => Duration::ZERO,
        };
        (self.accumulated + live).as_secs_f64()
    }

    /// True while the timer is actively measuring.
    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }
}
