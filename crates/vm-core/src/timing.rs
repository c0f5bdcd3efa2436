//! Real-time pacing for throttled runs.

use std::thread;
use std::time::{Duration, Instant};

use crate::VmError;

/// Result of pacing one cycle against its period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pace {
    /// The cycle finished early; the thread slept for the remainder.
    OnTime,
    /// The cycle took longer than its period; nothing was slept.
    Overrun {
        /// Time spent beyond the period.
        by: Duration,
    },
}

impl Pace {
    /// Returns `true` when the cycle exceeded its budget.
    #[must_use]
    pub const fn is_overrun(self) -> bool {
        matches!(self, Self::Overrun { .. })
    }
}

/// Best-effort clock that stretches each cycle to a fixed period.
///
/// Overruns are reported but never caught up on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throttle {
    frequency: f64,
    period: Duration,
}

impl Throttle {
    /// Builds a throttle for `frequency` cycles per second.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::InvalidFrequency`] when `frequency` is not finite
    /// or not strictly positive.
    pub fn new(frequency: f64) -> Result<Self, VmError> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(VmError::InvalidFrequency { frequency });
        }
        let period = Duration::try_from_secs_f64(frequency.recip())
            .map_err(|_| VmError::InvalidFrequency { frequency })?;
        Ok(Self { frequency, period })
    }

    /// Requested cycles per second.
    #[must_use]
    pub const fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Wall-clock budget for one cycle.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Sleeps out the rest of the period for a cycle that began at `started`.
    pub fn pace(&self, started: Instant) -> Pace {
        let spent = started.elapsed();
        match self.period.checked_sub(spent) {
            Some(remaining) => {
                if !remaining.is_zero() {
                    thread::sleep(remaining);
                }
                Pace::OnTime
            }
            None => Pace::Overrun {
                by: spent.saturating_sub(self.period),
            },
        }
    }
}

/// Cycles per second achieved over `elapsed`, or zero for an empty interval.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn achieved_frequency(cycles: u64, elapsed: Duration) -> f64 {
    let seconds = elapsed.as_secs_f64();
    if seconds > 0.0 {
        cycles as f64 / seconds
    } else {
        0.0
    }
}
