//! Host-facing configuration, run outcomes and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::timing::achieved_frequency;
use crate::{BusError, Interrupt};

/// RAM cells attached when no size is configured.
pub const DEFAULT_RAM_CELLS: usize = 1024;

/// Construction-time configuration for a [`crate::Vm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct VmConfig {
    /// RAM capacity in cells, mapped at `[0, ram_size)`.
    pub ram_size: usize,
    /// Upper bound on full cycles executed by a single `run` call.
    pub cycle_limit: Option<u64>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            ram_size: DEFAULT_RAM_CELLS,
            cycle_limit: None,
        }
    }
}

/// Errors returned by VM construction, loading and running.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum VmError {
    /// RAM plus peripherals do not fit in the address space.
    #[error("memory layout needs {required} cells but the address space holds {available}")]
    AddressSpaceExhausted {
        /// Cells the layout asked for.
        required: u64,
        /// Cells the address space provides.
        available: u32,
    },
    /// Program image is longer than the attached RAM.
    #[error("program of {len} cells does not fit in {ram_size} cells of RAM")]
    ProgramTooLarge {
        /// Program length in cells.
        len: usize,
        /// RAM capacity in cells.
        ram_size: usize,
    },
    /// Throttle frequency is not finite and positive.
    #[error("invalid throttle frequency {frequency}")]
    InvalidFrequency {
        /// Rejected frequency in cycles per second.
        frequency: f64,
    },
    /// Bus layout or direct access failed.
    #[error(transparent)]
    Bus(#[from] BusError),
    /// Execution raised a fault.
    #[error("execution fault: {0}")]
    Interrupt(#[from] Interrupt),
}

/// Why a `run` call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StopReason {
    /// The program executed `Halt`.
    Halted,
    /// A [`StopHandle`] requested cancellation.
    Stopped,
    /// The configured cycle limit was reached.
    CycleLimit,
}

/// Summary of one completed `run` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOutcome {
    /// Full instruction cycles executed, including the halting one.
    pub cycles: u64,
    /// Why the run ended.
    pub reason: StopReason,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Throttled cycles that exceeded their period.
    pub overruns: u64,
}

impl RunOutcome {
    /// Cycles per second achieved during the run.
    #[must_use]
    pub fn achieved_frequency(&self) -> f64 {
        achieved_frequency(self.cycles, self.elapsed)
    }
}

/// Cloneable, thread-safe cancellation flag for a running VM.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    /// Asks the run loop to return before its next cycle.
    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Returns `true` while a stop request is pending.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Consumes a pending request, returning whether one was set.
    pub(crate) fn take(&self) -> bool {
        self.requested.swap(false, Ordering::AcqRel)
    }
}
