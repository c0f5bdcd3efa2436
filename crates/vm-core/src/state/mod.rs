//! CPU register file and instruction-cycle stage machine.

/// Architectural register file.
pub mod registers;

pub use registers::Registers;

use crate::{Address, Opcode, RegisterValue};

/// Position inside one instruction cycle.
///
/// Each variant names the stage the next call to `step` will perform. A
/// cycle always starts and ends at [`CycleStage::AwaitingFetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CycleStage {
    /// Next step reads the opcode at `IA`.
    #[default]
    AwaitingFetch,
    /// Next step maps `OC` to an instruction.
    AwaitingDecode,
    /// Next step reads the operand address at `IA`.
    AwaitingOperand,
    /// Next step runs the instruction handler.
    AwaitingExecute,
}

impl CycleStage {
    /// Returns `true` between cycles.
    #[must_use]
    pub const fn is_cycle_boundary(self) -> bool {
        matches!(self, Self::AwaitingFetch)
    }
}

/// What a single stage step did, for tracing and single-stepping tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StageEvent {
    /// Opcode cell read from memory.
    Fetched {
        /// Address the opcode was read from.
        ia: Address,
        /// Raw opcode cell.
        opcode: RegisterValue,
    },
    /// Opcode resolved to an instruction.
    Decoded {
        /// Decoded opcode.
        opcode: Opcode,
        /// Operand cells the instruction consumes.
        operands: u8,
    },
    /// Operand address read into `Arg0`.
    OperandFetched {
        /// New `Arg0` value.
        arg0: Address,
    },
    /// Handler ran and the cycle completed.
    Executed {
        /// Opcode whose handler ran.
        opcode: Opcode,
    },
}
