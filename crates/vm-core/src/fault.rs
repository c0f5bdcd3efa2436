use thiserror::Error;

use crate::{Address, AddressRange, RegisterValue};

/// Interrupt classes used for reporting and run-loop policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum InterruptClass {
    /// Control signal that ends a run cleanly.
    Control,
    /// Decode stage rejected the fetched opcode.
    Decode,
    /// Bus or slave refused an access.
    Memory,
}

/// Address-space routing and slave access failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BusError {
    /// No attached range covers the address.
    #[error("address {addr:#06x} is not mapped to any slave")]
    Unmapped {
        /// Global address of the access.
        addr: Address,
    },
    /// A slave was accessed past its capacity.
    #[error("local offset {offset:#06x} is outside slave capacity {len}")]
    OffsetOutOfBounds {
        /// Slave-local offset of the access.
        offset: Address,
        /// Capacity of the slave in cells.
        len: usize,
    },
    /// Range bounds are inverted or exceed the address space.
    #[error("invalid address range [{start:#x}, {end:#x})")]
    InvalidRange {
        /// Requested inclusive start.
        start: u32,
        /// Requested exclusive end.
        end: u32,
    },
    /// A new binding would shadow part of an existing one.
    #[error("range {requested} overlaps attached range {existing}")]
    Overlap {
        /// Range already attached to the bus.
        existing: AddressRange,
        /// Range rejected by the attach call.
        requested: AddressRange,
    },
}

/// Hardware-interrupt family raised by the instruction cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Interrupt {
    /// Decode found no handler for the fetched opcode value.
    #[error("invalid instruction {opcode:#06x} at {ia:#06x}")]
    InvalidInstruction {
        /// Address the opcode was fetched from.
        ia: Address,
        /// Raw opcode cell value.
        opcode: RegisterValue,
    },
    /// Raised by `Halt`; a clean stop rather than a fault.
    #[error("execution halted")]
    HaltExecution,
    /// A fetch, operand read, or handler access failed on the bus.
    #[error(transparent)]
    Bus(#[from] BusError),
}

impl Interrupt {
    /// Returns the reporting class for this interrupt.
    #[must_use]
    pub const fn class(self) -> InterruptClass {
        match self {
            Self::HaltExecution => InterruptClass::Control,
            Self::InvalidInstruction { .. } => InterruptClass::Decode,
            Self::Bus(_) => InterruptClass::Memory,
        }
    }

    /// Faults stop the machine until reset; the halt signal does not.
    #[must_use]
    pub const fn is_fault(self) -> bool {
        !matches!(self, Self::HaltExecution)
    }
}

#[cfg(test)]
mod tests {
    use super::{BusError, Interrupt, InterruptClass};
    use crate::RegisterValue;

    #[test]
    fn halt_is_the_only_non_fault() {
        assert!(!Interrupt::HaltExecution.is_fault());
        assert!(Interrupt::InvalidInstruction {
            ia: 0,
            opcode: RegisterValue::new(0x42),
        }
        .is_fault());
        assert!(Interrupt::Bus(BusError::Unmapped { addr: 0x100 }).is_fault());
    }

    #[test]
    fn class_mapping_matches_interrupt_taxonomy() {
        assert_eq!(
            Interrupt::HaltExecution.class(),
            InterruptClass::Control
        );
        assert_eq!(
            Interrupt::InvalidInstruction {
                ia: 3,
                opcode: RegisterValue::new(0x10),
            }
            .class(),
            InterruptClass::Decode
        );
        assert_eq!(
            Interrupt::from(BusError::OffsetOutOfBounds { offset: 9, len: 8 }).class(),
            InterruptClass::Memory
        );
    }

    #[test]
    fn invalid_instruction_reports_address_and_opcode() {
        let message = Interrupt::InvalidInstruction {
            ia: 0x0012,
            opcode: RegisterValue::new(0x42),
        }
        .to_string();
        assert_eq!(message, "invalid instruction 0x0042 at 0x0012");
    }

    #[test]
    fn bus_errors_display_transparently() {
        let message = Interrupt::from(BusError::Unmapped { addr: 0x0400 }).to_string();
        assert_eq!(message, "address 0x0400 is not mapped to any slave");
    }
}
