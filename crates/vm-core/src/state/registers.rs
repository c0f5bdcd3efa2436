use crate::{Address, RegisterValue};

/// Architectural register file of the accumulator CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Registers {
    ia: Address,
    oc: RegisterValue,
    arg0: Address,
    acc: RegisterValue,
}

impl Registers {
    /// Reads the instruction address (`IA`).
    #[must_use]
    pub const fn ia(&self) -> Address {
        self.ia
    }

    /// Writes the instruction address (`IA`).
    pub const fn set_ia(&mut self, value: Address) {
        self.ia = value;
    }

    /// Moves `IA` one cell forward, wrapping at the top of the address space.
    pub const fn advance_ia(&mut self) {
        self.ia = self.ia.wrapping_add(1);
    }

    /// Reads the current opcode register (`OC`).
    #[must_use]
    pub const fn oc(&self) -> RegisterValue {
        self.oc
    }

    /// Writes the current opcode register (`OC`).
    pub const fn set_oc(&mut self, value: RegisterValue) {
        self.oc = value;
    }

    /// Reads the operand address register (`Arg0`).
    #[must_use]
    pub const fn arg0(&self) -> Address {
        self.arg0
    }

    /// Writes the operand address register (`Arg0`).
    pub const fn set_arg0(&mut self, value: Address) {
        self.arg0 = value;
    }

    /// Reads the accumulator (`Acc`).
    #[must_use]
    pub const fn acc(&self) -> RegisterValue {
        self.acc
    }

    /// Writes the accumulator (`Acc`).
    pub const fn set_acc(&mut self, value: RegisterValue) {
        self.acc = value;
    }

    /// Returns `true` when all four registers are zero.
    #[must_use]
    pub const fn is_zeroed(&self) -> bool {
        self.ia == 0 && self.oc.is_zero() && self.arg0 == 0 && self.acc.is_zero()
    }
}
