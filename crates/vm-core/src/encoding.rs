use std::fmt;

use crate::RegisterValue;

/// Number of opcodes in the instruction set.
pub const OPCODE_COUNT: usize = 16;

/// Closed set of opcodes; discriminants are the encoded opcode cell values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Opcode {
    /// No operation.
    Noop = 0x00,
    /// `Acc = [Arg0]`.
    Ld = 0x01,
    /// `[Arg0] = Acc`.
    St = 0x02,
    /// `Acc = Acc + [Arg0]`.
    Add = 0x03,
    /// `Acc = -Acc`.
    Neg = 0x04,
    /// `Acc = Acc * [Arg0]`.
    Mul = 0x05,
    /// `Acc = trunc(Acc / [Arg0])`.
    Div = 0x06,
    /// `Acc = Acc == [Arg0]`.
    Eq = 0x07,
    /// `Acc = Acc > [Arg0]`.
    Gt = 0x08,
    /// `Acc = Acc == 0`.
    Not = 0x09,
    /// `Acc = Acc != 0 && [Arg0] != 0`.
    And = 0x0A,
    /// `Acc = Acc != 0 || [Arg0] != 0`.
    Or = 0x0B,
    /// `IA = Arg0`.
    Jmp = 0x0C,
    /// `IA = Arg0` when `Acc != 0`.
    Jif = 0x0D,
    /// `Acc = trunc(sqrt(Acc))`.
    Sqrt = 0xE1,
    /// Raise the halt signal.
    Halt = 0xFF,
}

impl Opcode {
    /// All opcodes in instruction-table order.
    pub const ALL: [Self; OPCODE_COUNT] = [
        Self::Noop,
        Self::Ld,
        Self::St,
        Self::Add,
        Self::Neg,
        Self::Mul,
        Self::Div,
        Self::Eq,
        Self::Gt,
        Self::Not,
        Self::And,
        Self::Or,
        Self::Jmp,
        Self::Jif,
        Self::Sqrt,
        Self::Halt,
    ];

    /// Returns the encoded opcode byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decodes an opcode byte; unassigned values yield `None`.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Noop),
            0x01 => Some(Self::Ld),
            0x02 => Some(Self::St),
            0x03 => Some(Self::Add),
            0x04 => Some(Self::Neg),
            0x05 => Some(Self::Mul),
            0x06 => Some(Self::Div),
            0x07 => Some(Self::Eq),
            0x08 => Some(Self::Gt),
            0x09 => Some(Self::Not),
            0x0A => Some(Self::And),
            0x0B => Some(Self::Or),
            0x0C => Some(Self::Jmp),
            0x0D => Some(Self::Jif),
            0xE1 => Some(Self::Sqrt),
            0xFF => Some(Self::Halt),
            _ => None,
        }
    }

    /// Decodes an opcode register value.
    ///
    /// Negative values and values above one byte are never opcodes.
    #[must_use]
    pub fn from_value(value: RegisterValue) -> Option<Self> {
        u8::try_from(value.get()).ok().and_then(Self::from_u8)
    }

    /// Number of operand cells that follow the opcode.
    #[must_use]
    pub const fn operand_count(self) -> u8 {
        match self {
            Self::Noop | Self::Neg | Self::Not | Self::Sqrt | Self::Halt => 0,
            Self::Ld
            | Self::St
            | Self::Add
            | Self::Mul
            | Self::Div
            | Self::Eq
            | Self::Gt
            | Self::And
            | Self::Or
            | Self::Jmp
            | Self::Jif => 1,
        }
    }

    /// Position of this opcode in [`Self::ALL`] and the instruction table.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Sqrt => 14,
            Self::Halt => 15,
            other => other as usize,
        }
    }

    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Noop => "NOOP",
            Self::Ld => "LD",
            Self::St => "ST",
            Self::Add => "ADD",
            Self::Neg => "NEG",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Eq => "EQ",
            Self::Gt => "GT",
            Self::Not => "NOT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Jmp => "JMP",
            Self::Jif => "JIF",
            Self::Sqrt => "SQRT",
            Self::Halt => "HALT",
        }
    }
}

impl From<Opcode> for i64 {
    fn from(opcode: Opcode) -> Self {
        Self::from(opcode.as_u8())
    }
}

impl From<Opcode> for RegisterValue {
    fn from(opcode: Opcode) -> Self {
        Self::from(i16::from(opcode.as_u8()))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;
    use rstest::rstest;

    use super::{Opcode, OPCODE_COUNT};
    use crate::RegisterValue;

    #[test]
    fn opcode_bytes_roundtrip_for_every_assigned_value() {
        for opcode in Opcode::ALL {
            assert_eq!(Opcode::from_u8(opcode.as_u8()), Some(opcode));
        }
    }

    #[test]
    fn opcode_values_and_indices_are_unique() {
        let values: HashSet<_> = Opcode::ALL.iter().map(|op| op.as_u8()).collect();
        let indices: HashSet<_> = Opcode::ALL.iter().map(|op| op.index()).collect();
        assert_eq!(values.len(), OPCODE_COUNT);
        assert_eq!(indices, (0..Opcode::ALL.len()).collect());
    }

    #[test]
    fn all_lists_opcodes_in_index_order() {
        for (index, opcode) in Opcode::ALL.iter().enumerate() {
            assert_eq!(opcode.index(), index);
        }
    }

    #[rstest]
    #[case(Opcode::Noop, 0)]
    #[case(Opcode::Ld, 1)]
    #[case(Opcode::St, 1)]
    #[case(Opcode::Neg, 0)]
    #[case(Opcode::Jmp, 1)]
    #[case(Opcode::Jif, 1)]
    #[case(Opcode::Sqrt, 0)]
    #[case(Opcode::Halt, 0)]
    fn operand_counts_match_instruction_set(#[case] opcode: Opcode, #[case] operands: u8) {
        assert_eq!(opcode.operand_count(), operands);
    }

    #[rstest]
    #[case(0x0E)]
    #[case(0x10)]
    #[case(0xE0)]
    #[case(0xFE)]
    fn unassigned_bytes_do_not_decode(#[case] value: u8) {
        assert_eq!(Opcode::from_u8(value), None);
    }

    #[test]
    fn out_of_byte_values_are_never_opcodes() {
        assert_eq!(Opcode::from_value(RegisterValue::new(-1)), None);
        assert_eq!(Opcode::from_value(RegisterValue::new(0x1FF)), None);
        assert_eq!(
            Opcode::from_value(RegisterValue::new(0xE1)),
            Some(Opcode::Sqrt)
        );
    }

    proptest! {
        #[test]
        fn only_assigned_values_decode(raw in any::<i16>()) {
            let decoded = Opcode::from_value(RegisterValue::new(raw));
            let assigned = Opcode::ALL.iter().find(|op| i16::from(op.as_u8()) == raw).copied();
            prop_assert_eq!(decoded, assigned);
        }
    }
}
