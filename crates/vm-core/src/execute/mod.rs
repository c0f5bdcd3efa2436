//! Instruction handlers and the static opcode table.
//!
//! The table is indexed by [`Opcode::index`] and checked at compile time, so
//! every opcode has exactly one handler and the mapping never changes at
//! runtime. Handlers receive the register file and the bus; `Arg0` has
//! already been loaded when the instruction takes an operand.

#![allow(clippy::unnecessary_wraps)]

mod helpers;

use std::fmt;

use helpers::{as_float, combine_operand, operand};

use crate::{Bus, Interrupt, Opcode, RegisterValue, Registers, OPCODE_COUNT};

/// Signature shared by every instruction handler.
pub type Handler = fn(&mut Registers, &mut Bus) -> Result<(), Interrupt>;

/// One entry of the instruction table.
#[derive(Clone, Copy)]
pub struct Instruction {
    /// Opcode served by this entry.
    pub opcode: Opcode,
    /// Operand cells fetched before the handler runs.
    pub operands: u8,
    /// Execute-stage handler.
    pub handler: Handler,
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("opcode", &self.opcode)
            .field("operands", &self.operands)
            .finish_non_exhaustive()
    }
}

const fn entry(opcode: Opcode, handler: Handler) -> Instruction {
    Instruction {
        opcode,
        operands: opcode.operand_count(),
        handler,
    }
}

/// Opcode to handler mapping, in [`Opcode::ALL`] order.
pub const INSTRUCTION_TABLE: [Instruction; OPCODE_COUNT] = [
    entry(Opcode::Noop, noop),
    entry(Opcode::Ld, ld),
    entry(Opcode::St, st),
    entry(Opcode::Add, add),
    entry(Opcode::Neg, neg),
    entry(Opcode::Mul, mul),
    entry(Opcode::Div, div),
    entry(Opcode::Eq, eq),
    entry(Opcode::Gt, gt),
    entry(Opcode::Not, not),
    entry(Opcode::And, and),
    entry(Opcode::Or, or),
    entry(Opcode::Jmp, jmp),
    entry(Opcode::Jif, jif),
    entry(Opcode::Sqrt, sqrt),
    entry(Opcode::Halt, halt),
];

const _: () = assert_instruction_table_layout();

const fn assert_instruction_table_layout() {
    let mut index = 0;
    while index < OPCODE_COUNT {
        let opcode = INSTRUCTION_TABLE[index].opcode;
        assert!(
            opcode.index() == index,
            "instruction table must be in opcode index order"
        );

        let mut other = index + 1;
        while other < OPCODE_COUNT {
            assert!(
                INSTRUCTION_TABLE[other].opcode.as_u8() != opcode.as_u8(),
                "opcode registered twice"
            );
            other += 1;
        }

        index += 1;
    }
}

/// Looks up the instruction for a fetched opcode cell.
///
/// Returns `None` for any value outside the instruction set.
#[must_use]
pub fn decode(value: RegisterValue) -> Option<Instruction> {
    Opcode::from_value(value).map(|opcode| INSTRUCTION_TABLE[opcode.index()])
}

fn noop(_regs: &mut Registers, _bus: &mut Bus) -> Result<(), Interrupt> {
    Ok(())
}

fn ld(regs: &mut Registers, bus: &mut Bus) -> Result<(), Interrupt> {
    let value = operand(regs, bus)?;
    regs.set_acc(value);
    Ok(())
}

fn st(regs: &mut Registers, bus: &mut Bus) -> Result<(), Interrupt> {
    bus.write(regs.arg0(), regs.acc())?;
    Ok(())
}

fn add(regs: &mut Registers, bus: &mut Bus) -> Result<(), Interrupt> {
    combine_operand(regs, bus, RegisterValue::wrapping_add)
}

fn neg(regs: &mut Registers, _bus: &mut Bus) -> Result<(), Interrupt> {
    regs.set_acc(regs.acc().wrapping_neg());
    Ok(())
}

fn mul(regs: &mut Registers, bus: &mut Bus) -> Result<(), Interrupt> {
    combine_operand(regs, bus, RegisterValue::wrapping_mul)
}

// Float division, so a zero divisor saturates instead of trapping.
fn div(regs: &mut Registers, bus: &mut Bus) -> Result<(), Interrupt> {
    combine_operand(regs, bus, |acc, value| {
        RegisterValue::from_float(as_float(acc) / as_float(value))
    })
}

fn eq(regs: &mut Registers, bus: &mut Bus) -> Result<(), Interrupt> {
    combine_operand(regs, bus, |acc, value| RegisterValue::from_bool(acc == value))
}

fn gt(regs: &mut Registers, bus: &mut Bus) -> Result<(), Interrupt> {
    combine_operand(regs, bus, |acc, value| RegisterValue::from_bool(acc > value))
}

fn not(regs: &mut Registers, _bus: &mut Bus) -> Result<(), Interrupt> {
    regs.set_acc(RegisterValue::from_bool(regs.acc().is_zero()));
    Ok(())
}

fn and(regs: &mut Registers, bus: &mut Bus) -> Result<(), Interrupt> {
    combine_operand(regs, bus, |acc, value| {
        RegisterValue::from_bool(!acc.is_zero() && !value.is_zero())
    })
}

fn or(regs: &mut Registers, bus: &mut Bus) -> Result<(), Interrupt> {
    combine_operand(regs, bus, |acc, value| {
        RegisterValue::from_bool(!acc.is_zero() || !value.is_zero())
    })
}

fn jmp(regs: &mut Registers, _bus: &mut Bus) -> Result<(), Interrupt> {
    regs.set_ia(regs.arg0());
    Ok(())
}

fn jif(regs: &mut Registers, _bus: &mut Bus) -> Result<(), Interrupt> {
    if !regs.acc().is_zero() {
        regs.set_ia(regs.arg0());
    }
    Ok(())
}

fn sqrt(regs: &mut Registers, _bus: &mut Bus) -> Result<(), Interrupt> {
    regs.set_acc(RegisterValue::from_float(as_float(regs.acc()).sqrt()));
    Ok(())
}

fn halt(_regs: &mut Registers, _bus: &mut Bus) -> Result<(), Interrupt> {
    Err(Interrupt::HaltExecution)
}
