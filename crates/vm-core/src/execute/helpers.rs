//! Operand access helpers shared by instruction handlers.

use crate::{Bus, Interrupt, RegisterValue, Registers};

/// Dereferences `Arg0` through the bus to get the operand value.
pub(super) fn operand(regs: &Registers, bus: &mut Bus) -> Result<RegisterValue, Interrupt> {
    Ok(bus.read(regs.arg0())?)
}

/// Combines `Acc` with the dereferenced operand and stores the result in `Acc`.
pub(super) fn combine_operand(
    regs: &mut Registers,
    bus: &mut Bus,
    op: impl FnOnce(RegisterValue, RegisterValue) -> RegisterValue,
) -> Result<(), Interrupt> {
    let value = operand(regs, bus)?;
    regs.set_acc(op(regs.acc(), value));
    Ok(())
}

/// Widens a register value for the float-then-truncate instructions.
pub(super) fn as_float(value: RegisterValue) -> f64 {
    f64::from(value.get())
}
