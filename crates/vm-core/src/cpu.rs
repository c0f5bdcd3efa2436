//! Steppable fetch/decode/operand/execute engine.

use crate::execute::{decode, Instruction};
use crate::{Bus, CycleStage, Interrupt, Registers, StageEvent};

/// Accumulator CPU driving one instruction cycle as four discrete stages.
///
/// [`Cpu::step`] advances exactly one stage so tools can trace or
/// single-step a cycle; [`Cpu::cycle`] drains the stages of the current
/// cycle. A fault is latched: every later step reports the same fault until
/// [`Cpu::reset`].
#[derive(Debug, Clone, Default)]
pub struct Cpu {
    regs: Registers,
    stage: CycleStage,
    decoded: Option<Instruction>,
    latched_fault: Option<Interrupt>,
}

impl Cpu {
    /// Creates a CPU with zeroed registers, waiting to fetch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the register file.
    #[must_use]
    pub const fn registers(&self) -> Registers {
        self.regs
    }

    /// Mutable access to the register file, for tests and debuggers.
    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    /// Stage the next [`Cpu::step`] will perform.
    #[must_use]
    pub const fn stage(&self) -> CycleStage {
        self.stage
    }

    /// Fault latched by an earlier step, if any.
    #[must_use]
    pub const fn latched_fault(&self) -> Option<Interrupt> {
        self.latched_fault
    }

    /// Zeroes all registers, clears any latched fault, and returns to fetch.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Performs the next stage of the current instruction cycle.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupt::InvalidInstruction`] when decode finds no handler,
    /// [`Interrupt::Bus`] when a memory access fails, and
    /// [`Interrupt::HaltExecution`] when `Halt` executes. Faults are latched;
    /// the halt signal leaves the CPU ready to fetch the next instruction.
    pub fn step(&mut self, bus: &mut Bus) -> Result<StageEvent, Interrupt> {
        if let Some(fault) = self.latched_fault {
            return Err(fault);
        }

        let result = match self.stage {
            CycleStage::AwaitingFetch => self.fetch(bus),
            CycleStage::AwaitingDecode => self.decode_opcode(),
            CycleStage::AwaitingOperand => self.fetch_operand(bus),
            CycleStage::AwaitingExecute => self.execute(bus),
        };

        match result {
            Ok(event) => {
                tracing::trace!(?event, registers = ?self.regs, "stage complete");
            }
            Err(interrupt) if interrupt.is_fault() => {
                self.latched_fault = Some(interrupt);
            }
            Err(_) => {}
        }

        result
    }

    /// Runs stages until the current instruction cycle completes.
    ///
    /// Called between cycles this executes one whole instruction; called
    /// mid-cycle it finishes the remaining stages only.
    ///
    /// # Errors
    ///
    /// Propagates the first interrupt raised by [`Cpu::step`].
    pub fn cycle(&mut self, bus: &mut Bus) -> Result<(), Interrupt> {
        loop {
            self.step(bus)?;
            if self.stage.is_cycle_boundary() {
                return Ok(());
            }
        }
    }

    fn fetch(&mut self, bus: &mut Bus) -> Result<StageEvent, Interrupt> {
        let ia = self.regs.ia();
        let opcode = bus.read(ia)?;
        self.regs.set_oc(opcode);
        self.regs.advance_ia();
        self.stage = CycleStage::AwaitingDecode;
        Ok(StageEvent::Fetched { ia, opcode })
    }

    fn decode_opcode(&mut self) -> Result<StageEvent, Interrupt> {
        let opcode = self.regs.oc();
        let instruction = decode(opcode).ok_or(Interrupt::InvalidInstruction {
            ia: self.regs.ia().wrapping_sub(1),
            opcode,
        })?;

        self.decoded = Some(instruction);
        self.stage = if instruction.operands > 0 {
            CycleStage::AwaitingOperand
        } else {
            CycleStage::AwaitingExecute
        };
        Ok(StageEvent::Decoded {
            opcode: instruction.opcode,
            operands: instruction.operands,
        })
    }

    fn fetch_operand(&mut self, bus: &mut Bus) -> Result<StageEvent, Interrupt> {
        let arg0 = bus.read(self.regs.ia())?.as_address();
        self.regs.set_arg0(arg0);
        self.regs.advance_ia();
        self.stage = CycleStage::AwaitingExecute;
        Ok(StageEvent::OperandFetched { arg0 })
    }

    fn execute(&mut self, bus: &mut Bus) -> Result<StageEvent, Interrupt> {
        let instruction = self.decoded.take().ok_or(Interrupt::InvalidInstruction {
            ia: self.regs.ia(),
            opcode: self.regs.oc(),
        })?;
        self.stage = CycleStage::AwaitingFetch;
        (instruction.handler)(&mut self.regs, bus)?;
        Ok(StageEvent::Executed {
            opcode: instruction.opcode,
        })
    }
}
