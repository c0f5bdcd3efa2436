//! Cycle-level accumulator machine: CPU, address bus, RAM and a throttled
//! run loop.

/// Register values, addresses and address ranges.
pub mod value;
pub use value::{Address, AddressRange, RegisterValue, ADDRESS_SPACE_CELLS};

/// Interrupt taxonomy and bus errors.
pub mod fault;
pub use fault::{BusError, Interrupt, InterruptClass};

/// Slave capability, the bus router and RAM.
pub mod memory;
pub use memory::{Binding, Bus, Ram, Slave};

/// Closed opcode set and operand counts.
pub mod encoding;
pub use encoding::{Opcode, OPCODE_COUNT};

/// Register file and cycle-stage machine.
pub mod state;
pub use state::{CycleStage, Registers, StageEvent};

/// Instruction handlers and the static instruction table.
pub mod execute;
pub use execute::{decode, Handler, Instruction, INSTRUCTION_TABLE};

/// Steppable fetch/decode/operand/execute engine.
pub mod cpu;
pub use cpu::Cpu;

/// Throttled clock for paced runs.
pub mod timing;
pub use timing::{Pace, Throttle};

/// Configuration, run outcomes and cancellation.
pub mod api;
pub use api::{RunOutcome, StopHandle, StopReason, VmConfig, VmError, DEFAULT_RAM_CELLS};

/// Machine composition and run loop.
pub mod vm;
pub use vm::{Peripheral, Vm};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
