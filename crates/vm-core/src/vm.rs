//! Composition root: wires RAM and peripherals onto a bus and drives the CPU.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::timing::{achieved_frequency, Pace, Throttle};
use crate::{
    Address, AddressRange, Bus, BusError, Cpu, CycleStage, Interrupt, Ram, RegisterValue,
    Registers, RunOutcome, Slave, StageEvent, StopHandle, StopReason, VmConfig, VmError,
    ADDRESS_SPACE_CELLS,
};

/// Peripheral to map after RAM: its size in cells and the device itself.
pub type Peripheral = (usize, Box<dyn Slave>);

/// A complete machine: bus, RAM, optional peripherals and one CPU.
///
/// RAM always sits at `[0, ram_size)`. Peripherals follow it back to back in
/// the order they were supplied, so the same inputs always give the same
/// memory map.
#[derive(Debug)]
pub struct Vm {
    bus: Bus,
    cpu: Cpu,
    ram: Rc<RefCell<Ram>>,
    config: VmConfig,
    stop: StopHandle,
}

impl Vm {
    /// Builds a machine with `ram_size` cells of RAM and default settings.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::AddressSpaceExhausted`] when RAM plus peripherals
    /// need more cells than the address space holds.
    pub fn new(
        ram_size: usize,
        peripherals: impl IntoIterator<Item = Peripheral>,
    ) -> Result<Self, VmError> {
        Self::with_config(
            VmConfig {
                ram_size,
                ..VmConfig::default()
            },
            peripherals,
        )
    }

    /// Builds a machine from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::AddressSpaceExhausted`] when RAM plus peripherals
    /// need more cells than the address space holds.
    pub fn with_config(
        config: VmConfig,
        peripherals: impl IntoIterator<Item = Peripheral>,
    ) -> Result<Self, VmError> {
        let peripherals: Vec<Peripheral> = peripherals.into_iter().collect();

        let required = peripherals
            .iter()
            .map(|(size, _)| cells_u64(*size))
            .fold(cells_u64(config.ram_size), u64::saturating_add);
        if required > u64::from(ADDRESS_SPACE_CELLS) {
            return Err(VmError::AddressSpaceExhausted {
                required,
                available: ADDRESS_SPACE_CELLS,
            });
        }

        let ram = Rc::new(RefCell::new(Ram::new(config.ram_size)));
        let mut bus = Bus::new();
        let ram_range = AddressRange::with_len(0, config.ram_size)?;
        bus.attach(ram_range, Box::new(Rc::clone(&ram)))?;

        let mut next = ram_range.end();
        for (size, slave) in peripherals {
            let range = AddressRange::with_len(next, size)?;
            bus.attach(range, slave)?;
            next = range.end();
        }

        Ok(Self {
            bus,
            cpu: Cpu::new(),
            ram,
            config,
            stop: StopHandle::default(),
        })
    }

    /// Configuration the machine was built with.
    #[must_use]
    pub const fn config(&self) -> &VmConfig {
        &self.config
    }

    /// RAM capacity in cells.
    #[must_use]
    pub const fn ram_size(&self) -> usize {
        self.config.ram_size
    }

    /// Bus with its bindings, for inspecting the memory map.
    #[must_use]
    pub const fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Handle that can cancel [`Vm::run`] from another thread.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Writes a program image into RAM starting at address zero.
    ///
    /// Each cell is narrowed to a register value with wrapping semantics.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::ProgramTooLarge`] when the image is longer than RAM;
    /// RAM is left untouched in that case.
    pub fn load_program(&mut self, cells: &[i64]) -> Result<(), VmError> {
        if cells.len() > self.config.ram_size {
            return Err(VmError::ProgramTooLarge {
                len: cells.len(),
                ram_size: self.config.ram_size,
            });
        }
        let image: Vec<RegisterValue> = cells
            .iter()
            .copied()
            .map(RegisterValue::from_int)
            .collect();
        self.ram.borrow_mut().load(&image)?;
        debug!(cells = image.len(), "program loaded");
        Ok(())
    }

    /// Zeroes RAM and the CPU; peripherals keep their state.
    pub fn reset(&mut self) {
        self.ram.borrow_mut().clear();
        self.cpu.reset();
        debug!(ram_cells = self.config.ram_size, "machine reset");
    }

    /// Snapshot of the CPU registers.
    #[must_use]
    pub const fn registers(&self) -> Registers {
        self.cpu.registers()
    }

    /// Stage the next [`Vm::step`] will perform.
    #[must_use]
    pub const fn stage(&self) -> CycleStage {
        self.cpu.stage()
    }

    /// Fault latched by the CPU, if any.
    #[must_use]
    pub const fn latched_fault(&self) -> Option<Interrupt> {
        self.cpu.latched_fault()
    }

    /// Reads a global address through the bus.
    ///
    /// # Errors
    ///
    /// Returns the routing or slave error for the access.
    pub fn read(&mut self, addr: Address) -> Result<RegisterValue, BusError> {
        self.bus.read(addr)
    }

    /// Writes a global address through the bus.
    ///
    /// # Errors
    ///
    /// Returns the routing or slave error for the access.
    pub fn write(&mut self, addr: Address, value: RegisterValue) -> Result<(), BusError> {
        self.bus.write(addr, value)
    }

    /// Advances the CPU by one stage.
    ///
    /// # Errors
    ///
    /// See [`Cpu::step`].
    pub fn step(&mut self) -> Result<StageEvent, Interrupt> {
        self.cpu.step(&mut self.bus)
    }

    /// Completes the current instruction cycle.
    ///
    /// # Errors
    ///
    /// See [`Cpu::cycle`]; a `Halt` surfaces here as
    /// [`Interrupt::HaltExecution`].
    pub fn cycle(&mut self) -> Result<(), Interrupt> {
        self.cpu.cycle(&mut self.bus)
    }

    /// Runs cycles until the program halts, a stop is requested, or the
    /// configured cycle limit is reached.
    ///
    /// With `Some(frequency)` every cycle is stretched to `1 / frequency`
    /// seconds; cycles that overrun are counted and never caught up on. With
    /// `None` cycles run back to back.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::InvalidFrequency`] before executing anything when
    /// `frequency` is unusable, and [`VmError::Interrupt`] for a decode or bus
    /// fault. A fault stays latched until [`Vm::reset`].
    pub fn run(&mut self, frequency: Option<f64>) -> Result<RunOutcome, VmError> {
        let throttle = frequency.map(Throttle::new).transpose()?;
        let started = Instant::now();
        let mut cycles = 0_u64;
        let mut overruns = 0_u64;

        let reason = loop {
            if self.stop.take() {
                break StopReason::Stopped;
            }
            if self.config.cycle_limit.is_some_and(|limit| cycles >= limit) {
                break StopReason::CycleLimit;
            }

            let cycle_started = Instant::now();
            match self.cpu.cycle(&mut self.bus) {
                Ok(()) => cycles += 1,
                Err(Interrupt::HaltExecution) => {
                    cycles += 1;
                    break StopReason::Halted;
                }
                Err(fault) => {
                    self.report_fault(fault);
                    return Err(fault.into());
                }
            }

            if let Some(throttle) = &throttle {
                if let Pace::Overrun { by } = throttle.pace(cycle_started) {
                    overruns += 1;
                    if overruns == 1 {
                        warn!(
                            requested_hz = throttle.frequency(),
                            achieved_hz = achieved_frequency(cycles, started.elapsed()),
                            overrun_ns = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX),
                            "cycle overran its period"
                        );
                    }
                }
            }
        };

        let outcome = RunOutcome {
            cycles,
            reason,
            elapsed: started.elapsed(),
            overruns,
        };
        info!(
            ?reason,
            cycles,
            overruns,
            ia = self.cpu.registers().ia(),
            achieved_hz = outcome.achieved_frequency(),
            "run finished"
        );
        Ok(outcome)
    }

    fn report_fault(&self, fault: Interrupt) {
        let regs = self.cpu.registers();
        match fault {
            Interrupt::InvalidInstruction { ia, opcode } => {
                error!(ia, opcode = opcode.get(), class = ?fault.class(), "invalid instruction");
            }
            Interrupt::Bus(bus_error) => {
                error!(
                    ia = regs.ia(),
                    opcode = regs.oc().get(),
                    class = ?fault.class(),
                    error = %bus_error,
                    "bus fault"
                );
            }
            Interrupt::HaltExecution => {}
        }
    }
}

fn cells_u64(cells: usize) -> u64 {
    u64::try_from(cells).unwrap_or(u64::MAX)
}
