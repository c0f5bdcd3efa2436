//! Slave devices and the address bus that routes to them.

/// Address-range router.
pub mod bus;
/// Random-access memory slave.
pub mod ram;

use std::cell::RefCell;
use std::rc::Rc;

pub use bus::{Binding, Bus};
pub use ram::Ram;

use crate::{Address, BusError, RegisterValue};

/// Device that can be mapped onto the bus and accessed by local offset.
///
/// Offsets are always relative to the start of the range the slave was
/// attached at; a slave never sees global addresses.
pub trait Slave {
    /// Reads the cell at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::OffsetOutOfBounds`] when `offset` is past the end
    /// of the device.
    fn read(&mut self, offset: Address) -> Result<RegisterValue, BusError>;

    /// Writes `value` to the cell at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::OffsetOutOfBounds`] when `offset` is past the end
    /// of the device.
    fn write(&mut self, offset: Address, value: RegisterValue) -> Result<(), BusError>;
}

/// Shared handle so a host can keep inspecting a slave after attaching it.
impl<S: Slave + ?Sized> Slave for Rc<RefCell<S>> {
    fn read(&mut self, offset: Address) -> Result<RegisterValue, BusError> {
        self.borrow_mut().read(offset)
    }

    fn write(&mut self, offset: Address, value: RegisterValue) -> Result<(), BusError> {
        self.borrow_mut().write(offset, value)
    }
}
