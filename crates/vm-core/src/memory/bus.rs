use std::fmt;

use crate::{Address, AddressRange, BusError, RegisterValue, Slave};

/// One `(range, slave)` mapping owned by the bus.
pub struct Binding {
    range: AddressRange,
    slave: Box<dyn Slave>,
}

impl Binding {
    /// Address range served by this binding.
    #[must_use]
    pub const fn range(&self) -> AddressRange {
        self.range
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

/// Routes global addresses to the slave that owns them.
///
/// Bindings are kept in attach order and never overlap, so every address
/// resolves to at most one slave. Addresses outside every binding fail with
/// [`BusError::Unmapped`] instead of aliasing another region.
#[derive(Debug, Default)]
pub struct Bus {
    bindings: Vec<Binding>,
}

impl Bus {
    /// Creates a bus with no bindings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Maps `slave` onto `range`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Overlap`] when `range` shares an address with an
    /// already attached range; the bus is left unchanged.
    pub fn attach(&mut self, range: AddressRange, slave: Box<dyn Slave>) -> Result<(), BusError> {
        if let Some(existing) = self
            .bindings
            .iter()
            .map(Binding::range)
            .find(|existing| existing.overlaps(range))
        {
            return Err(BusError::Overlap {
                existing,
                requested: range,
            });
        }

        tracing::debug!(%range, "attached slave");
        self.bindings.push(Binding { range, slave });
        Ok(())
    }

    /// Attached bindings in attach order.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Returns the range covering `addr`, if any.
    #[must_use]
    pub fn range_of(&self, addr: Address) -> Option<AddressRange> {
        self.bindings
            .iter()
            .map(Binding::range)
            .find(|range| range.contains(addr))
    }

    /// Reads the cell at global address `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Unmapped`] for an address no binding covers, or the
    /// slave's own error for an access it rejects.
    pub fn read(&mut self, addr: Address) -> Result<RegisterValue, BusError> {
        let (slave, offset) = self.resolve(addr)?;
        slave.read(offset)
    }

    /// Writes `value` to global address `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Unmapped`] for an address no binding covers, or the
    /// slave's own error for an access it rejects.
    pub fn write(&mut self, addr: Address, value: RegisterValue) -> Result<(), BusError> {
        let (slave, offset) = self.resolve(addr)?;
        slave.write(offset, value)
    }

    fn resolve(&mut self, addr: Address) -> Result<(&mut Box<dyn Slave>, Address), BusError> {
        self.bindings
            .iter_mut()
            .find_map(|binding| {
                binding
                    .range
                    .local_offset(addr)
                    .map(|offset| (&mut binding.slave, offset))
            })
            .ok_or(BusError::Unmapped { addr })
    }
}
