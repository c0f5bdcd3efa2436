use crate::{Address, BusError, RegisterValue, Slave};

/// Fixed-capacity array of register values addressed by local offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ram {
    cells: Box<[RegisterValue]>,
}

impl Ram {
    /// Allocates `capacity` cells, all zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let mut ram = Self {
            cells: vec![RegisterValue::ZERO; capacity].into_boxed_slice(),
        };
        ram.clear();
        ram
    }

    /// Zeroes every cell.
    pub fn clear(&mut self) {
        self.cells.fill(RegisterValue::ZERO);
    }

    /// Capacity in cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` for a zero-capacity RAM.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read-only view of the backing cells.
    #[must_use]
    pub fn cells(&self) -> &[RegisterValue] {
        &self.cells
    }

    /// Copies `image` into the cells starting at offset zero.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::OffsetOutOfBounds`] when the image is longer than
    /// the RAM; nothing is written in that case.
    pub fn load(&mut self, image: &[RegisterValue]) -> Result<(), BusError> {
        let len = self.cells.len();
        let Some(target) = self.cells.get_mut(..image.len()) else {
            return Err(BusError::OffsetOutOfBounds {
                offset: Address::try_from(len).unwrap_or(Address::MAX),
                len,
            });
        };
        target.copy_from_slice(image);
        Ok(())
    }
}

impl Slave for Ram {
    fn read(&mut self, offset: Address) -> Result<RegisterValue, BusError> {
        self.cells
            .get(usize::from(offset))
            .copied()
            .ok_or(BusError::OffsetOutOfBounds {
                offset,
                len: self.cells.len(),
            })
    }

    fn write(&mut self, offset: Address, value: RegisterValue) -> Result<(), BusError> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(usize::from(offset))
            .ok_or(BusError::OffsetOutOfBounds { offset, len })?;
        *cell = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Ram;
    use crate::{BusError, RegisterValue, Slave};

    #[test]
    fn new_ram_is_zeroed_with_requested_capacity() {
        let ram = Ram::new(16);
        assert_eq!(ram.len(), 16);
        assert!(!ram.is_empty());
        assert!(ram.cells().iter().all(|cell| cell.is_zero()));
    }

    #[test]
    fn read_write_roundtrip_at_both_ends() {
        let mut ram = Ram::new(8);
        ram.write(0, RegisterValue::new(11)).expect("in range");
        ram.write(7, RegisterValue::new(-11)).expect("in range");

        assert_eq!(ram.read(0), Ok(RegisterValue::new(11)));
        assert_eq!(ram.read(7), Ok(RegisterValue::new(-11)));
    }

    #[test]
    fn accesses_past_capacity_are_rejected() {
        let mut ram = Ram::new(8);
        let expected = BusError::OffsetOutOfBounds { offset: 8, len: 8 };

        assert_eq!(ram.read(8), Err(expected));
        assert_eq!(ram.write(8, RegisterValue::ONE), Err(expected));
        assert!(ram.cells().iter().all(|cell| cell.is_zero()));
    }

    #[test]
    fn clear_zeroes_every_cell() {
        let mut ram = Ram::new(4);
        for offset in 0..4 {
            ram.write(offset, RegisterValue::new(-1)).expect("in range");
        }

        ram.clear();

        assert!(ram.cells().iter().all(|cell| cell.is_zero()));
    }

    #[test]
    fn load_copies_image_from_offset_zero() {
        let mut ram = Ram::new(4);
        ram.load(&[RegisterValue::new(1), RegisterValue::new(2)])
            .expect("image fits");

        assert_eq!(
            ram.cells(),
            &[
                RegisterValue::new(1),
                RegisterValue::new(2),
                RegisterValue::ZERO,
                RegisterValue::ZERO
            ]
        );
    }

    #[test]
    fn oversized_image_is_rejected_without_partial_write() {
        let mut ram = Ram::new(2);
        let image = [RegisterValue::ONE; 3];

        assert_eq!(
            ram.load(&image),
            Err(BusError::OffsetOutOfBounds { offset: 2, len: 2 })
        );
        assert!(ram.cells().iter().all(|cell| cell.is_zero()));
    }

    #[test]
    fn zero_capacity_ram_rejects_every_access() {
        let mut ram = Ram::new(0);
        assert!(ram.is_empty());
        assert!(ram.read(0).is_err());
        assert!(ram.load(&[]).is_ok());
    }
}
