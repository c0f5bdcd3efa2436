//! Fixed-width machine values and address ranges.

use std::fmt;

use crate::BusError;

/// Position in the global address space.
pub type Address = u16;

/// Number of addressable cells in the global address space (64 Ki cells).
pub const ADDRESS_SPACE_CELLS: u32 = Address::MAX as u32 + 1;

/// Fixed-width signed register/memory cell value.
///
/// Arithmetic on register values wraps at the 16-bit boundary; there is no
/// overflow signal. Every CPU register and every RAM cell holds one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterValue(i16);

impl RegisterValue {
    /// The zero value.
    pub const ZERO: Self = Self(0);
    /// The value one, used as the boolean-true result of logic instructions.
    pub const ONE: Self = Self(1);

    /// Creates a value from its signed representation.
    #[must_use]
    pub const fn new(value: i16) -> Self {
        Self(value)
    }

    /// Wraps `value` into the register width, keeping the low 16 bits.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_int(value: i64) -> Self {
        Self(value as i16)
    }

    /// Truncates `value` toward zero into the register width.
    ///
    /// Finite values wrap like [`Self::from_int`] once truncated. Values
    /// beyond the 64-bit range saturate: `NaN` becomes zero and infinities
    /// clamp to the signed bounds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_float(value: f64) -> Self {
        let truncated = value.trunc();
        if truncated.is_finite() && truncated.abs() < 9.0e18 {
            Self::from_int(truncated as i64)
        } else {
            Self(truncated as i16)
        }
    }

    /// Returns `1` when `flag` is set, `0` otherwise.
    #[must_use]
    pub const fn from_bool(flag: bool) -> Self {
        if flag {
            Self::ONE
        } else {
            Self::ZERO
        }
    }

    /// Returns the signed value.
    #[must_use]
    pub const fn get(self) -> i16 {
        self.0
    }

    /// Returns `true` for the zero value.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Reinterprets the cell bits as an address.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn as_address(self) -> Address {
        self.0 as Address
    }

    /// Wrapping addition.
    #[must_use]
    pub const fn wrapping_add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }

    /// Wrapping multiplication.
    #[must_use]
    pub const fn wrapping_mul(self, rhs: Self) -> Self {
        Self(self.0.wrapping_mul(rhs.0))
    }

    /// Wrapping negation; the minimum value negates to itself.
    #[must_use]
    pub const fn wrapping_neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

impl From<i16> for RegisterValue {
    fn from(value: i16) -> Self {
        Self(value)
    }
}

impl From<RegisterValue> for i16 {
    fn from(value: RegisterValue) -> Self {
        value.0
    }
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::LowerHex for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Half-open interval `[start, end)` of the global address space.
///
/// `end` is one past the last owned address, so it may equal
/// [`ADDRESS_SPACE_CELLS`] for a range that reaches the top of memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AddressRange {
    start: u32,
    end: u32,
}

impl AddressRange {
    /// Creates a range covering `start..end`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::InvalidRange`] when `start > end` or when `end`
    /// lies beyond the address space.
    pub const fn new(start: u32, end: u32) -> Result<Self, BusError> {
        if start > end || end > ADDRESS_SPACE_CELLS {
            return Err(BusError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range of `len` cells beginning at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::InvalidRange`] when the range would run past the
    /// end of the address space.
    pub fn with_len(start: u32, len: usize) -> Result<Self, BusError> {
        let end = u32::try_from(len)
            .ok()
            .and_then(|len| start.checked_add(len))
            .ok_or(BusError::InvalidRange {
                start,
                end: u32::MAX,
            })?;
        Self::new(start, end)
    }

    /// Inclusive start of the range.
    #[must_use]
    pub const fn start(self) -> u32 {
        self.start
    }

    /// Exclusive end of the range.
    #[must_use]
    pub const fn end(self) -> u32 {
        self.end
    }

    /// Number of addresses covered.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` when the range covers no address.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Half-open membership test: `start <= addr < end`.
    #[must_use]
    pub const fn contains(self, addr: Address) -> bool {
        let addr = addr as u32;
        self.start <= addr && addr < self.end
    }

    /// Returns `true` when both ranges share at least one address.
    ///
    /// An empty range owns no address and so overlaps nothing.
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// Translates a global address into an offset local to this range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn local_offset(self, addr: Address) -> Option<Address> {
        if self.contains(addr) {
            Some((addr as u32 - self.start) as Address)
        } else {
            None
        }
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#06x}, {:#06x})", self.start, self.end)
    }
}
