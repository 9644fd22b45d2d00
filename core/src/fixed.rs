use core::fmt;
use core::ops::{Add, Neg, Sub};

use bytemuck::{Pod, Zeroable};

/// Signed fixed-point number with 12 fractional bits.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Fixed(i32);

impl Fixed {
    pub const PRECISION: u32 = 12;
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(1 << Self::PRECISION);

    #[inline(always)]
    pub const fn from_int(value: i32) -> Self {
        Self(value << Self::PRECISION)
    }

    #[inline(always)]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// `numerator / denominator`, rounded towards zero.
    pub const fn from_ratio(numerator: i32, denominator: i32) -> Self {
        assert!(denominator != 0, "Zero denominator");
        Self(((numerator as i64) << Self::PRECISION) as i32 / denominator)
    }

    #[inline(always)]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Integer part, truncated towards zero.
    #[inline(always)]
    pub const fn integer(self) -> i32 {
        if self.0 < 0 {
            -((-self.0) >> Self::PRECISION)
        } else {
            self.0 >> Self::PRECISION
        }
    }

    /// Raw value with only `bits` fractional bits left.
    #[inline(always)]
    pub const fn to_precision(self, bits: u32) -> i32 {
        assert!(bits <= Self::PRECISION, "Invalid precision");
        self.0 >> (Self::PRECISION - bits)
    }

    /// True if `self` is in `[0, 1]`.
    #[inline]
    pub const fn is_unit(self) -> bool {
        self.0 >= 0 && self.0 <= Self::ONE.0
    }
}

impl Add for Fixed {
    type Output = Fixed;

    #[inline(always)]
    fn add(self, other: Fixed) -> Fixed {
        Fixed(self.0 + other.0)
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    #[inline(always)]
    fn sub(self, other: Fixed) -> Fixed {
        Fixed(self.0 - other.0)
    }
}

impl Neg for Fixed {
    type Output = Fixed;

    #[inline(always)]
    fn neg(self) -> Fixed {
        Fixed(-self.0)
    }
}

impl From<i32> for Fixed {
    fn from(value: i32) -> Self {
        Self::from_int(value)
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({}+{}/4096)", self.0 >> Self::PRECISION, self.0 & 0xFFF)
    }
}
