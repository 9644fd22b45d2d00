use core::fmt;

use scanline_hal::BankId;

/// Capacity failures reported to the caller.
///
/// Invalid parameters are not errors: they are programmer mistakes and panic.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// No free range of `requested` bytes, even after compaction.
    OutOfMemory {
        bank: BankId,
        requested: usize,
        available: usize,
        largest_free: usize,
    },
    /// Every hblank effect slot is taken.
    TooManyHblankEffects { capacity: usize },
}

pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfMemory { bank, requested, available, largest_free } => write!(
                f,
                "{} full: requested {} bytes, {} available, largest free block {}",
                bank, requested, available, largest_free
            ),
            Error::TooManyHblankEffects { capacity } => {
                write!(f, "no hblank effect slots left (capacity {})", capacity)
            }
        }
    }
}

impl core::error::Error for Error {}
