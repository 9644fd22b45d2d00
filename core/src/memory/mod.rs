mod bank;
mod pool;

pub use bank::{RamBank, ShadowBank};
pub use pool::{Block, MemoryPool, Relocation};
pub use scanline_hal::memory::{BankId, MmioBank, VideoMemory, GRANULARITY};
