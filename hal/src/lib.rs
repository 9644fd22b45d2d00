//! # scanline-hal
//!
//! Hardware abstraction layer for a 240×160 tile-based display processor.
//!
//! The display hardware has no virtual memory and no relocatable buffers:
//! tiles, palettes and object attributes live at fixed addresses, and every
//! per-scanline effect is just a register rewritten during the horizontal
//! blank between two lines.
//!
//! | Module | What it covers |
//! |--------|----------------|
//! | [`display`] | Screen geometry, `DISPCNT`/`DISPSTAT` flags |
//! | [`registers`] | Memory-mapped register block and [`RegisterAddress`] |
//! | [`memory`] | Video memory banks ([`BankId`], [`VideoMemory`], [`MmioBank`]) |
//! | [`bg`] | Background control word encoding |
//! | [`oam`] | Object (sprite) attribute words |
//! | [`window`] | Window boundary packing |
//! | [`mosaic`] | Mosaic register nibbles |
//! | [`hblank`] | Per-line register streaming from the HBlank interrupt |
//!
//! Nothing in here allocates. The higher-level pieces (allocation of banks,
//! effect scheduling) live in `scanline-core`.

#![no_std]

pub mod bg;
pub mod display;
pub mod hblank;
pub mod memory;
pub mod mosaic;
pub mod oam;
pub mod registers;
pub mod window;

pub use memory::{BankId, MmioBank, VideoMemory};
pub use registers::RegisterAddress;
