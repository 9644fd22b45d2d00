//! # Memory-Mapped Display Registers
//!
//! The display registers start at `$0400_0000`. [`DisplayRegisters`] mirrors
//! their layout so the CPU can poke them directly, and the [`RegisterAddress`]
//! constants below are derived from that same layout so HBlank streams target
//! exactly the same words.
//!
//! Most registers are write-only: reading them back returns garbage, so the
//! owning subsystem keeps a shadow copy and writes it whole.

use core::mem::offset_of;

use volatile_register::{RO, RW, WO};

/// Base address of the I/O register area.
pub const IO_BASE: u32 = 0x0400_0000;

/// Absolute address of a 16-bit hardware register (or of a 16-bit word in
/// palette RAM / OAM, which HBlank streams can also target).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegisterAddress(u32);

impl RegisterAddress {
    #[inline(always)]
    pub const fn new(address: u32) -> Self {
        Self(address)
    }

    #[inline(always)]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The address `bytes` further on.
    #[inline(always)]
    pub const fn offset(self, bytes: u32) -> Self {
        Self(self.0 + bytes)
    }

    #[inline(always)]
    pub fn as_mut_ptr(self) -> *mut u16 {
        self.0 as usize as *mut u16
    }
}

/// Horizontal and vertical scroll of one background. Write only.
#[repr(C)]
pub struct BgOffsets {
    pub horizontal: WO<u16>,
    pub vertical: WO<u16>,
}

/// Display register block at `$0400_0000`.
#[repr(C)]
pub struct DisplayRegisters {
    /// `DISPCNT`, see [`DisplayControl`](crate::display::DisplayControl).
    pub control: RW<u16>,
    _green_swap: RW<u16>,
    /// `DISPSTAT`, see [`DisplayStatus`](crate::display::DisplayStatus).
    pub status: RW<u16>,
    /// `VCOUNT`: the scanline being drawn.
    pub vcount: RO<u16>,
    /// `BG0CNT`..`BG3CNT`, see [`BgControl`](crate::bg::BgControl).
    pub bg_control: [RW<u16>; 4],
    pub bg_offsets: [BgOffsets; 4],
    // BG2/BG3 affine parameters, not driven from here.
    _affine: [u16; 16],
    /// `WIN0H`, `WIN1H`: packed `(left << 8) | right`.
    pub window_horizontal: [WO<u16>; 2],
    /// `WIN0V`, `WIN1V`: packed `(top << 8) | bottom`.
    pub window_vertical: [WO<u16>; 2],
    pub window_inside: RW<u16>,
    pub window_outside: RW<u16>,
    /// `MOSAIC`, see [`Mosaic`](crate::mosaic::Mosaic).
    pub mosaic: WO<u16>,
    _unused: u16,
    pub blend_control: RW<u16>,
    pub blend_alpha: RW<u16>,
    pub blend_fade: WO<u16>,
}

impl DisplayRegisters {
    /// # Safety
    /// Only valid on the target, and only one mutable reference may be live.
    pub unsafe fn new() -> &'static mut DisplayRegisters {
        unsafe { &mut *(IO_BASE as usize as *mut DisplayRegisters) }
    }
}

const fn io(offset: usize) -> RegisterAddress {
    RegisterAddress::new(IO_BASE + offset as u32)
}

pub const DISPCNT: RegisterAddress = io(offset_of!(DisplayRegisters, control));
pub const DISPSTAT: RegisterAddress = io(offset_of!(DisplayRegisters, status));
pub const VCOUNT: RegisterAddress = io(offset_of!(DisplayRegisters, vcount));
pub const WININ: RegisterAddress = io(offset_of!(DisplayRegisters, window_inside));
pub const WINOUT: RegisterAddress = io(offset_of!(DisplayRegisters, window_outside));
pub const MOSAIC: RegisterAddress = io(offset_of!(DisplayRegisters, mosaic));
pub const BLDCNT: RegisterAddress = io(offset_of!(DisplayRegisters, blend_control));

/// `BGxCNT` of background `id`.
pub fn bg_control(id: u8) -> RegisterAddress {
    assert!(id < 4, "Invalid background id: {}", id);
    io(offset_of!(DisplayRegisters, bg_control)).offset(2 * id as u32)
}

/// `BGxHOFS` of background `id`.
pub fn bg_horizontal_offset(id: u8) -> RegisterAddress {
    assert!(id < 4, "Invalid background id: {}", id);
    io(offset_of!(DisplayRegisters, bg_offsets)).offset(4 * id as u32)
}

/// `BGxVOFS` of background `id`.
pub fn bg_vertical_offset(id: u8) -> RegisterAddress {
    bg_horizontal_offset(id).offset(2)
}

/// `WINxH` of rectangular window `id`.
pub fn window_horizontal(id: u8) -> RegisterAddress {
    assert!(id < 2, "Invalid window id: {}", id);
    io(offset_of!(DisplayRegisters, window_horizontal)).offset(2 * id as u32)
}

/// `WINxV` of rectangular window `id`.
pub fn window_vertical(id: u8) -> RegisterAddress {
    assert!(id < 2, "Invalid window id: {}", id);
    io(offset_of!(DisplayRegisters, window_vertical)).offset(2 * id as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_layout() {
        assert_eq!(DISPCNT.get(), 0x0400_0000);
        assert_eq!(DISPSTAT.get(), 0x0400_0004);
        assert_eq!(VCOUNT.get(), 0x0400_0006);
        assert_eq!(bg_control(0).get(), 0x0400_0008);
        assert_eq!(bg_control(3).get(), 0x0400_000E);
        assert_eq!(bg_horizontal_offset(0).get(), 0x0400_0010);
        assert_eq!(bg_vertical_offset(2).get(), 0x0400_001A);
        assert_eq!(window_horizontal(0).get(), 0x0400_0040);
        assert_eq!(window_horizontal(1).get(), 0x0400_0042);
        assert_eq!(window_vertical(0).get(), 0x0400_0044);
        assert_eq!(WININ.get(), 0x0400_0048);
        assert_eq!(WINOUT.get(), 0x0400_004A);
        assert_eq!(MOSAIC.get(), 0x0400_004C);
        assert_eq!(BLDCNT.get(), 0x0400_0050);
        assert_eq!(core::mem::size_of::<DisplayRegisters>(), 0x56);
    }

    #[test]
    #[should_panic(expected = "Invalid window id")]
    fn test_window_out_of_range() {
        let _ = window_vertical(2);
    }
}
