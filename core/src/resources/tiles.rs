use alloc::boxed::Box;

use bytemuck::{Pod, Zeroable};

use crate::error::Result;
use crate::memory::{BankId, VideoMemory, GRANULARITY};

use super::{Bpp, Content, Handle, Registry};

/// One 8x8 4bpp tile, or half of an 8bpp one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
pub struct Tile(pub [u8; GRANULARITY]);

/// Tiles to upload as one block.
#[derive(Copy, Clone, Debug)]
pub struct TilesItem<'a> {
    tiles: &'a [Tile],
    bpp: Bpp,
}

impl<'a> TilesItem<'a> {
    /// `tiles` is in 32-byte units: an 8bpp tile takes two of them.
    pub fn new(tiles: &'a [Tile], bpp: Bpp) -> Self {
        assert!(!tiles.is_empty(), "Empty tiles item");
        if bpp == Bpp::Eight {
            assert!(tiles.len() % 2 == 0, "Invalid 8bpp tiles count: {}", tiles.len());
        }
        Self { tiles, bpp }
    }

    pub fn tiles_count(&self) -> usize {
        match self.bpp {
            Bpp::Four => self.tiles.len(),
            Bpp::Eight => self.tiles.len() / 2,
        }
    }

    fn content(&self) -> Content<'a> {
        Content::new(bytemuck::cast_slice(self.tiles), self.bpp)
    }
}

/// Resident tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileHandle(Handle);

impl TileHandle {
    pub fn handle(&self) -> &Handle {
        &self.0
    }

    pub fn bpp(&self) -> Bpp {
        self.0.bpp()
    }

    pub fn tiles_count(&self) -> usize {
        let units = self.0.len() / GRANULARITY;
        match self.bpp() {
            Bpp::Four => units,
            Bpp::Eight => units / 2,
        }
    }

    /// Index of the first tile in 32-byte units, relative to the bank.
    pub fn hw_index(&self) -> usize {
        self.0.hw_index()
    }

    pub fn set_tiles(&self, tiles: &[Tile]) {
        self.0.set_bytes(bytemuck::cast_slice(tiles));
    }
}

/// Tile registry of one tile bank.
#[derive(Clone)]
pub struct Tiles {
    registry: Registry,
}

impl Tiles {
    pub fn new(bank: BankId, memory: Box<dyn VideoMemory>) -> Self {
        assert!(!bank.is_palette(), "Not a tiles bank: {}", bank);
        Self { registry: Registry::new(bank, memory) }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn find(&self, item: &TilesItem) -> Option<TileHandle> {
        self.registry.find(&item.content()).map(TileHandle)
    }

    pub fn create(&self, item: &TilesItem) -> Result<TileHandle> {
        self.registry.create(&item.content()).map(TileHandle)
    }

    pub fn create_new(&self, item: &TilesItem) -> Result<TileHandle> {
        self.registry.create_new(&item.content()).map(TileHandle)
    }

    pub fn create_optional(&self, item: &TilesItem) -> Option<TileHandle> {
        self.registry.create_optional(&item.content()).map(TileHandle)
    }

    pub fn create_new_optional(&self, item: &TilesItem) -> Option<TileHandle> {
        self.registry.create_new_optional(&item.content()).map(TileHandle)
    }

    pub fn release(&self, tiles: TileHandle) {
        self.registry.release(tiles.0);
    }
}
