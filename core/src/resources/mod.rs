//! Reference counted video memory resources.
//!
//! A [`Registry`] hands out ranges of one bank. Content is addressed by value:
//! asking for bytes that are already resident returns another reference to
//! the same range instead of a copy. A [`Handle`] keeps its range alive and
//! the range goes back to the pool as soon as the last clone is dropped.
//!
//! When an allocation fails only because free space is fragmented, the
//! registry compacts the bank once and retries. Compaction moves ranges, so
//! anything that caches absolute addresses must either re-read
//! [`Handle::offset`] or listen through [`Registry::set_relocation_listener`].

mod palettes;
mod tiles;

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::ops::Range;

use log::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::memory::{BankId, MemoryPool, Relocation, VideoMemory};

pub use palettes::{PaletteHandle, PaletteItem, Palettes};
pub use tiles::{Tile, TileHandle, Tiles, TilesItem};

/// Color depth of the data behind a handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Bpp {
    Four,
    Eight,
}

/// What to put in a bank.
#[derive(Copy, Clone, Debug)]
pub struct Content<'a> {
    pub bytes: &'a [u8],
    pub bpp: Bpp,
}

impl<'a> Content<'a> {
    pub fn new(bytes: &'a [u8], bpp: Bpp) -> Self {
        assert!(!bytes.is_empty(), "Empty content");
        assert!(bytes.len() % 2 == 0, "Odd content length: {}", bytes.len());
        Self { bytes, bpp }
    }

    fn fingerprint(&self) -> u32 {
        crc32fast::hash(self.bytes)
    }
}

pub type RelocationListener = Box<dyn FnMut(BankId, Relocation)>;

#[derive(Debug)]
struct Entry {
    offset: usize,
    len: usize,
    bpp: Bpp,
    refs: usize,
    crc: u32,
}

struct RegistryInner {
    bank: BankId,
    pool: MemoryPool,
    memory: Box<dyn VideoMemory>,
    entries: Vec<Option<Entry>>,
    listener: Option<RelocationListener>,
}

impl RegistryInner {
    fn entry(&self, slot: usize) -> &Entry {
        match self.entries.get(slot) {
            Some(Some(entry)) => entry,
            _ => panic!("Invalid {} handle: {}", self.bank, slot),
        }
    }

    fn entry_mut(&mut self, slot: usize) -> &mut Entry {
        let bank = self.bank;
        match self.entries.get_mut(slot) {
            Some(Some(entry)) => entry,
            _ => panic!("Invalid {} handle: {}", bank, slot),
        }
    }

    fn find(&self, content: &Content) -> Option<usize> {
        let crc = content.fingerprint();
        self.entries.iter().position(|entry| match entry {
            Some(entry) => {
                entry.crc == crc
                    && entry.len == content.bytes.len()
                    && entry.bpp == content.bpp
                    && self.memory.contains_at(entry.offset, content.bytes)
            }
            None => false,
        })
    }

    fn insert(&mut self, entry: Entry) -> usize {
        match self.entries.iter().position(Option::is_none) {
            Some(slot) => {
                self.entries[slot] = Some(entry);
                slot
            }
            None => {
                self.entries.push(Some(entry));
                self.entries.len() - 1
            }
        }
    }

    fn out_of_memory(&self, requested: usize) -> Error {
        Error::OutOfMemory {
            bank: self.bank,
            requested: self.pool.rounded(requested),
            available: self.pool.free_bytes(),
            largest_free: self.pool.largest_free_block(),
        }
    }
}

/// Content-addressed allocator for one bank.
///
/// Cloning a `Registry` yields another reference to the same bank state.
#[derive(Clone)]
pub struct Registry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl Registry {
    pub fn new(bank: BankId, memory: Box<dyn VideoMemory>) -> Self {
        assert!(memory.size() == bank.size(), "Invalid {} memory size: {}", bank, memory.size());
        Self {
            inner: Rc::new(RefCell::new(RegistryInner {
                bank,
                pool: MemoryPool::new(bank.size(), bank.granularity()),
                memory,
                entries: Vec::new(),
                listener: None,
            })),
        }
    }

    pub fn bank(&self) -> BankId {
        self.inner.borrow().bank
    }

    /// Another reference to resident content equal to `content`.
    pub fn find(&self, content: &Content) -> Option<Handle> {
        let mut inner = self.inner.borrow_mut();
        let slot = inner.find(content)?;
        let bank = inner.bank;
        let entry = inner.entry_mut(slot);
        entry.refs += 1;
        debug!(target: "resources", "{}: reusing {} bytes at {} ({} refs)", bank, entry.len, entry.offset, entry.refs);
        Some(self.handle(slot))
    }

    /// Finds `content` or copies it into a new range.
    pub fn create(&self, content: &Content) -> Result<Handle> {
        match self.find(content) {
            Some(handle) => Ok(handle),
            None => self.create_new(content),
        }
    }

    /// Copies `content` into a new range even if it is already resident.
    pub fn create_new(&self, content: &Content) -> Result<Handle> {
        self.create_new_optional(content).ok_or_else(|| {
            let error = self.inner.borrow().out_of_memory(content.bytes.len());
            error!("{}", error);
            error
        })
    }

    pub fn create_optional(&self, content: &Content) -> Option<Handle> {
        self.find(content).or_else(|| self.create_new_optional(content))
    }

    /// Like [`Registry::create_new`], but a full bank leaves everything as it was.
    pub fn create_new_optional(&self, content: &Content) -> Option<Handle> {
        let len = content.bytes.len();
        let offset = self.allocate(len)?;
        let mut inner = self.inner.borrow_mut();
        inner.memory.write(offset, content.bytes);
        let slot = inner.insert(Entry { offset, len, bpp: content.bpp, refs: 1, crc: content.fingerprint() });
        debug!(target: "resources", "{}: created {} bytes at {}", inner.bank, len, offset);
        Some(self.handle(slot))
    }

    /// Gives up `handle`. Same as dropping it.
    pub fn release(&self, handle: Handle) {
        assert!(Rc::ptr_eq(&self.inner, &handle.registry), "Handle released to the wrong registry");
        drop(handle);
    }

    /// Moves every live range to the start of the bank. Returns how many moved.
    pub fn compact(&self) -> usize {
        let (bank, relocations) = {
            let mut inner = self.inner.borrow_mut();
            let RegistryInner { bank, pool, memory, entries, .. } = &mut *inner;
            let mut relocations = Vec::new();
            pool.compact(|relocation| {
                memory.copy_within(relocation.from, relocation.to, relocation.len);
                relocations.push(relocation);
            });
            for entry in entries.iter_mut().flatten() {
                if let Some(relocation) = relocations.iter().find(|relocation| relocation.from == entry.offset) {
                    entry.offset = relocation.to;
                }
            }
            warn!(target: "resources", "{}: compacted, {} ranges moved, {} bytes free", bank, relocations.len(), pool.free_bytes());
            (*bank, relocations)
        };

        if !relocations.is_empty() {
            let listener = self.inner.borrow_mut().listener.take();
            if let Some(mut listener) = listener {
                for relocation in &relocations {
                    debug!(target: "resources", "{}: moved {} bytes from {} to {}", bank, relocation.len, relocation.from, relocation.to);
                    listener(bank, *relocation);
                }
                let mut inner = self.inner.borrow_mut();
                if inner.listener.is_none() {
                    inner.listener = Some(listener);
                }
            }
        }
        relocations.len()
    }

    /// Called once per range moved by compaction, after the move.
    pub fn set_relocation_listener(&self, listener: impl FnMut(BankId, Relocation) + 'static) {
        self.inner.borrow_mut().listener = Some(Box::new(listener));
    }

    pub fn used_bytes(&self) -> usize {
        self.inner.borrow().pool.used_bytes()
    }

    pub fn available_bytes(&self) -> usize {
        self.inner.borrow().pool.free_bytes()
    }

    pub fn largest_free_block(&self) -> usize {
        self.inner.borrow().pool.largest_free_block()
    }

    pub fn handles_count(&self) -> usize {
        self.inner.borrow().entries.iter().flatten().count()
    }

    pub fn log_status(&self) {
        let inner = self.inner.borrow();
        info!(
            "{}: {} handles, {} bytes used, {} available, largest free block {}",
            inner.bank,
            inner.entries.iter().flatten().count(),
            inner.pool.used_bytes(),
            inner.pool.free_bytes(),
            inner.pool.largest_free_block()
        );
        for entry in inner.entries.iter().flatten() {
            info!(" - {:?}", entry);
        }
    }

    /// Pushes buffered writes to the display. Vertical blank only.
    pub fn flush(&self) {
        self.inner.borrow_mut().memory.flush();
    }

    /// Copies bank bytes into `out`.
    pub fn read(&self, offset: usize, out: &mut [u8]) {
        self.inner.borrow().memory.read(offset, out);
    }

    fn allocate(&self, len: usize) -> Option<usize> {
        let fits_after_compaction = {
            let mut inner = self.inner.borrow_mut();
            if let Some(offset) = inner.pool.allocate(len) {
                return Some(offset);
            }
            inner.pool.free_bytes() >= inner.pool.rounded(len)
        };
        if !fits_after_compaction {
            let inner = self.inner.borrow();
            warn!(target: "resources", "{}: no room for {} bytes, {} available", inner.bank, len, inner.pool.free_bytes());
            return None;
        }
        self.compact();
        self.inner.borrow_mut().pool.allocate(len)
    }

    fn handle(&self, slot: usize) -> Handle {
        Handle { registry: self.inner.clone(), slot }
    }
}

/// Counted reference to a range of a bank.
pub struct Handle {
    registry: Rc<RefCell<RegistryInner>>,
    slot: usize,
}

impl Handle {
    /// Current start of the range. Changes when the bank is compacted.
    pub fn offset(&self) -> usize {
        self.registry.borrow().entry(self.slot).offset
    }

    /// Content length in bytes. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.registry.borrow().entry(self.slot).len
    }

    pub fn bpp(&self) -> Bpp {
        self.registry.borrow().entry(self.slot).bpp
    }

    pub fn bank(&self) -> BankId {
        self.registry.borrow().bank
    }

    pub fn ref_count(&self) -> usize {
        self.registry.borrow().entry(self.slot).refs
    }

    /// Offset in allocation units, as the hardware indexes palettes and tiles.
    pub fn hw_index(&self) -> usize {
        let inner = self.registry.borrow();
        inner.entry(self.slot).offset / inner.bank.granularity()
    }

    /// Replaces the content in place. Every clone sees the new bytes.
    pub fn set_bytes(&self, bytes: &[u8]) {
        let mut inner = self.registry.borrow_mut();
        let entry = inner.entry_mut(self.slot);
        assert!(bytes.len() == entry.len, "Invalid content length: {} - {}", bytes.len(), entry.len);
        entry.crc = crc32fast::hash(bytes);
        let offset = entry.offset;
        inner.memory.write(offset, bytes);
    }

    /// Writes `range` of the stored content again, unchanged. Buffered banks
    /// push it on their next flush, over anything streamed there meanwhile.
    pub fn rewrite(&self, range: Range<usize>) {
        let mut inner = self.registry.borrow_mut();
        let (offset, len) = {
            let entry = inner.entry(self.slot);
            (entry.offset, entry.len)
        };
        assert!(range.start < range.end && range.end <= len, "Invalid rewrite range: {:?} - {}", range, len);
        let mut bytes = vec![0; range.len()];
        inner.memory.read(offset + range.start, &mut bytes);
        inner.memory.write(offset + range.start, &bytes);
    }

    pub fn read_bytes(&self, out: &mut [u8]) {
        let inner = self.registry.borrow();
        let entry = inner.entry(self.slot);
        assert!(out.len() <= entry.len, "Invalid read length: {} - {}", out.len(), entry.len);
        inner.memory.read(entry.offset, out);
    }

    /// True if both handles keep the same range alive.
    pub fn same_range(&self, other: &Handle) -> bool {
        Rc::ptr_eq(&self.registry, &other.registry) && self.slot == other.slot
    }
}

impl Clone for Handle {
    fn clone(&self) -> Self {
        self.registry.borrow_mut().entry_mut(self.slot).refs += 1;
        Self { registry: self.registry.clone(), slot: self.slot }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        let mut inner = self.registry.borrow_mut();
        let entry = inner.entry_mut(self.slot);
        entry.refs -= 1;
        if entry.refs == 0 {
            let (offset, len) = (entry.offset, entry.len);
            inner.entries[self.slot] = None;
            inner.pool.release(offset, len);
            debug!(target: "resources", "{}: released {} bytes at {}", inner.bank, len, offset);
        }
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.same_range(other)
    }
}

impl Eq for Handle {}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.registry.borrow();
        match inner.entries.get(self.slot) {
            Some(Some(entry)) => write!(f, "Handle({} {:?})", inner.bank, entry),
            _ => write!(f, "Handle({} #{})", inner.bank, self.slot),
        }
    }
}
