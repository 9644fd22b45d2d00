use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use log::trace;
use scanline_hal::VideoMemory;

/// Bank contents kept in RAM.
#[derive(Clone, Debug)]
pub struct RamBank {
    bytes: Vec<u8>,
}

impl RamBank {
    pub fn new(size: usize) -> Self {
        Self { bytes: vec![0; size] }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl VideoMemory for RamBank {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn read(&self, offset: usize, out: &mut [u8]) {
        out.copy_from_slice(&self.bytes[offset..offset + out.len()]);
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) {
        self.bytes[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn copy_within(&mut self, from: usize, to: usize, len: usize) {
        self.bytes.copy_within(from..from + len, to);
    }

    fn contains_at(&self, offset: usize, bytes: &[u8]) -> bool {
        self.bytes.get(offset..offset + bytes.len()) == Some(bytes)
    }
}

/// RAM copy of a bank that is pushed downstream in one go.
///
/// Writes outside vertical blank would tear, so they land in RAM and only
/// the touched span (widened to whole half-words) is copied to `M` by
/// [`VideoMemory::flush`].
pub struct ShadowBank<M: VideoMemory> {
    ram: RamBank,
    dirty: Option<Range<usize>>,
    target: M,
}

impl<M: VideoMemory> ShadowBank<M> {
    /// Starts from the current contents of `target`.
    pub fn new(target: M) -> Self {
        let mut ram = RamBank::new(target.size());
        target.read(0, &mut ram.bytes);
        Self { ram, dirty: None, target }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    pub fn target(&self) -> &M {
        &self.target
    }

    fn touch(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let start = range.start & !1;
        let end = (range.end + 1) & !1;
        self.dirty = Some(match self.dirty.take() {
            Some(dirty) => dirty.start.min(start)..dirty.end.max(end),
            None => start..end,
        });
    }
}

impl<M: VideoMemory> VideoMemory for ShadowBank<M> {
    fn size(&self) -> usize {
        self.ram.size()
    }

    fn read(&self, offset: usize, out: &mut [u8]) {
        self.ram.read(offset, out);
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) {
        self.ram.write(offset, bytes);
        self.touch(offset..offset + bytes.len());
    }

    fn copy_within(&mut self, from: usize, to: usize, len: usize) {
        self.ram.copy_within(from, to, len);
        self.touch(to..to + len);
    }

    fn contains_at(&self, offset: usize, bytes: &[u8]) -> bool {
        self.ram.contains_at(offset, bytes)
    }

    fn flush(&mut self) {
        if let Some(dirty) = self.dirty.take() {
            trace!(target: "bank", "flushing {} bytes at {}", dirty.len(), dirty.start);
            self.target.write(dirty.start, &self.ram.bytes[dirty.clone()]);
            self.target.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_flushes_dirty_span_only() {
        let mut downstream = RamBank::new(64);
        downstream.write(0, &[9; 64]);
        let mut shadow = ShadowBank::new(downstream);
        assert!(!shadow.is_dirty());

        shadow.write(5, &[1, 2]);
        shadow.write(20, &[3]);
        assert!(shadow.contains_at(5, &[1, 2]));
        assert_eq!(shadow.target().bytes()[5], 9);

        shadow.flush();
        assert!(!shadow.is_dirty());
        let bytes = shadow.target().bytes();
        assert_eq!(&bytes[4..8], &[9, 1, 2, 9]);
        assert_eq!(bytes[20], 3);
        assert_eq!(bytes[22], 9);
    }

    #[test]
    fn test_shadow_copy_within() {
        let mut shadow = ShadowBank::new(RamBank::new(64));
        shadow.write(32, &[7; 32]);
        shadow.flush();
        shadow.copy_within(32, 0, 32);
        shadow.flush();
        assert_eq!(&shadow.target().bytes()[..32], &[7; 32]);
    }

    #[test]
    fn test_ram_contains_at_out_of_range() {
        let bank = RamBank::new(4);
        assert!(!bank.contains_at(2, &[0, 0, 0]));
        assert!(bank.contains_at(1, &[0, 0, 0]));
    }
}
