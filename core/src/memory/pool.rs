use alloc::vec;
use alloc::vec::Vec;

use log::debug;

/// Contiguous byte range of a pool, used or free.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub offset: usize,
    pub len: usize,
    pub used: bool,
}

impl Block {
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// A used block moved by [`MemoryPool::compact`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Relocation {
    pub from: usize,
    pub to: usize,
    pub len: usize,
}

/// First-fit allocator over one fixed-size bank.
///
/// The pool only does bookkeeping: it never touches the memory it describes.
/// Blocks always partition `0..size` in address order and no two free blocks
/// are adjacent.
#[derive(Clone, Debug)]
pub struct MemoryPool {
    size: usize,
    granularity: usize,
    blocks: Vec<Block>,
    used_bytes: usize,
}

impl MemoryPool {
    pub fn new(size: usize, granularity: usize) -> Self {
        assert!(granularity > 0, "Invalid granularity: {}", granularity);
        assert!(size > 0 && size % granularity == 0, "Invalid pool size: {} - {}", size, granularity);
        Self {
            size,
            granularity,
            blocks: vec![Block { offset: 0, len: size, used: false }],
            used_bytes: 0,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn granularity(&self) -> usize {
        self.granularity
    }

    #[inline]
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    #[inline]
    pub fn free_bytes(&self) -> usize {
        self.size - self.used_bytes
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn largest_free_block(&self) -> usize {
        self.blocks.iter().filter(|block| !block.used).map(|block| block.len).max().unwrap_or(0)
    }

    /// `len` rounded up to the allocation granularity.
    #[inline]
    pub fn rounded(&self, len: usize) -> usize {
        len.div_ceil(self.granularity) * self.granularity
    }

    /// Reserves `len` bytes (rounded up to the granularity) from the lowest
    /// free block large enough to hold them.
    ///
    /// Returns `None` when no single free block fits, even if the total free
    /// space would. The pool never compacts on its own.
    pub fn allocate(&mut self, len: usize) -> Option<usize> {
        assert!(len > 0, "Invalid allocation length: {}", len);
        let len = self.rounded(len);
        let index = self.blocks.iter().position(|block| !block.used && block.len >= len)?;

        let block = &mut self.blocks[index];
        let offset = block.offset;
        if block.len > len {
            let rest = Block { offset: offset + len, len: block.len - len, used: false };
            block.len = len;
            block.used = true;
            self.blocks.insert(index + 1, rest);
        } else {
            block.used = true;
        }
        self.used_bytes += len;
        debug!(target: "pool", "allocated {} bytes at {}", len, offset);
        self.validate();
        Some(offset)
    }

    /// Frees the used block at `offset`. `len` must match the allocation
    /// request (it gets rounded the same way).
    pub fn release(&mut self, offset: usize, len: usize) {
        let len = self.rounded(len);
        let index = self
            .blocks
            .iter()
            .position(|block| block.offset == offset)
            .unwrap_or_else(|| panic!("Invalid release offset: {}", offset));
        {
            let block = &mut self.blocks[index];
            assert!(block.used, "Block already free: {}", offset);
            assert!(block.len == len, "Invalid release length: {} - {}", len, block.len);
            block.used = false;
        }
        self.used_bytes -= len;
        debug!(target: "pool", "released {} bytes at {}", len, offset);

        if index + 1 < self.blocks.len() && !self.blocks[index + 1].used {
            self.blocks[index].len += self.blocks[index + 1].len;
            self.blocks.remove(index + 1);
        }
        if index > 0 && !self.blocks[index - 1].used {
            self.blocks[index - 1].len += self.blocks[index].len;
            self.blocks.remove(index);
        }
        self.validate();
    }

    /// Slides every used block down to the start of the pool, keeping their
    /// order, and leaves one free block at the end.
    ///
    /// `on_move` is called once per moved block, lowest address first, so
    /// the caller can move the bytes itself: a destination never overlaps a
    /// block that still has to be moved.
    ///
    /// Returns the number of moved blocks.
    pub fn compact(&mut self, mut on_move: impl FnMut(Relocation)) -> usize {
        let mut compacted = Vec::with_capacity(self.blocks.len());
        let mut next = 0;
        let mut moved = 0;
        for block in self.blocks.iter().filter(|block| block.used) {
            if block.offset != next {
                on_move(Relocation { from: block.offset, to: next, len: block.len });
                moved += 1;
            }
            compacted.push(Block { offset: next, len: block.len, used: true });
            next += block.len;
        }
        if next < self.size {
            compacted.push(Block { offset: next, len: self.size - next, used: false });
        }
        self.blocks = compacted;
        debug!(target: "pool", "compacted: {} blocks moved, {} bytes free", moved, self.free_bytes());
        self.validate();
        moved
    }

    #[inline]
    fn validate(&self) {
        if cfg!(debug_assertions) {
            let mut next = 0;
            let mut used = 0;
            let mut previous_free = false;
            for block in &self.blocks {
                assert!(block.offset == next, "Pool blocks not contiguous: {:?}", block);
                assert!(block.len > 0 && block.len % self.granularity == 0, "Invalid block: {:?}", block);
                assert!(block.used || !previous_free, "Adjacent free blocks: {:?}", block);
                previous_free = !block.used;
                if block.used {
                    used += block.len;
                }
                next = block.end();
            }
            assert!(next == self.size, "Pool blocks do not cover the bank: {} - {}", next, self.size);
            assert!(used == self.used_bytes, "Used bytes mismatch: {} - {}", used, self.used_bytes);
        }
    }
}
