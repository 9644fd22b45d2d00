use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Ref, RefCell, RefMut};
use core::fmt;

use crate::config::DISPLAY_HEIGHT;

/// Caller-owned input table of an effect, one value per line.
///
/// Clones share the table. The scheduler does not notice edits made through
/// [`LineValues::borrow_mut`] or [`LineValues::set`]: call
/// `HblankEffects::reload` afterwards.
pub struct LineValues<T> {
    values: Rc<RefCell<Vec<T>>>,
}

impl<T: Copy> LineValues<T> {
    /// `values` needs at least one entry per display line.
    pub fn new(values: Vec<T>) -> Self {
        assert!(values.len() >= DISPLAY_HEIGHT, "Invalid values count: {} - {}", values.len(), DISPLAY_HEIGHT);
        Self { values: Rc::new(RefCell::new(values)) }
    }

    pub fn filled(value: T) -> Self {
        Self::new(vec![value; DISPLAY_HEIGHT])
    }

    pub fn from_fn(f: impl FnMut(usize) -> T) -> Self {
        Self::new((0..DISPLAY_HEIGHT).map(f).collect())
    }

    pub fn get(&self, line: usize) -> T {
        self.values.borrow()[line]
    }

    pub fn set(&self, line: usize, value: T) {
        self.values.borrow_mut()[line] = value;
    }

    pub fn borrow(&self) -> Ref<'_, [T]> {
        Ref::map(self.values.borrow(), |values| values.as_slice())
    }

    pub fn borrow_mut(&self) -> RefMut<'_, [T]> {
        RefMut::map(self.values.borrow_mut(), |values| values.as_mut_slice())
    }

    /// True if both refer to the same table.
    pub fn same_table(&self, other: &LineValues<T>) -> bool {
        Rc::ptr_eq(&self.values, &other.values)
    }
}

impl<T> Clone for LineValues<T> {
    fn clone(&self) -> Self {
        Self { values: self.values.clone() }
    }
}

impl<T> fmt::Debug for LineValues<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineValues({} refs)", Rc::strong_count(&self.values))
    }
}

/// Double-buffered output of an effect.
///
/// The front table is what the hardware streams from. Updates go to the
/// back table and only become visible on [`LineTables::swap`].
pub struct LineTables {
    tables: [[u16; DISPLAY_HEIGHT]; 2],
    front: usize,
    pending: bool,
}

impl LineTables {
    pub fn new() -> Self {
        Self { tables: [[0; DISPLAY_HEIGHT]; 2], front: 0, pending: false }
    }

    #[inline]
    pub fn front(&self) -> &[u16; DISPLAY_HEIGHT] {
        &self.tables[self.front]
    }

    /// Back table, to be rewritten in full. Marks it pending.
    #[inline]
    pub fn back_mut(&mut self) -> &mut [u16; DISPLAY_HEIGHT] {
        self.pending = true;
        &mut self.tables[self.front ^ 1]
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Promotes a pending back table. Returns false if there was none.
    pub fn swap(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.front ^= 1;
        self.pending = false;
        true
    }
}
