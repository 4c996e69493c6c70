//! Vector that allocates storage only for the elements written to it.
//!
//! A [`LazyVector`] has a nominal size `N` and a contiguous backing window
//! `[data_begin_index, data_end_index)` inside `[0, N)`. Reading outside
//! the window gives the default value without allocating; writing anywhere
//! in `[0, N)` grows the window to cover the written element, filling the
//! newly covered cells with the default value.
//!
//! Waveform regions of interest are a typical use: a long readout where
//! only a short stretch carries signal.

use std::ops::{Index, IndexMut};

use crate::error::LazyVectorError;

/// Sparse-on-demand vector with a single contiguous storage window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LazyVector<T> {
    /// Nominal size.
    nominal_size: usize,
    /// Stored window.
    data: Vec<T>,
    /// Index of the first stored element.
    data_begin: usize,
    /// Value of every element outside the window.
    default_value: T,
}

impl<T: Clone + Default> Default for LazyVector<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T: Clone + Default> LazyVector<T> {
    /// Create a vector of nominal size `size` defaulting to `T::default()`.
    pub fn new(size: usize) -> Self {
        Self::with_default(size, T::default())
    }
}

impl<T: Clone> LazyVector<T> {
    /// Create a vector of nominal size `size` defaulting to `default_value`.
    pub fn with_default(size: usize, default_value: T) -> Self {
        Self {
            nominal_size: size,
            data: Vec::new(),
            data_begin: 0,
            default_value,
        }
    }

    /// Nominal size.
    #[inline]
    pub fn len(&self) -> usize {
        self.nominal_size
    }

    /// Check if the nominal size is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nominal_size == 0
    }

    /// Whether `pos` is within the nominal size.
    #[inline]
    pub fn has_index(&self, pos: usize) -> bool {
        pos < self.nominal_size
    }

    /// Value of elements that were never written.
    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// Number of stored elements.
    #[inline]
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// Check if nothing is stored.
    #[inline]
    pub fn data_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Index of the first stored element.
    #[inline]
    pub fn data_begin_index(&self) -> usize {
        self.data_begin
    }

    /// One past the index of the last stored element.
    #[inline]
    pub fn data_end_index(&self) -> usize {
        self.data_begin + self.data.len()
    }

    /// Whether `pos` is inside the stored window.
    #[inline]
    pub fn data_has_index(&self, pos: usize) -> bool {
        pos >= self.data_begin_index() && pos < self.data_end_index()
    }

    /// Stored window, starting at [`data_begin_index`](Self::data_begin_index).
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Checked read; never allocates.
    pub fn at(&self, pos: usize) -> Result<&T, LazyVectorError> {
        self.check_range(pos)?;
        Ok(self.get(pos))
    }

    /// Checked write access; grows the window to cover `pos`.
    pub fn at_mut(&mut self, pos: usize) -> Result<&mut T, LazyVectorError> {
        self.check_range(pos)?;
        Ok(self.get_mut(pos))
    }

    /// Unchecked read; never allocates.
    ///
    /// Any position outside the stored window, including positions beyond
    /// the nominal size, reads as the default value.
    #[inline]
    pub fn get(&self, pos: usize) -> &T {
        if self.data_has_index(pos) {
            &self.data[pos - self.data_begin]
        } else {
            &self.default_value
        }
    }

    /// Unchecked write access; always grows the window to cover `pos`.
    ///
    /// # Panics
    /// Panics if `pos` is not smaller than the nominal size.
    pub fn get_mut(&mut self, pos: usize) -> &mut T {
        assert!(
            self.has_index(pos),
            "LazyVector index {pos} out of range (size {})",
            self.nominal_size
        );
        self.expand(pos);
        &mut self.data[pos - self.data_begin]
    }

    /// Change the nominal size.
    ///
    /// Growing never allocates. Shrinking truncates the stored window at
    /// `new_size`, dropping it entirely if it started at or after
    /// `new_size`.
    pub fn resize(&mut self, new_size: usize) {
        if new_size < self.data_end_index() {
            if new_size <= self.data_begin {
                self.data.clear();
                self.data_begin = 0;
            } else {
                self.data.truncate(new_size - self.data_begin);
            }
        }
        self.nominal_size = new_size;
    }

    /// Reserve backing storage for at least `n` elements.
    pub fn reserve(&mut self, n: usize) {
        self.data.reserve(n.saturating_sub(self.data.len()));
    }

    /// Release unused backing capacity.
    pub fn shrink_to_fit(&mut self) {
        self.data.shrink_to_fit();
    }

    /// Drop all storage and reset the nominal size to 0.
    pub fn clear(&mut self) {
        self.data.clear();
        self.data_begin = 0;
        self.nominal_size = 0;
    }

    /// Prepare storage for a window of `count` elements from `begin`,
    /// without storing anything.
    ///
    /// Only meaningful while nothing is stored.
    pub fn data_prepare(&mut self, begin: usize, count: usize) {
        if self.data.is_empty() {
            self.data_begin = begin;
        }
        self.reserve(count);
    }

    /// Store a default-filled window of `count` elements from `begin`,
    /// replacing any stored data.
    ///
    /// # Panics
    /// Panics if the window reaches beyond the nominal size.
    pub fn data_init(&mut self, begin: usize, count: usize) {
        assert!(
            begin + count <= self.nominal_size,
            "LazyVector window [{begin}, {}) exceeds size {}",
            begin + count,
            self.nominal_size
        );
        self.data.clear();
        self.data.resize(count, self.default_value.clone());
        self.data_begin = if count == 0 { 0 } else { begin };
    }

    /// Iterate over all `len()` logical elements.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.nominal_size).map(move |pos| self.get(pos))
    }

    /// Materialize the full logical content.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    fn check_range(&self, pos: usize) -> Result<(), LazyVectorError> {
        if self.has_index(pos) {
            Ok(())
        } else {
            Err(LazyVectorError::OutOfRange {
                index: pos,
                size: self.nominal_size,
            })
        }
    }

    /// Grow the stored window to include `pos`.
    fn expand(&mut self, pos: usize) {
        if self.data.is_empty() {
            self.data_begin = pos;
            self.data.push(self.default_value.clone());
        } else if pos < self.data_begin {
            let gap = self.data_begin - pos;
            self.data
                .splice(0..0, std::iter::repeat(self.default_value.clone()).take(gap));
            self.data_begin = pos;
        } else if pos >= self.data_end_index() {
            self.data
                .resize(pos - self.data_begin + 1, self.default_value.clone());
        }
    }
}

impl<T: Clone> Index<usize> for LazyVector<T> {
    type Output = T;

    fn index(&self, pos: usize) -> &T {
        self.get(pos)
    }
}

impl<T: Clone> IndexMut<usize> for LazyVector<T> {
    fn index_mut(&mut self, pos: usize) -> &mut T {
        self.get_mut(pos)
    }
}
