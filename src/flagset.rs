//! Tri-state flag set with a fixed number of supported flags.
//!
//! A [`FlagSet`] is a [`BitMask`] that knows how many of its storage bits
//! are meaningful flags. Only [`FlagSet::test`] checks indices; every other
//! query and mutator is reached through the mask and trusts the caller.

#![allow(clippy::must_use_candidate)]

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::bitmask::{BitMask, BitStorage, Flag};
use crate::error::FlagError;

/// Mask of `N` flags stored in `S`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlagSet<S, const N: usize> {
    mask: BitMask<S>,
}

impl<S: BitStorage, const N: usize> FlagSet<S, N> {
    const FITS_STORAGE: () = assert!(N <= S::BITS as usize, "more flags than storage bits");

    /// Set with every flag undefined.
    pub fn new() -> Self {
        Self::from_mask(BitMask::new())
    }

    /// Wrap an existing mask.
    pub fn from_mask(mask: BitMask<S>) -> Self {
        let () = Self::FITS_STORAGE;
        Self { mask }
    }

    /// Set with the given flags set and all others undefined.
    pub fn with_flags(flags: impl IntoIterator<Item = Flag<S>>) -> Self {
        let mut set = Self::new();
        set.range_set(flags);
        set
    }

    /// Number of supported flags.
    #[inline]
    pub const fn capacity() -> usize {
        N
    }

    /// Whether `index` names a supported flag.
    #[inline]
    pub fn is_flag(index: u32) -> bool {
        (index as usize) < N
    }

    /// The underlying mask.
    #[inline]
    pub fn mask(&self) -> BitMask<S> {
        self.mask
    }

    /// Checked value of `flag`.
    ///
    /// # Errors
    /// - [`FlagError::OutOfRange`] if `flag` is not a supported flag
    /// - [`FlagError::FlagNotDefined`] if `flag` has no value
    pub fn test(&self, flag: Flag<S>) -> Result<bool, FlagError> {
        if !Self::is_flag(flag.index()) {
            return Err(FlagError::OutOfRange {
                index: flag.index(),
                capacity: N,
            });
        }
        if self.mask.is_undefined(flag) {
            return Err(FlagError::FlagNotDefined {
                index: flag.index(),
            });
        }
        Ok(self.mask.is_set(flag))
    }
}

impl<S, const N: usize> Deref for FlagSet<S, N> {
    type Target = BitMask<S>;

    fn deref(&self) -> &BitMask<S> {
        &self.mask
    }
}

impl<S, const N: usize> DerefMut for FlagSet<S, N> {
    fn deref_mut(&mut self) -> &mut BitMask<S> {
        &mut self.mask
    }
}

impl<S: BitStorage, const N: usize> From<BitMask<S>> for FlagSet<S, N> {
    fn from(mask: BitMask<S>) -> Self {
        Self::from_mask(mask)
    }
}

impl<S: BitStorage, const N: usize> fmt::Display for FlagSet<S, N> {
    #[allow(clippy::cast_possible_truncation)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mask.dump(N as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Set = FlagSet<u16, 12>;

    #[test]
    fn test_capacity() {
        assert_eq!(Set::capacity(), 12);
        assert!(Set::is_flag(11));
        assert!(!Set::is_flag(12));
        assert!(!Set::is_flag(15));
    }

    #[test]
    fn test_checked_test() {
        let mut set = Set::new();
        set.set(Flag::new(2)).unset(Flag::new(5));

        assert_eq!(set.test(Flag::new(2)), Ok(true));
        assert_eq!(set.test(Flag::new(5)), Ok(false));
        assert_eq!(
            set.test(Flag::new(3)),
            Err(FlagError::FlagNotDefined { index: 3 })
        );
    }

    #[test]
    fn test_out_of_range_even_if_stored() {
        let mut set = Set::new();
        // storage has room for flag 13, the set does not support it
        set.set(Flag::new(13));
        assert!(set.is_set(Flag::new(13)));
        assert_eq!(
            set.test(Flag::new(13)),
            Err(FlagError::OutOfRange {
                index: 13,
                capacity: 12
            })
        );
        assert_eq!(
            set.test(Flag::new(40)),
            Err(FlagError::OutOfRange {
                index: 40,
                capacity: 12
            })
        );
    }

    #[test]
    fn test_with_flags_and_display() {
        let set = FlagSet::<u8, 4>::with_flags([Flag::new(0), Flag::new(3)]);
        assert_eq!(set.to_string(), "1--1");
        assert_eq!(set.mask().count_set(), 2);
    }

    #[test]
    fn test_from_mask() {
        let mask = BitMask::from(Flag::<u32>::new(1)) + -Flag::<u32>::new(4);
        let set: FlagSet<u32, 32> = mask.into();
        assert_eq!(set.test(Flag::new(1)), Ok(true));
        assert_eq!(set.test(Flag::new(4)), Ok(false));
    }
}
