//! Tri-state flag masks.
//!
//! Every flag of a [`BitMask`] is either undefined, set or unset. The state
//! lives in two planes of the same storage word:
//! - `presence`: bit `i` is 1 when flag `i` is defined
//! - `values`: bit `i` is 1 when flag `i` is set
//!
//! A flag can only carry a value while it is defined, so `values` is always
//! a subset of `presence`.
//!
//! ## Algebra
//! | operation                | operator | result per flag                                  |
//! |--------------------------|----------|--------------------------------------------------|
//! | [`BitMask::merge_into_mask`]     | `+` | overlay where defined, base elsewhere       |
//! | [`BitMask::combine_with_mask`]   | `\|` | set if set in either, unset if unset in both |
//! | [`BitMask::intersect_with_mask`] | `&` | set if set in both, unset if unset in either |
//! | [`BitMask::unset_mask`]          | `-` | unset where the right side is set, else base |
//! | [`BitMask::negate_mask`]         | `!` | defined values flipped                      |

#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::must_use_candidate)]

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::{Add, BitAnd, BitOr, BitXor, Neg, Not, Sub};

use serde::{Deserialize, Serialize};

/// Unsigned word a mask is stored in.
pub trait BitStorage:
    Copy
    + Default
    + Eq
    + Hash
    + fmt::Debug
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
{
    /// Number of flags the word holds.
    const BITS: u32;
    /// All bits clear.
    const ZERO: Self;

    /// Word with only bit `index` set; empty if `index` does not fit.
    fn bit(index: u32) -> Self;

    /// Number of set bits.
    fn ones(self) -> u32;
}

macro_rules! impl_bit_storage {
    ($($t:ty),*) => {
        $(
            impl BitStorage for $t {
                const BITS: u32 = <$t>::BITS;
                const ZERO: Self = 0;

                #[inline]
                fn bit(index: u32) -> Self {
                    (1 as $t).checked_shl(index).unwrap_or(0)
                }

                #[inline]
                fn ones(self) -> u32 {
                    self.count_ones()
                }
            }
        )*
    };
}

impl_bit_storage!(u8, u16, u32, u64);

/// Index of a single flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Flag<S> {
    index: u32,
    storage: PhantomData<S>,
}

impl<S> Flag<S> {
    /// Flag with the given index.
    pub const fn new(index: u32) -> Self {
        Self {
            index,
            storage: PhantomData,
        }
    }

    /// Index of the flag.
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }
}

impl<S: BitStorage> Flag<S> {
    /// The flag as a bit selection; empty if it does not fit the storage.
    #[inline]
    pub fn bits(self) -> Bits<S> {
        Bits(S::bit(self.index))
    }

    /// Whether the flag fits the storage word.
    #[inline]
    pub fn is_representable(self) -> bool {
        self.index < S::BITS
    }
}

impl<S> fmt::Display for Flag<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.index)
    }
}

/// Plain selection of flags, without a tri-state value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bits<S>(S);

impl<S: BitStorage> Bits<S> {
    /// Selection of no flag.
    pub fn empty() -> Self {
        Self(S::ZERO)
    }

    /// Wrap a raw storage word.
    pub fn from_raw(raw: S) -> Self {
        Self(raw)
    }

    /// Selection of all the given flags.
    pub fn from_flags(flags: impl IntoIterator<Item = Flag<S>>) -> Self {
        flags.into_iter().fold(Self::empty(), Self::with)
    }

    /// Raw storage word.
    #[inline]
    pub fn raw(self) -> S {
        self.0
    }

    /// Whether no flag is selected.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == S::ZERO
    }

    /// Whether `flag` is selected.
    #[inline]
    pub fn contains(self, flag: Flag<S>) -> bool {
        !(self & flag.bits()).is_empty()
    }

    /// Whether every flag of `other` is selected here.
    #[inline]
    pub fn all(self, other: Self) -> bool {
        (self & other) == other
    }

    /// Whether some flag of `other` is selected here.
    #[inline]
    pub fn any(self, other: Self) -> bool {
        !(self & other).is_empty()
    }

    /// Whether no flag of `other` is selected here.
    #[inline]
    pub fn none(self, other: Self) -> bool {
        (self & other).is_empty()
    }

    /// Whether nothing outside `other` is selected here.
    #[inline]
    pub fn only(self, other: Self) -> bool {
        (self & !other).is_empty()
    }

    /// This selection plus `flag`.
    pub fn with(self, flag: Flag<S>) -> Self {
        self | flag.bits()
    }

    /// This selection minus `flag`.
    pub fn without(self, flag: Flag<S>) -> Self {
        self & !flag.bits()
    }

    /// Number of selected flags.
    #[inline]
    pub fn count(self) -> u32 {
        self.0.ones()
    }
}

impl<S: BitStorage> BitAnd for Bits<S> {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl<S: BitStorage> BitOr for Bits<S> {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl<S: BitStorage> BitXor for Bits<S> {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl<S: BitStorage> Not for Bits<S> {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl<S: BitStorage> From<Flag<S>> for Bits<S> {
    fn from(flag: Flag<S>) -> Self {
        flag.bits()
    }
}

impl<S: BitStorage> BitOr for Flag<S> {
    type Output = Bits<S>;
    fn bitor(self, rhs: Self) -> Bits<S> {
        self.bits() | rhs.bits()
    }
}

impl<S: BitStorage> BitOr<Flag<S>> for Bits<S> {
    type Output = Self;
    fn bitor(self, rhs: Flag<S>) -> Self {
        self.with(rhs)
    }
}

/// Flags that are each undefined, set or unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitMask<S> {
    values: S,
    presence: S,
}

impl<S: BitStorage> BitMask<S> {
    /// Mask with every flag undefined.
    pub fn new() -> Self {
        Self {
            values: S::ZERO,
            presence: S::ZERO,
        }
    }

    /// Build a mask from its planes; values outside `presence` are dropped.
    pub fn from_raw(values: S, presence: S) -> Self {
        Self {
            values: values & presence,
            presence,
        }
    }

    /// Mask with the selected flags set and all others undefined.
    pub fn with_set(bits: Bits<S>) -> Self {
        Self::from_raw(bits.raw(), bits.raw())
    }

    /// Mask with the selected flags unset and all others undefined.
    pub fn with_unset(bits: Bits<S>) -> Self {
        Self::from_raw(S::ZERO, bits.raw())
    }

    /// Value plane.
    #[inline]
    pub fn values(&self) -> Bits<S> {
        Bits(self.values)
    }

    /// Presence plane.
    #[inline]
    pub fn presence(&self) -> Bits<S> {
        Bits(self.presence)
    }

    /// Flags that are defined and unset.
    #[inline]
    fn unset_plane(&self) -> S {
        self.presence & !self.values
    }

    // ---------------------------------------------------------------------
    // Single flag queries
    // ---------------------------------------------------------------------

    /// Whether `flag` has a value.
    #[inline]
    pub fn is_defined(&self, flag: Flag<S>) -> bool {
        self.presence().contains(flag)
    }

    /// Whether `flag` has no value.
    #[inline]
    pub fn is_undefined(&self, flag: Flag<S>) -> bool {
        !self.is_defined(flag)
    }

    /// Value of `flag`; an undefined flag reads as not set.
    #[inline]
    pub fn get(&self, flag: Flag<S>) -> bool {
        self.values().contains(flag)
    }

    /// Whether `flag` is defined and set.
    #[inline]
    pub fn is_set(&self, flag: Flag<S>) -> bool {
        self.get(flag)
    }

    /// Whether `flag` is defined and unset.
    #[inline]
    pub fn is_unset(&self, flag: Flag<S>) -> bool {
        Bits(self.unset_plane()).contains(flag)
    }

    // ---------------------------------------------------------------------
    // Batch queries
    // ---------------------------------------------------------------------

    /// Whether all selected flags are defined.
    pub fn all_defined(&self, bits: Bits<S>) -> bool {
        self.presence().all(bits)
    }

    /// Whether all selected flags are undefined.
    pub fn all_undefined(&self, bits: Bits<S>) -> bool {
        self.presence().none(bits)
    }

    /// Whether all selected flags are set.
    pub fn all_set(&self, bits: Bits<S>) -> bool {
        self.values().all(bits)
    }

    /// Whether all selected flags are unset.
    pub fn all_unset(&self, bits: Bits<S>) -> bool {
        Bits(self.unset_plane()).all(bits)
    }

    /// Whether at least one selected flag is set.
    pub fn any_set_in(&self, bits: Bits<S>) -> bool {
        self.values().any(bits)
    }

    /// Whether no selected flag is set.
    pub fn none_set_in(&self, bits: Bits<S>) -> bool {
        self.values().none(bits)
    }

    /// Whether any flag set in `mask` is also set here.
    pub fn any_set(&self, mask: &Self) -> bool {
        self.any_set_in(mask.values())
    }

    /// Whether none of the flags set in `mask` is set here.
    pub fn none_set(&self, mask: &Self) -> bool {
        self.none_set_in(mask.values())
    }

    /// Whether every flag defined in `mask` is defined here with the same
    /// value.
    pub fn matches(&self, mask: &Self) -> bool {
        self.presence().all(mask.presence())
            && Bits(self.values ^ mask.values).none(mask.presence())
    }

    /// Number of defined flags.
    pub fn count_defined(&self) -> u32 {
        self.presence().count()
    }

    /// Number of set flags.
    pub fn count_set(&self) -> u32 {
        self.values().count()
    }

    // ---------------------------------------------------------------------
    // Mutators
    // ---------------------------------------------------------------------

    /// Define `flag` as set.
    pub fn set(&mut self, flag: Flag<S>) -> &mut Self {
        self.set_bits(flag.bits())
    }

    /// Define `flag` as unset.
    pub fn unset(&mut self, flag: Flag<S>) -> &mut Self {
        self.unset_bits(flag.bits())
    }

    /// Define all selected flags as set.
    pub fn set_bits(&mut self, bits: Bits<S>) -> &mut Self {
        self.presence = self.presence | bits.raw();
        self.values = self.values | bits.raw();
        self
    }

    /// Define all selected flags as unset.
    pub fn unset_bits(&mut self, bits: Bits<S>) -> &mut Self {
        self.presence = self.presence | bits.raw();
        self.values = self.values & !bits.raw();
        self
    }

    /// Define every flag of `flags` as set.
    pub fn range_set(&mut self, flags: impl IntoIterator<Item = Flag<S>>) -> &mut Self {
        self.set_bits(Bits::from_flags(flags))
    }

    /// Define every flag of `flags` as unset.
    pub fn range_unset(&mut self, flags: impl IntoIterator<Item = Flag<S>>) -> &mut Self {
        self.unset_bits(Bits::from_flags(flags))
    }

    /// Make `flag` undefined.
    pub fn remove(&mut self, flag: Flag<S>) -> &mut Self {
        self.remove_bits(flag.bits())
    }

    /// Make all selected flags undefined.
    pub fn remove_bits(&mut self, bits: Bits<S>) -> &mut Self {
        self.presence = self.presence & !bits.raw();
        self.values = self.values & !bits.raw();
        self
    }

    /// Make every flag undefined.
    pub fn clear(&mut self) -> &mut Self {
        *self = Self::new();
        self
    }

    // ---------------------------------------------------------------------
    // Algebra
    // ---------------------------------------------------------------------

    /// `overlay` where it is defined, `base` elsewhere.
    pub fn merge_into_mask(base: Self, overlay: Self) -> Self {
        Self::from_raw(
            (base.values & !overlay.presence) | overlay.values,
            base.presence | overlay.presence,
        )
    }

    /// Set if set in either mask, unset if unset in both.
    pub fn combine_with_mask(a: Self, b: Self) -> Self {
        let set = a.values | b.values;
        let unset = a.unset_plane() & b.unset_plane();
        Self::from_raw(set, set | unset)
    }

    /// Set if set in both masks, unset if unset in either.
    pub fn intersect_with_mask(a: Self, b: Self) -> Self {
        let set = a.values & b.values;
        let unset = a.unset_plane() | b.unset_plane();
        Self::from_raw(set, set | unset)
    }

    /// `base` with every flag set in `mask` turned unset.
    pub fn unset_mask(base: Self, mask: Self) -> Self {
        Self::from_raw(base.values & !mask.values, base.presence | mask.values)
    }

    /// Flip the value of every defined flag.
    pub fn negate_mask(mask: Self) -> Self {
        Self::from_raw(!mask.values, mask.presence)
    }

    /// Render the lowest `count` flags, highest index first.
    pub fn dump(&self, count: u32) -> String {
        (0..count.min(S::BITS))
            .rev()
            .map(Flag::<S>::new)
            .map(|flag| {
                if self.is_set(flag) {
                    '1'
                } else if self.is_defined(flag) {
                    '0'
                } else {
                    '-'
                }
            })
            .collect()
    }
}

impl<S: BitStorage> fmt::Display for BitMask<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump(S::BITS))
    }
}

impl<S: BitStorage> From<Flag<S>> for BitMask<S> {
    fn from(flag: Flag<S>) -> Self {
        Self::with_set(flag.bits())
    }
}

impl<S: BitStorage> From<Bits<S>> for BitMask<S> {
    fn from(bits: Bits<S>) -> Self {
        Self::with_set(bits)
    }
}

impl<S: BitStorage> Neg for Flag<S> {
    type Output = BitMask<S>;
    fn neg(self) -> BitMask<S> {
        BitMask::with_unset(self.bits())
    }
}

impl<S: BitStorage> Add for BitMask<S> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::merge_into_mask(self, rhs)
    }
}

impl<S: BitStorage> BitOr for BitMask<S> {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self::combine_with_mask(self, rhs)
    }
}

impl<S: BitStorage> BitAnd for BitMask<S> {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self::intersect_with_mask(self, rhs)
    }
}

impl<S: BitStorage> Sub for BitMask<S> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::unset_mask(self, rhs)
    }
}

impl<S: BitStorage> Not for BitMask<S> {
    type Output = Self;
    fn not(self) -> Self {
        Self::negate_mask(self)
    }
}

/// Every flag set in the mask becomes unset; nothing else is defined.
impl<S: BitStorage> Neg for BitMask<S> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::unset_mask(Self::new(), self)
    }
}
