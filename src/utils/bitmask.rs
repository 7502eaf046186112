//! Bit scanning over fixed-width trigger masks.
//!
//! Masks are `bitvec` arrays whose storage can be wider than the number of
//! meaningful bits (48 inputs live in a 64-bit word), so every scan takes an
//! explicit width.

use crate::types::{ClassMask, InputMask, NUM_INPUTS};
use bitvec::prelude::*;

pub struct BitmaskScanner;

impl BitmaskScanner {
    /// Invoke `visit` for every set bit below `width`, in ascending order.
    ///
    /// Widths larger than the mask storage are clamped. Does not allocate.
    #[inline]
    pub fn for_each_set_bit<T, O, F>(mask: &BitSlice<T, O>, width: usize, mut visit: F)
    where
        T: BitStore,
        O: BitOrder,
        F: FnMut(usize),
    {
        let width = width.min(mask.len());
        for bit in mask[..width].iter_ones() {
            visit(bit);
        }
    }

    /// Whether any bit below `width` is set
    #[inline]
    pub fn has_any<T, O>(mask: &BitSlice<T, O>, width: usize) -> bool
    where
        T: BitStore,
        O: BitOrder,
    {
        mask[..width.min(mask.len())].any()
    }
}

/// Build an input mask from the low `NUM_INPUTS` bits of `value`
pub fn input_mask_from_u64(value: u64) -> InputMask {
    InputMask::new([value & ((1u64 << NUM_INPUTS) - 1)])
}

/// Build a class mask from `value` (all 64 bits are classes)
pub fn class_mask_from_u64(value: u64) -> ClassMask {
    ClassMask::new([value])
}

/// Raw word behind an input mask
pub fn input_mask_to_u64(mask: &InputMask) -> u64 {
    mask.data[0]
}

/// Raw word behind a class mask
pub fn class_mask_to_u64(mask: &ClassMask) -> u64 {
    mask.data[0]
}
