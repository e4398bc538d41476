//! Bit helpers for power-of-two ranges.

/// Smallest all-ones mask covering `end`, i.e. `2^bit_len(end) - 1`.
/// `pow2_mask(0) == 0`.
#[inline]
pub const fn pow2_mask(end: u64) -> u64 {
    match u64::MAX.checked_shr(end.leading_zeros()) {
        Some(mask) => mask,
        None => 0,
    }
}

/// `floor(log2(x))`. Callers must guard `x == 0`.
#[inline]
pub const fn bit_log2(x: u64) -> u32 {
    debug_assert!(x != 0);
    x.ilog2()
}

/// Mask of the bits strictly below the top set bit of `x` (`x != 0`).
#[inline]
pub const fn flip_mask(x: u64) -> u64 {
    debug_assert!(x != 0);
    u64::MAX >> x.leading_zeros() >> 1
}
