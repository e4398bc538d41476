use std::ops::RangeToInclusive;

use crate::hash::KeyedHasher;
use crate::util::{bit_log2, flip_mask, pow2_mask};

/// Cap on direct draws in the partially covered power-of-two range.
pub const MAX_ITERATIONS: u32 = 64;

/// FlipHash over `[0, buckets)`.
///
/// Growing `buckets` by one either leaves the result unchanged or moves it
/// to the new last index. `buckets <= 1` always yields 0.
#[inline]
pub fn fliphash<K, H>(hasher: &H, key: &K, seed: u64, buckets: u64) -> u64
where
    K: ?Sized,
    H: KeyedHasher<K> + ?Sized,
{
    match buckets {
        0 | 1 => 0,
        n => fliphash_range(hasher, key, seed, ..=n - 1),
    }
}

/// FlipHash over `..=range.end`.
///
/// Steps:
/// 1) draw once in the smallest power-of-two range covering `end`
/// 2) flip the bits under the draw's top bit; done if it lands in range
/// 3) otherwise draw directly in the upper half, up to [`MAX_ITERATIONS`] times
/// 4) fall back to the lower half, reusing the first draw
pub fn fliphash_range<K, H>(hasher: &H, key: &K, seed: u64, range: RangeToInclusive<u64>) -> u64
where
    K: ?Sized,
    H: KeyedHasher<K> + ?Sized,
{
    let end = range.end;
    if end == 0 {
        return 0;
    }
    let mask = pow2_mask(end);
    let hash = hasher.hash(key, seed, 0, 0);

    let candidate = flip_pow2(hasher, key, seed, hash, mask);
    if candidate <= end {
        return candidate;
    }

    let end_log2 = bit_log2(end);
    for iteration in 1..=MAX_ITERATIONS {
        let draw = hasher.hash(key, seed, end_log2, iteration) & mask;
        if draw <= mask >> 1 {
            // Lower half is already covered by the fallback below.
            break;
        } else if draw <= end {
            return draw;
        }
    }

    flip_pow2(hasher, key, seed, hash, mask >> 1)
}

/// Consistent hash of `hash` into `[0, mask]`: keeps the top set bit of the
/// masked value and rerandomizes everything below it.
#[inline]
fn flip_pow2<K, H>(hasher: &H, key: &K, seed: u64, hash: u64, mask: u64) -> u64
where
    K: ?Sized,
    H: KeyedHasher<K> + ?Sized,
{
    match hash & mask {
        0 => 0,
        masked => {
            let flipper = hasher.hash(key, seed, bit_log2(masked), 0) & flip_mask(masked);
            masked ^ flipper
        }
    }
}
