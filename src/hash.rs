use xxhash_rust::xxh3::xxh3_64_with_seed;
use xxhash_rust::xxh64::xxh64;

/// Keyed pseudo-random function feeding the flip search.
///
/// Every distinct `(seed, bit_len, iteration)` triple must act as an
/// independently seeded hash of `key`; the search draws its samples by
/// varying `bit_len` and `iteration` alone.
pub trait KeyedHasher<K: ?Sized> {
    fn hash(&self, key: &K, seed: u64, bit_len: u32, iteration: u32) -> u64;
}

/// Per-call seed for the byte-key backends: `bit_len` in the low 32 bits,
/// `iteration` in the high 32 bits, XORed into `seed`.
#[inline]
pub const fn nonce(seed: u64, bit_len: u32, iteration: u32) -> u64 {
    seed ^ (bit_len as u64 | (iteration as u64) << 32)
}

/// Integer keys: Moremur-style mixer over key, seed, bit length and iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoremurHasher;

impl MoremurHasher {
    const M1: u64 = 0x3C79_AC49_2BA7_B653;
    const M2: u64 = 0x1C69_B3F7_4AC4_AE35;

    #[inline]
    pub const fn mix(key: u64, seed: u64, bit_len: u32, iteration: u32) -> u64 {
        let mut k = key ^ seed;
        // 2v + 1 keeps both multipliers odd, so every step stays a bijection.
        k = k.wrapping_mul(bit_len as u64 * 2 + 1);
        k = (k ^ (k >> 27)).wrapping_mul(Self::M1);
        k = k.wrapping_mul(iteration as u64 * 2 + 1);
        k = (k ^ (k >> 33)).wrapping_mul(Self::M2);
        k ^ (k >> 27)
    }
}

impl KeyedHasher<u64> for MoremurHasher {
    #[inline]
    fn hash(&self, key: &u64, seed: u64, bit_len: u32, iteration: u32) -> u64 {
        Self::mix(*key, seed, bit_len, iteration)
    }
}

/// Byte keys through XXH3-64, reseeded per call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Xxh3Hasher;

impl KeyedHasher<[u8]> for Xxh3Hasher {
    #[inline]
    fn hash(&self, key: &[u8], seed: u64, bit_len: u32, iteration: u32) -> u64 {
        xxh3_64_with_seed(key, nonce(seed, bit_len, iteration))
    }
}

/// Byte keys through XXH64, reseeded per call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Xxh64Hasher;

impl KeyedHasher<[u8]> for Xxh64Hasher {
    #[inline]
    fn hash(&self, key: &[u8], seed: u64, bit_len: u32, iteration: u32) -> u64 {
        xxh64(key, nonce(seed, bit_len, iteration))
    }
}

/// Byte keys through wyhash, reseeded per call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WyHasher;

impl KeyedHasher<[u8]> for WyHasher {
    #[inline]
    fn hash(&self, key: &[u8], seed: u64, bit_len: u32, iteration: u32) -> u64 {
        wyhash::wyhash(key, nonce(seed, bit_len, iteration))
    }
}
