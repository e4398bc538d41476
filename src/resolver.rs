use crate::flip::fliphash;
use crate::hash::{KeyedHasher, MoremurHasher, WyHasher, Xxh3Hasher, Xxh64Hasher};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Hash backend for byte/text keys. Integer keys always use [`MoremurHasher`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextBackend {
    #[default]
    Xxh3,
    Xxh64,
    Wyhash,
}

impl KeyedHasher<[u8]> for TextBackend {
    #[inline]
    fn hash(&self, key: &[u8], seed: u64, bit_len: u32, iteration: u32) -> u64 {
        match self {
            TextBackend::Xxh3 => Xxh3Hasher.hash(key, seed, bit_len, iteration),
            TextBackend::Xxh64 => Xxh64Hasher.hash(key, seed, bit_len, iteration),
            TextBackend::Wyhash => WyHasher.hash(key, seed, bit_len, iteration),
        }
    }
}

/// Resolver parameters. Two resolvers with equal configs route every key
/// to the same bucket.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Changing the seed reshuffles the whole layout.
    pub seed: u64,
    pub text_backend: TextBackend,
}

impl ResolverConfig {
    #[cfg(feature = "serde")]
    pub fn to_bytes(&self) -> Result<Vec<u8>, FlipError> {
        Ok(bincode::serialize(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FlipError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[derive(Debug, Error)]
pub enum FlipError {
    #[error("bucket count must not be negative, got {0}")]
    NegativeBuckets(i64),
    #[cfg(feature = "serde")]
    #[error("serialization error: {0}")]
    Serde(#[from] Box<bincode::ErrorKind>),
}

/// Validate a signed bucket count. Zero and one are accepted (they map every
/// key to bucket 0); negative counts are rejected.
pub fn checked_buckets(buckets: impl Into<i64>) -> Result<u64, FlipError> {
    let buckets = buckets.into();
    u64::try_from(buckets).map_err(|_| {
        debug!(buckets, "rejected negative bucket count");
        FlipError::NegativeBuckets(buckets)
    })
}

/// Seeded FlipHash router: `key -> [0, buckets)`.
///
/// Holds no mutable state; share it freely across threads.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    cfg: ResolverConfig,
}

impl Resolver {
    pub fn new(seed: u64) -> Self {
        Self::with_config(ResolverConfig {
            seed,
            ..Default::default()
        })
    }

    pub fn with_config(cfg: ResolverConfig) -> Self {
        debug!(seed = cfg.seed, backend = ?cfg.text_backend, "created resolver");
        Self { cfg }
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.cfg.seed
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.cfg
    }

    /// Bucket for a byte key.
    #[inline]
    pub fn resolve_text(&self, key: &[u8], buckets: impl Into<u64>) -> u64 {
        fliphash(&self.cfg.text_backend, key, self.cfg.seed, buckets.into())
    }

    #[inline]
    pub fn resolve_str(&self, key: &str, buckets: impl Into<u64>) -> u64 {
        self.resolve_text(key.as_bytes(), buckets)
    }

    /// Bucket for an integer key.
    #[inline]
    pub fn resolve_integer(&self, key: u64, buckets: impl Into<u64>) -> u64 {
        fliphash(&MoremurHasher, &key, self.cfg.seed, buckets.into())
    }

    pub fn try_resolve_text(&self, key: &[u8], buckets: impl Into<i64>) -> Result<u64, FlipError> {
        Ok(self.resolve_text(key, checked_buckets(buckets)?))
    }

    pub fn try_resolve_integer(&self, key: u64, buckets: impl Into<i64>) -> Result<u64, FlipError> {
        Ok(self.resolve_integer(key, checked_buckets(buckets)?))
    }

    /// Resolve many byte keys at once; output order matches `keys`.
    /// Runs on the rayon pool with the "parallel" feature.
    pub fn resolve_text_batch<K>(&self, keys: &[K], buckets: impl Into<u64>) -> Vec<u64>
    where
        K: AsRef<[u8]> + Sync,
    {
        let buckets = buckets.into();
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            keys.par_iter()
                .map(|k| self.resolve_text(k.as_ref(), buckets))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            keys.iter()
                .map(|k| self.resolve_text(k.as_ref(), buckets))
                .collect()
        }
    }

    /// Integer counterpart of [`Resolver::resolve_text_batch`].
    pub fn resolve_integer_batch(&self, keys: &[u64], buckets: impl Into<u64>) -> Vec<u64> {
        let buckets = buckets.into();
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            keys.par_iter()
                .map(|&k| self.resolve_integer(k, buckets))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            keys.iter()
                .map(|&k| self.resolve_integer(k, buckets))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: u64 = 987650123450;

    #[test]
    fn integer_keys_match_reference_trace() {
        let r = Resolver::new(0);
        assert_eq!(r.resolve_integer(KEY, 1u32), 0);
        assert_eq!(r.resolve_integer(KEY, 2u32), 1);
        assert_eq!(r.resolve_integer(KEY, 3u64), 2);
        assert_eq!(r.resolve_integer(KEY, 4u64), 2);
        assert_eq!(r.resolve_integer(KEY, 21u32), 2);
        assert_eq!(r.resolve_integer(KEY, 22u32), 21);
        assert_eq!(r.resolve_integer(KEY, 25u32), 24);
        assert_eq!(r.resolve_integer(KEY, 1999u32), 497);

        let reseeded = Resolver::new(123456789);
        assert_eq!(reseeded.seed(), 123456789);
        assert_eq!(reseeded.resolve_integer(KEY, 2000u32), 1935);
        assert_eq!(reseeded.resolve_integer(KEY, 2000u32), 1935);
    }

    #[test]
    fn text_keys_default_backend() {
        let r = Resolver::new(0);
        assert_eq!(r.config().text_backend, TextBackend::Xxh3);
        let cases = [
            (1, 0),
            (15, 0),
            (16, 0),
            (27, 19),
            (75, 19),
            (200, 101),
            (600, 402),
            (1000, 402),
        ];
        for (buckets, expected) in cases {
            assert_eq!(r.resolve_str("abc", buckets as u64), expected, "buckets={buckets}");
        }
        let r = Resolver::new(123456789);
        for (buckets, expected) in [(15, 10), (75, 51), (200, 154), (600, 432), (1000, 432)] {
            assert_eq!(r.resolve_text(b"abc", buckets as u64), expected);
        }
        assert_eq!(Resolver::new(0).resolve_str("xy", 1000u32), 153);
        assert_eq!(Resolver::new(123456789).resolve_str("xy", 1000u32), 996);
    }

    #[test]
    fn text_keys_xxh64_backend() {
        let r = Resolver::with_config(ResolverConfig {
            seed: 0,
            text_backend: TextBackend::Xxh64,
        });
        let cases = [(2, 1), (15, 10), (16, 10), (27, 17), (600, 277), (1000, 277)];
        for (buckets, expected) in cases {
            assert_eq!(r.resolve_str("abc", buckets as u64), expected);
        }
        assert_eq!(r.resolve_str("a", 1000u32), 842);
        let r = Resolver::with_config(ResolverConfig {
            seed: 123456789,
            text_backend: TextBackend::Xxh64,
        });
        assert_eq!(r.resolve_str("abc", 200u32), 180);
    }

    #[test]
    fn backends_disagree_but_stay_in_range() {
        let keys: Vec<String> = (0..500).map(|i| format!("tenant-{i}")).collect();
        for backend in [TextBackend::Xxh3, TextBackend::Xxh64, TextBackend::Wyhash] {
            let r = Resolver::with_config(ResolverConfig {
                seed: 17,
                text_backend: backend,
            });
            for k in &keys {
                assert!(r.resolve_str(k, 37u32) < 37);
            }
        }
        let a = Resolver::new(17);
        let b = Resolver::with_config(ResolverConfig {
            seed: 17,
            text_backend: TextBackend::Wyhash,
        });
        let differing = keys
            .iter()
            .filter(|k| a.resolve_str(k, 1000u32) != b.resolve_str(k, 1000u32))
            .count();
        assert!(differing > 400, "only {differing} keys differ");
    }

    #[test]
    fn negative_buckets_are_rejected() {
        let r = Resolver::new(0);
        assert!(matches!(
            r.try_resolve_integer(KEY, -1),
            Err(FlipError::NegativeBuckets(-1))
        ));
        assert!(matches!(
            r.try_resolve_text(b"abc", i64::MIN),
            Err(FlipError::NegativeBuckets(i64::MIN))
        ));
        assert_eq!(r.try_resolve_integer(KEY, 0).unwrap(), 0);
        assert_eq!(r.try_resolve_integer(KEY, 1).unwrap(), 0);
        assert_eq!(r.try_resolve_integer(KEY, 1999).unwrap(), 497);
        assert_eq!(r.try_resolve_text(b"abc", 16i32).unwrap(), 0);
        assert_eq!(checked_buckets(7u32).unwrap(), 7);
        assert_eq!(
            FlipError::NegativeBuckets(-3).to_string(),
            "bucket count must not be negative, got -3"
        );
    }

    #[test]
    fn batch_matches_single_lookups() {
        let r = Resolver::new(99);
        let ints: Vec<u64> = (0..10_000).map(|i| i * 7919).collect();
        let batch = r.resolve_integer_batch(&ints, 113u32);
        assert_eq!(batch.len(), ints.len());
        for (k, b) in ints.iter().zip(&batch) {
            assert_eq!(*b, r.resolve_integer(*k, 113u32));
        }

        let texts: Vec<String> = (0..2_000).map(|i| format!("user:{i}")).collect();
        let batch = r.resolve_text_batch(&texts, 64u32);
        for (k, b) in texts.iter().zip(&batch) {
            assert_eq!(*b, r.resolve_str(k, 64u32));
        }
        let empty: &[&[u8]] = &[];
        assert!(r.resolve_text_batch(empty, 10u32).is_empty());
    }

    #[test]
    fn shared_across_threads() {
        let r = Resolver::new(5);
        let expected: Vec<u64> = (0..1000).map(|k| r.resolve_integer(k, 50u32)).collect();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for k in 0..1000u64 {
                        assert_eq!(r.resolve_integer(k, 50u32), expected[k as usize]);
                    }
                });
            }
        });
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_survives_bytes() {
        let cfg = ResolverConfig {
            seed: 0xC0FF_EE00_D15E_A5E,
            text_backend: TextBackend::Xxh64,
        };
        let bytes = cfg.to_bytes().unwrap();
        let restored = ResolverConfig::from_bytes(&bytes).unwrap();
        assert_eq!(restored, cfg);

        let a = Resolver::with_config(cfg);
        let b = Resolver::with_config(restored);
        assert_eq!(a.resolve_str("orders:42", 1000u32), b.resolve_str("orders:42", 1000u32));

        assert!(matches!(
            ResolverConfig::from_bytes(&[1, 2]),
            Err(FlipError::Serde(_))
        ));
    }
}
