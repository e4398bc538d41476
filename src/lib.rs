//! fliphash_router — FlipHash consistent range hashing.
//!
//! - Stateless: key + bucket count -> bucket in `[0..n)`, no lookup table.
//! - Monotone: growing `n` to `n + 1` only ever moves keys into bucket `n`.
//! - Regular: keys spread evenly; O(1) expected keyed-hash calls, at most 67.
//!
//! ```
//! use fliphash_router::Resolver;
//!
//! let resolver = Resolver::new(0);
//! assert_eq!(resolver.resolve_integer(987650123450, 1999u32), 497);
//! assert!(resolver.resolve_str("orders:42", 16u32) < 16);
//! ```

mod flip;
mod hash;
mod resolver;
mod util;

pub use flip::{MAX_ITERATIONS, fliphash, fliphash_range};
pub use hash::{KeyedHasher, MoremurHasher, WyHasher, Xxh3Hasher, Xxh64Hasher, nonce};
pub use resolver::{FlipError, Resolver, ResolverConfig, TextBackend, checked_buckets};
pub use util::{bit_log2, flip_mask, pow2_mask};
