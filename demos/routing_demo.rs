use fliphash_router::{FlipError, Resolver, ResolverConfig, TextBackend};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::time::Instant;

const N_KEYS: usize = 1_000_000;
const GEN_SEED: u64 = 42;
const SHARDS: u64 = 48;

fn main() -> Result<(), FlipError> {
    println!("--- fliphash_router demo ---");
    println!("n = {N_KEYS}, shards = {SHARDS}");

    // 1) Generate keys
    let t0 = Instant::now();
    let keys = gen_keys(N_KEYS, GEN_SEED);
    let gen_s = t0.elapsed().as_secs_f64();
    println!("gen:    {:>8.3} s", gen_s);

    let cfg = ResolverConfig {
        seed: 0xC0FF_EE00_D15E_A5E,
        text_backend: TextBackend::Xxh3,
    };
    #[cfg(feature = "serde")]
    {
        // Peers rebuild the same layout from these bytes.
        let bytes = cfg.to_bytes()?;
        println!("config: {} bytes", bytes.len());
    }
    let resolver = Resolver::with_config(cfg);

    // 2) Route everything
    let t1 = Instant::now();
    let before = resolver.resolve_integer_batch(&keys, SHARDS);
    let route_s = t1.elapsed().as_secs_f64();
    println!(
        "route:  {:>8.3} s   ({:.1} M lookups/s)",
        route_s,
        N_KEYS as f64 / route_s / 1e6
    );

    // 3) Load per shard
    let mut load = vec![0usize; SHARDS as usize];
    for &b in &before {
        load[b as usize] += 1;
    }
    let (min, max) = (
        load.iter().copied().min().unwrap_or(0),
        load.iter().copied().max().unwrap_or(0),
    );
    println!(
        "load:   min={min} max={max} spread={:.2}%",
        (max - min) as f64 / min.max(1) as f64 * 100.0
    );

    // 4) Add one shard and count moved keys
    let after = resolver.resolve_integer_batch(&keys, SHARDS + 1);
    let moved = before.iter().zip(&after).filter(|(b, a)| b != a).count();
    let to_new = after.iter().filter(|&&a| a == SHARDS).count();
    println!(
        "grow:   moved={moved} ({:.2}%, ideal {:.2}%), all to new shard: {}",
        moved as f64 / N_KEYS as f64 * 100.0,
        100.0 / (SHARDS + 1) as f64,
        moved == to_new
    );

    // 5) Signed input from an external source
    let requested: i64 = -4;
    match resolver.try_resolve_text(b"orders:42", requested) {
        Ok(b) => println!("orders:42 -> {b}"),
        Err(e) => println!("rejected: {e}"),
    }

    Ok(())
}

/// Deterministic pseudo-random u64 keys.
fn gen_keys(n: usize, seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.next_u64()).collect()
}
