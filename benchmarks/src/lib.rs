//! Shared fixtures for the Collider benchmarks.
//!
//! [`baseline_trial`] is a single-threaded reference: a plain `HashMap` of
//! occurrence counts fed by a seeded PRNG. The concurrent ladder is measured
//! against it.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Worker counts worth benchmarking on this machine: 1, 2, 4, ... up to the
/// number of CPUs.
pub fn worker_counts() -> Vec<usize> {
    let cpus = num_cpus::get().max(1);
    std::iter::successors(Some(1usize), |&n| Some(n * 2))
        .take_while(|&n| n <= cpus)
        .collect()
}

/// Draw from `[0, 2^difficulty)` until some value appears `collision_order`
/// times and return the number of draws.
///
/// `difficulty` must be in `1..=63`.
pub fn baseline_trial(difficulty: u32, collision_order: u32, seed: u64) -> u64 {
    let mut rng = StdRng::seed_from_u64(seed);
    let bound = 1u64 << difficulty;
    let mut counts: HashMap<u64, u32> = HashMap::new();
    let mut draws = 0;
    loop {
        draws += 1;
        let count = counts.entry(rng.gen_range(0..bound)).or_insert(0);
        *count += 1;
        if *count >= collision_order {
            return draws;
        }
    }
}

/// A script of `distinct` fresh values followed by `collision_order` copies
/// of one more, so a single-worker trial walks the whole ladder exactly once.
pub fn ladder_script(distinct: u64, collision_order: usize) -> Vec<u64> {
    (0..distinct)
        .chain(std::iter::repeat(distinct).take(collision_order))
        .collect()
}
