//! Deterministic random streams
//!
//! `SeededRng` is a Mulberry32 generator: a single u32 of state, cheap to
//! clone and reseed, and bit-identical on every platform. Subsystems draw
//! from their own named stream in `RngStreams` so that, for example, an
//! audio variation never shifts the gameplay sequence.

use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Seed used when nothing else is configured
pub const DEFAULT_SEED: u32 = 123_456;

/// Mulberry32 pseudo-random generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Restart the sequence from `seed`
    pub fn reset(&mut self, seed: u32) {
        self.state = seed;
    }

    #[inline]
    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Uniform float in [0, 1)
    pub fn next(&mut self) -> f64 {
        self.step() as f64 / 4_294_967_296.0
    }

    /// Uniform float in [min, max)
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        self.next() * (max - min) + min
    }

    /// Uniform float in [min, max) narrowed to f32 for world coordinates
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        let value = self.range(min as f64, max as f64) as f32;
        // Narrowing can round up onto the excluded bound.
        if value >= max && max > min {
            min.max(max - (max - min) * f32::EPSILON)
        } else {
            value
        }
    }

    /// Uniform integer in [min, max], both bounds inclusive
    pub fn range_int(&mut self, min: i64, max: i64) -> i64 {
        self.range(min as f64, (max + 1) as f64).floor() as i64
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f64) -> bool {
        self.next() < p
    }

    /// Uniformly chosen element, `None` for an empty slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.range_int(0, items.len() as i64 - 1) as usize;
        items.get(idx)
    }

    /// In-place Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.range_int(0, i as i64) as usize;
            items.swap(i, j);
        }
    }

    /// Choose from `(item, weight)` pairs proportionally to weight
    pub fn pick_weighted<'a, T>(&mut self, table: &'a [(T, f32)]) -> Option<&'a T> {
        let total: f64 = table.iter().map(|(_, w)| *w as f64).sum();
        if table.is_empty() || total <= 0.0 {
            return None;
        }
        let mut roll = self.next() * total;
        for (item, weight) in table {
            roll -= *weight as f64;
            if roll < 0.0 {
                return Some(item);
            }
        }
        table.last().map(|(item, _)| item)
    }
}

impl Default for SeededRng {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = self.step() as u64;
        let hi = self.step() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for SeededRng {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

/// Seeds for every independent stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedTable {
    pub terrain: u32,
    pub gameplay: u32,
    pub audio: u32,
    /// Base for per-chunk content streams
    pub chunk_base: u32,
}

impl Default for SeedTable {
    fn default() -> Self {
        Self {
            terrain: 42,
            gameplay: 8888,
            audio: 1337,
            chunk_base: 42,
        }
    }
}

impl SeedTable {
    /// Derive every stream from one run seed
    pub fn from_run_seed(seed: u64) -> Self {
        let mut root = SeededRng::new((seed ^ (seed >> 32)) as u32);
        Self {
            terrain: root.next_u32(),
            gameplay: root.next_u32(),
            audio: root.next_u32(),
            chunk_base: root.next_u32(),
        }
    }
}

/// Independent named random streams
#[derive(Debug, Clone)]
pub struct RngStreams {
    pub terrain: SeededRng,
    pub gameplay: SeededRng,
    pub audio: SeededRng,
}

impl RngStreams {
    pub fn new(seeds: &SeedTable) -> Self {
        Self {
            terrain: SeededRng::new(seeds.terrain),
            gameplay: SeededRng::new(seeds.gameplay),
            audio: SeededRng::new(seeds.audio),
        }
    }
}

impl Default for RngStreams {
    fn default() -> Self {
        Self::new(&SeedTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededRng::new(99);
        let mut b = SeededRng::new(99);
        for _ in 0..100 {
            assert_eq!(a.next().to_bits(), b.next().to_bits());
        }
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut rng = SeededRng::new(5);
        let first: Vec<u32> = (0..4).map(|_| rng.next_u32()).collect();
        rng.reset(5);
        let again: Vec<u32> = (0..4).map(|_| rng.next_u32()).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn test_range_int_is_inclusive() {
        let mut rng = SeededRng::new(1);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2000 {
            let v = rng.range_int(2, 6);
            assert!((2..=6).contains(&v));
            seen_min |= v == 2;
            seen_max |= v == 6;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn test_pick_empty_is_none() {
        let mut rng = SeededRng::new(1);
        let empty: [u8; 0] = [];
        assert!(rng.pick(&empty).is_none());
        assert_eq!(rng.pick(&[9]), Some(&9));
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = SeededRng::new(77);
        let mut items: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
        assert_ne!(items, sorted);
    }

    #[test]
    fn test_pick_weighted_skips_zero_weight() {
        let mut rng = SeededRng::new(3);
        let table = [("never", 0.0), ("always", 1.0)];
        for _ in 0..200 {
            assert_eq!(rng.pick_weighted(&table), Some(&"always"));
        }
    }

    #[test]
    fn test_streams_are_independent() {
        let mut streams = RngStreams::default();
        let mut untouched = RngStreams::default();
        for _ in 0..50 {
            streams.audio.next();
        }
        assert_eq!(streams.gameplay.next(), untouched.gameplay.next());
        assert_eq!(streams.terrain.next(), untouched.terrain.next());
    }

    #[test]
    fn test_usable_through_rand_traits() {
        let mut rng = SeededRng::from_seed(42u32.to_le_bytes());
        let v: f32 = rng.gen_range(0.0..1.0);
        assert!((0.0..1.0).contains(&v));
    }
}
