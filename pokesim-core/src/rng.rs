//! Deterministic battle PRNG.
//!
//! A 32-bit linear congruential generator using the Showdown constants, so a
//! seed plus a draw count fully determines the stream on every architecture.
//! Engine code must never reach for an ambient randomness source; every roll
//! goes through the battle's own `BattlePrng`.

use serde::{Deserialize, Serialize};

const MULTIPLIER: u32 = 0x41C6_4E6D;
const INCREMENT: u32 = 0x6073;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlePrng {
    seed: u32,
    state: u32,
}

impl BattlePrng {
    pub fn new(seed: u32) -> Self {
        Self { seed, state: seed }
    }

    /// Restore a generator mid-stream, e.g. from a serialized battle state.
    pub fn from_state(seed: u32, state: u32) -> Self {
        Self { seed, state }
    }

    pub fn initial_seed(&self) -> u32 {
        self.seed
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    fn advance(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        self.state
    }

    /// Uniform integer in `[0, max)`. The upper 16 bits of the LCG state are
    /// used; the low bits of an LCG are too regular for game rolls.
    pub fn next(&mut self, max: u32) -> u32 {
        debug_assert!(max > 0, "next() needs a non-empty range");
        (self.advance() >> 16) % max
    }

    /// True with probability `numerator / denominator`.
    pub fn chance(&mut self, numerator: u32, denominator: u32) -> bool {
        self.next(denominator) < numerator
    }

    /// Uniform integer in `[min, max]`, both inclusive.
    pub fn range(&mut self, min: u32, max: u32) -> u32 {
        min + self.next(max - min + 1)
    }

    /// Fisher-Yates shuffle of a small index list.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = BattlePrng::new(42);
        let mut b = BattlePrng::new(42);
        for _ in 0..256 {
            assert_eq!(a.next(1000), b.next(1000));
        }
    }

    #[test]
    fn state_restores_mid_stream() {
        let mut a = BattlePrng::new(7);
        for _ in 0..10 {
            a.next(100);
        }
        let mut b = BattlePrng::from_state(a.initial_seed(), a.state());
        for _ in 0..50 {
            assert_eq!(a.next(100), b.next(100));
        }
    }

    #[test]
    fn range_is_inclusive() {
        let mut rng = BattlePrng::new(99);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2000 {
            let v = rng.range(85, 100);
            assert!((85..=100).contains(&v));
            seen_min |= v == 85;
            seen_max |= v == 100;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn shuffle_permutes() {
        let mut rng = BattlePrng::new(3);
        let mut items = [0usize, 1, 2, 3, 4, 5];
        rng.shuffle(&mut items);
        let mut sorted = items;
        sorted.sort_unstable();
        assert_eq!(sorted, [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn chance_matches_next() {
        let mut a = BattlePrng::new(11);
        let mut b = BattlePrng::new(11);
        for _ in 0..100 {
            assert_eq!(a.chance(25, 100), b.next(100) < 25);
        }
    }
}
