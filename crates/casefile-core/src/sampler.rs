//! Random k-subset sampling over the evidence domain

/// Small PCG-style PRNG, seeded from `getrandom` so it works under WASM
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u64,
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleRng {
    pub fn new() -> Self {
        let mut seed_bytes = [0u8; 8];
        getrandom::getrandom(&mut seed_bytes).unwrap_or_else(|_| {
            // Fallback: use a static counter if getrandom fails
            static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
            let counter = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            seed_bytes = counter.to_le_bytes();
        });
        Self::with_seed(u64::from_le_bytes(seed_bytes))
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let xorshifted = (((self.state >> 18) ^ self.state) >> 27) as u32;
        let rot = (self.state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Uniform value in `[0, bound)`. Rejects the biased tail instead of
    /// taking a plain modulo.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        assert!(bound > 0, "bound must be positive");
        let zone = u32::MAX - (u32::MAX % bound);
        loop {
            let x = self.next_u32();
            if x < zone {
                return x % bound;
            }
        }
    }

    /// Uniform value in `[lo, hi]`
    pub fn next_in_range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + self.next_below(hi - lo + 1)
    }

    /// True with probability `percent / 100`
    pub fn chance(&mut self, percent: u8) -> bool {
        self.next_below(100) < u32::from(percent)
    }

    /// Fisher-Yates shuffle, backward pass
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_below(i as u32 + 1) as usize;
            slice.swap(i, j);
        }
    }
}

/// Draw an ordered k-subset of `1..=domain_size`.
///
/// Shuffles the whole domain and keeps the first `k`. `k` larger than the
/// domain is clamped.
pub fn sample_k(rng: &mut SimpleRng, domain_size: u8, k: usize) -> Vec<u8> {
    let mut values: Vec<u8> = (1..=domain_size).collect();
    rng.shuffle(&mut values);
    values.truncate(k);
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_distinct_and_in_range() {
        let mut rng = SimpleRng::with_seed(7);
        for _ in 0..200 {
            let sample = sample_k(&mut rng, 12, 9);
            assert_eq!(sample.len(), 9);
            let set: HashSet<u8> = sample.iter().copied().collect();
            assert_eq!(set.len(), 9);
            assert!(sample.iter().all(|v| (1..=12).contains(v)));
        }
    }

    #[test]
    fn test_sample_clamps_k() {
        let mut rng = SimpleRng::with_seed(1);
        let sample = sample_k(&mut rng, 5, 9);
        let mut sorted = sample.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = SimpleRng::with_seed(42);
        let mut b = SimpleRng::with_seed(42);
        assert_eq!(sample_k(&mut a, 12, 9), sample_k(&mut b, 12, 9));
    }

    #[test]
    fn test_every_value_gets_drawn_first() {
        // Rough uniformity check: over many draws each value leads at least once
        let mut rng = SimpleRng::with_seed(3);
        let mut seen = [0usize; 12];
        for _ in 0..2400 {
            let first = sample_k(&mut rng, 12, 1)[0];
            seen[(first - 1) as usize] += 1;
        }
        for count in seen {
            assert!(count > 100, "value drawn first only {} times", count);
        }
    }

    #[test]
    fn test_next_in_range_bounds() {
        let mut rng = SimpleRng::with_seed(9);
        for _ in 0..500 {
            let v = rng.next_in_range(1, 3);
            assert!((1..=3).contains(&v));
        }
    }
}
