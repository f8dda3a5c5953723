use crate::config::SolvabilityRule;
use crate::evidence::DOMAIN_SIZE;
use crate::round::{Round, SLOT_COUNT};
use crate::sampler::{sample_k, SimpleRng};
use std::collections::BTreeSet;
use tracing::debug;

/// Redraws allowed when the biased rule needs an unsolvable offer
const MAX_MISS_ATTEMPTS: usize = 100;

/// Evidence puzzle generator
#[derive(Debug, Clone)]
pub struct Generator {
    rule: SolvabilityRule,
    rng: SimpleRng,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// Create a new generator with the emergent rule
    pub fn new() -> Self {
        Self {
            rule: SolvabilityRule::Emergent,
            rng: SimpleRng::new(),
        }
    }

    /// Create a generator with a specific seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rule: SolvabilityRule::Emergent,
            rng: SimpleRng::with_seed(seed),
        }
    }

    pub fn with_rule(mut self, rule: SolvabilityRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn rule(&self) -> SolvabilityRule {
        self.rule
    }

    /// The generator's RNG, shared with reinvestigation
    pub fn rng_mut(&mut self) -> &mut SimpleRng {
        &mut self.rng
    }

    /// Generate a fresh round in the idle phase
    pub fn generate(&mut self) -> Round {
        let required = sample_k(&mut self.rng, DOMAIN_SIZE, SLOT_COUNT);

        let offered = match self.rule {
            SolvabilityRule::Emergent => sample_k(&mut self.rng, DOMAIN_SIZE, SLOT_COUNT),
            SolvabilityRule::Biased { solvable_percent } => {
                if self.rng.chance(solvable_percent) {
                    let mut offered = required.clone();
                    self.rng.shuffle(&mut offered);
                    offered
                } else {
                    self.draw_miss(&required)
                }
            }
        };

        let round = Round::build(required, &offered);
        debug!(
            required = ?round.required(),
            offered = ?offered,
            solvable = round.solvable(),
            "generated round"
        );
        round
    }

    /// Draw an offered set whose values differ from `required`
    fn draw_miss(&mut self, required: &[u8]) -> Vec<u8> {
        let target: BTreeSet<u8> = required.iter().copied().collect();
        let mut offered = sample_k(&mut self.rng, DOMAIN_SIZE, SLOT_COUNT);
        for _ in 0..MAX_MISS_ATTEMPTS {
            if offered.iter().copied().collect::<BTreeSet<u8>>() != target {
                return offered;
            }
            offered = sample_k(&mut self.rng, DOMAIN_SIZE, SLOT_COUNT);
        }
        // Swap one offered value for a value outside the required set
        if let Some(outside) = (1..=DOMAIN_SIZE).find(|v| !target.contains(v)) {
            offered[0] = outside;
        }
        offered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_sets_are_distinct_subsets() {
        let mut generator = Generator::with_seed(42);
        for _ in 0..100 {
            let round = generator.generate();
            for values in [round.required().to_vec(), round.offered()] {
                assert_eq!(values.len(), SLOT_COUNT);
                let set: HashSet<u8> = values.iter().copied().collect();
                assert_eq!(set.len(), SLOT_COUNT);
                assert!(values.iter().all(|v| (1..=DOMAIN_SIZE).contains(v)));
            }
            for (i, slot) in round.slots().iter().enumerate() {
                assert_eq!(slot.index, i);
                assert_eq!(slot.required_value, round.required()[i]);
                assert!(slot.is_empty());
            }
        }
    }

    #[test]
    fn test_solvable_matches_set_equality() {
        let mut generator = Generator::with_seed(1);
        for _ in 0..200 {
            let round = generator.generate();
            let required: BTreeSet<u8> = round.required().iter().copied().collect();
            let offered: BTreeSet<u8> = round.offered().into_iter().collect();
            assert_eq!(round.solvable(), required == offered);
        }
    }

    #[test]
    fn test_biased_always_solvable() {
        let mut generator =
            Generator::with_seed(3).with_rule(SolvabilityRule::Biased { solvable_percent: 100 });
        for _ in 0..50 {
            assert!(generator.generate().solvable());
        }
    }

    #[test]
    fn test_biased_never_solvable() {
        let mut generator =
            Generator::with_seed(3).with_rule(SolvabilityRule::Biased { solvable_percent: 0 });
        for _ in 0..50 {
            assert!(!generator.generate().solvable());
        }
    }

    #[test]
    fn test_biased_mix() {
        let mut generator =
            Generator::with_seed(11).with_rule(SolvabilityRule::Biased { solvable_percent: 70 });
        let solvable = (0..1000).filter(|_| generator.generate().solvable()).count();
        assert!((600..=800).contains(&solvable), "solvable rounds: {}", solvable);
    }

    #[test]
    fn test_same_seed_same_round() {
        let a = Generator::with_seed(99).generate();
        let b = Generator::with_seed(99).generate();
        assert_eq!(a.required(), b.required());
        assert_eq!(a.offered(), b.offered());
    }
}
