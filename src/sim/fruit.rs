//! Fruit kinds and their effect profiles

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::abilities::Ability;
use super::sample::{pick_weighted, pick_weighted_with};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FruitKind {
    Apple,
    Banana,
    Cherry,
    Ice,
    Mushroom,
    Star,
    Shield,
    Magnet,
}

impl FruitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FruitKind::Apple => "apple",
            FruitKind::Banana => "banana",
            FruitKind::Cherry => "cherry",
            FruitKind::Ice => "ice",
            FruitKind::Mushroom => "mushroom",
            FruitKind::Star => "star",
            FruitKind::Shield => "shield",
            FruitKind::Magnet => "magnet",
        }
    }
}

/// What eating a fruit does
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FruitProfile {
    pub kind: FruitKind,
    /// Relative selection weight
    pub weight: f64,
    pub score_delta: i32,
    /// Added to the tick interval: negative is faster
    pub speed_delta: i32,
    /// Positive grows over the next ticks, negative shrinks immediately
    pub growth_delta: i32,
    pub effect: Option<Ability>,
}

impl FruitProfile {
    const fn new(kind: FruitKind, weight: f64, score: i32, speed: i32, growth: i32) -> Self {
        Self {
            kind,
            weight,
            score_delta: score,
            speed_delta: speed,
            growth_delta: growth,
            effect: None,
        }
    }

    const fn ability(kind: FruitKind, weight: f64, effect: Ability) -> Self {
        Self {
            kind,
            weight,
            score_delta: 0,
            speed_delta: 0,
            growth_delta: 0,
            effect: Some(effect),
        }
    }
}

/// Canonical fruit table (weights sum to 1.0)
pub const CANONICAL_FRUITS: [FruitProfile; 8] = [
    FruitProfile::new(FruitKind::Apple, 0.35, 1, -5, 1),
    FruitProfile::new(FruitKind::Banana, 0.15, 2, -30, 1),
    FruitProfile::new(FruitKind::Cherry, 0.10, 5, 0, 3),
    FruitProfile::new(FruitKind::Ice, 0.10, 1, 20, 1),
    FruitProfile::new(FruitKind::Mushroom, 0.10, 2, 0, -3),
    FruitProfile::ability(FruitKind::Star, 0.05, Ability::Invincible),
    FruitProfile::ability(FruitKind::Shield, 0.08, Ability::Shield),
    FruitProfile::ability(FruitKind::Magnet, 0.07, Ability::Magnet),
];

/// Weighted fruit table used for spawning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FruitTable {
    pub profiles: Vec<FruitProfile>,
}

impl Default for FruitTable {
    fn default() -> Self {
        Self {
            profiles: CANONICAL_FRUITS.to_vec(),
        }
    }
}

impl FruitTable {
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Weights usable for selection (finite, non-negative, positive total)
    pub fn has_valid_weights(&self) -> bool {
        let valid = self
            .profiles
            .iter()
            .all(|p| p.weight.is_finite() && p.weight >= 0.0);
        valid && self.profiles.iter().map(|p| p.weight).sum::<f64>() > 0.0
    }

    /// Profile for a kind (first entry if the table lacks it)
    pub fn profile(&self, kind: FruitKind) -> Option<&FruitProfile> {
        self.profiles
            .iter()
            .find(|p| p.kind == kind)
            .or_else(|| self.profiles.first())
    }

    /// Select a profile for a uniform draw `r` in [0, 1)
    pub fn pick(&self, r: f64) -> Option<&FruitProfile> {
        pick_weighted(&self.profiles, |p| p.weight, r)
    }

    pub fn pick_with<R: Rng>(&self, rng: &mut R) -> Option<&FruitProfile> {
        pick_weighted_with(rng, &self.profiles, |p| p.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashMap;

    #[test]
    fn test_canonical_weights_sum_to_one() {
        let total: f64 = CANONICAL_FRUITS.iter().map(|p| p.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pick_table_order() {
        let table = FruitTable::default();
        assert_eq!(table.pick(0.0).unwrap().kind, FruitKind::Apple);
        assert_eq!(table.pick(0.34).unwrap().kind, FruitKind::Apple);
        assert_eq!(table.pick(0.36).unwrap().kind, FruitKind::Banana);
        assert_eq!(table.pick(0.72).unwrap().kind, FruitKind::Mushroom);
        assert_eq!(table.pick(0.99).unwrap().kind, FruitKind::Magnet);
    }

    #[test]
    fn test_selection_converges_to_weights() {
        let table = FruitTable::default();
        let mut rng = Pcg32::seed_from_u64(2024);
        let draws = 20_000;
        let mut counts: HashMap<FruitKind, usize> = HashMap::new();
        for _ in 0..draws {
            let kind = table.pick_with(&mut rng).unwrap().kind;
            *counts.entry(kind).or_default() += 1;
        }
        for profile in &table.profiles {
            let observed = counts.get(&profile.kind).copied().unwrap_or(0) as f64 / draws as f64;
            assert!(
                (observed - profile.weight).abs() < 0.02,
                "{} observed {:.3}, expected {:.3}",
                profile.kind.as_str(),
                observed,
                profile.weight
            );
        }
    }

    #[test]
    fn test_weight_validation() {
        assert!(FruitTable::default().has_valid_weights());
        let zero = FruitTable {
            profiles: vec![FruitProfile::new(FruitKind::Apple, 0.0, 1, 0, 1)],
        };
        assert!(!zero.has_valid_weights());
    }
}
