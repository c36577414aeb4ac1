//! Provider Selector
//!
//! Weighted roulette over the enabled entries of a pool, walked in document
//! order. Randomness is injected so selection is reproducible under a seed.

use rand::Rng;

use super::definition::ProviderDefinition;
use crate::config::ConfigSnapshot;
use crate::types::{ComplexityClass, Result, VoxError};

/// Pick one provider for `class`
pub fn select<R: Rng>(
    snapshot: &ConfigSnapshot,
    class: ComplexityClass,
    rng: &mut R,
) -> Result<ProviderDefinition> {
    let candidates: Vec<_> = snapshot
        .pool(class)
        .iter()
        .filter(|(_, entry)| entry.is_enabled())
        .collect();

    if candidates.is_empty() {
        return Err(VoxError::no_provider(
            class,
            format!("no enabled entry in {}", class.pool_key()),
        ));
    }

    let total: u64 = candidates
        .iter()
        .map(|(_, entry)| u64::from(entry.pool_weight()))
        .sum();
    let mut ticket = rng.random_range(0..total);

    for (name, entry) in &candidates {
        let weight = u64::from(entry.pool_weight());
        if ticket < weight {
            return Ok(ProviderDefinition::materialize(name, class, entry));
        }
        ticket -= weight;
    }

    // Unreachable while ticket < total; keep the last candidate rather than panic
    let (name, entry) = candidates[candidates.len() - 1];
    Ok(ProviderDefinition::materialize(name, class, entry))
}

/// Enabled entries other than `exclude`, by priority asc, weight desc, then
/// document order
pub fn fallback_candidates(
    snapshot: &ConfigSnapshot,
    class: ComplexityClass,
    exclude: &[&str],
) -> Vec<ProviderDefinition> {
    let mut candidates: Vec<(usize, ProviderDefinition)> = snapshot
        .pool(class)
        .iter()
        .enumerate()
        .filter(|(_, (name, entry))| entry.is_enabled() && !exclude.contains(&name.as_str()))
        .map(|(index, (name, entry))| (index, ProviderDefinition::materialize(name, class, entry)))
        .collect();

    candidates.sort_by(|(ia, a), (ib, b)| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| b.weight.cmp(&a.weight))
            .then_with(|| ia.cmp(ib))
    });
    candidates.into_iter().map(|(_, def)| def).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderEntry, sample_document};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn snapshot() -> ConfigSnapshot {
        ConfigSnapshot::from_document(sample_document(), None).unwrap()
    }

    fn entry(weight: Option<i64>, priority: Option<i64>) -> ProviderEntry {
        ProviderEntry {
            model: Some("m".to_string()),
            api_key: Some("k".to_string()),
            weight,
            priority,
            ..Default::default()
        }
    }

    #[test]
    fn test_weighted_convergence() {
        let mut snapshot = snapshot();
        snapshot.audio_providers.clear();
        snapshot
            .audio_providers
            .insert("a".to_string(), entry(Some(70), None));
        snapshot
            .audio_providers
            .insert("b".to_string(), entry(Some(30), None));

        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<String, u32> = HashMap::new();
        for _ in 0..10_000 {
            let def = select(&snapshot, ComplexityClass::SimpleAudio, &mut rng).unwrap();
            *counts.entry(def.name).or_default() += 1;
        }

        let share_a = f64::from(counts["a"]) / 10_000.0;
        assert!((share_a - 0.70).abs() < 0.02, "share_a = {}", share_a);
    }

    #[test]
    fn test_missing_weight_counts_as_ten() {
        let mut snapshot = snapshot();
        snapshot.audio_providers.clear();
        snapshot
            .audio_providers
            .insert("weighted".to_string(), entry(Some(30), None));
        snapshot
            .audio_providers
            .insert("unweighted".to_string(), entry(None, None));

        let mut rng = StdRng::seed_from_u64(7);
        let hits = (0..8_000)
            .filter(|_| {
                select(&snapshot, ComplexityClass::SimpleAudio, &mut rng)
                    .unwrap()
                    .name
                    == "unweighted"
            })
            .count();
        let share = hits as f64 / 8_000.0;
        assert!((share - 0.25).abs() < 0.02, "share = {}", share);
    }

    #[test]
    fn test_same_seed_same_choice() {
        let snapshot = snapshot();
        let picks = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..50)
                .map(|_| {
                    select(&snapshot, ComplexityClass::ComplexText, &mut rng)
                        .unwrap()
                        .name
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(99), picks(99));
    }

    #[test]
    fn test_disabled_never_selected() {
        let snapshot = snapshot();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let def = select(&snapshot, ComplexityClass::SimpleAudio, &mut rng).unwrap();
            assert_ne!(def.name, "copilot_speech");
        }
    }

    #[test]
    fn test_empty_pool_is_no_provider() {
        let mut snapshot = snapshot();
        for entry in snapshot.text_providers.values_mut() {
            entry.enabled = Some(false);
        }
        let mut rng = StdRng::seed_from_u64(3);
        let err = select(&snapshot, ComplexityClass::ComplexText, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            VoxError::NoProviderAvailable {
                class: ComplexityClass::ComplexText,
                ..
            }
        ));
    }

    #[test]
    fn test_single_provider_always_chosen() {
        let mut snapshot = snapshot();
        snapshot.text_providers.shift_remove("mistral");
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let def = select(&snapshot, ComplexityClass::ComplexText, &mut rng).unwrap();
            assert_eq!(def.name, "claude");
        }
    }

    #[test]
    fn test_fallback_order() {
        let mut snapshot = snapshot();
        snapshot.audio_providers.clear();
        snapshot
            .audio_providers
            .insert("late".to_string(), entry(Some(5), Some(3)));
        snapshot
            .audio_providers
            .insert("light".to_string(), entry(Some(5), Some(1)));
        snapshot
            .audio_providers
            .insert("heavy".to_string(), entry(Some(50), Some(1)));
        snapshot
            .audio_providers
            .insert("default".to_string(), entry(None, None));
        snapshot
            .audio_providers
            .insert("first_pick".to_string(), entry(None, Some(1)));

        let names: Vec<_> =
            fallback_candidates(&snapshot, ComplexityClass::SimpleAudio, &["first_pick"])
                .into_iter()
                .map(|d| d.name)
                .collect();
        assert_eq!(names, vec!["heavy", "light", "late", "default"]);
    }
}
