//! Trigger pool - the consumable set of trigger kinds handed to generation.
//!
//! Kinds are drawn from a weight table by weighted random without
//! replacement. Every drawn entry leaves the table, and it only enters the
//! pool if the artifact's eligibility predicate accepts it.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::catalog::{TriggerKind, TriggerWeight, WeightTable};
use crate::config::ArtifactConfig;

/// Per-artifact whitelist check for trigger kinds.
pub trait Eligibility {
    fn is_eligible(&self, kind: TriggerKind) -> bool;
}

impl<F> Eligibility for F
where
    F: Fn(TriggerKind) -> bool,
{
    fn is_eligible(&self, kind: TriggerKind) -> bool {
        self(kind)
    }
}

impl Eligibility for ArtifactConfig {
    fn is_eligible(&self, kind: TriggerKind) -> bool {
        self.allows(kind)
    }
}

/// Trigger kinds waiting to be assigned to nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerPool {
    kinds: Vec<TriggerKind>,
    requested: usize,
}

impl TriggerPool {
    /// Take the next kind. Nodes are created in the order kinds were drawn.
    pub fn pop(&mut self) -> Option<TriggerKind> {
        if self.kinds.is_empty() {
            None
        } else {
            Some(self.kinds.remove(0))
        }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Size the pool was asked to reach.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// How many kinds short of the request the table ran out, if it did.
    pub fn shortfall(&self) -> Option<usize> {
        (self.kinds.len() < self.requested).then(|| self.requested - self.kinds.len())
    }

    pub fn kinds(&self) -> &[TriggerKind] {
        &self.kinds
    }
}

/// Draw up to `target_size` eligible kinds from `table`.
///
/// Stops early when the table runs dry; the pool is then smaller than
/// requested and the shortfall is logged. Entries with a non-positive weight
/// can never be drawn.
pub fn build_pool(
    table: &WeightTable,
    eligibility: &impl Eligibility,
    target_size: usize,
    rng: &mut impl Rng,
) -> TriggerPool {
    let mut candidates: Vec<TriggerWeight> = table
        .entries
        .iter()
        .filter(|e| e.weight.is_finite() && e.weight > 0.0)
        .copied()
        .collect();
    let mut kinds = Vec::with_capacity(target_size);

    while kinds.len() < target_size {
        let Ok(dist) = WeightedIndex::new(candidates.iter().map(|c| c.weight)) else {
            break;
        };
        let drawn = candidates.remove(dist.sample(rng));
        if eligibility.is_eligible(drawn.kind) {
            kinds.push(drawn.kind);
        }
    }

    if kinds.len() < target_size {
        log::warn!(
            "Trigger pool exhausted: requested {} kinds, got {}",
            target_size,
            kinds.len()
        );
    }

    TriggerPool {
        kinds,
        requested: target_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pool_reaches_target() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = build_pool(&WeightTable::standard(), &|_: TriggerKind| true, 6, &mut rng);
        assert_eq!(pool.len(), 6);
        assert_eq!(pool.shortfall(), None);
    }

    #[test]
    fn test_draws_without_replacement() {
        let mut rng = StdRng::seed_from_u64(2);
        let table = WeightTable::standard();
        let pool = build_pool(&table, &|_: TriggerKind| true, table.len(), &mut rng);
        let mut kinds = pool.kinds().to_vec();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), table.len());
    }

    #[test]
    fn test_ineligible_kinds_never_enter() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = ArtifactConfig {
            denied_triggers: vec![TriggerKind::Death, TriggerKind::Interact],
            ..ArtifactConfig::default()
        };
        let pool = build_pool(&WeightTable::standard(), &config, 20, &mut rng);
        assert!(!pool.kinds().contains(&TriggerKind::Death));
        assert!(!pool.kinds().contains(&TriggerKind::Interact));
        assert_eq!(pool.len(), WeightTable::standard().len() - 2);
        assert_eq!(pool.shortfall(), Some(20 - pool.len()));
    }

    #[test]
    fn test_exhaustion_degrades() {
        let mut rng = StdRng::seed_from_u64(4);
        let table = WeightTable::new(vec![
            TriggerWeight::new(TriggerKind::Heat, 1.0),
            TriggerWeight::new(TriggerKind::Cold, 1.0),
            TriggerWeight::new(TriggerKind::Magnet, 0.0),
        ]);
        let pool = build_pool(&table, &|_: TriggerKind| true, 10, &mut rng);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.requested(), 10);
        assert_eq!(pool.shortfall(), Some(8));
    }

    #[test]
    fn test_empty_table_gives_empty_pool() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut pool = build_pool(&WeightTable::default(), &|_: TriggerKind| true, 3, &mut rng);
        assert!(pool.is_empty());
        assert_eq!(pool.pop(), None);
    }

    #[test]
    fn test_pop_follows_draw_order() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut pool = build_pool(&WeightTable::standard(), &|_: TriggerKind| true, 3, &mut rng);
        let expected = pool.kinds().to_vec();
        let popped: Vec<_> = std::iter::from_fn(|| pool.pop()).collect();
        assert_eq!(popped, expected);
    }
}
