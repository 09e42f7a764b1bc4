use serde::{Deserialize, Serialize};

use super::domain::{RepaymentSummary, TierId};
use super::tiers::TierCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierState {
    Available,
    Locked,
    Completed,
}

impl TierState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "Available to Apply",
            Self::Locked => "Locked",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierEligibility {
    pub tier_id: TierId,
    pub state: TierState,
}

/// Unlock state per tier, kept in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierEligibilityMap {
    entries: Vec<TierEligibility>,
}

impl TierEligibilityMap {
    pub fn get(&self, tier_id: &TierId) -> Option<TierState> {
        self.entries
            .iter()
            .find(|entry| &entry.tier_id == tier_id)
            .map(|entry| entry.state)
    }

    pub fn entries(&self) -> &[TierEligibility] {
        &self.entries
    }

    /// Lowest-order tier the borrower may apply for now.
    pub fn next_available(&self) -> Option<&TierId> {
        self.entries
            .iter()
            .find(|entry| entry.state == TierState::Available)
            .map(|entry| &entry.tier_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Walks the catalog in order. A tier past the first unlocks only when its
/// predecessor is completed and its own rule holds; completed tiers stay
/// completed whatever the ratio.
pub fn evaluate(catalog: &TierCatalog, summary: &RepaymentSummary) -> TierEligibilityMap {
    let mut previous: Option<&TierId> = None;
    let mut entries = Vec::with_capacity(catalog.len());

    for tier in catalog.tiers() {
        let state = if summary.has_completed(&tier.id) {
            TierState::Completed
        } else {
            match previous {
                None => TierState::Available,
                Some(prior)
                    if summary.has_completed(prior) && tier.unlock_rule.is_satisfied(summary) =>
                {
                    TierState::Available
                }
                Some(_) => TierState::Locked,
            }
        };

        entries.push(TierEligibility {
            tier_id: tier.id.clone(),
            state,
        });
        previous = Some(&tier.id);
    }

    TierEligibilityMap { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::tiers::{LoanTier, UnlockRule};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn summary(completed: &[&str], ratio: Decimal) -> RepaymentSummary {
        RepaymentSummary {
            completed_tier_ids: completed.iter().map(|id| TierId::new(*id)).collect(),
            on_time_ratio: ratio,
            total_repaid: Decimal::ZERO,
        }
    }

    fn states(map: &TierEligibilityMap) -> Vec<TierState> {
        map.entries().iter().map(|entry| entry.state).collect()
    }

    #[test]
    fn new_borrower_can_only_apply_for_first_tier() {
        let map = evaluate(&TierCatalog::standard(), &summary(&[], Decimal::ZERO));
        assert_eq!(
            states(&map),
            vec![TierState::Available, TierState::Locked, TierState::Locked]
        );
        assert_eq!(map.next_available(), Some(&TierId::new("standard")));
    }

    #[test]
    fn completing_first_tier_unlocks_second_without_ratio() {
        let map = evaluate(&TierCatalog::standard(), &summary(&["standard"], dec!(0.5)));
        assert_eq!(map.get(&TierId::new("standard")), Some(TierState::Completed));
        assert_eq!(map.get(&TierId::new("premium")), Some(TierState::Available));
        assert_eq!(map.get(&TierId::new("exclusive")), Some(TierState::Locked));
    }

    #[test]
    fn third_tier_requires_on_time_threshold() {
        let catalog = TierCatalog::standard();
        let below = evaluate(&catalog, &summary(&["standard", "premium"], dec!(0.90)));
        assert_eq!(below.get(&TierId::new("exclusive")), Some(TierState::Locked));
        assert_eq!(below.next_available(), None);

        let above = evaluate(&catalog, &summary(&["standard", "premium"], dec!(0.96)));
        assert_eq!(above.get(&TierId::new("exclusive")), Some(TierState::Available));
    }

    #[test]
    fn threshold_alone_never_skips_a_tier() {
        let map = evaluate(&TierCatalog::standard(), &summary(&["standard"], Decimal::ONE));
        assert_eq!(map.get(&TierId::new("exclusive")), Some(TierState::Locked));
    }

    #[test]
    fn completed_tiers_ignore_ratio() {
        let map = evaluate(
            &TierCatalog::standard(),
            &summary(&["standard", "premium", "exclusive"], Decimal::ZERO),
        );
        assert_eq!(states(&map), vec![TierState::Completed; 3]);
        assert_eq!(map.next_available(), None);
    }

    #[test]
    fn empty_catalog_yields_empty_map() {
        let map = evaluate(&TierCatalog::default(), &summary(&["standard"], Decimal::ONE));
        assert!(map.is_empty());
    }

    #[test]
    fn evaluation_generalizes_to_longer_ladders() {
        let catalog = TierCatalog::new(vec![
            LoanTier::interest_free("t0", "T0", 0, dec!(10), 1, UnlockRule::Open, ""),
            LoanTier::interest_free("t1", "T1", 1, dec!(20), 2, UnlockRule::Open, ""),
            LoanTier::interest_free(
                "t2",
                "T2",
                2,
                dec!(30),
                3,
                UnlockRule::OnTimeRatioAtLeast(dec!(0.8)),
                "",
            ),
            LoanTier::interest_free(
                "t3",
                "T3",
                3,
                dec!(40),
                4,
                UnlockRule::OnTimeRatioAtLeast(dec!(0.9)),
                "",
            ),
        ])
        .expect("valid catalog");

        let map = evaluate(&catalog, &summary(&["t0", "t1", "t2"], dec!(0.85)));
        assert_eq!(
            states(&map),
            vec![
                TierState::Completed,
                TierState::Completed,
                TierState::Completed,
                TierState::Locked,
            ]
        );
    }
}
