use std::collections::HashSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::domain::{RepaymentSummary, TierId};

/// Condition a borrower must meet, in addition to completing the previous tier,
/// before a tier becomes available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "threshold")]
pub enum UnlockRule {
    Open,
    OnTimeRatioAtLeast(Decimal),
}

impl UnlockRule {
    pub fn is_satisfied(&self, summary: &RepaymentSummary) -> bool {
        match self {
            UnlockRule::Open => true,
            UnlockRule::OnTimeRatioAtLeast(threshold) => summary.on_time_ratio >= *threshold,
        }
    }
}

/// A loan product level in the progression ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTier {
    pub id: TierId,
    pub label: String,
    pub order: u32,
    pub principal: Decimal,
    pub term_months: u32,
    pub monthly_payment: Decimal,
    pub unlock_rule: UnlockRule,
    pub requirement: String,
}

impl LoanTier {
    /// Interest-free tier whose monthly payment is the principal spread evenly over the term.
    pub fn interest_free(
        id: &str,
        label: &str,
        order: u32,
        principal: Decimal,
        term_months: u32,
        unlock_rule: UnlockRule,
        requirement: &str,
    ) -> Self {
        let monthly_payment = if term_months == 0 {
            Decimal::ZERO
        } else {
            (principal / Decimal::from(term_months)).round_dp(2)
        };

        Self {
            id: TierId::new(id),
            label: label.to_string(),
            order,
            principal,
            term_months,
            monthly_payment,
            unlock_rule,
            requirement: requirement.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("tier order {0} is declared more than once")]
    DuplicateOrder(u32),
    #[error("tier id '{0}' is declared more than once")]
    DuplicateId(TierId),
    #[error("tier '{tier}' must have a positive {field}")]
    NonPositive { tier: TierId, field: &'static str },
    #[error("tier '{tier}' on-time threshold {threshold} must lie within 0..=1")]
    ThresholdOutOfRange { tier: TierId, threshold: Decimal },
}

/// Ordered registry of loan tiers. Ordering is by `LoanTier::order` and is fixed
/// once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TierCatalog {
    tiers: Vec<LoanTier>,
}

impl TierCatalog {
    pub fn new(mut tiers: Vec<LoanTier>) -> Result<Self, CatalogError> {
        let mut orders = HashSet::new();
        let mut ids = HashSet::new();

        for tier in &tiers {
            if !orders.insert(tier.order) {
                return Err(CatalogError::DuplicateOrder(tier.order));
            }
            if !ids.insert(tier.id.clone()) {
                return Err(CatalogError::DuplicateId(tier.id.clone()));
            }
            validate_amounts(tier)?;
        }

        tiers.sort_by_key(|tier| tier.order);
        Ok(Self { tiers })
    }

    /// The three interest-free tiers offered to every borrower.
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                LoanTier::interest_free(
                    "standard",
                    "Standard",
                    0,
                    dec!(50),
                    12,
                    UnlockRule::Open,
                    "Available to apply",
                ),
                LoanTier::interest_free(
                    "premium",
                    "Premium",
                    1,
                    dec!(100),
                    12,
                    UnlockRule::Open,
                    "Complete £50 loan successfully",
                ),
                LoanTier::interest_free(
                    "exclusive",
                    "Exclusive",
                    2,
                    dec!(150),
                    12,
                    UnlockRule::OnTimeRatioAtLeast(dec!(0.95)),
                    "95% on-time payments on £100 loan",
                ),
            ],
        }
    }

    pub fn tiers(&self) -> &[LoanTier] {
        &self.tiers
    }

    pub fn get(&self, id: &TierId) -> Option<&LoanTier> {
        self.tiers.iter().find(|tier| &tier.id == id)
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

fn validate_amounts(tier: &LoanTier) -> Result<(), CatalogError> {
    let non_positive = |field| CatalogError::NonPositive {
        tier: tier.id.clone(),
        field,
    };

    if tier.principal <= Decimal::ZERO {
        return Err(non_positive("principal"));
    }
    if tier.term_months == 0 {
        return Err(non_positive("term"));
    }
    if tier.monthly_payment <= Decimal::ZERO {
        return Err(non_positive("monthly payment"));
    }
    if let UnlockRule::OnTimeRatioAtLeast(threshold) = tier.unlock_rule {
        if threshold < Decimal::ZERO || threshold > Decimal::ONE {
            return Err(CatalogError::ThresholdOutOfRange {
                tier: tier.id.clone(),
                threshold,
            });
        }
    }
    Ok(())
}
