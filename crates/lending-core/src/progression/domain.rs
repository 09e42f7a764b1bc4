use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for a loan tier in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TierId(pub String);

impl TierId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for a borrower account in the scoring feed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Billing period: `sequence` drives ordering, `label` is what charts display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodLabel {
    pub sequence: u32,
    pub label: String,
}

impl PeriodLabel {
    pub fn new(sequence: u32, label: impl Into<String>) -> Self {
        Self {
            sequence,
            label: label.into(),
        }
    }
}

/// One billing period of a borrower's repayment history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub period: PeriodLabel,
    #[serde(default)]
    pub amount_repaid: Option<Decimal>,
    #[serde(default)]
    pub amount_due: Option<Decimal>,
    #[serde(default)]
    pub on_time: bool,
}

impl PaymentRecord {
    /// Repaid amount with a missing or negative value normalized to zero.
    pub fn repaid(&self) -> Decimal {
        self.amount_repaid
            .filter(|amount| amount.is_sign_positive())
            .unwrap_or(Decimal::ZERO)
    }
}

/// Running total of repayments at the end of a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeProgressPoint {
    pub period: PeriodLabel,
    pub cumulative_paid: Decimal,
}

/// Amount paid within a single period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPoint {
    pub period: PeriodLabel,
    pub amount_paid: Decimal,
}

/// Facts about a borrower's history that tier unlock rules are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepaymentSummary {
    #[serde(default)]
    pub completed_tier_ids: BTreeSet<TierId>,
    #[serde(default)]
    pub on_time_ratio: Decimal,
    #[serde(default)]
    pub total_repaid: Decimal,
}

impl RepaymentSummary {
    pub fn has_completed(&self, tier: &TierId) -> bool {
        self.completed_tier_ids.contains(tier)
    }
}

/// Ranking input taken from the scoring feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredAccount {
    pub account_id: AccountId,
    pub total_score: Decimal,
}

/// Borrower profile as supplied by the accounts feed. Read-only for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub user_id: u32,
    pub full_name: String,
    pub dob: chrono::NaiveDate,
    pub age: u16,
    #[serde(default)]
    pub address: Option<String>,
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    pub monthly_income: Decimal,
    #[serde(default)]
    pub house_rent: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_repaid_amount_reads_as_zero() {
        let record = PaymentRecord {
            period: PeriodLabel::new(1, "Jan"),
            amount_repaid: None,
            amount_due: Some(dec!(4.17)),
            on_time: false,
        };
        assert_eq!(record.repaid(), Decimal::ZERO);
    }

    #[test]
    fn negative_repaid_amount_reads_as_zero() {
        let record = PaymentRecord {
            period: PeriodLabel::new(2, "Feb"),
            amount_repaid: Some(dec!(-5)),
            amount_due: None,
            on_time: true,
        };
        assert_eq!(record.repaid(), Decimal::ZERO);
    }

    #[test]
    fn payment_record_deserializes_with_absent_fields() {
        let record: PaymentRecord =
            serde_json::from_str(r#"{"period":{"sequence":2,"label":"Feb"}}"#)
                .expect("record parses");
        assert_eq!(record.amount_repaid, None);
        assert!(!record.on_time);
    }
}
