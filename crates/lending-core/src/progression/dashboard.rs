use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::aggregation::{aggregate, payment_series, summarize, target_progress, TargetProgress};
use super::domain::{
    AccountProfile, CumulativeProgressPoint, PaymentPoint, RepaymentSummary, TierId,
};
use super::eligibility::{evaluate, TierState};
use super::schedule::{
    payment_history, summarize_loan, HistoryEntry, Installment, LoanRecord, LoanSummary,
};
use super::status::{classify, AccountStatus};
use super::tiers::TierCatalog;

/// Whatever the upstream feeds managed to supply for one borrower. Every field
/// may be missing; the dashboard is built from what is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardInputs {
    #[serde(default)]
    pub profile: Option<AccountProfile>,
    #[serde(default)]
    pub loan: Option<LoanRecord>,
    #[serde(default)]
    pub status_label: Option<String>,
    #[serde(default)]
    pub installments: Vec<Installment>,
    #[serde(default)]
    pub completed_tier_ids: BTreeSet<TierId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub today: NaiveDate,
    pub repayment_target: Decimal,
    pub reminder_lead_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierView {
    pub tier_id: TierId,
    pub label: String,
    pub principal: Decimal,
    pub term_months: u32,
    pub monthly_payment: Decimal,
    pub requirement: String,
    pub state: TierState,
    pub state_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorrowerDashboard {
    pub profile: Option<AccountProfile>,
    pub loan: Option<LoanSummary>,
    pub status: Option<AccountStatus>,
    pub status_label: Option<&'static str>,
    pub history: Vec<HistoryEntry>,
    pub payment_series: Vec<PaymentPoint>,
    pub cumulative_progress: Vec<CumulativeProgressPoint>,
    pub target: TargetProgress,
    pub summary: RepaymentSummary,
    pub tiers: Vec<TierView>,
}

impl BorrowerDashboard {
    pub fn build(
        inputs: &DashboardInputs,
        catalog: &TierCatalog,
        settings: &DashboardSettings,
    ) -> Self {
        let loan = inputs.loan.as_ref().map(|loan| {
            summarize_loan(
                loan,
                &inputs.installments,
                settings.today,
                settings.reminder_lead_days,
            )
        });

        let status = loan
            .as_ref()
            .map(|summary| summary.status)
            .or_else(|| inputs.status_label.as_deref().map(classify));

        let history = payment_history(&inputs.installments, settings.today);
        let amount_due = loan.as_ref().map(|summary| summary.monthly_payment);
        let records: Vec<_> = history
            .iter()
            .filter(|entry| entry.is_elapsed())
            .map(|entry| entry.to_payment_record(amount_due))
            .collect();

        let cumulative_progress = aggregate(&records);
        let target = target_progress(&cumulative_progress, settings.repayment_target);
        let summary = summarize(&records, inputs.completed_tier_ids.iter().cloned());
        let eligibility = evaluate(catalog, &summary);

        let tiers = catalog
            .tiers()
            .iter()
            .map(|tier| {
                let state = eligibility.get(&tier.id).unwrap_or(TierState::Locked);
                TierView {
                    tier_id: tier.id.clone(),
                    label: tier.label.clone(),
                    principal: tier.principal,
                    term_months: tier.term_months,
                    monthly_payment: tier.monthly_payment,
                    requirement: tier.requirement.clone(),
                    state,
                    state_label: state.label(),
                }
            })
            .collect();

        debug!(
            periods = records.len(),
            on_time_ratio = %summary.on_time_ratio,
            next_tier = ?eligibility.next_available(),
            "borrower dashboard computed"
        );

        Self {
            profile: inputs.profile.clone(),
            loan,
            status,
            status_label: status.map(AccountStatus::label),
            history,
            payment_series: payment_series(&records),
            cumulative_progress,
            target,
            summary,
            tiers,
        }
    }
}
