use std::borrow::Cow;
use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{
    CumulativeProgressPoint, PaymentPoint, PaymentRecord, PeriodLabel, RepaymentSummary, TierId,
};

/// Running cumulative-paid series, one point per billing period.
///
/// Records are expected in ascending `period.sequence`. A feed that arrives out of
/// order is stably re-ordered before accumulating so the series never decreases.
/// Totals saturate at [`Decimal::MAX`].
pub fn aggregate(history: &[PaymentRecord]) -> Vec<CumulativeProgressPoint> {
    let ordered = chronological(history);
    let mut running_total = Decimal::ZERO;

    ordered
        .iter()
        .map(|record| {
            running_total = running_total.saturating_add(record.repaid());
            CumulativeProgressPoint {
                period: record.period.clone(),
                cumulative_paid: running_total,
            }
        })
        .collect()
}

/// Amount paid in each period, missing amounts reported as zero.
pub fn payment_series(history: &[PaymentRecord]) -> Vec<PaymentPoint> {
    chronological(history)
        .iter()
        .map(|record| PaymentPoint {
            period: record.period.clone(),
            amount_paid: record.repaid(),
        })
        .collect()
}

/// Fraction of periods paid on time. An empty history yields zero.
pub fn on_time_ratio(history: &[PaymentRecord]) -> Decimal {
    if history.is_empty() {
        return Decimal::ZERO;
    }

    let on_time = history.iter().filter(|record| record.on_time).count();
    Decimal::from(on_time) / Decimal::from(history.len())
}

/// Sum of repaid amounts, saturating at [`Decimal::MAX`].
pub fn total_repaid(history: &[PaymentRecord]) -> Decimal {
    history
        .iter()
        .map(PaymentRecord::repaid)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Builds the facts tier unlock rules are evaluated against.
pub fn summarize(
    history: &[PaymentRecord],
    completed_tier_ids: impl IntoIterator<Item = TierId>,
) -> RepaymentSummary {
    RepaymentSummary {
        completed_tier_ids: completed_tier_ids.into_iter().collect::<BTreeSet<_>>(),
        on_time_ratio: on_time_ratio(history),
        total_repaid: total_repaid(history),
    }
}

/// Progress of a cumulative series toward a repayment target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProgress {
    pub target: Decimal,
    pub total_paid: Decimal,
    pub remaining: Decimal,
    pub reached_at: Option<PeriodLabel>,
}

impl TargetProgress {
    pub fn is_reached(&self) -> bool {
        self.reached_at.is_some()
    }
}

pub fn target_progress(points: &[CumulativeProgressPoint], target: Decimal) -> TargetProgress {
    let total_paid = points
        .last()
        .map(|point| point.cumulative_paid)
        .unwrap_or(Decimal::ZERO);
    let reached_at = points
        .iter()
        .find(|point| point.cumulative_paid >= target)
        .map(|point| point.period.clone());

    TargetProgress {
        target,
        total_paid,
        remaining: (target - total_paid).max(Decimal::ZERO),
        reached_at,
    }
}

fn chronological(history: &[PaymentRecord]) -> Cow<'_, [PaymentRecord]> {
    let ordered = history
        .windows(2)
        .all(|pair| pair[0].period.sequence <= pair[1].period.sequence);
    if ordered {
        return Cow::Borrowed(history);
    }

    warn!(
        records = history.len(),
        "payment history arrived out of period order; re-ordering before aggregation"
    );
    let mut sorted = history.to_vec();
    sorted.sort_by_key(|record| record.period.sequence);
    Cow::Owned(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(sequence: u32, label: &str, repaid: Option<Decimal>, on_time: bool) -> PaymentRecord {
        PaymentRecord {
            period: PeriodLabel::new(sequence, label),
            amount_repaid: repaid,
            amount_due: Some(dec!(8.33)),
            on_time,
        }
    }

    fn sample_history() -> Vec<PaymentRecord> {
        vec![
            record(1, "Jan", Some(dec!(8.33)), true),
            record(2, "Feb", None, false),
            record(3, "Mar", Some(dec!(16.66)), true),
            record(4, "Apr", Some(dec!(8.34)), true),
        ]
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let history = vec![
            record(1, "Jan", Some(Decimal::MAX), true),
            record(2, "Feb", Some(Decimal::MAX), true),
        ];

        let totals: Vec<_> = aggregate(&history)
            .iter()
            .map(|p| p.cumulative_paid)
            .collect();
        assert_eq!(totals, vec![Decimal::MAX, Decimal::MAX]);
        assert_eq!(total_repaid(&history), Decimal::MAX);
        assert_eq!(summarize(&history, Vec::<TierId>::new()).total_repaid, Decimal::MAX);
    }

    #[test]
    fn negative_amounts_do_not_pull_the_series_down() {
        let history = vec![
            record(1, "Jan", Some(dec!(10)), true),
            record(2, "Feb", Some(dec!(-5)), true),
        ];

        let totals: Vec<_> = aggregate(&history)
            .iter()
            .map(|p| p.cumulative_paid)
            .collect();
        assert_eq!(totals, vec![dec!(10), dec!(10)]);
        assert_eq!(total_repaid(&history), dec!(10));
    }

    #[test]
    fn aggregate_emits_running_totals_one_per_record() {
        let history = sample_history();
        let points = aggregate(&history);

        assert_eq!(points.len(), history.len());
        let totals: Vec<_> = points.iter().map(|p| p.cumulative_paid).collect();
        assert_eq!(totals, vec![dec!(8.33), dec!(8.33), dec!(24.99), dec!(33.33)]);
        assert!(points
            .windows(2)
            .all(|pair| pair[0].cumulative_paid <= pair[1].cumulative_paid));
        assert_eq!(points[1].period.label, "Feb");
    }

    #[test]
    fn final_cumulative_matches_plain_sum() {
        let history = sample_history();
        let points = aggregate(&history);
        let last = points.last().expect("non-empty series");
        assert_eq!(last.cumulative_paid, total_repaid(&history));
    }

    #[test]
    fn decimal_accumulation_has_no_float_drift() {
        let history: Vec<_> = (1..=10)
            .map(|n| record(n, "M", Some(dec!(0.1)), true))
            .collect();
        let points = aggregate(&history);
        assert_eq!(points[9].cumulative_paid, dec!(1.0));
    }

    #[test]
    fn aggregate_of_empty_history_is_empty() {
        assert!(aggregate(&[]).is_empty());
        assert!(payment_series(&[]).is_empty());
    }

    #[test]
    fn out_of_order_history_is_reordered_before_accumulating() {
        let history = vec![
            record(2, "Feb", Some(dec!(5)), true),
            record(1, "Jan", Some(dec!(10)), true),
        ];
        let points = aggregate(&history);
        assert_eq!(points[0].period.label, "Jan");
        assert_eq!(points[0].cumulative_paid, dec!(10));
        assert_eq!(points[1].cumulative_paid, dec!(15));
    }

    #[test]
    fn on_time_ratio_handles_edges() {
        assert_eq!(on_time_ratio(&[]), Decimal::ZERO);

        let all_on_time = vec![
            record(1, "Jan", Some(dec!(1)), true),
            record(2, "Feb", Some(dec!(1)), true),
        ];
        assert_eq!(on_time_ratio(&all_on_time), Decimal::ONE);

        assert_eq!(on_time_ratio(&sample_history()), dec!(0.75));
    }

    #[test]
    fn payment_series_reports_zero_for_missing_amounts() {
        let series = payment_series(&sample_history());
        assert_eq!(series[1].amount_paid, Decimal::ZERO);
        assert_eq!(series[2].amount_paid, dec!(16.66));
    }

    #[test]
    fn summarize_collects_ratio_total_and_completions() {
        let summary = summarize(&sample_history(), [TierId::new("standard")]);
        assert_eq!(summary.on_time_ratio, dec!(0.75));
        assert_eq!(summary.total_repaid, dec!(33.33));
        assert!(summary.has_completed(&TierId::new("standard")));
    }

    #[test]
    fn target_progress_marks_first_period_reaching_target() {
        let history = vec![
            record(1, "Jan", Some(dec!(60)), true),
            record(2, "Feb", Some(dec!(40)), true),
            record(3, "Mar", Some(dec!(10)), true),
        ];
        let progress = target_progress(&aggregate(&history), dec!(100));
        assert!(progress.is_reached());
        assert_eq!(progress.reached_at.map(|p| p.label), Some("Feb".to_string()));
        assert_eq!(progress.remaining, Decimal::ZERO);
        assert_eq!(progress.total_paid, dec!(110));
    }

    #[test]
    fn target_progress_reports_remaining_when_short() {
        let history = vec![record(1, "Jan", Some(dec!(30)), true)];
        let progress = target_progress(&aggregate(&history), dec!(100));
        assert!(!progress.is_reached());
        assert_eq!(progress.remaining, dec!(70));
    }
}
