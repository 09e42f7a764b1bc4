use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{PaymentRecord, PeriodLabel};
use super::status::{derive_status, AccountStatus};

/// A borrower's loan as recorded at origination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_id: u32,
    pub original_amount: Decimal,
    pub start_date: NaiveDate,
    pub term_months: u32,
}

/// One scheduled repayment of a loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub month_number: u32,
    #[serde(default)]
    pub agreed_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_date: Option<NaiveDate>,
    #[serde(default)]
    pub amount_repaid: Option<Decimal>,
}

impl Installment {
    pub fn is_paid(&self) -> bool {
        self.actual_date.is_some()
    }

    pub fn state(&self, today: NaiveDate) -> InstallmentState {
        if self.is_paid() {
            return InstallmentState::Paid;
        }
        match self.agreed_date {
            Some(agreed) if agreed < today => InstallmentState::Missed,
            _ => InstallmentState::Upcoming,
        }
    }

    /// Paid no later than agreed. A payment with no agreed date counts as on time.
    pub fn paid_on_time(&self) -> bool {
        match (self.actual_date, self.agreed_date) {
            (Some(actual), Some(agreed)) => actual <= agreed,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Short month name of the agreed date, or `M<n>` when none was agreed.
    pub fn period_label(&self) -> PeriodLabel {
        let label = match self.agreed_date {
            Some(agreed) => agreed.format("%b").to_string(),
            None => format!("M{}", self.month_number),
        };
        PeriodLabel::new(self.month_number, label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentState {
    Paid,
    Upcoming,
    Missed,
}

impl InstallmentState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Upcoming => "Upcoming",
            Self::Missed => "Missed",
        }
    }
}

/// Per-period row of the payment history feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub period: PeriodLabel,
    pub agreed_date: Option<NaiveDate>,
    pub actual_date: Option<NaiveDate>,
    pub amount_repaid: Option<Decimal>,
    pub state: InstallmentState,
    pub on_time: bool,
}

impl HistoryEntry {
    /// Paid, or unpaid past its agreed date. Upcoming rows are not yet history.
    pub fn is_elapsed(&self) -> bool {
        self.state != InstallmentState::Upcoming
    }

    pub fn to_payment_record(&self, amount_due: Option<Decimal>) -> PaymentRecord {
        PaymentRecord {
            period: self.period.clone(),
            amount_repaid: self.amount_repaid,
            amount_due,
            on_time: self.on_time,
        }
    }
}

pub fn payment_history(installments: &[Installment], today: NaiveDate) -> Vec<HistoryEntry> {
    by_month(installments)
        .into_iter()
        .map(|installment| HistoryEntry {
            period: installment.period_label(),
            agreed_date: installment.agreed_date,
            actual_date: installment.actual_date,
            amount_repaid: installment.amount_repaid,
            state: installment.state(today),
            on_time: installment.paid_on_time(),
        })
        .collect()
}

/// Loan details and payment reminders for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub loan_id: u32,
    pub amount: Decimal,
    pub term_months: u32,
    pub monthly_payment: Decimal,
    pub last_payment_amount: Option<Decimal>,
    pub last_payment_date: Option<NaiveDate>,
    pub next_payment_amount: Option<Decimal>,
    pub next_payment_date: Option<NaiveDate>,
    pub status: AccountStatus,
    pub reminder_date: Option<NaiveDate>,
}

pub fn summarize_loan(
    loan: &LoanRecord,
    installments: &[Installment],
    today: NaiveDate,
    reminder_lead_days: i64,
) -> LoanSummary {
    let ordered = by_month(installments);

    let term_months = match loan.term_months {
        0 => u32::try_from(ordered.len()).unwrap_or(u32::MAX).max(1),
        term => term,
    };
    let monthly_payment = (loan.original_amount / Decimal::from(term_months)).round_dp(2);

    let last_paid = ordered
        .iter()
        .rev()
        .find(|installment| installment.is_paid() && installment.amount_repaid.is_some());
    let next_unpaid = ordered.iter().find(|installment| !installment.is_paid());

    let next_payment_date = next_unpaid.and_then(|installment| installment.agreed_date);
    let reminder_date = next_payment_date
        .and_then(|agreed| agreed.checked_sub_signed(Duration::days(reminder_lead_days)));

    LoanSummary {
        loan_id: loan.loan_id,
        amount: loan.original_amount,
        term_months,
        monthly_payment,
        last_payment_amount: last_paid.and_then(|installment| installment.amount_repaid),
        last_payment_date: last_paid.and_then(|installment| installment.actual_date),
        next_payment_amount: next_unpaid
            .map(|installment| installment.amount_repaid.unwrap_or(monthly_payment)),
        next_payment_date,
        status: derive_status(next_unpaid.is_some(), next_payment_date, today),
        reminder_date,
    }
}

fn by_month(installments: &[Installment]) -> Vec<&Installment> {
    let mut ordered: Vec<_> = installments.iter().collect();
    ordered.sort_by_key(|installment| installment.month_number);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn loan() -> LoanRecord {
        LoanRecord {
            loan_id: 7,
            original_amount: dec!(100),
            start_date: date(2025, 1, 1),
            term_months: 12,
        }
    }

    fn schedule() -> Vec<Installment> {
        vec![
            Installment {
                month_number: 2,
                agreed_date: Some(date(2025, 2, 15)),
                actual_date: Some(date(2025, 2, 20)),
                amount_repaid: Some(dec!(8.33)),
            },
            Installment {
                month_number: 1,
                agreed_date: Some(date(2025, 1, 15)),
                actual_date: Some(date(2025, 1, 14)),
                amount_repaid: Some(dec!(8.33)),
            },
            Installment {
                month_number: 3,
                agreed_date: Some(date(2025, 3, 15)),
                actual_date: None,
                amount_repaid: None,
            },
            Installment {
                month_number: 4,
                agreed_date: None,
                actual_date: None,
                amount_repaid: None,
            },
        ]
    }

    #[test]
    fn history_is_month_ordered_with_labels_and_states() {
        let history = payment_history(&schedule(), date(2025, 3, 20));
        let labels: Vec<_> = history.iter().map(|e| e.period.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Feb", "Mar", "M4"]);

        let states: Vec<_> = history.iter().map(|e| e.state).collect();
        assert_eq!(
            states,
            vec![
                InstallmentState::Paid,
                InstallmentState::Paid,
                InstallmentState::Missed,
                InstallmentState::Upcoming,
            ]
        );
        assert!(history[0].on_time);
        assert!(!history[1].on_time);
    }

    #[test]
    fn summary_reports_overdue_when_next_agreed_date_passed() {
        let summary = summarize_loan(&loan(), &schedule(), date(2025, 3, 20), 7);
        assert_eq!(summary.monthly_payment, dec!(8.33));
        assert_eq!(summary.last_payment_date, Some(date(2025, 2, 20)));
        assert_eq!(summary.last_payment_amount, Some(dec!(8.33)));
        assert_eq!(summary.next_payment_date, Some(date(2025, 3, 15)));
        assert_eq!(summary.next_payment_amount, Some(dec!(8.33)));
        assert_eq!(summary.status, AccountStatus::Overdue);
        assert_eq!(summary.reminder_date, Some(date(2025, 3, 8)));
    }

    #[test]
    fn summary_is_active_before_due_date() {
        let summary = summarize_loan(&loan(), &schedule(), date(2025, 3, 1), 7);
        assert_eq!(summary.status, AccountStatus::Active);
    }

    #[test]
    fn fully_paid_schedule_is_closed_without_reminder() {
        let paid: Vec<_> = schedule()
            .into_iter()
            .map(|mut installment| {
                installment.actual_date = Some(date(2025, 1, 1));
                installment.amount_repaid = Some(dec!(25));
                installment
            })
            .collect();
        let summary = summarize_loan(&loan(), &paid, date(2025, 6, 1), 7);
        assert_eq!(summary.status, AccountStatus::Closed);
        assert_eq!(summary.next_payment_date, None);
        assert_eq!(summary.reminder_date, None);
    }

    #[test]
    fn missing_term_falls_back_to_installment_count() {
        let mut open_term = loan();
        open_term.term_months = 0;
        let summary = summarize_loan(&open_term, &schedule(), date(2025, 3, 1), 7);
        assert_eq!(summary.term_months, 4);
        assert_eq!(summary.monthly_payment, dec!(25));

        let empty = summarize_loan(&open_term, &[], date(2025, 3, 1), 7);
        assert_eq!(empty.term_months, 1);
        assert_eq!(empty.status, AccountStatus::Closed);
    }

    #[test]
    fn only_paid_and_missed_entries_have_elapsed() {
        let history = payment_history(&schedule(), date(2025, 3, 20));
        let elapsed: Vec<_> = history.iter().map(HistoryEntry::is_elapsed).collect();
        assert_eq!(elapsed, vec![true, true, true, false]);
    }

    #[test]
    fn history_entry_converts_to_payment_record() {
        let history = payment_history(&schedule(), date(2025, 3, 20));
        let record = history[2].to_payment_record(Some(dec!(8.33)));
        assert_eq!(record.period.sequence, 3);
        assert_eq!(record.repaid(), Decimal::ZERO);
        assert!(!record.on_time);
    }
}
