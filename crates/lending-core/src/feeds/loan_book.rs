use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::progression::{AccountProfile, DashboardInputs, Installment, LoanRecord};

/// Months covered by every loan in the loan book export.
pub const LOAN_BOOK_TERM_MONTHS: u32 = 12;

/// Columns the loan book export must carry. Month columns are optional.
pub const LOAN_BOOK_REQUIRED_COLUMNS: [&str; 5] =
    ["Name", "Address", "Contact number", "email", "Loan amount"];

/// One borrower row of the microloans loan book: contact details, the loan and
/// its twelve monthly installments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanBookEntry {
    pub full_name: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub loan: LoanRecord,
    pub installments: Vec<Installment>,
}

impl LoanBookEntry {
    /// Profile for a borrower first seen in the loan book. The export has no
    /// birth date, income or job, so those take fixed placeholder values.
    pub fn to_profile(&self, user_id: u32) -> AccountProfile {
        AccountProfile {
            user_id,
            full_name: self.full_name.clone(),
            dob: placeholder_dob(),
            age: PLACEHOLDER_AGE,
            address: self.address.clone(),
            phone_number: self.phone_number.clone().unwrap_or_default(),
            email: self.email.clone(),
            job_title: None,
            monthly_income: Decimal::ZERO,
            house_rent: None,
        }
    }

    /// Dashboard inputs for this borrower. The loan book records no tier
    /// history, so no tiers are marked completed.
    pub fn dashboard_inputs(&self, user_id: u32) -> DashboardInputs {
        DashboardInputs {
            profile: Some(self.to_profile(user_id)),
            loan: Some(self.loan.clone()),
            status_label: None,
            installments: self.installments.clone(),
            completed_tier_ids: Default::default(),
        }
    }
}

const PLACEHOLDER_AGE: u16 = 35;

fn placeholder_dob() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default()
}

/// Start date used when a row has no readable first agreed date.
pub(crate) fn fallback_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}
