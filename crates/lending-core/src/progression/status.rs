use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Normalized loan/account status shown on the borrower dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Overdue,
    Closed,
}

impl AccountStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Overdue => "Overdue",
            Self::Closed => "Closed",
        }
    }
}

/// Maps a raw status label to [`AccountStatus`]. Anything that is not a
/// recognized `active`/`overdue` label is reported as `Closed`, so an
/// unverified loan is never presented as active.
pub fn classify(raw_status: &str) -> AccountStatus {
    match raw_status.trim().to_ascii_lowercase().as_str() {
        "active" => AccountStatus::Active,
        "overdue" => AccountStatus::Overdue,
        _ => AccountStatus::Closed,
    }
}

/// Status of a loan from its first unpaid installment: no outstanding installment
/// means the loan is closed, a missed agreed date means it is overdue.
pub fn derive_status(
    has_outstanding: bool,
    next_due: Option<NaiveDate>,
    today: NaiveDate,
) -> AccountStatus {
    if !has_outstanding {
        return AccountStatus::Closed;
    }

    match next_due {
        Some(agreed) if agreed < today => AccountStatus::Overdue,
        _ => AccountStatus::Active,
    }
}
