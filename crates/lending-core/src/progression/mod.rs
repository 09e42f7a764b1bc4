//! Repayment aggregation, status classification, tier progression and ranking.
//!
//! Every operation here is a pure function of its arguments: callers own the
//! data and decide when to recompute.

pub mod aggregation;
pub mod dashboard;
pub mod domain;
pub mod eligibility;
pub mod ranking;
pub mod schedule;
pub mod status;
pub mod tiers;

pub use aggregation::{
    aggregate, on_time_ratio, payment_series, summarize, target_progress, total_repaid,
    TargetProgress,
};
pub use dashboard::{BorrowerDashboard, DashboardInputs, DashboardSettings, TierView};
pub use domain::{
    AccountId, AccountProfile, CumulativeProgressPoint, PaymentPoint, PaymentRecord, PeriodLabel,
    RepaymentSummary, ScoredAccount, TierId,
};
pub use eligibility::{evaluate, TierEligibility, TierEligibilityMap, TierState};
pub use ranking::top_n;
pub use schedule::{
    payment_history, summarize_loan, HistoryEntry, Installment, InstallmentState, LoanRecord,
    LoanSummary,
};
pub use status::{classify, derive_status, AccountStatus};
pub use tiers::{CatalogError, LoanTier, TierCatalog, UnlockRule};
