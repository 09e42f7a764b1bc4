//! Loan progression and repayment aggregation engine.
//!
//! The [`progression`] module holds the pure decision logic: repayment
//! aggregation, status classification, tier eligibility and score ranking.
//! [`feeds`] turns CSV exports into the records the engine consumes, while
//! [`config`], [`error`] and [`telemetry`] carry the service plumbing shared by
//! the API binary.

pub mod config;
pub mod error;
pub mod feeds;
pub mod progression;
pub mod telemetry;
