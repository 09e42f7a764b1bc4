//! CSV feed importers for the scoring table, the loan book and repayment
//! schedules.

mod loan_book;
mod parser;
mod scoring;

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::progression::Installment;

pub use loan_book::{LoanBookEntry, LOAN_BOOK_REQUIRED_COLUMNS, LOAN_BOOK_TERM_MONTHS};
pub use scoring::{score_series, ScorePoint, ScoreSeries, ScoringRow, FIRST_IMPORTED_USER_ID};

#[derive(Debug, thiserror::Error)]
pub enum FeedImportError {
    #[error("failed to read feed export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("feed export is missing required column '{column}'")]
    MissingColumn { column: &'static str },
    #[error("line {line}: invalid value in column '{column}': {reason}")]
    InvalidRow {
        line: usize,
        column: &'static str,
        reason: String,
    },
    #[error("line {line}: invalid amount repaid for month {month}: {reason}")]
    InvalidInstallment {
        line: usize,
        month: u32,
        reason: String,
    },
}

/// Imports the scoring export (`PointScore`, `Percentage` columns). Rows carry no
/// user id, so ids are assigned sequentially from [`FIRST_IMPORTED_USER_ID`].
pub struct ScoringFeedImporter;

impl ScoringFeedImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ScoringRow>, FeedImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ScoringRow>, FeedImportError> {
        let rows = parser::parse_scoring_rows(reader)?;
        let scored: Vec<_> = rows
            .into_iter()
            .zip(FIRST_IMPORTED_USER_ID..)
            .map(|((point_score, percentage), user_id)| ScoringRow {
                user_id,
                point_score,
                percentage,
            })
            .collect();

        info!(rows = scored.len(), "scoring feed imported");
        Ok(scored)
    }
}

/// Imports a single loan's installment schedule
/// (`Month Number`, `Agreed Date`, `Actual Date`, `Amount Repaid`).
pub struct ScheduleImporter;

impl ScheduleImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Installment>, FeedImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Installment>, FeedImportError> {
        let installments = parser::parse_schedule_rows(reader)?;
        info!(installments = installments.len(), "repayment schedule imported");
        Ok(installments)
    }
}

/// Imports the microloans loan book: one row per borrower with contact details,
/// the loan amount and `Month{n}_AgreedDate`, `Month{n}_ActualDate`,
/// `Month{n}_AmountRepaid` columns for the twelve months. Rows without a name are
/// skipped and unreadable dates are treated as missing.
pub struct LoanBookImporter;

impl LoanBookImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<LoanBookEntry>, FeedImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<LoanBookEntry>, FeedImportError> {
        let entries = parser::parse_loan_book_rows(reader)?;
        info!(borrowers = entries.len(), "loan book imported");
        Ok(entries)
    }
}
