use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;

use tracing::warn;

use super::loan_book::{
    fallback_start_date, LoanBookEntry, LOAN_BOOK_REQUIRED_COLUMNS, LOAN_BOOK_TERM_MONTHS,
};
use super::FeedImportError;
use crate::progression::{Installment, LoanRecord};

#[derive(Debug, Deserialize)]
struct ScoringCsvRow {
    #[serde(rename = "PointScore")]
    point_score: String,
    #[serde(rename = "Percentage")]
    percentage: String,
}

#[derive(Debug, Deserialize)]
struct ScheduleCsvRow {
    #[serde(rename = "Month Number")]
    month_number: u32,
    #[serde(
        rename = "Agreed Date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    agreed_date: Option<String>,
    #[serde(
        rename = "Actual Date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    actual_date: Option<String>,
    #[serde(
        rename = "Amount Repaid",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    amount_repaid: Option<String>,
}

pub(crate) fn parse_scoring_rows<R: Read>(
    reader: R,
) -> Result<Vec<(Decimal, Decimal)>, FeedImportError> {
    let mut csv_reader = csv_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<ScoringCsvRow>().enumerate() {
        let row = record?;
        let line = index + 2;
        let point_score = parse_decimal(&row.point_score, line, "PointScore")?;
        let percentage = parse_decimal(&row.percentage, line, "Percentage")?;
        rows.push((point_score, percentage));
    }

    Ok(rows)
}

pub(crate) fn parse_schedule_rows<R: Read>(
    reader: R,
) -> Result<Vec<Installment>, FeedImportError> {
    let mut csv_reader = csv_reader(reader);
    let mut installments = Vec::new();

    for (index, record) in csv_reader.deserialize::<ScheduleCsvRow>().enumerate() {
        let row = record?;
        let line = index + 2;
        installments.push(Installment {
            month_number: row.month_number,
            agreed_date: row
                .agreed_date
                .as_deref()
                .map(|raw| parse_date(raw, line, "Agreed Date"))
                .transpose()?,
            actual_date: row
                .actual_date
                .as_deref()
                .map(|raw| parse_date(raw, line, "Actual Date"))
                .transpose()?,
            amount_repaid: row
                .amount_repaid
                .as_deref()
                .map(|raw| parse_decimal(raw, line, "Amount Repaid"))
                .transpose()?,
        });
    }

    Ok(installments)
}

pub(crate) fn parse_loan_book_rows<R: Read>(
    reader: R,
) -> Result<Vec<LoanBookEntry>, FeedImportError> {
    let mut csv_reader = csv_reader(reader);
    let headers = csv_reader.headers()?.clone();
    if let Some(column) = LOAN_BOOK_REQUIRED_COLUMNS
        .into_iter()
        .find(|column| !headers.iter().any(|header| header == *column))
    {
        return Err(FeedImportError::MissingColumn { column });
    }

    let mut entries = Vec::new();
    for (index, record) in csv_reader
        .deserialize::<HashMap<String, String>>()
        .enumerate()
    {
        let row = record?;
        let line = index + 2;

        let Some(full_name) = cell(&row, "Name") else {
            warn!(line, "skipping loan book row without a name");
            continue;
        };

        let original_amount = match cell(&row, "Loan amount") {
            Some(raw) => parse_decimal(raw, line, "Loan amount")?,
            None => {
                return Err(FeedImportError::InvalidRow {
                    line,
                    column: "Loan amount",
                    reason: "missing value".to_string(),
                })
            }
        };

        let installments = (1..=LOAN_BOOK_TERM_MONTHS)
            .map(|month| {
                let amount_repaid = cell(&row, &format!("Month{month}_AmountRepaid"))
                    .map(|raw| {
                        Decimal::from_str(raw).map_err(|err| FeedImportError::InvalidInstallment {
                            line,
                            month,
                            reason: err.to_string(),
                        })
                    })
                    .transpose()?;

                Ok(Installment {
                    month_number: month,
                    agreed_date: cell(&row, &format!("Month{month}_AgreedDate"))
                        .and_then(lenient_date),
                    actual_date: cell(&row, &format!("Month{month}_ActualDate"))
                        .and_then(lenient_date),
                    amount_repaid,
                })
            })
            .collect::<Result<Vec<_>, FeedImportError>>()?;

        let start_date = installments
            .first()
            .and_then(|installment| installment.agreed_date)
            .unwrap_or_else(fallback_start_date);

        entries.push(LoanBookEntry {
            full_name: full_name.to_string(),
            address: cell(&row, "Address").map(str::to_string),
            phone_number: cell(&row, "Contact number").map(str::to_string),
            email: cell(&row, "email").map(str::to_string),
            loan: LoanRecord {
                loan_id: u32::try_from(entries.len() + 1).unwrap_or(u32::MAX),
                original_amount,
                start_date,
                term_months: LOAN_BOOK_TERM_MONTHS,
            },
            installments,
        });
    }

    Ok(entries)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn parse_decimal(raw: &str, line: usize, column: &'static str) -> Result<Decimal, FeedImportError> {
    Decimal::from_str(raw).map_err(|err| FeedImportError::InvalidRow {
        line,
        column,
        reason: err.to_string(),
    })
}

fn parse_date(raw: &str, line: usize, column: &'static str) -> Result<NaiveDate, FeedImportError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| {
        FeedImportError::InvalidRow {
            line,
            column,
            reason: err.to_string(),
        }
    })
}

fn cell<'a>(row: &'a HashMap<String, String>, column: &str) -> Option<&'a str> {
    row.get(column)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

/// ISO date, optionally with a time part. Anything else reads as no date.
fn lenient_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|value| value.date())
        })
        .ok()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
