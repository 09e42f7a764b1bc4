use chrono::{Local, NaiveDate};
use clap::Args;
use lending_core::config::{AppConfig, ProgressionConfig};
use lending_core::error::AppError;
use lending_core::feeds::{
    score_series, LoanBookImporter, ScheduleImporter, ScoringFeedImporter, FIRST_IMPORTED_USER_ID,
};
use lending_core::progression::{
    top_n, BorrowerDashboard, DashboardInputs, DashboardSettings, LoanRecord, ScoredAccount,
    TierCatalog, TierId, TierState,
};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    /// Repayment schedule CSV export (Month Number, Agreed Date, Actual Date, Amount Repaid)
    #[arg(long)]
    pub(crate) schedule_csv: PathBuf,
    /// Original loan amount. Without it only the repayment history is shown.
    #[arg(long)]
    pub(crate) loan_amount: Option<Decimal>,
    /// Loan term in months
    #[arg(long, default_value_t = 12)]
    pub(crate) term_months: u32,
    /// Loan start date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
    /// Override the reporting date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Tier already completed by the borrower; repeat for several tiers
    #[arg(long)]
    pub(crate) completed: Vec<String>,
}

#[derive(Args, Debug)]
pub(crate) struct LoanBookArgs {
    /// Microloans loan book export (one row per borrower, Month1..Month12 columns)
    #[arg(long)]
    pub(crate) loan_book_csv: PathBuf,
    /// Override the reporting date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Scoring CSV export (PointScore, Percentage)
    #[arg(long)]
    pub(crate) scoring_csv: PathBuf,
    /// Number of leaders to print (defaults to APP_LEADERBOARD_SIZE)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Also print the point-score and percentage series
    #[arg(long)]
    pub(crate) series: bool,
}

pub(crate) fn render_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let DashboardArgs {
        schedule_csv,
        loan_amount,
        term_months,
        start_date,
        today,
        completed,
    } = args;

    let progression = load_progression()?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let installments = ScheduleImporter::from_path(&schedule_csv)?;

    let inputs = DashboardInputs {
        loan: loan_amount.map(|original_amount| LoanRecord {
            loan_id: 1,
            original_amount,
            start_date: start_date.unwrap_or(today),
            term_months,
        }),
        installments,
        completed_tier_ids: completed.iter().map(|id| TierId::new(id)).collect(),
        ..Default::default()
    };
    let settings = DashboardSettings {
        today,
        repayment_target: progression.repayment_target,
        reminder_lead_days: progression.reminder_lead_days,
    };

    let dashboard = BorrowerDashboard::build(&inputs, &TierCatalog::standard(), &settings);

    println!("Borrower progression dashboard");
    println!(
        "Schedule: {} (evaluated {})",
        schedule_csv.display(),
        today
    );

    if let Some(loan) = &dashboard.loan {
        println!("\nLoan");
        println!(
            "- Amount {} over {} months ({} per month)",
            loan.amount, loan.term_months, loan.monthly_payment
        );
        println!("- Status: {}", loan.status.label());
        match (loan.last_payment_date, loan.last_payment_amount) {
            (Some(date), Some(amount)) => println!("- Last payment: {} on {}", amount, date),
            _ => println!("- Last payment: none recorded"),
        }
        match (loan.next_payment_date, loan.next_payment_amount) {
            (Some(date), Some(amount)) => println!("- Next payment: {} due {}", amount, date),
            _ => println!("- Next payment: none scheduled"),
        }
        if let Some(reminder) = loan.reminder_date {
            println!("- Reminder from: {}", reminder);
        }
    }

    if dashboard.history.is_empty() {
        println!("\nPayment history: none");
    } else {
        println!("\nPayment history");
        for entry in &dashboard.history {
            let amount = entry
                .amount_repaid
                .map(|amount| amount.to_string())
                .unwrap_or_else(|| "-".to_string());
            let cumulative = dashboard
                .cumulative_progress
                .iter()
                .find(|point| point.period == entry.period)
                .map(|point| format!(", cumulative {}", point.cumulative_paid))
                .unwrap_or_default();
            println!(
                "- {}: {} ({}{}){}",
                entry.period.label,
                amount,
                entry.state.label(),
                if entry.on_time { ", on time" } else { "" },
                cumulative
            );
        }
    }

    let target = &dashboard.target;
    match &target.reached_at {
        Some(period) => println!(
            "\nRepayment target {} reached in {}",
            target.target, period.label
        ),
        None => println!(
            "\nRepayment target {}: {} paid, {} remaining",
            target.target, target.total_paid, target.remaining
        ),
    }
    println!(
        "On-time ratio: {}%",
        (dashboard.summary.on_time_ratio * Decimal::ONE_HUNDRED).round_dp(1)
    );

    println!("\nLoan tiers");
    for tier in &dashboard.tiers {
        println!(
            "- {}: {} over {} months ({} per month) [{}]",
            tier.label, tier.principal, tier.term_months, tier.monthly_payment, tier.state_label
        );
    }

    Ok(())
}

pub(crate) fn render_loan_book(args: LoanBookArgs) -> Result<(), AppError> {
    let LoanBookArgs {
        loan_book_csv,
        today,
    } = args;

    let progression = load_progression()?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let entries = LoanBookImporter::from_path(&loan_book_csv)?;
    let catalog = TierCatalog::standard();
    let settings = DashboardSettings {
        today,
        repayment_target: progression.repayment_target,
        reminder_lead_days: progression.reminder_lead_days,
    };

    println!("Loan book summary");
    println!(
        "Data source: {} ({} borrowers, evaluated {})",
        loan_book_csv.display(),
        entries.len(),
        today
    );

    if entries.is_empty() {
        println!("\nNo borrowers imported");
        return Ok(());
    }

    println!();
    for (entry, user_id) in entries.iter().zip(FIRST_IMPORTED_USER_ID..) {
        let dashboard =
            BorrowerDashboard::build(&entry.dashboard_inputs(user_id), &catalog, &settings);
        let next_tier = dashboard
            .tiers
            .iter()
            .find(|tier| tier.state == TierState::Available)
            .map(|tier| tier.label.as_str())
            .unwrap_or("none");
        println!(
            "- {} (user {}): {} loan, {}, {} repaid, {}% on time, next tier {}",
            entry.full_name,
            user_id,
            entry.loan.original_amount,
            dashboard.status_label.unwrap_or("Closed"),
            dashboard.summary.total_repaid,
            (dashboard.summary.on_time_ratio * Decimal::ONE_HUNDRED).round_dp(1),
            next_tier
        );
    }

    Ok(())
}

pub(crate) fn render_leaderboard(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        scoring_csv,
        limit,
        series,
    } = args;

    let progression = load_progression()?;
    let rows = ScoringFeedImporter::from_path(&scoring_csv)?;
    let accounts: Vec<ScoredAccount> = rows.iter().map(|row| row.to_scored_account()).collect();
    let limit = limit
        .filter(|limit| *limit > 0)
        .unwrap_or(progression.leaderboard_size);
    let leaders = top_n(&accounts, limit);

    println!("Scoring leaderboard");
    println!(
        "Data source: {} ({} accounts, top {})",
        scoring_csv.display(),
        accounts.len(),
        limit
    );

    if leaders.is_empty() {
        println!("\nNo scored accounts");
    } else {
        println!();
        for (rank, account) in leaders.iter().enumerate() {
            println!(
                "{:>3}. user {}: {}",
                rank + 1,
                account.account_id,
                account.total_score
            );
        }
    }

    if series {
        let series = score_series(&rows);
        println!("\nPoint-score series");
        for point in &series.point_scores {
            println!("- {}: {}", point.x, point.y);
        }
        println!("\nPercentage series");
        for point in &series.percentages {
            println!("- {}: {}", point.x, point.y);
        }
    }

    Ok(())
}

pub(crate) fn render_tiers() {
    println!("Loan tier catalog");
    for tier in TierCatalog::standard().tiers() {
        println!(
            "- {} ({}): {} over {} months, {} per month. {}",
            tier.label,
            tier.id,
            tier.principal,
            tier.term_months,
            tier.monthly_payment,
            tier.requirement
        );
    }
}

fn load_progression() -> Result<ProgressionConfig, AppError> {
    Ok(AppConfig::load()?.progression)
}
