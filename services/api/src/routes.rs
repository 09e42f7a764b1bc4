use crate::infra::{deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use lending_core::error::AppError;
use lending_core::feeds::{ScheduleImporter, ScoringFeedImporter};
use lending_core::progression::{
    classify, evaluate, summarize, top_n, AccountStatus, BorrowerDashboard, DashboardInputs,
    DashboardSettings, LoanTier, PaymentRecord, RepaymentSummary, ScoredAccount,
    TierEligibilityMap, TierId,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use std::io::Cursor;
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct DashboardRequest {
    #[serde(flatten)]
    pub(crate) inputs: DashboardInputs,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) schedule_csv: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TierEligibilityRequest {
    #[serde(default)]
    pub(crate) history: Vec<PaymentRecord>,
    #[serde(default)]
    pub(crate) completed_tier_ids: BTreeSet<TierId>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TierEligibilityResponse {
    pub(crate) summary: RepaymentSummary,
    pub(crate) tiers: TierEligibilityMap,
    pub(crate) next_available: Option<TierId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaderboardRequest {
    #[serde(default)]
    pub(crate) accounts: Vec<ScoredAccount>,
    #[serde(default)]
    pub(crate) scoring_csv: Option<String>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LeaderboardResponse {
    pub(crate) limit: usize,
    pub(crate) leaders: Vec<ScoredAccount>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClassifyRequest {
    #[serde(default)]
    pub(crate) status: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClassifyResponse {
    pub(crate) status: AccountStatus,
    pub(crate) label: &'static str,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/tiers", get(tier_catalog_endpoint))
        .route("/api/v1/status/classify", post(classify_endpoint))
        .route("/api/v1/progression/dashboard", post(dashboard_endpoint))
        .route("/api/v1/progression/tiers", post(tier_eligibility_endpoint))
        .route("/api/v1/scoring/leaderboard", post(leaderboard_endpoint))
        .layer(Extension(state))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn tier_catalog_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<Vec<LoanTier>> {
    Json(state.catalog.tiers().to_vec())
}

pub(crate) async fn classify_endpoint(
    Json(payload): Json<ClassifyRequest>,
) -> Json<ClassifyResponse> {
    let status = classify(&payload.status);
    Json(ClassifyResponse {
        status,
        label: status.label(),
    })
}

pub(crate) async fn dashboard_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<DashboardRequest>,
) -> Result<Json<BorrowerDashboard>, AppError> {
    let DashboardRequest {
        mut inputs,
        today,
        schedule_csv,
    } = payload;

    if let Some(csv) = schedule_csv {
        let reader = Cursor::new(csv.into_bytes());
        inputs.installments = ScheduleImporter::from_reader(reader)?;
    }

    let settings = DashboardSettings {
        today: today.unwrap_or_else(|| Local::now().date_naive()),
        repayment_target: state.progression.repayment_target,
        reminder_lead_days: state.progression.reminder_lead_days,
    };

    Ok(Json(BorrowerDashboard::build(
        &inputs,
        &state.catalog,
        &settings,
    )))
}

pub(crate) async fn tier_eligibility_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<TierEligibilityRequest>,
) -> Json<TierEligibilityResponse> {
    let summary = summarize(&payload.history, payload.completed_tier_ids);
    let tiers = evaluate(&state.catalog, &summary);
    let next_available = tiers.next_available().cloned();

    Json(TierEligibilityResponse {
        summary,
        tiers,
        next_available,
    })
}

pub(crate) async fn leaderboard_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<LeaderboardRequest>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let LeaderboardRequest {
        mut accounts,
        scoring_csv,
        limit,
    } = payload;

    if let Some(csv) = scoring_csv {
        let rows = ScoringFeedImporter::from_reader(Cursor::new(csv.into_bytes()))?;
        accounts.extend(rows.iter().map(|row| row.to_scored_account()));
    }

    let limit = limit
        .filter(|limit| *limit > 0)
        .unwrap_or(state.progression.leaderboard_size);
    let leaders = top_n(&accounts, limit);
    info!(candidates = accounts.len(), leaders = leaders.len(), "leaderboard ranked");

    Ok(Json(LeaderboardResponse { limit, leaders }))
}
