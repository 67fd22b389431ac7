use crate::infra::{AppState, AuditState};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use chrono::{Local, Utc};
use maturity_audit::audit::report::{AxisEntry, QuestionEntry, SubAxisEntry};
use maturity_audit::audit::{
    build_prompt, deliver, export_rows, narrative, write_report_csv,
    AuditEmail, AuditInsights, AuditReport, CompanyInfo, DeliveryStatus, ExportRow, Narrative,
    Questionnaire, Score, Scope, SessionChange,
};
use maturity_audit::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) score: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotesRequest {
    pub(crate) notes: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EmailRequest {
    /// Overrides the company email as recipient.
    #[serde(default)]
    pub(crate) to: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreUpdateResponse {
    pub(crate) question_id: String,
    pub(crate) score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) previous: Option<u8>,
    pub(crate) scores_changed: bool,
    pub(crate) axis_score: f64,
    pub(crate) global_score: f64,
    pub(crate) completion: u8,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionView {
    pub(crate) axis_id: String,
    pub(crate) axis_title: String,
    pub(crate) sub_axis_id: String,
    pub(crate) sub_axis_title: String,
    #[serde(flatten)]
    pub(crate) question: QuestionEntry,
}

#[derive(Debug, Serialize)]
pub(crate) struct InsightsResponse {
    pub(crate) insights: AuditInsights,
    pub(crate) narrative: Narrative,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmailResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) to: Option<String>,
    pub(crate) subject: String,
    pub(crate) attachment_name: String,
    pub(crate) delivery: DeliveryStatus,
}

pub(crate) fn with_audit_routes(state: Arc<AuditState>) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/questionnaire", get(questionnaire_endpoint))
        .route("/api/v1/scores", get(scores_endpoint))
        .route("/api/v1/axes/:axis_id", get(axis_endpoint))
        .route(
            "/api/v1/axes/:axis_id/sub-axes/:sub_axis_id",
            get(sub_axis_endpoint),
        )
        .route("/api/v1/questions/:question_id", get(question_endpoint))
        .route(
            "/api/v1/responses/:question_id/score",
            put(score_endpoint),
        )
        .route(
            "/api/v1/responses/:question_id/notes",
            put(notes_endpoint),
        )
        .route("/api/v1/company", put(company_endpoint))
        .route("/api/v1/export/rows", get(export_rows_endpoint))
        .route("/api/v1/export/csv", get(export_csv_endpoint))
        .route("/api/v1/insights", get(insights_endpoint))
        .route("/api/v1/insights/prompt", get(prompt_endpoint))
        .route("/api/v1/report/email", post(email_endpoint))
        .with_state(state)
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

fn current_report(state: &AuditState) -> AuditReport {
    let session = state.session();
    AuditReport::build(&session.engine(), session.company(), Utc::now())
}

fn report_with_rows(state: &AuditState) -> (AuditReport, Vec<ExportRow>) {
    let session = state.session();
    let engine = session.engine();
    let report = AuditReport::build(&engine, session.company(), Utc::now());
    (report, export_rows(&engine))
}

pub(crate) async fn questionnaire_endpoint(
    State(state): State<Arc<AuditState>>,
) -> Json<Questionnaire> {
    Json(state.session().questionnaire().clone())
}

pub(crate) async fn scores_endpoint(State(state): State<Arc<AuditState>>) -> Json<AuditReport> {
    Json(current_report(&state))
}

pub(crate) async fn axis_endpoint(
    State(state): State<Arc<AuditState>>,
    Path(axis_id): Path<String>,
) -> Result<Json<AxisEntry>, AppError> {
    current_report(&state)
        .axes
        .into_iter()
        .find(|axis| axis.id == axis_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("axis {axis_id}")))
}

pub(crate) async fn sub_axis_endpoint(
    State(state): State<Arc<AuditState>>,
    Path((axis_id, sub_axis_id)): Path<(String, String)>,
) -> Result<Json<SubAxisEntry>, AppError> {
    current_report(&state)
        .axes
        .into_iter()
        .find(|axis| axis.id == axis_id)
        .and_then(|axis| {
            axis.sub_axes
                .into_iter()
                .find(|sub_axis| sub_axis.id == sub_axis_id)
        })
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("sub-axis {axis_id}/{sub_axis_id}")))
}

pub(crate) async fn question_endpoint(
    State(state): State<Arc<AuditState>>,
    Path(question_id): Path<String>,
) -> Result<Json<QuestionView>, AppError> {
    let report = current_report(&state);
    let (axis, sub_axis, question) = report
        .question(&question_id)
        .ok_or_else(|| AppError::NotFound(format!("question {question_id}")))?;

    Ok(Json(QuestionView {
        axis_id: axis.id.clone(),
        axis_title: axis.title.clone(),
        sub_axis_id: sub_axis.id.clone(),
        sub_axis_title: sub_axis.title.clone(),
        question: question.clone(),
    }))
}

pub(crate) async fn score_endpoint(
    State(state): State<Arc<AuditState>>,
    Path(question_id): Path<String>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoreUpdateResponse>, AppError> {
    let score = Score::new(payload.score)?;
    let mut session = state.session();
    let change = session.set_score(&question_id, score)?;
    let scores_changed = change.affects_scores();
    let previous = match change {
        SessionChange::ScoreChanged { previous, .. } => previous,
        _ => None,
    };

    let engine = session.engine();
    let axis_score = session
        .questionnaire()
        .question(&question_id)
        .map(|entry| engine.axis_score(entry.axis))
        .unwrap_or_default();

    Ok(Json(ScoreUpdateResponse {
        question_id,
        score: score.value(),
        previous: previous.map(|score| score.value()),
        scores_changed,
        axis_score,
        global_score: engine.global_score(),
        completion: engine.completion(Scope::Questionnaire),
    }))
}

pub(crate) async fn notes_endpoint(
    State(state): State<Arc<AuditState>>,
    Path(question_id): Path<String>,
    Json(payload): Json<NotesRequest>,
) -> Result<StatusCode, AppError> {
    state.session().set_notes(&question_id, payload.notes)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn company_endpoint(
    State(state): State<Arc<AuditState>>,
    Json(company): Json<CompanyInfo>,
) -> Json<CompanyInfo> {
    let mut session = state.session();
    session.set_company_info(company);
    Json(session.company().clone())
}

pub(crate) async fn export_rows_endpoint(
    State(state): State<Arc<AuditState>>,
) -> Json<Vec<ExportRow>> {
    let session = state.session();
    Json(export_rows(&session.engine()))
}

pub(crate) async fn export_csv_endpoint(
    State(state): State<Arc<AuditState>>,
) -> Result<impl IntoResponse, AppError> {
    let (report, rows) = report_with_rows(&state);
    let narrative = narrative(state.insights.as_ref(), &report);
    let body = write_report_csv(&report, &rows, Some(&narrative))?;
    let disposition = format!(
        "attachment; filename=\"ai-maturity-audit-{}.csv\"",
        report.generated_at.format("%Y-%m-%d")
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub(crate) async fn insights_endpoint(
    State(state): State<Arc<AuditState>>,
) -> Json<InsightsResponse> {
    let report = current_report(&state);
    let narrative = narrative(state.insights.as_ref(), &report);
    Json(InsightsResponse {
        insights: report.insights(),
        narrative,
    })
}

pub(crate) async fn prompt_endpoint(State(state): State<Arc<AuditState>>) -> impl IntoResponse {
    let report = current_report(&state);
    (
        [(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.to_string())],
        build_prompt(&report),
    )
}

pub(crate) async fn email_endpoint(
    State(state): State<Arc<AuditState>>,
    payload: Option<Json<EmailRequest>>,
) -> Result<Json<EmailResponse>, AppError> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    let (report, rows) = report_with_rows(&state);
    let narrative = narrative(state.insights.as_ref(), &report);
    let body = write_report_csv(&report, &rows, Some(&narrative))?;

    let mut email = AuditEmail::compose(&report, body, Local::now().date_naive());
    if let Some(to) = payload.to.filter(|to| !to.trim().is_empty()) {
        email.to = Some(to);
    }
    let delivery = deliver(state.mailer.as_ref(), &email);

    Ok(Json(EmailResponse {
        to: email.to,
        subject: email.subject,
        attachment_name: email.attachment_name,
        delivery,
    }))
}
