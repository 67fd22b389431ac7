use crate::cli::ServeArgs;
use crate::infra::{AppState, AuditState, InMemoryOutbox};
use crate::routes::with_audit_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use maturity_audit::audit::{AuditSession, FileSnapshotStore, Questionnaire, RuleBasedInsights};
use maturity_audit::config::AppConfig;
use maturity_audit::error::AppError;
use maturity_audit::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let questionnaire = Questionnaire::from_path(&config.audit.questionnaire_path)?;
    info!(
        path = %config.audit.questionnaire_path.display(),
        axes = questionnaire.axes().len(),
        questions = questionnaire.question_count(),
        "questionnaire loaded"
    );

    let store = Arc::new(FileSnapshotStore::new(config.audit.data_dir.clone()));
    let session = AuditSession::open(questionnaire, store);
    let audit_state = Arc::new(AuditState::new(
        session,
        Arc::new(RuleBasedInsights),
        Arc::new(InMemoryOutbox::default()),
    ));

    let app = with_audit_routes(audit_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "maturity audit service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
