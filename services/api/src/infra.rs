use maturity_audit::audit::{
    AuditEmail, AuditSession, CompanyInfo, InsightGenerator, MailerError, Questionnaire,
    ReportMailer, ResponseStore,
};
use maturity_audit::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Shared handles behind the audit routes.
pub(crate) struct AuditState {
    session: Mutex<AuditSession>,
    pub(crate) insights: Arc<dyn InsightGenerator>,
    pub(crate) mailer: Arc<dyn ReportMailer>,
}

impl AuditState {
    pub(crate) fn new(
        session: AuditSession,
        insights: Arc<dyn InsightGenerator>,
        mailer: Arc<dyn ReportMailer>,
    ) -> Self {
        Self {
            session: Mutex::new(session),
            insights,
            mailer,
        }
    }

    /// A panic inside a handler must not lock everyone else out of the session.
    pub(crate) fn session(&self) -> MutexGuard<'_, AuditSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Mailer that keeps every message in memory instead of sending it.
#[derive(Default, Clone)]
pub(crate) struct InMemoryOutbox {
    emails: Arc<Mutex<Vec<AuditEmail>>>,
}

impl ReportMailer for InMemoryOutbox {
    fn send(&self, email: &AuditEmail) -> Result<(), MailerError> {
        self.emails
            .lock()
            .map_err(|_| MailerError::Unavailable("outbox lock poisoned".to_string()))?
            .push(email.clone());
        Ok(())
    }
}

impl InMemoryOutbox {
    #[cfg(test)]
    pub(crate) fn emails(&self) -> Vec<AuditEmail> {
        self.emails.lock().expect("outbox mutex poisoned").clone()
    }
}

/// Questionnaire, responses and company details read from files for one-shot commands.
pub(crate) struct AuditInputs {
    pub(crate) questionnaire: Questionnaire,
    pub(crate) responses: ResponseStore,
    pub(crate) company: CompanyInfo,
}

impl AuditInputs {
    pub(crate) fn load(
        questionnaire: &Path,
        responses: &Path,
        company: Option<&Path>,
    ) -> Result<Self, AppError> {
        let questionnaire = Questionnaire::from_path(questionnaire)?;
        let raw = std::fs::read_to_string(responses)?;
        let responses = ResponseStore::from_json(&raw)
            .map_err(|err| AppError::BadRequest(format!("invalid responses file: {err}")))?;
        let company = match company {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str(&raw).map_err(|err| {
                    AppError::BadRequest(format!("invalid company file: {err}"))
                })?
            }
            None => CompanyInfo::default(),
        };

        Ok(Self {
            questionnaire,
            responses,
            company,
        })
    }
}
