use super::report::AuditReport;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

const SUBJECT_PREFIX: &str = "AI Maturity Audit";

/// Email payload carrying the CSV report as its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEmail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub subject: String,
    pub attachment_name: String,
    pub body_csv: String,
}

impl AuditEmail {
    pub fn compose(report: &AuditReport, body_csv: String, sent_on: NaiveDate) -> Self {
        let subject = format!(
            "{} - {} - {}",
            SUBJECT_PREFIX,
            report.company.name_or("Company"),
            sent_on.format("%d/%m/%Y")
        );
        let to = report
            .company
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_string);

        Self {
            to,
            subject,
            attachment_name: format!("ai-maturity-audit-{}.csv", sent_on.format("%Y-%m-%d")),
            body_csv,
        }
    }
}

/// Outbound delivery hook (SMTP relay, mail API, outbox table).
pub trait ReportMailer: Send + Sync {
    fn send(&self, email: &AuditEmail) -> Result<(), MailerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("mail transport unavailable: {0}")]
    Unavailable(String),
    #[error("mail rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed { reason: String },
}

/// Hand the email to the mailer; a failure is logged and reported, never raised.
pub fn deliver(mailer: &dyn ReportMailer, email: &AuditEmail) -> DeliveryStatus {
    match mailer.send(email) {
        Ok(()) => {
            info!(subject = %email.subject, "audit report emailed");
            DeliveryStatus::Sent
        }
        Err(err) => {
            warn!(subject = %email.subject, error = %err, "audit report email failed");
            DeliveryStatus::Failed {
                reason: err.to_string(),
            }
        }
    }
}
