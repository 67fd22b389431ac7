pub mod company;
pub mod export;
pub mod mailer;
pub mod questionnaire;
pub mod report;
pub mod responses;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use company::CompanyInfo;
pub use export::{export_rows, rows_csv_string, write_report_csv, write_rows_csv, ExportError, ExportRow};
pub use mailer::{deliver, AuditEmail, DeliveryStatus, MailerError, ReportMailer};
pub use questionnaire::{
    Axis, AxisId, Question, QuestionId, QuestionRef, Questionnaire, QuestionnaireError, SubAxis,
    SubAxisId,
};
pub use report::{
    build_prompt, narrative, AuditInsights, AuditReport, InsightError, InsightGenerator,
    Narrative, NarrativeSource, RuleBasedInsights,
};
pub use responses::{Response, ResponseStore, Score, ScoreError};
pub use scoring::{MaturityLevel, ScoreBand, Scope, ScoringEngine};
pub use session::{AuditSession, SessionChange, SessionError};
pub use snapshot::{
    FileSnapshotStore, MemorySnapshotStore, SnapshotError, SnapshotKey, SnapshotStore,
};
