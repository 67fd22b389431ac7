mod insights;
mod narrative;
mod prompt;
mod summary;
pub mod views;

pub use narrative::{
    narrative, InsightError, InsightGenerator, Narrative, NarrativeSource, RuleBasedInsights,
};
pub use prompt::build_prompt;
pub use views::{
    AuditInsights, AuditReport, AxisEntry, AxisObservation, BestAxisView, QuestionEntry,
    SubAxisEntry,
};

pub(crate) use insights::generate_insights;
