use super::prompt::build_prompt;
use super::views::AuditReport;
use serde::Serialize;
use tracing::warn;

/// Produces the markdown commentary shown next to the scores.
pub trait InsightGenerator: Send + Sync {
    fn generate(&self, report: &AuditReport, prompt: &str) -> Result<String, InsightError>;
}

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("insight generator unavailable: {0}")]
    Unavailable(String),
    #[error("insight generator returned an empty narrative")]
    Empty,
}

/// Deterministic generator backed by the report's own insight rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedInsights;

impl InsightGenerator for RuleBasedInsights {
    fn generate(&self, report: &AuditReport, _prompt: &str) -> Result<String, InsightError> {
        Ok(report.insights().to_markdown())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeSource {
    Generator,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct Narrative {
    pub source: NarrativeSource,
    pub markdown: String,
}

impl Narrative {
    /// Non-blank markdown lines, used when the narrative is embedded in exports.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.markdown
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
    }
}

/// Ask the generator for commentary, falling back to the rule-based text.
pub fn narrative(generator: &dyn InsightGenerator, report: &AuditReport) -> Narrative {
    let prompt = build_prompt(report);
    match generator.generate(report, &prompt) {
        Ok(markdown) if !markdown.trim().is_empty() => Narrative {
            source: NarrativeSource::Generator,
            markdown,
        },
        Ok(_) => fallback(report, &InsightError::Empty),
        Err(err) => fallback(report, &err),
    }
}

fn fallback(report: &AuditReport, err: &InsightError) -> Narrative {
    warn!(error = %err, "insight generation failed, using rule-based narrative");
    Narrative {
        source: NarrativeSource::Fallback,
        markdown: report.insights().to_markdown(),
    }
}
