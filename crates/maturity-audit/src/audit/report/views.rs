use super::super::company::CompanyInfo;
use super::super::scoring::{MaturityLevel, ScoreBand};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct QuestionEntry {
    pub id: String,
    pub text: String,
    pub score: Option<u8>,
    pub effective_score: f64,
    pub answered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubAxisEntry {
    pub id: String,
    pub title: String,
    pub score: f64,
    pub completion: u8,
    pub answered: usize,
    pub total: usize,
    pub band: ScoreBand,
    pub band_label: &'static str,
    pub questions: Vec<QuestionEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisEntry {
    pub id: String,
    pub title: String,
    pub weight_percent: f64,
    pub score: f64,
    pub completion: u8,
    pub answered: usize,
    pub total: usize,
    pub band: ScoreBand,
    pub band_label: &'static str,
    pub sub_axes: Vec<SubAxisEntry>,
}

impl AxisEntry {
    pub fn sub_axis(&self, id: &str) -> Option<&SubAxisEntry> {
        self.sub_axes.iter().find(|entry| entry.id == id)
    }

    /// Lowest-scoring sub-axis that has questions; the earliest wins a tie.
    pub fn weakest_sub_axis(&self) -> Option<&SubAxisEntry> {
        self.sub_axes
            .iter()
            .filter(|entry| entry.total > 0)
            .fold(None, |weakest: Option<&SubAxisEntry>, entry| match weakest {
                Some(current) if current.score <= entry.score => Some(current),
                _ => Some(entry),
            })
    }

    /// Highest-scoring sub-axis that has questions; the earliest wins a tie.
    pub fn strongest_sub_axis(&self) -> Option<&SubAxisEntry> {
        self.sub_axes
            .iter()
            .filter(|entry| entry.total > 0)
            .fold(None, |strongest: Option<&SubAxisEntry>, entry| match strongest {
                Some(current) if current.score >= entry.score => Some(current),
                _ => Some(entry),
            })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BestAxisView {
    pub id: String,
    pub title: String,
    pub score: f64,
}

/// Everything the presentation layer shows about one assessment.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub company: CompanyInfo,
    pub global_score: f64,
    pub maturity_level: MaturityLevel,
    pub maturity_label: &'static str,
    pub maturity_description: &'static str,
    pub completion: u8,
    pub answered: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_axis: Option<BestAxisView>,
    pub axes: Vec<AxisEntry>,
}

impl AuditReport {
    pub fn axis(&self, id: &str) -> Option<&AxisEntry> {
        self.axes.iter().find(|entry| entry.id == id)
    }

    pub fn question(&self, id: &str) -> Option<(&AxisEntry, &SubAxisEntry, &QuestionEntry)> {
        self.axes.iter().find_map(|axis| {
            axis.sub_axes.iter().find_map(|sub_axis| {
                sub_axis
                    .questions
                    .iter()
                    .find(|question| question.id == id)
                    .map(|question| (axis, sub_axis, question))
            })
        })
    }

    pub fn maturity_summary(&self) -> String {
        format!("{} - {}", self.maturity_label, self.maturity_description)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisObservation {
    pub axis_id: String,
    pub axis_title: String,
    pub score: f64,
    pub detail: String,
}

/// Deterministic narrative derived from the report.
#[derive(Debug, Clone, Serialize)]
pub struct AuditInsights {
    pub headline: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<AxisObservation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weaknesses: Vec<AxisObservation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roadmap: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
}

impl AuditInsights {
    /// Markdown rendering used for exports and the narrative endpoint.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# Executive summary\n\n{}\n", self.headline);

        if !self.strengths.is_empty() {
            out.push_str("\n## Strengths\n\n");
            for strength in &self.strengths {
                out.push_str(&format!("- {}\n", strength.detail));
            }
        }

        if !self.weaknesses.is_empty() {
            out.push_str("\n## Areas for improvement\n\n");
            for weakness in &self.weaknesses {
                out.push_str(&format!("- {}\n", weakness.detail));
            }
        }

        if !self.recommendations.is_empty() {
            out.push_str("\n## Recommendations\n\n");
            for recommendation in &self.recommendations {
                out.push_str(&format!("- {recommendation}\n"));
            }
        }

        if !self.roadmap.is_empty() {
            out.push_str("\n## Roadmap\n\n");
            for (index, action) in self.roadmap.iter().enumerate() {
                out.push_str(&format!("{}. {action}\n", index + 1));
            }
        }

        if !self.observations.is_empty() {
            out.push_str("\n## Observations\n\n");
            for observation in &self.observations {
                out.push_str(&format!("- {observation}\n"));
            }
        }

        out
    }
}
