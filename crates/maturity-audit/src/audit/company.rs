use serde::{Deserialize, Serialize};

pub const NOT_SPECIFIED: &str = "Not specified";

/// Organization details captured before the report is generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl CompanyInfo {
    /// Labelled fields in report order, blank values shown as "Not specified".
    pub fn display_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("Name", display(&self.name)),
            ("Description", display(&self.description)),
            ("Sector", display(&self.sector)),
            ("Size", display(&self.size)),
            ("Email", display(&self.email)),
            ("Phone", display(&self.phone)),
            ("Website", display(&self.website)),
        ]
    }

    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => fallback,
        }
    }
}

fn display(value: &Option<String>) -> &str {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => NOT_SPECIFIED,
    }
}
