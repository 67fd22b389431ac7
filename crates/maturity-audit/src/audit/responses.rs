use super::questionnaire::QuestionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A rating on the 1 to 5 maturity scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, ScoreError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ScoreError::OutOfRange(value))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    pub fn all() -> impl Iterator<Item = Score> {
        (Self::MIN..=Self::MAX).map(Score)
    }
}

impl TryFrom<i64> for Score {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("score {0} is outside the 1-5 scale")]
    OutOfRange(i64),
}

/// What the user recorded for one question. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Response {
    pub fn is_answered(&self) -> bool {
        self.score.is_some()
    }

    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|notes| !notes.is_empty())
    }
}

/// Sparse map of responses keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseStore {
    entries: BTreeMap<QuestionId, Response>,
}

impl ResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_score(&mut self, question_id: impl Into<QuestionId>, score: Score) {
        self.entries.entry(question_id.into()).or_default().score = Some(score);
    }

    pub fn set_notes(&mut self, question_id: impl Into<QuestionId>, notes: impl Into<String>) {
        self.entries.entry(question_id.into()).or_default().notes = Some(notes.into());
    }

    pub fn get(&self, question_id: &str) -> Option<&Response> {
        self.entries.get(question_id)
    }

    pub fn score(&self, question_id: &str) -> Option<Score> {
        self.get(question_id).and_then(|response| response.score)
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.get(question_id).is_some_and(Response::is_answered)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &Response)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Decode entry by entry, keeping every response that parses and returning the rest.
    /// Fails only when the document itself is not a JSON object.
    pub fn from_json_lenient(
        raw: &str,
    ) -> Result<(Self, Vec<(QuestionId, serde_json::Error)>), serde_json::Error> {
        let values: BTreeMap<QuestionId, serde_json::Value> = serde_json::from_str(raw)?;
        let mut store = Self::new();
        let mut rejected = Vec::new();
        for (question_id, value) in values {
            match serde_json::from_value::<Response>(value) {
                Ok(response) => {
                    store.entries.insert(question_id, response);
                }
                Err(err) => rejected.push((question_id, err)),
            }
        }
        Ok((store, rejected))
    }
}
