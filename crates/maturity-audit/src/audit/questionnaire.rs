use super::responses::Score;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::io::Read;
use std::path::Path;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(AxisId);
string_id!(SubAxisId);
string_id!(QuestionId);

/// Immutable questionnaire definition: axes, their sub-axes and questions.
#[derive(Debug, Clone, Serialize)]
pub struct Questionnaire {
    axes: Vec<Axis>,
    #[serde(skip)]
    index: HashMap<QuestionId, QuestionPosition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: AxisId,
    pub title: String,
    pub weight_percent: f64,
    pub sub_axes: Vec<SubAxis>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubAxis {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: SubAxisId,
    pub title: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: QuestionId,
    pub text: String,
    /// Display-only meaning of each score, keyed 1 to 5.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: BTreeMap<u8, String>,
}

impl Axis {
    pub fn sub_axes(&self) -> &[SubAxis] {
        &self.sub_axes
    }

    pub fn sub_axis(&self, id: &str) -> Option<&SubAxis> {
        self.sub_axes.iter().find(|sub_axis| sub_axis.id.as_str() == id)
    }

    /// Every question of the axis, flattened across sub-axes.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sub_axes.iter().flat_map(|sub_axis| sub_axis.questions.iter())
    }

    pub fn weight(&self) -> f64 {
        self.weight_percent / 100.0
    }
}

impl SubAxis {
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

impl Question {
    pub fn meaning(&self, score: Score) -> Option<&str> {
        self.notes.get(&score.value()).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy)]
struct QuestionPosition {
    axis: usize,
    sub_axis: usize,
    question: usize,
}

/// A question together with the axis and sub-axis that own it.
#[derive(Debug, Clone, Copy)]
pub struct QuestionRef<'a> {
    pub axis: &'a Axis,
    pub sub_axis: &'a SubAxis,
    pub question: &'a Question,
}

#[derive(Debug, Deserialize)]
struct QuestionnaireDocument {
    axes: Vec<Axis>,
}

impl Questionnaire {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, QuestionnaireError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, QuestionnaireError> {
        let document: QuestionnaireDocument = serde_json::from_reader(reader)?;
        Self::new(document.axes)
    }

    pub fn from_json(raw: &str) -> Result<Self, QuestionnaireError> {
        let document: QuestionnaireDocument = serde_json::from_str(raw)?;
        Self::new(document.axes)
    }

    /// Validate the structure and build the question index.
    pub fn new(axes: Vec<Axis>) -> Result<Self, QuestionnaireError> {
        let mut axis_ids = HashSet::new();
        let mut index = HashMap::new();

        for (axis_pos, axis) in axes.iter().enumerate() {
            if !axis_ids.insert(axis.id.clone()) {
                return Err(QuestionnaireError::DuplicateAxis(axis.id.clone()));
            }
            if !axis.weight_percent.is_finite() || axis.weight_percent < 0.0 {
                return Err(QuestionnaireError::InvalidWeight {
                    axis: axis.id.clone(),
                    weight: axis.weight_percent,
                });
            }

            let mut sub_axis_ids = HashSet::new();
            for (sub_pos, sub_axis) in axis.sub_axes.iter().enumerate() {
                if !sub_axis_ids.insert(sub_axis.id.clone()) {
                    return Err(QuestionnaireError::DuplicateSubAxis {
                        axis: axis.id.clone(),
                        sub_axis: sub_axis.id.clone(),
                    });
                }

                for (question_pos, question) in sub_axis.questions.iter().enumerate() {
                    let position = QuestionPosition {
                        axis: axis_pos,
                        sub_axis: sub_pos,
                        question: question_pos,
                    };
                    if index.insert(question.id.clone(), position).is_some() {
                        return Err(QuestionnaireError::DuplicateQuestion(question.id.clone()));
                    }
                }
            }
        }

        Ok(Self { axes, index })
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis(&self, id: &str) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.id.as_str() == id)
    }

    pub fn sub_axis(&self, axis_id: &str, sub_axis_id: &str) -> Option<&SubAxis> {
        self.axis(axis_id)?.sub_axis(sub_axis_id)
    }

    pub fn question(&self, id: &str) -> Option<QuestionRef<'_>> {
        let position = self.index.get(id)?;
        let axis = &self.axes[position.axis];
        let sub_axis = &axis.sub_axes[position.sub_axis];
        Some(QuestionRef {
            axis,
            sub_axis,
            question: &sub_axis.questions[position.question],
        })
    }

    pub fn contains_question(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Every question in definition order with its owners.
    pub fn questions(&self) -> impl Iterator<Item = QuestionRef<'_>> {
        self.axes.iter().flat_map(|axis| {
            axis.sub_axes.iter().flat_map(move |sub_axis| {
                sub_axis.questions.iter().map(move |question| QuestionRef {
                    axis,
                    sub_axis,
                    question,
                })
            })
        })
    }

    pub fn question_count(&self) -> usize {
        self.index.len()
    }
}

fn id_from_string_or_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Integer(i64),
        Unsigned(u64),
        Float(f64),
    }

    // Integral floats beyond 2^53 no longer map to a single integer.
    const EXACT_FLOAT_LIMIT: f64 = 9_007_199_254_740_992.0;

    let raw = match RawId::deserialize(deserializer)? {
        RawId::Text(value) => value,
        RawId::Integer(value) => value.to_string(),
        RawId::Unsigned(value) => value.to_string(),
        RawId::Float(value) if value.is_finite() && value.abs() <= EXACT_FLOAT_LIMIT => {
            value.to_string()
        }
        RawId::Float(value) => {
            return Err(serde::de::Error::custom(format!(
                "numeric id {value} cannot be represented exactly; quote it as a string"
            )))
        }
    };
    Ok(T::from(raw))
}

macro_rules! from_string {
    ($($name:ident),*) => {
        $(impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        })*
    };
}

from_string!(AxisId, SubAxisId, QuestionId);

#[derive(Debug, thiserror::Error)]
pub enum QuestionnaireError {
    #[error("failed to read questionnaire: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid questionnaire document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("axis id {0} appears more than once")]
    DuplicateAxis(AxisId),
    #[error("sub-axis id {sub_axis} appears more than once in axis {axis}")]
    DuplicateSubAxis { axis: AxisId, sub_axis: SubAxisId },
    #[error("question id {0} appears more than once")]
    DuplicateQuestion(QuestionId),
    #[error("axis {axis} has an invalid weight ({weight})")]
    InvalidWeight { axis: AxisId, weight: f64 },
}
