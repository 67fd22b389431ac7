use super::questionnaire::{Axis, Question, Questionnaire, SubAxis};
use super::responses::ResponseStore;
use serde::{Deserialize, Serialize};

/// Which part of the questionnaire a completion figure covers.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    Questionnaire,
    Axis(&'a Axis),
    SubAxis(&'a SubAxis),
}

/// Read-only scoring over a questionnaire and a snapshot of responses.
///
/// Nothing is cached: every call walks the questionnaire and reads the store,
/// so results always reflect the responses the engine was built with.
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine<'a> {
    questionnaire: &'a Questionnaire,
    responses: &'a ResponseStore,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(questionnaire: &'a Questionnaire, responses: &'a ResponseStore) -> Self {
        Self {
            questionnaire,
            responses,
        }
    }

    pub fn questionnaire(&self) -> &'a Questionnaire {
        self.questionnaire
    }

    pub fn responses(&self) -> &'a ResponseStore {
        self.responses
    }

    /// Stored score, or 0 when the question has not been rated.
    pub fn question_score(&self, question: &Question) -> f64 {
        self.responses
            .score(question.id.as_str())
            .map_or(0.0, |score| score.as_f64())
    }

    pub fn sub_axis_score(&self, sub_axis: &SubAxis) -> f64 {
        mean(sub_axis.questions().iter().map(|q| self.question_score(q)))
    }

    /// Mean over every question of the axis, so larger sub-axes weigh more.
    pub fn axis_score(&self, axis: &Axis) -> f64 {
        mean(axis.questions().map(|q| self.question_score(q)))
    }

    /// Weighted mean of the axis scores, renormalized by the weights present.
    pub fn global_score(&self) -> f64 {
        let (weighted, total_weight) = self
            .questionnaire
            .axes()
            .iter()
            .fold((0.0, 0.0), |(weighted, total), axis| {
                let weight = axis.weight();
                (weighted + self.axis_score(axis) * weight, total + weight)
            });

        if total_weight > 0.0 {
            weighted / total_weight
        } else {
            0.0
        }
    }

    pub fn total_count(&self, scope: Scope<'_>) -> usize {
        match scope {
            Scope::Questionnaire => self.questionnaire.question_count(),
            Scope::Axis(axis) => axis.questions().count(),
            Scope::SubAxis(sub_axis) => sub_axis.questions().len(),
        }
    }

    pub fn answered_count(&self, scope: Scope<'_>) -> usize {
        let is_answered = |question: &Question| self.responses.is_answered(question.id.as_str());
        match scope {
            Scope::Questionnaire => self
                .questionnaire
                .questions()
                .filter(|entry| is_answered(entry.question))
                .count(),
            Scope::Axis(axis) => axis.questions().filter(|q| is_answered(q)).count(),
            Scope::SubAxis(sub_axis) => sub_axis
                .questions()
                .iter()
                .filter(|q| is_answered(q))
                .count(),
        }
    }

    /// Rounded percentage of rated questions in the scope.
    pub fn completion(&self, scope: Scope<'_>) -> u8 {
        let total = self.total_count(scope);
        if total == 0 {
            return 0;
        }
        let answered = self.answered_count(scope);
        (100.0 * answered as f64 / total as f64).round() as u8
    }

    /// Highest-scoring axis; the earliest one wins a tie.
    pub fn best_axis(&self) -> Option<&'a Axis> {
        let mut best: Option<(&'a Axis, f64)> = None;
        for axis in self.questionnaire.axes() {
            let score = self.axis_score(axis);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((axis, score)),
            }
        }
        best.map(|(axis, _)| axis)
    }

    pub fn maturity_level(&self) -> MaturityLevel {
        MaturityLevel::from_score(self.global_score())
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityLevel {
    Initial,
    Beginner,
    Intermediate,
    Advanced,
    Excellence,
}

impl MaturityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 4.5 {
            Self::Excellence
        } else if score >= 3.5 {
            Self::Advanced
        } else if score >= 2.5 {
            Self::Intermediate
        } else if score >= 1.5 {
            Self::Beginner
        } else {
            Self::Initial
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellence => "Excellence",
            Self::Advanced => "Advanced",
            Self::Intermediate => "Intermediate",
            Self::Beginner => "Beginner",
            Self::Initial => "Initial",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Excellence => "Your organization is a leader in AI",
            Self::Advanced => "Good maturity with a few areas for improvement",
            Self::Intermediate => "Solid foundations, development in progress",
            Self::Beginner => "First steps toward AI maturity",
            Self::Initial => "Significant opportunities for development",
        }
    }
}

/// Coarse colour band used when listing axis and sub-axis scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Strong,
    Solid,
    Developing,
    Weak,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 4.0 {
            Self::Strong
        } else if score >= 3.0 {
            Self::Solid
        } else if score >= 2.0 {
            Self::Developing
        } else {
            Self::Weak
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Solid => "Solid",
            Self::Developing => "Developing",
            Self::Weak => "Weak",
        }
    }
}
