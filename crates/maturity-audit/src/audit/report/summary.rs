use super::super::company::CompanyInfo;
use super::super::questionnaire::{Axis, Question, SubAxis};
use super::super::scoring::{ScoreBand, Scope, ScoringEngine};
use super::views::{AuditInsights, AuditReport, AxisEntry, BestAxisView, QuestionEntry, SubAxisEntry};
use chrono::{DateTime, Utc};

impl AuditReport {
    /// Snapshot every derived value of the engine into a serializable report.
    pub fn build(
        engine: &ScoringEngine<'_>,
        company: &CompanyInfo,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let global_score = engine.global_score();
        let maturity_level = engine.maturity_level();

        let axes = engine
            .questionnaire()
            .axes()
            .iter()
            .map(|axis| axis_entry(engine, axis))
            .collect();

        let best_axis = engine.best_axis().map(|axis| BestAxisView {
            id: axis.id.to_string(),
            title: axis.title.clone(),
            score: engine.axis_score(axis),
        });

        Self {
            generated_at,
            company: company.clone(),
            global_score,
            maturity_level,
            maturity_label: maturity_level.label(),
            maturity_description: maturity_level.description(),
            completion: engine.completion(Scope::Questionnaire),
            answered: engine.answered_count(Scope::Questionnaire),
            total: engine.total_count(Scope::Questionnaire),
            best_axis,
            axes,
        }
    }

    pub fn insights(&self) -> AuditInsights {
        super::generate_insights(self)
    }
}

fn axis_entry(engine: &ScoringEngine<'_>, axis: &Axis) -> AxisEntry {
    let score = engine.axis_score(axis);
    let band = ScoreBand::from_score(score);
    AxisEntry {
        id: axis.id.to_string(),
        title: axis.title.clone(),
        weight_percent: axis.weight_percent,
        score,
        completion: engine.completion(Scope::Axis(axis)),
        answered: engine.answered_count(Scope::Axis(axis)),
        total: engine.total_count(Scope::Axis(axis)),
        band,
        band_label: band.label(),
        sub_axes: axis
            .sub_axes()
            .iter()
            .map(|sub_axis| sub_axis_entry(engine, sub_axis))
            .collect(),
    }
}

fn sub_axis_entry(engine: &ScoringEngine<'_>, sub_axis: &SubAxis) -> SubAxisEntry {
    let score = engine.sub_axis_score(sub_axis);
    let band = ScoreBand::from_score(score);
    SubAxisEntry {
        id: sub_axis.id.to_string(),
        title: sub_axis.title.clone(),
        score,
        completion: engine.completion(Scope::SubAxis(sub_axis)),
        answered: engine.answered_count(Scope::SubAxis(sub_axis)),
        total: engine.total_count(Scope::SubAxis(sub_axis)),
        band,
        band_label: band.label(),
        questions: sub_axis
            .questions()
            .iter()
            .map(|question| question_entry(engine, question))
            .collect(),
    }
}

fn question_entry(engine: &ScoringEngine<'_>, question: &Question) -> QuestionEntry {
    let response = engine.responses().get(question.id.as_str());
    let score = response.and_then(|response| response.score);
    QuestionEntry {
        id: question.id.to_string(),
        text: question.text.clone(),
        score: score.map(|score| score.value()),
        effective_score: engine.question_score(question),
        answered: score.is_some(),
        meaning: score
            .and_then(|score| question.meaning(score))
            .map(str::to_string),
        notes: response
            .and_then(|response| response.notes.clone())
            .filter(|notes| !notes.is_empty()),
    }
}
