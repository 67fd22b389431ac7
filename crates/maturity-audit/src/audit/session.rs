use super::company::CompanyInfo;
use super::questionnaire::{QuestionId, Questionnaire};
use super::responses::{ResponseStore, Score};
use super::scoring::ScoringEngine;
use super::snapshot::{SnapshotKey, SnapshotStore};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Notification returned by every mutation so callers know what to refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    ScoreChanged {
        question_id: QuestionId,
        previous: Option<Score>,
        current: Score,
    },
    NotesChanged {
        question_id: QuestionId,
    },
    CompanyChanged,
}

impl SessionChange {
    pub fn affects_scores(&self) -> bool {
        matches!(self, Self::ScoreChanged { previous, current, .. } if *previous != Some(*current))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("question {0} is not part of the questionnaire")]
    UnknownQuestion(String),
}

/// Single owner of the questionnaire, responses and company details.
pub struct AuditSession {
    questionnaire: Questionnaire,
    responses: ResponseStore,
    company: CompanyInfo,
    last_update: Option<DateTime<Utc>>,
    store: Arc<dyn SnapshotStore>,
}

impl AuditSession {
    /// Rehydrate from the store. Responses that fail to decode are dropped one by one
    /// and the original blob is kept under [`SnapshotKey::CorruptResponses`].
    pub fn open(questionnaire: Questionnaire, store: Arc<dyn SnapshotStore>) -> Self {
        let responses = load_responses(store.as_ref());
        let company: CompanyInfo =
            load_snapshot(store.as_ref(), SnapshotKey::CompanyInfo).unwrap_or_default();
        let last_update = store
            .load(SnapshotKey::LastUpdate)
            .ok()
            .flatten()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|stamp| stamp.with_timezone(&Utc));

        info!(
            questions = questionnaire.question_count(),
            responses = responses.len(),
            "audit session opened"
        );

        Self {
            questionnaire,
            responses,
            company,
            last_update,
            store,
        }
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn responses(&self) -> &ResponseStore {
        &self.responses
    }

    pub fn company(&self) -> &CompanyInfo {
        &self.company
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn engine(&self) -> ScoringEngine<'_> {
        ScoringEngine::new(&self.questionnaire, &self.responses)
    }

    pub fn set_score(
        &mut self,
        question_id: &str,
        score: Score,
    ) -> Result<SessionChange, SessionError> {
        let question_id = self.known_question(question_id)?;
        let previous = self.responses.score(question_id.as_str());
        self.responses.set_score(question_id.clone(), score);
        debug!(%question_id, score = score.value(), "score recorded");
        self.persist();

        Ok(SessionChange::ScoreChanged {
            question_id,
            previous,
            current: score,
        })
    }

    pub fn set_notes(
        &mut self,
        question_id: &str,
        notes: impl Into<String>,
    ) -> Result<SessionChange, SessionError> {
        let question_id = self.known_question(question_id)?;
        self.responses.set_notes(question_id.clone(), notes);
        debug!(%question_id, "notes recorded");
        self.persist();

        Ok(SessionChange::NotesChanged { question_id })
    }

    pub fn set_company_info(&mut self, company: CompanyInfo) -> SessionChange {
        self.company = company;
        self.persist();
        SessionChange::CompanyChanged
    }

    fn known_question(&self, question_id: &str) -> Result<QuestionId, SessionError> {
        self.questionnaire
            .question(question_id)
            .map(|entry| entry.question.id.clone())
            .ok_or_else(|| SessionError::UnknownQuestion(question_id.to_string()))
    }

    /// Best-effort write of every snapshot; failures never reach the caller.
    fn persist(&mut self) {
        let now = Utc::now();
        self.last_update = Some(now);

        match self.responses.to_json() {
            Ok(encoded) => save_snapshot(self.store.as_ref(), SnapshotKey::Responses, &encoded),
            Err(err) => warn!(error = %err, "could not encode responses snapshot"),
        }
        match serde_json::to_string(&self.company) {
            Ok(encoded) => save_snapshot(self.store.as_ref(), SnapshotKey::CompanyInfo, &encoded),
            Err(err) => warn!(error = %err, "could not encode company snapshot"),
        }
        save_snapshot(
            self.store.as_ref(),
            SnapshotKey::LastUpdate,
            &now.to_rfc3339(),
        );
    }
}

fn load_responses(store: &dyn SnapshotStore) -> ResponseStore {
    let key = SnapshotKey::Responses;
    let raw = match store.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return ResponseStore::default(),
        Err(err) => {
            warn!(key = key.as_str(), error = %err, "snapshot unavailable, starting empty");
            return ResponseStore::default();
        }
    };

    match ResponseStore::from_json_lenient(&raw) {
        Ok((responses, rejected)) => {
            for (question_id, err) in &rejected {
                warn!(key = key.as_str(), %question_id, error = %err, "dropping unreadable response");
            }
            if !rejected.is_empty() {
                preserve_corrupt_responses(store, &raw);
            }
            responses
        }
        Err(err) => {
            warn!(key = key.as_str(), error = %err, "responses snapshot unreadable, starting empty");
            preserve_corrupt_responses(store, &raw);
            ResponseStore::default()
        }
    }
}

fn preserve_corrupt_responses(store: &dyn SnapshotStore, raw: &str) {
    let key = SnapshotKey::CorruptResponses;
    match store.save(key, raw) {
        Ok(()) => warn!(key = key.as_str(), "kept a copy of the unreadable responses snapshot"),
        Err(err) => warn!(key = key.as_str(), error = %err, "could not keep unreadable responses snapshot"),
    }
}

fn load_snapshot<T: DeserializeOwned>(store: &dyn SnapshotStore, key: SnapshotKey) -> Option<T> {
    let raw = match store.load(key) {
        Ok(raw) => raw?,
        Err(err) => {
            warn!(key = key.as_str(), error = %err, "snapshot unavailable, starting empty");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key = key.as_str(), error = %err, "discarding corrupted snapshot");
            None
        }
    }
}

fn save_snapshot(store: &dyn SnapshotStore, key: SnapshotKey, contents: &str) {
    if let Err(err) = store.save(key, contents) {
        warn!(key = key.as_str(), error = %err, "snapshot write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::snapshot::{MemorySnapshotStore, SnapshotError};

    fn questionnaire() -> Questionnaire {
        Questionnaire::from_json(
            r#"{ "axes": [ { "id": 1, "title": "Strategy", "weight_percent": 100, "sub_axes": [
                { "id": 1, "title": "Vision", "questions": [
                    { "id": "q1", "text": "one" }, { "id": "q2", "text": "two" } ] } ] } ] }"#,
        )
        .expect("valid questionnaire")
    }

    fn score(value: i64) -> Score {
        Score::new(value).expect("score in range")
    }

    struct FailingStore;

    impl SnapshotStore for FailingStore {
        fn load(&self, _key: SnapshotKey) -> Result<Option<String>, SnapshotError> {
            Err(SnapshotError::Unavailable("disk offline".to_string()))
        }

        fn save(&self, _key: SnapshotKey, _contents: &str) -> Result<(), SnapshotError> {
            Err(SnapshotError::Unavailable("disk offline".to_string()))
        }
    }

    #[test]
    fn mutations_are_persisted_under_expected_keys() {
        let store = Arc::new(MemorySnapshotStore::default());
        let mut session = AuditSession::open(questionnaire(), store.clone());

        session.set_score("q1", score(4)).expect("known question");
        session.set_notes("q2", "pilot running").expect("known question");
        session.set_company_info(CompanyInfo {
            name: Some("Acme".to_string()),
            ..CompanyInfo::default()
        });

        assert_eq!(
            store.blob(SnapshotKey::Responses).as_deref(),
            Some(r#"{"q1":{"score":4},"q2":{"notes":"pilot running"}}"#)
        );
        assert_eq!(
            store.blob(SnapshotKey::CompanyInfo).as_deref(),
            Some(r#"{"name":"Acme"}"#)
        );
        assert!(store.blob(SnapshotKey::LastUpdate).is_some());
        assert!(session.last_update().is_some());
    }

    #[test]
    fn open_rehydrates_previous_snapshot() {
        let store = Arc::new(
            MemorySnapshotStore::default()
                .with_blob(SnapshotKey::Responses, r#"{"q1":{"score":5,"notes":"done"}}"#)
                .with_blob(SnapshotKey::CompanyInfo, r#"{"sector":"Retail"}"#)
                .with_blob(SnapshotKey::LastUpdate, "2025-09-24T10:00:00+00:00"),
        );
        let session = AuditSession::open(questionnaire(), store);
        assert!(session.responses().is_answered("q1"));
        assert_eq!(session.company().sector.as_deref(), Some("Retail"));
        assert!(session.last_update().is_some());
    }

    #[test]
    fn corrupted_snapshot_starts_empty_and_is_kept_aside() {
        let store = Arc::new(
            MemorySnapshotStore::default().with_blob(SnapshotKey::Responses, "{not json"),
        );
        let mut session = AuditSession::open(questionnaire(), store.clone());
        assert!(session.responses().is_empty());
        assert_eq!(
            store.blob(SnapshotKey::CorruptResponses).as_deref(),
            Some("{not json")
        );

        session.set_score("q1", score(3)).expect("known question");
        assert_eq!(
            store.blob(SnapshotKey::CorruptResponses).as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn one_bad_entry_does_not_discard_the_others() {
        let raw = r#"{"q1":{"score":5,"notes":"keep me"},"q2":{"score":0}}"#;
        let store = Arc::new(MemorySnapshotStore::default().with_blob(SnapshotKey::Responses, raw));
        let mut session = AuditSession::open(questionnaire(), store.clone());
        assert_eq!(session.responses().score("q1"), Some(score(5)));
        assert!(!session.responses().is_answered("q2"));
        assert_eq!(store.blob(SnapshotKey::CorruptResponses).as_deref(), Some(raw));

        session.set_score("q2", score(2)).expect("known question");
        assert_eq!(
            store.blob(SnapshotKey::Responses).as_deref(),
            Some(r#"{"q1":{"score":5,"notes":"keep me"},"q2":{"score":2}}"#)
        );
    }

    #[test]
    fn clean_snapshot_is_not_copied_aside() {
        let store = Arc::new(
            MemorySnapshotStore::default().with_blob(SnapshotKey::Responses, r#"{"q1":{"score":4}}"#),
        );
        AuditSession::open(questionnaire(), store.clone());
        assert!(store.blob(SnapshotKey::CorruptResponses).is_none());
    }

    #[test]
    fn unknown_questions_are_rejected() {
        let mut session = AuditSession::open(questionnaire(), Arc::new(MemorySnapshotStore::default()));
        match session.set_score("q9", score(3)) {
            Err(SessionError::UnknownQuestion(id)) => assert_eq!(id, "q9"),
            other => panic!("expected unknown question, got {other:?}"),
        }
        assert!(session.responses().is_empty());
    }

    #[test]
    fn store_failures_never_block_scoring() {
        let mut session = AuditSession::open(questionnaire(), Arc::new(FailingStore));
        session.set_score("q1", score(5)).expect("mutation succeeds");
        session.set_score("q2", score(3)).expect("mutation succeeds");
        assert!((session.engine().global_score() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn change_notification_reports_previous_score() {
        let mut session = AuditSession::open(questionnaire(), Arc::new(MemorySnapshotStore::default()));
        let first = session.set_score("q1", score(2)).expect("known");
        assert!(first.affects_scores());
        let repeat = session.set_score("q1", score(2)).expect("known");
        assert_eq!(
            repeat,
            SessionChange::ScoreChanged {
                question_id: QuestionId::new("q1"),
                previous: Some(score(2)),
                current: score(2),
            }
        );
        assert!(!repeat.affects_scores());
        let notes = session.set_notes("q1", "why").expect("known");
        assert!(!notes.affects_scores());
    }
}
