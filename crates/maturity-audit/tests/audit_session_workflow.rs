use chrono::NaiveDate;
use maturity_audit::audit::{
    export_rows, narrative, write_report_csv, AuditEmail, AuditReport, AuditSession, CompanyInfo,
    FileSnapshotStore, Questionnaire, RuleBasedInsights, Score, Scope, SnapshotKey,
    SnapshotStore,
};
use std::sync::Arc;

const QUESTIONNAIRE: &str = r#"{ "axes": [
    { "id": 1, "title": "Strategy & Vision", "weight_percent": 30, "sub_axes": [
        { "id": "1.1", "title": "Roadmap", "questions": [
            { "id": "1.1.1", "text": "Is there a documented AI roadmap?",
              "notes": { "1": "No roadmap", "5": "Roadmap reviewed quarterly" } },
            { "id": "1.1.2", "text": "Does leadership sponsor AI initiatives?" } ] } ] },
    { "id": 2, "title": "Data", "weight_percent": 40, "sub_axes": [
        { "id": "2.1", "title": "Quality", "questions": [
            { "id": "2.1.1", "text": "Is data quality measured?" } ] },
        { "id": "2.2", "title": "Governance", "questions": [
            { "id": "2.2.1", "text": "Are data owners assigned?" } ] } ] },
    { "id": 3, "title": "People", "weight_percent": 30, "sub_axes": [
        { "id": "3.1", "title": "Skills", "questions": [
            { "id": "3.1.1", "text": "Do teams have ML skills?" } ] } ] }
] }"#;

fn score(value: i64) -> Score {
    Score::new(value).expect("score in range")
}

#[test]
fn session_survives_a_restart_through_the_file_store() {
    let dir = tempfile::tempdir().expect("temp dir");
    let data_dir = dir.path().join("audit-data");

    {
        let questionnaire = Questionnaire::from_json(QUESTIONNAIRE).expect("valid questionnaire");
        let store = Arc::new(FileSnapshotStore::new(&data_dir));
        let mut session = AuditSession::open(questionnaire, store);
        session.set_score("1.1.1", score(5)).expect("known question");
        session.set_score("2.1.1", score(2)).expect("known question");
        session
            .set_notes("2.1.1", "quality checks are manual")
            .expect("known question");
        session.set_company_info(CompanyInfo {
            name: Some("Acme Retail".to_string()),
            sector: Some("Retail".to_string()),
            email: Some("cdo@acme.test".to_string()),
            ..CompanyInfo::default()
        });
    }

    assert!(data_dir.join("audit-responses.json").exists());
    assert!(data_dir.join("company-info.json").exists());

    let questionnaire = Questionnaire::from_json(QUESTIONNAIRE).expect("valid questionnaire");
    let store = Arc::new(FileSnapshotStore::new(&data_dir));
    let raw = store
        .load(SnapshotKey::Responses)
        .expect("readable")
        .expect("responses saved");
    assert!(raw.contains("quality checks are manual"));

    let session = AuditSession::open(questionnaire, store);
    assert!(session.last_update().is_some());
    assert_eq!(session.company().name.as_deref(), Some("Acme Retail"));

    let engine = session.engine();
    assert_eq!(engine.answered_count(Scope::Questionnaire), 2);
    assert_eq!(engine.total_count(Scope::Questionnaire), 5);
    assert_eq!(engine.completion(Scope::Questionnaire), 40);
    // Strategy (5+0)/2 * 0.3 + Data (2+0)/2 * 0.4 + People 0 * 0.3
    assert!((engine.global_score() - 1.15).abs() < 1e-9);
    assert_eq!(engine.best_axis().map(|axis| axis.title.as_str()), Some("Strategy & Vision"));
}

#[test]
fn unreadable_entry_on_disk_does_not_erase_valid_answers() {
    let dir = tempfile::tempdir().expect("temp dir");
    let raw = r#"{"1.1.1":{"score":5,"notes":"keep me"},"1.1.2":{"score":4},"2.1.1":{"score":0}}"#;
    let store = Arc::new(FileSnapshotStore::new(dir.path()));
    store.save(SnapshotKey::Responses, raw).expect("seed snapshot");

    let questionnaire = Questionnaire::from_json(QUESTIONNAIRE).expect("valid questionnaire");
    let mut session = AuditSession::open(questionnaire, store.clone());
    assert_eq!(session.responses().len(), 2);
    session.set_score("2.1.1", score(2)).expect("known question");

    let on_disk: serde_json::Value = serde_json::from_str(
        &store
            .load(SnapshotKey::Responses)
            .expect("readable")
            .expect("responses saved"),
    )
    .expect("valid json");
    assert_eq!(
        on_disk,
        serde_json::json!({
            "1.1.1": { "score": 5, "notes": "keep me" },
            "1.1.2": { "score": 4 },
            "2.1.1": { "score": 2 }
        })
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("audit-responses.corrupt.json")).expect("kept aside"),
        raw
    );
}

#[test]
fn report_export_and_email_share_one_view_of_the_session() {
    let dir = tempfile::tempdir().expect("temp dir");
    let questionnaire = Questionnaire::from_json(QUESTIONNAIRE).expect("valid questionnaire");
    let mut session = AuditSession::open(questionnaire, Arc::new(FileSnapshotStore::new(dir.path())));
    for (id, value) in [("1.1.1", 5), ("1.1.2", 4), ("2.1.1", 2), ("2.2.1", 1), ("3.1.1", 3)] {
        session.set_score(id, score(value)).expect("known question");
    }
    session.set_company_info(CompanyInfo {
        name: Some("Acme Retail".to_string()),
        ..CompanyInfo::default()
    });

    let engine = session.engine();
    let report = AuditReport::build(&engine, session.company(), chrono::Utc::now());
    assert_eq!(report.completion, 100);
    let strategy = report.axis("1").expect("strategy axis");
    assert!((strategy.score - 4.5).abs() < 1e-9);
    let (_, _, question) = report.question("1.1.1").expect("question present");
    assert_eq!(question.meaning.as_deref(), Some("Roadmap reviewed quarterly"));

    let insights = report.insights();
    assert_eq!(insights.strengths[0].axis_title, "Strategy & Vision");
    assert_eq!(insights.weaknesses[0].axis_title, "Data");

    let rows = export_rows(&engine);
    assert_eq!(rows.len(), 5);
    let narrative = narrative(&RuleBasedInsights, &report);
    let csv = write_report_csv(&report, &rows, Some(&narrative)).expect("csv renders");
    assert!(csv.contains("Strategy & Vision,Roadmap,Is there a documented AI roadmap?,5,"));
    assert!(csv.contains("## Strengths"));

    let sent_on = NaiveDate::from_ymd_opt(2025, 9, 24).expect("valid date");
    let email = AuditEmail::compose(&report, csv, sent_on);
    assert_eq!(email.subject, "AI Maturity Audit - Acme Retail - 24/09/2025");
    assert!(email.body_csv.starts_with("AI Maturity Audit - CSV Report"));
}
