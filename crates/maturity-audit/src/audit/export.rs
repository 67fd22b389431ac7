use super::report::{AuditReport, Narrative};
use super::scoring::ScoringEngine;
use serde::Serialize;
use std::io::Write;

pub const REPORT_TITLE: &str = "AI Maturity Audit - CSV Report";
const ROW_HEADER: [&str; 5] = ["Axis", "Sub-axis", "Question", "Score", "Notes"];

/// One line of the flat export, in questionnaire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub axis_title: String,
    pub sub_axis_title: String,
    pub question_text: String,
    pub score: Option<u8>,
    pub notes: String,
}

impl ExportRow {
    fn record(&self) -> [String; 5] {
        [
            self.axis_title.clone(),
            self.sub_axis_title.clone(),
            self.question_text.clone(),
            self.score.map(|score| score.to_string()).unwrap_or_default(),
            self.notes.clone(),
        ]
    }
}

pub fn export_rows(engine: &ScoringEngine<'_>) -> Vec<ExportRow> {
    let responses = engine.responses();
    engine
        .questionnaire()
        .questions()
        .map(|entry| {
            let response = responses.get(entry.question.id.as_str());
            ExportRow {
                axis_title: entry.axis.title.clone(),
                sub_axis_title: entry.sub_axis.title.clone(),
                question_text: entry.question.text.clone(),
                score: response
                    .and_then(|response| response.score)
                    .map(|score| score.value()),
                notes: response
                    .and_then(|response| response.notes.clone())
                    .unwrap_or_default(),
            }
        })
        .collect()
}

pub fn write_rows_csv<W: Write>(rows: &[ExportRow], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(ROW_HEADER)?;
    for row in rows {
        csv_writer.write_record(row.record())?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn rows_csv_string(rows: &[ExportRow]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_rows_csv(rows, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Full CSV document: header, company, scores, responses and commentary,
/// with a blank line between sections.
pub fn write_report_csv(
    report: &AuditReport,
    rows: &[ExportRow],
    narrative: Option<&Narrative>,
) -> Result<String, ExportError> {
    let mut buffer = Vec::new();

    section(&mut buffer, |out| {
        out.write_record([REPORT_TITLE])?;
        let stamp = report.generated_at.format("%d/%m/%Y %H:%M").to_string();
        out.write_record(["Date", stamp.as_str()])
    })?;

    section(&mut buffer, |out| {
        out.write_record(["COMPANY INFORMATION"])?;
        for (label, value) in report.company.display_fields() {
            out.write_record([label, value])?;
        }
        Ok(())
    })?;

    section(&mut buffer, |out| {
        let score = format!("{:.2}/5", report.global_score);
        let completion = format!("{}%", report.completion);
        out.write_record(["GLOBAL SCORE"])?;
        out.write_record(["Score", score.as_str()])?;
        out.write_record(["Maturity level", report.maturity_summary().as_str()])?;
        out.write_record(["Completion", completion.as_str()])
    })?;

    section(&mut buffer, |out| {
        out.write_record(["SCORES BY AXIS"])?;
        out.write_record(["Axis", "Score", "Weight", "Completion"])?;
        for axis in &report.axes {
            out.write_record([
                axis.title.clone(),
                format!("{:.2}", axis.score),
                format!("{}%", axis.weight_percent),
                format!("{}%", axis.completion),
            ])?;
        }
        Ok(())
    })?;

    section(&mut buffer, |out| {
        out.write_record(["RESPONSE DETAILS"])?;
        out.write_record(ROW_HEADER)?;
        for row in rows {
            out.write_record(row.record())?;
        }
        Ok(())
    })?;

    section(&mut buffer, |out| {
        out.write_record(["INSIGHTS AND RECOMMENDATIONS"])?;
        match narrative {
            Some(narrative) => {
                for line in narrative.lines() {
                    out.write_record([line])?;
                }
            }
            None => out.write_record(["Insights not available"])?,
        }
        Ok(())
    })?;

    Ok(String::from_utf8(buffer)?)
}

fn section<F>(buffer: &mut Vec<u8>, fill: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut csv::Writer<&mut Vec<u8>>) -> Result<(), csv::Error>,
{
    if !buffer.is_empty() {
        buffer.push(b'\n');
    }
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(&mut *buffer);
    fill(&mut writer)?;
    writer.flush()?;
    Ok(())
}

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Encoding(std::string::FromUtf8Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "failed to write export: {}", err),
            ExportError::Csv(err) => write!(f, "failed to encode CSV export: {}", err),
            ExportError::Encoding(err) => write!(f, "export is not valid UTF-8: {}", err),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(err) => Some(err),
            ExportError::Csv(err) => Some(err),
            ExportError::Encoding(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err)
    }
}

impl From<std::string::FromUtf8Error> for ExportError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ExportError::Encoding(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::company::CompanyInfo;
    use crate::audit::questionnaire::Questionnaire;
    use crate::audit::report::{Narrative, NarrativeSource};
    use crate::audit::responses::{ResponseStore, Score};
    use chrono::{TimeZone, Utc};

    fn questionnaire() -> Questionnaire {
        Questionnaire::from_json(
            r#"{ "axes": [
                { "id": 1, "title": "Strategy", "weight_percent": 60, "sub_axes": [
                    { "id": "1.1", "title": "Vision", "questions": [
                        { "id": "q1", "text": "Is there an AI roadmap?" },
                        { "id": "q2", "text": "Budget, owners and KPIs?" } ] } ] },
                { "id": 2, "title": "Data", "weight_percent": 40, "sub_axes": [
                    { "id": "2.1", "title": "Quality", "questions": [
                        { "id": "q3", "text": "Is data catalogued?" } ] } ] }
            ] }"#,
        )
        .expect("valid questionnaire")
    }

    fn responses() -> ResponseStore {
        let mut responses = ResponseStore::new();
        responses.set_score("q1", Score::new(4).expect("in range"));
        responses.set_notes("q1", "board approved, \"v2\" pending");
        responses.set_score("q3", Score::new(2).expect("in range"));
        responses
    }

    #[test]
    fn rows_follow_questionnaire_order_and_leave_gaps_empty() {
        let questionnaire = questionnaire();
        let responses = responses();
        let rows = export_rows(&ScoringEngine::new(&questionnaire, &responses));

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].score, Some(4));
        assert_eq!(rows[1].score, None);
        assert_eq!(rows[1].notes, "");
        assert_eq!(rows[2].axis_title, "Data");
    }

    #[test]
    fn rows_csv_quotes_fields_that_need_it() {
        let questionnaire = questionnaire();
        let responses = responses();
        let rows = export_rows(&ScoringEngine::new(&questionnaire, &responses));
        let csv = rows_csv_string(&rows).expect("csv renders");
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Axis,Sub-axis,Question,Score,Notes");
        assert_eq!(
            lines[1],
            r#"Strategy,Vision,Is there an AI roadmap?,4,"board approved, ""v2"" pending""#
        );
        assert_eq!(lines[2], r#"Strategy,Vision,"Budget, owners and KPIs?",,"#);
        assert_eq!(lines[3], "Data,Quality,Is data catalogued?,2,");
    }

    #[test]
    fn report_csv_contains_every_section() {
        let questionnaire = questionnaire();
        let responses = responses();
        let engine = ScoringEngine::new(&questionnaire, &responses);
        let company = CompanyInfo {
            name: Some("Acme".to_string()),
            ..CompanyInfo::default()
        };
        let generated_at = Utc.with_ymd_and_hms(2025, 9, 24, 14, 5, 0).unwrap();
        let report = AuditReport::build(&engine, &company, generated_at);
        let rows = export_rows(&engine);

        let csv = write_report_csv(&report, &rows, None).expect("csv renders");
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], REPORT_TITLE);
        assert_eq!(lines[1], "Date,24/09/2025 14:05");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "COMPANY INFORMATION");
        assert_eq!(lines[4], "Name,Acme");
        assert!(lines.contains(&"Sector,Not specified"));
        // (60 * 2.0 + 40 * 2.0) / 100
        assert!(lines.contains(&"Score,2.00/5"));
        assert!(lines.contains(&"Strategy,2.00,60%,50%"));
        assert!(lines.contains(&"RESPONSE DETAILS"));
        assert_eq!(lines.last().copied(), Some("Insights not available"));
    }

    #[test]
    fn report_csv_embeds_narrative_lines() {
        let questionnaire = questionnaire();
        let responses = responses();
        let engine = ScoringEngine::new(&questionnaire, &responses);
        let report = AuditReport::build(&engine, &CompanyInfo::default(), Utc::now());
        let narrative = Narrative {
            source: NarrativeSource::Fallback,
            markdown: "# Executive summary\n\nKeep going, steadily.\n".to_string(),
        };

        let csv = write_report_csv(&report, &[], Some(&narrative)).expect("csv renders");
        let tail: Vec<&str> = csv.lines().rev().take(2).collect();
        assert_eq!(tail, vec![r#""Keep going, steadily.""#, "# Executive summary"]);
    }
}
