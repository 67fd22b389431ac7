use crate::infra::AuditInputs;
use chrono::Utc;
use clap::Args;
use maturity_audit::audit::{
    build_prompt, export_rows, narrative, rows_csv_string, write_report_csv, AuditReport,
    RuleBasedInsights, ScoringEngine,
};
use maturity_audit::error::AppError;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct InputArgs {
    /// Questionnaire definition (JSON)
    #[arg(long)]
    pub(crate) questionnaire: PathBuf,
    /// Saved responses keyed by question id (JSON)
    #[arg(long)]
    pub(crate) responses: PathBuf,
    /// Optional company details (JSON)
    #[arg(long)]
    pub(crate) company: Option<PathBuf>,
}

impl InputArgs {
    fn load(&self) -> Result<AuditInputs, AppError> {
        AuditInputs::load(
            &self.questionnaire,
            &self.responses,
            self.company.as_deref(),
        )
    }
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    #[command(flatten)]
    pub(crate) inputs: InputArgs,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    #[command(flatten)]
    pub(crate) inputs: InputArgs,
    /// Write the CSV to this file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Only export the flat response rows
    #[arg(long)]
    pub(crate) rows_only: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PromptArgs {
    #[command(flatten)]
    pub(crate) inputs: InputArgs,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let inputs = args.inputs.load()?;
    let engine = ScoringEngine::new(&inputs.questionnaire, &inputs.responses);
    let report = AuditReport::build(&engine, &inputs.company, Utc::now());

    if args.json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|err| AppError::BadRequest(format!("report is not serializable: {err}")))?;
        println!("{rendered}");
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let inputs = args.inputs.load()?;
    let engine = ScoringEngine::new(&inputs.questionnaire, &inputs.responses);
    let rows = export_rows(&engine);

    let csv = if args.rows_only {
        rows_csv_string(&rows)?
    } else {
        let report = AuditReport::build(&engine, &inputs.company, Utc::now());
        let narrative = narrative(&RuleBasedInsights, &report);
        write_report_csv(&report, &rows, Some(&narrative))?
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, csv)?;
            println!("Wrote {} rows to {}", rows.len(), path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

pub(crate) fn run_prompt(args: PromptArgs) -> Result<(), AppError> {
    let inputs = args.inputs.load()?;
    let engine = ScoringEngine::new(&inputs.questionnaire, &inputs.responses);
    let report = AuditReport::build(&engine, &inputs.company, Utc::now());
    print!("{}", build_prompt(&report));
    Ok(())
}

pub(crate) fn render_report(report: &AuditReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "AI maturity audit for {}\n",
        report.company.name_or("Company")
    ));
    out.push_str(&format!(
        "Global score: {:.2}/5 ({})\n",
        report.global_score, report.maturity_label
    ));
    out.push_str(&format!(
        "Completion: {}% ({}/{} questions answered)\n",
        report.completion, report.answered, report.total
    ));
    if let Some(best) = &report.best_axis {
        out.push_str(&format!("Best axis: {} ({:.2}/5)\n", best.title, best.score));
    }

    out.push_str("\nAxes\n");
    for axis in &report.axes {
        out.push_str(&format!(
            "- {} [{}%]: {:.2}/5, {}% complete\n",
            axis.title, axis.weight_percent, axis.score, axis.completion
        ));
        for sub_axis in &axis.sub_axes {
            out.push_str(&format!(
                "    {}: {:.2}/5, {}/{} answered\n",
                sub_axis.title, sub_axis.score, sub_axis.answered, sub_axis.total
            ));
        }
    }

    out.push('\n');
    out.push_str(&report.insights().to_markdown());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use maturity_audit::audit::{CompanyInfo, Questionnaire, ResponseStore, Score};

    #[test]
    fn text_report_lists_axes_and_insights() {
        let questionnaire = Questionnaire::from_json(
            r#"{ "axes": [
                { "id": 1, "title": "Strategy", "weight_percent": 60, "sub_axes": [
                    { "id": 1, "title": "Vision", "questions": [ { "id": "q1", "text": "one" } ] } ] },
                { "id": 2, "title": "Data", "weight_percent": 40, "sub_axes": [
                    { "id": 1, "title": "Quality", "questions": [ { "id": "q2", "text": "two" } ] } ] }
            ] }"#,
        )
        .expect("valid questionnaire");
        let mut responses = ResponseStore::new();
        responses.set_score("q1", Score::new(4).expect("in range"));
        responses.set_score("q2", Score::new(5).expect("in range"));
        let engine = ScoringEngine::new(&questionnaire, &responses);
        let report = AuditReport::build(&engine, &CompanyInfo::default(), Utc::now());

        let text = render_report(&report);
        assert!(text.starts_with("AI maturity audit for Company"));
        // 0.6 * 4 + 0.4 * 5
        assert!(text.contains("Global score: 4.40/5 (Advanced)"));
        assert!(text.contains("Best axis: Data (5.00/5)"));
        assert!(text.contains("- Strategy [60%]: 4.00/5, 100% complete"));
        assert!(text.contains("# Executive summary"));
    }
}
