use crate::commands::{run_export, run_prompt, run_report, ExportArgs, PromptArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use maturity_audit::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "AI Maturity Audit",
    about = "Score, report on and export AI maturity self-assessments",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the scores and rule-based insights for a saved assessment
    Report(ReportArgs),
    /// Export a saved assessment as CSV
    Export(ExportArgs),
    /// Print the narrative prompt built from a saved assessment
    Prompt(PromptArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Export(args) => run_export(args),
        Command::Prompt(args) => run_prompt(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_flags_parse() {
        let cli = Cli::try_parse_from([
            "maturity-audit-api",
            "export",
            "--questionnaire",
            "questionnaire.json",
            "--responses",
            "responses.json",
            "--rows-only",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Export(args)) => {
                assert!(args.rows_only);
                assert!(args.output.is_none());
                assert!(args.inputs.company.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn report_requires_inputs() {
        assert!(Cli::try_parse_from(["maturity-audit-api", "report", "--json"]).is_err());
    }
}
