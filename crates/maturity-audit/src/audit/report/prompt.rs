use super::views::AuditReport;
use std::fmt::Write;

const INSTRUCTIONS: &str = "Analyze the following AI maturity audit data in depth and write a \
detailed insights report in English. For each axis (not the sub-axes):
1. Identify the 2 major strengths (high axis scores) and explain why they are an advantage
2. Identify the 2 critical weaknesses (low axis scores) and explain the associated risks
3. Propose 2-3 concrete, actionable recommendations tailored to the weak points

Then:
- Give a detailed evaluation of the organization across every axis
- Give an overall analysis of the organization's AI maturity
- Suggest an improvement roadmap with 3-5 priority actions
- Use clear, professional language suited to a non-technical audience
- Structure the result with markdown headings and sub-headings
- Use the company information to contextualize the recommendations

Audit data:";

const SEPARATOR: &str = "-------------------------------------------";

/// Render the report as the text handed to an external narrative generator.
pub fn build_prompt(report: &AuditReport) -> String {
    let mut prompt = String::with_capacity(4096);
    // Writing into a String cannot fail.
    let _ = write_prompt(&mut prompt, report);
    prompt
}

fn write_prompt(out: &mut String, report: &AuditReport) -> std::fmt::Result {
    writeln!(out, "{INSTRUCTIONS}\n")?;

    let fields = report.company.display_fields();
    writeln!(out, "COMPANY INFORMATION:")?;
    for (label, value) in fields
        .iter()
        .filter(|(label, _)| matches!(*label, "Name" | "Sector" | "Size" | "Description"))
    {
        writeln!(out, "{label}: {value}")?;
    }
    writeln!(out)?;

    writeln!(out, "GLOBAL SCORE: {:.1}/5", report.global_score)?;
    writeln!(out, "MATURITY LEVEL: {}\n", report.maturity_summary())?;
    writeln!(out, "DETAILS BY AXIS:\n")?;

    for axis in &report.axes {
        writeln!(out, "AXIS {}: {}", axis.id, axis.title)?;
        writeln!(out, "Score: {:.1}/5", axis.score)?;
        writeln!(out, "Weight: {}%", axis.weight_percent)?;
        writeln!(out, "Completion: {}%\n", axis.completion)?;

        for sub_axis in &axis.sub_axes {
            writeln!(out, "  SUB-AXIS {}: {}", sub_axis.id, sub_axis.title)?;
            writeln!(out, "  Score: {:.1}/5", sub_axis.score)?;
            writeln!(out, "  Completion: {}%\n", sub_axis.completion)?;

            for question in &sub_axis.questions {
                writeln!(out, "    QUESTION {}: {}", question.id, question.text)?;
                match question.score {
                    Some(score) => writeln!(out, "    Score: {score}/5")?,
                    None => writeln!(out, "    Score: 0/5 (unanswered)")?,
                }
                if let Some(meaning) = &question.meaning {
                    writeln!(out, "    Meaning: {meaning}")?;
                }
                if let Some(notes) = &question.notes {
                    writeln!(out, "    Notes: {notes}")?;
                }
                writeln!(out)?;
            }
        }

        writeln!(out, "{SEPARATOR}\n")?;
    }

    Ok(())
}
