use super::views::{AuditInsights, AuditReport, AxisEntry, AxisObservation};

const STRENGTH_THRESHOLD: f64 = 3.0;
const MAX_HIGHLIGHTS: usize = 2;
const MIN_ROADMAP: usize = 3;
const MAX_ROADMAP: usize = 5;

pub(crate) fn generate_insights(report: &AuditReport) -> AuditInsights {
    let headline = format!(
        "{} (global score {:.1}/5)",
        report.maturity_summary(),
        report.global_score
    );

    let mut by_score_desc: Vec<&AxisEntry> = report.axes.iter().filter(|a| a.total > 0).collect();
    by_score_desc.sort_by(|a, b| b.score.total_cmp(&a.score));

    let strengths: Vec<AxisObservation> = by_score_desc
        .iter()
        .filter(|axis| axis.answered > 0 && axis.score >= STRENGTH_THRESHOLD)
        .take(MAX_HIGHLIGHTS)
        .map(|axis| strength(axis))
        .collect();

    let mut by_score_asc: Vec<&AxisEntry> = report.axes.iter().filter(|a| a.total > 0).collect();
    by_score_asc.sort_by(|a, b| a.score.total_cmp(&b.score));

    let weak_axes: Vec<&AxisEntry> = by_score_asc
        .into_iter()
        .filter(|axis| axis.score < STRENGTH_THRESHOLD || axis.completion < 100)
        .filter(|axis| !strengths.iter().any(|s| s.axis_id == axis.id))
        .take(MAX_HIGHLIGHTS)
        .collect();

    let weaknesses = weak_axes.iter().map(|axis| weakness(axis)).collect();

    let mut recommendations = Vec::new();
    for axis in &weak_axes {
        let remaining = axis.total.saturating_sub(axis.answered);
        if remaining > 0 {
            recommendations.push(format!(
                "Complete the remaining {} question{} of {} to get a reliable score",
                remaining,
                plural(remaining),
                axis.title
            ));
        }
        if let Some(sub_axis) = axis.weakest_sub_axis() {
            recommendations.push(format!(
                "Prioritize {} within {} (currently {:.1}/5)",
                sub_axis.title, axis.title, sub_axis.score
            ));
        }
    }

    let roadmap = build_roadmap(report);

    let mut observations = Vec::new();
    if report.total > 0 {
        observations.push(format!(
            "{} of {} questions answered ({}% complete)",
            report.answered, report.total, report.completion
        ));
    }
    if let Some(best) = &report.best_axis {
        if report.answered > 0 {
            observations.push(format!(
                "Best-performing axis: {} at {:.1}/5",
                best.title, best.score
            ));
        }
    }
    if report.completion < 100 && report.total > 0 {
        observations.push(
            "Unanswered questions count as 0 and lower every aggregate score".to_string(),
        );
    }

    AuditInsights {
        headline,
        strengths,
        weaknesses,
        recommendations,
        roadmap,
        observations,
    }
}

fn strength(axis: &AxisEntry) -> AxisObservation {
    let detail = match axis.strongest_sub_axis() {
        Some(sub_axis) => format!(
            "{} scores {:.1}/5 ({}); {} leads at {:.1}/5",
            axis.title,
            axis.score,
            axis.band_label.to_lowercase(),
            sub_axis.title,
            sub_axis.score
        ),
        None => format!("{} scores {:.1}/5", axis.title, axis.score),
    };
    observation(axis, detail)
}

fn weakness(axis: &AxisEntry) -> AxisObservation {
    let detail = if axis.completion < 100 {
        format!(
            "{} scores {:.1}/5 with {}% of its questions answered",
            axis.title, axis.score, axis.completion
        )
    } else {
        match axis.weakest_sub_axis() {
            Some(sub_axis) => format!(
                "{} scores {:.1}/5; {} is the weakest area at {:.1}/5",
                axis.title, axis.score, sub_axis.title, sub_axis.score
            ),
            None => format!("{} scores {:.1}/5", axis.title, axis.score),
        }
    };
    observation(axis, detail)
}

fn observation(axis: &AxisEntry, detail: String) -> AxisObservation {
    AxisObservation {
        axis_id: axis.id.clone(),
        axis_title: axis.title.clone(),
        score: axis.score,
        detail,
    }
}

/// Actions ordered by weighted headroom: (5 - score) scaled by axis weight.
fn build_roadmap(report: &AuditReport) -> Vec<String> {
    let mut roadmap = Vec::new();

    if report.total > 0 && report.completion < 100 {
        roadmap.push(format!(
            "Finish the questionnaire ({}/{} questions answered)",
            report.answered, report.total
        ));
    }

    let mut by_headroom: Vec<&AxisEntry> = report
        .axes
        .iter()
        .filter(|axis| axis.total > 0 && axis.score < 5.0)
        .collect();
    by_headroom.sort_by(|a, b| headroom(b).total_cmp(&headroom(a)));

    for axis in by_headroom {
        if roadmap.len() >= MAX_ROADMAP {
            break;
        }
        let target = (axis.score.floor() + 1.0).min(5.0);
        roadmap.push(format!(
            "Raise {} from {:.1} to {:.1} (weight {}%)",
            axis.title, axis.score, target, axis.weight_percent
        ));
    }

    let follow_ups = [
        "Share the results with leadership and assign an owner per axis",
        "Re-run the assessment in six months to measure progress",
        "Document the evidence behind each score in the question notes",
    ];
    for follow_up in follow_ups {
        if roadmap.len() >= MIN_ROADMAP {
            break;
        }
        roadmap.push(follow_up.to_string());
    }

    roadmap.truncate(MAX_ROADMAP);
    roadmap
}

fn headroom(axis: &AxisEntry) -> f64 {
    (5.0 - axis.score) * axis.weight_percent
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
