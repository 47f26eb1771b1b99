use std::fmt::Write;

use crate::models::{Evaluation, LogRow, RuleId, RuleSummary};

pub fn render_evaluation(student: &str, evaluation: &Evaluation) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Student: {}", student);

    if evaluation.is_empty() {
        let _ = writeln!(output, " (no rules evaluated)");
    }

    for (rule, outcome) in evaluation.iter() {
        let status = if outcome.passed { "✓" } else { "✗" };
        let _ = writeln!(output, " {} {:20}: {}", status, rule.column(), outcome.detail);
    }

    output
}

pub fn summarize(evaluations: &[(String, Evaluation)]) -> Vec<RuleSummary> {
    RuleId::ALL
        .iter()
        .map(|rule| {
            let mut summary = RuleSummary {
                rule: *rule,
                passed: 0,
                failed: 0,
                missing: 0,
            };
            for (_, evaluation) in evaluations {
                match evaluation.get(*rule) {
                    Some(outcome) if outcome.passed => summary.passed += 1,
                    Some(_) => summary.failed += 1,
                    None => summary.missing += 1,
                }
            }
            summary
        })
        .collect()
}

pub fn render_summary(evaluations: &[(String, Evaluation)]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Summary across {} students:", evaluations.len());

    for summary in summarize(evaluations) {
        let _ = write!(
            output,
            "- {:20} {} passed, {} failed",
            summary.rule.column(),
            summary.passed,
            summary.failed
        );
        if summary.missing > 0 {
            let _ = write!(output, ", {} not evaluated", summary.missing);
        }
        let _ = writeln!(output);
    }

    output
}

pub fn render_history(rows: &[LogRow]) -> String {
    let mut output = String::new();

    if rows.is_empty() {
        let _ = writeln!(output, "No evaluations logged yet.");
        return output;
    }

    for row in rows {
        let marks: String = row
            .outcomes()
            .iter()
            .map(|outcome| match outcome {
                Some(true) => '✓',
                Some(false) => '✗',
                None => '-',
            })
            .collect();
        let _ = writeln!(output, "{} {:20} {}", row.timestamp, row.student, marks);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleOutcome;

    fn evaluation(outcomes: &[(RuleId, bool)]) -> Evaluation {
        let mut evaluation = Evaluation::default();
        for (rule, passed) in outcomes {
            evaluation.push(*rule, RuleOutcome::new(*passed, "detail"));
        }
        evaluation
    }

    #[test]
    fn renders_one_line_per_rule_with_status() {
        let rendered = render_evaluation(
            "Avery",
            &evaluation(&[(RuleId::Attendance, true), (RuleId::Grading, false)]),
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Student: Avery");
        assert_eq!(lines[1], " ✓ AttendanceRule      : detail");
        assert_eq!(lines[2], " ✗ GradingRule         : detail");
    }

    #[test]
    fn summary_counts_passes_failures_and_gaps() {
        let evaluations = vec![
            (
                "a".to_string(),
                evaluation(&[(RuleId::Attendance, true), (RuleId::Grading, true)]),
            ),
            ("b".to_string(), evaluation(&[(RuleId::Attendance, false)])),
        ];

        let summaries = summarize(&evaluations);
        assert_eq!(summaries.len(), 5);
        assert_eq!(summaries[0].passed, 1);
        assert_eq!(summaries[0].failed, 1);
        assert_eq!(summaries[1].passed, 1);
        assert_eq!(summaries[1].missing, 1);
        assert_eq!(summaries[4].missing, 2);

        let rendered = render_summary(&evaluations);
        assert!(rendered.contains("2 not evaluated"));
    }

    #[test]
    fn empty_history_says_so() {
        assert_eq!(render_history(&[]), "No evaluations logged yet.\n");
    }
}
