use crate::evaluator;
use crate::results_log::CsvLog;
use crate::models::{Evaluation, Student};
use crate::report;
use crate::rules::RuleConfig;

pub fn sample_students() -> Vec<Student> {
    vec![
        Student {
            name: "Avellaneda".to_string(),
            attendance_pct: 82.5,
            final_grade: 78.0,
            username_ok: true,
            password_ok: true,
            is_locked: false,
            participated: true,
            base_score: 88.0,
            id_valid: true,
            has_overdue: false,
        },
        Student {
            name: "Capili".to_string(),
            attendance_pct: 70.0,
            final_grade: 72.0,
            username_ok: true,
            password_ok: false,
            is_locked: false,
            participated: false,
            base_score: 65.0,
            id_valid: true,
            has_overdue: true,
        },
        Student {
            name: "Ramos".to_string(),
            attendance_pct: 95.0,
            final_grade: 92.0,
            username_ok: true,
            password_ok: true,
            is_locked: true,
            participated: true,
            base_score: 96.0,
            id_valid: false,
            has_overdue: false,
        },
    ]
}

/// Clears the log before a demonstration run. A log that cannot be removed
/// is reported and the run goes on appending to it.
pub fn start_clean(log: &CsvLog) -> bool {
    match log.reset() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                path = %log.path().display(),
                error = %e,
                "failed to clear previous results log"
            );
            false
        }
    }
}

/// Evaluates, logs and prints each student in turn. Logging failures are
/// reported by the log and do not stop the batch.
pub fn run_batch(students: &[Student], config: &RuleConfig, log: Option<&CsvLog>) -> Vec<(String, Evaluation)> {
    let mut evaluated = Vec::with_capacity(students.len());

    for student in students {
        let evaluation = evaluator::evaluate(student, config);
        if let Some(log) = log {
            log.record(&student.name, &evaluation);
        }

        println!();
        print!("{}", report::render_evaluation(&student.name, &evaluation));
        evaluated.push((student.name.clone(), evaluation));
    }

    evaluated
}
