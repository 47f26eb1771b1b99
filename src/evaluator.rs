use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use crate::models::{Evaluation, RuleId, Student};
use crate::rules::{self, RuleConfig, RuleFn};

thread_local! {
    static IN_RULE: Cell<bool> = const { Cell::new(false) };
}

static QUIET_RULE_PANICS: Once = Once::new();

/// Wraps the current panic hook so panics raised inside a rule are reported
/// only through the evaluator's diagnostic. Other panics reach the old hook.
fn install_panic_hook() {
    QUIET_RULE_PANICS.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !IN_RULE.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

pub fn evaluate(student: &Student, config: &RuleConfig) -> Evaluation {
    evaluate_with(student, config, &rules::standard_rules())
}

/// Runs `rules` in order. A rule that panics ends the evaluation: the fault is
/// reported and the outcomes gathered so far are returned.
pub fn evaluate_with(student: &Student, config: &RuleConfig, rules: &[(RuleId, RuleFn)]) -> Evaluation {
    install_panic_hook();
    let mut evaluation = Evaluation::default();

    for (rule, check) in rules {
        IN_RULE.with(|flag| flag.set(true));
        let result = panic::catch_unwind(AssertUnwindSafe(|| check(config, student)));
        IN_RULE.with(|flag| flag.set(false));

        match result {
            Ok(outcome) => evaluation.push(*rule, outcome),
            Err(payload) => {
                tracing::error!(
                    student = %student.name,
                    rule = %rule,
                    error = %panic_message(payload.as_ref()),
                    "error evaluating student"
                );
                break;
            }
        }
    }

    tracing::debug!(
        student = %student.name,
        evaluated = evaluation.len(),
        complete = evaluation.is_complete(),
        passed = evaluation.passed_count(),
        "student evaluated"
    );
    evaluation
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown fault".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use crate::models::RuleOutcome;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    fn student(name: &str) -> Student {
        demo::sample_students()
            .into_iter()
            .find(|s| s.name == name)
            .expect("sample student")
    }

    #[test]
    fn first_sample_passes_every_rule() {
        let evaluation = evaluate(&student("Avellaneda"), &RuleConfig::default());
        assert!(evaluation.is_complete());
        assert_eq!(evaluation.passed_count(), 5);
    }

    #[test]
    fn second_sample_fails_every_rule() {
        let evaluation = evaluate(&student("Capili"), &RuleConfig::default());
        assert!(evaluation.is_complete());
        assert_eq!(evaluation.passed_count(), 0);
    }

    #[test]
    fn rules_run_in_fixed_order() {
        let evaluation = evaluate(&student("Ramos"), &RuleConfig::default());
        let order: Vec<RuleId> = evaluation.iter().map(|(rule, _)| *rule).collect();
        assert_eq!(order, RuleId::ALL.to_vec());

        let bonus = evaluation.get(RuleId::BonusPoints).expect("bonus outcome");
        assert!(bonus.detail.ends_with("final=100.0"));
        assert!(!evaluation.get(RuleId::LoginSystem).expect("login").passed);
    }

    #[test]
    fn invalid_input_is_an_ordinary_outcome() {
        let mut record = student("Avellaneda");
        record.attendance_pct = 140.0;
        record.base_score = -3.0;

        let evaluation = evaluate(&record, &RuleConfig::default());
        assert!(evaluation.is_complete());
        let attendance = evaluation.get(RuleId::Attendance).expect("attendance");
        assert!(!attendance.passed);
        assert!(attendance.detail.starts_with("Invalid attendance"));
        assert!(!evaluation.get(RuleId::BonusPoints).expect("bonus").passed);
    }

    fn ok(_: &RuleConfig, _: &Student) -> RuleOutcome {
        RuleOutcome::new(true, "fine")
    }

    fn boom(_: &RuleConfig, _: &Student) -> RuleOutcome {
        panic!("rule blew up")
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("capture lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn fault_diagnostic_names_student_and_rule() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let table: [(RuleId, RuleFn); 2] = [(RuleId::Attendance, ok), (RuleId::Grading, boom)];
        let evaluation = tracing::subscriber::with_default(subscriber, || {
            evaluate_with(&student("Ramos"), &RuleConfig::default(), &table)
        });
        assert_eq!(evaluation.len(), 1);

        let output = String::from_utf8(captured.0.lock().expect("capture lock").clone()).expect("utf8");
        assert!(output.contains("error evaluating student"));
        assert!(output.contains("student=Ramos"));
        assert!(output.contains("rule=GradingRule"));
        assert!(output.contains("rule blew up"));
    }

    #[test]
    fn panics_outside_rules_still_unwind_normally() {
        install_panic_hook();
        let result = panic::catch_unwind(|| panic!("outside a rule"));
        assert!(result.is_err());
        assert!(!IN_RULE.with(Cell::get));
    }

    #[test]
    fn fault_returns_partial_evaluation() {

        let table: [(RuleId, RuleFn); 3] = [
            (RuleId::Attendance, ok),
            (RuleId::Grading, boom),
            (RuleId::LoginSystem, ok),
        ];
        let evaluation = evaluate_with(&student("Capili"), &RuleConfig::default(), &table);

        assert_eq!(evaluation.len(), 1);
        assert!(evaluation.get(RuleId::Attendance).is_some());
        assert!(evaluation.get(RuleId::Grading).is_none());
        assert!(evaluation.get(RuleId::LoginSystem).is_none());
    }
}
