use crate::models::{RuleId, RuleOutcome, Student};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleConfig {
    pub attendance_threshold: f64,
    pub passing_grade: f64,
    pub bonus_points: f64,
    pub max_score: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            attendance_threshold: 75.0,
            passing_grade: 75.0,
            bonus_points: 5.0,
            max_score: 100.0,
        }
    }
}

pub type RuleFn = fn(&RuleConfig, &Student) -> RuleOutcome;

fn in_percent_range(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

pub fn attendance(config: &RuleConfig, attendance_pct: f64) -> RuleOutcome {
    if !in_percent_range(attendance_pct) {
        return RuleOutcome::new(false, format!("Invalid attendance: {attendance_pct:?}%"));
    }

    let ok = attendance_pct >= config.attendance_threshold;
    RuleOutcome::new(
        ok,
        format!(
            "attendance={:.1}% -> {}",
            attendance_pct,
            if ok { "eligible" } else { "not eligible" }
        ),
    )
}

pub fn grading(config: &RuleConfig, final_grade: f64) -> RuleOutcome {
    if !in_percent_range(final_grade) {
        return RuleOutcome::new(false, format!("Invalid grade: {final_grade:?}"));
    }

    let ok = final_grade >= config.passing_grade;
    RuleOutcome::new(
        ok,
        format!("grade={:.1} -> {}", final_grade, if ok { "pass" } else { "fail" }),
    )
}

pub fn login_system(username_ok: bool, password_ok: bool, is_locked: bool) -> RuleOutcome {
    let ok = username_ok && password_ok && !is_locked;
    RuleOutcome::new(
        ok,
        format!(
            "user_ok={}, pass_ok={}, locked={} -> {}",
            username_ok,
            password_ok,
            is_locked,
            if ok { "login success" } else { "login denied" }
        ),
    )
}

pub fn bonus_points(config: &RuleConfig, participated: bool, base_score: f64) -> RuleOutcome {
    if !in_percent_range(base_score) {
        return RuleOutcome::new(false, format!("Invalid base score: {base_score:?}"));
    }

    if participated {
        let final_score = (base_score + config.bonus_points).min(config.max_score);
        RuleOutcome::new(
            true,
            format!(
                "participated=true, base={:?} -> bonus +{:?}, final={:?}",
                base_score, config.bonus_points, final_score
            ),
        )
    } else {
        RuleOutcome::new(
            false,
            format!(
                "participated=false, base={:?} -> no bonus, final={:?}",
                base_score, base_score
            ),
        )
    }
}

pub fn library_borrowing(id_valid: bool, has_overdue: bool) -> RuleOutcome {
    let ok = id_valid && !has_overdue;
    RuleOutcome::new(
        ok,
        format!(
            "id_valid={}, overdue={} -> {}",
            id_valid,
            has_overdue,
            if ok { "allowed" } else { "not allowed" }
        ),
    )
}

fn attendance_of(config: &RuleConfig, student: &Student) -> RuleOutcome {
    attendance(config, student.attendance_pct)
}

fn grading_of(config: &RuleConfig, student: &Student) -> RuleOutcome {
    grading(config, student.final_grade)
}

fn login_of(_: &RuleConfig, student: &Student) -> RuleOutcome {
    login_system(student.username_ok, student.password_ok, student.is_locked)
}

fn bonus_of(config: &RuleConfig, student: &Student) -> RuleOutcome {
    bonus_points(config, student.participated, student.base_score)
}

fn library_of(_: &RuleConfig, student: &Student) -> RuleOutcome {
    library_borrowing(student.id_valid, student.has_overdue)
}

/// Adapters from a full record to each rule, in evaluation order.
pub fn standard_rules() -> [(RuleId, RuleFn); 5] {
    [
        (RuleId::Attendance, attendance_of as RuleFn),
        (RuleId::Grading, grading_of),
        (RuleId::LoginSystem, login_of),
        (RuleId::BonusPoints, bonus_of),
        (RuleId::LibraryBorrowing, library_of),
    ]
}
