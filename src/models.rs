use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Student {
    pub name: String,
    pub attendance_pct: f64,
    pub final_grade: f64,
    pub username_ok: bool,
    pub password_ok: bool,
    pub is_locked: bool,
    pub participated: bool,
    pub base_score: f64,
    pub id_valid: bool,
    pub has_overdue: bool,
}

/// The five rules, in evaluation and log-column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    Attendance,
    Grading,
    LoginSystem,
    BonusPoints,
    LibraryBorrowing,
}

impl RuleId {
    pub const ALL: [RuleId; 5] = [
        RuleId::Attendance,
        RuleId::Grading,
        RuleId::LoginSystem,
        RuleId::BonusPoints,
        RuleId::LibraryBorrowing,
    ];

    pub fn column(self) -> &'static str {
        match self {
            RuleId::Attendance => "AttendanceRule",
            RuleId::Grading => "GradingRule",
            RuleId::LoginSystem => "LoginSystemRule",
            RuleId::BonusPoints => "BonusPointsRule",
            RuleId::LibraryBorrowing => "LibraryBorrowingRule",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOutcome {
    pub passed: bool,
    pub detail: String,
}

impl RuleOutcome {
    pub fn new(passed: bool, detail: impl Into<String>) -> Self {
        Self {
            passed,
            detail: detail.into(),
        }
    }
}

/// Outcomes for one student, kept in the order the rules ran.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    outcomes: Vec<(RuleId, RuleOutcome)>,
}

impl Evaluation {
    pub fn push(&mut self, rule: RuleId, outcome: RuleOutcome) {
        self.outcomes.push((rule, outcome));
    }

    pub fn get(&self, rule: RuleId) -> Option<&RuleOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == rule)
            .map(|(_, outcome)| outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(RuleId, RuleOutcome)> {
        self.outcomes.iter()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        RuleId::ALL.iter().all(|rule| self.get(*rule).is_some())
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.passed).count()
    }
}

/// Serializes as a map from rule column name to outcome, in evaluation order.
impl Serialize for Evaluation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.outcomes.len()))?;
        for (rule, outcome) in &self.outcomes {
            map.serialize_entry(rule.column(), outcome)?;
        }
        map.end()
    }
}

/// One persisted line of the results log. Rule columns stay optional so a
/// partial evaluation still fills every header column.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LogRow {
    pub timestamp: String,
    pub student: String,
    #[serde(rename = "AttendanceRule")]
    pub attendance: Option<bool>,
    #[serde(rename = "AttendanceDetail")]
    pub attendance_detail: Option<String>,
    #[serde(rename = "GradingRule")]
    pub grading: Option<bool>,
    #[serde(rename = "GradingDetail")]
    pub grading_detail: Option<String>,
    #[serde(rename = "LoginSystemRule")]
    pub login: Option<bool>,
    #[serde(rename = "LoginDetail")]
    pub login_detail: Option<String>,
    #[serde(rename = "BonusPointsRule")]
    pub bonus: Option<bool>,
    #[serde(rename = "BonusDetail")]
    pub bonus_detail: Option<String>,
    #[serde(rename = "LibraryBorrowingRule")]
    pub library: Option<bool>,
    #[serde(rename = "LibraryDetail")]
    pub library_detail: Option<String>,
}

impl LogRow {
    pub fn from_evaluation(timestamp: String, student: &str, evaluation: &Evaluation) -> Self {
        let passed = |rule| evaluation.get(rule).map(|o| o.passed);
        let detail = |rule| evaluation.get(rule).map(|o| o.detail.clone());

        LogRow {
            timestamp,
            student: student.to_string(),
            attendance: passed(RuleId::Attendance),
            attendance_detail: detail(RuleId::Attendance),
            grading: passed(RuleId::Grading),
            grading_detail: detail(RuleId::Grading),
            login: passed(RuleId::LoginSystem),
            login_detail: detail(RuleId::LoginSystem),
            bonus: passed(RuleId::BonusPoints),
            bonus_detail: detail(RuleId::BonusPoints),
            library: passed(RuleId::LibraryBorrowing),
            library_detail: detail(RuleId::LibraryBorrowing),
        }
    }

    pub fn outcomes(&self) -> [Option<bool>; 5] {
        [
            self.attendance,
            self.grading,
            self.login,
            self.bonus,
            self.library,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct RuleSummary {
    pub rule: RuleId,
    pub passed: usize,
    pub failed: usize,
    pub missing: usize,
}
