use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

mod config;
mod demo;
mod error;
mod evaluator;
mod models;
mod report;
mod results_log;
mod rules;
mod telemetry;

use models::Student;
use results_log::CsvLog;
use rules::RuleConfig;

#[derive(Parser)]
#[command(name = "student-rules")]
#[command(about = "Evaluate student eligibility rules and log every outcome to CSV", long_about = None)]
struct Cli {
    /// Results log location (defaults to ~/Downloads/logic_results.csv)
    #[arg(long, global = true)]
    log_path: Option<PathBuf>,
    /// Emit diagnostics as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
    #[command(flatten)]
    thresholds: ThresholdArgs,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ThresholdArgs {
    #[arg(long, global = true, default_value_t = 75.0)]
    attendance_threshold: f64,
    #[arg(long, global = true, default_value_t = 75.0)]
    passing_grade: f64,
    #[arg(long, global = true, default_value_t = 5.0)]
    bonus_points: f64,
    #[arg(long, global = true, default_value_t = 100.0)]
    max_score: f64,
}

impl From<&ThresholdArgs> for RuleConfig {
    fn from(args: &ThresholdArgs) -> Self {
        RuleConfig {
            attendance_threshold: args.attendance_threshold,
            passing_grade: args.passing_grade,
            bonus_points: args.bonus_points,
            max_score: args.max_score,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in sample students (the default)
    Demo {
        /// Append to the existing log instead of starting clean
        #[arg(long)]
        keep_log: bool,
    },
    /// Evaluate a single student
    Evaluate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        attendance: f64,
        #[arg(long)]
        grade: f64,
        #[arg(long)]
        username_ok: bool,
        #[arg(long)]
        password_ok: bool,
        #[arg(long)]
        locked: bool,
        #[arg(long)]
        participated: bool,
        #[arg(long)]
        base_score: f64,
        #[arg(long)]
        id_valid: bool,
        #[arg(long)]
        overdue: bool,
        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,
        /// Skip writing to the results log
        #[arg(long)]
        no_log: bool,
    },
    /// Evaluate every student in a roster CSV
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show evaluations already in the results log
    History,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.json_logs);

    let log = CsvLog::new(cli.log_path.clone().unwrap_or_else(config::default_log_path));
    let rule_config = RuleConfig::from(&cli.thresholds);

    match cli.command.unwrap_or(Commands::Demo { keep_log: false }) {
        Commands::Demo { keep_log } => {
            if !keep_log {
                demo::start_clean(&log);
            }

            println!("=== Mini Expert System — Demo Run ===");
            println!("CSV output: {}", log.path().display());
            let evaluated = demo::run_batch(&demo::sample_students(), &rule_config, Some(&log));

            println!();
            print!("{}", report::render_summary(&evaluated));
            println!();
            println!("Results logged to: {}", log.path().display());
        }
        Commands::Evaluate {
            name,
            attendance,
            grade,
            username_ok,
            password_ok,
            locked,
            participated,
            base_score,
            id_valid,
            overdue,
            json,
            no_log,
        } => {
            let student = Student {
                name,
                attendance_pct: attendance,
                final_grade: grade,
                username_ok,
                password_ok,
                is_locked: locked,
                participated,
                base_score,
                id_valid,
                has_overdue: overdue,
            };
            let evaluation = evaluator::evaluate(&student, &rule_config);

            if !no_log {
                log.record(&student.name, &evaluation);
            }

            if json {
                let rendered = serde_json::to_string_pretty(&evaluation)
                    .context("failed to serialize evaluation")?;
                println!("{rendered}");
            } else {
                print!("{}", report::render_evaluation(&student.name, &evaluation));
            }
        }
        Commands::Import { csv } => {
            let students = read_roster(&csv)?;
            if students.is_empty() {
                println!("No students found in {}.", csv.display());
                return Ok(());
            }

            let evaluated = demo::run_batch(&students, &rule_config, Some(&log));
            println!();
            print!("{}", report::render_summary(&evaluated));
            println!("Logged {} students to {}.", evaluated.len(), log.path().display());
        }
        Commands::History => {
            if !log.path().exists() {
                println!("No results log at {}.", log.path().display());
                return Ok(());
            }
            let rows = log
                .read_rows()
                .with_context(|| format!("failed to read {}", log.path().display()))?;
            print!("{}", report::render_history(&rows));
        }
    }

    Ok(())
}

fn read_roster(path: &std::path::Path) -> anyhow::Result<Vec<Student>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open roster {}", path.display()))?;
    let mut students = Vec::new();

    for (index, result) in reader.deserialize::<Student>().enumerate() {
        match result {
            Ok(student) if student.name.trim().is_empty() => {
                tracing::warn!(row = index + 1, error = "empty student name", "skipping unreadable roster row");
            }
            Ok(student) => students.push(student),
            Err(e) => tracing::warn!(row = index + 1, error = %e, "skipping unreadable roster row"),
        }
    }

    Ok(students)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn roster_rows_are_parsed_and_bad_rows_skipped() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("roster.csv");
        fs::write(
            &path,
            "name,attendance_pct,final_grade,username_ok,password_ok,is_locked,participated,base_score,id_valid,has_overdue\n\
             Avery,80.0,77.5,true,true,false,true,90.0,true,false\n\
             Broken,not-a-number,70.0,true,true,false,false,60.0,true,false\n\
             Jules,60.0,50.0,false,true,false,false,40.0,true,true\n\
             ,90.0,90.0,true,true,false,true,90.0,true,false\n\
             \x20 ,90.0,90.0,true,true,false,true,90.0,true,false\n",
        )
        .expect("write roster");

        let students = read_roster(&path).expect("read roster");
        let names: Vec<&str> = students.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Avery", "Jules"]);
        assert_eq!(students[0].final_grade, 77.5);
        assert!(students[1].has_overdue);
    }

    #[test]
    fn cli_defaults_to_standard_thresholds() {
        let cli = Cli::parse_from(["student-rules"]);
        assert!(cli.command.is_none());
        assert_eq!(RuleConfig::from(&cli.thresholds), RuleConfig::default());
    }

    #[test]
    fn cli_parses_evaluate_flags() {
        let cli = Cli::parse_from([
            "student-rules",
            "evaluate",
            "--name",
            "Avery",
            "--attendance",
            "82.5",
            "--grade",
            "78",
            "--username-ok",
            "--password-ok",
            "--base-score",
            "88",
            "--no-log",
        ]);
        match cli.command {
            Some(Commands::Evaluate {
                name,
                attendance,
                username_ok,
                locked,
                no_log,
                ..
            }) => {
                assert_eq!(name, "Avery");
                assert_eq!(attendance, 82.5);
                assert!(username_ok);
                assert!(!locked);
                assert!(no_log);
            }
            _ => panic!("expected evaluate command"),
        }
    }
}
