//! The `tessbot run` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use tessbot_core::model::Topic;
use tessbot_core::report::{Answer, QuestionRecord, RunReport, RunSummary, TopicOutcome};
use tessbot_core::traversal::{ProgressReporter, Traversal, TraversalConfig};
use tessbot_core::QuizApi;
use tessbot_report::{report_file_name, text_report_path, write_text_report};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_unit_start(&self, unit_id: u64) {
        eprintln!("Unit {unit_id}");
    }

    fn on_topic_start(&self, topic: &Topic) {
        eprintln!("  Attempting quiz {} ({})...", topic.id, topic.name);
    }

    fn on_topic_skipped(&self, topic: &Topic) {
        eprintln!("  Quiz with ID {} is already done!", topic.id);
    }

    fn on_topic_complete(&self, topic: &Topic, score: i64, questions: usize) {
        eprintln!("  Done: {} score {score}/{questions}", topic.name);
    }

    fn on_topic_failed(&self, topic: &Topic, error: &str) {
        eprintln!("  ERROR: topic {}: {error}", topic.id);
    }

    fn on_question(&self, _topic: &Topic, record: &QuestionRecord) {
        let answer = match &record.answer {
            Answer::Correct(key) => key.to_string(),
            Answer::NotFound => "not found".to_string(),
            Answer::Failed(e) => format!("failed ({e})"),
        };
        eprintln!("    Question {}: {answer}", record.question_id);
    }

    fn on_run_complete(&self, summary: &RunSummary, elapsed: Duration) {
        eprintln!(
            "\nComplete: {} completed, {} skipped, {} failed ({:.1}s)",
            summary.completed,
            summary.skipped,
            summary.failed,
            elapsed.as_secs_f64()
        );
    }
}

fn parse_formats(format: &str) -> Result<Vec<&str>> {
    let formats: Vec<&str> = if format == "all" {
        vec!["text", "json"]
    } else {
        format.split(',').map(str::trim).collect()
    };
    for fmt in &formats {
        anyhow::ensure!(
            matches!(*fmt, "text" | "json"),
            "unknown format: '{fmt}' (expected text, json or all)"
        );
    }
    Ok(formats)
}

pub async fn execute(
    unit_ids: Vec<u64>,
    subject: Option<u64>,
    token: Option<String>,
    parallelism: Option<usize>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    // Validate inputs
    anyhow::ensure!(
        !unit_ids.is_empty() || subject.is_some(),
        "no units given: pass unit ids or --subject"
    );
    if let Some(p) = parallelism {
        anyhow::ensure!(p >= 1, "parallelism must be at least 1");
    }
    let formats = parse_formats(&format)?;

    let (config, client) = super::connect(token, config_path.as_deref())?;
    let api: Arc<dyn QuizApi> = Arc::new(client);
    let traversal = Traversal::new(
        api,
        TraversalConfig {
            parallelism: parallelism.unwrap_or(config.parallelism),
        },
    );

    let unit_ids = match subject {
        Some(subject_id) => {
            let units = traversal.resolve_units(subject_id).await?;
            anyhow::ensure!(!units.is_empty(), "subject {subject_id} has no units");
            units.into_iter().map(|u| u.id).collect()
        }
        None => unit_ids,
    };

    eprintln!(
        "tessbot v{}: processing {} unit(s)",
        env!("CARGO_PKG_VERSION"),
        unit_ids.len()
    );
    eprintln!();

    let report = traversal.run(&unit_ids, &ConsoleReporter).await?;

    print_summary(&report);

    // Save outputs
    let output = output.unwrap_or(config.output_dir);
    std::fs::create_dir_all(&output)?;
    for fmt in &formats {
        match *fmt {
            "text" => {
                let path = text_report_path(&report, &output);
                write_text_report(&report, &path)?;
                eprintln!("Report saved to: {}", path.display());
            }
            "json" => {
                let path = output.join(report_file_name(report.created_at, "json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            other => anyhow::bail!("unknown format: {other}"),
        }
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Unit", "Topic", "Status", "Score", "Answered", "Not found"]);

    for unit in &report.units {
        if let Some(error) = &unit.error {
            table.add_row(vec![
                Cell::new(unit.unit_id),
                Cell::new("-"),
                Cell::new(format!("failed: {error}")),
                Cell::new(""),
                Cell::new(""),
                Cell::new(""),
            ]);
        }
        for topic in &unit.topics {
            let (score, answered, not_found) = match &topic.outcome {
                TopicOutcome::Completed { transcript } => {
                    let answered = transcript
                        .questions
                        .iter()
                        .filter(|q| matches!(q.answer, Answer::Correct(_)))
                        .count();
                    (
                        transcript.final_score.to_string(),
                        answered.to_string(),
                        (transcript.questions.len() - answered).to_string(),
                    )
                }
                _ => (String::new(), String::new(), String::new()),
            };
            table.add_row(vec![
                Cell::new(unit.unit_id),
                Cell::new(&topic.topic_name),
                Cell::new(topic.outcome.label()),
                Cell::new(score),
                Cell::new(answered),
                Cell::new(not_found),
            ]);
        }
    }

    eprintln!("\n{table}");
}
