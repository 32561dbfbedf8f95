//! Plain-text transcript report.
//!
//! The layout matches the `.txt` download users already know: one block per
//! quiz, one paragraph per question.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use tessbot_core::report::{Answer, QuizTranscript, RunReport, TopicOutcome, TopicReport};

/// File name for a report created at `created_at`, e.g.
/// `quiz_results_1700000000.txt`.
pub fn report_file_name(created_at: DateTime<Utc>, extension: &str) -> String {
    format!("quiz_results_{}.{extension}", created_at.timestamp())
}

/// Path of the text report inside `dir`.
pub fn text_report_path(report: &RunReport, dir: &Path) -> PathBuf {
    dir.join(report_file_name(report.created_at, "txt"))
}

fn answer_line(answer: &Answer) -> String {
    match answer {
        Answer::Correct(key) => key.to_string(),
        Answer::NotFound => "Not found".to_string(),
        Answer::Failed(err) => format!("Not found (failed: {err})"),
    }
}

fn render_transcript(out: &mut String, topic_name: &str, transcript: &QuizTranscript) {
    let _ = write!(out, "Quiz: {topic_name}\n\n");
    for question in &transcript.questions {
        let _ = writeln!(out, "Question ID: {}", question.question_id);
        let _ = writeln!(out, "Question: {}", question.text);
        out.push_str("Options:\n");
        for (key, text) in &question.options {
            let _ = writeln!(out, "{key}: {text}");
        }
        let _ = write!(out, "Correct Option: {}\n\n", answer_line(&question.answer));
    }
    let _ = write!(out, "Final Score: {}\n\n", transcript.final_score);
}

fn render_topic(out: &mut String, topic: &TopicReport) {
    match &topic.outcome {
        TopicOutcome::Skipped => {
            let _ = write!(out, "Quiz with ID {} is already done!\n\n", topic.topic_id);
        }
        TopicOutcome::Completed { transcript } => {
            render_transcript(out, &topic.topic_name, transcript);
        }
        TopicOutcome::Failed { error } => {
            let _ = write!(out, "Quiz with ID {} failed: {error}\n\n", topic.topic_id);
        }
    }
}

/// Render the whole run as one text document, units and topics in order.
pub fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    for unit in &report.units {
        if let Some(error) = &unit.error {
            let _ = write!(out, "Unit {} failed: {error}\n\n", unit.unit_id);
        }
        for topic in &unit.topics {
            render_topic(&mut out, topic);
        }
    }
    out
}

/// Write the text report to `path`, creating parent directories.
pub fn write_text_report(report: &RunReport, path: &Path) -> Result<()> {
    let text = render_text(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}
