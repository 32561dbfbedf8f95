//! Run report types with JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{OptionKey, Score};

/// What the oracle concluded for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Correct(OptionKey),
    NotFound,
    /// Probing was cut short by a non-fatal API error.
    Failed(String),
}

/// One question of a quiz transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question_id: u64,
    pub text: String,
    pub options: BTreeMap<OptionKey, String>,
    pub answer: Answer,
}

/// The ordered record of one quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizTranscript {
    pub quiz_id: u64,
    pub questions: Vec<QuestionRecord>,
    /// Running score after the last question.
    pub final_score: Score,
}

/// Terminal state of one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TopicOutcome {
    /// The quiz already carried a completion badge.
    Skipped,
    Completed { transcript: QuizTranscript },
    Failed { error: String },
}

impl TopicOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            TopicOutcome::Skipped => "skipped",
            TopicOutcome::Completed { .. } => "completed",
            TopicOutcome::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicReport {
    pub topic_id: u64,
    pub topic_name: String,
    pub outcome: TopicOutcome,
}

/// All quiz-bearing topics of one unit, in listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReport {
    pub unit_id: u64,
    #[serde(default)]
    pub topics: Vec<TopicReport>,
    /// Set when the unit's topics could not be listed.
    #[serde(default)]
    pub error: Option<String>,
}

/// Outcome counts across a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub skipped: usize,
    pub completed: usize,
    pub failed: usize,
    pub units_failed: usize,
    pub questions_answered: usize,
    pub questions_not_found: usize,
    pub questions_failed: usize,
}

impl RunSummary {
    pub fn from_units(units: &[UnitReport]) -> Self {
        let mut summary = RunSummary::default();
        for unit in units {
            if unit.error.is_some() {
                summary.units_failed += 1;
            }
            for topic in &unit.topics {
                match &topic.outcome {
                    TopicOutcome::Skipped => summary.skipped += 1,
                    TopicOutcome::Failed { .. } => summary.failed += 1,
                    TopicOutcome::Completed { transcript } => {
                        summary.completed += 1;
                        for q in &transcript.questions {
                            match q.answer {
                                Answer::Correct(_) => summary.questions_answered += 1,
                                Answer::NotFound => summary.questions_not_found += 1,
                                Answer::Failed(_) => summary.questions_failed += 1,
                            }
                        }
                    }
                }
            }
        }
        summary
    }

    pub fn total_topics(&self) -> usize {
        self.skipped + self.completed + self.failed
    }
}

/// A complete run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub units: Vec<UnitReport>,
    pub summary: RunSummary,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl RunReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: RunReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
