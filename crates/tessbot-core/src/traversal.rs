//! Traversal aggregator.
//!
//! Walks units → topics, skips topics whose quiz is already badged, runs the
//! quiz runner on the rest and collects a [`RunReport`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{Topic, Unit};
use crate::report::{QuestionRecord, RunReport, RunSummary, TopicOutcome, TopicReport, UnitReport};
use crate::runner::QuizRunner;
use crate::traits::QuizApi;

/// Configuration for a traversal.
#[derive(Debug, Clone)]
pub struct TraversalConfig {
    /// Maximum topics of one unit processed concurrently.
    pub parallelism: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self { parallelism: 1 }
    }
}

/// A fatal API error stopped the run.
#[derive(Debug, Error)]
#[error("run aborted at {location}")]
pub struct RunAborted {
    /// Where the run stopped, e.g. "unit 7" or "topic 42".
    pub location: String,
    #[source]
    pub source: ApiError,
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_unit_start(&self, unit_id: u64);
    /// Called once the badge check shows the quiz still needs attempting.
    fn on_topic_start(&self, topic: &Topic);
    fn on_topic_skipped(&self, topic: &Topic);
    fn on_topic_complete(&self, topic: &Topic, score: i64, questions: usize);
    fn on_topic_failed(&self, topic: &Topic, error: &str);
    fn on_question(&self, topic: &Topic, record: &QuestionRecord);
    fn on_run_complete(&self, summary: &RunSummary, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_unit_start(&self, _: u64) {}
    fn on_topic_start(&self, _: &Topic) {}
    fn on_topic_skipped(&self, _: &Topic) {}
    fn on_topic_complete(&self, _: &Topic, _: i64, _: usize) {}
    fn on_topic_failed(&self, _: &Topic, _: &str) {}
    fn on_question(&self, _: &Topic, _: &QuestionRecord) {}
    fn on_run_complete(&self, _: &RunSummary, _: Duration) {}
}

/// The session: an API handle plus traversal settings, passed explicitly to
/// every step of a run.
pub struct Traversal {
    api: Arc<dyn QuizApi>,
    config: TraversalConfig,
}

impl Traversal {
    pub fn new(api: Arc<dyn QuizApi>, config: TraversalConfig) -> Self {
        Self { api, config }
    }

    /// List the units of a subject, for subject-wide runs.
    pub async fn resolve_units(&self, subject_id: u64) -> Result<Vec<Unit>, ApiError> {
        let units = self.api.subject_units(subject_id).await?;
        info!(subject_id, count = units.len(), "units fetched");
        Ok(units)
    }

    /// Process the given units in order.
    ///
    /// Only `Auth` and `Protocol` errors abort; anything else is recorded on
    /// the unit or topic it happened in and the run moves on.
    pub async fn run(
        &self,
        unit_ids: &[u64],
        progress: &dyn ProgressReporter,
    ) -> Result<RunReport, RunAborted> {
        let start = Instant::now();
        let mut units = Vec::with_capacity(unit_ids.len());

        for &unit_id in unit_ids {
            progress.on_unit_start(unit_id);

            let topics = match self.api.unit_topics(unit_id).await {
                Ok(topics) => topics,
                Err(e) if e.is_fatal() => {
                    return Err(RunAborted {
                        location: format!("unit {unit_id}"),
                        source: e,
                    })
                }
                Err(e) => {
                    error!("listing topics of unit {unit_id} failed: {e}");
                    units.push(UnitReport {
                        unit_id,
                        topics: Vec::new(),
                        error: Some(e.to_string()),
                    });
                    continue;
                }
            };

            let quiz_topics: Vec<Topic> = topics
                .into_iter()
                .filter(|t| {
                    if !t.has_quiz {
                        debug!(topic_id = t.id, "topic has no quiz, ignoring");
                    }
                    t.has_quiz
                })
                .collect();
            info!(unit_id, topics = quiz_topics.len(), "unit topics fetched");

            let topics = self.run_topics(&quiz_topics, progress).await?;
            units.push(UnitReport {
                unit_id,
                topics,
                error: None,
            });
        }

        let elapsed = start.elapsed();
        let summary = RunSummary::from_units(&units);
        progress.on_run_complete(&summary, elapsed);

        Ok(RunReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            units,
            summary,
            duration_ms: elapsed.as_millis() as u64,
        })
    }

    /// Run up to `parallelism` topics at once. `buffered` yields in input
    /// order, so the report keeps the listing order of the unit.
    async fn run_topics(
        &self,
        topics: &[Topic],
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<TopicReport>, RunAborted> {
        let parallelism = self.config.parallelism.max(1);
        let mut results = stream::iter(topics.iter().map(|topic| self.run_topic(topic, progress)))
            .buffered(parallelism);

        let mut reports = Vec::with_capacity(topics.len());
        while let Some(result) = results.next().await {
            reports.push(result?);
        }
        Ok(reports)
    }

    /// One topic: `PENDING → SKIPPED | RUNNING → COMPLETED | FAILED`.
    async fn run_topic(
        &self,
        topic: &Topic,
        progress: &dyn ProgressReporter,
    ) -> Result<TopicReport, RunAborted> {
        let outcome = match self.attempt_topic(topic, progress).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_fatal() => {
                error!(topic_id = topic.id, "fatal error: {e}");
                return Err(RunAborted {
                    location: format!("topic {}", topic.id),
                    source: e,
                });
            }
            Err(e) => {
                warn!(topic_id = topic.id, "topic failed: {e}");
                progress.on_topic_failed(topic, &e.to_string());
                TopicOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        Ok(TopicReport {
            topic_id: topic.id,
            topic_name: topic.name.clone(),
            outcome,
        })
    }

    async fn attempt_topic(
        &self,
        topic: &Topic,
        progress: &dyn ProgressReporter,
    ) -> Result<TopicOutcome, ApiError> {
        if self.api.quiz_completed(topic.id).await? {
            info!(topic_id = topic.id, "quiz already done, skipping");
            progress.on_topic_skipped(topic);
            return Ok(TopicOutcome::Skipped);
        }
        progress.on_topic_start(topic);

        let quiz = self.api.create_quiz(topic.id).await?;
        info!(
            topic_id = topic.id,
            quiz_id = quiz.id,
            questions = quiz.questions.len(),
            "attempting quiz"
        );

        let transcript = QuizRunner::new(self.api.as_ref())
            .run(topic, &quiz, progress)
            .await?;
        progress.on_topic_complete(topic, transcript.final_score, transcript.questions.len());
        Ok(TopicOutcome::Completed { transcript })
    }
}
