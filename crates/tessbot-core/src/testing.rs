//! In-crate scripted API for the oracle, runner and traversal tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{Attempt, OptionKey, Question, Quiz, Score, Topic, Unit};
use crate::traits::QuizApi;

/// A question offering all four options.
pub(crate) fn question(id: u64) -> Question {
    let options: BTreeMap<OptionKey, String> = OptionKey::ALL
        .iter()
        .map(|k| (*k, format!("option {k}")))
        .collect();
    Question {
        id,
        text: format!("question {id}"),
        options,
    }
}

#[derive(Default)]
struct State {
    scores: HashMap<u64, Score>,
    solved: HashSet<u64>,
    doubled: HashSet<u64>,
    submissions: Vec<Attempt>,
    score_failures: HashMap<u64, ApiError>,
    score_after_failure: Option<Score>,
    topic_failures: HashMap<u64, ApiError>,
    create_failures: HashMap<u64, ApiError>,
    score_reads: u32,
    create_calls: Vec<u64>,
}

/// Simulated server: the score of a quiz rises by one the first time the
/// correct option of a question is submitted.
pub(crate) struct ScriptedApi {
    units: Vec<(u64, Vec<Topic>)>,
    completed: HashSet<u64>,
    quizzes: HashMap<u64, Quiz>,
    correct: HashMap<u64, OptionKey>,
    state: Mutex<State>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self {
            units: Vec::new(),
            completed: HashSet::new(),
            quizzes: HashMap::new(),
            correct: HashMap::new(),
            state: Mutex::new(State::default()),
        }
    }

    /// Unit 1 with a single quiz-bearing topic 100 whose quiz id is 900.
    pub(crate) fn single_quiz(questions: Vec<(Question, Option<OptionKey>)>) -> Self {
        Self::new().with_topic(1, 100, false, questions)
    }

    /// Add a quiz-bearing topic. Its quiz id is `topic_id + 800`.
    pub(crate) fn with_topic(
        mut self,
        unit_id: u64,
        topic_id: u64,
        completed: bool,
        questions: Vec<(Question, Option<OptionKey>)>,
    ) -> Self {
        let topic = Topic {
            id: topic_id,
            name: format!("topic {topic_id}"),
            unit_id,
            has_quiz: true,
        };
        self.push_topic(topic);
        if completed {
            self.completed.insert(topic_id);
        }
        for (q, answer) in &questions {
            if let Some(answer) = answer {
                self.correct.insert(q.id, *answer);
            }
        }
        self.quizzes.insert(
            topic_id,
            Quiz {
                id: topic_id + 800,
                topic_id,
                questions: questions.into_iter().map(|(q, _)| q).collect(),
            },
        );
        self
    }

    /// Add a topic without a quiz.
    pub(crate) fn with_plain_topic(mut self, unit_id: u64, topic_id: u64) -> Self {
        self.push_topic(Topic {
            id: topic_id,
            name: format!("topic {topic_id}"),
            unit_id,
            has_quiz: false,
        });
        self
    }

    fn push_topic(&mut self, topic: Topic) {
        match self.units.iter_mut().find(|(id, _)| *id == topic.unit_id) {
            Some((_, topics)) => topics.push(topic),
            None => self.units.push((topic.unit_id, vec![topic])),
        }
    }

    pub(crate) fn quiz_id(&self) -> u64 {
        900
    }

    pub(crate) fn set_score(&self, score: Score) {
        self.state.lock().unwrap().scores.insert(self.quiz_id(), score);
    }

    pub(crate) fn current_score(&self) -> Score {
        self.score_of(self.quiz_id())
    }

    pub(crate) fn score_of(&self, quiz_id: u64) -> Score {
        self.state
            .lock()
            .unwrap()
            .scores
            .get(&quiz_id)
            .copied()
            .unwrap_or(0)
    }

    /// The correct answer to this question is worth two points.
    pub(crate) fn award_double(&self, question_id: u64) {
        self.state.lock().unwrap().doubled.insert(question_id);
    }

    /// The first score read following a submission for this question fails.
    pub(crate) fn fail_next_score_read_after(&self, question_id: u64, error: ApiError) {
        self.state
            .lock()
            .unwrap()
            .score_failures
            .insert(question_id, error);
    }

    /// When an injected score-read failure fires, the quiz's server score is
    /// replaced by `score`.
    pub(crate) fn set_score_after_failure(&self, score: Score) {
        self.state.lock().unwrap().score_after_failure = Some(score);
    }

    pub(crate) fn fail_unit_topics(&self, unit_id: u64, error: ApiError) {
        self.state
            .lock()
            .unwrap()
            .topic_failures
            .insert(unit_id, error);
    }

    pub(crate) fn fail_create_quiz(&self, topic_id: u64, error: ApiError) {
        self.state
            .lock()
            .unwrap()
            .create_failures
            .insert(topic_id, error);
    }

    pub(crate) fn submissions(&self) -> Vec<Attempt> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub(crate) fn submit_count(&self) -> usize {
        self.state.lock().unwrap().submissions.len()
    }

    pub(crate) fn score_count(&self) -> u32 {
        self.state.lock().unwrap().score_reads
    }

    pub(crate) fn create_calls(&self) -> Vec<u64> {
        self.state.lock().unwrap().create_calls.clone()
    }
}

#[async_trait]
impl QuizApi for ScriptedApi {
    async fn subject_units(&self, _subject_id: u64) -> Result<Vec<Unit>, ApiError> {
        Ok(self
            .units
            .iter()
            .map(|(id, _)| Unit {
                id: *id,
                name: format!("unit {id}"),
            })
            .collect())
    }

    async fn unit_topics(&self, unit_id: u64) -> Result<Vec<Topic>, ApiError> {
        if let Some(err) = self.state.lock().unwrap().topic_failures.get(&unit_id) {
            return Err(err.clone());
        }
        Ok(self
            .units
            .iter()
            .find(|(id, _)| *id == unit_id)
            .map(|(_, topics)| topics.clone())
            .unwrap_or_default())
    }

    async fn quiz_completed(&self, topic_id: u64) -> Result<bool, ApiError> {
        Ok(self.completed.contains(&topic_id))
    }

    async fn create_quiz(&self, topic_id: u64) -> Result<Quiz, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls.push(topic_id);
        if let Some(err) = state.create_failures.get(&topic_id) {
            return Err(err.clone());
        }
        self.quizzes
            .get(&topic_id)
            .cloned()
            .ok_or_else(|| ApiError::Protocol(format!("no quiz for topic {topic_id}")))
    }

    async fn submit_answer(&self, attempt: &Attempt) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.submissions.push(*attempt);
        let scores = self.correct.get(&attempt.question_id) == Some(&attempt.option);
        if scores && state.solved.insert(attempt.question_id) {
            let points = if state.doubled.contains(&attempt.question_id) {
                2
            } else {
                1
            };
            *state.scores.entry(attempt.quiz_id).or_insert(0) += points;
        }
        Ok(())
    }

    async fn quiz_score(&self, quiz_id: u64) -> Result<Score, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.score_reads += 1;
        if let Some(last) = state.submissions.last().map(|a| a.question_id) {
            if let Some(err) = state.score_failures.remove(&last) {
                if let Some(score) = state.score_after_failure.take() {
                    state.scores.insert(quiz_id, score);
                }
                return Err(err);
            }
        }
        Ok(state.scores.get(&quiz_id).copied().unwrap_or(0))
    }
}
