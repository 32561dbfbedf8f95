//! Simulated quiz server for testing the traversal without real API calls.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use tessbot_core::model::{Attempt, OptionKey, Question, Quiz, Score, Topic, Unit};
use tessbot_core::{ApiError, QuizApi};

/// A topic served by [`MockQuizApi`].
#[derive(Debug, Clone)]
pub struct MockTopic {
    pub id: u64,
    pub name: String,
    pub has_quiz: bool,
    /// Whether the quiz already carries a badge.
    pub completed: bool,
    /// Questions with their scoring option, if any.
    pub questions: Vec<(Question, Option<OptionKey>)>,
}

impl MockTopic {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            has_quiz: true,
            completed: false,
            questions: Vec::new(),
        }
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    pub fn without_quiz(mut self) -> Self {
        self.has_quiz = false;
        self
    }

    pub fn question(mut self, question: Question, correct: Option<OptionKey>) -> Self {
        self.questions.push((question, correct));
        self
    }
}

#[derive(Default)]
struct ServerState {
    scores: HashMap<u64, Score>,
    solved: HashSet<(u64, u64)>,
    submissions: Vec<Attempt>,
    next_quiz_id: u64,
}

/// Behaves like the real API: every `create_quiz` call hands out a fresh quiz
/// id whose score rises by one the first time a question's correct option is
/// submitted. Call counters allow asserting on the exact protocol traffic.
pub struct MockQuizApi {
    subjects: HashMap<u64, Vec<Unit>>,
    units: HashMap<u64, Vec<MockTopic>>,
    /// quiz id → correct option by question id
    quizzes: Mutex<HashMap<u64, HashMap<u64, OptionKey>>>,
    state: Mutex<ServerState>,
    failures: Mutex<HashMap<&'static str, ApiError>>,
    reject_token: bool,
    submit_calls: AtomicU32,
    score_calls: AtomicU32,
    create_calls: AtomicU32,
    result_calls: AtomicU32,
}

impl Default for MockQuizApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockQuizApi {
    pub fn new() -> Self {
        Self {
            subjects: HashMap::new(),
            units: HashMap::new(),
            quizzes: Mutex::new(HashMap::new()),
            state: Mutex::new(ServerState {
                next_quiz_id: 5000,
                ..ServerState::default()
            }),
            failures: Mutex::new(HashMap::new()),
            reject_token: false,
            submit_calls: AtomicU32::new(0),
            score_calls: AtomicU32::new(0),
            create_calls: AtomicU32::new(0),
            result_calls: AtomicU32::new(0),
        }
    }

    /// Serve a unit with the given topics.
    pub fn with_unit(mut self, unit_id: u64, topics: Vec<MockTopic>) -> Self {
        self.units.insert(unit_id, topics);
        self
    }

    /// Serve a subject listing the given units.
    pub fn with_subject(mut self, subject_id: u64, units: Vec<Unit>) -> Self {
        self.subjects.insert(subject_id, units);
        self
    }

    /// Reject every call with HTTP 401.
    pub fn rejecting_token(mut self) -> Self {
        self.reject_token = true;
        self
    }

    /// Fail every call to `endpoint` with `error`. Endpoints are named after
    /// the trait methods, e.g. `"quiz_score"`.
    pub fn fail_endpoint(&self, endpoint: &'static str, error: ApiError) {
        self.failures.lock().unwrap().insert(endpoint, error);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::Relaxed)
    }

    pub fn score_calls(&self) -> u32 {
        self.score_calls.load(Ordering::Relaxed)
    }

    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::Relaxed)
    }

    pub fn result_calls(&self) -> u32 {
        self.result_calls.load(Ordering::Relaxed)
    }

    /// All submissions, in order.
    pub fn submissions(&self) -> Vec<Attempt> {
        self.state.lock().unwrap().submissions.clone()
    }

    /// Current server-side score of a quiz.
    pub fn score_of(&self, quiz_id: u64) -> Score {
        self.state
            .lock()
            .unwrap()
            .scores
            .get(&quiz_id)
            .copied()
            .unwrap_or(0)
    }

    fn check(&self, endpoint: &'static str) -> Result<(), ApiError> {
        if self.reject_token {
            return Err(ApiError::Auth {
                status: 401,
                message: "invalid token".into(),
            });
        }
        match self.failures.lock().unwrap().get(endpoint) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn find_topic(&self, topic_id: u64) -> Option<&MockTopic> {
        self.units
            .values()
            .flat_map(|topics| topics.iter())
            .find(|t| t.id == topic_id)
    }
}

#[async_trait]
impl QuizApi for MockQuizApi {
    async fn subject_units(&self, subject_id: u64) -> Result<Vec<Unit>, ApiError> {
        self.check("subject_units")?;
        self.subjects
            .get(&subject_id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: format!("subject {subject_id} not found"),
            })
    }

    async fn unit_topics(&self, unit_id: u64) -> Result<Vec<Topic>, ApiError> {
        self.check("unit_topics")?;
        let topics = self.units.get(&unit_id).ok_or_else(|| ApiError::Status {
            status: 404,
            message: format!("unit {unit_id} not found"),
        })?;
        Ok(topics
            .iter()
            .map(|t| Topic {
                id: t.id,
                name: t.name.clone(),
                unit_id,
                has_quiz: t.has_quiz,
            })
            .collect())
    }

    async fn quiz_completed(&self, topic_id: u64) -> Result<bool, ApiError> {
        self.result_calls.fetch_add(1, Ordering::Relaxed);
        self.check("quiz_completed")?;
        Ok(self.find_topic(topic_id).is_some_and(|t| t.completed))
    }

    async fn create_quiz(&self, topic_id: u64) -> Result<Quiz, ApiError> {
        self.create_calls.fetch_add(1, Ordering::Relaxed);
        self.check("create_quiz")?;
        let topic = self
            .find_topic(topic_id)
            .filter(|t| t.has_quiz)
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: format!("topic {topic_id} has no quiz"),
            })?;

        let quiz_id = {
            let mut state = self.state.lock().unwrap();
            state.next_quiz_id += 1;
            state.next_quiz_id
        };
        let answers = topic
            .questions
            .iter()
            .filter_map(|(q, correct)| correct.map(|c| (q.id, c)))
            .collect();
        self.quizzes.lock().unwrap().insert(quiz_id, answers);

        Ok(Quiz {
            id: quiz_id,
            topic_id,
            questions: topic.questions.iter().map(|(q, _)| q.clone()).collect(),
        })
    }

    async fn submit_answer(&self, attempt: &Attempt) -> Result<(), ApiError> {
        self.submit_calls.fetch_add(1, Ordering::Relaxed);
        self.check("submit_answer")?;
        let correct = self
            .quizzes
            .lock()
            .unwrap()
            .get(&attempt.quiz_id)
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: format!("quiz {} not found", attempt.quiz_id),
            })?
            .get(&attempt.question_id)
            .copied();

        let mut state = self.state.lock().unwrap();
        state.submissions.push(*attempt);
        if correct == Some(attempt.option)
            && state.solved.insert((attempt.quiz_id, attempt.question_id))
        {
            *state.scores.entry(attempt.quiz_id).or_insert(0) += 1;
        }
        Ok(())
    }

    async fn quiz_score(&self, quiz_id: u64) -> Result<Score, ApiError> {
        self.score_calls.fetch_add(1, Ordering::Relaxed);
        self.check("quiz_score")?;
        Ok(self.score_of(quiz_id))
    }
}
