//! A stateful fake of the quiz API served over HTTP by wiremock.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[derive(Default)]
struct Scores {
    by_quiz: HashMap<u64, i64>,
    solved: HashSet<(u64, u64)>,
    submissions: Vec<(u64, u64, String)>,
}

/// Score-keeping half of the fake: answers and score reads share state.
#[derive(Clone, Default)]
pub struct ScoreBoard {
    /// (quiz id, question id) → correct option
    answers: Arc<HashMap<(u64, u64), String>>,
    scores: Arc<Mutex<Scores>>,
}

impl ScoreBoard {
    pub fn new(answers: &[(u64, u64, &str)]) -> Self {
        Self {
            answers: Arc::new(
                answers
                    .iter()
                    .map(|(quiz, question, key)| ((*quiz, *question), key.to_string()))
                    .collect(),
            ),
            scores: Arc::default(),
        }
    }

    /// Submitted `(quiz, question, option)` triples, in order.
    pub fn submissions(&self) -> Vec<(u64, u64, String)> {
        self.scores.lock().unwrap().submissions.clone()
    }

    pub fn score_of(&self, quiz_id: u64) -> i64 {
        self.scores
            .lock()
            .unwrap()
            .by_quiz
            .get(&quiz_id)
            .copied()
            .unwrap_or(0)
    }
}

struct SaveAnswer(ScoreBoard);

impl Respond for SaveAnswer {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match request.body_json() {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let quiz = body["quizId"].as_u64().unwrap_or_default();
        let question = body["questionId"].as_u64().unwrap_or_default();
        let option = body["userAnswer"].as_str().unwrap_or_default().to_string();

        let board = &self.0;
        let mut scores = board.scores.lock().unwrap();
        if board.answers.get(&(quiz, question)) == Some(&option)
            && scores.solved.insert((quiz, question))
        {
            *scores.by_quiz.entry(quiz).or_insert(0) += 1;
        }
        scores.submissions.push((quiz, question, option));
        ResponseTemplate::new(200).set_body_json(json!({"payload": {"saved": true}}))
    }
}

struct SubmitQuiz(ScoreBoard);

impl Respond for SubmitQuiz {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match request.body_json() {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let quiz = body["quizId"].as_u64().unwrap_or_default();
        ResponseTemplate::new(200)
            .set_body_json(json!({"payload": {"score": self.0.score_of(quiz)}}))
    }
}

/// Mount the answer and score endpoints backed by `board`.
pub async fn mount_scoring(server: &MockServer, board: &ScoreBoard) {
    Mock::given(method("POST"))
        .and(path("/quizquestionattempts/save-user-quiz-answer"))
        .respond_with(SaveAnswer(board.clone()))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/quizattempts/submit-quiz"))
        .respond_with(SubmitQuiz(board.clone()))
        .mount(server)
        .await;
}

/// Mount a GET endpoint returning `payload` in the API envelope.
pub async fn mount_payload(server: &MockServer, route: &str, payload: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "payload": payload })))
        .mount(server)
        .await;
}

/// Unit 7 with a badged topic 70, a plain topic 72 and topic 71 whose
/// single question (quiz 900, question 1) is answered by `c`.
pub async fn two_topic_unit(server: &MockServer) -> ScoreBoard {
    mount_payload(
        server,
        "/studentmaster/get-topics-unit/7",
        json!({"topics": [
            {"id": 70, "name": "Done already", "contentFlag": 1},
            {"id": 71, "name": "Fresh quiz", "contentFlag": true},
            {"id": 72, "name": "Reading only", "contentFlag": 0}
        ]}),
    )
    .await;
    mount_payload(server, "/quizattempts/quiz-result/70", json!({"badge": 1})).await;
    mount_payload(server, "/quizattempts/quiz-result/71", json!({"badge": 0})).await;
    mount_payload(
        server,
        "/quizattempts/create-quiz/71",
        json!({"quizId": 900, "questions": [
            {"questionId": 1, "question": "Which is prime?",
             "options": {"a": "4", "b": "6", "c": "7", "d": "9"}}
        ]}),
    )
    .await;

    let board = ScoreBoard::new(&[(900, 1, "c")]);
    mount_scoring(server, &board).await;
    board
}
