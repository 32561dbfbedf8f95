use std::collections::BTreeMap;

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use uuid::Uuid;

use tessbot_core::model::OptionKey;
use tessbot_core::report::*;
use tessbot_report::render_text;

fn make_topic(id: u64, questions: usize) -> TopicReport {
    let options: BTreeMap<OptionKey, String> = OptionKey::ALL
        .iter()
        .map(|k| (*k, format!("option text {k}")))
        .collect();
    TopicReport {
        topic_id: id,
        topic_name: format!("Topic {id}"),
        outcome: TopicOutcome::Completed {
            transcript: QuizTranscript {
                quiz_id: id + 1000,
                questions: (0..questions as u64)
                    .map(|q| QuestionRecord {
                        question_id: q,
                        text: format!("What is the answer to question {q}?"),
                        options: options.clone(),
                        answer: if q % 5 == 0 {
                            Answer::NotFound
                        } else {
                            Answer::Correct(OptionKey::ALL[(q % 4) as usize])
                        },
                    })
                    .collect(),
                final_score: questions as i64,
            },
        },
    }
}

fn make_report(units: u64, topics: u64, questions: usize) -> RunReport {
    let units: Vec<UnitReport> = (0..units)
        .map(|u| UnitReport {
            unit_id: u,
            topics: (0..topics)
                .map(|t| {
                    if t % 3 == 0 {
                        TopicReport {
                            topic_id: u * 100 + t,
                            topic_name: "done".into(),
                            outcome: TopicOutcome::Skipped,
                        }
                    } else {
                        make_topic(u * 100 + t, questions)
                    }
                })
                .collect(),
            error: None,
        })
        .collect();
    RunReport {
        id: Uuid::nil(),
        created_at: Utc::now(),
        summary: RunSummary::from_units(&units),
        units,
        duration_ms: 0,
    }
}

fn bench_render_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_text");

    let single = make_report(1, 1, 10);
    let subject = make_report(5, 12, 10);
    let large = make_report(20, 20, 25);

    group.bench_function("single_quiz", |b| b.iter(|| render_text(black_box(&single))));
    group.bench_function("subject", |b| b.iter(|| render_text(black_box(&subject))));
    group.bench_function("large", |b| b.iter(|| render_text(black_box(&large))));

    group.finish();
}

criterion_group!(benches, bench_render_text);
criterion_main!(benches);
