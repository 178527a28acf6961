//! 自动评分
//!
//! 所有页面的题目按顺序展开后逐题比较：
//! - 需人工批改的题目不计分，并使作答进入待批改状态
//! - 未设置标准答案的题目直接跳过
//! - 多选题按集合比较（忽略顺序），其余题型按字符串精确比较

use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::attempts::entities::{AttemptStatus, GradingEntry};
use crate::models::quizzes::entities::{AnswerKey, Question, QuestionBody};
use crate::services::quizzes::coerce::loose_string;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub status: AttemptStatus,
    // 待人工批改时为 None
    pub score: Option<f64>,
    pub grading: BTreeMap<String, GradingEntry>,
}

fn expected_value(body: &QuestionBody) -> Value {
    match body {
        QuestionBody::MultipleChoice { correct_answer, .. } => json!(correct_answer),
        QuestionBody::Checkboxes { correct_answer, .. } => json!(correct_answer),
        QuestionBody::ShortAnswer { correct_answer, .. }
        | QuestionBody::Paragraph { correct_answer, .. } => json!(correct_answer),
    }
}

fn given_as_strings(given: &Value) -> Vec<String> {
    match given {
        Value::Array(items) => items.iter().map(loose_string).collect(),
        other => vec![loose_string(other)],
    }
}

fn is_correct(key: &AnswerKey, given: Option<&Value>) -> bool {
    let Some(given) = given.filter(|v| !v.is_null()) else {
        return false;
    };

    match key {
        AnswerKey::Set(expected) => {
            let given = given_as_strings(given);
            given.len() == expected.len()
                && given.iter().collect::<BTreeSet<_>>() == expected.iter().collect::<BTreeSet<_>>()
        }
        AnswerKey::Single(expected) => loose_string(given) == *expected,
    }
}

/// 对一次提交评分
pub fn score_submission<'a, I>(questions: I, answers: &Map<String, Value>) -> ScoreOutcome
where
    I: IntoIterator<Item = &'a Question>,
{
    let mut grading = BTreeMap::new();
    let mut manual_pending = false;
    let mut total = 0u32;
    let mut correct = 0u32;

    for question in questions {
        let given = answers.get(&question.id);

        if question.requires_manual_grading {
            manual_pending = true;
            grading.insert(
                question.id.clone(),
                GradingEntry::Manual {
                    requires_manual_grading: true,
                    answer: given.cloned().unwrap_or(Value::Null),
                    scored: false,
                },
            );
            continue;
        }

        let Some(key) = question.body.answer_key() else {
            continue;
        };

        total += 1;
        let is_right = is_correct(&key, given);
        if is_right {
            correct += 1;
        }
        grading.insert(
            question.id.clone(),
            GradingEntry::Scored {
                correct: is_right,
                given: given.cloned().unwrap_or(Value::Null),
                expected: expected_value(&question.body),
                scored: true,
            },
        );
    }

    if manual_pending {
        return ScoreOutcome {
            status: AttemptStatus::NeedsGrading,
            score: None,
            grading,
        };
    }

    let score = if total == 0 {
        0.0
    } else {
        (f64::from(correct) / f64::from(total) * 100.0).round()
    };

    ScoreOutcome {
        status: AttemptStatus::Completed,
        score: Some(score),
        grading,
    }
}
