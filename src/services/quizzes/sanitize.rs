//! 题目清洗
//!
//! 把不可信的题目输入转换为规范的 `Question`。从不返回错误：
//! 无效字段降级为默认值。

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::coerce::{loose_number, loose_string, option_index, truthy};
use crate::models::quizzes::entities::{Question, QuestionBody};

pub const UNTITLED_QUESTION: &str = "Untitled question";

/// 缺少 ID 时的生成器
pub trait IdGenerator {
    fn page_id(&mut self, page_index: usize) -> String;
    fn question_id(&mut self, page_index: usize, question_index: usize) -> String;
}

/// 位置 + 随机 UUID，避免并发创建时冲突
#[derive(Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn page_id(&mut self, page_index: usize) -> String {
        format!("p{}-{}", page_index + 1, Uuid::new_v4().simple())
    }

    fn question_id(&mut self, page_index: usize, question_index: usize) -> String {
        format!(
            "q{}-{}-{}",
            page_index + 1,
            question_index + 1,
            Uuid::new_v4().simple()
        )
    }
}

/// 非空字符串或数字形式的 ID
pub(crate) fn explicit_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(loose_string(&Value::Number(n.clone()))),
        _ => None,
    }
}

fn placeholder_options() -> Vec<String> {
    vec!["Option 1".to_string(), "Option 2".to_string()]
}

fn sanitize_options(raw: Option<&Value>) -> Vec<String> {
    let options: Vec<String> = raw
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(loose_string)
                .collect()
        })
        .unwrap_or_default();

    if options.len() < 2 {
        placeholder_options()
    } else {
        options
    }
}

fn text_answer(raw: Option<&Value>) -> String {
    match raw {
        None | Some(Value::Null) => String::new(),
        Some(value) => loose_string(value),
    }
}

fn sentence_limit(raw: Option<&Value>, default: f64) -> f64 {
    raw.and_then(loose_number)
        .map(f64::trunc)
        .unwrap_or(default)
}

fn build_body(kind: &str, obj: Option<&Map<String, Value>>) -> QuestionBody {
    let field = |name: &str| obj.and_then(|o| o.get(name));
    // 旧数据使用 `answer` 字段
    let answer = field("correctAnswer")
        .filter(|v| !v.is_null())
        .or_else(|| field("answer"));

    match kind {
        "checkboxes" => {
            let options = sanitize_options(field("options"));
            let indices: BTreeSet<usize> = match answer {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|item| option_index(item, options.len()))
                    .collect(),
                Some(scalar) => option_index(scalar, options.len()).into_iter().collect(),
                None => BTreeSet::new(),
            };
            QuestionBody::Checkboxes {
                options,
                correct_answer: indices.into_iter().collect(),
            }
        }
        "short_answer" => QuestionBody::ShortAnswer {
            correct_answer: text_answer(answer),
            sentence_limit: sentence_limit(field("sentenceLimit"), 1.0).clamp(1.0, 3.0) as u8,
        },
        "paragraph" => QuestionBody::Paragraph {
            correct_answer: text_answer(answer),
            sentence_limit: sentence_limit(field("sentenceLimit"), 3.0).clamp(3.0, u8::MAX as f64)
                as u8,
        },
        _ => {
            let options = sanitize_options(field("options"));
            let correct_answer = answer.and_then(|v| option_index(v, options.len()));
            QuestionBody::MultipleChoice {
                options,
                correct_answer,
            }
        }
    }
}

/// 清洗单个题目
pub fn sanitize_question(
    raw: &Value,
    page_index: usize,
    question_index: usize,
    ids: &mut dyn IdGenerator,
) -> Question {
    let obj = raw.as_object();
    let field = |name: &str| obj.and_then(|o| o.get(name));

    let kind = field("type")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("multiple_choice");

    let id = explicit_id(field("id"))
        .unwrap_or_else(|| ids.question_id(page_index, question_index));

    let text = match field("text") {
        None | Some(Value::Null) => String::new(),
        Some(value) => loose_string(value).trim().to_string(),
    };

    Question {
        id,
        text: if text.is_empty() {
            UNTITLED_QUESTION.to_string()
        } else {
            text
        },
        requires_manual_grading: truthy(field("requiresManualGrading")),
        body: build_body(kind, obj),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// 可预测的 ID 生成器
    #[derive(Default)]
    pub(crate) struct SequentialIds {
        pub(crate) next: usize,
    }

    impl IdGenerator for SequentialIds {
        fn page_id(&mut self, page_index: usize) -> String {
            self.next += 1;
            format!("page-{}-{}", page_index, self.next)
        }

        fn question_id(&mut self, page_index: usize, question_index: usize) -> String {
            self.next += 1;
            format!("q-{}-{}-{}", page_index, question_index, self.next)
        }
    }

    fn sanitize(raw: Value) -> Question {
        sanitize_question(&raw, 0, 0, &mut SequentialIds::default())
    }

    #[test]
    fn defaults_unknown_type_and_empty_text() {
        let q = sanitize(json!({"type": "matrix", "text": "   "}));
        assert_eq!(q.text, UNTITLED_QUESTION);
        assert_eq!(q.id, "q-0-0-1");
        assert_eq!(
            q.body,
            QuestionBody::MultipleChoice {
                options: vec!["Option 1".into(), "Option 2".into()],
                correct_answer: None,
            }
        );
    }

    #[test]
    fn non_object_input_still_yields_question() {
        for raw in [json!(null), json!(42), json!("text"), json!([1, 2])] {
            let q = sanitize(raw);
            assert_eq!(q.text, UNTITLED_QUESTION);
            let QuestionBody::MultipleChoice { options, .. } = &q.body else {
                panic!("fallback question should be multiple choice");
            };
            assert_eq!(options.len(), 2);
        }
    }

    #[test]
    fn multiple_choice_filters_options_and_bounds_answer() {
        let q = sanitize(json!({
            "id": "q1",
            "type": "multiple_choice",
            "text": "  Pick one ",
            "options": ["A", null, 3, "C"],
            "correctAnswer": "2"
        }));
        assert_eq!(q.id, "q1");
        assert_eq!(q.text, "Pick one");
        assert_eq!(
            q.body,
            QuestionBody::MultipleChoice {
                options: vec!["A".into(), "3".into(), "C".into()],
                correct_answer: Some(2),
            }
        );

        let out_of_range = sanitize(json!({"options": ["A", "B"], "correctAnswer": 5}));
        assert!(matches!(
            out_of_range.body,
            QuestionBody::MultipleChoice { correct_answer: None, .. }
        ));
    }

    #[test]
    fn single_option_gets_placeholders() {
        let q = sanitize(json!({"type": "checkboxes", "options": ["only"], "correctAnswer": [0]}));
        assert_eq!(
            q.body,
            QuestionBody::Checkboxes {
                options: vec!["Option 1".into(), "Option 2".into()],
                correct_answer: vec![0],
            }
        );
    }

    #[test]
    fn checkboxes_dedupe_sort_and_drop_out_of_range() {
        let q = sanitize(json!({
            "type": "checkboxes",
            "options": ["a", "b", "c"],
            "correctAnswer": [2, "0", 2, 7, -1, "x"]
        }));
        assert_eq!(
            q.body,
            QuestionBody::Checkboxes {
                options: vec!["a".into(), "b".into(), "c".into()],
                correct_answer: vec![0, 2],
            }
        );
    }

    #[test]
    fn legacy_answer_field_is_used() {
        let q = sanitize(json!({"options": ["a", "b"], "answer": 1}));
        assert!(matches!(
            q.body,
            QuestionBody::MultipleChoice { correct_answer: Some(1), .. }
        ));
    }

    #[test]
    fn sentence_limits_are_clamped() {
        let short = sanitize(json!({
            "type": "short_answer",
            "sentenceLimit": 9,
            "correctAnswer": 42
        }));
        assert_eq!(
            short.body,
            QuestionBody::ShortAnswer {
                correct_answer: "42".into(),
                sentence_limit: 3,
            }
        );
        let short_default = sanitize(json!({"type": "short_answer"}));
        assert_eq!(
            short_default.body,
            QuestionBody::ShortAnswer {
                correct_answer: String::new(),
                sentence_limit: 1,
            }
        );
        let short_low = sanitize(json!({"type": "short_answer", "sentenceLimit": 0}));
        assert!(matches!(short_low.body, QuestionBody::ShortAnswer { sentence_limit: 1, .. }));

        let paragraph = sanitize(json!({"type": "paragraph", "sentenceLimit": 1}));
        assert!(matches!(paragraph.body, QuestionBody::Paragraph { sentence_limit: 3, .. }));
        let paragraph_big = sanitize(json!({"type": "paragraph", "sentenceLimit": "8"}));
        assert!(matches!(paragraph_big.body, QuestionBody::Paragraph { sentence_limit: 8, .. }));
    }

    #[test]
    fn manual_grading_flag_accepts_loose_truthy_values() {
        assert!(sanitize(json!({"requiresManualGrading": true})).requires_manual_grading);
        assert!(sanitize(json!({"requiresManualGrading": "true"})).requires_manual_grading);
        assert!(!sanitize(json!({"requiresManualGrading": "false"})).requires_manual_grading);
        assert!(!sanitize(json!({})).requires_manual_grading);
    }
}
