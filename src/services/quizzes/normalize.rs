//! 页面规范化
//!
//! 兼容三种历史输入形态：
//! 1. `{ "pages": [...] }`
//! 2. 每个元素都带 `questions` 数组的页面列表
//! 3. 扁平的题目数组，整体包装为一页

use serde_json::Value;

use super::coerce::loose_string;
use super::sanitize::{IdGenerator, explicit_id, sanitize_question};
use crate::models::quizzes::entities::{Page, Question};

/// 输入形态
#[derive(Debug, Clone, Copy, PartialEq)]
enum RawShape<'a> {
    Paged(&'a [Value]),
    PageList(&'a [Value]),
    FlatQuestions(&'a [Value]),
    Empty,
}

fn has_questions(value: &Value) -> bool {
    value.get("questions").is_some_and(Value::is_array)
}

fn classify(raw: &Value) -> RawShape<'_> {
    match raw {
        Value::Object(obj) => match obj.get("pages") {
            Some(Value::Array(pages)) => RawShape::Paged(pages),
            _ => RawShape::Empty,
        },
        Value::Array(items) if items.is_empty() => RawShape::Empty,
        Value::Array(items) if items.first().is_some_and(has_questions) => {
            RawShape::PageList(items)
        }
        Value::Array(items) => RawShape::FlatQuestions(items),
        _ => RawShape::Empty,
    }
}

fn default_page_title(page_index: usize) -> String {
    format!("Page {}", page_index + 1)
}

fn sanitize_questions(
    raw: &[Value],
    page_index: usize,
    ids: &mut dyn IdGenerator,
) -> Vec<Question> {
    raw.iter()
        .enumerate()
        .map(|(question_index, q)| sanitize_question(q, page_index, question_index, ids))
        .collect()
}

fn sanitize_page(raw: &Value, page_index: usize, ids: &mut dyn IdGenerator) -> Page {
    let id = explicit_id(raw.get("id")).unwrap_or_else(|| ids.page_id(page_index));
    let title = match raw.get("title") {
        None | Some(Value::Null) => String::new(),
        Some(value) => loose_string(value).trim().to_string(),
    };
    let questions = raw
        .get("questions")
        .and_then(Value::as_array)
        .map(|qs| sanitize_questions(qs, page_index, ids))
        .unwrap_or_default();

    Page {
        id,
        title: if title.is_empty() {
            default_page_title(page_index)
        } else {
            title
        },
        questions,
    }
}

/// 把任意形态的题目输入转换为有序页面列表
///
/// 字符串输入先按 JSON 解析，解析失败视为空。
pub fn normalize_to_pages(raw: &Value, ids: &mut dyn IdGenerator) -> Vec<Page> {
    if let Value::String(text) = raw {
        return match serde_json::from_str::<Value>(text) {
            Ok(parsed) if !parsed.is_string() => normalize_to_pages(&parsed, ids),
            _ => Vec::new(),
        };
    }

    match classify(raw) {
        RawShape::Paged(pages) | RawShape::PageList(pages) => pages
            .iter()
            .enumerate()
            .map(|(page_index, page)| sanitize_page(page, page_index, ids))
            .collect(),
        RawShape::FlatQuestions(questions) => vec![Page {
            id: ids.page_id(0),
            title: default_page_title(0),
            questions: sanitize_questions(questions, 0, ids),
        }],
        RawShape::Empty => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quizzes::entities::QuestionBody;
    use crate::services::quizzes::sanitize::tests::SequentialIds;
    use serde_json::json;

    fn normalize(raw: Value) -> Vec<Page> {
        normalize_to_pages(&raw, &mut SequentialIds::default())
    }

    #[test]
    fn classifies_each_shape() {
        assert!(matches!(classify(&json!({"pages": []})), RawShape::Paged(_)));
        assert!(matches!(
            classify(&json!([{"title": "A", "questions": []}])),
            RawShape::PageList(_)
        ));
        assert!(matches!(classify(&json!([{"text": "q"}])), RawShape::FlatQuestions(_)));
        assert_eq!(classify(&json!([])), RawShape::Empty);
        assert_eq!(classify(&json!({"pages": "nope"})), RawShape::Empty);
        assert_eq!(classify(&json!(null)), RawShape::Empty);
    }

    #[test]
    fn paged_input_keeps_order_and_titles() {
        let pages = normalize(json!({
            "pages": [
                {"id": "intro", "title": " Basics ", "questions": [{"text": "a"}, {"text": "b"}]},
                {"title": "", "questions": [{"text": "c"}]},
                {"questions": "broken"}
            ]
        }));
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].id, "intro");
        assert_eq!(pages[0].title, "Basics");
        let texts: Vec<_> = pages[0].questions.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, ["a", "b"]);
        assert_eq!(pages[1].title, "Page 2");
        assert_eq!(pages[1].questions[0].text, "c");
        assert_eq!(pages[2].title, "Page 3");
        assert!(pages[2].questions.is_empty());
    }

    #[test]
    fn page_list_input_is_treated_as_pages() {
        let pages = normalize(json!([
            {"title": "One", "questions": [{"text": "x"}]},
            {"title": "Two", "questions": []}
        ]));
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].title, "One");
        assert_eq!(pages[1].title, "Two");
        assert_eq!(pages[0].questions.len(), 1);
    }

    #[test]
    fn flat_questions_are_wrapped_in_one_page() {
        let pages = normalize(json!([
            {"type": "short_answer", "text": "name?", "correctAnswer": "Ada"},
            {"type": "paragraph", "text": "why?"}
        ]));
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "Page 1");
        assert_eq!(pages[0].questions.len(), 2);
        assert_eq!(pages[0].questions[0].body.type_name(), "short_answer");
        assert_eq!(pages[0].questions[1].body.type_name(), "paragraph");
    }

    #[test]
    fn json_string_input_is_parsed() {
        let pages = normalize(json!(r#"[{"text": "from string"}]"#));
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].questions[0].text, "from string");

        assert!(normalize(json!("not json")).is_empty());
        assert!(normalize(json!([])).is_empty());
    }

    #[test]
    fn renormalizing_output_is_stable() {
        let first = normalize(json!({
            "pages": [{
                "title": "Quiz",
                "questions": [
                    {"type": "multiple_choice", "text": "pick",
                     "options": ["A", "B"], "correctAnswer": "1"},
                    {"type": "checkboxes", "text": "many",
                     "options": ["a", "b", "c"], "correctAnswer": [2, 0]},
                    {"type": "short_answer", "text": "short",
                     "sentenceLimit": 2, "correctAnswer": "yes"},
                    {"type": "paragraph", "text": "long", "requiresManualGrading": true}
                ]
            }]
        }));
        let serialized = json!({ "pages": serde_json::to_value(&first).unwrap() });
        let second = normalize(serialized);
        assert_eq!(first, second);
        assert_eq!(
            second[0].questions[1].body,
            QuestionBody::Checkboxes {
                options: vec!["a".into(), "b".into(), "c".into()],
                correct_answer: vec![0, 2],
            }
        );
    }
}
