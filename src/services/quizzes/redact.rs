//! 学生视角的测验内容：保留结构，去除标准答案

use crate::models::quizzes::entities::{Page, Question, QuestionBody};
use crate::models::quizzes::responses::{RedactedBody, RedactedPage, RedactedQuestion};

fn redact_question(question: &Question) -> RedactedQuestion {
    let body = match &question.body {
        QuestionBody::MultipleChoice { options, .. } => RedactedBody::MultipleChoice {
            options: options.clone(),
        },
        QuestionBody::Checkboxes { options, .. } => RedactedBody::Checkboxes {
            options: options.clone(),
        },
        QuestionBody::ShortAnswer { sentence_limit, .. } => RedactedBody::ShortAnswer {
            sentence_limit: *sentence_limit,
        },
        QuestionBody::Paragraph { sentence_limit, .. } => RedactedBody::Paragraph {
            sentence_limit: *sentence_limit,
        },
    };

    RedactedQuestion {
        id: question.id.clone(),
        text: question.text.clone(),
        requires_manual_grading: question.requires_manual_grading,
        body,
    }
}

pub fn redact_pages(pages: &[Page]) -> Vec<RedactedPage> {
    pages
        .iter()
        .map(|page| RedactedPage {
            id: page.id.clone(),
            title: page.title.clone(),
            questions: page.questions.iter().map(redact_question).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::quizzes::normalize::normalize_to_pages;
    use crate::services::quizzes::sanitize::tests::SequentialIds;
    use serde_json::{Value, json};

    fn sample_pages() -> Vec<Page> {
        normalize_to_pages(
            &json!({
                "pages": [
                    {"title": "A", "questions": [
                        {"id": "mc", "type": "multiple_choice", "text": "pick",
                         "options": ["x", "y"], "correctAnswer": 1},
                        {"id": "cb", "type": "checkboxes", "text": "many",
                         "options": ["x", "y", "z"], "answer": [0, 1]}
                    ]},
                    {"title": "B", "questions": [
                        {"id": "sa", "type": "short_answer", "text": "word",
                         "correctAnswer": "ok", "sentenceLimit": 2},
                        {"id": "pg", "type": "paragraph", "text": "essay",
                         "requiresManualGrading": true}
                    ]}
                ]
            }),
            &mut SequentialIds::default(),
        )
    }

    fn contains_answer_key(value: &Value) -> bool {
        match value {
            Value::Object(map) => {
                map.contains_key("correctAnswer")
                    || map.contains_key("answer")
                    || map.values().any(contains_answer_key)
            }
            Value::Array(items) => items.iter().any(contains_answer_key),
            _ => false,
        }
    }

    #[test]
    fn keeps_structure_and_order() {
        let pages = sample_pages();
        let redacted = redact_pages(&pages);
        assert_eq!(redacted.len(), pages.len());
        for (original, view) in pages.iter().zip(&redacted) {
            assert_eq!(original.id, view.id);
            assert_eq!(original.title, view.title);
            let original_ids: Vec<_> = original.questions.iter().map(|q| &q.id).collect();
            let view_ids: Vec<_> = view.questions.iter().map(|q| &q.id).collect();
            assert_eq!(original_ids, view_ids);
        }
    }

    #[test]
    fn output_has_no_answer_fields() {
        let full = serde_json::to_value(sample_pages()).unwrap();
        assert!(contains_answer_key(&full));

        let redacted = serde_json::to_value(redact_pages(&sample_pages())).unwrap();
        assert!(!contains_answer_key(&redacted));
        assert_eq!(redacted[0]["questions"][0]["options"], json!(["x", "y"]));
        assert_eq!(redacted[0]["questions"][0]["type"], "multiple_choice");
        assert_eq!(redacted[1]["questions"][0]["sentenceLimit"], 2);
        assert_eq!(redacted[1]["questions"][1]["requiresManualGrading"], true);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(redact_pages(&[]).is_empty());
    }
}
