//! Extraction of question records from raw generation output.
//!
//! The service is asked for a bare JSON array but tends to wrap it in prose or
//! markdown fences. Everything between the first `[` and the last `]` is taken
//! as the payload, so surrounding chatter is ignored.

use crate::error::{ParseError, EXCERPT_CHARS};
use crate::model::QuestionRecord;

/// Parse and validate the question records contained in `raw`.
///
/// Failures are classified as:
/// - [`ParseError::NoJsonFound`]: no `[` or no `]` in the text
/// - [`ParseError::JsonDecode`]: the bracketed payload is not valid JSON
/// - [`ParseError::Unexpected`]: an element is not a valid question record
pub fn parse_questions(raw: &str) -> Result<Vec<QuestionRecord>, ParseError> {
    let (Some(start), Some(end)) = (raw.find('['), raw.rfind(']')) else {
        return Err(ParseError::NoJsonFound {
            excerpt: excerpt(raw),
        });
    };

    if end < start {
        return Err(ParseError::JsonDecode {
            message: "closing bracket precedes opening bracket".into(),
            excerpt: excerpt(raw),
        });
    }

    let payload = &raw[start..=end];
    let values: Vec<serde_json::Value> =
        serde_json::from_str(payload).map_err(|e| ParseError::JsonDecode {
            message: e.to_string(),
            excerpt: excerpt(raw),
        })?;

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let record: QuestionRecord =
                serde_json::from_value(value).map_err(|e| ParseError::Unexpected {
                    message: format!("question {index}: {e}"),
                    excerpt: excerpt(raw),
                })?;
            record.validate().map_err(|e| ParseError::Unexpected {
                message: format!("question {index}: {e}"),
                excerpt: excerpt(raw),
            })?;
            Ok(record)
        })
        .collect()
}

/// The first [`EXCERPT_CHARS`] characters of `raw`.
pub fn excerpt(raw: &str) -> String {
    raw.chars().take(EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerSpec, SelectionMode};

    #[test]
    fn tolerates_surrounding_prose() {
        let raw = r#"Sure, here: [{"question":"Q1","choices":["A","B"],"correct_answer":"A","explanation":"x"}] hope that helps"#;
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].prompt, "Q1");
        assert_eq!(questions[0].choices, vec!["A", "B"]);
        assert_eq!(questions[0].answer_spec, AnswerSpec::Single("A".into()));
        assert_eq!(questions[0].explanation, "x");
    }

    #[test]
    fn tolerates_markdown_fences() {
        let raw = "```json\n[\n  {\"question\": \"Which are primes?\", \"choices\": [\"2\", \"4\", \"5\"], \
                   \"correct_answer\": [\"2\", \"5\"], \"explanation\": \"4 = 2 * 2\"}\n]\n```";
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions[0].selection_mode(), SelectionMode::Multiple);
        assert_eq!(questions[0].answer_spec.choices(), vec!["2", "5"]);
    }

    #[test]
    fn no_brackets_is_no_json_found() {
        let err = parse_questions("I cannot help with that.").unwrap_err();
        match err {
            ParseError::NoJsonFound { excerpt } => assert_eq!(excerpt, "I cannot help with that."),
            other => panic!("expected NoJsonFound, got {other:?}"),
        }

        assert!(matches!(
            parse_questions("only an opening [ bracket"),
            Err(ParseError::NoJsonFound { .. })
        ));
        assert!(matches!(
            parse_questions("only a closing ] bracket"),
            Err(ParseError::NoJsonFound { .. })
        ));
    }

    #[test]
    fn malformed_interior_is_json_decode() {
        let err = parse_questions(r#"[{"question": "Q1", "choices": ["A",}]"#).unwrap_err();
        assert!(matches!(err, ParseError::JsonDecode { .. }));
        assert!(err.to_string().starts_with("JSON parsing error"));

        let reversed = parse_questions("] backwards [").unwrap_err();
        assert!(matches!(reversed, ParseError::JsonDecode { .. }));
    }

    #[test]
    fn missing_field_is_unexpected() {
        let raw = r#"[{"question":"Q1","choices":["A","B"],"correct_answer":"A","explanation":"x"},
                     {"question":"Q2","choices":["A","B"],"explanation":"y"}]"#;
        let err = parse_questions(raw).unwrap_err();
        match &err {
            ParseError::Unexpected { message, .. } => {
                assert!(message.starts_with("question 1:"), "{message}");
                assert!(message.contains("correct_answer"), "{message}");
            }
            other => panic!("expected Unexpected, got {other:?}"),
        }
    }

    #[test]
    fn invalid_record_is_unexpected() {
        let raw = r#"[{"question":"Q1","choices":["A","B"],"correct_answer":"C","explanation":"x"}]"#;
        let err = parse_questions(raw).unwrap_err();
        assert!(matches!(err, ParseError::Unexpected { .. }));
        assert!(err.to_string().contains("not one of the choices"));

        let numeric_answer = r#"[{"question":"Q1","choices":["1"],"correct_answer":1,"explanation":""}]"#;
        assert!(matches!(
            parse_questions(numeric_answer),
            Err(ParseError::Unexpected { .. })
        ));
    }

    #[test]
    fn empty_array_parses_to_nothing() {
        assert!(parse_questions("No questions: []").unwrap().is_empty());
    }

    #[test]
    fn excerpt_is_bounded_in_characters() {
        let raw = "é".repeat(EXCERPT_CHARS + 100);
        let err = parse_questions(&raw).unwrap_err();
        assert_eq!(err.excerpt().chars().count(), EXCERPT_CHARS);
        assert_eq!(excerpt("short"), "short");
    }
}
