//! crates/trivia_core/src/convert.rs
//!
//! The parse-and-validate step between the external model and the rest of
//! the system. The model is asked for a JSON array of question objects; this
//! module turns that text into well-formed [`TriviaQuestion`]s or rejects the
//! response wholesale. Defaulting rules are explicit policy:
//!
//! - missing or non-string `question` becomes `"Question N"` (1-based)
//! - a non-array `options` field is treated as empty, then every option list
//!   is normalized to exactly four slots (truncate extras, pad with "")
//! - a non-numeric `correct_answer` is parsed as an integer, defaulting to 0;
//!   out-of-range indices also default to 0
//!
//! Anything that does not parse as a JSON array fails the whole conversion.
//! No partial question sets are accepted.

use serde_json::Value;

use crate::domain::{TriviaQuestion, OPTION_COUNT};

/// Why a model response could not be turned into a question set.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("upstream model call failed: {0}")]
    Upstream(String),
    #[error("model response was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("model response must be a JSON array of question objects")]
    NotAnArray,
}

/// Parses a raw model response into a question set.
pub fn parse_question_set(raw: &str) -> Result<Vec<TriviaQuestion>, ConversionError> {
    let value: Value = serde_json::from_str(raw)?;
    let items = value.as_array().ok_or(ConversionError::NotAnArray)?;

    Ok(items
        .iter()
        .enumerate()
        .map(|(index, item)| coerce_question(item, index))
        .collect())
}

/// Coerces one array element to the question shape, applying the defaulting
/// policy above. `index` is the element's 0-based position.
fn coerce_question(item: &Value, index: usize) -> TriviaQuestion {
    let question = match item.get("question").and_then(Value::as_str) {
        Some(text) if !text.is_empty() => text.to_owned(),
        _ => format!("Question {}", index + 1),
    };

    let mut options: Vec<String> = match item.get("options").and_then(Value::as_array) {
        Some(values) => values
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        None => Vec::new(),
    };
    options.truncate(OPTION_COUNT);
    options.resize(OPTION_COUNT, String::new());

    let correct_answer = parse_correct_answer(item.get("correct_answer"));

    TriviaQuestion {
        question,
        options,
        correct_answer,
    }
}

fn parse_correct_answer(value: Option<&Value>) -> usize {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_u64().map(|n| n as usize),
        Some(Value::String(s)) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    match parsed {
        Some(index) if index < OPTION_COUNT => index,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_response() {
        let raw = r#"[
            {"question": "Capital of France?", "options": ["Paris", "Lyon", "Nice", "Lille"], "correct_answer": 0},
            {"question": "2 + 2?", "options": ["3", "4", "5", "6"], "correct_answer": 1}
        ]"#;

        let questions = parse_question_set(raw).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question, "Capital of France?");
        assert_eq!(questions[1].correct_answer, 1);
        assert!(questions.iter().all(TriviaQuestion::is_well_formed));
    }

    #[test]
    fn non_json_input_fails_the_whole_conversion() {
        let err = parse_question_set("I could not generate a quiz, sorry!").unwrap_err();
        assert!(matches!(err, ConversionError::InvalidJson(_)));
    }

    #[test]
    fn a_json_object_is_not_a_question_set() {
        let err = parse_question_set(r#"{"question": "lonely"}"#).unwrap_err();
        assert!(matches!(err, ConversionError::NotAnArray));
    }

    #[test]
    fn missing_question_text_gets_a_positional_placeholder() {
        let raw = r#"[{"options": ["a", "b", "c", "d"], "correct_answer": 2}, {"question": ""}]"#;
        let questions = parse_question_set(raw).unwrap();
        assert_eq!(questions[0].question, "Question 1");
        assert_eq!(questions[1].question, "Question 2");
    }

    #[test]
    fn non_array_options_coerce_to_four_empty_slots() {
        let raw = r#"[{"question": "Q", "options": "not a list", "correct_answer": 0}]"#;
        let questions = parse_question_set(raw).unwrap();
        assert_eq!(questions[0].options, vec!["", "", "", ""]);
    }

    #[test]
    fn option_lists_are_normalized_to_exactly_four() {
        let raw = r#"[
            {"question": "short", "options": ["a", "b"], "correct_answer": 0},
            {"question": "long", "options": ["a", "b", "c", "d", "e", "f"], "correct_answer": 0}
        ]"#;
        let questions = parse_question_set(raw).unwrap();
        assert_eq!(questions[0].options, vec!["a", "b", "", ""]);
        assert_eq!(questions[1].options, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn correct_answer_strings_are_parsed_with_zero_fallback() {
        let raw = r#"[
            {"question": "Q1", "options": ["a","b","c","d"], "correct_answer": "3"},
            {"question": "Q2", "options": ["a","b","c","d"], "correct_answer": "banana"},
            {"question": "Q3", "options": ["a","b","c","d"]},
            {"question": "Q4", "options": ["a","b","c","d"], "correct_answer": 9}
        ]"#;
        let questions = parse_question_set(raw).unwrap();
        assert_eq!(questions[0].correct_answer, 3);
        assert_eq!(questions[1].correct_answer, 0);
        assert_eq!(questions[2].correct_answer, 0);
        assert_eq!(questions[3].correct_answer, 0);
    }

    #[test]
    fn non_string_option_values_are_stringified() {
        let raw = r#"[{"question": "Q", "options": [1, true, "three", null], "correct_answer": 0}]"#;
        let questions = parse_question_set(raw).unwrap();
        assert_eq!(questions[0].options, vec!["1", "true", "three", "null"]);
    }
}
