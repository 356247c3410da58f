//! crates/studyai_core/src/parser.rs
//!
//! Turns the raw gateway reply into validated [`Question`]s. The model is the
//! least trustworthy input in the system: it may wrap the array in a markdown
//! fence, apologize in prose, or emit records that violate the schema. This
//! module strips a single fence pair, parses the remainder with serde_json
//! (model text is data, never code), and validates every record. Validation
//! is all-or-nothing: one bad record rejects the whole batch, with every
//! violation collected into the error so nothing has to be guessed from logs.

use serde::Deserialize;

use crate::domain::Question;
use crate::ports::ParseError;

/// The record shape the prompt asks the model to produce.
#[derive(Debug, Deserialize)]
struct RawQuestionRecord {
    question: String,
    options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    correct_answer: i64,
    explanation: String,
}

/// Strips a single leading markdown code fence (with optional language tag)
/// and, when one was found, a single trailing closing fence.
///
/// A boundary operation only: nothing inside the text is rewritten, and a
/// reply without a leading fence passes through trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let rest = match text.strip_prefix("```") {
        Some(rest) => rest,
        None => return text,
    };
    // The opening fence may carry a language tag, e.g. "```json".
    let tag_len = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .count();
    let body = rest[tag_len..].trim_start();
    match body.trim_end().strip_suffix("```") {
        Some(inner) => inner.trim(),
        None => body.trim_end(),
    }
}

/// Parses a raw gateway reply into an ordered batch of questions.
///
/// Ordinals are assigned 1-based in array order. Any structural failure or
/// per-record violation yields [`ParseError::Malformed`] carrying the raw
/// reply for diagnostics; partial batches are never returned.
pub fn parse_question_reply(raw: &str) -> Result<Vec<Question>, ParseError> {
    let cleaned = strip_code_fence(raw);

    let records: Vec<RawQuestionRecord> =
        serde_json::from_str(cleaned).map_err(|e| ParseError::Malformed {
            reason: format!("reply is not a JSON array of question records: {}", e),
            raw_reply: raw.to_string(),
        })?;

    let mut violations = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        let position = idx + 1;
        if record.question.trim().is_empty() {
            violations.push(format!("record {}: question text is empty", position));
        }
        if record.options.len() < 2 {
            violations.push(format!(
                "record {}: {} option(s), need at least 2",
                position,
                record.options.len()
            ));
        }
        if record.correct_answer < 0
            || record.correct_answer as usize >= record.options.len()
        {
            violations.push(format!(
                "record {}: correctAnswer {} does not index {} option(s)",
                position,
                record.correct_answer,
                record.options.len()
            ));
        }
    }
    if !violations.is_empty() {
        return Err(ParseError::Malformed {
            reason: violations.join("; "),
            raw_reply: raw.to_string(),
        });
    }

    Ok(records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| Question {
            ordinal: (idx + 1) as u32,
            text: record.question,
            options: record.options,
            correct_option_index: record.correct_answer as usize,
            explanation: record.explanation,
        })
        .collect())
}
