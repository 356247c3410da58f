//! crates/studyai_core/src/prompt.rs
//!
//! Builds the fixed instruction text submitted to the model gateway.
//! The text is constant for a given question count; document bytes are
//! attached to the gateway call separately and are never templated in.
//! Keeping the instruction static and schema-first is what makes the
//! reply machine-parseable often enough to be useful.

const QUESTION_PROMPT_TEMPLATE: &str = r#"You are an exam writer. Read the attached study documents and write exactly {count} exam-style multiple-choice questions covering their most important content.

Respond with ONLY one JSON array and nothing else. Each element must be an object with exactly these fields:
- "question": the question text (non-empty string)
- "options": an array of exactly 4 answer option strings
- "correctAnswer": the 0-based integer index of the correct option
- "explanation": one or two sentences explaining why the correct option is right

Rules:
- Do not wrap the array in a markdown code fence.
- Do not add any prose, headings, or commentary before or after the array.
- Every question must be answerable from the attached documents alone.
- Options must be plausible; avoid "all of the above" style filler."#;

/// Builds the instruction for one question-generation call.
pub fn build_question_prompt(question_count: u32) -> String {
    QUESTION_PROMPT_TEMPLATE.replace("{count}", &question_count.to_string())
}

/// Builds the free-text study-plan prompt backing `/api/plan`.
pub fn build_plan_prompt(goal: &str) -> String {
    format!(
        "Create a 3-day meal and workout plan for a student with the goal: {}",
        goal
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_prompt_is_deterministic() {
        assert_eq!(build_question_prompt(5), build_question_prompt(5));
    }

    #[test]
    fn question_prompt_carries_the_requested_count() {
        let prompt = build_question_prompt(12);
        assert!(prompt.contains("exactly 12 "));
        assert!(!prompt.contains("{count}"));
    }

    #[test]
    fn question_prompt_names_every_schema_field() {
        let prompt = build_question_prompt(3);
        for field in ["question", "options", "correctAnswer", "explanation"] {
            assert!(prompt.contains(field), "prompt is missing '{}'", field);
        }
    }

    #[test]
    fn plan_prompt_embeds_the_goal() {
        let prompt = build_plan_prompt("gain muscle before summer");
        assert!(prompt.contains("gain muscle before summer"));
        assert!(prompt.contains("3-day"));
    }
}
