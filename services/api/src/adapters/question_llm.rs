//! services/api/src/adapters/question_llm.rs
//!
//! This module contains the adapter for the question-generating LLM.
//! It implements the `QuestionGenerationService` port from the `core` crate
//! using the OpenAI Responses API: the uploaded documents travel as input
//! parts of a single user message, the instruction rides separately, and the
//! raw reply text is returned untouched for the parser to judge.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::responses::{
        ContentType, CreateResponseArgs, Input, InputContent, InputFileArgs, InputItem,
        InputMessageArgs, InputText, Role,
    },
    Client,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use studyai_core::domain::DocumentPayload;
use studyai_core::ports::{GatewayError, QuestionGenerationService};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `QuestionGenerationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiQuestionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiQuestionAdapter {
    /// Creates a new `OpenAiQuestionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Text-like payloads are inlined for the model to read directly; everything
/// else is attached as a base64 file part.
fn is_text_like(mime_type: &str) -> bool {
    mime_type.starts_with("text/") || mime_type == "application/json"
}

/// Maps an API failure message onto the gateway taxonomy. The HTTP status is
/// not exposed by the client library, so classification reads the message.
fn classify_api_message(message: &str) -> GatewayError {
    let lowered = message.to_lowercase();
    if lowered.contains("api key") || lowered.contains("unauthorized") {
        GatewayError::Unauthorized
    } else if lowered.contains("quota") || lowered.contains("rate limit") {
        GatewayError::Quota
    } else {
        GatewayError::Unknown(message.to_string())
    }
}

pub(crate) fn classify_gateway_error(err: OpenAIError) -> GatewayError {
    match err {
        OpenAIError::ApiError(api) => classify_api_message(&api.message),
        OpenAIError::Reqwest(e) => GatewayError::Network(e.to_string()),
        other => GatewayError::Unknown(other.to_string()),
    }
}

//=========================================================================================
// `QuestionGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl QuestionGenerationService for OpenAiQuestionAdapter {
    /// Submits the documents and instruction in one Responses API call and
    /// returns the raw reply text.
    async fn generate_questions(
        &self,
        documents: &[DocumentPayload],
        instruction: &str,
    ) -> Result<String, GatewayError> {
        let mut parts: Vec<ContentType> = Vec::with_capacity(documents.len());
        for doc in documents {
            if is_text_like(&doc.mime_type) {
                let text = String::from_utf8_lossy(&doc.bytes);
                parts.push(ContentType::InputText(InputText {
                    text: format!("Document: {}\n\n{}", doc.filename, text),
                }));
            } else {
                let data_url = format!(
                    "data:{};base64,{}",
                    doc.mime_type,
                    BASE64_STANDARD.encode(&doc.bytes)
                );
                parts.push(ContentType::InputFile(
                    InputFileArgs::default()
                        .filename(doc.filename.clone())
                        .file_data(data_url)
                        .build()
                        .map_err(|e| GatewayError::Unknown(e.to_string()))?,
                ));
            }
        }

        let message = InputMessageArgs::default()
            .role(Role::User)
            .content(InputContent::InputItemContentList(parts))
            .build()
            .map_err(|e| GatewayError::Unknown(e.to_string()))?;

        let request = CreateResponseArgs::default()
            .model(&self.model)
            .instructions(instruction)
            .input(Input::Items(vec![InputItem::Message(message)]))
            .build()
            .map_err(|e| GatewayError::Unknown(e.to_string()))?;

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .responses()
            .create(request)
            .await
            .map_err(classify_gateway_error)?;

        Ok(response.output_text.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_payloads_are_inlined_and_binaries_are_not() {
        assert!(is_text_like("text/plain"));
        assert!(is_text_like("text/markdown"));
        assert!(is_text_like("application/json"));
        assert!(!is_text_like("application/pdf"));
        assert!(!is_text_like("image/png"));
    }

    #[test]
    fn credential_failures_classify_as_unauthorized() {
        let err = classify_api_message("Incorrect API key provided: sk-***");
        assert!(matches!(err, GatewayError::Unauthorized));
    }

    #[test]
    fn quota_failures_classify_as_quota() {
        assert!(matches!(
            classify_api_message("You exceeded your current quota."),
            GatewayError::Quota
        ));
        assert!(matches!(
            classify_api_message("Rate limit reached for requests"),
            GatewayError::Quota
        ));
    }

    #[test]
    fn unrecognized_failures_keep_their_message() {
        let err = classify_api_message("The model is overloaded.");
        match err {
            GatewayError::Unknown(message) => {
                assert!(message.contains("overloaded"));
            }
            other => panic!("expected Unknown, got {:?}", other),
        }
    }
}
