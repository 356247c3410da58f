//! services/api/src/adapters/plan_llm.rs
//!
//! This module contains the adapter for the study-plan LLM behind `/api/plan`.
//! It implements the `PlanGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use studyai_core::ports::{GatewayError, PlanGenerationService};
use studyai_core::prompt::build_plan_prompt;

use crate::adapters::question_llm::classify_gateway_error;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `PlanGenerationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiPlanAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiPlanAdapter {
    /// Creates a new `OpenAiPlanAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `PlanGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PlanGenerationService for OpenAiPlanAdapter {
    /// Generates a short free-text plan for the given goal.
    async fn generate_plan(&self, goal: &str) -> Result<String, GatewayError> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(
                    "You are a practical coach for university students. Reply with a concrete, \
                     day-by-day plan in plain text, no markdown tables.",
                )
                .build()
                .map_err(|e| GatewayError::Unknown(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_plan_prompt(goal))
                .build()
                .map_err(|e| GatewayError::Unknown(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| GatewayError::Unknown(e.to_string()))?;

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify_gateway_error)?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(GatewayError::Unknown(
                    "plan LLM response contained no text content".to_string(),
                ))
            }
        } else {
            Err(GatewayError::Unknown(
                "plan LLM returned no choices in its response".to_string(),
            ))
        }
    }
}
