//! services/api/src/adapters/trivia_llm.rs
//!
//! This module contains the adapter for the trivia-generating LLM.
//! It implements the `TriviaGenerationService` port from the `core` crate:
//! one chat completion per document, whose response is handed to the core
//! parse-and-validate step. No timeout or retry policy lives here; a failed
//! call surfaces to the initiating user as a failed conversion.

const SYSTEM_INSTRUCTIONS: &str = "You are a quiz author. You convert documents into \
multiple-choice trivia and respond with JSON only, never with prose or markdown.";

const USER_INPUT_TEMPLATE: &str = r#"Convert the following document into a quiz/trivia format. Extract key information and create 10-20 multiple choice questions. Each question should have:
- A clear, concise question
- Exactly 4 answer options
- The correct answer index (0-3)

Format your response as a valid JSON array of objects with this exact structure:
[
  {
    "question": "Question text here",
    "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
    "correct_answer": 0
  }
]

Document content:
{document}

Return only the JSON array, no additional text or markdown formatting."#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use trivia_core::convert::{parse_question_set, ConversionError};
use trivia_core::domain::TriviaQuestion;
use trivia_core::ports::TriviaGenerationService;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TriviaGenerationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiTriviaAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTriviaAdapter {
    /// Creates a new `OpenAiTriviaAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Models often wrap JSON in markdown code fences despite being told not
    /// to; strip them before parsing.
    fn strip_code_fences(text: &str) -> String {
        let fence_regex = Regex::new(r"```(?:json)?\n?").unwrap();
        fence_regex.replace_all(text, "").trim().to_string()
    }
}

//=========================================================================================
// `TriviaGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TriviaGenerationService for OpenAiTriviaAdapter {
    async fn generate_questions(
        &self,
        document_text: &str,
    ) -> Result<Vec<TriviaQuestion>, ConversionError> {
        let user_input = USER_INPUT_TEMPLATE.replace("{document}", document_text);

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| ConversionError::Upstream(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()
                .map_err(|e| ConversionError::Upstream(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| ConversionError::Upstream(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| ConversionError::Upstream(e.to_string()))?;

        let raw = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        let cleaned = Self::strip_code_fences(&raw);
        parse_question_set(&cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_code_fences() {
        let fenced = "```json\n[{\"question\": \"Q\"}]\n```";
        assert_eq!(
            OpenAiTriviaAdapter::strip_code_fences(fenced),
            "[{\"question\": \"Q\"}]"
        );
    }

    #[test]
    fn leaves_bare_json_untouched() {
        let bare = "[{\"question\": \"Q\"}]";
        assert_eq!(OpenAiTriviaAdapter::strip_code_fences(bare), bare);
    }
}
