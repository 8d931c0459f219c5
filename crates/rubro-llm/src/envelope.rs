//! Response envelopes of the supported contracts

use crate::config::ProviderContract;
use crate::LlmError;
use serde::Deserialize;

/// Assistant message as returned by either contract
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    /// Message text; some servers send `null`
    #[serde(default)]
    pub content: Option<String>,
}

/// One choice of a chat-completions answer
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The assistant message
    pub message: AssistantMessage,
}

/// Decoded response body
#[derive(Debug, Clone)]
pub enum ResponseEnvelope {
    /// `{"choices": [{"message": {"content": ...}}]}`
    ChatCompletion {
        /// Returned choices
        choices: Vec<Choice>,
    },
    /// `{"message": {"content": ...}}`
    Message {
        /// The assistant message
        message: AssistantMessage,
    },
}

#[derive(Deserialize)]
struct ChatCompletionBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct MessageBody {
    message: AssistantMessage,
}

impl ResponseEnvelope {
    /// Decode a response body according to the contract
    pub fn decode(contract: ProviderContract, body: &str) -> Result<Self, LlmError> {
        match contract {
            ProviderContract::OpenAiCompat => serde_json::from_str::<ChatCompletionBody>(body)
                .map(|b| ResponseEnvelope::ChatCompletion { choices: b.choices }),
            ProviderContract::Ollama => serde_json::from_str::<MessageBody>(body)
                .map(|b| ResponseEnvelope::Message { message: b.message }),
        }
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    /// Extract the trimmed assistant text
    pub fn into_content(self) -> Result<String, LlmError> {
        let message = match self {
            ResponseEnvelope::ChatCompletion { choices } => choices
                .into_iter()
                .next()
                .map(|c| c.message)
                .ok_or_else(|| LlmError::InvalidResponse("Response has no choices".to_string()))?,
            ResponseEnvelope::Message { message } => message,
        };
        message
            .content
            .map(|c| c.trim().to_string())
            .ok_or_else(|| LlmError::InvalidResponse("Message has no content".to_string()))
    }
}
