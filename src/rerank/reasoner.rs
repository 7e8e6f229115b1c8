use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use tracing::debug;

use super::{ReasoningService, RerankError, RerankPrompt};
use crate::retry::RetryPolicy;

/// [`ReasoningService`] backed by any provider `genai` supports.
///
/// The provider is inferred from the model name; credentials come from the provider's
/// usual environment variables (e.g. `OPENAI_API_KEY`, `GEMINI_API_KEY`).
#[derive(Clone)]
pub struct GenaiReasoner {
    client: Client,
    model: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for GenaiReasoner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiReasoner")
            .field("model", &self.model)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl GenaiReasoner {
    pub fn new(model: impl Into<String>, retry: RetryPolicy) -> Result<Self, RerankError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(RerankError::InvalidConfig {
                reason: "rerank model is empty".to_string(),
            });
        }

        Ok(Self {
            client: Client::default(),
            model,
            retry,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, prompt: &RerankPrompt) -> Result<String, RerankError> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(prompt.system.clone()),
            ChatMessage::user(prompt.user.clone()),
        ]);
        let options = ChatOptions::default().with_temperature(0.0);

        let response = self
            .client
            .exec_chat(&self.model, request, Some(&options))
            .await?;

        response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| RerankError::UnusableReply {
                reason: "reply has no text content".to_string(),
            })
    }
}

impl ReasoningService for GenaiReasoner {
    async fn complete(&self, prompt: &RerankPrompt) -> Result<String, RerankError> {
        debug!(
            model = %self.model,
            candidates = prompt.candidate_count,
            top_k = prompt.top_k,
            "Requesting ranking"
        );
        Ok(self.retry.run("reasoning", || self.request(prompt)).await?)
    }
}
