use async_trait::async_trait;
use docflow_core::{LLMProvider, LLMResponse};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Deterministic provider that replays canned replies in order.
///
/// Once the queue is empty it answers with the repeating reply, or fails when
/// none was configured. Every prompt it receives is recorded.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    repeating: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            ..Self::default()
        }
    }

    /// Answer every prompt with the same reply.
    pub fn repeating(reply: impl Into<String>) -> Self {
        Self {
            repeating: Some(reply.into()),
            ..Self::default()
        }
    }

    /// Queue a transport failure after the replies queued so far.
    #[must_use]
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(message.into()));
        self
    }

    /// Queue another reply after those queued so far.
    #[must_use]
    pub fn then_reply(self, reply: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(reply.into()));
        self
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn generate_content(&self, prompt: &str) -> anyhow::Result<LLMResponse> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        let next = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        let content = match (next, &self.repeating) {
            (Some(Ok(reply)), _) => reply,
            (Some(Err(message)), _) => anyhow::bail!(message),
            (None, Some(reply)) => reply.clone(),
            (None, None) => anyhow::bail!("scripted provider has no reply left"),
        };

        Ok(LLMResponse {
            content,
            usage: None,
        })
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
