use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::services::prompts::render;
use crate::services::{Artifact, TextCapability};
use crate::vendor::direct::DirectClient;
use crate::vendor::envelope::string_at;
use crate::vendor::VendorError;

const TEMPERATURE: f64 = 0.5;
const MAX_TOKENS: u32 = 4096;

/// Non-streaming chat completion.
pub struct ChatFacade {
    client: DirectClient,
    domain: String,
}

impl ChatFacade {
    pub fn new(client: DirectClient, domain: impl Into<String>) -> Self {
        Self {
            client,
            domain: domain.into(),
        }
    }

    pub async fn complete(&self, prompt: &str) -> Result<Artifact, VendorError> {
        let payload = self.client.post(self.body(prompt)).await?;
        let answer = string_at(&payload, "/choices/text/0/content")?;
        debug!("Chat completion returned {} chars", answer.chars().count());
        Ok(Artifact::Text(answer.to_string()))
    }

    fn body(&self, prompt: &str) -> Value {
        json!({
            "header": {
                "app_id": self.client.app_id(),
                "uid": Uuid::new_v4().simple().to_string(),
            },
            "parameter": {
                "chat": {
                    "domain": self.domain,
                    "temperature": TEMPERATURE,
                    "max_tokens": MAX_TOKENS,
                }
            },
            "payload": {
                "message": {
                    "text": [{"role": "user", "content": prompt}]
                }
            }
        })
    }
}

#[async_trait]
impl TextCapability for ChatFacade {
    async fn run(&self, text: &str) -> Result<Artifact, VendorError> {
        self.complete(text).await
    }
}

/// Chat completion with the user's text wrapped in a fixed prompt template
/// (translation, proofreading, code writing, ...).
pub struct PromptedChat {
    chat: Arc<ChatFacade>,
    template: &'static str,
}

impl PromptedChat {
    pub fn new(chat: Arc<ChatFacade>, template: &'static str) -> Self {
        Self { chat, template }
    }
}

#[async_trait]
impl TextCapability for PromptedChat {
    async fn run(&self, text: &str) -> Result<Artifact, VendorError> {
        self.chat.complete(&render(self.template, text)).await
    }
}
