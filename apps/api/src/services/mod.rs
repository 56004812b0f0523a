// Capability facades: one per external AI service, each a single call from
// user text to an Artifact. All vendor I/O goes through `crate::vendor`.

pub mod chat;
pub mod image;
pub mod ppt;
pub mod prompts;
pub mod registry;
pub mod resume;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::vendor::VendorError;

/// Final output of a capability call. Nothing is persisted locally; the caller
/// owns it from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Artifact {
    /// Remote download location (generated decks).
    Url(String),
    /// `data:` URI with the payload inlined (generated images).
    DataUrl(String),
    /// Decoded text (chat, translation, resume rewriting).
    Text(String),
}

impl Artifact {
    pub fn as_str(&self) -> &str {
        match self {
            Artifact::Url(s) | Artifact::DataUrl(s) | Artifact::Text(s) => s,
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform entry point the capability registry dispatches to.
#[async_trait]
pub trait TextCapability: Send + Sync {
    async fn run(&self, text: &str) -> Result<Artifact, VendorError>;
}
