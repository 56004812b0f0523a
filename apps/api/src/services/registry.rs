//! Capability lookup table. Requests name a capability by its numeric
//! function code; the registry resolves it to the facade that serves it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::services::chat::{ChatFacade, PromptedChat};
use crate::services::image::ImageFacade;
use crate::services::ppt::DocumentGenerationFacade;
use crate::services::prompts::{
    CODE_WRITING_PROMPT, STORY_EXPANSION_PROMPT, TEXT_CORRECTION_PROMPT, TRANSLATE_EN_TO_ZH_PROMPT,
    TRANSLATE_ZH_TO_EN_PROMPT,
};
use crate::services::resume::ResumeFacade;
use crate::services::{Artifact, TextCapability};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Chat,
    Presentation,
    ResumeOptimization,
    TextCorrection,
    TranslateZhToEn,
    TranslateEnToZh,
    CodeWriting,
    StoryWriting,
    ImageGeneration,
}

impl Capability {
    /// Function codes used by clients. No code means plain chat; 1 and 2 are
    /// both deck generation.
    pub fn from_code(code: Option<i64>) -> Option<Self> {
        Some(match code {
            None => Capability::Chat,
            Some(1) | Some(2) => Capability::Presentation,
            Some(3) => Capability::ResumeOptimization,
            Some(4) => Capability::TextCorrection,
            Some(5) => Capability::TranslateZhToEn,
            Some(6) => Capability::TranslateEnToZh,
            Some(7) => Capability::CodeWriting,
            Some(8) => Capability::StoryWriting,
            Some(9) => Capability::ImageGeneration,
            Some(_) => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Capability::Chat => "chat",
            Capability::Presentation => "presentation",
            Capability::ResumeOptimization => "resume_optimization",
            Capability::TextCorrection => "text_correction",
            Capability::TranslateZhToEn => "translate_zh_to_en",
            Capability::TranslateEnToZh => "translate_en_to_zh",
            Capability::CodeWriting => "code_writing",
            Capability::StoryWriting => "story_writing",
            Capability::ImageGeneration => "image_generation",
        }
    }
}

#[derive(Default, Clone)]
pub struct CapabilityRegistry {
    handlers: HashMap<Capability, Arc<dyn TextCapability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard wiring: every capability backed by one of the four facades.
    pub fn standard(
        chat: Arc<ChatFacade>,
        presentation: Arc<DocumentGenerationFacade>,
        resume: Arc<ResumeFacade>,
        image: Arc<ImageFacade>,
    ) -> Self {
        let prompted = |template| Arc::new(PromptedChat::new(chat.clone(), template));
        Self::new()
            .register(Capability::Chat, chat.clone())
            .register(Capability::Presentation, presentation)
            .register(Capability::ResumeOptimization, resume)
            .register(Capability::TextCorrection, prompted(TEXT_CORRECTION_PROMPT))
            .register(Capability::TranslateZhToEn, prompted(TRANSLATE_ZH_TO_EN_PROMPT))
            .register(Capability::TranslateEnToZh, prompted(TRANSLATE_EN_TO_ZH_PROMPT))
            .register(Capability::CodeWriting, prompted(CODE_WRITING_PROMPT))
            .register(Capability::StoryWriting, prompted(STORY_EXPANSION_PROMPT))
            .register(Capability::ImageGeneration, image)
    }

    pub fn register(mut self, capability: Capability, handler: Arc<dyn TextCapability>) -> Self {
        self.handlers.insert(capability, handler);
        self
    }

    pub fn resolve(&self, code: Option<i64>) -> Result<(Capability, Arc<dyn TextCapability>), AppError> {
        let unknown = || AppError::UnknownCapability(code.map_or("none".to_string(), |c| c.to_string()));
        let capability = Capability::from_code(code).ok_or_else(unknown)?;
        let handler = self.handlers.get(&capability).cloned().ok_or_else(unknown)?;
        Ok((capability, handler))
    }

    pub async fn dispatch(
        &self,
        code: Option<i64>,
        text: &str,
    ) -> Result<(Capability, Artifact), AppError> {
        let (capability, handler) = self.resolve(code)?;
        info!("Dispatching {} request ({} chars)", capability.name(), text.chars().count());
        let artifact = handler.run(text).await?;
        Ok((capability, artifact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendor::VendorError;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl TextCapability for Echo {
        async fn run(&self, text: &str) -> Result<Artifact, VendorError> {
            Ok(Artifact::Text(text.to_uppercase()))
        }
    }

    #[test]
    fn test_function_codes() {
        assert_eq!(Capability::from_code(None), Some(Capability::Chat));
        assert_eq!(Capability::from_code(Some(1)), Some(Capability::Presentation));
        assert_eq!(Capability::from_code(Some(2)), Some(Capability::Presentation));
        assert_eq!(Capability::from_code(Some(6)), Some(Capability::TranslateEnToZh));
        assert_eq!(Capability::from_code(Some(9)), Some(Capability::ImageGeneration));
        assert_eq!(Capability::from_code(Some(0)), None);
        assert_eq!(Capability::from_code(Some(42)), None);
    }

    #[tokio::test]
    async fn test_dispatch_uses_table() {
        let registry = CapabilityRegistry::new().register(Capability::StoryWriting, Arc::new(Echo));
        let (capability, artifact) = registry.dispatch(Some(8), "once").await.unwrap();
        assert_eq!(capability, Capability::StoryWriting);
        assert_eq!(artifact.as_str(), "ONCE");
    }

    #[tokio::test]
    async fn test_unknown_code_is_rejected() {
        let registry = CapabilityRegistry::new().register(Capability::Chat, Arc::new(Echo));
        assert!(matches!(
            registry.dispatch(Some(42), "x").await,
            Err(AppError::UnknownCapability(code)) if code == "42"
        ));
    }

    #[tokio::test]
    async fn test_unregistered_capability_is_rejected() {
        let registry = CapabilityRegistry::new().register(Capability::Chat, Arc::new(Echo));
        assert!(matches!(
            registry.dispatch(Some(3), "x").await,
            Err(AppError::UnknownCapability(_))
        ));
    }
}
