use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::services::{Artifact, TextCapability};
use crate::vendor::direct::DirectClient;
use crate::vendor::envelope::string_at;
use crate::vendor::VendorError;

pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Text-to-image. The vendor answers with a base64 JPEG which is handed back
/// as a `data:` URI; nothing is written to disk.
pub struct ImageFacade {
    client: DirectClient,
}

impl ImageFacade {
    pub fn new(client: DirectClient) -> Self {
        Self { client }
    }

    pub async fn generate(&self, description: &str) -> Result<Artifact, VendorError> {
        let payload = self.client.post(self.body(description)).await?;
        let image = string_at(&payload, "/choices/text/0/content")?;
        Ok(Artifact::DataUrl(format!("{DATA_URL_PREFIX}{image}")))
    }

    fn body(&self, description: &str) -> Value {
        json!({
            "header": {
                "app_id": self.client.app_id(),
                "uid": Uuid::new_v4().simple().to_string(),
            },
            "parameter": {
                "chat": {
                    "domain": "general",
                    "temperature": 0.5,
                    "max_tokens": 4096,
                }
            },
            "payload": {
                "message": {
                    "text": [{"role": "user", "content": description}]
                }
            }
        })
    }
}

#[async_trait]
impl TextCapability for ImageFacade {
    async fn run(&self, text: &str) -> Result<Artifact, VendorError> {
        self.generate(text).await
    }
}
