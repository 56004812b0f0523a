use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};

use crate::services::{Artifact, TextCapability};
use crate::vendor::direct::DirectClient;
use crate::vendor::envelope::string_at;
use crate::vendor::VendorError;

/// Resume rewriting. One signed POST; the text travels base64-encoded in both
/// directions.
pub struct ResumeFacade {
    client: DirectClient,
}

impl ResumeFacade {
    pub fn new(client: DirectClient) -> Self {
        Self { client }
    }

    pub async fn optimize(&self, text: &str) -> Result<Artifact, VendorError> {
        let payload = self.client.post(self.body(text)).await?;
        decode_result(&payload).map(Artifact::Text)
    }

    fn body(&self, text: &str) -> Value {
        json!({
            "header": {
                "app_id": self.client.app_id(),
                "status": 3,
            },
            "parameter": {
                "ai_resume": {
                    "resData": {
                        "encoding": "utf8",
                        "compress": "raw",
                        "format": "json",
                    }
                }
            },
            "payload": {
                "reqData": {
                    "encoding": "utf8",
                    "compress": "raw",
                    "format": "plain",
                    "status": 3,
                    "text": STANDARD.encode(text.as_bytes()),
                }
            }
        })
    }
}

fn decode_result(payload: &Value) -> Result<String, VendorError> {
    let encoded = string_at(payload, "/resData/text")?;
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| VendorError::Parse(format!("resume text is not valid base64: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| VendorError::Parse(format!("resume text is not valid UTF-8: {e}")))
}

#[async_trait]
impl TextCapability for ResumeFacade {
    async fn run(&self, text: &str) -> Result<Artifact, VendorError> {
        self.optimize(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendor::job::tests::ScriptedTransport;
    use crate::vendor::transport::RequestBody;
    use crate::vendor::Credentials;
    use std::sync::Arc;

    fn facade(transport: Arc<ScriptedTransport>) -> ResumeFacade {
        let creds = Credentials::new("app123", "key789", "secret456").unwrap();
        ResumeFacade::new(
            DirectClient::new(transport, creds, "https://api.example.com/v1/private/resume")
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_optimize_decodes_result() {
        let transport = ScriptedTransport::new(vec![Ok(json!({
            "header": {"code": 0},
            "payload": {"resData": {"text": "aGVsbG8="}}
        }))]);

        let artifact = facade(transport).optimize("my resume").await.unwrap();
        assert_eq!(artifact, Artifact::Text("hello".to_string()));
    }

    #[tokio::test]
    async fn test_optimize_encodes_request_text() {
        let transport = ScriptedTransport::new(vec![Ok(json!({
            "header": {"code": 0},
            "payload": {"resData": {"text": "5L2g5aW977yM5LiW55WM"}}
        }))]);

        let artifact = facade(transport.clone()).optimize("你好，世界").await.unwrap();
        assert_eq!(artifact.as_str(), "你好，世界");

        match &transport.request(0).body {
            RequestBody::Json(body) => {
                assert_eq!(body["header"]["app_id"], "app123");
                assert_eq!(body["payload"]["reqData"]["text"], "5L2g5aW977yM5LiW55WM");
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_optimize_non_zero_code_is_remote_error() {
        let transport = ScriptedTransport::new(vec![Ok(json!({
            "header": {"code": 10163, "message": "invalid text"}
        }))]);
        let err = facade(transport).optimize("x").await.unwrap_err();
        assert!(matches!(err, VendorError::Remote { code: 10163, .. }));
    }

    #[tokio::test]
    async fn test_optimize_rejects_bad_base64() {
        let transport = ScriptedTransport::new(vec![Ok(json!({
            "header": {"code": 0},
            "payload": {"resData": {"text": "%%%"}}
        }))]);
        let err = facade(transport).optimize("x").await.unwrap_err();
        assert!(matches!(err, VendorError::Parse(_)));
    }
}
