//! Upload through the external image endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

use super::types::UploadRequest;
use super::validation::canonical_content_type;

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// Successful answer from the external endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryUpload {
    /// URL of the stored image.
    pub url: String,
    /// Provider the endpoint used behind the scenes, if reported.
    pub provider: Option<String>,
}

/// Soft failures of the external endpoint.
///
/// Every variant sends the orchestrator to the fallback store.
#[derive(Debug, Error)]
pub enum PrimaryUploadError {
    /// Request could not be sent or the connection failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Endpoint answered with a non-success status.
    #[error("endpoint returned {status}{}", status_suffix(.message.as_deref()))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, if any.
        message: Option<String>,
    },

    /// Response body was not the expected JSON.
    #[error("malformed response body: {0}")]
    MalformedBody(String),

    /// Response body had no usable `url`.
    #[error("response body has no url")]
    MissingUrl,
}

fn status_suffix(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

/// Capability to persist an image through the external endpoint.
pub trait PrimaryUploader: Send + Sync {
    /// Upload `request` on behalf of the holder of `token`.
    fn upload(
        &self,
        request: &UploadRequest,
        token: &str,
    ) -> impl Future<Output = Result<PrimaryUpload, PrimaryUploadError>> + Send;
}

/// JSON body returned by the endpoint.
#[derive(Debug, Deserialize)]
struct EndpointResponse {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// `PrimaryUploader` speaking multipart HTTP to the external endpoint.
#[derive(Debug, Clone)]
pub struct HttpPrimaryUploader {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPrimaryUploader {
    /// Create an uploader whose calls time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, PrimaryUploadError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PrimaryUploadError::Transport(e.to_string()))?;

        Ok(Self::with_client(client, endpoint))
    }

    /// Create an uploader around an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(request: &UploadRequest) -> Result<Form, PrimaryUploadError> {
        let mime = canonical_content_type(&request.content_type).unwrap_or("application/octet-stream");
        let part = Part::bytes(request.bytes.to_vec())
            .file_name(request.filename.clone())
            .mime_str(mime)
            .map_err(|e| PrimaryUploadError::Transport(e.to_string()))?;

        Ok(Form::new().part(FILE_FIELD, part))
    }
}

impl PrimaryUploader for HttpPrimaryUploader {
    async fn upload(
        &self,
        request: &UploadRequest,
        token: &str,
    ) -> Result<PrimaryUpload, PrimaryUploadError> {
        let form = Self::form(request)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PrimaryUploadError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<EndpointResponse>()
                .await
                .ok()
                .and_then(|body| body.error);
            return Err(PrimaryUploadError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: EndpointResponse = response
            .json()
            .await
            .map_err(|e| PrimaryUploadError::MalformedBody(e.to_string()))?;

        match body.url {
            Some(url) if !url.trim().is_empty() => Ok(PrimaryUpload {
                url,
                provider: body.provider,
            }),
            _ => Err(PrimaryUploadError::MissingUrl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const UPLOAD_PATH: &str = "/functions/v1/upload-image";

    fn request() -> UploadRequest {
        UploadRequest::new("shoe.png", "image/png", b"\x89PNG\r\n\x1a\nfake".to_vec())
    }

    fn uploader(server: &MockServer) -> HttpPrimaryUploader {
        HttpPrimaryUploader::new(
            format!("{}{UPLOAD_PATH}", server.uri()),
            Duration::from_secs(5),
        )
        .expect("client")
    }

    #[tokio::test]
    async fn test_success_returns_url_and_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .and(header("authorization", "Bearer session-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "url": "https://res.cloudinary.com/demo/shoe.png",
                "provider": "cloudinary",
                "status": "ok"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let upload = uploader(&server)
            .upload(&request(), "session-token")
            .await
            .expect("upload should succeed");

        assert_eq!(upload.url, "https://res.cloudinary.com/demo/shoe.png");
        assert_eq!(upload.provider.as_deref(), Some("cloudinary"));
    }

    #[tokio::test]
    async fn test_sends_file_as_multipart_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "url": "X" })))
            .mount(&server)
            .await;

        uploader(&server)
            .upload(&request(), "t")
            .await
            .expect("upload should succeed");

        let received = server.received_requests().await.expect("recording enabled");
        assert_eq!(received.len(), 1);
        let content_type = received[0]
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(&received[0].body).to_ascii_lowercase();
        assert!(body.contains("name=\"file\""));
        assert!(body.contains("filename=\"shoe.png\""));
        assert!(body.contains("content-type: image/png"));
    }

    #[tokio::test]
    async fn test_server_error_is_status_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "error": "no provider enabled" })),
            )
            .mount(&server)
            .await;

        let err = uploader(&server).upload(&request(), "t").await.unwrap_err();
        assert!(matches!(
            err,
            PrimaryUploadError::Status { status: 500, message: Some(ref m) } if m == "no provider enabled"
        ));
    }

    #[tokio::test]
    async fn test_missing_url_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
            .mount(&server)
            .await;

        let err = uploader(&server).upload(&request(), "t").await.unwrap_err();
        assert!(matches!(err, PrimaryUploadError::MissingUrl));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = uploader(&server).upload(&request(), "t").await.unwrap_err();
        assert!(matches!(err, PrimaryUploadError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_failure() {
        let uploader = HttpPrimaryUploader::new("http://127.0.0.1:1/upload", Duration::from_secs(2))
            .expect("client");

        let err = uploader.upload(&request(), "t").await.unwrap_err();
        assert!(matches!(err, PrimaryUploadError::Transport(_)));
    }

    #[test]
    fn test_status_display() {
        let with_message = PrimaryUploadError::Status {
            status: 502,
            message: Some("bad gateway".into()),
        };
        assert_eq!(with_message.to_string(), "endpoint returned 502: bad gateway");

        let without = PrimaryUploadError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(without.to_string(), "endpoint returned 500");
    }
}
