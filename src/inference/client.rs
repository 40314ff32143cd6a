use super::MediaGenerationService;
use crate::models::{
    Config, GenerationRequest, MediaKind, MusicParameters, VideoParameters, DEFAULT_API_BASE_URL,
    DEFAULT_RETRY_DELAY_SECS,
};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tokio_retry::{strategy::FixedInterval, RetryIf};

/// How long to wait for a cold model and how many times to ask again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub max_retries: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            max_retries: 1,
        }
    }
}

/// Failure of a single attempt against the inference endpoint.
#[derive(Debug)]
enum AttemptError {
    /// The model is still loading (503) and may answer on a later attempt.
    Retryable { status: u16, body: String },
    Fatal(Error),
}

impl AttemptError {
    fn is_retryable(&self) -> bool {
        matches!(self, AttemptError::Retryable { .. })
    }

    fn into_error(self) -> Error {
        match self {
            AttemptError::Retryable { status, body } => Error::Remote { status, body },
            AttemptError::Fatal(e) => e,
        }
    }
}

fn transport_error(e: reqwest::Error) -> AttemptError {
    if e.is_timeout() {
        AttemptError::Fatal(Error::Timeout)
    } else {
        AttemptError::Fatal(Error::Http(e))
    }
}

/// Client for the hosted text-to-media inference API.
///
/// Built once by the caller and shared by reference; the only state it
/// carries is the bearer token captured at construction.
pub struct InferenceClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    retry: RetryPolicy,
    timeout_override: Option<Duration>,
}

impl InferenceClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::new_with_client(api_key, Client::new())
    }

    pub fn new_with_client(api_key: Option<String>, client: Client) -> Self {
        Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
            timeout_override: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.hf_token.clone())
            .with_base_url(config.api_base_url.clone())
            .with_retry_policy(RetryPolicy {
                delay: config.retry_delay,
                ..RetryPolicy::default()
            })
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Use one timeout for every attempt instead of the per-media default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_override = Some(timeout);
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    fn timeout_for(&self, kind: MediaKind) -> Duration {
        self.timeout_override.unwrap_or_else(|| kind.timeout())
    }

    /// POST `payload` to `{base_url}/{model}`, retrying while the model loads.
    pub(crate) async fn request<P: Serialize + Sync>(
        &self,
        model: &str,
        payload: &GenerationRequest<P>,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Configuration("HF_TOKEN not found in environment".to_string()))?;

        let url = format!("{}/{}", self.base_url, model);
        let url = url.as_str();
        let strategy = FixedInterval::new(self.retry.delay).take(self.retry.max_retries);

        RetryIf::spawn(
            strategy,
            move || self.attempt(url, api_key, payload, timeout),
            |e: &AttemptError| e.is_retryable(),
        )
        .await
        .map_err(AttemptError::into_error)
    }

    async fn attempt<P: Serialize + Sync>(
        &self,
        url: &str,
        api_key: &str,
        payload: &GenerationRequest<P>,
        timeout: Duration,
    ) -> std::result::Result<Vec<u8>, AttemptError> {
        tracing::debug!("Sending inference request to {}", url);

        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to inference API: {}", e);
                transport_error(e)
            })?;

        let status = response.status();
        if status == StatusCode::OK {
            let body = response.bytes().await.map_err(transport_error)?;
            tracing::debug!("Inference API returned {} bytes", body.len());
            return Ok(body.to_vec());
        }

        let error_text = response.text().await.map_err(transport_error)?;
        if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::warn!("Model at {} is loading (status {})", url, status);
            return Err(AttemptError::Retryable {
                status: status.as_u16(),
                body: error_text,
            });
        }

        tracing::error!("Inference API error (status {}): {}", status, error_text);
        Err(AttemptError::Fatal(Error::Remote {
            status: status.as_u16(),
            body: error_text,
        }))
    }
}

/// Keep `bytes` only if it is large enough to be real media for `kind`.
fn accept_output(kind: MediaKind, bytes: Vec<u8>) -> Option<Vec<u8>> {
    if bytes.len() > kind.min_bytes() {
        Some(bytes)
    } else {
        tracing::warn!("Generated content too small: {} bytes", bytes.len());
        None
    }
}

#[async_trait]
impl MediaGenerationService for InferenceClient {
    async fn generate_music(&self, prompt: &str, model: Option<&str>) -> Option<Vec<u8>> {
        let kind = MediaKind::Music;
        let model = model.unwrap_or(kind.default_model());
        let payload = GenerationRequest::new(prompt, MusicParameters::default());

        match self.request(model, &payload, self.timeout_for(kind)).await {
            Ok(bytes) => accept_output(kind, bytes),
            Err(e) => {
                tracing::error!("Music generation error: {}", e);
                None
            }
        }
    }

    async fn generate_video(&self, prompt: &str, model: Option<&str>) -> Option<Vec<u8>> {
        let kind = MediaKind::Video;
        let model = model.unwrap_or(kind.default_model());
        let payload = GenerationRequest::new(prompt, VideoParameters::default());

        match self.request(model, &payload, self.timeout_for(kind)).await {
            Ok(bytes) => accept_output(kind, bytes),
            Err(e) => {
                tracing::error!("Video generation error: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MUSIC_PATH: &str = "/facebook/musicgen-small";
    const VIDEO_PATH: &str = "/damo-vilab/text-to-video-ms-1.7b";

    fn make_client(server: &MockServer, api_key: Option<&str>) -> InferenceClient {
        InferenceClient::new(api_key.map(str::to_string))
            .with_base_url(server.uri())
            .with_retry_policy(RetryPolicy {
                delay: Duration::from_millis(10),
                max_retries: 1,
            })
    }

    fn music_payload() -> GenerationRequest<MusicParameters> {
        GenerationRequest::new("upbeat electronic dance music", MusicParameters::default())
    }

    #[tokio::test]
    async fn test_generate_music_accepts_body_above_threshold() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MUSIC_PATH))
            .and(header("Authorization", "Bearer key"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::json!({
                "inputs": "upbeat electronic dance music",
                "parameters": {
                    "max_new_tokens": 512,
                    "temperature": 0.8,
                    "do_sample": true,
                    "guidance_scale": 3.0
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 5001]))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, Some("key"));
        let result = client
            .generate_music("upbeat electronic dance music", None)
            .await;

        assert_eq!(result.map(|bytes| bytes.len()), Some(5001));
    }

    #[tokio::test]
    async fn test_generate_music_rejects_body_at_threshold() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MUSIC_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 5000]))
            .mount(&server)
            .await;

        let client = make_client(&server, Some("key"));
        assert!(client.generate_music("anything", None).await.is_none());
    }

    #[tokio::test]
    async fn test_generate_video_threshold() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VIDEO_PATH))
            .and(body_json(serde_json::json!({
                "inputs": "a cat playing with a ball",
                "parameters": { "num_frames": 24, "height": 320, "width": 576 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 10001]))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(VIDEO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 10000]))
            .mount(&server)
            .await;

        let client = make_client(&server, Some("key"));

        let accepted = client
            .generate_video("a cat playing with a ball", None)
            .await;
        assert_eq!(accepted.map(|bytes| bytes.len()), Some(10001));

        let rejected = client
            .generate_video("a cat playing with a ball", None)
            .await;
        assert!(rejected.is_none());
    }

    #[tokio::test]
    async fn test_custom_model_is_used_as_path() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/facebook/musicgen-medium"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 6000]))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, Some("key"));
        let result = client
            .generate_music("jazz", Some("facebook/musicgen-medium"))
            .await;
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_loading_then_success_returns_retry_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MUSIC_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("model is loading"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(MUSIC_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![9u8; 6000]))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, Some("key"));
        let result = client.generate_music("ambient", None).await;

        assert_eq!(result, Some(vec![9u8; 6000]));
    }

    #[tokio::test]
    async fn test_loading_twice_fails_without_third_attempt() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MUSIC_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("still loading"))
            .expect(2)
            .mount(&server)
            .await;

        let client = make_client(&server, Some("key"));
        let err = client
            .request(MUSIC_PATH.trim_start_matches('/'), &music_payload(), Duration::from_secs(5))
            .await
            .unwrap_err();

        match err {
            Error::Remote { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "still loading");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_loading_then_other_status_carries_retry_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MUSIC_PATH))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(MUSIC_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, Some("key"));
        let err = client
            .request(MUSIC_PATH.trim_start_matches('/'), &music_payload(), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_other_status_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MUSIC_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad inputs"))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, Some("key"));
        let err = client
            .request(MUSIC_PATH.trim_start_matches('/'), &music_payload(), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Remote { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_missing_credentials_make_no_requests() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 20000]))
            .expect(0)
            .mount(&server)
            .await;

        let client = make_client(&server, None);
        assert!(!client.has_credentials());
        assert!(client.generate_music("anything", None).await.is_none());
        assert!(client.generate_video("anything", None).await.is_none());

        let err = client
            .request("any/model", &music_payload(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_blank_credentials_are_treated_as_missing() {
        let client = InferenceClient::new(Some("   ".to_string()));
        assert!(!client.has_credentials());
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MUSIC_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![0u8; 6000])
                    .set_delay(Duration::from_millis(500)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, Some("key"));

        let err = client
            .request(
                MUSIC_PATH.trim_start_matches('/'),
                &music_payload(),
                Duration::from_millis(50),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout));
    }

    #[tokio::test]
    async fn test_generate_music_returns_none_on_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MUSIC_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![0u8; 6000])
                    .set_delay(Duration::from_millis(500)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, Some("key")).with_timeout(Duration::from_millis(50));
        assert!(client.generate_music("slow", None).await.is_none());
    }

    #[test]
    fn test_from_config_applies_settings() {
        let config = Config {
            hf_token: Some("token".to_string()),
            api_base_url: "http://localhost:9999/models/".to_string(),
            retry_delay: Duration::from_secs(3),
            output_dir: "output".into(),
        };

        let client = InferenceClient::from_config(&config);
        assert!(client.has_credentials());
        assert_eq!(client.base_url, "http://localhost:9999/models");
        assert_eq!(client.retry.delay, Duration::from_secs(3));
        assert_eq!(client.retry.max_retries, 1);
    }
}
