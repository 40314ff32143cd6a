//! Hosted inference API integration for music and video generation
//!
//! Sends text prompts to text-to-audio and text-to-video models and returns
//! the raw media bytes, retrying once while a cold model loads.

pub mod client;
pub mod mime;
pub mod mock;

pub use client::{InferenceClient, RetryPolicy};
pub use mock::MockMediaClient;

use crate::models::MediaKind;
use async_trait::async_trait;

/// Best-effort media generation. Failures are logged and surface as `None`.
#[async_trait]
pub trait MediaGenerationService: Send + Sync {
    async fn generate_music(&self, prompt: &str, model: Option<&str>) -> Option<Vec<u8>>;
    async fn generate_video(&self, prompt: &str, model: Option<&str>) -> Option<Vec<u8>>;

    async fn generate(&self, kind: MediaKind, prompt: &str, model: Option<&str>) -> Option<Vec<u8>> {
        match kind {
            MediaKind::Music => self.generate_music(prompt, model).await,
            MediaKind::Video => self.generate_video(prompt, model).await,
        }
    }
}
