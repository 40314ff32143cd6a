use super::MediaGenerationService;
use crate::models::MediaKind;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted stand-in for [`super::InferenceClient`].
///
/// Responses cycle in the order they were added. With no scripted
/// responses, a placeholder file just above the acceptance threshold is
/// returned.
#[derive(Clone)]
pub struct MockMediaClient {
    music_responses: Arc<Mutex<Vec<Option<Vec<u8>>>>>,
    video_responses: Arc<Mutex<Vec<Option<Vec<u8>>>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockMediaClient {
    pub fn new() -> Self {
        Self {
            music_responses: Arc::new(Mutex::new(Vec::new())),
            video_responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_music_response(self, response: Option<Vec<u8>>) -> Self {
        self.music_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_video_response(self, response: Option<Vec<u8>>) -> Self {
        self.video_responses.lock().unwrap().push(response);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn next_response(
        &self,
        responses: &Mutex<Vec<Option<Vec<u8>>>>,
        kind: MediaKind,
    ) -> Option<Vec<u8>> {
        let count = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };

        let responses = responses.lock().unwrap();
        if responses.is_empty() {
            Some(placeholder_media(kind))
        } else {
            responses[(count - 1) % responses.len()].clone()
        }
    }
}

impl Default for MockMediaClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal container header padded past the acceptance threshold.
fn placeholder_media(kind: MediaKind) -> Vec<u8> {
    let mut bytes = match kind {
        MediaKind::Music => b"RIFF\x00\x00\x00\x00WAVEfmt ".to_vec(),
        MediaKind::Video => b"\x00\x00\x00\x18ftypmp42".to_vec(),
    };
    bytes.resize(kind.min_bytes() + 1, 0);
    bytes
}

#[async_trait]
impl MediaGenerationService for MockMediaClient {
    async fn generate_music(&self, _prompt: &str, _model: Option<&str>) -> Option<Vec<u8>> {
        self.next_response(&self.music_responses, MediaKind::Music)
    }

    async fn generate_video(&self, _prompt: &str, _model: Option<&str>) -> Option<Vec<u8>> {
        self.next_response(&self.video_responses, MediaKind::Video)
    }
}
