//! Data models and structures
//!
//! Defines the request payloads sent to the inference API, the media kinds
//! the pipeline knows how to produce, and environment-driven configuration.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Environment variables checked for the bearer token, in priority order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["HF_TOKEN", "HUGGINGFACE_API_KEY"];

pub const DEFAULT_RETRY_DELAY_SECS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Music,
    Video,
}

impl MediaKind {
    pub fn default_model(self) -> &'static str {
        match self {
            MediaKind::Music => "facebook/musicgen-small",
            MediaKind::Video => "damo-vilab/text-to-video-ms-1.7b",
        }
    }

    /// Models known to work with this media kind, default first.
    pub fn known_models(self) -> &'static [&'static str] {
        match self {
            MediaKind::Music => &[
                "facebook/musicgen-small",
                "facebook/musicgen-medium",
                "facebook/audiocraft-musicgen-small",
            ],
            MediaKind::Video => &[
                "damo-vilab/text-to-video-ms-1.7b",
                "ali-vilab/text-to-video-synthesis",
                "cerspense/zeroscope_v2_576w",
            ],
        }
    }

    /// Output shorter than or equal to this many bytes is treated as an error body.
    pub fn min_bytes(self) -> usize {
        match self {
            MediaKind::Music => 5000,
            MediaKind::Video => 10000,
        }
    }

    pub fn timeout(self) -> Duration {
        match self {
            MediaKind::Music => Duration::from_secs(240),
            MediaKind::Video => Duration::from_secs(300),
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            MediaKind::Music => "generated_music.wav",
            MediaKind::Video => "generated_video.mp4",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Music => write!(f, "music"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "music" => Ok(MediaKind::Music),
            "video" => Ok(MediaKind::Video),
            other => Err(crate::Error::Generic(format!(
                "Unknown media kind '{}'. Expected 'music' or 'video'",
                other
            ))),
        }
    }
}

// Inference API request models
#[derive(Debug, Serialize)]
pub struct GenerationRequest<P> {
    pub inputs: String,
    pub parameters: P,
}

impl<P> GenerationRequest<P> {
    pub fn new(prompt: &str, parameters: P) -> Self {
        Self {
            inputs: prompt.to_string(),
            parameters,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MusicParameters {
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub do_sample: bool,
    pub guidance_scale: f64,
}

impl Default for MusicParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: 512,
            temperature: 0.8,
            do_sample: true,
            guidance_scale: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoParameters {
    pub num_frames: u32,
    pub height: u32,
    pub width: u32,
}

impl Default for VideoParameters {
    fn default() -> Self {
        Self {
            num_frames: 24,
            height: 320,
            width: 576,
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub hf_token: Option<String>,
    pub api_base_url: String,
    pub retry_delay: Duration,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let retry_delay = match lookup("HF_RETRY_DELAY_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    crate::Error::Configuration(format!(
                        "HF_RETRY_DELAY_SECS must be a whole number of seconds, got '{}'",
                        raw
                    ))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
        };

        Ok(Self {
            hf_token: resolve_token(&lookup),
            api_base_url: lookup("HF_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            retry_delay,
            output_dir: lookup("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output")),
        })
    }
}

/// First non-empty value among [`TOKEN_ENV_VARS`].
pub fn resolve_token<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|key| lookup(*key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_music_payload_serialization() {
        let request = GenerationRequest::new("lofi beats", MusicParameters::default());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["inputs"], "lofi beats");
        assert_eq!(json["parameters"]["max_new_tokens"], 512);
        assert_eq!(json["parameters"]["do_sample"], true);
        assert_eq!(json["parameters"]["guidance_scale"], 3.0);
        assert_eq!(json["parameters"]["temperature"], 0.8);
    }

    #[test]
    fn test_video_payload_serialization() {
        let request = GenerationRequest::new("a cat", VideoParameters::default());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["parameters"]["num_frames"], 24);
        assert_eq!(json["parameters"]["height"], 320);
        assert_eq!(json["parameters"]["width"], 576);
    }

    #[test]
    fn test_media_kind_policies() {
        assert_eq!(MediaKind::Music.min_bytes(), 5000);
        assert_eq!(MediaKind::Video.min_bytes(), 10000);
        assert_eq!(MediaKind::Music.timeout(), Duration::from_secs(240));
        assert_eq!(MediaKind::Video.timeout(), Duration::from_secs(300));
        assert_eq!(
            MediaKind::Music.known_models()[0],
            MediaKind::Music.default_model()
        );
        assert_eq!(
            MediaKind::Video.known_models()[0],
            MediaKind::Video.default_model()
        );
    }

    #[test]
    fn test_media_kind_from_str() {
        assert_eq!("Music".parse::<MediaKind>().unwrap(), MediaKind::Music);
        assert_eq!("video".parse::<MediaKind>().unwrap(), MediaKind::Video);
        assert!("image".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_resolve_token_prefers_hf_token() {
        let lookup = lookup_from(&[("HF_TOKEN", "primary"), ("HUGGINGFACE_API_KEY", "backup")]);
        assert_eq!(resolve_token(lookup).as_deref(), Some("primary"));
    }

    #[test]
    fn test_resolve_token_skips_empty_values() {
        let lookup = lookup_from(&[("HF_TOKEN", "  "), ("HUGGINGFACE_API_KEY", "backup")]);
        assert_eq!(resolve_token(lookup).as_deref(), Some("backup"));
    }

    #[test]
    fn test_resolve_token_absent() {
        assert_eq!(resolve_token(lookup_from(&[])), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.hf_token.is_none());
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.retry_delay, Duration::from_secs(20));
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_config_rejects_bad_retry_delay() {
        let err = Config::from_lookup(lookup_from(&[("HF_RETRY_DELAY_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, crate::Error::Configuration(_)));
    }
}
