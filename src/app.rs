//! Application orchestration for generating media and saving it to disk.

use crate::inference::mime::detect_media_extension;
use crate::inference::MediaGenerationService;
use crate::models::MediaKind;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Largest file the downstream upload target accepts.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 25 * 1024 * 1024;

/// Runs one generation through an injected service and writes the result.
pub struct App<'a> {
    media: &'a dyn MediaGenerationService,
    output_dir: PathBuf,
    max_output_bytes: usize,
}

impl<'a> App<'a> {
    pub fn new(media: &'a dyn MediaGenerationService, output_dir: PathBuf) -> Self {
        Self {
            media,
            output_dir,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }

    pub fn with_max_output_bytes(mut self, max_output_bytes: usize) -> Self {
        self.max_output_bytes = max_output_bytes;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generate `kind` media for `prompt` and return the path it was saved to.
    pub async fn run(&self, kind: MediaKind, prompt: &str, model: Option<&str>) -> Result<PathBuf> {
        let model_name = model.unwrap_or(kind.default_model());
        info!("Generating {} with model {}: {}", kind, model_name, prompt);

        let bytes = match self.media.generate(kind, prompt, model).await {
            Some(bytes) => bytes,
            None => {
                error!("Failed to generate {}", kind);
                return Err(Error::Generation(format!(
                    "Failed to generate {}. Please try again later.",
                    kind
                )));
            }
        };

        if bytes.len() > self.max_output_bytes {
            return Err(Error::Validation(format!(
                "Generated {} is too large ({} bytes, limit {})",
                kind,
                bytes.len(),
                self.max_output_bytes
            )));
        }

        let extension = detect_media_extension(&bytes, kind);
        let stem = Path::new(kind.default_file_name())
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("generated");

        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{}.{}", stem, extension));
        fs::write(&path, &bytes)?;

        info!(
            "Saved {} ({} bytes) to {}",
            kind,
            bytes.len(),
            path.display()
        );
        Ok(path)
    }
}
