use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use media_inference_utils::app::{App, DEFAULT_MAX_OUTPUT_BYTES};
use media_inference_utils::inference::InferenceClient;
use media_inference_utils::models::{Config, MediaKind};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "media-inference-utils")]
#[command(about = "Generate music or video from a text prompt")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,

    /// Directory to write generated files into (defaults to OUTPUT_DIR or ./output).
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Refuse to save files larger than this many bytes.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_OUTPUT_BYTES)]
    max_bytes: usize,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate music from a prompt.
    Music {
        prompt: String,
        /// Model to use, e.g. facebook/musicgen-medium.
        #[arg(long)]
        model: Option<String>,
    },
    /// Generate a short video clip from a prompt.
    Video {
        prompt: String,
        /// Model to use, e.g. cerspense/zeroscope_v2_576w.
        #[arg(long)]
        model: Option<String>,
    },
}

impl Command {
    fn kind(&self) -> MediaKind {
        match self {
            Command::Music { .. } => MediaKind::Music,
            Command::Video { .. } => MediaKind::Video,
        }
    }

    fn prompt_and_model(&self) -> (&str, Option<&str>) {
        match self {
            Command::Music { prompt, model } | Command::Video { prompt, model } => {
                (prompt.as_str(), model.as_deref())
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_inference_utils=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = Config::from_env()?;

    let kind = args.command.kind();
    let (prompt, model) = args.command.prompt_and_model();
    if let Some(model) = model {
        if !kind.known_models().iter().any(|known| *known == model) {
            warn!("Model {} is not a known {} model, trying anyway", model, kind);
        }
    }

    let client = InferenceClient::from_config(&config);
    if !client.has_credentials() {
        warn!("No HF_TOKEN or HUGGINGFACE_API_KEY set; requests will fail");
    }

    let date = Local::now().format("%Y-%m-%d").to_string();
    let session_id = Uuid::new_v4();
    let output_dir = args
        .output_dir
        .unwrap_or(config.output_dir)
        .join(format!("{}_{}", date, session_id));

    let app = App::new(&client, output_dir).with_max_output_bytes(args.max_bytes);

    match app.run(kind, prompt, model).await {
        Ok(path) => {
            info!("Generation completed successfully");
            println!("{}", path.display());
            Ok(())
        }
        Err(e) => {
            error!("Generation failed: {}", e);
            std::process::exit(1);
        }
    }
}
