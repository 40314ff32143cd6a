use clap::Parser;
use media_inference_utils::json_log::{self, parse_level_arg, LogLevel};
use media_inference_utils::Error;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const AFTER_HELP: &str = r#"Examples:
  json_logger messages.json
  json_logger data.json --log-level DEBUG
  json_logger logs.json --log-level WARNING

Supported JSON formats:
  - {"messages": [{"message": "text", "level": "info"}, ...]}
  - {"logs": [{"text": "content", "severity": "warning"}, ...]}
  - {"message": "single message", "level": "error"}
  - [{"message": "msg1"}, {"message": "msg2"}]
  - {"key1": "value1", "key2": "value2"}"#;

#[derive(Debug, Parser)]
#[command(name = "json_logger", version = "1.0.0")]
#[command(about = "Read JSON files and log their messages")]
#[command(after_help = AFTER_HELP)]
struct CliArgs {
    /// Path to the JSON file to process.
    #[arg(value_name = "FILE_PATH")]
    file_path: PathBuf,

    /// Minimum level to log: DEBUG, INFO, WARNING, ERROR or CRITICAL.
    #[arg(long, default_value = "INFO", value_parser = parse_level_arg)]
    log_level: LogLevel,
}

fn main() {
    let args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(args.log_level.to_filter())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    info!("JSON Logger initialized with level: {}", args.log_level);

    let path = args.file_path.as_path();
    let data = match json_log::read_json_file(path) {
        Ok(data) => data,
        Err(e) => {
            match e {
                Error::Serialization(e) => {
                    error!("Invalid JSON format in file {}: {}", path.display(), e)
                }
                Error::Validation(message) => error!("{}", message),
                other => error!("Unexpected error reading file {}: {}", path.display(), other),
            }
            error!("Failed to process JSON file");
            std::process::exit(1);
        }
    };

    json_log::log_json(&data);
    info!("JSON processing completed successfully");
}
