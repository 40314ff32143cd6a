use anyhow::Result;
use clap::Parser;
use media_inference_utils::search::WebSearch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "web_search")]
#[command(about = "Print a short text summary of web search results")]
struct CliArgs {
    /// Search terms; joined with spaces.
    #[arg(value_name = "QUERY")]
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_inference_utils=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let query = args.query.join(" ");

    let search = WebSearch::new()?;
    println!("{}", search.search(&query).await);
    Ok(())
}
