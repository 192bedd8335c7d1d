//! ticket-wordcloud
//!
//! Command-line front end: reads ticket descriptions from a Power BI payload
//! or from `--text` arguments, renders the word cloud and prints the JSON
//! response on stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ticket_wordcloud::payload::{extract_descriptions, BatchResponse, ErrorResponse};
use ticket_wordcloud::{WordCloudConfig, WordCloudEngine, WordCloudError};

#[derive(Parser, Debug)]
#[command(name = "ticket-wordcloud")]
#[command(about = "Word cloud of equipment faults from maintenance tickets", long_about = None)]
struct Cli {
    /// Ticket payload (JSON) with `records[0].entity["Power BI values"]`
    #[arg(long, conflicts_with = "text")]
    payload: Option<PathBuf>,

    /// Description text; repeat for several tickets
    #[arg(long)]
    text: Vec<String>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Font to try before the configured candidates
    #[arg(long)]
    font: Option<PathBuf>,

    /// Also write the PNG here
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Publish the image and include its URL in the response
    #[arg(long)]
    upload: bool,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<WordCloudError>() {
            Some(cloud_err) => {
                tracing::error!(kind = %cloud_err.kind(), "{err:#}");
                let body = ErrorResponse::from_error(cloud_err);
                if let Ok(json) = serde_json::to_string_pretty(&body) {
                    println!("{json}");
                }
                if cloud_err.is_validation() {
                    ExitCode::from(2)
                } else {
                    ExitCode::FAILURE
                }
            }
            None => {
                tracing::error!("{err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => WordCloudConfig::from_file(path)?,
        None => WordCloudConfig::default(),
    };
    if let Some(font) = &cli.font {
        config.font.prepend(font);
    }

    let descriptions = read_descriptions(&cli, &config)?;
    let engine = WordCloudEngine::from_config(config)?;
    let output = engine.process_batch(&descriptions)?;

    if let Some(path) = &cli.out {
        let png = output.image.to_png()?;
        std::fs::write(path, png)
            .with_context(|| format!("failed to write image to {}", path.display()))?;
        tracing::info!(path = %path.display(), "image written");
    }

    let mut response = BatchResponse::from_output(&output, &engine.config().output)?;
    if cli.upload {
        if let Some(url) = host_image(&engine.config().upload, &response.image_base64) {
            response = response.with_image_url(url);
        }
    }

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn read_descriptions(cli: &Cli, config: &WordCloudConfig) -> Result<Vec<String>> {
    if let Some(path) = &cli.payload {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload {}", path.display()))?;
        let payload: serde_json::Value = serde_json::from_str(&raw)
            .with_context(|| format!("payload {} is not valid JSON", path.display()))?;
        return Ok(extract_descriptions(&payload, &config.output.description_column)?);
    }
    if cli.text.is_empty() {
        bail!("nothing to do: pass --payload <file> or at least one --text");
    }
    Ok(cli.text.clone())
}

#[cfg(feature = "upload")]
fn host_image(config: &ticket_wordcloud::config::UploadConfig, base64_png: &str) -> Option<String> {
    use ticket_wordcloud::upload::{ImageHost, ImgbbHost};

    match ImgbbHost::from_config(config).and_then(|host| host.upload(base64_png)) {
        Ok(url) => Some(url),
        Err(err) => {
            tracing::warn!(%err, "image upload failed; responding without a URL");
            None
        }
    }
}

#[cfg(not(feature = "upload"))]
fn host_image(
    _config: &ticket_wordcloud::config::UploadConfig,
    _base64_png: &str,
) -> Option<String> {
    tracing::warn!("built without the `upload` feature; skipping image upload");
    None
}
