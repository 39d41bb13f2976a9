//! Pro Banana - product preview bot
//!
//! CLI entry point for running the bot and exercising prompt synthesis offline.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{info, warn};

use probanana::bot::Bot;
use probanana::catalog::Catalog;
use probanana::cli::{Cli, Command, get_log_path};
use probanana::config::Config;
use probanana::gemini::{ChatOptions, GeminiClient, GenerationBackend, ImageInput};
use probanana::httpclient;
use probanana::media::{self, DataUrl, FALLBACK_MIME};
use probanana::preview::{GenerationRequest, PromptOptions, parse_args, synthesize};

fn setup_logging(level: &str, to_stderr: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(level).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if to_stderr {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        let log_path = get_log_path();
        if let Some(log_dir) = log_path.parent() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }
        let log_file = fs::File::create(&log_path).context("Failed to create log file")?;
        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_ansi(false)
            .with_env_filter(filter)
            .init();
    }

    info!("Logging initialized (level: {})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    setup_logging(&level, cli.log_stderr).context("Failed to setup logging")?;

    info!(
        "Pro Banana loaded config: text_model={}, image_model={}",
        config.gemini.text_model, config.gemini.image_model
    );

    match cli.command {
        None | Some(Command::Run) => cmd_run(&config).await,
        Some(Command::Prompt { args, cover, frames }) => cmd_prompt(&args, cover, frames),
        Some(Command::Catalog) => cmd_catalog(),
        Some(Command::Generate { image, args, cover, out }) => cmd_generate(&config, &image, &args, cover, &out).await,
    }
}

/// Run the bot until Ctrl-C
async fn cmd_run(config: &Config) -> Result<()> {
    let bot = Bot::from_config(config).context("Failed to start bot")?;
    println!("Pro Banana running, press Ctrl-C to stop");
    bot.run(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
        }
    })
    .await
}

fn build_request(args: &[String], cover: bool, frames: Vec<String>, catalog: &Catalog) -> GenerationRequest {
    let defaults = if cover {
        PromptOptions::cover_defaults()
    } else {
        PromptOptions::preview_defaults()
    };
    let mut opts = parse_args(&args.join(" "), defaults, catalog);
    if !frames.is_empty() {
        opts.frame_ids = frames;
    }
    synthesize(&opts, catalog)
}

/// Print the synthesized document and its output shape
fn cmd_prompt(args: &[String], cover: bool, frames: Vec<String>) -> Result<()> {
    let catalog = Catalog::builtin();
    let request = build_request(args, cover, frames, &catalog);
    let shape = &request.shape;

    println!("{}", "Output shape".bright_cyan().bold());
    println!("  layout:  {}", shape.layout_key);
    println!("  images:  {} ({}x{})", shape.count, shape.columns, shape.rows);
    println!("  aspect:  {}", shape.aspect_ratio);
    println!("  quality: {}", shape.quality_hint);
    println!();
    println!("{}", "Document".bright_cyan().bold());
    println!("{}", request.document);
    Ok(())
}

/// List catalog keys in display order
fn cmd_catalog() -> Result<()> {
    let catalog = Catalog::builtin();

    println!("{}", "Categories".bright_cyan().bold());
    for option in catalog.category_options() {
        let key = if option.key.is_empty() { "(auto)" } else { option.key.as_str() };
        println!("  {:<24} {}", key, option.name.dimmed());
    }

    println!();
    println!("{}", "Styles".bright_cyan().bold());
    for option in catalog.style_options() {
        let key = if option.key.is_empty() { "(default)" } else { option.key.as_str() };
        println!("  {:<24} {}", key, option.name.dimmed());
    }

    println!();
    println!("{}", "Frames".bright_cyan().bold());
    for (index, frame) in catalog.frames().iter().enumerate() {
        println!("  {}. {:<26} {}", index + 1, frame.id, frame.title.dimmed());
    }
    Ok(())
}

/// One synthesis plus backend call, writing returned images to `out`
async fn cmd_generate(config: &Config, image: &Path, args: &[String], cover: bool, out: &Path) -> Result<()> {
    config.validate_gemini()?;
    let catalog = Catalog::builtin();
    let request = build_request(args, cover, Vec::new(), &catalog);

    let bytes = fs::read(image).context(format!("Failed to read {}", image.display()))?;
    let mime = media::mime_for_path(image)
        .or_else(|| media::sniff_mime(&bytes))
        .unwrap_or(FALLBACK_MIME);

    let http = httpclient::build(&config.http).context("Failed to build HTTP client")?;
    let backend = GeminiClient::from_config(&config.gemini, http);
    let opts = ChatOptions {
        want_image: true,
        aspect_ratio: Some(request.shape.aspect_ratio.clone()),
    };

    println!(
        "Generating {} image(s) for layout {}...",
        request.shape.count, request.shape.layout_key
    );
    let resp = backend
        .chat(&[], &request.document, &[ImageInput::from_bytes(mime, &bytes)], &opts)
        .await
        .context("Generation failed")?;

    if !resp.text.trim().is_empty() {
        println!("{}", resp.text.dimmed());
    }
    if resp.images.is_empty() {
        println!("{}", "No images returned".red());
        return Ok(());
    }

    fs::create_dir_all(out).context("Failed to create output directory")?;
    for (index, url) in resp.images.iter().enumerate() {
        let Some(data) = DataUrl::parse(url, FALLBACK_MIME) else {
            warn!(index, "Skipping unparseable image");
            continue;
        };
        let decoded = data.decode().context("Failed to decode image")?;
        let path: PathBuf = out.join(format!("preview-{}{}", index + 1, data.extension()));
        fs::write(&path, decoded).context(format!("Failed to write {}", path.display()))?;
        println!("{} {}", "Wrote".green(), path.display());
    }
    Ok(())
}
