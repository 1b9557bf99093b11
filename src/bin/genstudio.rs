//! CLI for GenStudio - text-to-image generation with a local gallery.

use clap::{Args, Parser, Subcommand, ValueEnum};
use genstudio::{
    mask_credential, Config, FileStore, GeneratedImageRecord, ImageQuality, ImageSize, ImageStyle,
    Notification, NotificationLevel, Notifier, OpenAiImageModel, OpenAiImageProvider, Studio,
    View,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "genstudio")]
#[command(about = "Generate images from text prompts with DALL-E and keep a local gallery")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory for the API key and gallery (default: system data dir)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an image from a text prompt
    Generate(GenerateArgs),

    /// List generated images, newest first
    Gallery(GalleryArgs),

    /// Delete every image with the given timestamp
    Delete {
        /// Timestamp (ms) identifying the image
        timestamp: i64,
    },

    /// Delete all generated images
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Download an image to a local file
    Download {
        /// Timestamp (ms) identifying the image
        timestamp: i64,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Manage the OpenAI API key
    #[command(subcommand)]
    Key(KeyCommand),

    /// Show current configuration
    Settings,
}

#[derive(Args)]
struct GenerateArgs {
    /// The text prompt describing the image
    prompt: String,

    /// Image size
    #[arg(short, long, value_enum, default_value = "1024x1024")]
    size: SizeArg,

    /// Image quality
    #[arg(short, long, value_enum, default_value = "standard")]
    quality: QualityArg,

    /// Image style
    #[arg(long, value_enum, default_value = "vivid")]
    style: StyleArg,

    /// Model to use
    #[arg(short, long, value_enum, default_value = "dall-e-3")]
    model: ModelArg,

    /// Text prepended to the prompt sent to the API
    #[arg(long)]
    prompt_prefix: Option<String>,
}

#[derive(Args)]
struct GalleryArgs {
    /// Show at most this many images
    #[arg(short = 'n', long)]
    limit: Option<usize>,
}

#[derive(Subcommand)]
enum KeyCommand {
    /// Save an API key
    Set {
        /// The API key
        key: String,
    },
    /// Show the saved API key (masked)
    Show,
    /// Remove the saved API key
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SizeArg {
    #[value(name = "256x256")]
    Small,
    #[value(name = "512x512")]
    Medium,
    #[value(name = "1024x1024")]
    Large,
    #[value(name = "1792x1024")]
    Wide,
    #[value(name = "1024x1792")]
    Tall,
}

impl From<SizeArg> for ImageSize {
    fn from(arg: SizeArg) -> Self {
        match arg {
            SizeArg::Small => ImageSize::Small,
            SizeArg::Medium => ImageSize::Medium,
            SizeArg::Large => ImageSize::Large,
            SizeArg::Wide => ImageSize::Wide,
            SizeArg::Tall => ImageSize::Tall,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum QualityArg {
    Standard,
    Hd,
}

impl From<QualityArg> for ImageQuality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Standard => ImageQuality::Standard,
            QualityArg::Hd => ImageQuality::Hd,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StyleArg {
    Vivid,
    Natural,
}

impl From<StyleArg> for ImageStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Vivid => ImageStyle::Vivid,
            StyleArg::Natural => ImageStyle::Natural,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    #[value(name = "dall-e-3")]
    DallE3,
    #[value(name = "dall-e-2")]
    DallE2,
}

impl From<ModelArg> for OpenAiImageModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::DallE3 => OpenAiImageModel::DallE3,
            ModelArg::DallE2 => OpenAiImageModel::DallE2,
        }
    }
}

/// Prints notifications to stderr.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let mark = match notification.level {
            NotificationLevel::Success => "✓",
            NotificationLevel::Error => "✗",
        };
        eprintln!("{mark} {}", notification.message);
    }
}

type CliStudio = Studio<OpenAiImageProvider, FileStore, ConsoleNotifier>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env(cli.data_dir.as_deref())?;

    let mut provider = OpenAiImageProvider::builder();
    if let Commands::Generate(args) = &cli.command {
        provider = provider.model(args.model.into());
        if let Some(prefix) = &args.prompt_prefix {
            provider = provider.prompt_prefix(prefix);
        }
    }
    if let Some(url) = &config.base_url {
        provider = provider.base_url(url);
    }

    let store = FileStore::open(&config.data_dir)?;
    let mut studio = Studio::new(provider.build()?, store, ConsoleNotifier);
    if let Some(key) = &config.env_api_key {
        studio.use_session_credential(key);
    }

    match cli.command {
        Commands::Generate(args) => generate(&mut studio, args, cli.json).await?,
        Commands::Gallery(args) => list_gallery(&studio, args, cli.json)?,
        Commands::Delete { timestamp } => {
            if !studio.delete_image(timestamp) {
                anyhow::bail!("no image with timestamp {timestamp}");
            }
        }
        Commands::Clear { yes } => {
            studio.clear_all(|| yes || confirm("Are you sure you want to clear all generated images?"));
        }
        Commands::Download { timestamp, output } => {
            let Some(path) = studio.download_image(timestamp, &output).await else {
                anyhow::bail!("download failed");
            };
            print_path(&path, cli.json)?;
        }
        Commands::Key(command) => manage_key(&mut studio, command)?,
        Commands::Settings => show_settings(&studio, &config, cli.json)?,
    }

    Ok(())
}

async fn generate(studio: &mut CliStudio, args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    studio.set_size(args.size.into());
    studio.set_quality(args.quality.into());
    studio.set_style(args.style.into());

    let Some(image) = studio.submit_prompt(&args.prompt).await else {
        if studio.current_view() == View::Settings {
            eprintln!("Save a key with `genstudio key set <KEY>` or set OPENAI_API_KEY.");
        }
        anyhow::bail!("no image generated");
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&image)?);
    } else {
        println!("Generated image: {}", image.url);
        println!("Timestamp: {}", image.timestamp);
    }
    Ok(())
}

fn list_gallery(studio: &CliStudio, args: GalleryArgs, json_output: bool) -> anyhow::Result<()> {
    let limit = args.limit.unwrap_or(usize::MAX);
    let images: Vec<&GeneratedImageRecord> = studio.images().iter().take(limit).collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&images)?);
        return Ok(());
    }

    if images.is_empty() {
        println!("Your gallery is empty. Generate some images to see them here.");
        return Ok(());
    }

    println!("Generated images ({}):\n", studio.images().len());
    for image in images {
        let created = image
            .created_at()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown date".into());
        println!("  {}  {}", image.timestamp, created);
        println!("    {}", image.prompt);
        println!("    {}", image.url);
    }
    Ok(())
}

fn manage_key(studio: &mut CliStudio, command: KeyCommand) -> anyhow::Result<()> {
    match command {
        KeyCommand::Set { key } => {
            if !studio.set_credential(&key) {
                anyhow::bail!("API key not saved");
            }
        }
        KeyCommand::Show => {
            let saved = studio.gallery().get_credential();
            if saved.is_empty() {
                println!("No API key saved.");
            } else {
                println!("{}", mask_credential(&saved));
            }
        }
        KeyCommand::Clear => {
            studio.clear_credential();
            println!("API key removed.");
        }
    }
    Ok(())
}

fn show_settings(studio: &CliStudio, config: &Config, json_output: bool) -> anyhow::Result<()> {
    let saved = studio.gallery().get_credential();
    let key_source = if !saved.is_empty() {
        "saved"
    } else if studio.has_credential() {
        "OPENAI_API_KEY"
    } else {
        "none"
    };
    let settings = studio.settings();

    if json_output {
        let result = serde_json::json!({
            "data_dir": config.data_dir.display().to_string(),
            "api_key": key_source,
            "base_url": config.base_url,
            "images": studio.images().len(),
            "defaults": settings,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Data directory: {}", config.data_dir.display());
        println!("API key:        {key_source}");
        if let Some(url) = &config.base_url {
            println!("API base URL:   {url}");
        }
        println!("Images:         {}", studio.images().len());
        println!(
            "Defaults:       size {}, quality {}, style {}",
            settings.size, settings.quality, settings.style
        );
    }
    Ok(())
}

fn print_path(path: &std::path::Path, json_output: bool) -> anyhow::Result<()> {
    if json_output {
        let result = serde_json::json!({ "output": path.display().to_string() });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Saved to {}", path.display());
    }
    Ok(())
}

fn confirm(question: &str) -> bool {
    eprint!("{question} [y/N] ");
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
