//! CLI for AvatarGen - anime avatar images and animations.

use anyhow::Context;
use avatargen::readiness::{HttpExistenceCheck, ReadinessPoller, RetryPolicy};
use avatargen::request::{AnimationForm, AnimeStyle, AvatarForm, IMAGE_SIZES, VIDEO_SIZES};
use avatargen::service::{FallbackTemplate, RunwareProvider};
use avatargen::{DeliveredMedia, MediaPipeline};
use base64::Engine;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "avatargen")]
#[command(about = "Generate anime avatars and animate them via the Runware API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Retries for rate-limited or dropped generation calls
    #[arg(long, global = true, default_value_t = 0)]
    retries: u32,

    #[command(flatten)]
    poll: PollArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an avatar image
    Image(ImageArgs),

    /// Animate an existing image
    Video(VideoArgs),

    /// Generate an avatar image, then animate it
    Avatar(AvatarArgs),

    /// Check that a media URL is servable and print a cache-busted URL
    Probe {
        /// Media URL to check
        url: String,
    },

    /// List available styles
    Styles,

    /// List size presets
    Sizes,
}

#[derive(Args, Clone)]
struct ImageArgs {
    /// Description of the character
    #[arg(short, long)]
    description: String,

    /// Character name
    #[arg(short, long)]
    name: Option<String>,

    /// Visual style
    #[arg(short, long, value_enum, default_value = "ghibli")]
    style: StyleArg,

    /// Image size as WIDTHxHEIGHT
    #[arg(long, default_value = avatargen::request::DEFAULT_IMAGE_SIZE)]
    size: String,

    /// Also download the image to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct AnimationArgs {
    /// What should move in the animation
    #[arg(short, long, default_value = avatargen::request::DEFAULT_ANIMATION_PROMPT)]
    prompt: String,

    /// Video size as WIDTHxHEIGHT
    #[arg(long = "video-size", default_value = avatargen::request::DEFAULT_VIDEO_SIZE)]
    video_size: String,

    /// Clip length in seconds
    #[arg(long, default_value_t = 5)]
    duration: u32,
}

#[derive(Args)]
struct VideoArgs {
    /// First frame: an image asset id, URL, or local image file
    #[arg(short, long)]
    reference: String,

    /// Also download the video to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    animation: AnimationArgs,
}

#[derive(Args)]
struct AvatarArgs {
    #[command(flatten)]
    image: ImageArgs,

    #[command(flatten)]
    animation: AnimationArgs,

    /// Also download the video to this file
    #[arg(long)]
    video_output: Option<PathBuf>,
}

#[derive(Args)]
struct PollArgs {
    /// Existence checks before showing a video (env: AVATARGEN_POLL_ATTEMPTS)
    #[arg(long, global = true)]
    attempts: Option<u32>,

    /// Wait after a failed check, in ms (env: AVATARGEN_POLL_DELAY_MS)
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Template for deriving a video URL from a task id
    #[arg(long, global = true)]
    fallback_template: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StyleArg {
    Ghibli,
    Shonen,
    Moe,
    Cyberpunk,
    Fantasy,
    Retro90s,
}

impl From<StyleArg> for AnimeStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Ghibli => AnimeStyle::Ghibli,
            StyleArg::Shonen => AnimeStyle::Shonen,
            StyleArg::Moe => AnimeStyle::Moe,
            StyleArg::Cyberpunk => AnimeStyle::Cyberpunk,
            StyleArg::Fantasy => AnimeStyle::Fantasy,
            StyleArg::Retro90s => AnimeStyle::Retro90s,
        }
    }
}

type Pipeline = MediaPipeline<RunwareProvider, HttpExistenceCheck>;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "avatargen=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Image(args) => {
            let pipeline = build_pipeline(&cli)?;
            let media = generate_image(&pipeline, args).await?;
            let result = deliver(&media, args.output.as_deref(), cli.json).await?;
            print_json(&result, cli.json)?;
        }
        Commands::Video(args) => {
            let pipeline = build_pipeline(&cli)?;
            let reference = resolve_reference(&args.reference)?;
            let media = generate_video(&pipeline, &args.animation, reference).await?;
            let result = deliver(&media, args.output.as_deref(), cli.json).await?;
            print_json(&result, cli.json)?;
        }
        Commands::Avatar(args) => {
            let pipeline = build_pipeline(&cli)?;
            let image = generate_image(&pipeline, &args.image).await?;
            let image_result = deliver(&image, args.image.output.as_deref(), cli.json).await?;

            let reference = image
                .asset_id
                .clone()
                .unwrap_or_else(|| image.url.clone());
            let video = generate_video(&pipeline, &args.animation, reference).await?;
            let video_result = deliver(&video, args.video_output.as_deref(), cli.json).await?;

            let result = serde_json::json!({
                "image": image_result,
                "video": video_result,
            });
            print_json(&result, cli.json)?;
        }
        Commands::Probe { url } => {
            let poller = ReadinessPoller::new(HttpExistenceCheck::new()?, poll_policy(&cli.poll)?);
            let outcome = poller.poll(url).await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                let status = if outcome.is_confirmed() {
                    "confirmed"
                } else {
                    "unconfirmed"
                };
                println!("{} ({status})", outcome.url());
            }
        }
        Commands::Styles => list_styles(cli.json)?,
        Commands::Sizes => list_sizes(cli.json)?,
    }

    Ok(())
}

fn poll_policy(args: &PollArgs) -> anyhow::Result<RetryPolicy> {
    let mut policy = RetryPolicy::from_env()?;
    if let Some(attempts) = args.attempts {
        policy.max_attempts = attempts;
    }
    if let Some(delay) = args.delay_ms {
        policy.delay = Duration::from_millis(delay);
    }
    Ok(policy)
}

fn build_pipeline(cli: &Cli) -> anyhow::Result<Pipeline> {
    let mut builder = RunwareProvider::builder();
    if let Some(template) = &cli.poll.fallback_template {
        builder = builder.fallback_template(FallbackTemplate::new(template.as_str())?);
    }
    let provider = builder.build()?;

    let poller = ReadinessPoller::new(HttpExistenceCheck::new()?, poll_policy(&cli.poll)?);
    Ok(MediaPipeline::new(provider, poller).with_retries(cli.retries))
}

async fn generate_image(pipeline: &Pipeline, args: &ImageArgs) -> anyhow::Result<DeliveredMedia> {
    let mut form = AvatarForm::new(&args.description)
        .with_style(args.style.into())
        .with_size(&args.size);
    if let Some(name) = &args.name {
        form = form.with_name(name);
    }

    let request = form.build()?;
    Ok(pipeline.render_image(&request).await?)
}

async fn generate_video(
    pipeline: &Pipeline,
    args: &AnimationArgs,
    reference: String,
) -> anyhow::Result<DeliveredMedia> {
    let request = AnimationForm::new()
        .with_prompt(&args.prompt)
        .with_reference_image(reference)
        .with_size(&args.video_size)
        .with_duration(args.duration)
        .build()?;
    Ok(pipeline.render_video(&request).await?)
}

/// Local image files are sent inline as a data URI; anything else is passed
/// through as an asset id or URL.
fn resolve_reference(reference: &str) -> anyhow::Result<String> {
    let path = Path::new(reference);
    if !path.is_file() {
        return Ok(reference.to_string());
    }

    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => anyhow::bail!("unsupported reference image type: {}", path.display()),
    };
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read reference image {}", path.display()))?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    Ok(format!("data:{mime};base64,{encoded}"))
}

/// Saves the media when an output path is given, prints a human-readable
/// report unless JSON was requested, and returns the JSON description.
async fn deliver(
    media: &DeliveredMedia,
    output: Option<&Path>,
    json_output: bool,
) -> anyhow::Result<serde_json::Value> {
    let mut result = serde_json::to_value(media)?;

    let saved = match output {
        Some(path) => {
            let client = reqwest::Client::builder()
                .timeout(DOWNLOAD_TIMEOUT)
                .build()?;
            let size = media
                .save(&client, path)
                .await
                .with_context(|| format!("failed to save {} to {}", media.kind, path.display()))?;
            result["output"] = path.display().to_string().into();
            result["size_bytes"] = size.into();
            Some((path, size))
        }
        None => None,
    };

    if !json_output {
        println!("Generated {}: {}", media.kind, media.url);
        if let Some(asset_id) = &media.asset_id {
            println!("Asset id: {asset_id}");
        }
        if let Some((path, size)) = saved {
            println!("Saved to {} ({size} bytes)", path.display());
        }
        if media.is_pending() {
            println!(
                "Still processing on the CDN; the link should start playing within a few seconds."
            );
        }
    }
    Ok(result)
}

fn print_json(result: &serde_json::Value, json_output: bool) -> anyhow::Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(result)?);
    }
    Ok(())
}

fn list_styles(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct StyleInfo {
        id: AnimeStyle,
        label: &'static str,
        descriptor: &'static str,
    }

    let styles: Vec<StyleInfo> = AnimeStyle::ALL
        .iter()
        .map(|s| StyleInfo {
            id: *s,
            label: s.label(),
            descriptor: s.descriptor(),
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&styles)?);
    } else {
        println!("Available styles:\n");
        for s in &styles {
            println!("  {} ({})", s.label, serde_json::to_value(s.id)?.as_str().unwrap_or(""));
            println!("    {}", s.descriptor);
        }
    }
    Ok(())
}

fn list_sizes(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        let to_json = |presets: &[avatargen::request::SizePreset]| {
            presets
                .iter()
                .map(|p| serde_json::json!({ "label": p.label, "size": p.token }))
                .collect::<Vec<_>>()
        };
        let result = serde_json::json!({
            "image": to_json(IMAGE_SIZES),
            "video": to_json(VIDEO_SIZES),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("IMAGE:");
        for p in IMAGE_SIZES {
            println!("  {:<10} {}", p.token, p.label);
        }
        println!("\nVIDEO:");
        for p in VIDEO_SIZES {
            println!("  {:<10} {}", p.token, p.label);
        }
    }
    Ok(())
}
