//! Generate an avatar, animate it, and wait until the clip is servable.
//!
//! Run with: `cargo run --example animate_avatar`
//!
//! Requires `RUNWARE_API_KEY` environment variable.

use avatargen::{
    AnimationForm, AvatarForm, HttpExistenceCheck, MediaPipeline, ReadinessPoller, RetryPolicy,
    RunwareProvider,
};

#[tokio::main]
async fn main() -> avatargen::Result<()> {
    let poller = ReadinessPoller::new(HttpExistenceCheck::new()?, RetryPolicy::default());
    let pipeline = MediaPipeline::new(RunwareProvider::builder().build()?, poller);

    let image = pipeline
        .render_image(&AvatarForm::new("a cyberpunk ninja with a neon visor").build()?)
        .await?;
    println!("Image: {}", image.url);

    let reference = image.asset_id.unwrap_or(image.url);
    let request = AnimationForm::new()
        .with_prompt("visor flickering, hair moving in the wind")
        .with_reference_image(reference)
        .with_size("640x640")
        .build()?;

    println!("Generating video (this may take a minute)...");
    let video = pipeline.render_video(&request).await?;
    println!("Video: {} ({:?})", video.url, video.confidence);

    Ok(())
}
