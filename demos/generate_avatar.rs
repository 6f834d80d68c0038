//! Basic avatar image generation example.
//!
//! Run with: `cargo run --example generate_avatar`
//!
//! Requires `RUNWARE_API_KEY` environment variable.

use avatargen::{AnimeStyle, AvatarForm, GenerationResult, GenerationService, RunwareProvider};

#[tokio::main]
async fn main() -> avatargen::Result<()> {
    let provider = RunwareProvider::builder().build()?;

    let request = AvatarForm::new("a girl with long black hair fading to flame orange, pink kimono")
        .with_name("Nezuko")
        .with_style(AnimeStyle::Ghibli)
        .with_size("512x768")
        .build()?;

    println!("Prompt: {}", request.prompt());
    match provider.generate(&request).await? {
        GenerationResult::Ready { url, asset_id } => {
            println!("Image: {url}");
            if let Some(id) = asset_id {
                println!("Asset id (use it to animate): {id}");
            }
        }
        other => println!("Unexpected result: {other:?}"),
    }

    Ok(())
}
