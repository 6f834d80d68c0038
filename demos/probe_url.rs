//! Check a media URL and print a cache-busted link.
//!
//! Run with: `cargo run --example probe_url -- https://vm.runware.ai/video/ws/2/vi/<task>.mp4`

use avatargen::{HttpExistenceCheck, PlaybackSource, ReadinessPoller, RetryPolicy, SystemClock};

#[tokio::main]
async fn main() -> avatargen::Result<()> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://vm.runware.ai/video/ws/2/vi/example.mp4".to_string());

    let poller = ReadinessPoller::new(HttpExistenceCheck::new()?, RetryPolicy::from_env()?);
    let outcome = poller.poll(&url).await;
    println!("{:?}", outcome);

    // What a player would switch to after one failed playback.
    let source = PlaybackSource::from_outcome(&outcome, &SystemClock);
    if let Some(retry) = source.heal(&SystemClock) {
        println!("Retry URL: {}", retry.url());
    }

    Ok(())
}
