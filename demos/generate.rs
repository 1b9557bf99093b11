//! Basic image generation example.
//!
//! Run with: `cargo run --example generate -- "a red fox in snow"`
//!
//! Requires `OPENAI_API_KEY` environment variable.

use genstudio::{GenerationRequest, ImageProvider, ImageQuality, OpenAiImageProvider};

#[tokio::main]
async fn main() -> genstudio::Result<()> {
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "A golden retriever puppy playing in snow".into());
    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();

    let provider = OpenAiImageProvider::builder().build()?;
    let request = GenerationRequest::new(prompt, api_key).with_quality(ImageQuality::Hd);

    let image = provider.generate(&request).await?;
    println!("Generated image: {}", image.url);

    Ok(())
}
