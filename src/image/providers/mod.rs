//! Image generation providers.

mod openai;

pub use openai::{
    OpenAiImageModel, OpenAiImageProvider, OpenAiImageProviderBuilder, DEFAULT_BASE_URL,
};
