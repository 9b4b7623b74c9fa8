//! Text-generation endpoint access.

pub mod client;

pub use client::{
    ChatCompletionsClient, Completion, CompletionRequest, MAX_TOKENS, TEMPERATURE, TextGenerator,
};

#[cfg(test)]
pub use client::MockTextGenerator;
