//! # SprintPulse Providers
//!
//! LLM provider implementations behind the [`Summarizer`] trait.
//! Any OpenAI-compatible chat-completion API works; providers differ
//! only by endpoint URL, API key, and model name.

pub mod openai_compatible;

use sprintpulse_core::config::LlmConfig;
use sprintpulse_core::traits::Summarizer;

pub use openai_compatible::OpenAiCompatibleSummarizer;

/// Create a summarizer from configuration.
pub fn create_summarizer(config: &LlmConfig) -> Box<dyn Summarizer> {
    Box::new(OpenAiCompatibleSummarizer::new(config))
}
