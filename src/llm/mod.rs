// ABOUTME: Completion provider abstraction for the generative-AI endpoint
// ABOUTME: Request/response types, the provider trait and output sanitization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

//! # Completion Provider Interface
//!
//! Contract for the external generative endpoint. The application builds a
//! system instruction plus a prompt (text, optionally with an inline JPEG)
//! and receives opaque display text back. Model output is untrusted: callers
//! run it through [`sanitize::strip_markup`] before rendering.

mod gateway;
mod gemini;
pub mod prompts;
pub mod sanitize;

pub use gateway::{Gateway, CHAT_FALLBACK, PLATE_FALLBACK, RECIPE_FALLBACK};
pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::errors::AppResult;

/// JPEG mime type used for all inline image payloads
pub const JPEG_MIME: &str = "image/jpeg";

/// Prompt content for a completion request
#[derive(Debug, Clone)]
pub enum Prompt {
    /// Plain text prompt
    Text(String),
    /// Text prompt accompanied by an inline JPEG image
    TextWithImage {
        /// Prompt text
        text: String,
        /// Raw JPEG bytes
        jpeg: Vec<u8>,
    },
}

/// A single completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Prompt content
    pub prompt: Prompt,
    /// System instruction establishing persona and task
    pub system_instruction: String,
    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionRequest {
    /// Text-only request
    #[must_use]
    pub fn text(
        prompt: impl Into<String>,
        system_instruction: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            prompt: Prompt::Text(prompt.into()),
            system_instruction: system_instruction.into(),
            temperature,
        }
    }

    /// Request carrying an inline JPEG alongside the text
    #[must_use]
    pub fn with_image(
        prompt: impl Into<String>,
        jpeg: Vec<u8>,
        system_instruction: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            prompt: Prompt::TextWithImage {
                text: prompt.into(),
                jpeg,
            },
            system_instruction: system_instruction.into(),
            temperature,
        }
    }
}

/// Provider of text completions
///
/// Implementations perform exactly one attempt per call; retries are a
/// user-initiated concern, never automatic.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider identifier for logging
    fn name(&self) -> &'static str;

    /// Complete a request, returning the response text
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success API status, a
    /// malformed response body or an empty completion.
    async fn complete(&self, request: &CompletionRequest) -> AppResult<String>;
}
