// ABOUTME: Google Gemini implementation of the completion provider
// ABOUTME: generateContent calls with system instruction, temperature and inline JPEG support
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

//! # Gemini Provider
//!
//! Implementation of [`CompletionProvider`] for Google's Generative AI API.
//! The credential comes from the `GEMINI_API_KEY` environment variable.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{CompletionProvider, CompletionRequest, Prompt, JPEG_MIME};
use crate::config::GEMINI_API_KEY_ENV;
use crate::errors::{AppError, AppResult};

/// Model used for every operation
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction")]
    system_instruction: GeminiContent,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    /// Base64-encoded payload
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Google Gemini completion provider
pub struct GeminiClient {
    api_key: String,
    client: Client,
    model: String,
}

impl GeminiClient {
    /// Create a client with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Create a client from the `GEMINI_API_KEY` environment variable
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not set.
    pub fn from_env() -> AppResult<Self> {
        let api_key = std::env::var(GEMINI_API_KEY_ENV).map_err(|_| {
            AppError::config(format!("{GEMINI_API_KEY_ENV} environment variable not set"))
        })?;
        Ok(Self::new(api_key))
    }

    /// Override the model identifier
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn request_url(&self) -> String {
        format!(
            "{API_BASE_URL}/models/{}:generateContent?key={}",
            self.model, self.api_key
        )
    }

    fn build_request(request: &CompletionRequest) -> GeminiRequest {
        let parts = match &request.prompt {
            Prompt::Text(text) => vec![ContentPart::Text { text: text.clone() }],
            Prompt::TextWithImage { text, jpeg } => vec![
                ContentPart::InlineData {
                    inline_data: InlineData {
                        mime_type: JPEG_MIME.to_owned(),
                        data: BASE64.encode(jpeg),
                    },
                },
                ContentPart::Text { text: text.clone() },
            ],
        };

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_owned()),
                parts,
            }],
            system_instruction: GeminiContent {
                role: None,
                parts: vec![ContentPart::Text {
                    text: request.system_instruction.clone(),
                }],
            },
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        }
    }

    fn extract_text(response: GeminiResponse) -> AppResult<String> {
        if let Some(error) = response.error {
            return Err(AppError::external_service("gemini", error.message));
        }

        let text = response
            .candidates
            .and_then(|mut candidates| {
                if candidates.is_empty() {
                    None
                } else {
                    candidates.swap_remove(0).content
                }
            })
            .and_then(|content| {
                content.parts.into_iter().find_map(|part| match part {
                    ContentPart::Text { text } => Some(text),
                    ContentPart::InlineData { .. } => None,
                })
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            Err(AppError::external_service("gemini", "empty completion"))
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> AppResult<String> {
        let body = Self::build_request(request);

        debug!(model = %self.model, "sending request to Gemini API");

        let response = self
            .client
            .post(self.request_url())
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                AppError::external_service("gemini", "request failed").with_source(err)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|err| {
            AppError::external_service("gemini", "could not read response").with_source(err)
        })?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            let message = serde_json::from_str::<GeminiResponse>(&text)
                .ok()
                .and_then(|parsed| parsed.error)
                .map_or(text, |api_error| api_error.message);
            return Err(AppError::external_service(
                "gemini",
                format!("API error ({status}): {message}"),
            ));
        }

        let parsed: GeminiResponse = serde_json::from_str(&text).map_err(|err| {
            error!(error = %err, "failed to parse Gemini response");
            AppError::external_service("gemini", "malformed response").with_source(err)
        })?;

        Self::extract_text(parsed)
    }
}

impl Debug for GeminiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_serializes_inline_image() {
        let request = CompletionRequest::with_image("mira", vec![0xFF, 0xD8], "persona", 0.5);
        let body = GeminiClient::build_request(&request);
        let json = serde_json::to_value(&body).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert!(parts[0]["inlineData"]["mimeType"] == "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], BASE64.encode([0xFF, 0xD8]));
        assert_eq!(parts[1]["text"], "mira");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "persona");
        assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_extract_text_from_first_candidate() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"hola"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(GeminiClient::extract_text(response).unwrap(), "hola");
    }

    #[test]
    fn test_extract_text_rejects_empty_completion() {
        let response: GeminiResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#)
                .unwrap();
        assert!(GeminiClient::extract_text(response).is_err());
    }

    #[test]
    fn test_extract_text_surfaces_api_error() {
        let response: GeminiResponse =
            serde_json::from_str(r#"{"error":{"message":"quota exhausted"}}"#).unwrap();
        let err = GeminiClient::extract_text(response).unwrap_err();
        assert!(err.to_string().contains("quota exhausted"));
    }
}
