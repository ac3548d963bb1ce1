// ABOUTME: AI gateway: chat reply, recipe generation and plate analysis operations
// ABOUTME: Builds prompts from profile data and degrades failures to localized apology strings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

//! # AI Gateway
//!
//! The boundary over the external generative service. Each operation builds
//! a deterministic system instruction from profile data, performs exactly one
//! completion attempt and returns display text. The `try_` variants expose
//! the failure to callers that drive their own error state (the chat panel);
//! the plain variants return a fixed localized apology string instead, so
//! failures never propagate as structured errors.

use std::sync::Arc;

use tracing::error;

use super::{prompts, CompletionProvider, CompletionRequest};
use crate::errors::AppResult;
use crate::models::UserProfile;

/// Apology shown when a chat reply cannot be produced
pub const CHAT_FALLBACK: &str =
    "Ups, parece que mi conexión está un poco lenta. ¡Inténtalo de nuevo!";

/// Apology shown when recipe generation fails
pub const RECIPE_FALLBACK: &str = "Puxa, tive um problema técnico 😰. Por favor, tente novamente!";

/// Apology shown when plate analysis fails
pub const PLATE_FALLBACK: &str =
    "Lo siento, no pude analizar la imagen en este momento. Intenta de nuevo con una foto más clara.";

const CHAT_TEMPERATURE: f32 = 0.7;
const RECIPE_TEMPERATURE: f32 = 0.6;
const PLATE_TEMPERATURE: f32 = 0.5;

/// Gateway over the generative completion endpoint
#[derive(Clone)]
pub struct Gateway {
    provider: Arc<dyn CompletionProvider>,
}

impl Gateway {
    /// Create a gateway over the given provider
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Conversational reply to a raw user utterance
    ///
    /// # Errors
    ///
    /// Returns the underlying completion error; the chat panel maps it to its
    /// own fallback turn.
    pub async fn try_chat_reply(
        &self,
        user_text: &str,
        profile: &UserProfile,
    ) -> AppResult<String> {
        let request = CompletionRequest::text(
            user_text,
            prompts::chat_instruction(profile),
            CHAT_TEMPERATURE,
        );
        self.provider.complete(&request).await
    }

    /// Conversational reply, degraded to an apology string on failure
    pub async fn chat_reply(&self, user_text: &str, profile: &UserProfile) -> String {
        match self.try_chat_reply(user_text, profile).await {
            Ok(text) => text,
            Err(err) => {
                error!(provider = self.provider.name(), error = %err, "chat reply failed");
                CHAT_FALLBACK.to_owned()
            }
        }
    }

    /// Personalized recipe for the given phase, apology string on failure
    pub async fn recipe(&self, profile: &UserProfile, phase: u8) -> String {
        let request = CompletionRequest::text(
            prompts::RECIPE_USER_PROMPT,
            prompts::recipe_instruction(profile, phase),
            RECIPE_TEMPERATURE,
        );

        match self.provider.complete(&request).await {
            Ok(text) => text,
            Err(err) => {
                error!(provider = self.provider.name(), error = %err, "recipe generation failed");
                RECIPE_FALLBACK.to_owned()
            }
        }
    }

    /// Free-text report for a meal photo, apology string on failure
    pub async fn analyze_plate(&self, jpeg: Vec<u8>, profile: &UserProfile) -> String {
        let request = CompletionRequest::with_image(
            prompts::PLATE_USER_PROMPT,
            jpeg,
            prompts::plate_instruction(profile),
            PLATE_TEMPERATURE,
        );

        match self.provider.complete(&request).await {
            Ok(text) => text,
            Err(err) => {
                error!(provider = self.provider.name(), error = %err, "plate analysis failed");
                PLATE_FALLBACK.to_owned()
            }
        }
    }
}
