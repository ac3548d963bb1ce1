// ABOUTME: Core data model for the Nutria companion
// ABOUTME: User profile, weight history, chat turns and the static phase catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

//! # Data Model
//!
//! User-owned data (`UserProfile`, `WeightEntry`), per-session conversation
//! turns (`ChatTurn`) and the read-only program catalog (`PhaseContent`).

mod catalog;
mod profile;

pub use catalog::{phase_content, PhaseContent, INTOLERANCE_OPTIONS, NO_INTOLERANCES, PHASES};
pub use profile::{normalized_name_key, Sex, UserProfile, WeightEntry};

use serde::{Deserialize, Serialize};

/// Sender of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human user
    User,
    /// The assistant model
    Model,
}

/// A single turn in one chat session
///
/// Turns are append-only for the lifetime of a session and are not persisted
/// across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who produced this turn
    pub role: Role,
    /// Display text
    pub text: String,
}

impl ChatTurn {
    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Create a model turn
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}
