// ABOUTME: UserProfile and WeightEntry definitions with serde wire compatibility
// ABOUTME: Identity, biometrics and program state persisted locally and mirrored remotely
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Self-reported sex, serialized with the wire labels of existing documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Sex {
    /// Female
    #[default]
    #[serde(rename = "Femenino")]
    Female,
    /// Male
    #[serde(rename = "Masculino")]
    Male,
    /// Prefer not to say
    #[serde(rename = "Prefiero no decir")]
    Unspecified,
}

/// One weight measurement, appended to the profile history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    /// Measurement timestamp in epoch milliseconds
    pub date: i64,
    /// Weight in kilograms
    pub weight: f64,
}

/// Identity, biometrics and program state for one user
///
/// The profile is created once at onboarding completion. `start_date` is
/// immutable afterwards and anchors program-day calculations; the weight
/// history is append-only in insertion order.
///
/// Field names serialize in the camelCase form used by existing remote
/// documents (`targetWeight`, `startDate`, `weightHistory`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Stable document identifier, generated at creation
    ///
    /// Earlier clients keyed remote documents by normalized name, which
    /// collides for users sharing a name; see [`normalized_name_key`].
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Height in centimeters
    pub height: f64,
    /// Weight in kilograms recorded at onboarding
    pub weight: f64,
    /// Goal weight in kilograms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    /// Self-reported sex
    pub sex: Sex,
    /// Program start in epoch milliseconds, set once at creation
    pub start_date: i64,
    /// Recorded intolerances
    ///
    /// `None` means the quiz was never taken; a user who took the quiz and
    /// selected nothing is stored as the [`crate::models::NO_INTOLERANCES`]
    /// sentinel, never as an empty list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intolerances: Option<Vec<String>>,
    /// Free-text restriction captured alongside the fixed options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_intolerance: Option<String>,
    /// Weight measurements in insertion order, append-only
    #[serde(default)]
    pub weight_history: Vec<WeightEntry>,
}

impl UserProfile {
    /// Create a new profile at program start
    ///
    /// Seeds the weight history with the initial measurement so the chart has
    /// a first point, and anchors `start_date` to the current instant.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        age: u32,
        height: f64,
        weight: f64,
        target_weight: Option<f64>,
        sex: Sex,
    ) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            age,
            height,
            weight,
            target_weight,
            sex,
            start_date: now,
            intolerances: None,
            other_intolerance: None,
            weight_history: vec![WeightEntry { date: now, weight }],
        }
    }

    /// Latest known weight in kilograms
    ///
    /// The last history entry when the history is non-empty, otherwise the
    /// scalar weight recorded at onboarding.
    #[must_use]
    pub fn current_weight(&self) -> f64 {
        self.weight_history
            .last()
            .map_or(self.weight, |entry| entry.weight)
    }

    /// Remote document key for this profile
    #[must_use]
    pub fn storage_key(&self) -> String {
        self.id.to_string()
    }

    /// Whether the intolerance quiz was ever completed
    ///
    /// Presence of a non-empty list is what distinguishes "asked" from
    /// "never asked"; the sentinel value covers "asked but has none".
    #[must_use]
    pub fn has_recorded_intolerances(&self) -> bool {
        self.intolerances
            .as_ref()
            .is_some_and(|list| !list.is_empty())
    }
}

/// Legacy document key: lowercased name with spaces replaced by underscores
///
/// Kept for reading documents created by older clients. New documents are
/// keyed by profile id because normalized names collide ("Maria Garcia"
/// twice maps to the same key).
#[must_use]
pub fn normalized_name_key(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}
