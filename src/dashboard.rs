// ABOUTME: Dashboard orchestration: summary snapshot, weight entry, quiz gate, recipe
// ABOUTME: Pairs recipe generation with a minimum-latency timer and caches per phase

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

//! # Dashboard
//!
//! The home screen's behavior without its rendering: a summary snapshot for
//! display, weight entry with a duplicate-submission guard, the intolerance
//! quiz gate in front of recipe generation, and the recipe call itself,
//! which resolves only after both the gateway reply and a fixed minimum wait
//! are done.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::errors::{AppError, AppResult};
use crate::llm::{sanitize, Gateway, RECIPE_FALLBACK};
use crate::models::{phase_content, PhaseContent, WeightEntry};
use crate::program::Assessment;
use crate::store::ProfileHandle;

/// Minimum time a recipe request takes, even when the gateway is faster
pub const DEFAULT_RECIPE_MIN_WAIT: Duration = Duration::from_secs(5);

/// Everything the home screen renders
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    /// Greeting name
    pub name: String,
    /// Day, phase, weight, BMI and goal gap
    pub assessment: Assessment,
    /// Static content for the current phase
    pub phase: &'static PhaseContent,
    /// Chart series in insertion order
    pub chart: Vec<WeightEntry>,
}

/// The dashboard orchestrator
#[derive(Clone)]
pub struct Dashboard {
    gateway: Gateway,
    profile: ProfileHandle,
    saving_weight: Arc<AtomicBool>,
    recipe_cache: Arc<Mutex<Option<(u8, String)>>>,
    recipe_min_wait: Duration,
}

impl Dashboard {
    /// Create a dashboard over the shared profile
    #[must_use]
    pub fn new(gateway: Gateway, profile: ProfileHandle) -> Self {
        Self::with_min_wait(gateway, profile, DEFAULT_RECIPE_MIN_WAIT)
    }

    /// Create a dashboard with a custom recipe minimum wait (tests use zero)
    #[must_use]
    pub fn with_min_wait(
        gateway: Gateway,
        profile: ProfileHandle,
        recipe_min_wait: Duration,
    ) -> Self {
        Self {
            gateway,
            profile,
            saving_weight: Arc::new(AtomicBool::new(false)),
            recipe_cache: Arc::new(Mutex::new(None)),
            recipe_min_wait,
        }
    }

    /// Snapshot of everything the home screen shows, as of now
    pub async fn summary(&self) -> DashboardSummary {
        let profile = self.profile.snapshot().await;
        let assessment = Assessment::for_profile(&profile, Utc::now().timestamp_millis());
        let phase = phase_content(assessment.phase);

        DashboardSummary {
            name: profile.name,
            assessment,
            phase,
            chart: profile.weight_history,
        }
    }

    /// Append a weight measurement dated now
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive weight, when a previous save is
    /// still pending, or when local persistence fails.
    pub async fn record_weight(&self, weight_kg: f64) -> AppResult<WeightEntry> {
        if weight_kg <= 0.0 {
            return Err(AppError::out_of_range("weight must be positive"));
        }
        if self.saving_weight.swap(true, Ordering::SeqCst) {
            return Err(AppError::locked("a weight save is already in progress"));
        }

        let result = self.profile.record_weight(weight_kg).await;
        self.saving_weight.store(false, Ordering::SeqCst);
        result
    }

    /// Whether the intolerance quiz must run before a recipe can be requested
    pub async fn needs_intolerance_quiz(&self) -> bool {
        !self.profile.snapshot().await.has_recorded_intolerances()
    }

    /// Record quiz results; an empty selection still marks the quiz as taken
    ///
    /// # Errors
    ///
    /// Returns an error when local persistence fails.
    pub async fn save_intolerances(
        &self,
        selections: Vec<String>,
        other: Option<String>,
    ) -> AppResult<()> {
        self.profile.set_intolerances(selections, other).await
    }

    /// Generate today's recipe for the current phase
    ///
    /// The gateway call and the minimum-latency timer run concurrently; the
    /// result is ready only when both are. A successful recipe is cached for
    /// the phase, so re-opening the screen within the same phase does not
    /// re-generate.
    ///
    /// # Errors
    ///
    /// Returns an error when the intolerance quiz has never been taken.
    pub async fn request_recipe(&self) -> AppResult<String> {
        let profile = self.profile.snapshot().await;
        if !profile.has_recorded_intolerances() {
            return Err(AppError::locked("intolerance quiz pending"));
        }

        let assessment = Assessment::for_profile(&profile, Utc::now().timestamp_millis());
        let phase = assessment.phase;

        if let Some((cached_phase, text)) = self.recipe_cache.lock().await.as_ref() {
            if *cached_phase == phase {
                return Ok(text.clone());
            }
        }

        let (raw, ()) = tokio::join!(
            self.gateway.recipe(&profile, phase),
            tokio::time::sleep(self.recipe_min_wait),
        );
        let text = sanitize::strip_markup(&raw);

        // apologies are not worth re-showing; only cache a real recipe
        if text != RECIPE_FALLBACK {
            *self.recipe_cache.lock().await = Some((phase, text.clone()));
        }
        Ok(text)
    }
}
