// ABOUTME: Two-step onboarding flow: name, biometrics, simulated analysis, assessment
// ABOUTME: Validates at the form layer and persists the new profile on completion

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

//! # Onboarding
//!
//! First-run flow producing a persisted profile. Two form steps with
//! form-layer validation, a fixed "analyzing" wait, then a result screen
//! carrying the initial assessment. The calculator never sees a zero height
//! or weight; bad values are rejected here.

use std::time::Duration;

use chrono::Utc;

use crate::errors::{AppError, AppResult};
use crate::models::{Sex, UserProfile};
use crate::program::Assessment;
use crate::store::{ProfileHandle, ProfileStore};

/// Simulated analysis wait before the result screen
pub const DEFAULT_ANALYSIS_DELAY: Duration = Duration::from_secs(3);

/// Biometric form values for the second step
#[derive(Debug, Clone, Copy)]
pub struct Biometrics {
    /// Age in years
    pub age: u32,
    /// Height in centimeters
    pub height_cm: f64,
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Goal weight in kilograms
    pub target_weight_kg: f64,
    /// Self-reported sex
    pub sex: Sex,
}

/// Where the flow currently is
#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingState {
    /// Step 1: waiting for a name
    Name,
    /// Step 2: waiting for biometrics
    Biometrics { name: String },
    /// Analysis done; result ready to show
    Result {
        profile: UserProfile,
        assessment: Assessment,
    },
    /// Profile persisted; flow finished
    Complete,
}

/// The onboarding flow
pub struct OnboardingFlow {
    store: ProfileStore,
    state: OnboardingState,
    analysis_delay: Duration,
}

impl OnboardingFlow {
    /// Start a fresh flow at step 1
    #[must_use]
    pub fn new(store: ProfileStore) -> Self {
        Self::with_delay(store, DEFAULT_ANALYSIS_DELAY)
    }

    /// Start a flow with a custom analysis wait (tests use zero)
    #[must_use]
    pub fn with_delay(store: ProfileStore, analysis_delay: Duration) -> Self {
        Self {
            store,
            state: OnboardingState::Name,
            analysis_delay,
        }
    }

    /// Current flow state
    #[must_use]
    pub fn state(&self) -> &OnboardingState {
        &self.state
    }

    /// Submit the name, advancing to the biometrics step
    ///
    /// # Errors
    ///
    /// Returns an error when the flow is past step 1 or the trimmed name is
    /// empty.
    pub fn submit_name(&mut self, name: &str) -> AppResult<()> {
        if !matches!(self.state, OnboardingState::Name) {
            return Err(AppError::invalid_input("name step already completed"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::missing_field("name"));
        }
        self.state = OnboardingState::Biometrics {
            name: name.to_owned(),
        };
        Ok(())
    }

    /// Return from the biometrics step to the name step
    pub fn back(&mut self) {
        if matches!(self.state, OnboardingState::Biometrics { .. }) {
            self.state = OnboardingState::Name;
        }
    }

    /// Submit biometrics, run the analysis wait and produce the assessment
    ///
    /// # Errors
    ///
    /// Returns an error when the flow is not at step 2 or any value is
    /// missing or non-positive.
    pub async fn submit_biometrics(&mut self, form: Biometrics) -> AppResult<Assessment> {
        let OnboardingState::Biometrics { name } = &self.state else {
            return Err(AppError::invalid_input("biometrics step is not active"));
        };

        validate(&form)?;

        tokio::time::sleep(self.analysis_delay).await;

        let profile = UserProfile::new(
            name.clone(),
            form.age,
            form.height_cm,
            form.weight_kg,
            Some(form.target_weight_kg),
            form.sex,
        );
        let assessment = Assessment::for_profile(&profile, Utc::now().timestamp_millis());

        self.state = OnboardingState::Result {
            profile,
            assessment: assessment.clone(),
        };
        Ok(assessment)
    }

    /// Persist the profile and finish the flow
    ///
    /// # Errors
    ///
    /// Returns an error when the flow has no result yet or local persistence
    /// fails. On failure the flow stays at the result screen so the user can
    /// retry.
    pub async fn complete(&mut self) -> AppResult<ProfileHandle> {
        let OnboardingState::Result { profile, .. } = &self.state else {
            return Err(AppError::invalid_input("no assessment to complete with"));
        };

        self.store.create(profile).await?;
        let handle = ProfileHandle::new(profile.clone(), self.store.clone());
        self.state = OnboardingState::Complete;
        Ok(handle)
    }
}

fn validate(form: &Biometrics) -> AppResult<()> {
    if form.age == 0 {
        return Err(AppError::out_of_range("age must be positive"));
    }
    if form.height_cm <= 0.0 {
        return Err(AppError::out_of_range("height must be positive"));
    }
    if form.weight_kg <= 0.0 {
        return Err(AppError::out_of_range("weight must be positive"));
    }
    if form.target_weight_kg <= 0.0 {
        return Err(AppError::out_of_range("target weight must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;

    fn test_store(dir: &tempfile::TempDir) -> ProfileStore {
        ProfileStore::new(LocalStore::new(dir.path()), None)
    }

    fn test_biometrics() -> Biometrics {
        Biometrics {
            age: 42,
            height_cm: 170.0,
            weight_kg: 80.0,
            target_weight_kg: 70.0,
            sex: Sex::Female,
        }
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut flow = OnboardingFlow::with_delay(test_store(&dir), Duration::ZERO);

        assert!(flow.submit_name("   ").is_err());
        assert_eq!(*flow.state(), OnboardingState::Name);

        flow.submit_name("  Ana  ").unwrap();
        assert_eq!(
            *flow.state(),
            OnboardingState::Biometrics {
                name: "Ana".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn test_biometrics_require_positive_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut flow = OnboardingFlow::with_delay(test_store(&dir), Duration::ZERO);
        flow.submit_name("Ana").unwrap();

        let mut form = test_biometrics();
        form.height_cm = 0.0;
        assert!(flow.submit_biometrics(form).await.is_err());

        // flow stays at step 2 and accepts a corrected form
        form.height_cm = 170.0;
        assert!(flow.submit_biometrics(form).await.is_ok());
    }

    #[tokio::test]
    async fn test_back_returns_to_name_step() {
        let dir = tempfile::tempdir().unwrap();
        let mut flow = OnboardingFlow::with_delay(test_store(&dir), Duration::ZERO);
        flow.submit_name("Ana").unwrap();

        flow.back();
        assert_eq!(*flow.state(), OnboardingState::Name);
    }

    #[tokio::test]
    async fn test_full_flow_persists_profile_with_seeded_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        let mut flow = OnboardingFlow::with_delay(store.clone(), Duration::ZERO);

        flow.submit_name("Ana").unwrap();
        let assessment = flow.submit_biometrics(test_biometrics()).await.unwrap();
        assert_eq!(assessment.day, 1);
        assert_eq!(assessment.phase, 1);
        assert_eq!(assessment.bmi_display(), "27.7");
        assert_eq!(assessment.weight_to_goal, "10.0");

        let handle = flow.complete().await.unwrap();
        assert_eq!(*flow.state(), OnboardingState::Complete);

        let snapshot = handle.snapshot().await;
        assert_eq!(snapshot.weight_history.len(), 1);

        let reloaded = store.load().await.unwrap().unwrap();
        assert_eq!(reloaded.name, "Ana");
    }

    #[tokio::test]
    async fn test_steps_cannot_be_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut flow = OnboardingFlow::with_delay(test_store(&dir), Duration::ZERO);

        assert!(flow.submit_biometrics(test_biometrics()).await.is_err());
        assert!(flow.complete().await.is_err());
    }
}
