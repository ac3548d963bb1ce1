// ABOUTME: Local on-device persistence: one JSON document holding the user profile
// ABOUTME: Absence of the document routes the user to onboarding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::models::UserProfile;

/// File name of the single local document
const PROFILE_FILE: &str = "profile.json";

/// Local persistence for the profile document
///
/// A single serialized `UserProfile` under the data directory. Read once at
/// startup and rewritten on every profile mutation; it is the source of truth
/// for the running session, with the remote store acting as a mirror.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at the given data directory
    #[must_use]
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(PROFILE_FILE),
        }
    }

    /// Path of the profile document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved profile, if any
    ///
    /// Returns `Ok(None)` when no document exists yet, which routes the user
    /// to onboarding.
    ///
    /// # Errors
    ///
    /// Returns an error when the document exists but cannot be read or parsed.
    pub async fn load(&self) -> AppResult<Option<UserProfile>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(AppError::storage(format!(
                    "could not read {}",
                    self.path.display()
                ))
                .with_source(err))
            }
        };

        let profile = serde_json::from_slice(&bytes).map_err(|err| {
            AppError::serialization("saved profile document is not valid JSON").with_source(err)
        })?;
        Ok(Some(profile))
    }

    /// Write the profile document, creating the data directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error when the directory or file cannot be written.
    pub async fn save(&self, profile: &UserProfile) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                AppError::storage(format!("could not create {}", parent.display()))
                    .with_source(err)
            })?;
        }

        let bytes = serde_json::to_vec_pretty(profile)
            .map_err(|err| AppError::serialization("could not encode profile").with_source(err))?;

        tokio::fs::write(&self.path, bytes).await.map_err(|err| {
            AppError::storage(format!("could not write {}", self.path.display())).with_source(err)
        })?;

        debug!(path = %self.path.display(), "profile saved locally");
        Ok(())
    }
}
