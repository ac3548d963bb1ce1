// ABOUTME: Profile store adapter: local write-through with best-effort remote mirror
// ABOUTME: ProfileHandle is the single shared in-memory profile with a narrow mutation API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

//! # Profile Store Adapter
//!
//! Every profile mutation writes through to local storage first; the remote
//! document store is a mirror, written best-effort. A remote failure is
//! logged and absorbed so the UI-visible profile state stays consistent.
//! Startup reads local storage only; an absent document routes the user to
//! onboarding.

mod local;
mod remote;

pub use local::LocalStore;
pub use remote::{HttpRemoteStore, RemoteStore};

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::errors::AppResult;
use crate::models::{UserProfile, WeightEntry, NO_INTOLERANCES};

/// Write-through store combining local persistence with a remote mirror
#[derive(Clone)]
pub struct ProfileStore {
    local: LocalStore,
    remote: Option<Arc<dyn RemoteStore>>,
}

impl ProfileStore {
    /// Create a store; `remote` is optional (local-only mode)
    #[must_use]
    pub fn new(local: LocalStore, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self { local, remote }
    }

    /// Load the saved profile from local storage only
    ///
    /// # Errors
    ///
    /// Returns an error when a saved document exists but cannot be read.
    pub async fn load(&self) -> AppResult<Option<UserProfile>> {
        self.local.load().await
    }

    /// Persist a newly created profile
    ///
    /// The local write must succeed; the remote create is best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error only when local persistence fails.
    pub async fn create(&self, profile: &UserProfile) -> AppResult<()> {
        self.local.save(profile).await?;

        if let Some(remote) = &self.remote {
            if let Err(err) = remote.create_profile(profile).await {
                warn!(error = %err, "remote profile create failed, continuing local-only");
            }
        }
        Ok(())
    }

    /// Persist an intolerance update for an existing profile
    ///
    /// # Errors
    ///
    /// Returns an error only when local persistence fails.
    pub async fn save_intolerances(&self, profile: &UserProfile) -> AppResult<()> {
        self.local.save(profile).await?;

        if let Some(remote) = &self.remote {
            let intolerances = profile.intolerances.clone().unwrap_or_default();
            if let Err(err) = remote
                .update_intolerances(
                    &profile.storage_key(),
                    &intolerances,
                    profile.other_intolerance.as_deref(),
                )
                .await
            {
                warn!(error = %err, "remote intolerance update failed, continuing local-only");
            }
        }
        Ok(())
    }

    /// Persist a weight-history append for an existing profile
    ///
    /// # Errors
    ///
    /// Returns an error only when local persistence fails.
    pub async fn save_weight_entry(
        &self,
        profile: &UserProfile,
        entry: &WeightEntry,
    ) -> AppResult<()> {
        self.local.save(profile).await?;

        if let Some(remote) = &self.remote {
            if let Err(err) = remote.append_weight(&profile.storage_key(), entry).await {
                warn!(error = %err, "remote weight append failed, continuing local-only");
            }
        }
        Ok(())
    }
}

/// Shared in-memory profile container
///
/// A single consistent profile visible to all screens. All writes go through
/// the narrow mutation API here, so every mutation path hits the store
/// adapter consistently; sibling views clone the handle, not the profile.
#[derive(Clone)]
pub struct ProfileHandle {
    profile: Arc<RwLock<UserProfile>>,
    store: ProfileStore,
}

impl ProfileHandle {
    /// Wrap an already-persisted profile
    #[must_use]
    pub fn new(profile: UserProfile, store: ProfileStore) -> Self {
        Self {
            profile: Arc::new(RwLock::new(profile)),
            store,
        }
    }

    /// Current profile snapshot
    pub async fn snapshot(&self) -> UserProfile {
        self.profile.read().await.clone()
    }

    /// Append a weight measurement dated now
    ///
    /// The entry is visible in memory and in local storage even when the
    /// remote mirror write fails.
    ///
    /// # Errors
    ///
    /// Returns an error when local persistence fails; the in-memory append is
    /// rolled back in that case.
    pub async fn record_weight(&self, weight_kg: f64) -> AppResult<WeightEntry> {
        let entry = WeightEntry {
            date: Utc::now().timestamp_millis(),
            weight: weight_kg,
        };

        let mut profile = self.profile.write().await;
        profile.weight_history.push(entry);

        if let Err(err) = self.store.save_weight_entry(&profile, &entry).await {
            profile.weight_history.pop();
            return Err(err);
        }
        Ok(entry)
    }

    /// Record quiz results
    ///
    /// An empty selection is stored as the `"Nenhuma"` sentinel so a
    /// completed quiz is distinguishable from one never taken.
    ///
    /// # Errors
    ///
    /// Returns an error when local persistence fails.
    pub async fn set_intolerances(
        &self,
        selections: Vec<String>,
        other: Option<String>,
    ) -> AppResult<()> {
        let stored = if selections.is_empty() {
            vec![NO_INTOLERANCES.to_owned()]
        } else {
            selections
        };

        let mut profile = self.profile.write().await;
        let previous = (
            profile.intolerances.take(),
            profile.other_intolerance.take(),
        );
        profile.intolerances = Some(stored);
        profile.other_intolerance = other.filter(|text| !text.trim().is_empty());

        if let Err(err) = self.store.save_intolerances(&profile).await {
            (profile.intolerances, profile.other_intolerance) = previous;
            return Err(err);
        }
        Ok(())
    }
}
