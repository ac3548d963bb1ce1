// ABOUTME: Remote document store contract and its HTTP implementation
// ABOUTME: One document per user; create, field-level update and history append
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::models::{UserProfile, WeightEntry};

/// Remote document store holding one record per user
///
/// The running session never reads from it; it is a best-effort mirror of
/// local state. Implementations must not retry on failure; the adapter
/// logs and absorbs errors.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create the full profile document
    async fn create_profile(&self, profile: &UserProfile) -> AppResult<()>;

    /// Update the intolerance fields of an existing document
    async fn update_intolerances(
        &self,
        key: &str,
        intolerances: &[String],
        other: Option<&str>,
    ) -> AppResult<()>;

    /// Append one entry to the document's weight history
    async fn append_weight(&self, key: &str, entry: &WeightEntry) -> AppResult<()>;
}

/// HTTP implementation of [`RemoteStore`] against a document-store REST API
///
/// Documents live under `{base_url}/profiles/{key}`; history appends post to
/// the `weight-history` sub-resource so the server can apply an array union.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    base_url: String,
    client: Client,
}

impl HttpRemoteStore {
    /// Create a store client for the given base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client: Client::new(),
        }
    }

    fn document_url(&self, key: &str) -> String {
        format!("{}/profiles/{key}", self.base_url)
    }

    async fn check(response: reqwest::Response, what: &str) -> AppResult<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(AppError::external_service(
                "remote store",
                format!("{what} failed with status {status}"),
            ))
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn create_profile(&self, profile: &UserProfile) -> AppResult<()> {
        let url = self.document_url(&profile.storage_key());
        debug!(%url, "creating remote profile document");

        let response = self
            .client
            .put(&url)
            .json(profile)
            .send()
            .await
            .map_err(|err| {
                AppError::external_service("remote store", "create request failed")
                    .with_source(err)
            })?;
        Self::check(response, "profile create").await
    }

    async fn update_intolerances(
        &self,
        key: &str,
        intolerances: &[String],
        other: Option<&str>,
    ) -> AppResult<()> {
        let url = self.document_url(key);
        let body = json!({
            "intolerances": intolerances,
            "otherIntolerance": other,
        });

        let response = self
            .client
            .patch(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                AppError::external_service("remote store", "update request failed")
                    .with_source(err)
            })?;
        Self::check(response, "intolerance update").await
    }

    async fn append_weight(&self, key: &str, entry: &WeightEntry) -> AppResult<()> {
        let url = format!("{}/weight-history", self.document_url(key));

        let response = self
            .client
            .post(&url)
            .json(entry)
            .send()
            .await
            .map_err(|err| {
                AppError::external_service("remote store", "append request failed")
                    .with_source(err)
            })?;
        Self::check(response, "weight append").await
    }
}
