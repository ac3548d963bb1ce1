// ABOUTME: Plate inspector: frame capture flow and photo analysis via the gateway
// ABOUTME: FrameSource models camera/file capture; release happens on every exit path

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

//! # Plate Inspector
//!
//! Capture a meal photo and run it through the gateway for a free-text
//! report. The capture device is behind the [`FrameSource`] trait so a
//! camera, a file on disk and a test fake all drive the same flow. An
//! acquired source is always released: after a capture (successful or not),
//! on reset, and on drop.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::{sanitize, Gateway};
use crate::store::ProfileHandle;

/// A device or file that yields JPEG frames
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Source identifier for logging
    fn name(&self) -> &'static str;

    /// Acquire the device
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` when access is refused; the flow surfaces
    /// that as a blocking message and halts until the user retries.
    async fn acquire(&self) -> AppResult<()>;

    /// Capture one frame as JPEG bytes
    ///
    /// # Errors
    ///
    /// Returns an error when no frame can be produced.
    async fn capture(&self) -> AppResult<Vec<u8>>;

    /// Release the device; must be safe to call more than once
    fn release(&self);
}

/// Frame source reading a JPEG from disk
///
/// The terminal front-end's stand-in for a camera.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Source for the given file path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FrameSource for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn acquire(&self) -> AppResult<()> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(AppError::invalid_input(format!(
                "{} is not a file",
                self.path.display()
            ))),
            Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => Err(
                AppError::permission_denied(format!("cannot read {}", self.path.display()))
                    .with_source(err),
            ),
            Err(err) => Err(AppError::not_found(format!(
                "no image at {}",
                self.path.display()
            ))
            .with_source(err)),
        }
    }

    async fn capture(&self) -> AppResult<Vec<u8>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|err| {
            AppError::storage(format!("could not read {}", self.path.display()))
                .with_source(err)
        })?;

        // JPEG start-of-image marker
        if !bytes.starts_with(&[0xFF, 0xD8]) {
            return Err(AppError::invalid_input(format!(
                "{} is not a JPEG image",
                self.path.display()
            )));
        }
        Ok(bytes)
    }

    fn release(&self) {}
}

/// Where the inspector currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectorState {
    /// No image yet; a source may be live
    AwaitingImage,
    /// A frame is captured and ready to analyze
    ImageReady,
    /// Analysis produced a report
    Report(String),
}

/// The plate inspection flow
pub struct PlateInspector {
    gateway: Gateway,
    profile: ProfileHandle,
    source: Option<Arc<dyn FrameSource>>,
    image: Option<Vec<u8>>,
    state: InspectorState,
}

impl PlateInspector {
    /// Create an inspector over the shared profile
    #[must_use]
    pub fn new(gateway: Gateway, profile: ProfileHandle) -> Self {
        Self {
            gateway,
            profile,
            source: None,
            image: None,
            state: InspectorState::AwaitingImage,
        }
    }

    /// Current flow state
    #[must_use]
    pub fn state(&self) -> &InspectorState {
        &self.state
    }

    /// Acquire a frame source, making it live
    ///
    /// # Errors
    ///
    /// Returns the acquisition error; `PermissionDenied` is the blocking
    /// case the front-end shows verbatim. The flow stays at `AwaitingImage`
    /// and no source is held.
    pub async fn open(&mut self, source: Arc<dyn FrameSource>) -> AppResult<()> {
        self.close_source();

        if let Err(err) = source.acquire().await {
            if err.code == ErrorCode::PermissionDenied {
                warn!(source = source.name(), "capture permission refused");
            }
            return Err(err);
        }
        self.source = Some(source);
        self.state = InspectorState::AwaitingImage;
        Ok(())
    }

    /// Capture a frame from the live source
    ///
    /// The source is released whether or not the capture succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when no source is live or the capture fails.
    pub async fn capture(&mut self) -> AppResult<()> {
        let Some(source) = self.source.take() else {
            return Err(AppError::invalid_input("no capture source is open"));
        };

        let result = source.capture().await;
        source.release();

        let jpeg = result?;
        self.image = Some(jpeg);
        self.state = InspectorState::ImageReady;
        Ok(())
    }

    /// Analyze the captured frame, producing the report
    ///
    /// Gateway failures come back as the localized apology text, so this
    /// only errors when no image is ready.
    ///
    /// # Errors
    ///
    /// Returns an error when called before a frame is captured.
    pub async fn analyze(&mut self) -> AppResult<String> {
        let Some(jpeg) = self.image.take() else {
            return Err(AppError::invalid_input("no image to analyze"));
        };

        let profile = self.profile.snapshot().await;
        let report = sanitize::strip_markup(&self.gateway.analyze_plate(jpeg, &profile).await);

        self.state = InspectorState::Report(report.clone());
        Ok(report)
    }

    /// Discard any image or report and release a live source
    pub fn reset(&mut self) {
        self.close_source();
        self.image = None;
        self.state = InspectorState::AwaitingImage;
    }

    fn close_source(&mut self) {
        if let Some(source) = self.source.take() {
            source.release();
        }
    }
}

impl Drop for PlateInspector {
    fn drop(&mut self) {
        self.close_source();
    }
}
