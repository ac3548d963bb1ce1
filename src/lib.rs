// ABOUTME: Nutria library: guided wellness companion around a psyllium program
// ABOUTME: Profile storage, program calculator, AI gateway and the interactive flows

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

//! # Nutria
//!
//! Companion for a phased psyllium wellness program. The library exposes
//! every user-facing flow as a typed, testable API:
//!
//! - [`onboarding`]: first-run profile creation with an initial assessment
//! - [`dashboard`]: program summary, weight tracking and recipe generation
//! - [`chat`]: conversational assistant with staged reply delivery
//! - [`inspector`]: meal-photo analysis
//!
//! Underneath sit the pure [`program`] calculator, the write-through
//! [`store`] adapter and the [`llm`] gateway over the generative endpoint.
//! The binary in `src/bin/nutria.rs` wires these to a terminal front-end.

pub mod chat;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod inspector;
pub mod llm;
pub mod logging;
pub mod models;
pub mod onboarding;
pub mod program;
pub mod store;
