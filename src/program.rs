// ABOUTME: Pure program calculations: elapsed days, phase selection, BMI and goal gap
// ABOUTME: No I/O and no error paths; inputs are validated at the form layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

//! # Program Calculator
//!
//! Pure functions mapping (height, weight, target, elapsed days) to the
//! numbers the dashboard and onboarding result screens display. Height and
//! weight are guaranteed positive by form validation upstream, so there are
//! no error conditions here.

use crate::models::UserProfile;

/// Milliseconds per day
pub const MS_PER_DAY: i64 = 86_400_000;

/// Program day for a given instant, 1-based
///
/// Always at least 1, even when the start date is now or in the future.
#[must_use]
pub fn days_elapsed(start_ms: i64, now_ms: i64) -> i64 {
    let diff = now_ms.saturating_sub(start_ms);
    (diff.div_euclid(MS_PER_DAY) + 1).max(1)
}

/// Phase for a program day: days 1-10 phase 1, 11-60 phase 2, 61+ phase 3
#[must_use]
pub const fn phase_for_day(day: i64) -> u8 {
    if day <= 10 {
        1
    } else if day <= 60 {
        2
    } else {
        3
    }
}

/// Body Mass Index: weight(kg) / height(m)²
#[must_use]
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// BMI classification with the display labels of the result screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    /// BMI below 18.5
    Underweight,
    /// BMI below 24.9
    Normal,
    /// BMI below 29.9
    Overweight,
    /// BMI below 34.9
    ObesityClassI,
    /// BMI below 39.9
    ObesityClassII,
    /// BMI of 39.9 and above
    ObesityClassIII,
}

impl BmiCategory {
    /// Classify a BMI value
    ///
    /// Comparisons are strict-less-than, so a boundary value (24.9, 29.9, ...)
    /// falls into the higher category.
    #[must_use]
    pub fn from_bmi(value: f64) -> Self {
        if value < 18.5 {
            Self::Underweight
        } else if value < 24.9 {
            Self::Normal
        } else if value < 29.9 {
            Self::Overweight
        } else if value < 34.9 {
            Self::ObesityClassI
        } else if value < 39.9 {
            Self::ObesityClassII
        } else {
            Self::ObesityClassIII
        }
    }

    /// Localized display label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Underweight => "Bajo Peso",
            Self::Normal => "Peso Normal",
            Self::Overweight => "Exceso de Peso",
            Self::ObesityClassI => "Obesidad Clase I",
            Self::ObesityClassII => "Obesidad Clase II",
            Self::ObesityClassIII => "Obesidad Mórbida",
        }
    }
}

/// Remaining kilograms to the goal weight, never negative
#[must_use]
pub fn weight_to_goal_kg(current_kg: f64, target_kg: Option<f64>) -> f64 {
    target_kg.map_or(0.0, |target| (current_kg - target).max(0.0))
}

/// Goal gap rendered for display: `"0"` when no target or goal met,
/// otherwise one decimal (`"10.0"`)
#[must_use]
pub fn weight_to_goal_display(current_kg: f64, target_kg: Option<f64>) -> String {
    let gap = weight_to_goal_kg(current_kg, target_kg);
    if gap > 0.0 {
        format!("{gap:.1}")
    } else {
        "0".to_owned()
    }
}

/// Everything the result and dashboard screens derive from a profile at one
/// instant
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    /// Program day, 1-based
    pub day: i64,
    /// Program phase (1-3)
    pub phase: u8,
    /// Weight used for the calculation, in kilograms
    pub current_weight: f64,
    /// Body Mass Index
    pub bmi: f64,
    /// BMI classification
    pub category: BmiCategory,
    /// Goal gap for display ("0" or one decimal)
    pub weight_to_goal: String,
}

impl Assessment {
    /// Assess raw biometrics at a given instant
    #[must_use]
    pub fn compute(
        weight_kg: f64,
        height_cm: f64,
        target_kg: Option<f64>,
        start_ms: i64,
        now_ms: i64,
    ) -> Self {
        let day = days_elapsed(start_ms, now_ms);
        let value = bmi(weight_kg, height_cm);
        Self {
            day,
            phase: phase_for_day(day),
            current_weight: weight_kg,
            bmi: value,
            category: BmiCategory::from_bmi(value),
            weight_to_goal: weight_to_goal_display(weight_kg, target_kg),
        }
    }

    /// Assess a profile at a given instant, using its latest known weight
    #[must_use]
    pub fn for_profile(profile: &UserProfile, now_ms: i64) -> Self {
        Self::compute(
            profile.current_weight(),
            profile.height,
            profile.target_weight,
            profile.start_date,
            now_ms,
        )
    }

    /// BMI rounded to one decimal for display
    #[must_use]
    pub fn bmi_display(&self) -> String {
        format!("{:.1}", self.bmi)
    }
}
