// ABOUTME: Static program catalog: the three phases and the intolerance option list
// ABOUTME: Read-only reference data, not user data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

/// One of the three fixed program phases
///
/// Selected purely by elapsed days since program start; gates which
/// instructions and ingredient list are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseContent {
    /// Phase number (1-3)
    pub id: u8,
    /// Display title
    pub title: &'static str,
    /// Day range label
    pub day_range: &'static str,
    /// Short description
    pub description: &'static str,
    /// Base ingredient list
    pub ingredients: &'static [&'static str],
    /// Preparation instructions
    pub instructions: &'static str,
}

/// The full program catalog, in phase order
pub static PHASES: [PhaseContent; 3] = [
    PhaseContent {
        id: 1,
        title: "Despegue Digestivo",
        day_range: "Días 1-10",
        description: "Iniciamos con una mezcla suave para despertar el metabolismo.",
        ingredients: &["1 cda Psyllium", "200ml Agua tibia", "Gotas de Limón"],
        instructions: "Mezclar y beber en ayunas, seguido de un vaso de agua pura.",
    },
    PhaseContent {
        id: 2,
        title: "Equilibrio Nutritivo",
        day_range: "Días 11-60",
        description: "Fortalecemos la flora intestinal con prebióticos naturales.",
        ingredients: &["1.5 cda Psyllium", "150ml Jugo Verde", "1 pizca de Jengibre"],
        instructions: "Integrar al jugo verde y consumir 30 min antes del almuerzo.",
    },
    PhaseContent {
        id: 3,
        title: "Mantenimiento Vital",
        day_range: "Día 61+",
        description: "Fase de consolidación para una vida plena y ligera.",
        ingredients: &["1 cda Psyllium", "Yogurt Natural", "Semillas de Chía"],
        instructions: "Mezclar con el yogurt de la tarde como snack saciante.",
    },
];

/// Fixed multi-select options offered by the intolerance quiz
pub static INTOLERANCE_OPTIONS: [&str; 6] = [
    "Lactose",
    "Glúten",
    "Frutose",
    "Leguminosas",
    "Corantes e conservantes artificiais",
    "Adoçantes artificiais",
];

/// Sentinel stored when the quiz was answered with no selection
///
/// Distinguishes "asked but has none" from "never asked" (absent list).
pub const NO_INTOLERANCES: &str = "Nenhuma";

/// Look up the catalog entry for a phase number (1-3)
#[must_use]
pub fn phase_content(phase: u8) -> &'static PhaseContent {
    match phase {
        0 | 1 => &PHASES[0],
        2 => &PHASES[1],
        _ => &PHASES[2],
    }
}
