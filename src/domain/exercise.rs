// ============================================================
// Layer 3 — Exercise Domain Types
// ============================================================
// An exercise extracted from the PDF, plus the small value
// types that operate on it:
//
//   RawExercise   — the wire shape returned by the extractor
//   Exercise      — the validated, editable record
//   ExercisePatch — a partial edit of the free-text fields
//   Slot          — which of the two figure lists to target
//
// The two figure lists are ordered sets: an id appears at most
// once per list, and insertion order is kept because the export
// concatenates figures in that order.

use std::fmt;

use clap::ValueEnum;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::domain::error::{ReviewError, ReviewResult};

// ─── Slot ─────────────────────────────────────────────────────────────────────
/// One of the two attachment points an exercise exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Slot {
    /// Figures shown with the statement
    #[value(alias = "t")]
    Text,
    /// Figures shown with the worked solution
    #[value(aliases = ["res", "r"])]
    Resolution,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Text, Slot::Resolution];
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Text       => write!(f, "text"),
            Slot::Resolution => write!(f, "resolution"),
        }
    }
}

// ─── RawExercise ──────────────────────────────────────────────────────────────
/// An exercise exactly as the extraction service returns it.
/// Text fields may be missing or null; association lists are
/// usually absent on a fresh extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExercise {
    pub id:                 Option<String>,
    pub page:               Option<u32>,
    pub text:               Option<String>,
    pub question:           Option<String>,
    pub alternatives:       Option<String>,
    pub answer:             Option<String>,
    pub resolution:         Option<String>,
    pub text_figures:       Option<Vec<String>>,
    pub resolution_figures: Option<Vec<String>>,
}

// ─── Exercise ─────────────────────────────────────────────────────────────────
/// A validated exercise held by the exercise store.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id:           String,
    /// Source page, fixed at creation
    pub page:         u32,
    pub text:         String,
    pub question:     String,
    pub alternatives: String,
    pub answer:       String,
    pub resolution:   String,
    pub text_figures:       IndexSet<String>,
    pub resolution_figures: IndexSet<String>,
}

impl Exercise {
    /// The association list for a slot
    pub fn figures(&self, slot: Slot) -> &IndexSet<String> {
        match slot {
            Slot::Text       => &self.text_figures,
            Slot::Resolution => &self.resolution_figures,
        }
    }

    /// Mutable association list for a slot
    pub fn figures_mut(&mut self, slot: Slot) -> &mut IndexSet<String> {
        match slot {
            Slot::Text       => &mut self.text_figures,
            Slot::Resolution => &mut self.resolution_figures,
        }
    }
}

impl TryFrom<RawExercise> for Exercise {
    type Error = ReviewError;

    fn try_from(raw: RawExercise) -> ReviewResult<Self> {
        let id = match raw.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(ReviewError::invalid("exercise without an id")),
        };

        let page = match raw.page {
            Some(p) if p >= 1 => p,
            _ => {
                return Err(ReviewError::invalid(format!(
                    "exercise '{id}' has no valid page number"
                )))
            }
        };

        // Collecting into an IndexSet keeps the first occurrence of
        // each id, so a repeated pre-populated id collapses in place.
        Ok(Self {
            id,
            page,
            text:               raw.text.unwrap_or_default(),
            question:           raw.question.unwrap_or_default(),
            alternatives:       raw.alternatives.unwrap_or_default(),
            answer:             raw.answer.unwrap_or_default(),
            resolution:         raw.resolution.unwrap_or_default(),
            text_figures:       raw.text_figures.unwrap_or_default().into_iter().collect(),
            resolution_figures: raw.resolution_figures.unwrap_or_default().into_iter().collect(),
        })
    }
}

// ─── Editable fields ──────────────────────────────────────────────────────────
/// The five free-text fields an operator may edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EditableField {
    Text,
    Question,
    Alternatives,
    Answer,
    Resolution,
}

// ─── ExercisePatch ────────────────────────────────────────────────────────────
/// A partial edit. Only the `Some` fields are merged; the
/// association lists are never part of a patch.
///
/// Serialises as the `data` object of the backend's
/// update-exercise request, omitting untouched fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExercisePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text:         Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question:     Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer:       Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution:   Option<String>,
}

impl ExercisePatch {
    /// A patch touching exactly one field
    pub fn single(field: EditableField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            EditableField::Text         => Self { text: value, ..Default::default() },
            EditableField::Question     => Self { question: value, ..Default::default() },
            EditableField::Alternatives => Self { alternatives: value, ..Default::default() },
            EditableField::Answer       => Self { answer: value, ..Default::default() },
            EditableField::Resolution   => Self { resolution: value, ..Default::default() },
        }
    }

    /// Merge the provided fields into an exercise
    pub fn apply_to(&self, exercise: &mut Exercise) {
        if let Some(v) = &self.text         { exercise.text = v.clone(); }
        if let Some(v) = &self.question     { exercise.question = v.clone(); }
        if let Some(v) = &self.alternatives { exercise.alternatives = v.clone(); }
        if let Some(v) = &self.answer       { exercise.answer = v.clone(); }
        if let Some(v) = &self.resolution   { exercise.resolution = v.clone(); }
    }
}
