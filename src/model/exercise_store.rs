// ============================================================
// Layer 4 — Exercise Store
// ============================================================
// The ordered list of exercises under review.
//
// Order is the order of the extraction response and is never
// re-sorted: page navigation filters it, export walks it.
//
// The store owns both association lists of every exercise but
// exposes no way to change them here. Edits go through
// `update`, associations through the association engine.

use std::collections::HashSet;

use crate::domain::error::{ReviewError, ReviewResult};
use crate::domain::exercise::{Exercise, ExercisePatch, RawExercise};

/// Exercises under review, in extraction order
#[derive(Debug, Clone, Default)]
pub struct ExerciseStore {
    exercises: Vec<Exercise>,
}

impl ExerciseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole store with a freshly extracted batch.
    ///
    /// Missing association lists become empty; lists that are
    /// already populated are kept. Nothing is replaced unless
    /// every record validates.
    pub fn load(&mut self, raw: Vec<RawExercise>) -> ReviewResult<()> {
        let mut seen      = HashSet::with_capacity(raw.len());
        let mut exercises = Vec::with_capacity(raw.len());

        for r in raw {
            let ex = Exercise::try_from(r)?;
            if !seen.insert(ex.id.clone()) {
                return Err(ReviewError::invalid(format!("duplicate exercise id '{}'", ex.id)));
            }
            exercises.push(ex);
        }

        self.exercises = exercises;
        tracing::debug!("Exercise store loaded with {} exercises", self.exercises.len());
        Ok(())
    }

    /// The exercise with this id, if loaded
    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Mutable access for the association engine only
    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Exercise> {
        self.exercises.iter_mut().find(|e| e.id == id)
    }

    /// Whether an exercise with this id is loaded
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Merge the provided fields of `patch` into exercise `id`.
    pub fn update(&mut self, id: &str, patch: &ExercisePatch) -> ReviewResult<()> {
        let ex = self
            .get_mut(id)
            .ok_or_else(|| ReviewError::NotFound(id.to_string()))?;
        patch.apply_to(ex);
        Ok(())
    }

    /// Remove exercise `id`. Returns false (and changes nothing)
    /// when it is already gone.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.exercises.len();
        self.exercises.retain(|e| e.id != id);
        self.exercises.len() != before
    }

    /// Every exercise when `page` is `None`, otherwise those on that page.
    pub fn list_by_page(&self, page: Option<u32>) -> Vec<&Exercise> {
        self.exercises
            .iter()
            .filter(|e| page.map_or(true, |p| e.page == p))
            .collect()
    }

    /// Exercises in load order
    pub fn iter(&self) -> impl Iterator<Item = &Exercise> + '_ {
        self.exercises.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Exercise> + '_ {
        self.exercises.iter_mut()
    }

    /// Number of exercises loaded
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    /// True when no exercise is loaded
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}
