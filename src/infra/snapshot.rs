// ============================================================
// Layer 6 — Extracted Data Snapshot
// ============================================================
// Reads and maintains the files the extraction backend leaves
// on disk after a run:
//
//   extracted_data/
//     exercises.json   ← raw exercises, one object per exercise
//     figures.json     ← raw figures with base64 payloads
//
// Used by `open` and `export` to review a previous extraction
// without calling the backend again. As an ExerciseMirror it
// applies edits and deletes to exercises.json the same way the
// backend's update/delete endpoints do:
//   - the object with the matching id is patched or removed
//   - fields the review tool does not know are left untouched
//   - an unknown id is a failure, and the file is not rewritten

use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::domain::error::{ReviewError, ReviewResult};
use crate::domain::exercise::{ExercisePatch, RawExercise};
use crate::domain::extraction::ExtractionPayload;
use crate::domain::figure::RawFigure;
use crate::domain::traits::ExerciseMirror;

const EXERCISES_FILE: &str = "exercises.json";
const FIGURES_FILE:   &str = "figures.json";

/// The on-disk result of a previous extraction
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Snapshot rooted at `dir` (usually `extracted_data`)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn exercises_path(&self) -> PathBuf {
        self.dir.join(EXERCISES_FILE)
    }

    fn figures_path(&self) -> PathBuf {
        self.dir.join(FIGURES_FILE)
    }

    /// Read both files into an extraction payload.
    pub fn read(&self) -> Result<ExtractionPayload> {
        let exercises: Vec<RawExercise> = read_json(&self.exercises_path())?;
        let figures:   Vec<RawFigure>   = read_json(&self.figures_path())?;

        tracing::info!(
            "Read snapshot from '{}': {} exercises, {} figures",
            self.dir.display(),
            exercises.len(),
            figures.len()
        );
        Ok(ExtractionPayload { exercises, figures })
    }

    /// Load exercises.json as untyped objects so unknown fields survive a rewrite
    fn read_exercise_values(&self) -> ReviewResult<Vec<Value>> {
        let path = self.exercises_path();
        let json = fs::read_to_string(&path).map_err(|e| {
            ReviewError::remote(format!("cannot read '{}': {e}", path.display()))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            ReviewError::remote(format!("'{}' is not a JSON array: {e}", path.display()))
        })
    }

    fn save_exercise_values(&self, values: &[Value]) -> ReviewResult<()> {
        let path = self.exercises_path();
        let json = serde_json::to_string_pretty(values)?;
        fs::write(&path, json).map_err(|e| {
            ReviewError::remote(format!("cannot write '{}': {e}", path.display()))
        })
    }
}

fn has_id(value: &Value, id: &str) -> bool {
    value.get("id").and_then(Value::as_str) == Some(id)
}

impl ExerciseMirror for SnapshotStore {
    fn update(&self, id: &str, patch: &ExercisePatch) -> ReviewResult<()> {
        let mut values = self.read_exercise_values()?;

        let target = values
            .iter_mut()
            .find(|v| has_id(v, id))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| ReviewError::remote(format!("exercise {id} not found in snapshot")))?;

        if let Value::Object(fields) = serde_json::to_value(patch)? {
            for (k, v) in fields {
                target.insert(k, v);
            }
        }

        self.save_exercise_values(&values)
    }

    fn delete(&self, id: &str) -> ReviewResult<()> {
        let mut values = self.read_exercise_values()?;

        let before = values.len();
        values.retain(|v| !has_id(v, id));
        if values.len() == before {
            return Err(ReviewError::remote(format!("exercise {id} not found in snapshot")));
        }

        self.save_exercise_values(&values)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path).with_context(|| {
        format!(
            "Cannot read '{}'. Has the extraction backend been run?",
            path.display()
        )
    })?;
    serde_json::from_str(&json).with_context(|| format!("Cannot parse '{}'", path.display()))
}
