// ============================================================
// Layer 2 — Review Use Case
// ============================================================
// One interactive review session:
//
//   Step 1: Extract (or open a snapshot) → registry + store
//   Step 2: Navigate pages, select exercises
//   Step 3: Attach/detach figures         (local only)
//   Step 4: Edit/delete exercises         (mirror first, then local)
//   Step 5: Export the cleaned dataset
//
// Remote-backed operations never mutate speculatively: the
// mirror is called first and the local store only changes when
// it succeeds. Every outcome, good or bad, is appended to the
// session log.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::error::{ReviewError, ReviewResult};
use crate::domain::exercise::{ExercisePatch, Slot};
use crate::domain::extraction::{ExtractionPayload, ExtractionRequest, PdfUpload};
use crate::domain::traits::{ExerciseMirror, ExtractionService};
use crate::infra::export_writer::ExportWriter;
use crate::model::association;
use crate::model::export::{self, ExportedExercise};
use crate::model::session::SessionState;

// ─── Review Configuration ─────────────────────────────────────────────────────
// Settings for talking to the backend and writing exports.
// Can be read from a JSON file; CLI flags override it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub api_base_url:         String,
    pub api_key:              Option<String>,
    pub max_file_size:        usize,
    pub request_timeout_secs: u64,
    pub export_dir:           String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            api_base_url:         "http://localhost:5000".to_string(),
            api_key:              None,
            max_file_size:        15 * 1024 * 1024,
            request_timeout_secs: 180,
            export_dir:           ".".to_string(),
        }
    }
}

impl ReviewConfig {
    /// Read a config file; missing keys keep their defaults
    pub fn from_file(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config from '{path}'"))?;
        serde_json::from_str(&json).with_context(|| format!("Cannot parse config '{path}'"))
    }

    /// Request timeout for the HTTP backend
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The API credential, or an error when none was configured
    pub fn require_api_key(&self) -> ReviewResult<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ReviewError::invalid(
                "no API key configured (use --api-key or ANTHROPIC_API_KEY)",
            )),
        }
    }
}

// ─── ReviewSession ────────────────────────────────────────────────────────────
pub struct ReviewSession {
    config:     ReviewConfig,
    mirror:     Box<dyn ExerciseMirror>,
    state:      SessionState,
    processing: bool,
}

impl ReviewSession {
    pub fn new(config: ReviewConfig, mirror: Box<dyn ExerciseMirror>) -> Self {
        Self {
            config,
            mirror,
            state: SessionState::new(),
            processing: false,
        }
    }

    /// Settings this session was started with
    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Read-only view of the session model
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Send a PDF to the extraction service and load the result.
    /// On any failure the previous session stays as it was.
    ///
    /// `processing` is set for the duration of the blocking call.
    /// Holding `&mut self` already rules out an overlapping call,
    /// so the re-entry check never trips through this API; it
    /// only rejects a session whose flag was left set.
    pub fn extract(
        &mut self,
        service: &dyn ExtractionService,
        upload:  &PdfUpload,
    ) -> ReviewResult<()> {
        if self.processing {
            return Err(ReviewError::invalid("an extraction is already running"));
        }

        let request = match self.prepare(upload) {
            Ok(r) => r,
            Err(e) => {
                self.state.log.error(format!("Error: {e}"));
                return Err(e);
            }
        };

        self.processing = true;
        self.state.log.clear();
        self.state.log.info(format!("Processing '{}'...", upload.name));
        tracing::info!("Extracting '{}' ({} bytes)", upload.name, upload.bytes.len());

        let result = service.extract(&request).and_then(|payload| self.install(payload));
        self.processing = false;

        if let Err(e) = &result {
            tracing::warn!("Extraction failed: {e}");
            self.state.log.error(format!("Error: {e}"));
        }
        result
    }

    fn prepare(&self, upload: &PdfUpload) -> ReviewResult<ExtractionRequest> {
        upload.validate(self.config.max_file_size)?;
        let key = self.config.require_api_key()?;
        Ok(ExtractionRequest::new(upload, key))
    }

    /// Load a payload that was obtained some other way (e.g. a snapshot)
    pub fn load_payload(&mut self, payload: ExtractionPayload) -> ReviewResult<()> {
        let result = self.install(payload);
        if let Err(e) = &result {
            self.state.log.error(format!("Error: {e}"));
        }
        result
    }

    fn install(&mut self, payload: ExtractionPayload) -> ReviewResult<()> {
        self.state.load(payload)?;
        let figures   = self.state.registry.len();
        let exercises = self.state.store.len();
        self.state.log.success(format!("{figures} figures detected"));
        self.state.log.success(format!("{exercises} exercises extracted"));
        tracing::info!("Session loaded: {} exercises, {} figures", exercises, figures);
        Ok(())
    }

    // ── Navigation ───────────────────────────────────────────────────────────

    /// Make `exercise_id` the default attach/detach target
    pub fn select(&mut self, exercise_id: &str) -> ReviewResult<()> {
        self.state.select(exercise_id)
    }

    /// Filter listings to one page, or `None` for all
    pub fn set_page(&mut self, page: Option<u32>) -> ReviewResult<()> {
        self.state.set_page(page)
    }

    // ── Associations ─────────────────────────────────────────────────────────

    /// The exercise an association command targets: the explicit
    /// one if given, otherwise the current selection.
    fn target(&self, exercise_id: Option<&str>) -> ReviewResult<String> {
        exercise_id
            .or_else(|| self.state.selected())
            .map(str::to_string)
            .ok_or_else(|| ReviewError::invalid("no exercise selected"))
    }

    /// Attach a listed figure to a slot. Only figures present in
    /// the registry can be picked; repeats are no-ops.
    pub fn attach(
        &mut self,
        figure_id:   &str,
        slot:        Slot,
        exercise_id: Option<&str>,
    ) -> ReviewResult<bool> {
        let target = self.target(exercise_id)?;
        if !self.state.registry.contains(figure_id) {
            return Err(ReviewError::invalid(format!("unknown figure '{figure_id}'")));
        }

        let added = association::associate(&mut self.state.store, &target, figure_id, slot)?;
        if added {
            self.state.log.success(format!("{figure_id} added to {slot} of {target}"));
        }
        Ok(added)
    }

    /// Detach a figure from a slot. Stale ids can be detached too.
    pub fn detach(
        &mut self,
        figure_id:   &str,
        slot:        Slot,
        exercise_id: Option<&str>,
    ) -> ReviewResult<bool> {
        let target = self.target(exercise_id)?;
        let removed = association::dissociate(&mut self.state.store, &target, figure_id, slot)?;
        if removed {
            self.state.log.info(format!("{figure_id} removed from {slot} of {target}"));
        }
        Ok(removed)
    }

    // ── Remote-backed edits ──────────────────────────────────────────────────

    /// Edit an exercise. The mirror must accept the patch before
    /// the local store reflects it.
    pub fn update(&mut self, exercise_id: &str, patch: &ExercisePatch) -> ReviewResult<()> {
        if !self.state.store.contains(exercise_id) {
            let e = ReviewError::NotFound(exercise_id.to_string());
            self.state.log.error(format!("Error saving: {e}"));
            return Err(e);
        }

        if let Err(e) = self.mirror.update(exercise_id, patch) {
            tracing::warn!("Update of {} rejected: {e}", exercise_id);
            self.state.log.error(format!("Error saving: {e}"));
            return Err(e);
        }

        self.state.store.update(exercise_id, patch)?;
        self.state.log.success(format!("Exercise {exercise_id} updated"));
        Ok(())
    }

    /// Delete an exercise. Deleting an id that is already gone is
    /// a no-op and does not reach the mirror.
    pub fn delete(&mut self, exercise_id: &str) -> ReviewResult<bool> {
        if !self.state.store.contains(exercise_id) {
            tracing::debug!("Delete of unknown exercise {} ignored", exercise_id);
            return Ok(false);
        }

        if let Err(e) = self.mirror.delete(exercise_id) {
            tracing::warn!("Delete of {} rejected: {e}", exercise_id);
            self.state.log.error(format!("Error deleting: {e}"));
            return Err(e);
        }

        let removed = self.state.remove_exercise(exercise_id);
        self.state.log.success(format!("Exercise {exercise_id} deleted"));
        Ok(removed)
    }

    // ── Export / reset ───────────────────────────────────────────────────────

    /// The cleaned dataset, in store order
    pub fn export(&self) -> Vec<ExportedExercise> {
        export::export(&self.state.store, &self.state.registry)
    }

    /// Export into `writer`'s directory and return the file path
    pub fn export_to(&mut self, writer: &ExportWriter) -> Result<PathBuf> {
        let exported = self.export();
        match writer.write(&exported) {
            Ok(path) => {
                self.state.log.success(format!("JSON exported to {}", path.display()));
                Ok(path)
            }
            Err(e) => {
                self.state.log.error(format!("Export failed: {e:#}"));
                Err(e)
            }
        }
    }

    /// Start over with an empty session
    pub fn reset(&mut self) {
        self.state.reset();
        tracing::info!("Session reset");
    }
}
