// ============================================================
// Layer 4 — Session State
// ============================================================
// Everything one review session holds in memory:
//
//   registry      — figures from the last extraction
//   store         — exercises under review
//   selected      — the exercise association commands target
//   current_page  — page filter for listing (None = all)
//   log           — append-only, user-facing event log
//
// The session is dropped (or `reset`) when the operator starts
// over; nothing here is persisted.

use chrono::{DateTime, Local};

use crate::domain::error::{ReviewError, ReviewResult};
use crate::domain::exercise::Exercise;
use crate::domain::extraction::ExtractionPayload;
use crate::model::association::{assigned_figure_ids, prune_unknown};
use crate::model::exercise_store::ExerciseStore;
use crate::model::figure_registry::FigureRegistry;
use crate::model::page_index;

// ─── Session Log ──────────────────────────────────────────────────────────────
/// Severity shown next to each session log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

/// One timestamped line of the session log
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time:    DateTime<Local>,
    pub level:   LogLevel,
    pub message: String,
}

/// Informational record of what happened during the session.
/// Entries are only ever appended; `clear` is used on reset.
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    entries: Vec<LogEntry>,
}

impl SessionLog {
    /// Append an entry stamped with the local time
    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        self.entries.push(LogEntry {
            time: Local::now(),
            level,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message);
    }

    /// Entries, oldest first
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ─── Summary ──────────────────────────────────────────────────────────────────
/// Headline numbers shown by `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub exercise_count: usize,
    pub figure_count:   usize,
    /// Registry figures referenced by at least one exercise
    pub assigned_count: usize,
    pub pending_count:  usize,
    pub page_count:     usize,
}

// ─── Session State ────────────────────────────────────────────────────────────
/// The in-memory model of one review session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub registry:  FigureRegistry,
    pub store:     ExerciseStore,
    pub log:       SessionLog,
    selected:      Option<String>,
    current_page:  Option<u32>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh extraction result.
    ///
    /// Registry and store are both built on the side and only
    /// swapped in once both validated, so a bad payload leaves
    /// the previous session untouched. Pre-populated figure ids
    /// the new registry does not hold are dropped.
    pub fn load(&mut self, payload: ExtractionPayload) -> ReviewResult<()> {
        let mut registry = FigureRegistry::new();
        registry.load(payload.figures)?;

        let mut store = ExerciseStore::new();
        store.load(payload.exercises)?;

        let dropped = prune_unknown(&mut store, &registry);
        if dropped > 0 {
            tracing::warn!("Dropped {} figure references unknown to the registry", dropped);
        }

        self.registry     = registry;
        self.store        = store;
        self.selected     = None;
        self.current_page = page_index::pages(&self.store).first().copied();
        Ok(())
    }

    // ── Selection ────────────────────────────────────────────────────────────

    /// The exercise attach/detach target by default, if any
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select a loaded exercise; `NotFound` otherwise
    pub fn select(&mut self, exercise_id: &str) -> ReviewResult<()> {
        if !self.store.contains(exercise_id) {
            return Err(ReviewError::NotFound(exercise_id.to_string()));
        }
        self.selected = Some(exercise_id.to_string());
        Ok(())
    }

    // ── Page navigation ──────────────────────────────────────────────────────

    /// Page filter for listings, `None` for all pages
    pub fn current_page(&self) -> Option<u32> {
        self.current_page
    }

    /// Show one page, or every page with `None`.
    pub fn set_page(&mut self, page: Option<u32>) -> ReviewResult<()> {
        if let Some(p) = page {
            if !page_index::pages(&self.store).contains(&p) {
                return Err(ReviewError::invalid(format!("no exercises on page {p}")));
            }
        }
        self.current_page = page;
        Ok(())
    }

    /// Exercises on the current page, in store order
    pub fn visible_exercises(&self) -> Vec<&Exercise> {
        self.store.list_by_page(self.current_page)
    }

    // ── Removal ──────────────────────────────────────────────────────────────

    /// Remove an exercise from the local store.
    ///
    /// Clears the selection if it pointed at the removed exercise
    /// and moves off a page that no longer has exercises.
    /// Removing an unknown id is a no-op.
    pub fn remove_exercise(&mut self, exercise_id: &str) -> bool {
        if !self.store.remove(exercise_id) {
            return false;
        }

        if self.selected.as_deref() == Some(exercise_id) {
            self.selected = None;
        }

        if let Some(p) = self.current_page {
            let pages = page_index::pages(&self.store);
            if !pages.contains(&p) {
                self.current_page = pages.first().copied();
            }
        }
        true
    }

    // ── Figures ──────────────────────────────────────────────────────────────

    /// Whether a registry figure is referenced by any exercise
    pub fn is_assigned(&self, figure_id: &str) -> bool {
        self.store.iter().any(|e| {
            e.text_figures.contains(figure_id) || e.resolution_figures.contains(figure_id)
        })
    }

    /// Counts for the status line
    pub fn summary(&self) -> SessionSummary {
        let assigned_count = assigned_figure_ids(&self.store)
            .iter()
            .filter(|id| self.registry.contains(id))
            .count();
        let figure_count = self.registry.len();

        SessionSummary {
            exercise_count: self.store.len(),
            figure_count,
            assigned_count,
            pending_count: figure_count - assigned_count,
            page_count: page_index::pages(&self.store).len(),
        }
    }

    /// Start over: forget figures, exercises, selection, page and log.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::exercise::{RawExercise, Slot};
    use crate::domain::figure::RawFigure;
    use crate::model::association::associate;

    fn payload() -> ExtractionPayload {
        let ex = |id: &str, page: u32| RawExercise {
            id: Some(id.into()),
            page: Some(page),
            ..Default::default()
        };
        let fig = |id: &str, page: u32| RawFigure {
            id: Some(id.into()),
            page: Some(page),
            ..Default::default()
        };
        ExtractionPayload {
            exercises: vec![ex("EX_1", 3), ex("EX_2", 2), ex("EX_3", 2)],
            figures:   vec![fig("IMG_PAG2_1", 2), fig("IMG_PAG3_1", 3), fig("IMG_PAG3_2", 3)],
        }
    }

    fn loaded() -> SessionState {
        let mut s = SessionState::new();
        s.load(payload()).unwrap();
        s
    }

    #[test]
    fn test_load_selects_first_page() {
        let s = loaded();
        assert_eq!(s.current_page(), Some(2));
        assert_eq!(s.visible_exercises().len(), 2);
        assert!(s.selected().is_none());
    }

    #[test]
    fn test_load_drops_prepopulated_ids_missing_from_registry() {
        let mut p = payload();
        p.exercises[0].text_figures = Some(vec!["IMG_PAG3_1".into(), "IMG_GONE".into()]);
        p.exercises[0].resolution_figures = Some(vec!["IMG_GONE".into()]);

        let mut s = SessionState::new();
        s.load(p).unwrap();

        let ex = s.store.get("EX_1").unwrap();
        assert_eq!(ex.text_figures.iter().collect::<Vec<_>>(), vec!["IMG_PAG3_1"]);
        assert!(ex.resolution_figures.is_empty());
        assert!(assigned_figure_ids(&s.store).iter().all(|id| s.registry.contains(id)));
    }

    #[test]
    fn test_bad_payload_keeps_previous_session() {
        let mut s = loaded();
        let mut bad = payload();
        bad.figures.push(RawFigure::default());

        assert!(matches!(s.load(bad), Err(ReviewError::InvalidInput(_))));
        assert_eq!(s.store.len(), 3);
        assert_eq!(s.registry.len(), 3);
    }

    #[test]
    fn test_deleting_selected_exercise_clears_selection() {
        let mut s = loaded();
        s.select("EX_2").unwrap();

        assert!(s.remove_exercise("EX_2"));
        assert!(s.selected().is_none());
    }

    #[test]
    fn test_deleting_other_exercise_keeps_selection() {
        let mut s = loaded();
        s.select("EX_2").unwrap();
        s.remove_exercise("EX_3");
        assert_eq!(s.selected(), Some("EX_2"));
    }

    #[test]
    fn test_deleting_unknown_id_changes_nothing() {
        let mut s = loaded();
        s.select("EX_1").unwrap();

        assert!(!s.remove_exercise("EX_404"));
        assert_eq!(s.store.len(), 3);
        assert_eq!(s.selected(), Some("EX_1"));
    }

    #[test]
    fn test_emptied_page_falls_back_to_first_remaining() {
        let mut s = loaded();
        s.set_page(Some(3)).unwrap();
        s.remove_exercise("EX_1");
        assert_eq!(s.current_page(), Some(2));
    }

    #[test]
    fn test_select_and_page_validation() {
        let mut s = loaded();
        assert!(matches!(s.select("EX_9"), Err(ReviewError::NotFound(_))));
        assert!(s.set_page(Some(9)).is_err());
        s.set_page(None).unwrap();
        assert_eq!(s.visible_exercises().len(), 3);
    }

    #[test]
    fn test_summary_counts_assigned_and_pending() {
        let mut s = loaded();
        associate(&mut s.store, "EX_1", "IMG_PAG3_1", Slot::Text).unwrap();
        associate(&mut s.store, "EX_2", "IMG_PAG3_1", Slot::Resolution).unwrap();
        // dangling ids never count as assigned
        associate(&mut s.store, "EX_2", "IMG_GONE", Slot::Text).unwrap();

        let sum = s.summary();
        assert_eq!(sum.exercise_count, 3);
        assert_eq!(sum.figure_count, 3);
        assert_eq!(sum.assigned_count, 1);
        assert_eq!(sum.pending_count, 2);
        assert_eq!(sum.page_count, 2);
        assert!(s.is_assigned("IMG_PAG3_1"));
        assert!(!s.is_assigned("IMG_PAG2_1"));
    }

    #[test]
    fn test_reset_empties_everything() {
        let mut s = loaded();
        s.select("EX_1").unwrap();
        s.log.info("hello");

        s.reset();
        assert!(s.store.is_empty());
        assert!(s.registry.is_empty());
        assert!(s.selected().is_none());
        assert!(s.current_page().is_none());
        assert!(s.log.entries().is_empty());
    }
}
