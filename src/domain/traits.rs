// ============================================================
// Layer 3 — Collaborator Traits
// ============================================================
// The review core talks to two remote collaborators. Both are
// described here as traits so the application layer never
// depends on HTTP or on the file system directly:
//
//   ExtractionService → HttpBackend (infra) in production,
//                       a canned payload in tests
//   ExerciseMirror    → HttpBackend or SnapshotStore (infra),
//                       a recording fake in tests
//
// Both are blocking calls. A returned error means the remote
// side did not apply the change, so the caller must not apply
// it locally either.

use crate::domain::error::ReviewResult;
use crate::domain::exercise::ExercisePatch;
use crate::domain::extraction::{ExtractionPayload, ExtractionRequest};

// ─── ExtractionService ────────────────────────────────────────────────────────
/// Turns a PDF into flat lists of exercises and figures.
pub trait ExtractionService {
    fn extract(&self, request: &ExtractionRequest) -> ReviewResult<ExtractionPayload>;
}

// ─── ExerciseMirror ───────────────────────────────────────────────────────────
/// Remote copy of the exercise list that edits and deletes are
/// confirmed against before they touch the local store.
pub trait ExerciseMirror {
    /// Persist a partial edit of one exercise
    fn update(&self, id: &str, patch: &ExercisePatch) -> ReviewResult<()>;

    /// Persist the removal of one exercise
    fn delete(&self, id: &str) -> ReviewResult<()>;
}
