// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that leaves the process:
//
//   http_backend.rs  — blocking reqwest client for the
//                      extraction backend. Implements both
//                      ExtractionService and ExerciseMirror.
//
//   snapshot.rs      — the exercises.json / figures.json pair
//                      the backend writes to disk. Lets a
//                      previous extraction be reviewed offline
//                      and mirrors edits/deletes into it.
//
//   export_writer.rs — writes the final JSON dataset to a
//                      timestamped file.
//
// The application layer only sees the domain traits, so any of
// these can be replaced by a fake in tests.

/// HTTP client for the extraction backend
pub mod http_backend;

/// On-disk extraction snapshot
pub mod snapshot;

/// Timestamped export files
pub mod export_writer;
