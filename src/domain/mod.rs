// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain structs, enums and traits describing what the review
// tool works with: figures, exercises, edits, slots, the
// extraction exchange and the error kinds.
//
// Rules for this layer:
//   - NO HTTP or file I/O
//   - NO session state (that lives in the model layer)
//   - Only plain Rust types, serde derives and traits

// Error kinds shared by every layer
pub mod error;

// A figure cropped from a PDF page
pub mod figure;

// An exercise, its edits and its two figure slots
pub mod exercise;

// Request/response types for the extraction service
pub mod extraction;

// Collaborator abstractions implemented in infra
pub mod traits;
