// ============================================================
// Layer 4 — Session Model
// ============================================================
// The in-memory association and consistency engine.
//
//   figure_registry → exercise_store → association
//                                    → page_index
//                                    → export
//   session         — ties them together with selection,
//                     page navigation and the event log
//
// Everything here is synchronous and free of I/O. Each module
// owns one concern and is tested on its own.

/// Read-only figures from the last extraction
pub mod figure_registry;

/// Ordered, editable exercises
pub mod exercise_store;

/// Add/remove figure ids in an exercise's two slots
pub mod association;

/// Distinct pages and per-page counts
pub mod page_index;

/// Final dataset with embedded figure payloads
pub mod export;

/// Selection, page filter and event log of one review session
pub mod session;
