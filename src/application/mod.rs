// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the model and the collaborators to accomplish
// one goal at a time.
//
// Rules for this layer:
//   - No association or export logic here (that's Layer 4)
//   - No printing or argument parsing (that's Layer 1)
//   - No HTTP details (that's Layer 6, behind domain traits)
//   - Only workflow coordination and the session log

// The interactive review workflow and its configuration
pub mod review_use_case;

// Headless snapshot → JSON export
pub mod export_use_case;
