// ============================================================
// Layer 2 — Export Use Case
// ============================================================
// Headless export of a snapshot directory:
//
//   Step 1: Read exercises.json + figures.json   (Layer 6 - infra)
//   Step 2: Load them into a session             (Layer 4 - model)
//   Step 3: Serialise with embedded figures      (Layer 4 - model)
//   Step 4: Write the timestamped JSON file      (Layer 6 - infra)
//
// Any associations already present in exercises.json are
// honoured, so a dataset prepared elsewhere can be exported
// without opening the review shell.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::infra::{export_writer::ExportWriter, snapshot::SnapshotStore};
use crate::model::export;
use crate::model::session::SessionState;

pub struct ExportUseCase {
    data_dir: String,
    out_dir:  String,
}

impl ExportUseCase {
    pub fn new(data_dir: impl Into<String>, out_dir: impl Into<String>) -> Self {
        Self { data_dir: data_dir.into(), out_dir: out_dir.into() }
    }

    /// Run the export and return the written file's path
    pub fn execute(&self) -> Result<PathBuf> {
        let payload = SnapshotStore::new(&self.data_dir).read()?;

        let mut state = SessionState::new();
        state
            .load(payload)
            .with_context(|| format!("Snapshot in '{}' is not valid", self.data_dir))?;

        let exported = export::export(&state.store, &state.registry);
        ExportWriter::new(&self.out_dir).write(&exported)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::export::ExportedExercise;

    #[test]
    fn test_export_honours_prepopulated_associations() {
        let data = tempfile::tempdir().unwrap();
        std::fs::write(
            data.path().join("exercises.json"),
            r#"[{"id": "EX_1", "page": 1, "text": "T", "question": "Q",
                 "alternatives": "A) x", "answer": "A", "resolution": "R",
                 "text_figures": ["IMG_PAG1_1", "IMG_GONE"],
                 "resolution_figures": ["IMG_PAG1_1"]}]"#,
        )
        .unwrap();
        std::fs::write(
            data.path().join("figures.json"),
            r#"[{"id": "IMG_PAG1_1", "filename": "IMG_PAG1_1.png", "page": 1, "base64": "P"}]"#,
        )
        .unwrap();

        let out = tempfile::tempdir().unwrap();
        let path = ExportUseCase::new(
            data.path().to_str().unwrap(),
            out.path().to_str().unwrap(),
        )
        .execute()
        .unwrap();

        let written: Vec<ExportedExercise> =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].text, "T\n\n[IMAGE: P]");
        assert_eq!(written[0].resolution, "[IMAGE: P]\n\nR");
    }

    #[test]
    fn test_invalid_snapshot_is_reported() {
        let data = tempfile::tempdir().unwrap();
        std::fs::write(data.path().join("exercises.json"), r#"[{"page": 1}]"#).unwrap();
        std::fs::write(data.path().join("figures.json"), "[]").unwrap();

        let out = tempfile::tempdir().unwrap();
        let err = ExportUseCase::new(
            data.path().to_str().unwrap(),
            out.path().to_str().unwrap(),
        )
        .execute()
        .unwrap_err();
        assert!(format!("{err:#}").contains("invalid input"));
    }
}
