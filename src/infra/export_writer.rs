// ============================================================
// Layer 6 — Export Writer
// ============================================================
// Writes the exported dataset as a pretty-printed JSON array.
// Each export gets its own file, named after the moment it
// was written:
//
//   <export_dir>/exercises_1760880000000.json
//   <export_dir>/exercises_1760880000000_1.json  ← same millisecond
//
// Files are opened with create_new, so an earlier export is
// never overwritten.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::model::export::ExportedExercise;

/// File name for an export written at `now` (Unix milliseconds suffix).
/// `attempt` > 0 disambiguates exports made within the same millisecond.
pub fn export_file_name(now: DateTime<Utc>, attempt: u32) -> String {
    match attempt {
        0 => format!("exercises_{}.json", now.timestamp_millis()),
        n => format!("exercises_{}_{n}.json", now.timestamp_millis()),
    }
}

/// Upper bound on same-millisecond collisions before giving up
const MAX_ATTEMPTS: u32 = 1000;

/// Writes export files into one directory
pub struct ExportWriter {
    dir: PathBuf,
}

impl ExportWriter {
    /// A writer targeting `dir`, created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `exercises` and return the path of the new file.
    pub fn write(&self, exercises: &[ExportedExercise]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create export directory '{}'", self.dir.display()))?;

        let json = serde_json::to_string_pretty(exercises)?;
        let now  = Utc::now();

        for attempt in 0..MAX_ATTEMPTS {
            let path = self.dir.join(export_file_name(now, attempt));
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("Cannot create '{}'", path.display()))
                }
            };

            file.write_all(json.as_bytes())
                .with_context(|| format!("Cannot write export to '{}'", path.display()))?;

            tracing::info!("Exported {} exercises to '{}'", exercises.len(), path.display());
            return Ok(path);
        }

        anyhow::bail!(
            "Cannot find a free export file name in '{}'",
            self.dir.display()
        )
    }
}
