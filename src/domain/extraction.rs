// ============================================================
// Layer 3 — Extraction Exchange Types
// ============================================================
// What goes to the extraction service and what comes back.
//
//   PdfUpload          — the operator's PDF, already read from disk
//   ExtractionRequest  — base64 PDF + API credential
//   ExtractionPayload  — flat lists of exercises and figures
//
// The response is all-or-nothing: if either list is missing
// the whole extraction is rejected.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::domain::error::{ReviewError, ReviewResult};
use crate::domain::exercise::RawExercise;
use crate::domain::figure::RawFigure;

/// Leading bytes of every PDF file
const PDF_MAGIC: &[u8] = b"%PDF";

/// A PDF selected by the operator.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    /// File name, kept for log messages
    pub name:  String,
    pub bytes: Vec<u8>,
}

impl PdfUpload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }

    /// Reject anything that is not a PDF or is larger than `max_size` bytes.
    pub fn validate(&self, max_size: usize) -> ReviewResult<()> {
        if self.bytes.is_empty() {
            return Err(ReviewError::invalid(format!("'{}' is empty", self.name)));
        }
        if !self.bytes.starts_with(PDF_MAGIC) {
            return Err(ReviewError::invalid(format!("'{}' is not a PDF file", self.name)));
        }
        if self.bytes.len() > max_size {
            return Err(ReviewError::invalid(format!(
                "'{}' is {} bytes, the limit is {} bytes",
                self.name,
                self.bytes.len(),
                max_size
            )));
        }
        Ok(())
    }

    /// Standard base64 of the raw bytes
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Request body of `POST /api/extract-exercises`
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionRequest {
    #[serde(rename = "pdfBase64")]
    pub pdf_base64: String,
    #[serde(rename = "apiKey")]
    pub api_key:    String,
}

impl ExtractionRequest {
    pub fn new(upload: &PdfUpload, api_key: impl Into<String>) -> Self {
        Self {
            pdf_base64: upload.to_base64(),
            api_key:    api_key.into(),
        }
    }
}

/// The two flat lists the extractor produces
#[derive(Debug, Clone, Default)]
pub struct ExtractionPayload {
    pub exercises: Vec<RawExercise>,
    pub figures:   Vec<RawFigure>,
}

#[derive(Deserialize)]
struct WirePayload {
    exercises: Option<Vec<RawExercise>>,
    figures:   Option<Vec<RawFigure>>,
}

impl ExtractionPayload {
    /// Parse a response body, failing if either key is absent or null.
    pub fn from_json(body: &str) -> ReviewResult<Self> {
        let wire: WirePayload = serde_json::from_str(body)
            .map_err(|e| ReviewError::remote(format!("unreadable server response: {e}")))?;

        match (wire.exercises, wire.figures) {
            (Some(exercises), Some(figures)) => Ok(Self { exercises, figures }),
            _ => Err(ReviewError::remote(
                "invalid server response: 'exercises' and 'figures' are both required",
            )),
        }
    }
}
