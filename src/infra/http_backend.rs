// ============================================================
// Layer 6 — HTTP Backend Client
// ============================================================
// Blocking reqwest client for the extraction backend.
//
// Endpoints (all POST, JSON in and out):
//   /api/extract-exercises  { pdfBase64, apiKey } → { exercises, figures }
//   /api/update-exercise    { id, data }          → { status, exercise }
//   /api/delete-exercise    { id }                → { status, remaining }
//
// Any transport error or non-2xx status becomes
// ReviewError::RemoteFailure. When the backend sends an
// `{"error": "..."}` body, that message is surfaced as is.
//
// No retries: the operator simply runs the command again.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::domain::error::{ReviewError, ReviewResult};
use crate::domain::exercise::ExercisePatch;
use crate::domain::extraction::{ExtractionPayload, ExtractionRequest};
use crate::domain::traits::{ExerciseMirror, ExtractionService};

const EXTRACT_PATH: &str = "/api/extract-exercises";
const UPDATE_PATH:  &str = "/api/update-exercise";
const DELETE_PATH:  &str = "/api/delete-exercise";

#[derive(Serialize)]
struct UpdateRequest<'a> {
    id:   &'a str,
    data: &'a ExercisePatch,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    id: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client for the extraction backend; implements both collaborator traits.
pub struct HttpBackend {
    base_url: String,
    client:   Client,
}

impl HttpBackend {
    /// Client for the backend at `base_url`; a trailing `/` is ignored
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ReviewResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReviewError::remote(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// POST a JSON body and return the response text of a 2xx answer.
    fn post<T: Serialize>(&self, path: &str, body: &T) -> ReviewResult<String> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| ReviewError::remote(format!("cannot reach {url}: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| ReviewError::remote(format!("cannot read response from {url}: {e}")))?;

        if !status.is_success() {
            tracing::warn!("{} answered {}", url, status);
        }
        check_status(status, text)
    }
}

/// Pass a 2xx body through; turn anything else into `RemoteFailure`.
fn check_status(status: StatusCode, body: String) -> ReviewResult<String> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(ReviewError::remote(error_message(status, &body)))
    }
}

/// Message for a failed call: the backend's `error` field when
/// present, otherwise the HTTP status line.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| {
            format!(
                "Error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            )
        })
}

impl ExtractionService for HttpBackend {
    fn extract(&self, request: &ExtractionRequest) -> ReviewResult<ExtractionPayload> {
        let body = self.post(EXTRACT_PATH, request)?;
        ExtractionPayload::from_json(&body)
    }
}

impl ExerciseMirror for HttpBackend {
    fn update(&self, id: &str, patch: &ExercisePatch) -> ReviewResult<()> {
        self.post(UPDATE_PATH, &UpdateRequest { id, data: patch })?;
        Ok(())
    }

    fn delete(&self, id: &str) -> ReviewResult<()> {
        self.post(DELETE_PATH, &DeleteRequest { id })?;
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::exercise::EditableField;

    #[test]
    fn test_error_message_prefers_backend_error_field() {
        let msg = error_message(
            StatusCode::NOT_FOUND,
            r#"{"error": "Ejercicio EX_9 no encontrado"}"#,
        );
        assert_eq!(msg, "Ejercicio EX_9 no encontrado");
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>"),
            "Error 500: Internal Server Error"
        );
    }

    #[test]
    fn test_update_body_shape() {
        let patch = ExercisePatch::single(EditableField::Answer, "D");
        let json = serde_json::to_value(UpdateRequest { id: "EX_3", data: &patch }).unwrap();
        assert_eq!(json, serde_json::json!({"id": "EX_3", "data": {"answer": "D"}}));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_non_success_status_is_remote_failure() {
        let ok = check_status(StatusCode::OK, "{}".to_string()).unwrap();
        assert_eq!(ok, "{}");

        let err = check_status(
            StatusCode::NOT_FOUND,
            r#"{"error": "Ejercicio EX_1 no encontrado"}"#.to_string(),
        )
        .unwrap_err();
        assert!(matches!(&err, ReviewError::RemoteFailure(m) if m == "Ejercicio EX_1 no encontrado"));

        let err = check_status(StatusCode::BAD_GATEWAY, String::new()).unwrap_err();
        assert_eq!(err.to_string(), "remote call failed: Error 502: Bad Gateway");
    }
}
