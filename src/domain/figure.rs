// ============================================================
// Layer 3 — Figure Domain Type
// ============================================================
// A figure cropped from one red box on one PDF page.
//
// Figures are reference data: the extraction service creates
// them, the review core only reads them. The image itself is
// an opaque base64 payload (usually a `data:image/png;base64,`
// URI) that is embedded verbatim into the export.

use serde::Deserialize;

use crate::domain::error::{ReviewError, ReviewResult};

/// A figure as it arrives on the wire.
/// Every field is optional here so that a missing `id` can be
/// reported as invalid input instead of a JSON parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFigure {
    pub id:               Option<String>,
    #[serde(default)]
    pub filename:         String,
    pub page:             Option<u32>,
    #[serde(default)]
    pub base64:           String,
    pub position_in_page: Option<u32>,
    pub path:             Option<String>,
    pub width:            Option<u32>,
    pub height:           Option<u32>,
}

/// A validated figure record.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// Stable identifier, e.g. `IMG_PAG1_2`
    pub id: String,

    /// File name the backend saved the crop under
    pub filename: String,

    /// 1-based page the figure was cropped from
    pub page: u32,

    /// Opaque image payload
    pub base64: String,

    // Extra metadata the backend reports; carried, never interpreted.
    pub position_in_page: Option<u32>,
    pub path:             Option<String>,
    pub width:            Option<u32>,
    pub height:           Option<u32>,
}

impl TryFrom<RawFigure> for Figure {
    type Error = ReviewError;

    fn try_from(raw: RawFigure) -> ReviewResult<Self> {
        let id = match raw.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                return Err(ReviewError::invalid(format!(
                    "figure '{}' has no id",
                    raw.filename
                )))
            }
        };

        let page = match raw.page {
            Some(p) if p >= 1 => p,
            _ => {
                return Err(ReviewError::invalid(format!(
                    "figure '{id}' has no valid page number"
                )))
            }
        };

        Ok(Self {
            id,
            filename:         raw.filename,
            page,
            base64:           raw.base64,
            position_in_page: raw.position_in_page,
            path:             raw.path,
            width:            raw.width,
            height:           raw.height,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_figure_json_is_accepted() {
        let raw: RawFigure = serde_json::from_str(
            r#"{
                "id": "IMG_PAG1_1",
                "filename": "IMG_PAG1_1.png",
                "page": 1,
                "position_in_page": 1,
                "path": "extracted_data/figures/IMG_PAG1_1.png",
                "base64": "data:image/png;base64,AAAA",
                "width": 320,
                "height": 200
            }"#,
        )
        .unwrap();

        let fig = Figure::try_from(raw).unwrap();
        assert_eq!(fig.id, "IMG_PAG1_1");
        assert_eq!(fig.page, 1);
        assert_eq!(fig.width, Some(320));
    }

    #[test]
    fn test_missing_id_is_invalid_input() {
        let raw = RawFigure { page: Some(1), ..Default::default() };
        assert!(matches!(
            Figure::try_from(raw),
            Err(ReviewError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_blank_id_is_invalid_input() {
        let raw = RawFigure {
            id: Some("  ".into()),
            page: Some(1),
            ..Default::default()
        };
        assert!(Figure::try_from(raw).is_err());
    }

    #[test]
    fn test_page_zero_is_invalid_input() {
        let raw = RawFigure {
            id: Some("IMG_PAG0_1".into()),
            page: Some(0),
            ..Default::default()
        };
        assert!(Figure::try_from(raw).is_err());
    }
}
