// ============================================================
// Layer 4 — Figure Registry
// ============================================================
// The set of figures produced by the last extraction.
//
// The registry is replaced wholesale on every load and is
// otherwise read-only. Lookups for unknown ids return `None`:
// an exercise may still reference a figure that a later load
// no longer contains, and callers drop such stale ids instead
// of failing.

use indexmap::IndexMap;

use crate::domain::error::{ReviewError, ReviewResult};
use crate::domain::figure::{Figure, RawFigure};

/// Figures keyed by id, kept in extraction order.
#[derive(Debug, Clone, Default)]
pub struct FigureRegistry {
    figures: IndexMap<String, Figure>,
}

impl FigureRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole registry.
    ///
    /// The new map is fully built and validated before it is
    /// swapped in, so a failed load leaves the old contents intact.
    pub fn load(&mut self, raw: Vec<RawFigure>) -> ReviewResult<()> {
        let mut figures = IndexMap::with_capacity(raw.len());

        for r in raw {
            let fig = Figure::try_from(r)?;
            if figures.contains_key(&fig.id) {
                return Err(ReviewError::invalid(format!("duplicate figure id '{}'", fig.id)));
            }
            figures.insert(fig.id.clone(), fig);
        }

        self.figures = figures;
        tracing::debug!("Figure registry loaded with {} figures", self.figures.len());
        Ok(())
    }

    /// Look up a figure; unknown ids give `None`, never an error
    pub fn get(&self, id: &str) -> Option<&Figure> {
        self.figures.get(id)
    }

    /// Whether the last load produced a figure with this id
    pub fn contains(&self, id: &str) -> bool {
        self.figures.contains_key(id)
    }

    /// Figures cropped from `page`, in extraction order.
    /// The iterator is lazy and `Clone`, so it can be restarted.
    pub fn by_page(&self, page: u32) -> impl Iterator<Item = &Figure> + Clone + '_ {
        self.figures.values().filter(move |f| f.page == page)
    }

    /// Figures in load order
    pub fn iter(&self) -> impl Iterator<Item = &Figure> + '_ {
        self.figures.values()
    }

    /// Number of figures loaded
    pub fn len(&self) -> usize {
        self.figures.len()
    }

    /// True before the first load or after a reset
    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }
}
