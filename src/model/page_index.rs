// ============================================================
// Layer 4 — Page Index
// ============================================================
// Derived, never cached: the page list shrinks as exercises
// are deleted, so it is recomputed from the store each time.

use std::collections::BTreeSet;

use crate::model::exercise_store::ExerciseStore;
use crate::model::figure_registry::FigureRegistry;

/// Exercise and figure totals for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageCounts {
    pub exercise_count: usize,
    /// Every figure cropped from the page, assigned or not
    pub figure_count:   usize,
}

/// Distinct pages that still hold at least one exercise, ascending.
pub fn pages(store: &ExerciseStore) -> Vec<u32> {
    store
        .iter()
        .map(|e| e.page)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Exercise and figure counts for one page
pub fn counts(page: u32, store: &ExerciseStore, registry: &FigureRegistry) -> PageCounts {
    PageCounts {
        exercise_count: store.iter().filter(|e| e.page == page).count(),
        figure_count:   registry.by_page(page).count(),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::exercise::RawExercise;
    use crate::domain::figure::RawFigure;

    fn store_on(pages: &[u32]) -> ExerciseStore {
        let mut store = ExerciseStore::new();
        store
            .load(
                pages
                    .iter()
                    .enumerate()
                    .map(|(i, p)| RawExercise {
                        id: Some(format!("EX_{}", i + 1)),
                        page: Some(*p),
                        ..Default::default()
                    })
                    .collect(),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_pages_sorted_and_deduplicated() {
        assert_eq!(pages(&store_on(&[3, 1, 2, 1])), vec![1, 2, 3]);
    }

    #[test]
    fn test_pages_follow_deletions() {
        let mut store = store_on(&[3, 1, 2, 1]);
        store.remove("EX_1");
        assert_eq!(pages(&store), vec![1, 2]);
        assert!(pages(&ExerciseStore::new()).is_empty());
    }

    #[test]
    fn test_counts_use_registry_for_figures() {
        let store = store_on(&[1, 1, 2]);
        let mut reg = FigureRegistry::new();
        reg.load(
            [(1, "a"), (2, "b"), (2, "c"), (4, "d")]
                .iter()
                .map(|(p, id)| RawFigure {
                    id: Some(id.to_string()),
                    page: Some(*p),
                    ..Default::default()
                })
                .collect(),
        )
        .unwrap();

        assert_eq!(counts(1, &store, &reg), PageCounts { exercise_count: 2, figure_count: 1 });
        assert_eq!(counts(2, &store, &reg), PageCounts { exercise_count: 1, figure_count: 2 });
        // a page may carry figures but no exercises
        assert_eq!(counts(4, &store, &reg), PageCounts { exercise_count: 0, figure_count: 1 });
    }
}
