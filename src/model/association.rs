// ============================================================
// Layer 4 — Association Engine
// ============================================================
// Links figures to exercises, one slot at a time.
//
//   associate   — append a figure id to a slot if it is absent
//   dissociate  — remove a figure id from a slot if present
//   assigned_figure_ids — every id referenced anywhere
//   prune_unknown — drop ids the registry does not hold
//
// Both mutations are idempotent. Figure ids are NOT checked
// against the registry here: a stale id is harmless because
// export resolves ids lazily and drops the ones that no
// longer exist. prune_unknown is only run on load, so that
// pre-populated lists start out consistent with the registry.
//
// The target exercise is always passed in explicitly; the
// engine knows nothing about which exercise is selected.

use indexmap::IndexSet;

use crate::domain::error::{ReviewError, ReviewResult};
use crate::domain::exercise::Slot;
use crate::model::exercise_store::ExerciseStore;
use crate::model::figure_registry::FigureRegistry;

/// Append `figure_id` to `slot` of `exercise_id`.
///
/// Returns `true` when the id was added, `false` when it was
/// already there.
pub fn associate(
    store:       &mut ExerciseStore,
    exercise_id: &str,
    figure_id:   &str,
    slot:        Slot,
) -> ReviewResult<bool> {
    let ex = store
        .get_mut(exercise_id)
        .ok_or_else(|| ReviewError::NotFound(exercise_id.to_string()))?;

    let added = ex.figures_mut(slot).insert(figure_id.to_string());
    if added {
        tracing::debug!("Associated {} with {} ({})", figure_id, exercise_id, slot);
    }
    Ok(added)
}

/// Remove `figure_id` from `slot` of `exercise_id`.
///
/// Returns `true` when something was removed. The remaining
/// ids keep their relative order.
pub fn dissociate(
    store:       &mut ExerciseStore,
    exercise_id: &str,
    figure_id:   &str,
    slot:        Slot,
) -> ReviewResult<bool> {
    let ex = store
        .get_mut(exercise_id)
        .ok_or_else(|| ReviewError::NotFound(exercise_id.to_string()))?;

    // shift_remove, not swap_remove: export order must survive removals
    let removed = ex.figures_mut(slot).shift_remove(figure_id);
    if removed {
        tracing::debug!("Dissociated {} from {} ({})", figure_id, exercise_id, slot);
    }
    Ok(removed)
}

/// Union of every figure id referenced by any exercise in either slot.
pub fn assigned_figure_ids(store: &ExerciseStore) -> IndexSet<String> {
    store
        .iter()
        .flat_map(|ex| ex.text_figures.iter().chain(ex.resolution_figures.iter()))
        .cloned()
        .collect()
}

/// Remove every id the registry does not hold, from both slots
/// of every exercise. The remaining ids keep their order.
///
/// Returns how many references were dropped.
pub fn prune_unknown(store: &mut ExerciseStore, registry: &FigureRegistry) -> usize {
    let mut dropped = 0;
    for ex in store.iter_mut() {
        for slot in Slot::ALL {
            let ids = ex.figures_mut(slot);
            let before = ids.len();
            ids.retain(|id| registry.contains(id));
            dropped += before - ids.len();
        }
    }
    dropped
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::exercise::RawExercise;

    fn store_with(ids: &[&str]) -> ExerciseStore {
        let mut store = ExerciseStore::new();
        store
            .load(
                ids.iter()
                    .map(|id| RawExercise {
                        id: Some(id.to_string()),
                        page: Some(1),
                        ..Default::default()
                    })
                    .collect(),
            )
            .unwrap();
        store
    }

    fn slot_ids(store: &ExerciseStore, ex: &str, slot: Slot) -> Vec<String> {
        store.get(ex).unwrap().figures(slot).iter().cloned().collect()
    }

    #[test]
    fn test_associate_twice_equals_once() {
        for slot in Slot::ALL {
            let mut store = store_with(&["EX_1"]);
            assert!(associate(&mut store, "EX_1", "f1", slot).unwrap());
            let once = slot_ids(&store, "EX_1", slot);

            assert!(!associate(&mut store, "EX_1", "f1", slot).unwrap());
            assert_eq!(slot_ids(&store, "EX_1", slot), once);
        }
    }

    #[test]
    fn test_dissociate_undoes_associate() {
        let mut store = store_with(&["EX_1"]);
        associate(&mut store, "EX_1", "f1", Slot::Text).unwrap();
        associate(&mut store, "EX_1", "f2", Slot::Text).unwrap();
        let before = store.get("EX_1").unwrap().clone();

        associate(&mut store, "EX_1", "f3", Slot::Text).unwrap();
        dissociate(&mut store, "EX_1", "f3", Slot::Text).unwrap();

        assert_eq!(store.get("EX_1").unwrap(), &before);
    }

    #[test]
    fn test_dissociate_non_member_is_noop() {
        let mut store = store_with(&["EX_1"]);
        associate(&mut store, "EX_1", "f1", Slot::Resolution).unwrap();

        assert!(!dissociate(&mut store, "EX_1", "f1", Slot::Text).unwrap());
        assert!(!dissociate(&mut store, "EX_1", "nope", Slot::Resolution).unwrap());
        assert_eq!(slot_ids(&store, "EX_1", Slot::Resolution), vec!["f1"]);
    }

    #[test]
    fn test_dissociate_keeps_order_of_the_rest() {
        let mut store = store_with(&["EX_1"]);
        for f in ["a", "b", "c", "d"] {
            associate(&mut store, "EX_1", f, Slot::Text).unwrap();
        }
        dissociate(&mut store, "EX_1", "b", Slot::Text).unwrap();
        assert_eq!(slot_ids(&store, "EX_1", Slot::Text), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_slots_are_independent() {
        let mut store = store_with(&["EX_1"]);
        associate(&mut store, "EX_1", "f1", Slot::Text).unwrap();
        associate(&mut store, "EX_1", "f1", Slot::Resolution).unwrap();

        assert_eq!(slot_ids(&store, "EX_1", Slot::Text), vec!["f1"]);
        assert_eq!(slot_ids(&store, "EX_1", Slot::Resolution), vec!["f1"]);
    }

    #[test]
    fn test_unknown_exercise_is_not_found() {
        let mut store = store_with(&["EX_1"]);
        assert!(matches!(
            associate(&mut store, "EX_2", "f1", Slot::Text),
            Err(ReviewError::NotFound(_))
        ));
        assert!(matches!(
            dissociate(&mut store, "EX_2", "f1", Slot::Text),
            Err(ReviewError::NotFound(_))
        ));
    }

    #[test]
    fn test_figure_ids_are_not_validated_on_write() {
        let mut store = store_with(&["EX_1"]);
        assert!(associate(&mut store, "EX_1", "not-in-any-registry", Slot::Text).unwrap());
    }

    #[test]
    fn test_assigned_ids_is_the_union_of_all_slots() {
        let mut store = store_with(&["EX_1", "EX_2"]);
        associate(&mut store, "EX_1", "f1", Slot::Text).unwrap();
        associate(&mut store, "EX_1", "f1", Slot::Resolution).unwrap();
        associate(&mut store, "EX_2", "f1", Slot::Text).unwrap();
        associate(&mut store, "EX_2", "f2", Slot::Resolution).unwrap();

        let assigned = assigned_figure_ids(&store);
        assert_eq!(assigned.len(), 2);
        assert!(assigned.contains("f1"));
        assert!(assigned.contains("f2"));

        dissociate(&mut store, "EX_2", "f2", Slot::Resolution).unwrap();
        assert!(!assigned_figure_ids(&store).contains("f2"));
    }

    #[test]
    fn test_removing_an_exercise_drops_its_ids_from_the_union() {
        let mut store = store_with(&["EX_1", "EX_2"]);
        associate(&mut store, "EX_1", "f1", Slot::Text).unwrap();
        associate(&mut store, "EX_2", "f2", Slot::Text).unwrap();

        store.remove("EX_2");
        let assigned: Vec<String> = assigned_figure_ids(&store).into_iter().collect();
        assert_eq!(assigned, vec!["f1"]);
    }

    #[test]
    fn test_prune_unknown_keeps_only_registered_ids_in_order() {
        use crate::domain::figure::RawFigure;

        let mut registry = FigureRegistry::new();
        registry
            .load(
                ["f1", "f3"]
                    .iter()
                    .map(|id| RawFigure { id: Some(id.to_string()), page: Some(1), ..Default::default() })
                    .collect(),
            )
            .unwrap();

        let mut store = store_with(&["EX_1"]);
        for f in ["f3", "gone", "f1"] {
            associate(&mut store, "EX_1", f, Slot::Text).unwrap();
        }
        associate(&mut store, "EX_1", "gone", Slot::Resolution).unwrap();

        assert_eq!(prune_unknown(&mut store, &registry), 2);
        assert_eq!(slot_ids(&store, "EX_1", Slot::Text), vec!["f3", "f1"]);
        assert!(slot_ids(&store, "EX_1", Slot::Resolution).is_empty());
        assert!(assigned_figure_ids(&store).iter().all(|id| registry.contains(id)));
    }
}
