// ============================================================
// Layer 4 — Export Serializer
// ============================================================
// Produces the final dataset: one object per exercise, in
// store order, with only the five public fields.
//
// Figure payloads are embedded into the strings with a fixed
// marker:
//
//   text       = text + "\n\n[IMAGE: p1]" + "\n\n[IMAGE: p2]" ...
//   resolution = "[IMAGE: pN]\n\n" ... "[IMAGE: p1]\n\n" + resolution
//
// Text figures are appended in association order. Resolution
// figures are each prepended in association order, so the last
// associated figure ends up first. Downstream consumers depend
// on this exact layout.
//
// Ids that no longer resolve in the registry are skipped.

use serde::{Deserialize, Serialize};

use crate::domain::exercise::{Exercise, Slot};
use crate::domain::figure::Figure;
use crate::model::exercise_store::ExerciseStore;
use crate::model::figure_registry::FigureRegistry;

/// One exported exercise. Internal fields (id, page, figure
/// lists) have no place here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedExercise {
    pub text:         String,
    pub question:     String,
    pub alternatives: String,
    pub answer:       String,
    pub resolution:   String,
}

/// Wrap a figure payload in the export marker
fn image_marker(figure: &Figure) -> String {
    format!("[IMAGE: {}]", figure.base64)
}

/// Figures of `slot` that still exist, in association order
pub fn resolve<'a>(
    exercise: &Exercise,
    slot:     Slot,
    registry: &'a FigureRegistry,
) -> Vec<&'a Figure> {
    exercise
        .figures(slot)
        .iter()
        .filter_map(|id| registry.get(id))
        .collect()
}

/// Export a single exercise
pub fn export_exercise(exercise: &Exercise, registry: &FigureRegistry) -> ExportedExercise {
    let mut text = exercise.text.clone();
    for fig in resolve(exercise, Slot::Text, registry) {
        text.push_str("\n\n");
        text.push_str(&image_marker(fig));
    }

    let mut resolution = exercise.resolution.clone();
    for fig in resolve(exercise, Slot::Resolution, registry) {
        resolution = format!("{}\n\n{}", image_marker(fig), resolution);
    }

    ExportedExercise {
        text,
        question:     exercise.question.clone(),
        alternatives: exercise.alternatives.clone(),
        answer:       exercise.answer.clone(),
        resolution,
    }
}

/// Export every exercise in store order
pub fn export(store: &ExerciseStore, registry: &FigureRegistry) -> Vec<ExportedExercise> {
    store.iter().map(|ex| export_exercise(ex, registry)).collect()
}
