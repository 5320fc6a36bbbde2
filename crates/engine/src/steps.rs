//! Read-only projection of a template's execution steps.
//!
//! Purely a display concern: the engine never mutates steps, and before a
//! run is submitted the active index is always the first step.

use actrun_types::StepSpec;

/// One step as surfaced to a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRow {
    /// Position in the template's step order.
    pub index: usize,
    /// Step name, falling back to the position.
    pub title: String,
    /// Opaque step kind, when declared.
    pub kind: Option<String>,
    /// Optional descriptive copy.
    pub description: Option<String>,
    /// Whether this is the step the preview highlights.
    pub active: bool,
}

/// Projects a template's ordered steps with an active-step marker.
#[derive(Debug, Clone, Default)]
pub struct StepsPreviewer {
    steps: Vec<StepSpec>,
    active_index: usize,
}

impl StepsPreviewer {
    /// Creates a preview over the given steps, highlighting the first.
    pub fn new(steps: Vec<StepSpec>) -> Self {
        Self { steps, active_index: 0 }
    }

    /// Returns the number of steps in the preview.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when the template declares no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the highlighted step index.
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Yields the ordered rows for rendering.
    pub fn rows(&self) -> Vec<StepRow> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| StepRow {
                index,
                title: match &step.name {
                    Some(name) if !name.is_empty() => name.clone(),
                    _ => format!("Step {}", index + 1),
                },
                kind: step.kind.clone(),
                description: step.description.clone(),
                active: index == self.active_index,
            })
            .collect()
    }
}
