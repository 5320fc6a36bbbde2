//! Expansion state for the four configuration sections.
//!
//! Each section expands and collapses independently; there is no accordion
//! behavior, so any number of sections may be open at once. Toggling is pure
//! UI state and never touches bound data.

/// The four sections of the configuration flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Template selection, including the public/private source tabs.
    TemplatePicker,
    /// Environment slot bindings.
    Environments,
    /// Input field entry.
    Inputs,
    /// Read-only steps preview.
    Steps,
}

/// Independent expanded/collapsed toggles, one per section.
///
/// The template picker starts expanded so the operator always lands on
/// template choice first; everything else starts collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionExpansionController {
    template_picker: bool,
    environments: bool,
    inputs: bool,
    steps: bool,
}

impl Default for SectionExpansionController {
    fn default() -> Self {
        Self {
            template_picker: true,
            environments: false,
            inputs: false,
            steps: false,
        }
    }
}

impl SectionExpansionController {
    /// Creates the landing state: picker expanded, the rest collapsed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips exactly one section's expansion state.
    pub fn toggle(&mut self, section: Section) {
        let flag = self.flag_mut(section);
        *flag = !*flag;
    }

    /// Returns whether a section is currently expanded.
    pub fn is_expanded(&self, section: Section) -> bool {
        match section {
            Section::TemplatePicker => self.template_picker,
            Section::Environments => self.environments,
            Section::Inputs => self.inputs,
            Section::Steps => self.steps,
        }
    }

    /// Restores the landing state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn flag_mut(&mut self, section: Section) -> &mut bool {
        match section {
            Section::TemplatePicker => &mut self.template_picker,
            Section::Environments => &mut self.environments,
            Section::Inputs => &mut self.inputs,
            Section::Steps => &mut self.steps,
        }
    }
}
