//! # Actrun Engine
//!
//! The actrun engine is the template-driven configuration core that sits
//! between a template catalog and a run-submission service. It owns the
//! state an operator builds up while configuring an action: the selected
//! template, environment slot bindings validated under role constraints,
//! operator-supplied input values, independent section expansion toggles,
//! and a read-only steps preview.
//!
//! ## Architecture
//!
//! - **`catalog`**: adapter seam over the external template catalog plus
//!   last-query-wins response bookkeeping
//! - **`environments`**: slot eligibility policy and the binding state
//! - **`inputs`**: per-field value storage and validation
//! - **`sections`**: expansion state for the four configuration sections
//! - **`steps`**: read-only projection of a template's execution steps
//! - **`form`**: the composing configuration form and final assembly
//!
//! All state transitions are synchronous reactions to discrete operator
//! actions; the only asynchronous boundary is the catalog adapter, whose
//! results are applied through [`CatalogSession`] so a stale response for a
//! superseded query never reaches the candidate list.

pub mod catalog;
pub mod environments;
pub mod form;
pub mod inputs;
pub mod sections;
pub mod steps;

pub use catalog::{CatalogError, CatalogSession, QueryId, StaticCatalog, TemplateCatalog};
pub use environments::{BindError, CandidateRow, EnvironmentSlotBinder, IneligibleReason, SlotPolicy, candidate_label};
pub use form::{ActionConfigurationForm, AssembleError, AssembledConfiguration, MissingItem, SourceTab};
pub use inputs::{InputError, InputFieldBinder};
pub use sections::{Section, SectionExpansionController};
pub use steps::{StepRow, StepsPreviewer};
