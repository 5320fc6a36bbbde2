//! Shared type definitions for the actrun configuration engine.
//!
//! The schema types here describe action templates as delivered by the
//! catalog service and environments as delivered by the environment
//! directory. The engine crate consumes them read-only; nothing in this
//! crate mutates a template after deserialization.

pub mod environment;
pub mod template;
pub mod validation;

pub use environment::Environment;
pub use template::{ActionTemplate, EnvironmentSlot, InputFieldSpec, InputKind, InputValidation, SlotRole, StepSpec};
pub use validation::{validate_candidate_value, validate_value_kind};
