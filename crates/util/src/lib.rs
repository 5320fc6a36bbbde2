//! Utility helpers shared across the actrun crates.

mod project_name;

pub use project_name::database_url_to_project_name;
