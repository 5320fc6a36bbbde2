//! Template catalog adapter seam and candidate list bookkeeping.
//!
//! The external catalog service answers two lookup modes: a server-driven
//! search over the public catalog and an eager listing of the project's
//! private templates. Both are read-only from the engine's perspective and
//! may fail transiently; retry is simply re-issuing the same call.
//!
//! Responses arrive out of band, so [`CatalogSession`] hands out
//! monotonically increasing query ids and refuses any response that is not
//! for the most recently issued query. Nothing is actively aborted; a stale
//! future just finds nobody interested in its result.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use actrun_types::ActionTemplate;

/// Failure surfaced when the catalog backend cannot answer a lookup.
///
/// Recoverable by the operator: the same query may be re-issued, and an
/// unavailable catalog never invalidates an already-selected template.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("template catalog unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Read-only lookup interface over the external template catalog.
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    /// Searches the public catalog; may legitimately return no matches.
    async fn search(&self, query: &str, project_id: &str) -> Result<Vec<ActionTemplate>, CatalogError>;

    /// Lists the project's private templates.
    async fn list_private(&self, project_id: &str) -> Result<Vec<ActionTemplate>, CatalogError>;
}

/// In-memory catalog backed by a fixed template list.
///
/// Useful for previews and tests; the public search matches name,
/// description, and id case-insensitively.
#[derive(Debug, Default, Clone)]
pub struct StaticCatalog {
    templates: Vec<ActionTemplate>,
}

impl StaticCatalog {
    /// Creates a catalog serving the given templates.
    pub fn new(templates: Vec<ActionTemplate>) -> Self {
        Self { templates }
    }
}

#[async_trait]
impl TemplateCatalog for StaticCatalog {
    async fn search(&self, query: &str, _project_id: &str) -> Result<Vec<ActionTemplate>, CatalogError> {
        let lower_query = query.trim().to_lowercase();
        Ok(self
            .templates
            .iter()
            .filter(|template| template.public)
            .filter(|template| lower_query.is_empty() || matches_search(template, &lower_query))
            .cloned()
            .collect())
    }

    async fn list_private(&self, _project_id: &str) -> Result<Vec<ActionTemplate>, CatalogError> {
        Ok(self.templates.iter().filter(|template| !template.public).cloned().collect())
    }
}

/// Identifier for one issued catalog query, used to enforce last-query-wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryId(u64);

/// Tracks the candidate template list and which in-flight query may update it.
#[derive(Debug, Default)]
pub struct CatalogSession {
    issued: u64,
    latest: Option<QueryId>,
    candidates: Vec<ActionTemplate>,
}

impl CatalogSession {
    /// Creates a session with no candidates and no outstanding query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new outstanding query, superseding any prior one.
    pub fn begin_query(&mut self) -> QueryId {
        self.issued += 1;
        let id = QueryId(self.issued);
        self.latest = Some(id);
        debug!(query = self.issued, "catalog query issued");
        id
    }

    /// Drops interest in any outstanding query without issuing a new one.
    ///
    /// Used when the operator switches source tabs: results for queries
    /// issued against the previous tab must never land in the new view.
    pub fn invalidate(&mut self) {
        self.latest = None;
    }

    /// Applies a response if it answers the most recently issued query.
    ///
    /// Returns `false` and leaves the candidate list untouched when the
    /// response is stale.
    pub fn accept(&mut self, query_id: QueryId, templates: Vec<ActionTemplate>) -> bool {
        if self.latest != Some(query_id) {
            warn!(query = query_id.0, "discarding stale catalog response");
            return false;
        }
        debug!(query = query_id.0, count = templates.len(), "catalog response accepted");
        self.candidates = templates;
        true
    }

    /// Returns the current candidate templates in catalog order.
    pub fn candidates(&self) -> &[ActionTemplate] {
        &self.candidates
    }

    /// Returns candidates matching a case-insensitive substring filter.
    pub fn filter_candidates(&self, query: &str) -> Vec<&ActionTemplate> {
        let lower_query = query.trim().to_lowercase();
        if lower_query.is_empty() {
            return self.candidates.iter().collect();
        }
        self.candidates
            .iter()
            .filter(|template| matches_search(template, &lower_query))
            .collect()
    }

    /// Clears the candidate list and drops interest in outstanding queries.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.latest = None;
    }
}

fn matches_search(template: &ActionTemplate, lower_query: &str) -> bool {
    let name_matches = template.name.to_lowercase().contains(lower_query);
    let id_matches = template.id.to_lowercase().contains(lower_query);
    let description_matches = template
        .description
        .as_deref()
        .map(|description| description.to_lowercase().contains(lower_query))
        .unwrap_or(false);

    name_matches || id_matches || description_matches
}
