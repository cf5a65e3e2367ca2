//! Global name search over the full catalogue listing.

use std::collections::HashSet;

use tui_dispatch::DataResource;

use crate::api::Catalogue;
use crate::error::CatalogueError;
use crate::state::NameIndexEntry;

/// Queries shorter than this restore the paged view instead of searching.
pub const MIN_QUERY_LEN: usize = 3;

pub const DEFAULT_UNIVERSE_BATCH: usize = 500;

#[derive(Clone, Debug, PartialEq)]
pub enum SearchPlan {
    TooShort,
    /// The name universe is not available yet; the query waits for it.
    AwaitUniverse,
    NoMatches,
    Enrich(Vec<NameIndexEntry>),
}

/// Lowercases the query. Whitespace is kept and counts toward the length.
pub fn normalize_query(query: &str) -> String {
    query.to_lowercase()
}

pub fn is_searchable(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_LEN
}

/// Case-insensitive substring match in universe order. Repeated names are
/// reported once.
pub fn matching_entries(universe: &[NameIndexEntry], query: &str) -> Vec<NameIndexEntry> {
    let needle = normalize_query(query);
    let mut seen = HashSet::new();
    universe
        .iter()
        .filter(|entry| entry.name.to_lowercase().contains(&needle))
        .filter(|entry| seen.insert(entry.name.clone()))
        .cloned()
        .collect()
}

pub fn plan_search(query: &str, universe: &DataResource<Vec<NameIndexEntry>>) -> SearchPlan {
    if !is_searchable(query) {
        return SearchPlan::TooShort;
    }
    let Some(entries) = universe.data() else {
        return SearchPlan::AwaitUniverse;
    };
    let matches = matching_entries(entries, query);
    if matches.is_empty() {
        SearchPlan::NoMatches
    } else {
        SearchPlan::Enrich(matches)
    }
}

/// Pages through the whole listing collecting names and detail urls only.
///
/// Stops at the first short page, or at a page that adds no new names so a
/// listing that ignores `offset` cannot loop forever.
pub async fn fetch_name_universe(
    catalogue: &dyn Catalogue,
    batch: usize,
) -> Result<Vec<NameIndexEntry>, CatalogueError> {
    let batch = batch.max(1);
    let mut universe = Vec::new();
    let mut seen = HashSet::new();
    let mut offset = 0;
    loop {
        let page = catalogue.list_page(offset, batch).await?;
        let listed = page.len();
        offset += listed;
        let known = universe.len();
        universe.extend(
            page.into_iter()
                .filter(|entry| seen.insert(entry.name.clone())),
        );
        if listed < batch {
            break;
        }
        if universe.len() == known {
            tracing::warn!(offset, "listing repeated a full page, stopping name index fetch");
            break;
        }
    }
    tracing::info!(entries = universe.len(), "name universe loaded");
    Ok(universe)
}
