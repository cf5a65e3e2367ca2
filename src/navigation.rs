//! Display index to record resolution for overlay browsing.

use serde::{Deserialize, Serialize};

use crate::state::{AppState, Record};

/// Which collection a display index refers to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewSource {
    #[default]
    Loaded,
    Filtered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Back,
    Forward,
}

/// Position of the overlay inside its source collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavContext {
    pub source: ViewSource,
    pub index: usize,
    pub count: usize,
}

impl NavContext {
    pub fn can_step(&self) -> bool {
        self.count > 1
    }
}

/// Resolves a display index to a record.
///
/// Filtered indexes are reconciled by id: when the same record is also loaded,
/// the loaded copy wins.
pub fn resolve_display_index(state: &AppState, index: usize, source: ViewSource) -> Option<&Record> {
    let candidate = state.records_for(source).get(index)?;
    match source {
        ViewSource::Loaded => Some(candidate),
        ViewSource::Filtered => state
            .loaded
            .iter()
            .find(|record| record.id == candidate.id)
            .or(Some(candidate)),
    }
}

/// Next index in `direction`, wrapping at both ends. `None` for an empty collection.
pub fn step(len: usize, index: usize, direction: Direction) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let index = index.min(len - 1);
    Some(match direction {
        Direction::Forward => (index + 1) % len,
        Direction::Back => (index + len - 1) % len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::record;

    #[test]
    fn step_wraps_at_both_ends() {
        assert_eq!(step(5, 4, Direction::Forward), Some(0));
        assert_eq!(step(5, 0, Direction::Back), Some(4));
        assert_eq!(step(5, 2, Direction::Forward), Some(3));
        assert_eq!(step(5, 2, Direction::Back), Some(1));
    }

    #[test]
    fn step_on_empty_collection_is_none() {
        assert_eq!(step(0, 0, Direction::Forward), None);
        assert_eq!(step(0, 3, Direction::Back), None);
    }

    #[test]
    fn step_single_element_stays_put() {
        assert_eq!(step(1, 0, Direction::Forward), Some(0));
        assert_eq!(step(1, 0, Direction::Back), Some(0));
    }

    #[test]
    fn filtered_index_prefers_loaded_copy() {
        let mut state = AppState::default();
        let mut canonical = record(25, "pikachu");
        canonical.base_experience = 112;
        state.loaded = vec![record(1, "bulbasaur"), canonical.clone()];
        state.search.results = vec![record(25, "pikachu")];

        let resolved = resolve_display_index(&state, 0, ViewSource::Filtered).unwrap();
        assert_eq!(resolved, &canonical);
    }

    #[test]
    fn filtered_index_falls_back_to_filtered_copy() {
        let mut state = AppState::default();
        state.loaded = vec![record(1, "bulbasaur")];
        state.search.results = vec![record(172, "pichu")];

        let resolved = resolve_display_index(&state, 0, ViewSource::Filtered).unwrap();
        assert_eq!(resolved.id, 172);
    }

    #[test]
    fn out_of_range_index_resolves_to_none() {
        let state = AppState::default();
        assert!(resolve_display_index(&state, 0, ViewSource::Loaded).is_none());
        assert!(resolve_display_index(&state, 3, ViewSource::Filtered).is_none());
    }
}
