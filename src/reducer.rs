use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::navigation::{resolve_display_index, step, Direction, ViewSource};
use crate::error::CatalogueError;
use crate::search::{is_searchable, normalize_query, plan_search, SearchPlan};
use crate::state::{AppState, OverlayState};

/// Shown in place of the card list after a failed page load.
pub const PAGE_LOAD_ERROR: &str = "A problem occurred. Press r to reload.";

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            if state.page_loading || !state.loaded.is_empty() {
                return DispatchResult::unchanged();
            }
            request_page(state)
        }

        Action::PageLoadMore => {
            if state.view != ViewSource::Loaded || !state.can_load_more() {
                return DispatchResult::unchanged();
            }
            request_page(state)
        }

        Action::PageReload => {
            if state.page_loading {
                return DispatchResult::unchanged();
            }
            state.wipe_loaded();
            state.message = None;
            request_page(state)
        }

        Action::PageDidLoad {
            offset,
            records,
            listed,
        } => {
            if !state.page_loading || offset != state.offset {
                return DispatchResult::unchanged();
            }
            state.page_loading = false;
            state.load_error = None;
            state.append_page(records, listed);
            state.clamp_selection();
            DispatchResult::changed()
        }

        Action::PageDidError { offset, error } => {
            if !state.page_loading || offset != state.offset {
                return DispatchResult::unchanged();
            }
            state.page_loading = false;
            state.wipe_loaded();
            state.load_error = Some(PAGE_LOAD_ERROR.to_string());
            state.message = Some(format!("Page load failed: {error}"));
            DispatchResult::changed()
        }

        Action::SearchStart => {
            if state.search.editing {
                return DispatchResult::unchanged();
            }
            state.search.editing = true;
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            if !state.search.editing && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.editing = false;
            state.search.query.clear();
            apply_query(state)
        }

        Action::SearchSubmit => {
            if !state.search.editing {
                return DispatchResult::unchanged();
            }
            state.search.editing = false;
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            state.search.query.push(ch);
            apply_query(state)
        }

        Action::SearchBackspace => {
            if state.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            apply_query(state)
        }

        Action::SearchShowMore => {
            if state.view != ViewSource::Filtered || !state.has_more_search_results() {
                return DispatchResult::unchanged();
            }
            state.search.revealed =
                (state.search.revealed + state.search_page_size).min(state.search.results.len());
            DispatchResult::changed()
        }

        Action::SearchDidLoad {
            generation,
            records,
        } => {
            if generation != state.search.generation {
                return DispatchResult::unchanged();
            }
            state.search.loading = false;
            state.search.error = None;
            state.search.results = records;
            state.search.revealed = state.search_page_size;
            close_filtered_overlay(state);
            state.clamp_selection();
            DispatchResult::changed()
        }

        Action::SearchDidError { generation, error } => {
            if generation != state.search.generation {
                return DispatchResult::unchanged();
            }
            state.clear_search_results();
            state.search.error = Some(format!("Search failed: {error}"));
            close_filtered_overlay(state);
            state.clamp_selection();
            DispatchResult::changed()
        }

        Action::UniverseDidLoad(entries) => {
            state.universe = DataResource::Loaded(entries);
            if state.view == ViewSource::Filtered && is_searchable(&state.search.query) {
                return apply_query(state);
            }
            DispatchResult::changed()
        }

        Action::UniverseDidError(error) => {
            state.universe = DataResource::Failed(error.to_string());
            if state.view == ViewSource::Filtered {
                state.clear_search_results();
                state.search.error = Some(format!("Search failed: {error}"));
            }
            DispatchResult::changed()
        }

        Action::SelectionMove(delta) => {
            let len = state.visible_records().len();
            if len == 0 {
                return DispatchResult::unchanged();
            }
            let index = (state.selected as i64 + delta as i64).clamp(0, len as i64 - 1) as usize;
            if index == state.selected {
                return DispatchResult::unchanged();
            }
            state.selected = index;
            DispatchResult::changed()
        }

        Action::SelectionSet(index) => {
            if index >= state.visible_records().len() || index == state.selected {
                return DispatchResult::unchanged();
            }
            state.selected = index;
            DispatchResult::changed()
        }

        Action::OverlayOpen(index) => {
            let source = state.view;
            if resolve_display_index(state, index, source).is_none() {
                return DispatchResult::unchanged();
            }
            state.selected = index;
            state.overlay = Some(OverlayState {
                source,
                index,
                tab: Default::default(),
            });
            DispatchResult::changed()
        }

        Action::OverlayClose => {
            if state.overlay.take().is_none() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::OverlayStep(direction) => step_overlay(state, direction),

        Action::OverlayTabNext => cycle_tab(state, Direction::Forward),
        Action::OverlayTabPrev => cycle_tab(state, Direction::Back),

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size == (width, height) {
                return DispatchResult::unchanged();
            }
            state.terminal_size = (width, height);
            DispatchResult::changed()
        }

        Action::Tick => {
            if !state.is_busy() {
                return DispatchResult::unchanged();
            }
            state.tick = state.tick.wrapping_add(1);
            DispatchResult::changed()
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn request_page(state: &mut AppState) -> DispatchResult<Effect> {
    state.page_loading = true;
    state.load_error = None;
    DispatchResult::changed_with(Effect::LoadPage {
        offset: state.offset,
        limit: state.page_size,
    })
}

/// Re-plans the search for the current query. Every call starts a new
/// generation, so completions for earlier queries are ignored.
fn apply_query(state: &mut AppState) -> DispatchResult<Effect> {
    let was_searching = state.search.loading;
    state.search.generation += 1;
    state.selected = 0;
    state.overlay = None;
    state.clear_search_results();

    match plan_search(&state.search.query, &state.universe) {
        SearchPlan::TooShort => {
            state.view = ViewSource::Loaded;
            cancel_if(was_searching)
        }
        SearchPlan::AwaitUniverse => {
            state.view = ViewSource::Filtered;
            state.search.loading = true;
            if state.universe.is_loading() {
                return DispatchResult::changed();
            }
            state.universe = DataResource::Loading;
            DispatchResult::changed_with(Effect::LoadNameUniverse)
        }
        SearchPlan::NoMatches => {
            state.view = ViewSource::Filtered;
            state.search.error =
                Some(CatalogueError::NotFound(normalize_query(&state.search.query)).to_string());
            cancel_if(was_searching)
        }
        SearchPlan::Enrich(entries) => {
            state.view = ViewSource::Filtered;
            state.search.loading = true;
            DispatchResult::changed_with(Effect::SearchRecords {
                generation: state.search.generation,
                entries,
            })
        }
    }
}

fn cancel_if(was_searching: bool) -> DispatchResult<Effect> {
    if was_searching {
        DispatchResult::changed_with(Effect::CancelSearch)
    } else {
        DispatchResult::changed()
    }
}

fn close_filtered_overlay(state: &mut AppState) {
    if state
        .overlay
        .is_some_and(|overlay| overlay.source == ViewSource::Filtered)
    {
        state.overlay = None;
    }
}

fn step_overlay(state: &mut AppState, direction: Direction) -> DispatchResult<Effect> {
    let Some(overlay) = state.overlay else {
        return DispatchResult::unchanged();
    };
    let len = state.records_for(overlay.source).len();
    let Some(index) = step(len, overlay.index, direction) else {
        return DispatchResult::unchanged();
    };
    if index == overlay.index {
        return DispatchResult::unchanged();
    }
    state.overlay = Some(OverlayState { index, ..overlay });
    if overlay.source == state.view {
        state.selected = index;
    }
    DispatchResult::changed()
}

fn cycle_tab(state: &mut AppState, direction: Direction) -> DispatchResult<Effect> {
    let Some(overlay) = state.overlay.as_mut() else {
        return DispatchResult::unchanged();
    };
    overlay.tab = overlay.tab.cycle(direction);
    DispatchResult::changed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::record;
    use crate::state::{NameIndexEntry, OverlayTab, Record};

    fn page(ids: std::ops::Range<u32>) -> Vec<Record> {
        ids.map(|id| record(id, &format!("mon-{id}"))).collect()
    }

    fn entry(name: &str) -> NameIndexEntry {
        NameIndexEntry {
            name: name.to_string(),
            detail_url: format!("https://pokeapi.co/api/v2/pokemon/{name}"),
        }
    }

    fn type_query(state: &mut AppState, query: &str) -> DispatchResult<Effect> {
        let mut last = DispatchResult::unchanged();
        for ch in query.chars() {
            last = reducer(state, Action::SearchInput(ch));
        }
        last
    }

    #[test]
    fn init_requests_first_page() {
        let mut state = AppState::new(20, 10);
        let result = reducer(&mut state, Action::Init);

        assert!(result.changed);
        assert!(state.page_loading);
        assert_eq!(
            result.effects,
            vec![Effect::LoadPage {
                offset: 0,
                limit: 20
            }]
        );
    }

    #[test]
    fn load_more_ignored_while_loading() {
        let mut state = AppState::new(3, 10);
        let _ = reducer(&mut state, Action::Init);

        let result = reducer(&mut state, Action::PageLoadMore);
        assert!(!result.changed);
        assert!(result.effects.is_empty());
    }

    #[test]
    fn successive_pages_advance_offset() {
        let mut state = AppState::new(3, 10);
        for n in 0..4u32 {
            let result = reducer(&mut state, Action::PageLoadMore);
            assert_eq!(
                result.effects,
                vec![Effect::LoadPage {
                    offset: (n * 3) as usize,
                    limit: 3
                }]
            );
            let _ = reducer(
                &mut state,
                Action::PageDidLoad {
                    offset: (n * 3) as usize,
                    records: page(n * 3 + 1..n * 3 + 4),
                    listed: 3,
                },
            );
        }
        assert_eq!(state.loaded.len(), 12);
        assert_eq!(state.offset, 12);
        assert!(!state.page_loading);
    }

    #[test]
    fn failed_page_wipes_loaded_records() {
        let mut state = AppState::new(3, 10);
        let _ = reducer(&mut state, Action::PageLoadMore);
        let _ = reducer(
            &mut state,
            Action::PageDidLoad {
                offset: 0,
                records: page(1..4),
                listed: 3,
            },
        );
        let _ = reducer(&mut state, Action::PageLoadMore);

        let result = reducer(
            &mut state,
            Action::PageDidError {
                offset: 3,
                error: CatalogueError::Network("timeout".into()),
            },
        );

        assert!(result.changed);
        assert!(state.loaded.is_empty());
        assert_eq!(state.offset, 0);
        assert_eq!(state.load_error.as_deref(), Some(PAGE_LOAD_ERROR));
        assert!(!state.can_load_more());
    }

    #[test]
    fn reload_restarts_from_offset_zero() {
        let mut state = AppState::new(3, 10);
        state.load_error = Some(PAGE_LOAD_ERROR.to_string());

        let result = reducer(&mut state, Action::PageReload);
        assert_eq!(
            result.effects,
            vec![Effect::LoadPage {
                offset: 0,
                limit: 3
            }]
        );
        assert!(state.load_error.is_none());
    }

    #[test]
    fn stale_page_completion_is_dropped() {
        let mut state = AppState::new(3, 10);
        let _ = reducer(&mut state, Action::PageLoadMore);

        let result = reducer(
            &mut state,
            Action::PageDidLoad {
                offset: 9,
                records: page(10..13),
                listed: 3,
            },
        );
        assert!(!result.changed);
        assert!(state.loaded.is_empty());
    }

    #[test]
    fn short_query_restores_loaded_view() {
        let mut state = AppState::new(3, 10);
        state.loaded = page(1..4);
        state.view = ViewSource::Filtered;
        state.search.query = "pik".into();
        state.search.results = page(25..26);
        state.search.revealed = 30;

        let result = reducer(&mut state, Action::SearchBackspace);

        assert!(result.changed);
        assert_eq!(state.search.query, "pi");
        assert_eq!(state.view, ViewSource::Loaded);
        assert!(state.search.results.is_empty());
        assert_eq!(state.search.revealed, 10);
        assert_eq!(state.loaded.len(), 3);
    }

    #[test]
    fn first_search_fetches_universe_once() {
        let mut state = AppState::default();
        let result = type_query(&mut state, "pik");
        assert_eq!(result.effects, vec![Effect::LoadNameUniverse]);
        assert!(state.universe.is_loading());

        let result = reducer(&mut state, Action::SearchInput('a'));
        assert!(result.changed);
        assert!(result.effects.is_empty());
    }

    #[test]
    fn universe_arrival_plans_latest_query() {
        let mut state = AppState::default();
        let _ = type_query(&mut state, "pika");

        let result = reducer(
            &mut state,
            Action::UniverseDidLoad(vec![entry("pikachu"), entry("raichu"), entry("pidgey")]),
        );

        assert_eq!(
            result.effects,
            vec![Effect::SearchRecords {
                generation: state.search.generation,
                entries: vec![entry("pikachu")],
            }]
        );
        assert!(state.search.loading);
    }

    #[test]
    fn stale_search_results_are_dropped() {
        let mut state = AppState::default();
        state.universe = DataResource::Loaded(vec![entry("pikachu"), entry("pidgey")]);
        let _ = type_query(&mut state, "pid");
        let stale = state.search.generation;
        let _ = reducer(&mut state, Action::SearchInput('g'));

        let result = reducer(
            &mut state,
            Action::SearchDidLoad {
                generation: stale,
                records: page(25..26),
            },
        );
        assert!(!result.changed);
        assert!(state.search.results.is_empty());
        assert!(state.search.loading);
    }

    #[test]
    fn search_error_keeps_loaded_records() {
        let mut state = AppState::default();
        state.loaded = page(1..4);
        state.universe = DataResource::Loaded(vec![entry("pikachu")]);
        let _ = type_query(&mut state, "pik");
        let generation = state.search.generation;

        let _ = reducer(
            &mut state,
            Action::SearchDidError {
                generation,
                error: CatalogueError::Network("offline".into()),
            },
        );

        assert_eq!(state.loaded.len(), 3);
        assert!(state.search.results.is_empty());
        assert!(state.search.error.is_some());
        assert_eq!(state.view, ViewSource::Filtered);
    }

    #[test]
    fn show_more_reveals_next_slice() {
        let mut state = AppState::new(20, 10);
        state.view = ViewSource::Filtered;
        state.search.results = page(1..26);

        let _ = reducer(&mut state, Action::SearchShowMore);
        assert_eq!(state.revealed_search_results().len(), 20);
        let _ = reducer(&mut state, Action::SearchShowMore);
        assert_eq!(state.revealed_search_results().len(), 25);

        let result = reducer(&mut state, Action::SearchShowMore);
        assert!(!result.changed);
        assert!(result.effects.is_empty());
    }

    #[test]
    fn overlay_step_wraps() {
        let mut state = AppState::default();
        state.loaded = page(1..4);
        let _ = reducer(&mut state, Action::OverlayOpen(2));

        let _ = reducer(&mut state, Action::OverlayStep(Direction::Forward));
        assert_eq!(state.overlay.map(|overlay| overlay.index), Some(0));

        let _ = reducer(&mut state, Action::OverlayStep(Direction::Back));
        assert_eq!(state.overlay.map(|overlay| overlay.index), Some(2));
        assert_eq!(state.selected, 2);
    }

    #[test]
    fn overlay_open_out_of_range_is_ignored() {
        let mut state = AppState::default();
        let result = reducer(&mut state, Action::OverlayOpen(0));
        assert!(!result.changed);
        assert!(state.overlay.is_none());
    }

    #[test]
    fn overlay_tabs_cycle() {
        let mut state = AppState::default();
        state.loaded = page(1..2);
        let _ = reducer(&mut state, Action::OverlayOpen(0));
        let _ = reducer(&mut state, Action::OverlayTabPrev);
        assert_eq!(state.overlay.map(|overlay| overlay.tab), Some(OverlayTab::Evolution));
    }

    #[test]
    fn selection_move_clamps() {
        let mut state = AppState::default();
        state.loaded = page(1..4);

        let _ = reducer(&mut state, Action::SelectionMove(10));
        assert_eq!(state.selected, 2);
        let _ = reducer(&mut state, Action::SelectionMove(-10));
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn tick_only_changes_while_busy() {
        let mut state = AppState::default();
        assert!(!reducer(&mut state, Action::Tick).changed);

        state.page_loading = true;
        assert!(reducer(&mut state, Action::Tick).changed);
    }
}
