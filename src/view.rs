//! What the terminal should show for a given state, independent of how it is drawn.

use crate::navigation::{resolve_display_index, NavContext, ViewSource};
use crate::state::{AppState, OverlayTab, Record};

/// Render collaborator driven by [`present`].
pub trait Presenter {
    fn render_list(&mut self, records: &[Record], selected: usize);
    fn render_overlay(&mut self, record: &Record, nav: NavContext, tab: OverlayTab);
    fn render_error(&mut self, message: &str);
    fn render_empty(&mut self);
    fn render_load_more_affordance(&mut self, visible: bool);
}

pub fn present<P: Presenter + ?Sized>(state: &AppState, presenter: &mut P) {
    match state.view {
        ViewSource::Loaded => {
            if let Some(message) = &state.load_error {
                presenter.render_error(message);
            } else if state.loaded.is_empty() && !state.page_loading {
                presenter.render_empty();
            } else {
                presenter.render_list(&state.loaded, state.selected);
            }
            presenter.render_load_more_affordance(
                state.load_error.is_none() && !state.catalogue_exhausted && !state.page_loading,
            );
        }
        ViewSource::Filtered => {
            let revealed = state.revealed_search_results();
            if revealed.is_empty() && !state.search.loading {
                presenter.render_empty();
            } else {
                presenter.render_list(revealed, state.selected);
            }
            presenter.render_load_more_affordance(state.has_more_search_results());
        }
    }

    let Some(overlay) = state.overlay else {
        return;
    };
    let (Some(nav), Some(record)) = (
        state.nav_context(),
        resolve_display_index(state, overlay.index, overlay.source),
    ) else {
        return;
    };
    presenter.render_overlay(record, nav, overlay.tab);
}
