//! Screen rendering checks using RenderHarness.

use pokecards::navigation::ViewSource;
use pokecards::reducer::PAGE_LOAD_ERROR;
use pokecards::state::{AppState, Evolution, OverlayState, OverlayTab, Record, Stat, StatKind};
use pokecards::ui::CardsUi;
use tui_dispatch::testing::*;

fn record(id: u32, name: &str, types: &[&str]) -> Record {
    Record {
        id,
        name: name.to_string(),
        image_url: String::new(),
        types: types.iter().map(|t| t.to_string()).collect(),
        height: 4,
        weight: 60,
        base_experience: 112,
        abilities: vec!["static".to_string()],
        first_moves: vec!["mega-punch".to_string(), "pay-day".to_string()],
        stats: StatKind::ALL
            .iter()
            .map(|kind| Stat {
                kind: *kind,
                base_value: 90,
            })
            .collect(),
        evolution: None,
    }
}

fn render(state: &AppState) -> String {
    let mut harness = RenderHarness::new(80, 24);
    let mut ui = CardsUi::new();
    harness.render_to_string_plain(|frame| {
        let area = frame.area();
        ui.draw(frame, area, state, true);
    })
}

#[test]
fn test_card_list_shows_id_name_and_types() {
    let mut state = AppState::default();
    state.loaded = vec![
        record(1, "bulbasaur", &["grass", "poison"]),
        record(4, "charmander", &["fire"]),
    ];

    let output = render(&state);
    assert!(output.contains("#001"));
    assert!(output.contains("bulbasaur"));
    assert!(output.contains("POISON"));
    assert!(output.contains("charmander"));
    assert!(output.contains("2 loaded"));
    assert!(output.contains("load more"));
}

#[test]
fn test_load_more_hidden_while_loading() {
    let mut state = AppState::default();
    state.loaded = vec![record(1, "bulbasaur", &["grass"])];
    state.page_loading = true;

    let output = render(&state);
    assert!(output.contains("bulbasaur"));
    assert!(!output.contains("load more"));
}

#[test]
fn test_load_error_replaces_list() {
    let mut state = AppState::default();
    state.load_error = Some(PAGE_LOAD_ERROR.to_string());

    let output = render(&state);
    assert!(output.contains("A problem occurred"));
    assert!(!output.contains("load more"));
}

#[test]
fn test_empty_search_results() {
    let mut state = AppState::default();
    state.view = ViewSource::Filtered;
    state.search.query = "zzz".into();

    let output = render(&state);
    assert!(output.contains("No Pokémon found."));
    assert!(output.contains("/zzz"));
}

#[test]
fn test_overlay_shows_position_and_evolution() {
    let mut state = AppState::default();
    let mut pikachu = record(25, "pikachu", &["electric"]);
    pikachu.evolution = Some(Evolution {
        stage_one_name: "pichu".into(),
        stage_one_image: "pichu.svg".into(),
        stage_two_name: Some("pikachu".into()),
        stage_two_image: Some("pikachu.svg".into()),
        stage_three_name: Some("raichu".into()),
        stage_three_image: Some("raichu.svg".into()),
    });
    state.loaded = vec![record(1, "bulbasaur", &["grass"]), pikachu];
    state.overlay = Some(OverlayState {
        source: ViewSource::Loaded,
        index: 1,
        tab: OverlayTab::Evolution,
    });

    let output = render(&state);
    assert!(output.contains("#025 PIKACHU"));
    assert!(output.contains("(2/2)"));
    assert!(output.contains("pichu"));
    assert!(output.contains("raichu"));
    assert!(output.contains("raichu.svg"));
}

#[test]
fn test_overlay_stats_tab() {
    let mut state = AppState::default();
    state.loaded = vec![record(25, "pikachu", &["electric"])];
    state.overlay = Some(OverlayState {
        source: ViewSource::Loaded,
        index: 0,
        tab: OverlayTab::Stats,
    });

    let output = render(&state);
    assert!(output.contains("Sp. Atk"));
    assert!(output.contains("#########"));
}
