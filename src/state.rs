use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::navigation::{Direction, NavContext, ViewSource};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_SEARCH_PAGE_SIZE: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl StatKind {
    pub const ALL: [StatKind; 6] = [
        StatKind::Hp,
        StatKind::Attack,
        StatKind::Defense,
        StatKind::SpecialAttack,
        StatKind::SpecialDefense,
        StatKind::Speed,
    ];

    pub fn api_name(self) -> &'static str {
        match self {
            StatKind::Hp => "hp",
            StatKind::Attack => "attack",
            StatKind::Defense => "defense",
            StatKind::SpecialAttack => "special-attack",
            StatKind::SpecialDefense => "special-defense",
            StatKind::Speed => "speed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatKind::Hp => "HP",
            StatKind::Attack => "Attack",
            StatKind::Defense => "Defense",
            StatKind::SpecialAttack => "Sp. Atk",
            StatKind::SpecialDefense => "Sp. Def",
            StatKind::Speed => "Speed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub kind: StatKind,
    pub base_value: u32,
}

/// Linear evolution line, truncated to three stages.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Evolution {
    pub stage_one_name: String,
    pub stage_one_image: String,
    pub stage_two_name: Option<String>,
    pub stage_two_image: Option<String>,
    pub stage_three_name: Option<String>,
    pub stage_three_image: Option<String>,
}

impl Evolution {
    /// `(name, image)` pairs for every populated stage, in chain order.
    pub fn stages(&self) -> Vec<(&str, &str)> {
        let mut stages = vec![(self.stage_one_name.as_str(), self.stage_one_image.as_str())];
        if let Some(name) = &self.stage_two_name {
            stages.push((name, self.stage_two_image.as_deref().unwrap_or("")));
        }
        if let Some(name) = &self.stage_three_name {
            stages.push((name, self.stage_three_image.as_deref().unwrap_or("")));
        }
        stages
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u32,
    pub name: String,
    pub image_url: String,
    pub types: Vec<String>,
    pub height: u32,
    pub weight: u32,
    pub base_experience: u32,
    pub abilities: Vec<String>,
    pub first_moves: Vec<String>,
    pub stats: Vec<Stat>,
    pub evolution: Option<Evolution>,
}

impl Record {
    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }

    pub fn stat(&self, kind: StatKind) -> u32 {
        self.stats
            .iter()
            .find(|stat| stat.kind == kind)
            .map(|stat| stat.base_value)
            .unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameIndexEntry {
    pub name: String,
    pub detail_url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    /// Whether the search bar is capturing keystrokes.
    pub editing: bool,
    pub query: String,
    /// Bumped on every query change; completions from older generations are dropped.
    pub generation: u64,
    pub loading: bool,
    pub results: Vec<Record>,
    /// How many results are revealed. Starts at the search page size.
    pub revealed: usize,
    pub error: Option<String>,
}

impl SearchState {
    pub fn new(page_size: usize) -> Self {
        Self {
            editing: false,
            query: String::new(),
            generation: 0,
            loading: false,
            results: Vec::new(),
            revealed: page_size,
            error: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayTab {
    #[default]
    Main,
    Stats,
    Evolution,
}

impl OverlayTab {
    pub const ALL: [OverlayTab; 3] = [OverlayTab::Main, OverlayTab::Stats, OverlayTab::Evolution];

    pub fn index(self) -> usize {
        match self {
            OverlayTab::Main => 0,
            OverlayTab::Stats => 1,
            OverlayTab::Evolution => 2,
        }
    }

    pub fn cycle(self, direction: Direction) -> Self {
        let len = Self::ALL.len();
        let index = match direction {
            Direction::Forward => (self.index() + 1) % len,
            Direction::Back => (self.index() + len - 1) % len,
        };
        Self::ALL[index]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayState {
    pub source: ViewSource,
    pub index: usize,
    pub tab: OverlayTab,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub page_size: usize,
    pub search_page_size: usize,

    pub loaded: Vec<Record>,
    pub offset: usize,
    pub page_loading: bool,
    pub catalogue_exhausted: bool,
    pub load_error: Option<String>,

    pub universe: DataResource<Vec<NameIndexEntry>>,
    pub search: SearchState,
    pub view: ViewSource,

    pub selected: usize,
    pub overlay: Option<OverlayState>,
    pub message: Option<String>,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_PAGE_SIZE)
    }
}

impl AppState {
    pub fn new(page_size: usize, search_page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let search_page_size = search_page_size.max(1);
        Self {
            terminal_size: (80, 24),
            page_size,
            search_page_size,
            loaded: Vec::new(),
            offset: 0,
            page_loading: false,
            catalogue_exhausted: false,
            load_error: None,
            universe: DataResource::Empty,
            search: SearchState::new(search_page_size),
            view: ViewSource::Loaded,
            selected: 0,
            overlay: None,
            message: None,
            tick: 0,
        }
    }

    /// Appends a fetched page in listing order.
    ///
    /// `listed` is the number of entries the listing returned for this page; the
    /// offset advances by that amount even if some records were already present.
    pub fn append_page(&mut self, records: Vec<Record>, listed: usize) {
        let mut known: HashSet<u32> = self.loaded.iter().map(|record| record.id).collect();
        for record in records {
            if known.insert(record.id) {
                self.loaded.push(record);
            }
        }
        self.offset += listed;
        if listed < self.page_size {
            self.catalogue_exhausted = true;
        }
    }

    /// Drops every loaded record and rewinds paging to the start.
    pub fn wipe_loaded(&mut self) {
        self.loaded.clear();
        self.offset = 0;
        self.catalogue_exhausted = false;
        if self.view == ViewSource::Loaded {
            self.selected = 0;
            self.overlay = None;
        }
    }

    pub fn clear_search_results(&mut self) {
        self.search.results.clear();
        self.search.revealed = self.search_page_size;
        self.search.loading = false;
        self.search.error = None;
    }

    pub fn revealed_search_results(&self) -> &[Record] {
        let end = self.search.revealed.min(self.search.results.len());
        &self.search.results[..end]
    }

    pub fn records_for(&self, source: ViewSource) -> &[Record] {
        match source {
            ViewSource::Loaded => &self.loaded,
            ViewSource::Filtered => self.revealed_search_results(),
        }
    }

    /// Records currently on screen, in display order.
    pub fn visible_records(&self) -> &[Record] {
        self.records_for(self.view)
    }

    pub fn has_more_search_results(&self) -> bool {
        self.search.revealed < self.search.results.len()
    }

    pub fn can_load_more(&self) -> bool {
        !self.page_loading && !self.catalogue_exhausted && self.load_error.is_none()
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible_records().len();
        self.selected = if len == 0 {
            0
        } else {
            self.selected.min(len - 1)
        };
    }

    pub fn nav_context(&self) -> Option<NavContext> {
        let overlay = self.overlay?;
        Some(NavContext {
            source: overlay.source,
            index: overlay.index,
            count: self.records_for(overlay.source).len(),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.page_loading || self.search.loading || self.universe.is_loading()
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Pages")
                .entry("loaded", ron_string(&self.loaded.len()))
                .entry("offset", ron_string(&self.offset))
                .entry("page_size", ron_string(&self.page_size))
                .entry("loading", ron_string(&self.page_loading))
                .entry("exhausted", ron_string(&self.catalogue_exhausted))
                .entry("error", ron_string(&self.load_error)),
            DebugSection::new("Search")
                .entry("query", ron_string(&self.search.query))
                .entry("editing", ron_string(&self.search.editing))
                .entry("generation", ron_string(&self.search.generation))
                .entry("loading", ron_string(&self.search.loading))
                .entry("results", ron_string(&self.search.results.len()))
                .entry("revealed", ron_string(&self.search.revealed))
                .entry(
                    "universe",
                    ron_string(&self.universe.data().map(|entries| entries.len())),
                ),
            DebugSection::new("View")
                .entry("source", ron_string(&self.view))
                .entry("selected", ron_string(&self.selected))
                .entry("overlay", ron_string(&self.overlay))
                .entry("message", ron_string(&self.message)),
        ]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(id: u32, name: &str) -> Record {
        Record {
            id,
            name: name.to_string(),
            image_url: String::new(),
            types: vec!["normal".to_string()],
            height: 0,
            weight: 0,
            base_experience: 0,
            abilities: Vec::new(),
            first_moves: Vec::new(),
            stats: StatKind::ALL
                .iter()
                .map(|kind| Stat {
                    kind: *kind,
                    base_value: 0,
                })
                .collect(),
            evolution: None,
        }
    }

    #[test]
    fn append_page_skips_known_ids_but_advances_offset() {
        let mut state = AppState::new(2, 10);
        state.append_page(vec![record(1, "bulbasaur"), record(2, "ivysaur")], 2);
        state.append_page(vec![record(2, "ivysaur"), record(3, "venusaur")], 2);

        let ids: Vec<u32> = state.loaded.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(state.offset, 4);
        assert!(!state.catalogue_exhausted);
    }

    #[test]
    fn short_page_marks_catalogue_exhausted() {
        let mut state = AppState::new(3, 10);
        state.append_page(vec![record(1, "bulbasaur")], 1);
        assert!(state.catalogue_exhausted);
        assert!(!state.can_load_more());
    }

    #[test]
    fn revealed_results_never_exceed_result_count() {
        let mut state = AppState::new(20, 10);
        state.search.results = (1..=4).map(|id| record(id, "pidgey")).collect();
        assert_eq!(state.revealed_search_results().len(), 4);
        assert!(!state.has_more_search_results());
    }

    #[test]
    fn evolution_stages_skip_missing_entries() {
        let evolution = Evolution {
            stage_one_name: "eevee".into(),
            stage_one_image: "eevee.svg".into(),
            stage_two_name: Some("vaporeon".into()),
            stage_two_image: None,
            ..Default::default()
        };
        assert_eq!(
            evolution.stages(),
            vec![("eevee", "eevee.svg"), ("vaporeon", "")]
        );
    }

    #[test]
    fn overlay_tab_cycles_both_ways() {
        assert_eq!(OverlayTab::Main.cycle(Direction::Back), OverlayTab::Evolution);
        assert_eq!(OverlayTab::Evolution.cycle(Direction::Forward), OverlayTab::Main);
    }
}
