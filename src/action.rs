use serde::{Deserialize, Serialize};

use crate::error::CatalogueError;
use crate::navigation::Direction;
use crate::state::{NameIndexEntry, Record};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    PageLoadMore,
    PageReload,
    PageDidLoad {
        offset: usize,
        records: Vec<Record>,
        listed: usize,
    },
    PageDidError {
        offset: usize,
        error: CatalogueError,
    },

    SearchStart,
    SearchCancel,
    SearchSubmit,
    SearchInput(char),
    SearchBackspace,
    SearchShowMore,
    SearchDidLoad {
        generation: u64,
        records: Vec<Record>,
    },
    SearchDidError {
        generation: u64,
        error: CatalogueError,
    },

    UniverseDidLoad(Vec<NameIndexEntry>),
    UniverseDidError(CatalogueError),

    SelectionMove(i16),
    SelectionSet(usize),

    OverlayOpen(usize),
    OverlayClose,
    OverlayStep(Direction),
    OverlayTabNext,
    OverlayTabPrev,

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
