use crate::state::NameIndexEntry;

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadPage { offset: usize, limit: usize },
    LoadNameUniverse,
    SearchRecords {
        generation: u64,
        entries: Vec<NameIndexEntry>,
    },
    CancelSearch,
}
