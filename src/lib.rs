//! Paginated Pokemon card browser built on tui-dispatch.
//!
//! The library exposes every module so integration tests can drive them.

pub mod action;
pub mod api;
pub mod config;
pub mod effect;
pub mod enrich;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod reducer;
pub mod search;
pub mod state;
pub mod ui;
pub mod view;
