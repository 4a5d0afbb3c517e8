//! Core logic – bookmark tree, grid layout and navigation, the select
//! control, settings persistence and the derived page model.
//!
//! Nothing in this module depends on any TUI or rendering crate.

pub mod bookmarks;
pub mod clock;
pub mod data_url;
pub mod debounce;
pub mod grid;
pub mod navigator;
pub mod page;
pub mod range;
pub mod select;
pub mod storage;
