//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer takes the *core* data structures and turns them into cells on
//! the terminal. No storage or bookmark I/O happens here.

pub mod layout;
pub mod newtab;
pub mod options;
pub mod theme;
