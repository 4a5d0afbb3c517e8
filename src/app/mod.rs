//! Application orchestration — state management, event loop, and input handling.

pub mod bookmark_runtime;
pub mod event;
pub mod handler;
pub mod settings;
pub mod state;
