//! Rendering only: every widget reads from or forwards to [`crate::state::AppState`].

pub mod panels;
pub mod plot;
