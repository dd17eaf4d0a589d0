//! Plain-text rendering of session views.
//!
//! Renderers are pure functions over session state; the interactive
//! loop decides when to print them.

pub mod views;

pub use views::*;
