// ReportScope - app/mod.rs
//
// Application layer: viewer state, navigation, debouncing, log fetching and
// session persistence.
// Dependencies: core layer.
// Must NOT depend on: ui, platform specifics.

pub mod debounce;
pub mod fetch;
pub mod navigation;
pub mod session;
pub mod source;
pub mod state;
