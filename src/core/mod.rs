// ReportScope - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: ui, platform, app, or any I/O crate directly.

pub mod export;
pub mod filter;
pub mod model;
pub mod projection;
pub mod report;
pub mod search;
pub mod severity;
pub mod tree;
