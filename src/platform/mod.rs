// ReportScope - platform/mod.rs
//
// Platform layer: directories, config.toml and file access.
// Dependencies: util, core (report parsing), directories, toml.
// Must NOT depend on: app, ui.

pub mod config;
pub mod fs;
