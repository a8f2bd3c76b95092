// ReportScope - ui/panels/mod.rs

pub mod about;
pub mod filters;
pub mod logs;
pub mod status;
pub mod tree;
