// Public library interface for folioview-rs
// The CLI and the debug-layout tool are thin wrappers over these modules.

pub mod config;
pub mod error;
pub mod layout;
pub mod portfolio;
pub mod render;
pub mod ui;
