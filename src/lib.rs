//! `devtree` resolves names across an Ecosystem → Domain → App → Workspace
//! hierarchy and cascades settings (theme, credentials) from the most
//! specific level toward the global configuration.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod state;
