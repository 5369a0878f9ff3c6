// src/cli/handlers/mod.rs

// One module per CLI command.

pub mod commons;
pub mod create;
pub mod credential;
pub mod delete;
pub mod list;
pub mod show;
pub mod theme;
pub mod tree;
pub mod use_context;
