// src/core/mod.rs

pub mod active_context;
pub mod cascade;
pub mod config_loader;
pub mod entity_resolver;
pub mod filter;
pub mod graph_display;
pub mod index_store;
pub mod naming;
pub mod paths;
pub mod setting_resolver;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;
