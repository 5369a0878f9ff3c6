// src/cli/session.rs

use anyhow::{Context, Result};

use crate::{
    core::{
        active_context::SelectionContext, config_loader, index_store::IndexStore, paths,
    },
    models::GlobalConfig,
};

/// Everything a command runs against: the loaded store, the global
/// configuration and the current selection.
#[derive(Debug)]
pub struct Session {
    pub store: IndexStore,
    pub config: GlobalConfig,
    pub context: SelectionContext,
}

impl Session {
    /// Loads the global configuration and the store it points to.
    pub fn open() -> Result<Self> {
        let config = config_loader::load_global_config().context(t!("error.config_load"))?;
        let store_path = paths::resolve_store_path(config.store_path.as_deref())?;
        log::debug!("Using store at '{}'.", store_path.display());

        let store = IndexStore::open(&store_path)
            .with_context(|| format!(t!("error.store_open"), path = store_path.display()))?;
        let context = SelectionContext::load(&store);

        Ok(Self {
            store,
            config,
            context,
        })
    }

    /// Writes pending store changes, if any.
    pub fn save(&mut self) -> Result<()> {
        self.store.save().context(t!("error.store_save"))
    }
}
