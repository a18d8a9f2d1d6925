//! CLI command implementations.

pub mod deck;
pub mod import;
pub mod inspect;
pub mod study;

use std::path::PathBuf;

use crate::db::CardStore;
use crate::paths::{ensure_parent, AppPaths};
use crate::settings::SettingsStore;

/// Everything a command needs: resolved paths, the open card store and
/// the settings store.
pub struct AppContext {
    pub paths: AppPaths,
    pub store: CardStore,
    pub settings: SettingsStore,
}

impl AppContext {
    pub fn open(root: PathBuf) -> anyhow::Result<Self> {
        let paths = AppPaths::new(root);
        let db_path = paths.db_path();
        ensure_parent(&db_path)?;
        let store = CardStore::open(&db_path)?;
        let settings = SettingsStore::open(paths.settings_path());
        Ok(Self {
            paths,
            store,
            settings,
        })
    }
}
