pub mod class;
pub mod config;
pub mod destinations;
pub mod fly;
pub mod history;
pub mod onboard;
pub mod stats;

use flightfocus_core::{Config, SessionEngine, SqliteStore, SystemClock};

/// Engine over the on-disk store, configured from `config.toml`.
pub(crate) fn open_engine(config: &Config) -> Result<SessionEngine<SqliteStore>, Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    Ok(SessionEngine::from_config(store, SystemClock, config))
}
