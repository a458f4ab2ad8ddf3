pub mod settings;

pub use settings::{
    CoinSettings, Config, LegSettings, LimitSettings, NetworkSettings, PoolSettings,
    StrategySettings,
};

use crate::error::ArbError;
use std::sync::Arc;

pub const DEFAULT_CONFIG_PATH: &str = "bot_config.json";

/// Resolution order: explicit path, `BOT_CONFIG_PATH`, then [`DEFAULT_CONFIG_PATH`].
pub fn config_path(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var("BOT_CONFIG_PATH").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Loads `.env`, reads the JSON configuration, applies environment overrides and
/// validates the result. Any failure here is fatal for the process.
pub fn load_config(path: &str) -> Result<Arc<Config>, ArbError> {
    dotenv::dotenv().ok();

    let mut config = Config::from_file(path)?;
    config.apply_env_overrides();
    config.validate()?;

    Ok(Arc::new(config))
}
