use std::{env, path::PathBuf};

use anyhow::{bail, Result};

use super::schema::Settings;

/// `Settings::load` layers environment variables (prefix `REDTUNE__`) over an
/// optional config file and falls back to struct defaults.
impl Settings {
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("REDTUNE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Reject settings the clients cannot work without.
    pub fn validate(&self) -> Result<()> {
        if self.catalog.api_key.trim().is_empty() {
            bail!("catalog.api_key is not set (REDTUNE__CATALOG__API_KEY)");
        }
        if self.backend.url.trim().is_empty() {
            bail!("backend.url is not set (REDTUNE__BACKEND__URL)");
        }
        if self.backend.anon_key.trim().is_empty() {
            bail!("backend.anon_key is not set (REDTUNE__BACKEND__ANON_KEY)");
        }
        if self.player.command.trim().is_empty() {
            bail!("player.command must not be empty");
        }
        Ok(())
    }
}

/// Resolve the config path from `REDTUNE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("REDTUNE_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// `$XDG_CONFIG_HOME/redtune/config.toml`, or `~/.config/redtune/config.toml`
/// when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("redtune").join("config.toml"))
}
