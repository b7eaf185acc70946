use crate::config::PluginConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads plugin configuration by layering a TOML file and environment
    /// variables over the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<PluginConfig> {
        let config: PluginConfig = Figment::from(Serialized::defaults(PluginConfig::default()))
            .merge(Toml::file("config/Config.toml"))
            .merge(Env::prefixed("GE_ARB_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// Loads configuration with a profile-specific TOML overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(profile: &str) -> Result<PluginConfig> {
        let config: PluginConfig = Figment::from(Serialized::defaults(PluginConfig::default()))
            .merge(Toml::file("config/Config.toml"))
            .merge(Toml::file(format!("config/Config.{profile}.toml")))
            .merge(Env::prefixed("GE_ARB_").split("__"))
            .extract()?;

        Ok(config)
    }
}
