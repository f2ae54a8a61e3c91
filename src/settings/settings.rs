use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub user: User,
    pub database: Option<Database>,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    // TLS is enabled only when both paths are set.
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub backend: String, // "fake" or "real"
    #[serde(default)]
    pub detailed_not_found: bool,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Http {
    pub fn tls_paths(&self) -> Result<Option<(&str, &str)>> {
        match (self.cert_path.as_deref(), self.key_path.as_deref()) {
            (Some(cert), Some(key)) => Ok(Some((cert, key))),
            (None, None) => Ok(None),
            _ => Err(anyhow!("http.cert_path and http.key_path must be set together")),
        }
    }

    /// Like [`Http::tls_paths`], but also requires both paths to be regular
    /// files.
    pub fn checked_tls_paths(&self) -> Result<Option<(&str, &str)>> {
        let Some((cert_path, key_path)) = self.tls_paths()? else {
            return Ok(None);
        };
        for (what, path) in [("cert", cert_path), ("key", key_path)] {
            let metadata =
                fs::metadata(path).with_context(|| format!("reading TLS {what} {path}"))?;
            if !metadata.is_file() {
                return Err(anyhow!("TLS {what} is not a regular file: {path:?}"));
            }
        }
        Ok(Some((cert_path, key_path)))
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub const ENV_PREFIX: &str = "USER_API";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    load(path.unwrap_or(SETTINGS_PATH), env_overlay())
}

fn env_overlay() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn load(path: &str, env: Environment) -> Result<Settings> {
    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(env)
        .build()
        .with_context(|| format!("loading settings from {path}"))?
        .try_deserialize()
        .context("invalid settings")?;

    Ok(settings)
}
