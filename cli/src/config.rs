use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use stash_client::Deployment;
use url::Url;

/// Fixed identity-provider URL for production deployments.
pub const PRODUCTION_IDENTITY_URL: &str = "https://identity.stash.network";
/// Port of the local development identity provider.
pub const DEFAULT_IDENTITY_PORT: u16 = 4943;
/// Remote service address for local deployments.
pub const DEFAULT_LOCAL_SERVICE_URL: &str = "http://127.0.0.1:4943";
/// Remote service address for production deployments.
pub const DEFAULT_PRODUCTION_SERVICE_URL: &str = "https://api.stash.network";

const CONFIG_FILE: &str = "config.toml";

/// Configuration for the CLI application.
///
/// Persisted to TOML under the user's config directory
/// (`stash/config.toml`). Every field is optional; deployment defaults
/// apply when a field is absent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Remote service address override.
    pub service_url: Option<Url>,
    /// Identity-provider URL override (takes precedence over deployment
    /// selection).
    pub identity_url: Option<Url>,
    /// Local identity-provider port override.
    pub identity_port: Option<u16>,
}

impl CliConfig {
    /// Returns the configuration directory path, creating a path under
    /// the user's platform-appropriate config directory.
    fn config_dir() -> Result<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            if let Ok(appdata) = env::var("APPDATA") {
                return Ok(PathBuf::from(appdata).join("stash"));
            }
            if let Ok(userprofile) = env::var("USERPROFILE") {
                return Ok(PathBuf::from(userprofile)
                    .join(".config")
                    .join("stash"));
            }
            return Err(anyhow!(
                "Unable to determine config directory (missing APPDATA/USERPROFILE)"
            ));
        }

        #[cfg(target_os = "macos")]
        {
            if let Ok(home) = env::var("HOME") {
                return Ok(PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("stash"));
            }
            return Err(anyhow!(
                "Unable to determine config directory (missing HOME)"
            ));
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let config_dir = if let Ok(xdg_config_home) =
                env::var("XDG_CONFIG_HOME")
            {
                PathBuf::from(xdg_config_home)
            } else if let Ok(home) = env::var("HOME") {
                PathBuf::from(home).join(".config")
            } else {
                return Err(anyhow!(
                    "Unable to determine config directory (missing XDG_CONFIG_HOME/HOME)"
                ));
            };
            Ok(config_dir.join("stash"))
        }
    }

    fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Loads the configuration from disk. A missing file yields the
    /// default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).with_context(|| {
            format!("Failed to read config file: {}", path.display())
        })?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")
    }

    /// Saves the configuration, creating the directory if needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).with_context(|| {
                    format!(
                        "Failed to create config directory: {}",
                        dir.display()
                    )
                })?;
            }
        }
        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config")?;
        fs::write(path, content).with_context(|| {
            format!("Failed to write config file: {}", path.display())
        })?;
        Ok(())
    }

    /// Updates and persists the remote service address.
    pub fn set_service_url(&mut self, url: Url) -> Result<()> {
        self.service_url = Some(url);
        self.save()
    }
}

/// Maps the `STASH_NETWORK` value onto a deployment. Only the literal
/// `production` selects production; anything else, including unset, is a
/// local deployment.
pub fn deployment_from(network: Option<&str>) -> Deployment {
    match network {
        Some("production") => Deployment::Production,
        _ => Deployment::Local,
    }
}

pub fn deployment_from_env() -> Deployment {
    deployment_from(env::var("STASH_NETWORK").ok().as_deref())
}

/// The identity-provider URL for this deployment: a configured override
/// wins, production uses the fixed provider, local composes a loopback
/// URL from the (possibly overridden) port.
pub fn identity_provider_url(
    deployment: Deployment,
    config: &CliConfig,
    port_override: Option<u16>,
) -> Result<Url> {
    if let Some(url) = &config.identity_url {
        return Ok(url.clone());
    }
    match deployment {
        Deployment::Production => Url::parse(PRODUCTION_IDENTITY_URL)
            .map_err(|e| anyhow!("Invalid production identity URL: {}", e)),
        Deployment::Local => {
            let port = port_override
                .or(config.identity_port)
                .unwrap_or(DEFAULT_IDENTITY_PORT);
            Url::parse(&format!("http://127.0.0.1:{}", port))
                .map_err(|e| anyhow!("Invalid identity port {}: {}", port, e))
        }
    }
}

pub fn identity_port_from_env() -> Option<u16> {
    env::var("STASH_IDENTITY_PORT")
        .ok()
        .and_then(|port| port.parse().ok())
}

/// The remote service address: a configured override wins, otherwise the
/// deployment default.
pub fn service_url(
    deployment: Deployment,
    config: &CliConfig,
) -> Result<Url> {
    if let Some(url) = &config.service_url {
        return Ok(url.clone());
    }
    let default = match deployment {
        Deployment::Production => DEFAULT_PRODUCTION_SERVICE_URL,
        Deployment::Local => DEFAULT_LOCAL_SERVICE_URL,
    };
    Url::parse(default)
        .map_err(|e| anyhow!("Invalid default service URL: {}", e))
}
