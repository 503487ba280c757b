use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use stash_entities::Identity;
use tracing::{debug, warn};
use url::Url;

use crate::{IdentitySession, LoginResult, SessionOptions};

const SESSION_FILE: &str = "session.toml";

/// The persisted shape of an established session.
///
/// The provider URL is stored alongside the token so validation and
/// revocation go back to the provider that issued the session.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct SessionRecord {
    token: String,
    principal: String,
    provider: Url,
}

#[derive(Serialize)]
struct LoginRequest {
    disable_idle_timeout: bool,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    principal: String,
}

/// HTTP session against a delegated identity provider.
///
/// The established session is persisted as TOML under the user's config
/// directory (`stash/session.toml` by default) so a later process start
/// can resume it without user interaction.
pub struct HttpIdentitySession {
    http: reqwest::Client,
    storage_path: PathBuf,
    disable_idle_timeout: bool,
    record: Option<SessionRecord>,
}

impl HttpIdentitySession {
    /// Create a session handle, resuming a persisted session if one is
    /// found on disk. An unreadable session file is discarded rather than
    /// treated as fatal.
    pub fn create(options: SessionOptions) -> Result<Self> {
        let dir = match options.storage_dir {
            Some(dir) => dir,
            None => default_storage_dir()?,
        };
        let storage_path = dir.join(SESSION_FILE);
        let record = load_record(&storage_path);

        Ok(Self {
            http: reqwest::Client::new(),
            storage_path,
            disable_idle_timeout: options.disable_idle_timeout,
            record,
        })
    }

    fn persist(&self, record: &SessionRecord) -> Result<()> {
        if let Some(dir) = self.storage_path.parent() {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create session directory: {}", dir.display())
            })?;
        }
        let content = toml::to_string_pretty(record)
            .with_context(|| "Failed to serialize session")?;
        fs::write(&self.storage_path, content).with_context(|| {
            format!(
                "Failed to write session file: {}",
                self.storage_path.display()
            )
        })?;
        Ok(())
    }

    fn discard(&mut self) {
        self.record = None;
        if self.storage_path.exists() {
            if let Err(e) = fs::remove_file(&self.storage_path) {
                warn!(
                    "Could not remove session file {}: {}",
                    self.storage_path.display(),
                    e
                );
            }
        }
    }
}

impl IdentitySession for HttpIdentitySession {
    async fn is_valid(&mut self) -> Result<bool> {
        let record = match &self.record {
            Some(record) => record.clone(),
            None => return Ok(false),
        };

        let response = self
            .http
            .get(session_endpoint(&record.provider)?)
            .bearer_auth(&record.token)
            .send()
            .await
            .context("Identity provider is unreachable")?;

        if response.status().is_success() {
            return Ok(true);
        }

        // An expired or revoked session is a normal outcome, not an error.
        debug!(
            "Persisted session rejected by provider: {}",
            response.status()
        );
        self.discard();
        Ok(false)
    }

    async fn login(&mut self, provider: &Url) -> LoginResult {
        let endpoint = match session_endpoint(provider) {
            Ok(endpoint) => endpoint,
            Err(e) => return LoginResult::Failure(e.to_string()),
        };

        let request = LoginRequest {
            disable_idle_timeout: self.disable_idle_timeout,
        };
        let response = self
            .http
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let response = match response {
            Ok(response) => response,
            Err(e) => return LoginResult::Failure(e.to_string()),
        };

        let login: LoginResponse = match response.json().await {
            Ok(login) => login,
            Err(e) => return LoginResult::Failure(e.to_string()),
        };

        let record = SessionRecord {
            token: login.token,
            principal: login.principal,
            provider: provider.clone(),
        };
        if let Err(e) = self.persist(&record) {
            // The session is established either way; losing persistence
            // only costs the next startup a fresh login.
            warn!("Could not persist session: {}", e);
        }

        let identity = Identity {
            principal: record.principal.clone(),
            credential: record.token.clone(),
        };
        self.record = Some(record);
        LoginResult::Success(identity)
    }

    async fn logout(&mut self) -> Result<()> {
        let record = match &self.record {
            Some(record) => record.clone(),
            None => return Ok(()),
        };

        self.http
            .delete(session_endpoint(&record.provider)?)
            .bearer_auth(&record.token)
            .send()
            .await
            .context("Identity provider is unreachable")?
            .error_for_status()
            .context("Provider refused to revoke the session")?;

        self.discard();
        Ok(())
    }

    fn identity(&self) -> Option<Identity> {
        self.record.as_ref().map(|record| Identity {
            principal: record.principal.clone(),
            credential: record.token.clone(),
        })
    }
}

fn session_endpoint(provider: &Url) -> Result<Url> {
    provider
        .join("api/v1/session")
        .map_err(|e| anyhow!("Invalid provider URL {}: {}", provider, e))
}

fn load_record(path: &Path) -> Option<SessionRecord> {
    if !path.exists() {
        return None;
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not read session file {}: {}", path.display(), e);
            return None;
        }
    };
    match toml::from_str(&content) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("Discarding corrupt session file {}: {}", path.display(), e);
            None
        }
    }
}

/// Returns the directory holding the persisted session, creating a path
/// under the user's platform-appropriate config directory.
fn default_storage_dir() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = env::var("APPDATA") {
            return Ok(PathBuf::from(appdata).join("stash"));
        }
        if let Ok(userprofile) = env::var("USERPROFILE") {
            return Ok(PathBuf::from(userprofile).join(".config").join("stash"));
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
        let config_dir = if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME")
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
