//! Engine configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use syncdns_client::AuthorityClient;
use syncdns_core::{Result, SyncError};

/// Environment variable holding the authority base URL
pub const URL_VAR: &str = "AdguardURL";

/// Environment variable holding the authority username
pub const USER_VAR: &str = "AdguardUser";

/// Environment variable holding the authority password
pub const PASSWORD_VAR: &str = "AdguardPassword";

/// Where ownership state lives unless told otherwise
pub const DEFAULT_STATE_PATH: &str = "/data/state.json";

/// Container label carrying rewrite declarations
pub const DEFAULT_LABEL: &str = "syncdns.rewrites";

/// Everything the engine needs to run.
#[derive(Clone)]
pub struct SyncConfig {
    /// Authority base URL (e.g. `http://adguard.lan:3000`).
    pub authority_url: String,

    /// Authority username.
    pub username: String,

    /// Authority password.
    pub password: String,

    /// Path of the ownership state file.
    pub state_path: PathBuf,

    /// Label key read from containers.
    pub label: String,

    /// Optional per-request timeout for authority calls.
    pub timeout: Option<Duration>,
}

impl SyncConfig {
    /// Assemble a config from the three required authority values.
    ///
    /// Missing and empty values are both rejected; the error names every
    /// variable that is absent so the operator can fix them in one go.
    pub fn new(
        authority_url: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());

        let missing: Vec<&str> = [
            (URL_VAR, present(&authority_url)),
            (USER_VAR, present(&username)),
            (PASSWORD_VAR, present(&password)),
        ]
        .into_iter()
        .filter_map(|(name, ok)| (!ok).then_some(name))
        .collect();

        match (authority_url, username, password) {
            (Some(authority_url), Some(username), Some(password)) if missing.is_empty() => {
                Ok(Self {
                    authority_url,
                    username,
                    password,
                    state_path: PathBuf::from(DEFAULT_STATE_PATH),
                    label: String::from(DEFAULT_LABEL),
                    timeout: None,
                })
            }
            _ => Err(SyncError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            ))),
        }
    }

    /// Override the state file location
    #[must_use]
    pub fn state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }

    /// Override the declaration label key
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Bound every authority call by `timeout`
    #[must_use]
    pub const fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the authority client described by this config
    pub fn authority_client(&self) -> Result<AuthorityClient> {
        let mut builder =
            AuthorityClient::builder(&self.authority_url, &self.username, &self.password);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("authority_url", &self.authority_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("state_path", &self.state_path)
            .field("label", &self.label)
            .field("timeout", &self.timeout)
            .finish()
    }
}
