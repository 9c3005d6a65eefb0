use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::TokenError;

pub const DEFAULT_V3_ENDPOINT: &str = "https://api.github.com";

/// Where a token comes from: either a pre-issued token or GitHub App
/// credentials for the installation covering `repository`.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Source {
    pub repository: String,
    pub access_token: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub app_id: String,
    pub private_key: String,
    pub installation_id: Option<u64>,
    pub v3_endpoint: Option<String>,
}

/// How the installation id gets resolved before the token exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationLookup<'a> {
    Known(u64),
    ByRepository(&'a str),
}

impl Source {
    /// Builds a source from `GITHUB_*` variables, honouring a `.env` file.
    /// The key may be given inline or through `GITHUB_PRIVATE_KEY_PATH`.
    pub fn from_env() -> Result<Self, TokenError> {
        dotenvy::dotenv().ok();

        let private_key = match non_empty_var("GITHUB_PRIVATE_KEY") {
            Some(key) => key,
            None => match non_empty_var("GITHUB_PRIVATE_KEY_PATH") {
                Some(path) => std::fs::read_to_string(&path).map_err(|e| {
                    TokenError::configuration(format!("reading private key {}: {}", path, e))
                })?,
                None => String::new(),
            },
        };

        let installation_id = non_empty_var("GITHUB_INSTALLATION_ID")
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| {
                    TokenError::configuration(format!("GITHUB_INSTALLATION_ID {:?}: {}", raw, e))
                })
            })
            .transpose()?;

        Ok(Source {
            repository: non_empty_var("GITHUB_REPOSITORY").unwrap_or_default(),
            access_token: non_empty_var("GITHUB_ACCESS_TOKEN"),
            app_id: non_empty_var("GITHUB_APP_ID").unwrap_or_default(),
            private_key,
            installation_id,
            v3_endpoint: non_empty_var("GITHUB_V3_ENDPOINT"),
        })
    }

    /// Reads a YAML (or JSON) source document.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TokenError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TokenError::configuration(format!("reading {}: {}", path.display(), e))
        })?;
        serde_yaml::from_str(&raw)
            .map_err(|e| TokenError::configuration(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml(raw: &str) -> Result<Self, TokenError> {
        serde_yaml::from_str(raw).map_err(|e| TokenError::configuration(e.to_string()))
    }

    pub fn static_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// API base without trailing slashes.
    pub fn api_base(&self) -> &str {
        match self.v3_endpoint.as_deref() {
            Some(endpoint) if !endpoint.is_empty() => endpoint.trim_end_matches('/'),
            _ => DEFAULT_V3_ENDPOINT,
        }
    }

    pub fn installation_lookup(&self) -> InstallationLookup<'_> {
        match self.installation_id {
            Some(id) => InstallationLookup::Known(id),
            None => InstallationLookup::ByRepository(&self.repository),
        }
    }

    /// Checks the fields an app token exchange needs. The key itself is
    /// validated when it is parsed.
    pub fn validate_app(&self) -> Result<(), TokenError> {
        if self.app_id.trim().is_empty() {
            return Err(TokenError::configuration("app_id is required"));
        }
        if let InstallationLookup::ByRepository(repo) = self.installation_lookup() {
            let well_formed = repo
                .split_once('/')
                .is_some_and(|(o, n)| !o.is_empty() && !n.is_empty() && !n.contains('/'));
            if !well_formed {
                return Err(TokenError::configuration(format!(
                    "repository must be owner/name, got {:?}",
                    repo
                )));
            }
        }
        Ok(())
    }
}

/// Deadline for a whole exchange, from `GITHUB_TOKEN_TIMEOUT_SECS` in seconds.
pub fn timeout_from_env(default: Duration) -> Result<Duration, TokenError> {
    match non_empty_var("GITHUB_TOKEN_TIMEOUT_SECS") {
        Some(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|e| {
            TokenError::configuration(format!("GITHUB_TOKEN_TIMEOUT_SECS {:?}: {}", raw, e))
        }),
        None => Ok(default),
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("repository", &self.repository)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("app_id", &self.app_id)
            .field("private_key", &"<redacted>")
            .field("installation_id", &self.installation_id)
            .field("v3_endpoint", &self.v3_endpoint)
            .finish()
    }
}

/// App ids are numeric on GitHub; accept `app_id: 69592` as well as a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}
