use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::TokenError;
use crate::github::jwt::{create_jwt, encoding_key};
use crate::github::models::{InstallationResponse, InstallationToken, TokenResponse};
use crate::source::{InstallationLookup, Source};

pub const ACCEPT: &str = "application/vnd.github.machine-man-preview+json";
pub const USER_AGENT: &str = "github-app-token";

/// Exchanges GitHub App credentials for installation access tokens.
///
/// Holds a reusable HTTP client so repeated calls share a connection pool.
/// Every call signs a fresh JWT and performs the exchange again; nothing is
/// cached between calls.
#[derive(Debug, Clone, Default)]
pub struct TokenIssuer {
    client: Client,
    timeout: Option<Duration>,
}

impl TokenIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        TokenIssuer {
            client,
            timeout: None,
        }
    }

    /// Bounds both HTTP round trips of an exchange together.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the configured static token, or issues a new installation
    /// token using the app credentials in `source`.
    pub async fn generate_access_token(
        &self,
        source: &Source,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if let Some(token) = source.static_token() {
            debug!("using configured access token");
            return Ok(token.to_string());
        }

        Ok(self.issue_installation_token(source, now).await?.token)
    }

    #[tracing::instrument(
        skip_all,
        fields(app_id = %source.app_id, repository = %source.repository)
    )]
    pub async fn issue_installation_token(
        &self,
        source: &Source,
        now: DateTime<Utc>,
    ) -> Result<InstallationToken, TokenError> {
        source.validate_app()?;
        let key = encoding_key(&source.private_key)?;
        let jwt = create_jwt(&source.app_id, &key, now)?;

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.exchange(source, &jwt))
                .await
                .map_err(|_| TokenError::Timeout(limit))?,
            None => self.exchange(source, &jwt).await,
        }
    }

    async fn exchange(&self, source: &Source, jwt: &str) -> Result<InstallationToken, TokenError> {
        let base = source.api_base();

        let installation_id = match source.installation_lookup() {
            InstallationLookup::Known(id) => id,
            InstallationLookup::ByRepository(repo) => {
                let url = format!("{}/repos/{}/installation", base, repo);
                let ir: InstallationResponse = self.call_api(Method::GET, &url, jwt).await?;
                debug!(installation_id = ir.id, "resolved installation");
                ir.id
            }
        };

        let url = format!("{}/app/installations/{}/access_tokens", base, installation_id);
        let tr: TokenResponse = self.call_api(Method::POST, &url, jwt).await?;

        info!(installation_id, expires_at = ?tr.expires_at, "issued installation token");

        Ok(InstallationToken {
            token: tr.token,
            expires_at: tr.expires_at,
            installation_id,
        })
    }

    async fn call_api<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        jwt: &str,
    ) -> Result<T, TokenError> {
        let transport = |source| TokenError::Transport {
            url: url.to_string(),
            source,
        };

        let res = self
            .client
            .request(method, url)
            .bearer_auth(jwt)
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(transport)?;

        let status = res.status();
        let body = res.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(TokenError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| TokenError::Decode {
            url: url.to_string(),
            status: status.as_u16(),
            body,
            source,
        })
    }
}

/// One-shot form of [`TokenIssuer::generate_access_token`] with a default
/// client and no deadline.
pub async fn generate_access_token(source: &Source, now: DateTime<Utc>) -> Result<String, TokenError> {
    TokenIssuer::new().generate_access_token(source, now).await
}
