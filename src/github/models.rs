use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `GET /repos/{owner}/{repo}/installation`. Only the id is needed.
#[derive(Deserialize, Debug)]
pub struct InstallationResponse {
    pub id: u64,
}

/// Body of `POST /app/installations/{id}/access_tokens`.
#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct Claims {
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

/// Result of a fresh installation token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub installation_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installation_response_ignores_extra_fields() {
        let body = r#"{
            "id": 9912873,
            "account": { "login": "github", "id": 1 },
            "repository_selection": "all",
            "app_id": 1,
            "single_file_name": null
        }"#;
        let ir: InstallationResponse = serde_json::from_str(body).unwrap();
        assert_eq!(ir.id, 9912873);
    }

    #[test]
    fn token_response_reads_expiry() {
        let body = r#"{
            "token": "v1.b71be873ad96e64a84025ae7bee7694a99cb4ba9",
            "expires_at": "2020-06-21T00:03:29Z",
            "permissions": { "checks": "write" },
            "repository_selection": "selected"
        }"#;
        let tr: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(tr.token, "v1.b71be873ad96e64a84025ae7bee7694a99cb4ba9");
        assert_eq!(
            tr.expires_at.map(|t| t.timestamp()),
            Some(1592697809)
        );
    }

    #[test]
    fn token_response_requires_token() {
        let err = serde_json::from_str::<TokenResponse>(r#"{"expires_at": null}"#).unwrap_err();
        assert!(err.to_string().contains("token"));
    }
}
