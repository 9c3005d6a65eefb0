//! Obtain GitHub App installation access tokens.
//!
//! A [`Source`] either carries a pre-issued token, which is handed back as is,
//! or app credentials. With credentials, an RS256 app JWT is signed and traded
//! for an installation token in one or two calls against the GitHub REST API.

pub mod error;
pub mod github;
pub mod source;

pub use error::TokenError;
pub use github::installation::{generate_access_token, TokenIssuer};
pub use github::models::InstallationToken;
pub use source::{InstallationLookup, Source};
