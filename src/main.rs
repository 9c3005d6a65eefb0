use std::env;
use std::process::ExitCode;
use std::time::Duration;

use github_app_token::source::timeout_from_env;
use github_app_token::{Source, TokenError, TokenIssuer};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the token.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(token) => {
            println!("{}", token);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<String, TokenError> {
    let source = match env::args().nth(1) {
        Some(path) => Source::from_file(path)?,
        None => Source::from_env()?,
    };

    let issuer = TokenIssuer::new().with_timeout(timeout_from_env(DEFAULT_TIMEOUT)?);
    issuer.generate_access_token(&source, chrono::Utc::now()).await
}
