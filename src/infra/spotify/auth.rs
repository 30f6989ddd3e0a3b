//! Token acquisition for the Spotify Web API.
//!
//! Two grants are supported: the machine-to-machine client-credentials
//! exchange, and the one-time interactive authorization-code flow whose
//! token response is persisted locally for later runs.

use anyhow::{Context, Result, anyhow, bail};
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::infra::spotify::callback;

pub const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";

/// Port the application's registered redirect URI points at.
const REDIRECT_PORT: u16 = 5027;

const SCOPES: &str =
    "user-read-private user-read-email playlist-modify-private playlist-modify-public";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

fn token_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

async fn post_token_request(form: &[(&str, &str)]) -> Result<String> {
    let response = token_client()?
        .post(format!("{ACCOUNTS_BASE_URL}/api/token"))
        .form(form)
        .send()
        .await
        .context("token request failed to send")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        bail!("token exchange failed with status {status}: {body}");
    }

    response.text().await.context("token response unreadable")
}

/// App-only token via the client-credentials grant. Enough for catalog
/// reads; it cannot modify a user's playlists.
pub async fn client_credentials_token(client_id: &str, client_secret: &str) -> Result<String> {
    let raw = post_token_request(&[
        ("grant_type", "client_credentials"),
        ("client_id", client_id),
        ("client_secret", client_secret),
    ])
    .await?;

    let token: TokenResponse = serde_json::from_str(&raw)?;
    Ok(token.access_token)
}

/// Reads the access token persisted by a previous [`login`] run.
pub fn load_saved_token(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path).with_context(|| {
        format!(
            "no saved token at '{}'; run the login command first",
            path.display()
        )
    })?;
    let json: Value = serde_json::from_str(&raw)?;

    json["access_token"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("token file '{}' has no access_token", path.display()))
}

/// One-time interactive authorization. Prints the authorization URL for
/// the user's browser, waits for the redirect on the local callback
/// listener, verifies the CSRF state, exchanges the code, and persists
/// the full token response to `token_path`.
pub async fn login(client_id: &str, client_secret: &str, token_path: &Path) -> Result<String> {
    let state: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    let redirect_uri = format!("http://localhost:{REDIRECT_PORT}/callback");

    let auth_url = reqwest::Url::parse_with_params(
        &format!("{ACCOUNTS_BASE_URL}/authorize"),
        &[
            ("response_type", "code"),
            ("client_id", client_id),
            ("scope", SCOPES),
            ("redirect_uri", redirect_uri.as_str()),
            ("state", state.as_str()),
        ],
    )?;

    println!("Open this URL in your browser to authorize:\n\n  {auth_url}\n");

    let authorization = callback::await_authorization(REDIRECT_PORT).await?;
    if authorization.state.as_deref() != Some(state.as_str()) {
        bail!("authorization state mismatch, aborting");
    }

    let raw = post_token_request(&[
        ("grant_type", "authorization_code"),
        ("code", authorization.code.as_str()),
        ("redirect_uri", redirect_uri.as_str()),
        ("client_id", client_id),
        ("client_secret", client_secret),
    ])
    .await?;

    std::fs::write(token_path, &raw)
        .with_context(|| format!("failed to save token to '{}'", token_path.display()))?;
    info!(path = %token_path.display(), "Token response saved");

    let token: TokenResponse = serde_json::from_str(&raw)?;
    Ok(token.access_token)
}

/// Persists a bare access token in the same shape [`load_saved_token`]
/// reads.
pub fn save_token(path: &Path, access_token: &str) -> Result<()> {
    let body = serde_json::json!({ "access_token": access_token });
    std::fs::write(path, serde_json::to_vec_pretty(&body)?)
        .with_context(|| format!("failed to save token to '{}'", path.display()))?;
    Ok(())
}
