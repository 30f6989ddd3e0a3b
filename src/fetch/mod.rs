//! HTTP transport behind a small trait, so API clients can be exercised
//! in tests with a canned transport.

mod basic;
mod bearer;

pub use basic::BasicClient;
pub use bearer::Bearer;

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response>;
}

/// GETs `url` and returns the response body, failing on non-2xx status.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}
