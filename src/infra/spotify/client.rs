//! The Spotify implementation of the publishing trait.

use crate::services::publisher::{PlaylistPublisher, PublishError};
use playlist_forge::fetch::{BasicClient, Bearer, HttpClient};
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde_json::{Value, json};
use tracing::{debug, error, info};

pub const API_BASE_URL: &str = "https://api.spotify.com";

/// The remote service rejects track-insertion bodies with more than 100
/// URIs.
const TRACKS_PER_REQUEST: usize = 100;

/// A connected client, bound to the account that owns the bearer token.
pub struct SpotifyClient<C = Bearer<BasicClient>> {
    http: C,
    base_url: String,
    user_id: String,
}

impl SpotifyClient {
    /// Connects with a user bearer token, resolving the account id that
    /// will own created playlists.
    pub async fn connect(token: &str) -> anyhow::Result<Self> {
        let http = Bearer::new(BasicClient::with_timeouts()?, token)?;
        Ok(Self::with_transport(http, API_BASE_URL.to_string()).await?)
    }
}

impl<C: HttpClient> SpotifyClient<C> {
    /// Connects over an arbitrary transport; `base_url` has no trailing
    /// slash.
    pub async fn with_transport(http: C, base_url: String) -> Result<Self, PublishError> {
        let me = send_json(&http, Method::GET, &format!("{base_url}/v1/me"), None).await?;
        let user_id = me["id"]
            .as_str()
            .ok_or_else(|| PublishError::Protocol("user profile response has no 'id'".into()))?
            .to_string();

        info!(user_id = %user_id, "Authenticated with Spotify");

        Ok(Self {
            http,
            base_url,
            user_id,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Sends one JSON request and decodes the JSON response body. 401/403 map
/// to [`PublishError::Auth`], other non-success statuses to
/// [`PublishError::Remote`].
async fn send_json<C: HttpClient>(
    http: &C,
    method: Method,
    url: &str,
    body: Option<&Value>,
) -> Result<Value, PublishError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| PublishError::Protocol(format!("invalid URL '{url}': {e}")))?;
    let mut req = reqwest::Request::new(method, parsed);

    if let Some(body) = body {
        req.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *req.body_mut() = Some(
            serde_json::to_vec(body)
                .map_err(|e| PublishError::Protocol(format!("unencodable body: {e}")))?
                .into(),
        );
    }

    let resp = http.execute(req).await?;
    let status = resp.status();

    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(PublishError::Auth {
            status: status.as_u16(),
            body: resp.text().await.unwrap_or_default(),
        });
    }
    if !status.is_success() {
        return Err(PublishError::Remote {
            status: status.as_u16(),
            body: resp.text().await.unwrap_or_default(),
        });
    }

    Ok(resp.json().await?)
}

#[async_trait::async_trait]
impl<C: HttpClient> PlaylistPublisher for SpotifyClient<C> {
    /// Creates a private playlist and returns its id.
    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
    ) -> Result<String, PublishError> {
        let url = format!("{}/v1/users/{}/playlists", self.base_url, self.user_id);
        let body = json!({
            "name": name,
            "description": description,
            "public": false,
        });

        let resp = send_json(&self.http, Method::POST, &url, Some(&body)).await?;
        resp["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PublishError::Protocol("playlist creation response has no 'id'".into()))
    }

    /// Adds tracks in batches of 100. A failed batch is logged and the
    /// remaining batches still go out; the call errors only when every
    /// batch failed.
    async fn add_tracks(
        &self,
        playlist_id: &str,
        track_uris: &[String],
    ) -> Result<usize, PublishError> {
        let url = format!("{}/v1/playlists/{playlist_id}/tracks", self.base_url);

        let mut added = 0;
        let mut batches = 0;
        let mut failures = 0;
        let mut last_error = None;

        for (index, batch) in track_uris.chunks(TRACKS_PER_REQUEST).enumerate() {
            batches += 1;
            let body = json!({ "uris": batch });

            match send_json(&self.http, Method::POST, &url, Some(&body)).await {
                Ok(_) => {
                    debug!(batch = index, tracks = batch.len(), "Track batch added");
                    added += batch.len();
                }
                Err(e) => {
                    error!(batch = index, error = %e, "Failed to add track batch");
                    failures += 1;
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if failures == batches => Err(e),
            _ => Ok(added),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned transport: answers by URL path, with per-request status
    /// overrides to simulate failures.
    struct MockHttp {
        requests: Mutex<Vec<(String, Option<Value>)>>,
        fail_with: HashMap<usize, u16>,
    }

    impl MockHttp {
        fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail_with: HashMap::new(),
            }
        }

        fn failing(fail_with: impl IntoIterator<Item = (usize, u16)>) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail_with: fail_with.into_iter().collect(),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn body_of(&self, index: usize) -> Value {
            self.requests.lock().unwrap()[index].1.clone().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl HttpClient for MockHttp {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            let path = req.url().path().to_string();
            let body = req
                .body()
                .and_then(|b| b.as_bytes())
                .and_then(|b| serde_json::from_slice(b).ok());

            let index = {
                let mut requests = self.requests.lock().unwrap();
                requests.push((path.clone(), body));
                requests.len() - 1
            };

            let (status, payload) = match self.fail_with.get(&index) {
                Some(&status) => (status, r#"{"error":"injected"}"#),
                None if path.ends_with("/me") => (200, r#"{"id":"user1"}"#),
                None if path.ends_with("/tracks") => (201, r#"{"snapshot_id":"snap"}"#),
                None => (201, r#"{"id":"pl1"}"#),
            };

            let resp = http::Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(payload.to_string())
                .unwrap();
            Ok(reqwest::Response::from(resp))
        }
    }

    async fn connected(http: MockHttp) -> SpotifyClient<MockHttp> {
        SpotifyClient::with_transport(http, "https://spotify.test".to_string())
            .await
            .unwrap()
    }

    fn uris(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("spotify:track:t{i}")).collect()
    }

    #[tokio::test]
    async fn test_connect_resolves_user_id() {
        let client = connected(MockHttp::new()).await;
        assert_eq!(client.user_id(), "user1");
    }

    #[tokio::test]
    async fn test_create_playlist_is_private() {
        let client = connected(MockHttp::new()).await;
        let id = client.create_playlist("My Playlist", "desc").await.unwrap();
        assert_eq!(id, "pl1");

        // Request 0 is /me; request 1 the creation.
        let body = client.http.body_of(1);
        assert_eq!(body["name"], "My Playlist");
        assert_eq!(body["public"], false);
    }

    #[tokio::test]
    async fn test_add_tracks_batches_by_100() {
        let client = connected(MockHttp::new()).await;
        let added = client.add_tracks("pl1", &uris(250)).await.unwrap();
        assert_eq!(added, 250);

        // /me plus three batches.
        assert_eq!(client.http.request_count(), 4);
        assert_eq!(client.http.body_of(1)["uris"].as_array().unwrap().len(), 100);
        assert_eq!(client.http.body_of(2)["uris"].as_array().unwrap().len(), 100);
        assert_eq!(client.http.body_of(3)["uris"].as_array().unwrap().len(), 50);
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_abort_remaining() {
        // Request 2 is the second of three batches.
        let client = connected(MockHttp::failing([(2, 500)])).await;
        let added = client.add_tracks("pl1", &uris(250)).await.unwrap();

        assert_eq!(added, 150);
        assert_eq!(client.http.request_count(), 4);
    }

    #[tokio::test]
    async fn test_all_batches_failing_is_an_error() {
        let client = connected(MockHttp::failing([(1, 500), (2, 500)])).await;
        let err = client.add_tracks("pl1", &uris(150)).await.unwrap_err();
        assert!(matches!(err, PublishError::Remote { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_expired_credential_maps_to_auth_error() {
        let client = connected(MockHttp::failing([(1, 401)])).await;
        let err = client.create_playlist("x", "y").await.unwrap_err();
        assert!(matches!(err, PublishError::Auth { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_empty_track_list_sends_nothing() {
        let client = connected(MockHttp::new()).await;
        let added = client.add_tracks("pl1", &[]).await.unwrap();
        assert_eq!(added, 0);
        assert_eq!(client.http.request_count(), 1); // just /me
    }
}
