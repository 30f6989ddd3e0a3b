//! Trait and errors for the playlist publishing collaborator.

use playlist_forge::playlist::PlaylistSpec;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors surfaced by a publisher. The run never retries; callers log and
/// move on to the next playlist.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The credential was rejected (expired or missing scopes).
    #[error("authentication rejected ({status}): {body}")]
    Auth { status: u16, body: String },
    /// Any other non-success response from the remote service.
    #[error("remote service error ({status}): {body}")]
    Remote { status: u16, body: String },
    /// The request could not be built or the response had an unexpected
    /// shape.
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A remote service that can own playlists. Exactly two operations; track
/// batching limits are the implementation's concern.
#[async_trait::async_trait]
pub trait PlaylistPublisher: Send + Sync {
    /// Creates an empty playlist and returns its remote id.
    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
    ) -> Result<String, PublishError>;

    /// Adds tracks in ranking order, returning how many were accepted.
    async fn add_tracks(
        &self,
        playlist_id: &str,
        track_uris: &[String],
    ) -> Result<usize, PublishError>;
}

/// Publishes each spec independently: a failure is logged and the next
/// spec still goes out. Specs with no tracks are skipped with a warning.
/// Returns the number of playlists actually created.
pub async fn publish_all<P: PlaylistPublisher>(publisher: &P, specs: &[PlaylistSpec]) -> usize {
    let mut published = 0;

    for spec in specs {
        if spec.track_uris.is_empty() {
            warn!(name = %spec.name, "No tracks matched; skipping playlist");
            continue;
        }

        match publish_one(publisher, spec).await {
            Ok(added) => {
                info!(name = %spec.name, tracks = added, "Playlist published");
                published += 1;
            }
            Err(e) => error!(name = %spec.name, error = %e, "Failed to publish playlist"),
        }
    }

    published
}

async fn publish_one<P: PlaylistPublisher>(
    publisher: &P,
    spec: &PlaylistSpec,
) -> Result<usize, PublishError> {
    let playlist_id = publisher.create_playlist(&spec.name, &spec.description).await?;
    publisher.add_tracks(&playlist_id, &spec.track_uris).await
}
