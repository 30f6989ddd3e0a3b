//! Playlist assembly: turning rankings into named playlist requests.
//!
//! A [`PlaylistSpec`] is the complete description of one playlist to
//! create remotely. The builders here pair each ranking policy with the
//! playlist names and descriptions the published playlists carry.

use crate::history::ListenEvent;
use crate::rankings::{
    by_artist, season_of, top_per_bucket, top_songs_across_top_artists, total_play_time,
    weighted_monthly, year_of,
};
use serde::Serialize;

/// Everything the publisher needs for one playlist. A value transferred
/// once; track order is rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistSpec {
    pub name: String,
    pub description: String,
    pub track_uris: Vec<String>,
}

/// Projects a ranking into a spec. Dedup and ordering are already
/// guaranteed by the ranking invariants.
pub fn build_spec(
    ranking: &crate::rankings::Ranking,
    name: impl Into<String>,
    description: impl Into<String>,
) -> PlaylistSpec {
    PlaylistSpec {
        name: name.into(),
        description: description.into(),
        track_uris: ranking.track_uris(),
    }
}

/// The all-time top `size` playlist.
pub fn all_time_spec(events: &[ListenEvent], size: usize) -> PlaylistSpec {
    build_spec(
        &total_play_time(events).top(size),
        format!("My Top {size} All Time Songs"),
        format!("The top {size} songs I've listened to the most on Spotify."),
    )
}

/// Ranks `size+1 ..= 2*size` of the all-time ranking, the "second top"
/// playlist.
pub fn second_all_time_spec(events: &[ListenEvent], size: usize) -> PlaylistSpec {
    build_spec(
        &total_play_time(events).window(size, size * 2),
        format!("My Second Top {size} All Time Songs"),
        format!("The second top {size} songs I've listened to the most on Spotify."),
    )
}

/// One playlist per calendar year with events, each year's top
/// `per_year` tracks. Years come out ascending.
pub fn yearly_specs(events: &[ListenEvent], per_year: usize) -> Vec<PlaylistSpec> {
    top_per_bucket(events, year_of, per_year)
        .into_iter()
        .map(|(year, ranking)| {
            build_spec(
                &ranking,
                format!("My Top {year} Songs"),
                format!(
                    "The top {per_year} songs I've listened to the most in {year} on Spotify."
                ),
            )
        })
        .collect()
}

/// One playlist per season with events, each season's top `per_season`
/// tracks.
pub fn seasonal_specs(events: &[ListenEvent], per_season: usize) -> Vec<PlaylistSpec> {
    top_per_bucket(events, season_of, per_season)
        .into_iter()
        .map(|(season, ranking)| {
            build_spec(
                &ranking,
                format!("My Top {season} Songs"),
                format!(
                    "The top {per_season} songs I've listened to the most in {season} on Spotify."
                ),
            )
        })
        .collect()
}

/// The cross-month weighted playlist (see
/// [`crate::rankings::weighted_monthly`]).
pub fn monthly_spec(events: &[ListenEvent], per_month: usize, size: usize) -> PlaylistSpec {
    build_spec(
        &weighted_monthly(events, per_month, size),
        "My Top Monthly Songs",
        format!("The top {size} songs I've listened to the most each month on Spotify."),
    )
}

/// Top songs for each of the top listening-time artists, concatenated.
pub fn top_artists_spec(
    events: &[ListenEvent],
    artist_count: usize,
    songs_per_artist: usize,
) -> PlaylistSpec {
    build_spec(
        &top_songs_across_top_artists(events, artist_count, songs_per_artist),
        "My Top Songs by Top Artists",
        format!("The top {songs_per_artist} songs for each of my top artists on Spotify."),
    )
}

/// One artist's top `size` tracks.
pub fn artist_top_spec(events: &[ListenEvent], artist: &str, size: usize) -> PlaylistSpec {
    build_spec(
        &by_artist(events, artist, Some(size)),
        format!("My Favorite {artist} Songs"),
        format!("The top {size} songs I've listened to the most by {artist} on Spotify."),
    )
}

/// Every track by one artist, still ranked by play time.
pub fn artist_all_spec(events: &[ListenEvent], artist: &str) -> PlaylistSpec {
    build_spec(
        &by_artist(events, artist, None),
        format!("All Songs by {artist}"),
        format!("All songs by {artist} on Spotify that I've ever played."),
    )
}
