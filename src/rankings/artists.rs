//! Artist-level aggregates and the cross-artist compilation.

use crate::history::ListenEvent;
use crate::rankings::aggregate::by_artist;
use crate::rankings::types::{ArtistMetric, ArtistStats, Ranking};
use std::collections::{HashMap, HashSet};

struct ArtistAcc {
    artist_name: String,
    total_ms_played: u64,
    tracks: HashSet<String>,
}

/// Ranks artists by the chosen metric, descending, keeping the top `n`.
/// Every row carries both metrics; ties keep the order in which the
/// artists first appeared in the event sequence.
pub fn top_artists(events: &[ListenEvent], metric: ArtistMetric, n: usize) -> Vec<ArtistStats> {
    let mut accs: Vec<ArtistAcc> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for event in events {
        let i = match index.get(&event.artist_name) {
            Some(&i) => i,
            None => {
                index.insert(event.artist_name.clone(), accs.len());
                accs.push(ArtistAcc {
                    artist_name: event.artist_name.clone(),
                    total_ms_played: 0,
                    tracks: HashSet::new(),
                });
                accs.len() - 1
            }
        };
        accs[i].total_ms_played += event.ms_played;
        accs[i].tracks.insert(event.track_uri.clone());
    }

    let mut stats: Vec<ArtistStats> = accs
        .into_iter()
        .map(|a| ArtistStats {
            artist_name: a.artist_name,
            total_ms_played: a.total_ms_played,
            unique_tracks: a.tracks.len(),
        })
        .collect();

    match metric {
        ArtistMetric::ListeningTime => {
            stats.sort_by(|a, b| b.total_ms_played.cmp(&a.total_ms_played))
        }
        ArtistMetric::UniqueTracks => stats.sort_by(|a, b| b.unique_tracks.cmp(&a.unique_tracks)),
    }
    stats.truncate(n);
    stats
}

/// The top `songs_per_artist` tracks for each of the `top_artist_count`
/// artists by listening time, concatenated in artist rank order.
///
/// Deliberately not re-ranked or deduplicated across artists: the result
/// is a sequence of independent per-artist top lists, each row still
/// tagged with its artist.
pub fn top_songs_across_top_artists(
    events: &[ListenEvent],
    top_artist_count: usize,
    songs_per_artist: usize,
) -> Ranking {
    let leaders = top_artists(events, ArtistMetric::ListeningTime, top_artist_count);

    let mut entries = Vec::new();
    for artist in &leaders {
        entries.extend(by_artist(events, &artist.artist_name, Some(songs_per_artist)).entries);
    }
    Ranking::new(entries)
}
