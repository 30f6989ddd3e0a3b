//! Data types produced by the ranking policies.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row of a ranking. `score` semantics depend on the policy that
/// produced it: cumulative milliseconds played for the play-time
/// rankings, a summed position weight for the weighted-monthly ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedTrack {
    pub track_uri: String,
    pub track_name: String,
    pub artist_name: String,
    pub score: u64,
}

/// An ordered, deduplicated track ranking.
///
/// Invariants: each `track_uri` appears at most once (the one documented
/// exception is [`super::top_songs_across_top_artists`], a deliberate
/// concatenation), rows are in descending `score` order, and ties keep
/// first-occurrence order from the source event sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ranking {
    pub entries: Vec<RankedTrack>,
}

impl Ranking {
    pub fn new(entries: Vec<RankedTrack>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedTrack> {
        self.entries.iter()
    }

    /// The first `n` rows.
    pub fn top(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    /// The zero-indexed window `[lo, hi)`, i.e. 1-indexed ranks
    /// `lo+1 ..= hi`. Out-of-range bounds clamp; `window(50, 100)` on a
    /// ranking with 40 rows is empty.
    pub fn window(self, lo: usize, hi: usize) -> Self {
        let lo = lo.min(self.entries.len());
        let hi = hi.clamp(lo, self.entries.len());
        Self {
            entries: self.entries[lo..hi].to_vec(),
        }
    }

    /// Track URIs in rank order, ready for a playlist body.
    pub fn track_uris(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.track_uri.clone()).collect()
    }
}

/// Which metric orders an artist ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtistMetric {
    /// Total milliseconds played across all of the artist's tracks.
    ListeningTime,
    /// Number of distinct tracks played at least once.
    UniqueTracks,
}

/// Per-artist aggregate. Both metrics are always populated so a report
/// sorted by one can still show the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistStats {
    pub artist_name: String,
    pub total_ms_played: u64,
    pub unique_tracks: usize,
}

/// Canonical metadata for one track, taken from its first fully-played
/// event: that event's duration is the best available track length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueSong {
    pub track_uri: String,
    pub track_name: String,
    pub artist_name: String,
    pub length_ms: u64,
    pub first_completed: DateTime<Utc>,
}
