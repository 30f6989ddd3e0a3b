//! Grouping and play-time ranking policies.
//!
//! The original tool expressed these as dataframe groupby/sum/sort
//! chains; here each one is an explicit pipeline: accumulate per key in
//! first-occurrence order, fold the play-time sums, then stable-sort
//! descending by score so that ties keep their accumulation order.

use crate::history::{EndReason, ListenEvent};
use crate::rankings::types::{RankedTrack, Ranking, UniqueSong};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Sums `ms_played` per track over `events`, returning one row per track
/// in order of the track's first appearance. Display metadata comes from
/// the first event seen for the track.
fn sum_by_track<'a, I>(events: I) -> Vec<RankedTrack>
where
    I: IntoIterator<Item = &'a ListenEvent>,
{
    let mut rows: Vec<RankedTrack> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for event in events {
        match index.get(&event.track_uri) {
            Some(&i) => rows[i].score += event.ms_played,
            None => {
                index.insert(event.track_uri.clone(), rows.len());
                rows.push(RankedTrack {
                    track_uri: event.track_uri.clone(),
                    track_name: event.track_name.clone(),
                    artist_name: event.artist_name.clone(),
                    score: event.ms_played,
                });
            }
        }
    }

    rows
}

/// Stable descending sort by score. Rows must arrive in first-occurrence
/// order for the tie-break contract to hold.
pub(crate) fn rank_desc(mut rows: Vec<RankedTrack>) -> Ranking {
    rows.sort_by(|a, b| b.score.cmp(&a.score));
    Ranking::new(rows)
}

/// Ranks every track by total milliseconds played, descending.
///
/// Play time beats occurrence count as a preference signal: a track
/// played to the end outweighs one started and skipped repeatedly.
pub fn total_play_time(events: &[ListenEvent]) -> Ranking {
    rank_desc(sum_by_track(events))
}

/// Ranks tracks by one artist (exact, case-sensitive name match).
/// `limit` of `None` keeps every track. An artist with no events yields
/// an empty ranking, not an error.
pub fn by_artist(events: &[ListenEvent], artist: &str, limit: Option<usize>) -> Ranking {
    let ranking = rank_desc(sum_by_track(
        events.iter().filter(|e| e.artist_name == artist),
    ));
    match limit {
        Some(n) => ranking.top(n),
        None => ranking,
    }
}

/// Buckets events with `key_fn`, then ranks each bucket independently and
/// keeps its top `n`. Buckets with no events are simply absent from the
/// result.
pub fn top_per_bucket<K, F>(
    events: &[ListenEvent],
    key_fn: F,
    n: usize,
) -> BTreeMap<K, Ranking>
where
    K: Ord + Copy,
    F: Fn(&ListenEvent) -> K,
{
    let mut buckets: BTreeMap<K, Vec<&ListenEvent>> = BTreeMap::new();
    for event in events {
        buckets.entry(key_fn(event)).or_default().push(event);
    }

    buckets
        .into_iter()
        .map(|(key, bucket)| (key, rank_desc(sum_by_track(bucket)).top(n)))
        .collect()
}

/// One entry per distinct track, described by its first fully-played
/// event (`trackdone`): that event's `ms_played` is the track length and
/// its timestamp the first completion. Tracks never played to the end are
/// omitted. Output order is first-completion order.
pub fn unique_songs(events: &[ListenEvent]) -> Vec<UniqueSong> {
    let mut songs: Vec<UniqueSong> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for event in events {
        if event.end_reason != EndReason::Finished {
            continue;
        }
        if !seen.insert(event.track_uri.as_str()) {
            continue;
        }
        songs.push(UniqueSong {
            track_uri: event.track_uri.clone(),
            track_name: event.track_name.clone(),
            artist_name: event.artist_name.clone(),
            length_ms: event.ms_played,
            first_completed: event.ts,
        });
    }

    songs
}
