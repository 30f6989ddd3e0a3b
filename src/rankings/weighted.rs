//! Cross-month weighted ranking.
//!
//! Rewards tracks that place highly month after month over tracks that
//! spike once: each month's top tracks earn a positional weight, and
//! weights accumulate across months before the final sort.

use crate::history::ListenEvent;
use crate::rankings::aggregate::{rank_desc, top_per_bucket};
use crate::rankings::buckets::year_month_of;
use crate::rankings::types::{RankedTrack, Ranking};
use std::collections::{HashMap, HashSet};

/// For every month, takes the `top_per_month` tracks by play time and
/// assigns each a weight of `top_per_month - rank + 1` (rank 1 earns
/// `top_per_month`, the last rank earns 1). Ranks are dense: tracks tied
/// on play time share a rank and therefore a weight, so later weights in
/// that month shift up and the bottom of the scale can go unawarded - a
/// month never redistributes unclaimed weight.
///
/// A track's weights sum across every month it charted in; months it
/// missed contribute nothing. The result is the `result_size` heaviest
/// tracks, descending, ties broken by first-occurrence order in the
/// source events.
pub fn weighted_monthly(
    events: &[ListenEvent],
    top_per_month: usize,
    result_size: usize,
) -> Ranking {
    let monthly = top_per_bucket(events, year_month_of, top_per_month);

    let mut weights: HashMap<&str, u64> = HashMap::new();
    for ranking in monthly.values() {
        let mut rank = 0usize;
        let mut prev_score = None;
        for entry in ranking.iter() {
            if prev_score != Some(entry.score) {
                rank += 1;
                prev_score = Some(entry.score);
            }
            *weights.entry(entry.track_uri.as_str()).or_default() +=
                (top_per_month - rank + 1) as u64;
        }
    }

    // Re-walk the source events so tied weights fall back to
    // first-occurrence order, not month order.
    let mut rows: Vec<RankedTrack> = Vec::new();
    let mut emitted: HashSet<&str> = HashSet::new();
    for event in events {
        let Some(&weight) = weights.get(event.track_uri.as_str()) else {
            continue;
        };
        if !emitted.insert(event.track_uri.as_str()) {
            continue;
        }
        rows.push(RankedTrack {
            track_uri: event.track_uri.clone(),
            track_name: event.track_name.clone(),
            artist_name: event.artist_name.clone(),
            score: weight,
        });
    }

    rank_desc(rows).top(result_size)
}
