//! Ranking policies over a loaded listening history.
//!
//! Every function in this module is a pure, synchronous transformation of
//! an immutable `&[ListenEvent]` slice: grouping, folding, and stable
//! sorting, with ties always broken by first-occurrence order in the
//! source event sequence so that results are reproducible.

pub mod aggregate;
pub mod artists;
pub mod buckets;
pub mod types;
pub mod weighted;

pub use aggregate::{by_artist, top_per_bucket, total_play_time, unique_songs};
pub use artists::{top_artists, top_songs_across_top_artists};
pub use buckets::{Season, YearMonth, season_of, year_month_of, year_of};
pub use types::{ArtistMetric, ArtistStats, RankedTrack, Ranking, UniqueSong};
pub use weighted::weighted_monthly;
