//! Local exports: CSV for rankings, JSON for reports and track metadata.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::rankings::types::{Ranking, UniqueSong};
use csv::WriterBuilder;

/// Writes a ranking to `path` as CSV, one row per track with a header
/// line. An existing file is replaced.
pub fn write_ranking_csv(path: &str, ranking: &Ranking) -> Result<()> {
    debug!(path, rows = ranking.len(), "Writing ranking CSV");

    let mut writer = WriterBuilder::new().from_path(path)?;
    for entry in ranking.iter() {
        writer.serialize(entry)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes per-track metadata as a pretty-printed JSON array.
pub fn write_unique_songs_json(path: &str, songs: &[UniqueSong]) -> Result<()> {
    debug!(path, rows = songs.len(), "Writing unique-songs JSON");
    std::fs::write(path, serde_json::to_vec_pretty(songs)?)?;
    Ok(())
}

/// Prints rows as a JSON records array on stdout, for piping into other
/// tools.
pub fn print_json_records<T: Serialize>(rows: &[T]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rankings::types::RankedTrack;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample_ranking() -> Ranking {
        Ranking::new(vec![
            RankedTrack {
                track_uri: "spotify:track:a".into(),
                track_name: "A".into(),
                artist_name: "X".into(),
                score: 400000,
            },
            RankedTrack {
                track_uri: "spotify:track:b".into(),
                track_name: "B".into(),
                artist_name: "X".into(),
                score: 200000,
            },
        ])
    }

    #[test]
    fn test_write_ranking_csv_header_and_rows() {
        let path = temp_path("playlist_forge_test_ranking.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        write_ranking_csv(&path, &sample_ranking()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("track_uri"));
        assert!(lines[1].starts_with("spotify:track:a"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_ranking_csv_replaces_existing() {
        let path = temp_path("playlist_forge_test_replace.csv");
        let _ = fs::remove_file(&path);

        write_ranking_csv(&path, &sample_ranking()).unwrap();
        write_ranking_csv(&path, &sample_ranking()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // Rewritten, not appended: still one header and two rows.
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_unique_songs_json_round_trip() {
        let path = temp_path("playlist_forge_test_unique.json");
        let _ = fs::remove_file(&path);

        let songs = vec![UniqueSong {
            track_uri: "spotify:track:a".into(),
            track_name: "A".into(),
            artist_name: "X".into(),
            length_ms: 180000,
            first_completed: chrono::DateTime::from_timestamp(1704448800, 0).unwrap(),
        }];
        write_unique_songs_json(&path, &songs).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(parsed[0]["track_uri"], "spotify:track:a");
        assert_eq!(parsed[0]["length_ms"], 180000);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_print_json_records_does_not_panic() {
        print_json_records(&sample_ranking().entries).unwrap();
    }
}
