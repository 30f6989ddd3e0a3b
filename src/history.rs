//! Loader for Spotify extended-streaming-history exports.
//!
//! Accepts either a single JSON array of records or newline-delimited JSON,
//! normalizes the export's column names into [`ListenEvent`] values, and
//! converts every timestamp to UTC once, at load time. A load is atomic:
//! any unreadable record fails the whole file with a [`LoadError`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Why playback of a track ended, normalized from the export's
/// `reason_end` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// `trackdone` - the track played to its natural end.
    Finished,
    /// `fwdbtn` - the listener skipped ahead.
    Skipped,
    /// Anything else (`backbtn`, `endplay`, `logout`, ...).
    Other,
}

impl EndReason {
    fn from_export(raw: &str) -> Self {
        match raw {
            "trackdone" => EndReason::Finished,
            "fwdbtn" => EndReason::Skipped,
            _ => EndReason::Other,
        }
    }
}

/// One logged playback occurrence. Immutable once loaded; the full ordered
/// sequence (source order, which exports keep chronological) is the sole
/// input to every ranking policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenEvent {
    /// Opaque stable track identifier (`spotify_track_uri`).
    pub track_uri: String,
    pub track_name: String,
    pub artist_name: String,
    /// Milliseconds actually played, never negative.
    pub ms_played: u64,
    /// Playback instant, normalized to UTC at load time.
    pub ts: DateTime<Utc>,
    pub end_reason: EndReason,
}

/// Fatal errors while reading a history export. Any of these aborts the
/// run before aggregation starts; there is no partial load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read history file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("history export is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("record {index}: missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },
    #[error("record {index}: unparseable timestamp '{value}'")]
    BadTimestamp { index: usize, value: String },
}

/// A raw export row. All fields optional so that presence can be checked
/// per record with a useful index in the error.
#[derive(Debug, Deserialize)]
struct RawRecord {
    ts: Option<RawTimestamp>,
    ms_played: Option<u64>,
    master_metadata_track_name: Option<String>,
    master_metadata_album_artist_name: Option<String>,
    spotify_track_uri: Option<String>,
    reason_end: Option<String>,
}

/// Exports carry timestamps as RFC 3339 strings; accept integer epoch
/// seconds too, as some trimmed-down exports use them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Epoch(i64),
    Text(String),
}

impl RawRecord {
    fn into_event(self, index: usize) -> Result<ListenEvent, LoadError> {
        let missing = |field| LoadError::MissingField { index, field };

        let ts = match self.ts.ok_or(missing("ts"))? {
            RawTimestamp::Epoch(secs) => DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| LoadError::BadTimestamp {
                    index,
                    value: secs.to_string(),
                })?,
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map_err(|_| LoadError::BadTimestamp {
                    index,
                    value: text.clone(),
                })?
                .with_timezone(&Utc),
        };

        let reason = self.reason_end.ok_or(missing("reason_end"))?;

        Ok(ListenEvent {
            track_uri: self.spotify_track_uri.ok_or(missing("spotify_track_uri"))?,
            track_name: self
                .master_metadata_track_name
                .ok_or(missing("master_metadata_track_name"))?,
            artist_name: self
                .master_metadata_album_artist_name
                .ok_or(missing("master_metadata_album_artist_name"))?,
            ms_played: self.ms_played.ok_or(missing("ms_played"))?,
            ts,
            end_reason: EndReason::from_export(&reason),
        })
    }
}

/// Reads and parses a history export from disk.
pub fn load_history(path: &Path) -> Result<Vec<ListenEvent>, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_history(&bytes)
}

/// Parses export bytes: a JSON array if the document starts with `[`,
/// newline-delimited JSON objects otherwise. Record order is preserved.
pub fn parse_history(bytes: &[u8]) -> Result<Vec<ListenEvent>, LoadError> {
    let is_array = bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'[');

    let raw: Vec<RawRecord> = if is_array {
        serde_json::from_slice(bytes)?
    } else {
        let text = std::str::from_utf8(bytes).map_err(|e| LoadError::Malformed(
            serde::de::Error::custom(format!("export is not UTF-8: {e}")),
        ))?;
        let mut rows = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            rows.push(serde_json::from_str(line)?);
        }
        rows
    };

    debug!(records = raw.len(), "History export parsed");

    raw.into_iter()
        .enumerate()
        .map(|(index, record)| record.into_event(index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARRAY_EXPORT: &str = r#"[
        {"ts": "2024-01-05T10:00:00Z", "ms_played": 300000,
         "master_metadata_track_name": "Let Her Go",
         "master_metadata_album_artist_name": "Passenger",
         "spotify_track_uri": "spotify:track:a", "reason_end": "trackdone"},
        {"ts": "2024-01-10T11:30:00Z", "ms_played": 100000,
         "master_metadata_track_name": "Let Her Go",
         "master_metadata_album_artist_name": "Passenger",
         "spotify_track_uri": "spotify:track:a", "reason_end": "fwdbtn"}
    ]"#;

    #[test]
    fn test_parse_array_export() {
        let events = parse_history(ARRAY_EXPORT.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].track_uri, "spotify:track:a");
        assert_eq!(events[0].ms_played, 300000);
        assert_eq!(events[0].end_reason, EndReason::Finished);
        assert_eq!(events[1].end_reason, EndReason::Skipped);
    }

    #[test]
    fn test_parse_ndjson_export() {
        let ndjson = concat!(
            r#"{"ts": "2023-06-01T00:00:00Z", "ms_played": 1000, "master_metadata_track_name": "x", "master_metadata_album_artist_name": "y", "spotify_track_uri": "spotify:track:x", "reason_end": "endplay"}"#,
            "\n\n",
            r#"{"ts": "2023-06-02T00:00:00Z", "ms_played": 2000, "master_metadata_track_name": "x", "master_metadata_album_artist_name": "y", "spotify_track_uri": "spotify:track:x", "reason_end": "trackdone"}"#,
            "\n",
        );
        let events = parse_history(ndjson.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].end_reason, EndReason::Other);
    }

    #[test]
    fn test_epoch_timestamp_accepted() {
        let json = r#"[{"ts": 1704448800, "ms_played": 5, "master_metadata_track_name": "t", "master_metadata_album_artist_name": "a", "spotify_track_uri": "spotify:track:t", "reason_end": "trackdone"}]"#;
        let events = parse_history(json.as_bytes()).unwrap();
        assert_eq!(events[0].ts, DateTime::from_timestamp(1704448800, 0).unwrap());
    }

    #[test]
    fn test_missing_field_aborts_load() {
        // Second record has no track URI; the whole load must fail.
        let json = r#"[
            {"ts": "2024-01-05T10:00:00Z", "ms_played": 1, "master_metadata_track_name": "t", "master_metadata_album_artist_name": "a", "spotify_track_uri": "spotify:track:t", "reason_end": "trackdone"},
            {"ts": "2024-01-06T10:00:00Z", "ms_played": 1, "master_metadata_track_name": "t", "master_metadata_album_artist_name": "a", "reason_end": "trackdone"}
        ]"#;
        let err = parse_history(json.as_bytes()).unwrap_err();
        match err {
            LoadError::MissingField { index, field } => {
                assert_eq!(index, 1);
                assert_eq!(field, "spotify_track_uri");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let json = r#"[{"ts": "not-a-date", "ms_played": 1, "master_metadata_track_name": "t", "master_metadata_album_artist_name": "a", "spotify_track_uri": "spotify:track:t", "reason_end": "trackdone"}]"#;
        assert!(matches!(
            parse_history(json.as_bytes()),
            Err(LoadError::BadTimestamp { index: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            parse_history(b"{not json"),
            Err(LoadError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_history(Path::new("/nonexistent/history.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
