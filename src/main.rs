//! CLI entry point for playlist_forge.
//!
//! Provides subcommands for the one-time Spotify login, publishing the
//! playlist families derived from a streaming-history export, and local
//! report/export helpers.

mod infra;
mod services;

use crate::infra::spotify::auth;
use crate::infra::spotify::client::SpotifyClient;
use crate::services::publisher::publish_all;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use playlist_forge::fetch::{BasicClient, fetch_bytes};
use playlist_forge::history::{ListenEvent, load_history, parse_history};
use playlist_forge::output::{print_json_records, write_ranking_csv, write_unique_songs_json};
use playlist_forge::playlist::{
    PlaylistSpec, all_time_spec, artist_all_spec, artist_top_spec, monthly_spec, seasonal_specs,
    second_all_time_spec, top_artists_spec, yearly_specs,
};
use playlist_forge::rankings::{ArtistMetric, by_artist, top_artists, unique_songs};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "playlist_forge")]
#[command(about = "Build Spotify playlists from a streaming history export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Which metric orders the artists report.
#[derive(Clone, Copy, ValueEnum)]
enum ArtistOrdering {
    /// Total listening time.
    Time,
    /// Count of distinct tracks played.
    Tracks,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the one-time interactive Spotify authorization and save the token
    Login {
        /// Use the client-credentials grant instead (app-only token,
        /// cannot modify playlists)
        #[arg(long, default_value_t = false)]
        app_only: bool,
    },
    /// Publish the all-time top songs playlist
    AllTime {
        /// Playlist size
        #[arg(short, long, default_value_t = 50)]
        size: usize,

        /// Publish ranks size+1..=2*size instead of the top window
        #[arg(long, default_value_t = false)]
        second: bool,

        /// History export file or URL (defaults to
        /// $SPOTIFY_STREAMING_HISTORY_COMBINED_FILE)
        #[arg(long)]
        history: Option<String>,
    },
    /// Publish one playlist per calendar year
    Yearly {
        /// Tracks per year
        #[arg(short, long, default_value_t = 20)]
        per_year: usize,

        #[arg(long)]
        history: Option<String>,
    },
    /// Publish one playlist per season
    Seasonal {
        /// Tracks per season
        #[arg(short, long, default_value_t = 20)]
        per_season: usize,

        #[arg(long)]
        history: Option<String>,
    },
    /// Publish the cross-month weighted playlist
    Monthly {
        /// Tracks that earn weight each month
        #[arg(long, default_value_t = 5)]
        per_month: usize,

        /// Final playlist size
        #[arg(short, long, default_value_t = 50)]
        size: usize,

        #[arg(long)]
        history: Option<String>,
    },
    /// Publish the top songs of the top artists, one block per artist
    TopArtists {
        /// How many artists to include
        #[arg(long, default_value_t = 10)]
        artists: usize,

        /// Songs per artist
        #[arg(long, default_value_t = 5)]
        per_artist: usize,

        #[arg(long)]
        history: Option<String>,
    },
    /// Publish one artist's songs
    Artist {
        /// Artist name, matched exactly
        name: String,

        /// Playlist size
        #[arg(short, long, default_value_t = 20)]
        size: usize,

        /// Include every track ever played instead of the top window
        #[arg(long, default_value_t = false)]
        all: bool,

        #[arg(long)]
        history: Option<String>,
    },
    /// Print a top-artists report as JSON records
    Artists {
        /// Ordering metric
        #[arg(long, value_enum, default_value = "time")]
        by: ArtistOrdering,

        /// How many artists to report
        #[arg(short, long, default_value_t = 20)]
        count: usize,

        #[arg(long)]
        history: Option<String>,
    },
    /// Export an artist's ranked songs to a CSV file
    ExportArtist {
        /// Artist name, matched exactly
        name: String,

        /// How many songs to export
        #[arg(short, long, default_value_t = 300)]
        size: usize,

        /// Output path (defaults to "<artist>_top_songs.csv")
        #[arg(short, long)]
        output: Option<String>,

        #[arg(long)]
        history: Option<String>,
    },
    /// Export per-track metadata from each first fully-played instance
    ExportSongs {
        /// Output path
        #[arg(short, long, default_value = "unique_songs.json")]
        output: String,

        #[arg(long)]
        history: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/playlist_forge.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("playlist_forge.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Login { app_only } => {
            let client_id =
                std::env::var("SPOTIFY_CLIENT_ID").context("SPOTIFY_CLIENT_ID must be set")?;
            let client_secret = std::env::var("SPOTIFY_CLIENT_SECRET")
                .context("SPOTIFY_CLIENT_SECRET must be set")?;

            if app_only {
                let token = auth::client_credentials_token(&client_id, &client_secret).await?;
                auth::save_token(&token_path(), &token)?;
                warn!("App-only token saved; it cannot modify playlists");
            } else {
                auth::login(&client_id, &client_secret, &token_path()).await?;
                info!("Login complete; you can now publish playlists");
            }
        }
        Commands::AllTime {
            size,
            second,
            history,
        } => {
            let events = load_events(history).await?;
            let spec = if second {
                second_all_time_spec(&events, size)
            } else {
                all_time_spec(&events, size)
            };
            publish(&[spec]).await?;
        }
        Commands::Yearly { per_year, history } => {
            let events = load_events(history).await?;
            publish(&yearly_specs(&events, per_year)).await?;
        }
        Commands::Seasonal {
            per_season,
            history,
        } => {
            let events = load_events(history).await?;
            publish(&seasonal_specs(&events, per_season)).await?;
        }
        Commands::Monthly {
            per_month,
            size,
            history,
        } => {
            let events = load_events(history).await?;
            publish(&[monthly_spec(&events, per_month, size)]).await?;
        }
        Commands::TopArtists {
            artists,
            per_artist,
            history,
        } => {
            let events = load_events(history).await?;
            publish(&[top_artists_spec(&events, artists, per_artist)]).await?;
        }
        Commands::Artist {
            name,
            size,
            all,
            history,
        } => {
            let events = load_events(history).await?;
            let spec = if all {
                artist_all_spec(&events, &name)
            } else {
                artist_top_spec(&events, &name, size)
            };
            publish(&[spec]).await?;
        }
        Commands::Artists { by, count, history } => {
            let events = load_events(history).await?;
            let metric = match by {
                ArtistOrdering::Time => ArtistMetric::ListeningTime,
                ArtistOrdering::Tracks => ArtistMetric::UniqueTracks,
            };
            print_json_records(&top_artists(&events, metric, count))?;
        }
        Commands::ExportArtist {
            name,
            size,
            output,
            history,
        } => {
            let events = load_events(history).await?;
            let ranking = by_artist(&events, &name, Some(size));
            if ranking.is_empty() {
                warn!(artist = %name, "No events matched this artist");
            }

            let output = output.unwrap_or_else(|| format!("{name}_top_songs.csv"));
            write_ranking_csv(&output, &ranking)?;
            info!(path = %output, rows = ranking.len(), "Artist CSV exported");
        }
        Commands::ExportSongs { output, history } => {
            let events = load_events(history).await?;
            let songs = unique_songs(&events);
            write_unique_songs_json(&output, &songs)?;
            info!(path = %output, rows = songs.len(), "Unique songs exported");
        }
    }

    Ok(())
}

fn token_path() -> PathBuf {
    std::env::var("SPOTIFY_TOKEN_FILE")
        .unwrap_or_else(|_| "auth_response.json".to_string())
        .into()
}

/// Loads history from an explicit file path or URL, falling back to the
/// path configured in the environment.
async fn load_events(history: Option<String>) -> Result<Vec<ListenEvent>> {
    let source = match history {
        Some(source) => source,
        None => std::env::var("SPOTIFY_STREAMING_HISTORY_COMBINED_FILE").context(
            "no history source: pass --history or set SPOTIFY_STREAMING_HISTORY_COMBINED_FILE",
        )?,
    };

    let events = if source.starts_with("http") {
        let client = BasicClient::new();
        let bytes = fetch_bytes(&client, &source).await?;
        parse_history(&bytes)?
    } else {
        load_history(Path::new(&source))?
    };

    info!(events = events.len(), source = %source, "History loaded");
    Ok(events)
}

/// Connects with the saved token and publishes every spec, one playlist
/// at a time.
async fn publish(specs: &[PlaylistSpec]) -> Result<()> {
    let client = SpotifyClient::connect(&auth::load_saved_token(&token_path())?).await?;

    let published = publish_all(&client, specs).await;
    info!(published, requested = specs.len(), "Publishing complete");
    Ok(())
}
