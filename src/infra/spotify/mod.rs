//! Spotify Web API integration.
//!
//! [`client::SpotifyClient`] implements the publishing trait over the
//! generic HTTP transport; [`auth`] covers both token grants and the
//! one-time interactive authorization, with [`callback`] providing the
//! short-lived local listener the interactive flow needs.

pub mod auth;
pub mod callback;
pub mod client;
