//! Short-lived local listener for the OAuth redirect.
//!
//! Lifecycle is explicit: bind, serve until exactly one `/callback` hit
//! arrives, then shut the server down gracefully so the browser still
//! gets its response.

use anyhow::{Context, Result, bail};
use axum::{Router, extract::Query, routing::get};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    error: Option<String>,
    state: Option<String>,
}

/// What the authorization server sent back on success.
#[derive(Debug)]
pub struct Authorization {
    pub code: String,
    pub state: Option<String>,
}

/// Binds `127.0.0.1:port` and waits for the authorization redirect.
pub async fn await_authorization(port: u16) -> Result<Authorization> {
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind the callback listener on port {port}"))?;
    await_authorization_on(listener).await
}

async fn await_authorization_on(listener: TcpListener) -> Result<Authorization> {
    let (result_tx, mut result_rx) = mpsc::channel::<CallbackQuery>(1);

    let app = Router::new().route(
        "/callback",
        get(move |Query(query): Query<CallbackQuery>| {
            let result_tx = result_tx.clone();
            async move {
                let _ = result_tx.send(query).await;
                "Authorization received, you can close this window."
            }
        }),
    );

    info!(addr = %listener.local_addr()?, "Waiting for the authorization redirect");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let query = result_rx
        .recv()
        .await
        .context("callback listener stopped before a redirect arrived")?;

    let _ = shutdown_tx.send(());
    let _ = server.await;

    if let Some(error) = query.error {
        bail!("authorization was denied: {error}");
    }
    let code = query
        .code
        .context("redirect carried neither a code nor an error")?;

    Ok(Authorization {
        code,
        state: query.state,
    })
}
