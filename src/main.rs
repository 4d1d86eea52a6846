// SPDX-FileCopyrightText: 2025 Fredrik Lanker <fredrik@lanker.se>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use anyhow::{bail, Context};
use axum::{extract::Request, ServiceExt};
use clap::Parser;
use plantdex::controller::sqlite::SqliteController;
use plantdex::{app, import, StaticKeys};
use std::env;
use std::sync::Arc;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
pub struct Arguments {
    /// Seed the plant store from a JSON file and exit.
    #[arg(long)]
    import: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Arguments::parse();

    let store = SqliteController::open(false).await?;

    if let Some(path) = args.import {
        import::import(path, &store).await?;
        return Ok(());
    }

    let keys = env::var("PLANTDEX_API_KEYS")
        .context("Need to set environment variable PLANTDEX_API_KEYS")?;
    let keys = StaticKeys::from_list(&keys);
    if keys.is_empty() {
        bail!("PLANTDEX_API_KEYS does not contain any key");
    }
    let port = env::var("PLANTDEX_PORT").unwrap_or("3000".to_owned());

    let app = app(Arc::new(store), Arc::new(keys));

    let app = NormalizePathLayer::trim_trailing_slash().layer(app);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .with_context(|| format!("Failed to bind to port {port}"))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .await
        .context("Failed to create server")?;

    Ok(())
}
