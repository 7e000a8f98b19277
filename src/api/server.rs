// Copyright 2025 The xrt-exporter Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;

use axum::extract::State;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::metrics::render_metrics;
use crate::xrt::{XbutilAdapter, XrtCache};

/// The cache instance is owned by this composition layer and shared with
/// every in-flight scrape.
pub type SharedCache = Arc<XrtCache<XbutilAdapter>>;

async fn metrics_handler(State(cache): State<SharedCache>) -> String {
    // Cache refresh shells out to xbutil and blocks, so the scrape walk
    // runs off the async worker threads.
    let result = tokio::task::spawn_blocking(move || render_metrics(cache.as_ref())).await;
    result.unwrap_or_else(|e| {
        tracing::error!("scrape task panicked: {e}");
        String::new()
    })
}

/// Run the exporter: install the tracing subscriber, build the router and
/// serve `/metrics` until the process is stopped.
pub async fn run_api_mode(port: u16, cache: SharedCache) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xrt_exporter=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(cache)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    run_tcp_listener(app, port).await;
}

async fn run_tcp_listener(app: Router, port: u16) {
    let listener = match TcpListener::bind(&format!("0.0.0.0:{port}")).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind TCP listener on port {port}: {e}");
            eprintln!("Error: Failed to bind TCP listener on port {port}: {e}");
            return;
        }
    };
    tracing::info!(
        "metrics server listening on {}",
        listener
            .local_addr()
            .unwrap_or_else(|_| "unknown".parse().unwrap())
    );
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("TCP server error: {e}");
    }
}
