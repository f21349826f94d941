//! Tile Replay
//!
//! Replays a recorded JSON-lines log of room events through a session and
//! prints the resulting tile layout.
// Copyright 2025 Francisco F. Pinochet
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

use anyhow::{Context, Result};
use roomkit_config::AppConfig;
use roomkit_logging::init_with_format;
use std::sync::Arc;
use tile_reconciler::{pages, JoinRequest, PeerTrackNode, RecordedGateway, Session, TileStore};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .context("usage: tile-replay <events.jsonl>")?;

    // Load configuration
    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_with_format("tile-replay", config.log_level(), config.log_format);

    info!(
        path = %path,
        tiles_per_page = config.layout.tiles_per_page,
        "Configuration loaded"
    );

    let gateway = RecordedGateway::from_path(&path)
        .await
        .with_context(|| format!("Failed to load {}", path))?;

    let store = Arc::new(TileStore::new());
    let session = Arc::new(
        Session::join(
            Arc::new(gateway),
            Arc::clone(&store),
            &JoinRequest::from(&config.join),
        )
        .await
        .context("Failed to join recorded room")?,
    );

    let runner = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.run().await }
    });

    let processed = tokio::select! {
        result = runner => match result {
            Ok(Ok(processed)) => processed,
            Ok(Err(e)) => {
                error!(error = %e, "Replay failed");
                0
            }
            Err(e) => {
                error!(error = %e, "Replay task panicked");
                0
            }
        },
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
            0
        }
    };

    let nodes = store.snapshot();
    info!(processed, tiles = nodes.len(), "Replay finished");
    print_layout(&nodes, config.layout.tiles_per_page)?;

    session.leave().await.context("Failed to leave recorded room")?;
    Ok(())
}

fn print_layout(nodes: &[PeerTrackNode], tiles_per_page: usize) -> Result<()> {
    for (index, page) in pages(nodes, tiles_per_page).iter().enumerate() {
        println!("page {}", index + 1);
        for node in page {
            println!("  {}", serde_json::to_string(node)?);
        }
    }
    Ok(())
}
