//! Boundary to the native conferencing module
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


use async_trait::async_trait;
use futures::Stream;
use roomkit_config::JoinConfig;
use roomkit_types::{BridgeEvent, Peer, RoomEvent};
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tokio_stream::StreamExt;
use tracing::{info, warn};

use crate::error::{ReconcilerError, ReconcilerResult};

/// Stream of events delivered by registered listeners
pub type EventStream = Pin<Box<dyn Stream<Item = ReconcilerResult<RoomEvent>> + Send>>;

/// Parameters of a join request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub room_id: Option<String>,
    pub peer_name: String,
    pub auth_token: Option<String>,
}

impl From<&JoinConfig> for JoinRequest {
    fn from(config: &JoinConfig) -> Self {
        Self {
            room_id: config.room_id.clone(),
            peer_name: config.peer_name.clone(),
            auth_token: config.auth_token.clone(),
        }
    }
}

/// Calls into the native module the session depends on
#[async_trait]
pub trait RoomGateway: Send + Sync {
    /// Attach event listeners; events are delivered on the returned stream
    async fn register_listeners(&self) -> ReconcilerResult<EventStream>;

    /// Ask the native SDK to join the room
    async fn join(&self, request: &JoinRequest) -> ReconcilerResult<()>;

    /// Current snapshot of the local peer
    async fn local_peer(&self) -> ReconcilerResult<Peer>;

    /// Detach every listener registered by this gateway
    async fn remove_listeners(&self) -> ReconcilerResult<()>;

    /// Leave the room and destroy the native session
    async fn leave(&self) -> ReconcilerResult<()>;

    /// Get the gateway type name
    fn gateway_type(&self) -> &str;
}

/// Gateway that plays back a recorded JSON-lines event log
///
/// Keeps the most recent local peer snapshot seen in the log so refreshes
/// answer with what the native side would have reported at that point.
pub struct RecordedGateway {
    events: Mutex<Option<Vec<RoomEvent>>>,
    local_peer: Arc<Mutex<Option<Peer>>>,
}

impl RecordedGateway {
    pub fn new(events: Vec<RoomEvent>) -> Self {
        Self {
            events: Mutex::new(Some(events)),
            local_peer: Arc::new(Mutex::new(None)),
        }
    }

    /// Parse a log; undecodable lines are skipped with a warning
    pub fn parse(source: &str, contents: &str) -> Self {
        let mut events = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match BridgeEvent::from_json(source, line) {
                Ok(bridged) => events.push(bridged.event),
                Err(e) => warn!(line = index + 1, error = %e, "Skipping undecodable event"),
            }
        }
        Self::new(events)
    }

    /// Load a log from disk
    pub async fn from_path(path: impl AsRef<Path>) -> ReconcilerResult<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let gateway = Self::parse(&path.display().to_string(), &contents);
        info!(
            path = %path.display(),
            events = gateway.pending(),
            "Loaded recorded events"
        );
        Ok(gateway)
    }

    /// Events not yet handed to a listener
    pub fn pending(&self) -> usize {
        lock(&self.events).as_ref().map_or(0, Vec::len)
    }
}

#[async_trait]
impl RoomGateway for RecordedGateway {
    async fn register_listeners(&self) -> ReconcilerResult<EventStream> {
        let events = lock(&self.events).take().ok_or_else(|| {
            ReconcilerError::ListenerRegistration("listeners already registered".to_string())
        })?;

        let local_peer = Arc::clone(&self.local_peer);
        let stream = tokio_stream::iter(events).map(move |event| {
            if let Some(peer) = event.peer().filter(|peer| peer.is_local) {
                *lock(&local_peer) = Some(peer.clone());
            }
            Ok(event)
        });
        Ok(Box::pin(stream))
    }

    async fn join(&self, request: &JoinRequest) -> ReconcilerResult<()> {
        info!(
            room_id = request.room_id.as_deref().unwrap_or("recorded"),
            peer_name = %request.peer_name,
            "Joining recorded room"
        );
        Ok(())
    }

    async fn local_peer(&self) -> ReconcilerResult<Peer> {
        lock(&self.local_peer)
            .clone()
            .ok_or_else(|| ReconcilerError::PeerRefresh("no local peer recorded yet".to_string()))
    }

    async fn remove_listeners(&self) -> ReconcilerResult<()> {
        Ok(())
    }

    async fn leave(&self) -> ReconcilerResult<()> {
        info!("Leaving recorded room");
        Ok(())
    }

    fn gateway_type(&self) -> &str {
        "recorded"
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
