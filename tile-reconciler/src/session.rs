//! Session driver
//!
//! Wires a gateway to a tile store: registers listeners before joining,
//! feeds events through the reconciler one at a time and tears the native
//! session down exactly once.
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


use chrono::{DateTime, Utc};
use roomkit_types::RoomEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{ReconcilerError, ReconcilerResult};
use crate::gateway::{EventStream, JoinRequest, RoomGateway};
use crate::reconciler::Reconciliation;
use crate::store::TileStore;

/// A joined room
pub struct Session {
    session_id: Uuid,
    joined_at: DateTime<Utc>,
    gateway: Arc<dyn RoomGateway>,
    store: Arc<TileStore>,
    events: Mutex<Option<EventStream>>,
    left: AtomicBool,
    shutdown: watch::Sender<bool>,
}

impl Session {
    /// Register listeners, then join
    ///
    /// Listener registration has to finish before the join request goes out,
    /// otherwise events emitted in between are lost.
    pub async fn join(
        gateway: Arc<dyn RoomGateway>,
        store: Arc<TileStore>,
        request: &JoinRequest,
    ) -> ReconcilerResult<Self> {
        let session_id = Uuid::new_v4();
        info!(
            session_id = %session_id,
            gateway = gateway.gateway_type(),
            peer_name = %request.peer_name,
            "Registering room listeners"
        );

        let events = gateway.register_listeners().await.map_err(|e| match e {
            ReconcilerError::ListenerRegistration(_) => e,
            other => ReconcilerError::ListenerRegistration(other.to_string()),
        })?;

        if let Err(e) = gateway.join(request).await {
            error!(session_id = %session_id, error = %e, "Join request rejected");
            if let Err(cleanup) = gateway.remove_listeners().await {
                warn!(error = %cleanup, "Failed to remove listeners after rejected join");
            }
            return Err(match e {
                ReconcilerError::Join(_) => e,
                other => ReconcilerError::Join(other.to_string()),
            });
        }

        info!(session_id = %session_id, "Join request sent");

        Ok(Self {
            session_id,
            joined_at: Utc::now(),
            gateway,
            store,
            events: Mutex::new(Some(events)),
            left: AtomicBool::new(false),
            shutdown: watch::Sender::new(false),
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    pub fn store(&self) -> &Arc<TileStore> {
        &self.store
    }

    pub fn has_left(&self) -> bool {
        self.left.load(Ordering::SeqCst)
    }

    /// Apply one event, refreshing the local peer when asked to
    ///
    /// A failed refresh is reported but not retried; the tile list keeps the
    /// state the event itself produced. Once the session is left, events and
    /// refreshes still in flight no longer touch the store.
    pub async fn handle_event(&self, event: &RoomEvent) -> ReconcilerResult<Reconciliation> {
        let Some(outcome) = self.apply_if_joined(event) else {
            debug!(event = event.kind(), "Session left, dropping event");
            return Ok(self.idle_outcome());
        };
        if !outcome.refresh_local_peer {
            return Ok(outcome);
        }

        match self.gateway.local_peer().await {
            Ok(peer) => {
                debug!(peer_id = %peer.peer_id, "Refreshed local peer");
                match self.apply_if_joined(&RoomEvent::LocalPeerUpdated { peer }) {
                    Some(refreshed) => Ok(refreshed),
                    None => {
                        debug!(
                            session_id = %self.session_id,
                            "Session left during local peer refresh"
                        );
                        Ok(self.idle_outcome())
                    }
                }
            }
            Err(e) => {
                error!(
                    session_id = %self.session_id,
                    error = %e,
                    "Failed to refresh local peer"
                );
                Err(match e {
                    ReconcilerError::PeerRefresh(_) => e,
                    other => ReconcilerError::PeerRefresh(other.to_string()),
                })
            }
        }
    }

    fn apply_if_joined(&self, event: &RoomEvent) -> Option<Reconciliation> {
        self.store.apply_while(event, || !self.has_left())
    }

    fn idle_outcome(&self) -> Reconciliation {
        Reconciliation {
            nodes: self.store.snapshot(),
            refresh_local_peer: false,
        }
    }

    /// Consume events until the stream ends or the session is left
    ///
    /// Returns the number of events applied. Only the first call consumes
    /// the stream; later calls return immediately.
    pub async fn run(&self) -> ReconcilerResult<usize> {
        let Some(mut events) = self.events.lock().await.take() else {
            warn!(session_id = %self.session_id, "Event stream already consumed");
            return Ok(0);
        };

        let mut shutdown = self.shutdown.subscribe();
        let mut processed = 0;

        info!(session_id = %self.session_id, "Processing room events");

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                next = events.next() => {
                    let Some(event) = next else {
                        info!(session_id = %self.session_id, "Event stream ended");
                        break;
                    };
                    match event {
                        Ok(event) => {
                            processed += 1;
                            if let Err(e) = self.handle_event(&event).await {
                                error!(event = event.kind(), error = %e, "Failed to handle room event");
                            }
                        }
                        Err(e) => {
                            // Keep going, the next event may be fine
                            error!(error = %e, "Error receiving room event");
                        }
                    }
                }
            }
        }

        debug!(session_id = %self.session_id, processed, "Stopped processing room events");
        Ok(processed)
    }

    /// Remove listeners and leave the room
    ///
    /// Returns `Ok(false)` when the session was already left.
    pub async fn leave(&self) -> ReconcilerResult<bool> {
        if self.left.swap(true, Ordering::SeqCst) {
            debug!(session_id = %self.session_id, "Leave already issued");
            return Ok(false);
        }

        info!(session_id = %self.session_id, "Leaving room");
        self.shutdown.send_replace(true);

        if let Err(e) = self.gateway.remove_listeners().await {
            warn!(error = %e, "Failed to remove room listeners");
        }

        let result = self.gateway.leave().await;
        self.store.reset();

        match result {
            Ok(()) => {
                info!(
                    session_id = %self.session_id,
                    duration_secs = (Utc::now() - self.joined_at).num_seconds(),
                    "Left room"
                );
                Ok(true)
            }
            Err(e) => {
                error!(session_id = %self.session_id, error = %e, "Leave request rejected");
                Err(match e {
                    ReconcilerError::Leave(_) => e,
                    other => ReconcilerError::Leave(other.to_string()),
                })
            }
        }
    }
}
