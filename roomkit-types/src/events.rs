//! Room events emitted by the native bridge
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
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, RoomKitError};
use crate::schemas::{Peer, Room, Track};

/// Every update the bridge can deliver, one variant per update type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    // Room events
    JoinSucceeded { room: Room },

    // Peer events
    PeerJoined { peer: Peer },
    PeerLeft { peer: Peer },
    PeerRoleChanged { peer: Peer },
    PeerMetadataChanged { peer: Peer },
    PeerNameChanged { peer: Peer },
    PeerNetworkQualityUpdated { peer: Peer },
    LocalPeerUpdated { peer: Peer },

    // Track events
    TrackAdded { peer: Peer, track: Track },
    TrackRemoved { peer: Peer, track: Track },
    TrackMuted { peer: Peer, track: Track },
    TrackUnmuted { peer: Peer, track: Track },
    TrackDegraded { peer: Peer, track: Track },
    TrackRestored { peer: Peer, track: Track },
}

impl RoomEvent {
    /// Wire name of the event, as used in the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            RoomEvent::JoinSucceeded { .. } => "join_succeeded",
            RoomEvent::PeerJoined { .. } => "peer_joined",
            RoomEvent::PeerLeft { .. } => "peer_left",
            RoomEvent::PeerRoleChanged { .. } => "peer_role_changed",
            RoomEvent::PeerMetadataChanged { .. } => "peer_metadata_changed",
            RoomEvent::PeerNameChanged { .. } => "peer_name_changed",
            RoomEvent::PeerNetworkQualityUpdated { .. } => "peer_network_quality_updated",
            RoomEvent::LocalPeerUpdated { .. } => "local_peer_updated",
            RoomEvent::TrackAdded { .. } => "track_added",
            RoomEvent::TrackRemoved { .. } => "track_removed",
            RoomEvent::TrackMuted { .. } => "track_muted",
            RoomEvent::TrackUnmuted { .. } => "track_unmuted",
            RoomEvent::TrackDegraded { .. } => "track_degraded",
            RoomEvent::TrackRestored { .. } => "track_restored",
        }
    }

    /// Peer the event is about, if any
    pub fn peer(&self) -> Option<&Peer> {
        match self {
            RoomEvent::JoinSucceeded { room } => room.local_peer.as_ref(),
            RoomEvent::PeerJoined { peer }
            | RoomEvent::PeerLeft { peer }
            | RoomEvent::PeerRoleChanged { peer }
            | RoomEvent::PeerMetadataChanged { peer }
            | RoomEvent::PeerNameChanged { peer }
            | RoomEvent::PeerNetworkQualityUpdated { peer }
            | RoomEvent::LocalPeerUpdated { peer }
            | RoomEvent::TrackAdded { peer, .. }
            | RoomEvent::TrackRemoved { peer, .. }
            | RoomEvent::TrackMuted { peer, .. }
            | RoomEvent::TrackUnmuted { peer, .. }
            | RoomEvent::TrackDegraded { peer, .. }
            | RoomEvent::TrackRestored { peer, .. } => Some(peer),
        }
    }
}

/// A room event as received from the bridge, stamped on arrival
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeEvent {
    /// Unique event identifier
    pub event_id: Uuid,

    /// Arrival timestamp
    pub timestamp: DateTime<Utc>,

    /// Emitter that delivered the event
    pub source: String,

    #[serde(flatten)]
    pub event: RoomEvent,
}

impl BridgeEvent {
    /// Stamp a new event
    pub fn new(source: impl Into<String>, event: RoomEvent) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            event,
        }
    }

    /// Decode one JSON document
    ///
    /// Accepts either a full envelope or a bare tagged event, in which case
    /// a fresh envelope is created around it.
    pub fn from_json(source: &str, json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let tag = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| RoomKitError::MissingField("type".to_string()))?
            .to_string();

        if value.get("event_id").is_some() {
            return serde_json::from_value(value)
                .map_err(|e| RoomKitError::InvalidPayload(format!("{}: {}", tag, e)));
        }

        let event: RoomEvent = serde_json::from_value(value).map_err(|e| {
            if e.to_string().contains("unknown variant") {
                RoomKitError::InvalidEventType(tag.clone())
            } else {
                RoomKitError::InvalidPayload(format!("{}: {}", tag, e))
            }
        })?;
        Ok(Self::new(source, event))
    }
}
