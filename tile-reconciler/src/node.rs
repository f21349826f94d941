//! Peer-track nodes: one displayable tile per peer track slot
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


use roomkit_types::{Peer, Track, TrackSource};
use serde::{Serialize, Serializer};
use std::fmt;

/// Slot a node occupies within its peer
///
/// A peer has exactly one regular slot, shared by "no track" and the regular
/// camera track, plus one auxiliary slot per non-regular track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TrackSlot {
    Regular,
    Auxiliary { source: TrackSource, track_id: String },
}

impl TrackSlot {
    /// Slot for an optional track
    pub fn for_track(track: Option<&Track>) -> Self {
        match track {
            Some(track) if !track.is_regular() => TrackSlot::Auxiliary {
                source: track.source.clone(),
                track_id: track.track_id.clone(),
            },
            _ => TrackSlot::Regular,
        }
    }

    pub fn is_regular(&self) -> bool {
        matches!(self, TrackSlot::Regular)
    }
}

/// Stable node identifier: peer identity plus track slot
///
/// Equality and hashing use the structured parts; the `peer:slot` string
/// form is for display and serialization only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    peer_id: String,
    slot: TrackSlot,
}

impl NodeId {
    pub fn new(peer_id: &str, slot: &TrackSlot) -> Self {
        NodeId {
            peer_id: peer_id.to_string(),
            slot: slot.clone(),
        }
    }

    /// Identifier of the node `track` (or no track) maps to for `peer`
    pub fn for_peer_track(peer: &Peer, track: Option<&Track>) -> Self {
        Self::new(&peer.peer_id, &TrackSlot::for_track(track))
    }

    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    pub fn slot(&self) -> &TrackSlot {
        &self.slot
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            TrackSlot::Regular => write!(f, "{}:regular", self.peer_id),
            TrackSlot::Auxiliary { source, track_id } => {
                write!(f, "{}:{}:{}", self.peer_id, source, track_id)
            }
        }
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A tile: peer snapshot paired with an optional video track snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerTrackNode {
    pub id: NodeId,
    pub peer: Peer,
    pub track: Option<Track>,
    pub is_degraded: bool,
}

impl PeerTrackNode {
    pub fn new(peer: Peer, track: Option<Track>) -> Self {
        Self {
            id: NodeId::for_peer_track(&peer, track.as_ref()),
            peer,
            track,
            is_degraded: false,
        }
    }

    pub fn peer_id(&self) -> &str {
        &self.peer.peer_id
    }

    /// Track id the renderer should bind to
    pub fn track_id(&self) -> Option<&str> {
        self.track.as_ref().map(|t| t.track_id.as_str())
    }

    /// Whether the tile sits in an auxiliary slot (screen share, plugin, ...)
    pub fn is_auxiliary(&self) -> bool {
        self.track.as_ref().is_some_and(|t| !t.is_regular())
    }

    /// Video should be drawn; otherwise the tile shows the peer's avatar
    pub fn shows_video(&self) -> bool {
        self.track.as_ref().is_some_and(|t| t.is_video() && !t.is_mute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomkit_types::TrackKind;

    #[test]
    fn test_regular_track_shares_slot_with_no_track() {
        let peer = Peer::remote("p1", "Ada");
        let camera = Track::new("v1", TrackKind::Video, TrackSource::Regular);

        assert_eq!(
            NodeId::for_peer_track(&peer, None),
            NodeId::for_peer_track(&peer, Some(&camera))
        );
        assert_eq!(NodeId::for_peer_track(&peer, None).to_string(), "p1:regular");
    }

    #[test]
    fn test_auxiliary_slot_is_distinct() {
        let peer = Peer::remote("p1", "Ada");
        let screen = Track::new("s1", TrackKind::Video, TrackSource::Screen);

        let id = NodeId::for_peer_track(&peer, Some(&screen));
        assert_eq!(id.to_string(), "p1:screen:s1");
        assert_ne!(id, NodeId::for_peer_track(&peer, None));
    }

    #[test]
    fn test_ids_with_separator_in_peer_id_stay_distinct() {
        // Both render as "x:screen:regular"
        let tricky = Peer::remote("x:screen", "Tricky");
        let plain = Peer::remote("x", "Plain");
        let odd_screen = Track::new("regular", TrackKind::Video, TrackSource::Screen);

        let a = NodeId::for_peer_track(&tricky, None);
        let b = NodeId::for_peer_track(&plain, Some(&odd_screen));

        assert_eq!(a.to_string(), b.to_string());
        assert_ne!(a, b);
        assert_eq!(a.peer_id(), "x:screen");
        assert!(a.slot().is_regular());
    }

    #[test]
    fn test_muted_video_is_not_shown() {
        let peer = Peer::remote("p1", "Ada");
        let camera = Track::new("v1", TrackKind::Video, TrackSource::Regular);

        assert!(PeerTrackNode::new(peer.clone(), Some(camera.clone())).shows_video());
        assert!(!PeerTrackNode::new(peer.clone(), Some(camera.with_mute(true))).shows_video());
        assert!(!PeerTrackNode::new(peer, None).shows_video());
    }
}
