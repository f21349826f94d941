//! Peer-track reconciliation
//!
//! Folds room events into the ordered list of tiles the UI renders.
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


use roomkit_types::{Peer, RoomEvent, Track};
use tracing::{debug, trace};

use crate::node::{NodeId, PeerTrackNode};

/// Outcome of applying one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Node list after the event
    pub nodes: Vec<PeerTrackNode>,
    /// The local peer changed mute state; its cached snapshot must be re-read
    pub refresh_local_peer: bool,
}

/// Whether an upsert may append a node when nothing matches
#[derive(Debug, Clone, Copy)]
enum Creation<'a> {
    Forbidden,
    Allowed { track: Option<&'a Track> },
}

/// Apply `event` to `nodes`
///
/// Pure: the input list is left untouched and the result depends only on the
/// arguments. Events that reference nodes which don't exist are ignored.
pub fn reconcile(nodes: &[PeerTrackNode], event: &RoomEvent) -> Reconciliation {
    let mut next = nodes.to_vec();
    let mut refresh_local_peer = false;

    match event {
        RoomEvent::JoinSucceeded { room } => match &room.local_peer {
            Some(local) => match regular_video(local) {
                Some(video) => upsert_node(&mut next, local, video, true, None),
                None => upsert_peer(&mut next, local, Creation::Allowed { track: None }),
            },
            None => trace!(room_id = %room.room_id, "Join succeeded without a local peer"),
        },

        RoomEvent::PeerJoined { peer } => {
            // Tiles appear with the first track (or local peer confirmation)
            trace!(peer_id = %peer.peer_id, "Ignoring peer join");
        }

        RoomEvent::PeerLeft { peer } => remove_peer(&mut next, &peer.peer_id),

        RoomEvent::PeerRoleChanged { peer } => {
            let can_publish = peer.role.as_ref().is_some_and(|role| role.can_publish());
            if !can_publish {
                if peer.is_local {
                    demote_local_peer(&mut next, peer);
                } else {
                    remove_peer(&mut next, &peer.peer_id);
                }
            }
        }

        RoomEvent::PeerMetadataChanged { peer }
        | RoomEvent::PeerNameChanged { peer }
        | RoomEvent::PeerNetworkQualityUpdated { peer } => {
            upsert_peer(&mut next, peer, Creation::Forbidden)
        }

        RoomEvent::LocalPeerUpdated { peer } => upsert_peer(
            &mut next,
            peer,
            Creation::Allowed { track: regular_video(peer) },
        ),

        RoomEvent::TrackAdded { peer, track } => {
            if track.is_video() {
                upsert_node(&mut next, peer, track, true, None);
            } else {
                upsert_peer(&mut next, peer, Creation::Allowed { track: None });
            }
        }

        RoomEvent::TrackRemoved { peer, track } => remove_track(&mut next, peer, track),

        RoomEvent::TrackMuted { peer, track } | RoomEvent::TrackUnmuted { peer, track } => {
            if track.is_video() {
                upsert_node(&mut next, peer, track, false, None);
            } else {
                upsert_peer(&mut next, peer, Creation::Forbidden);
            }
            refresh_local_peer = peer.is_local;
        }

        RoomEvent::TrackDegraded { peer, track } | RoomEvent::TrackRestored { peer, track } => {
            let degraded = matches!(event, RoomEvent::TrackDegraded { .. });
            if track.is_video() {
                upsert_node(&mut next, peer, track, false, Some(degraded));
            } else {
                upsert_peer(&mut next, peer, Creation::Forbidden);
            }
        }
    }

    debug!(
        event = event.kind(),
        peer_id = event.peer().map(|p| p.peer_id.as_str()).unwrap_or_default(),
        before = nodes.len(),
        after = next.len(),
        refresh_local_peer,
        "Reconciled room event"
    );

    Reconciliation {
        nodes: next,
        refresh_local_peer,
    }
}

/// The peer's regular camera track, if it has one
fn regular_video(peer: &Peer) -> Option<&Track> {
    peer.video_track
        .as_ref()
        .filter(|track| track.is_video() && track.is_regular())
}

/// Update the node for (peer, track) in place, or append it when allowed
fn upsert_node(
    nodes: &mut Vec<PeerTrackNode>,
    peer: &Peer,
    track: &Track,
    create_new: bool,
    degraded: Option<bool>,
) {
    let id = NodeId::for_peer_track(peer, Some(track));

    if let Some(node) = nodes.iter_mut().find(|node| node.id == id) {
        let same_track = node.track_id() == Some(track.track_id.as_str());
        node.peer = peer.clone();
        node.track = Some(track.clone());
        match degraded {
            Some(degraded) => node.is_degraded = degraded,
            // A new track in the slot starts healthy
            None if !same_track => node.is_degraded = false,
            None => {}
        }
        return;
    }

    if create_new {
        let mut node = PeerTrackNode::new(peer.clone(), Some(track.clone()));
        node.is_degraded = degraded.unwrap_or(false);
        trace!(node_id = %node.id, "Creating node");
        nodes.push(node);
    } else {
        trace!(node_id = %id, "No node to update");
    }
}

/// Refresh the peer snapshot on every node of the peer
fn upsert_peer(nodes: &mut Vec<PeerTrackNode>, peer: &Peer, creation: Creation<'_>) {
    let mut matched = false;
    for node in nodes.iter_mut().filter(|node| node.peer.peer_id == peer.peer_id) {
        node.peer = peer.clone();
        matched = true;
    }

    if matched {
        return;
    }

    match creation {
        Creation::Allowed { track } => {
            let node = PeerTrackNode::new(peer.clone(), track.cloned());
            trace!(node_id = %node.id, "Creating node");
            nodes.push(node);
        }
        Creation::Forbidden => trace!(peer_id = %peer.peer_id, "No node to update"),
    }
}

fn remove_peer(nodes: &mut Vec<PeerTrackNode>, peer_id: &str) {
    nodes.retain(|node| node.peer.peer_id != peer_id);
}

fn remove_track(nodes: &mut Vec<PeerTrackNode>, peer: &Peer, track: &Track) {
    let id = NodeId::for_peer_track(peer, Some(track));

    if !track.is_regular() {
        nodes.retain(|node| node.id != id);
        return;
    }

    if peer.has_no_regular_tracks() {
        if peer.is_local {
            // The local tile survives until leave; it just loses its video
            if let Some(node) = nodes.iter_mut().find(|node| node.id == id) {
                node.peer = peer.clone();
                node.track = None;
                node.is_degraded = false;
            }
        } else {
            nodes.retain(|node| node.id != id);
        }
        return;
    }

    // Another regular track remains; drop the removed one from its tile
    upsert_peer(nodes, peer, Creation::Forbidden);
    if let Some(node) = nodes.iter_mut().find(|node| node.id == id) {
        if node.track_id() == Some(track.track_id.as_str()) {
            node.track = None;
            node.is_degraded = false;
        }
    }
}

/// Local peer lost publish permission: auxiliary tiles go, the regular one stays
fn demote_local_peer(nodes: &mut Vec<PeerTrackNode>, peer: &Peer) {
    let regular = NodeId::for_peer_track(peer, None);
    nodes.retain(|node| node.peer.peer_id != peer.peer_id || node.id == regular);

    if let Some(node) = nodes.iter_mut().find(|node| node.id == regular) {
        node.peer = peer.clone();
        node.track = None;
        node.is_degraded = false;
    }
}
