//! Tile state container
//!
//! Holds the current node list, applies events as atomic transitions and
//! lets renderers subscribe to changes.
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


use roomkit_types::RoomEvent;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::debug;

use crate::error::ReconcilerResult;
use crate::node::{NodeId, PeerTrackNode};
use crate::reconciler::{reconcile, Reconciliation};
use crate::view_registry::ViewRegistry;

/// Opaque tag of a native video view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub u64);

/// Node list plus the views bound to it
#[derive(Debug)]
pub struct TileStore {
    nodes: watch::Sender<Vec<PeerTrackNode>>,
    views: Mutex<ViewRegistry<ViewHandle>>,
}

impl TileStore {
    pub fn new() -> Self {
        TileStore {
            nodes: watch::Sender::new(Vec::new()),
            views: Mutex::new(ViewRegistry::new()),
        }
    }

    /// Apply one event
    ///
    /// Subscribers are only woken when the node list actually changed.
    pub fn apply(&self, event: &RoomEvent) -> Reconciliation {
        self.apply_while(event, || true).unwrap_or_else(|| Reconciliation {
            nodes: self.snapshot(),
            refresh_local_peer: false,
        })
    }

    /// Apply one event if `active` still holds
    ///
    /// `active` is evaluated under the same lock as the write, so a caller
    /// that flips its flag before [`TileStore::reset`] can never have a
    /// transition land after the reset. Returns `None` when skipped.
    pub fn apply_while<F>(&self, event: &RoomEvent, active: F) -> Option<Reconciliation>
    where
        F: FnOnce() -> bool,
    {
        let mut applied = false;
        let mut refresh_local_peer = false;

        let changed = self.nodes.send_if_modified(|nodes| {
            if !active() {
                return false;
            }
            applied = true;
            let result = reconcile(nodes, event);
            refresh_local_peer = result.refresh_local_peer;
            if result.nodes == *nodes {
                return false;
            }
            *nodes = result.nodes;
            true
        });

        if !applied {
            return None;
        }

        if changed {
            let nodes = self.nodes.borrow();
            let evicted = self.views().sync(&nodes);
            if !evicted.is_empty() {
                debug!(evicted = evicted.len(), "Released views of removed tiles");
            }
        }

        Some(Reconciliation {
            nodes: self.snapshot(),
            refresh_local_peer,
        })
    }

    /// Copy of the current node list
    pub fn snapshot(&self) -> Vec<PeerTrackNode> {
        self.nodes.borrow().clone()
    }

    /// Receiver that observes every committed node list
    pub fn subscribe(&self) -> watch::Receiver<Vec<PeerTrackNode>> {
        self.nodes.subscribe()
    }

    /// Run a selector against the current node list
    pub fn select<T>(&self, selector: impl FnOnce(&[PeerTrackNode]) -> T) -> T {
        selector(&self.nodes.borrow())
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Bind a native view to a tile
    pub fn attach_view(&self, node_id: &NodeId, handle: ViewHandle) -> ReconcilerResult<Option<ViewHandle>> {
        self.views().attach(node_id, handle)
    }

    pub fn detach_view(&self, node_id: &NodeId) -> Option<ViewHandle> {
        self.views().detach(node_id)
    }

    pub fn view(&self, node_id: &NodeId) -> Option<ViewHandle> {
        self.views().get(node_id).copied()
    }

    /// Drop all tiles and views
    pub fn reset(&self) {
        self.nodes.send_if_modified(|nodes| {
            let had_nodes = !nodes.is_empty();
            nodes.clear();
            had_nodes
        });
        let released = self.views().clear();
        debug!(released = released.len(), "Tile store reset");
    }

    fn views(&self) -> MutexGuard<'_, ViewRegistry<ViewHandle>> {
        self.views.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for TileStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Selectors
// ============================================================================

/// The local peer's regular tile
pub fn local_node(nodes: &[PeerTrackNode]) -> Option<&PeerTrackNode> {
    nodes
        .iter()
        .find(|node| node.peer.is_local && !node.is_auxiliary())
}

/// All tiles of one peer, in display order
pub fn nodes_for_peer<'a>(nodes: &'a [PeerTrackNode], peer_id: &str) -> Vec<&'a PeerTrackNode> {
    nodes.iter().filter(|node| node.peer_id() == peer_id).collect()
}

/// Screen share and other auxiliary tiles
pub fn screen_share_nodes(nodes: &[PeerTrackNode]) -> Vec<&PeerTrackNode> {
    nodes.iter().filter(|node| node.is_auxiliary()).collect()
}

pub fn find_node<'a>(nodes: &'a [PeerTrackNode], node_id: &NodeId) -> Option<&'a PeerTrackNode> {
    nodes.iter().find(|node| &node.id == node_id)
}
