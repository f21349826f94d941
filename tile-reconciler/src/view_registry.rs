//! Registry of native view handles keyed by node id
//!
//! Handles can only be attached to live nodes and are evicted when their
//! node is destroyed.
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


use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::{ReconcilerError, ReconcilerResult};
use crate::node::{NodeId, PeerTrackNode};

/// View handle registry
#[derive(Debug)]
pub struct ViewRegistry<H> {
    /// Handles by node
    views: HashMap<NodeId, H>,
    /// Nodes currently present in the tile list
    live: HashSet<NodeId>,
}

impl<H> ViewRegistry<H> {
    pub fn new() -> Self {
        ViewRegistry {
            views: HashMap::new(),
            live: HashSet::new(),
        }
    }

    /// Bind a handle to a live node, returning the handle it replaces
    pub fn attach(&mut self, node_id: &NodeId, handle: H) -> ReconcilerResult<Option<H>> {
        if !self.live.contains(node_id) {
            return Err(ReconcilerError::UnknownNode {
                node_id: node_id.clone(),
            });
        }
        Ok(self.views.insert(node_id.clone(), handle))
    }

    /// Unbind the handle of a node
    pub fn detach(&mut self, node_id: &NodeId) -> Option<H> {
        self.views.remove(node_id)
    }

    pub fn get(&self, node_id: &NodeId) -> Option<&H> {
        self.views.get(node_id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Track the current node list and evict handles of destroyed nodes
    pub fn sync(&mut self, nodes: &[PeerTrackNode]) -> Vec<(NodeId, H)> {
        self.live = nodes.iter().map(|node| node.id.clone()).collect();

        let stale: Vec<NodeId> = self
            .views
            .keys()
            .filter(|id| !self.live.contains(*id))
            .cloned()
            .collect();

        stale
            .into_iter()
            .filter_map(|id| {
                let handle = self.views.remove(&id)?;
                debug!(node_id = %id, "Evicting view of destroyed node");
                Some((id, handle))
            })
            .collect()
    }

    /// Drop everything, returning the handles that were bound
    pub fn clear(&mut self) -> Vec<(NodeId, H)> {
        self.live.clear();
        self.views.drain().collect()
    }
}

impl<H> Default for ViewRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomkit_types::{Peer, Track, TrackKind, TrackSource};

    fn node(peer_id: &str) -> PeerTrackNode {
        PeerTrackNode::new(
            Peer::remote(peer_id, peer_id),
            Some(Track::new(format!("v-{}", peer_id), TrackKind::Video, TrackSource::Regular)),
        )
    }

    #[test]
    fn test_attach_requires_live_node() {
        let mut registry: ViewRegistry<u32> = ViewRegistry::new();
        let a = node("a");

        assert!(matches!(
            registry.attach(&a.id, 1),
            Err(ReconcilerError::UnknownNode { .. })
        ));

        registry.sync(std::slice::from_ref(&a));
        assert_eq!(registry.attach(&a.id, 1).unwrap(), None);
        assert_eq!(registry.attach(&a.id, 2).unwrap(), Some(1));
        assert_eq!(registry.get(&a.id), Some(&2));
    }

    #[test]
    fn test_sync_evicts_destroyed_nodes() {
        let mut registry = ViewRegistry::new();
        let a = node("a");
        let b = node("b");

        registry.sync(&[a.clone(), b.clone()]);
        registry.attach(&a.id, "view-a").unwrap();
        registry.attach(&b.id, "view-b").unwrap();

        let evicted = registry.sync(std::slice::from_ref(&b));
        assert_eq!(evicted, vec![(a.id.clone(), "view-a")]);
        assert_eq!(registry.len(), 1);
        assert!(registry.attach(&a.id, "again").is_err());
    }

    #[test]
    fn test_detach_and_clear() {
        let mut registry = ViewRegistry::new();
        let a = node("a");
        registry.sync(std::slice::from_ref(&a));
        registry.attach(&a.id, 7u8).unwrap();

        assert_eq!(registry.detach(&a.id), Some(7));
        assert!(registry.is_empty());

        registry.attach(&a.id, 8).unwrap();
        assert_eq!(registry.clear().len(), 1);
        assert!(registry.attach(&a.id, 9).is_err());
    }
}
