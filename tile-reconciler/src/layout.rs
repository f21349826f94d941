//! Tile layout: display ordering and pagination
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


use crate::node::PeerTrackNode;

/// Auxiliary tiles first, everything else in reconciler order
pub fn order_for_display(nodes: &[PeerTrackNode]) -> Vec<&PeerTrackNode> {
    let (mut ordered, regular): (Vec<_>, Vec<_>) =
        nodes.iter().partition(|node| node.is_auxiliary());
    ordered.extend(regular);
    ordered
}

/// Split tiles into pages of at most `tiles_per_page`
///
/// A page size of zero is treated as one.
pub fn paginate<T>(tiles: &[T], tiles_per_page: usize) -> Vec<&[T]> {
    tiles.chunks(tiles_per_page.max(1)).collect()
}

/// Display-ordered tiles grouped into pages
pub fn pages(nodes: &[PeerTrackNode], tiles_per_page: usize) -> Vec<Vec<&PeerTrackNode>> {
    let ordered = order_for_display(nodes);
    paginate(&ordered, tiles_per_page)
        .into_iter()
        .map(|page| page.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomkit_types::{Peer, Track, TrackKind, TrackSource};

    fn tile(peer_id: &str, source: TrackSource) -> PeerTrackNode {
        PeerTrackNode::new(
            Peer::remote(peer_id, peer_id),
            Some(Track::new(format!("{}-{}", peer_id, source), TrackKind::Video, source)),
        )
    }

    #[test]
    fn test_screen_shares_come_first() {
        let nodes = vec![
            tile("a", TrackSource::Regular),
            tile("b", TrackSource::Regular),
            tile("b", TrackSource::Screen),
            tile("c", TrackSource::Regular),
        ];

        let ordered: Vec<_> = order_for_display(&nodes)
            .iter()
            .map(|n| n.id.to_string())
            .collect();
        assert_eq!(
            ordered,
            vec!["b:screen:b-screen", "a:regular", "b:regular", "c:regular"]
        );
    }

    #[test]
    fn test_paginate() {
        let items = [1, 2, 3, 4, 5];
        let pages = paginate(&items, 2);
        assert_eq!(pages, vec![&[1, 2][..], &[3, 4][..], &[5][..]]);

        assert_eq!(paginate(&items, 0).len(), 5);
        assert!(paginate::<u8>(&[], 3).is_empty());
    }

    #[test]
    fn test_pages() {
        let nodes: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|p| tile(p, TrackSource::Regular))
            .collect();
        let pages = pages(&nodes, 2);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1][0].peer_id(), "c");
    }
}
