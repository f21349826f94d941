//! Tile Reconciler
//!
//! This crate turns the peer and track updates emitted by a conferencing
//! SDK into the ordered list of video tiles a UI renders:
//! - Pure reconciliation of room events into peer-track nodes
//! - A state container with change subscriptions and selectors
//! - A registry binding native views to tiles
//! - Display ordering and pagination
//! - An async session driver (join, event loop, leave)
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


pub mod error;
pub mod node;
pub mod reconciler;
pub mod store;
pub mod view_registry;
pub mod layout;
pub mod gateway;
pub mod session;

// Re-export main types
pub use error::{ReconcilerError, ReconcilerResult};
pub use node::{NodeId, PeerTrackNode, TrackSlot};
pub use reconciler::{reconcile, Reconciliation};
pub use store::{
    find_node, local_node, nodes_for_peer, screen_share_nodes, TileStore, ViewHandle,
};
pub use view_registry::ViewRegistry;
pub use layout::{order_for_display, pages, paginate};
pub use gateway::{EventStream, JoinRequest, RecordedGateway, RoomGateway};
pub use session::Session;
