//! Error types for the tile reconciler
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


use thiserror::Error;

use crate::node::NodeId;

/// Result type for reconciler operations
pub type ReconcilerResult<T> = Result<T, ReconcilerError>;

/// Errors surfaced by the session driver and view registry
///
/// The reconciler itself never fails; malformed events are dropped.
#[derive(Error, Debug)]
pub enum ReconcilerError {
    /// Event listeners could not be registered with the bridge
    #[error("Listener registration failed: {0}")]
    ListenerRegistration(String),

    /// The bridge rejected the join request
    #[error("Join failed: {0}")]
    Join(String),

    /// The bridge rejected the leave request
    #[error("Leave failed: {0}")]
    Leave(String),

    /// Re-reading the local peer snapshot failed
    #[error("Local peer refresh failed: {0}")]
    PeerRefresh(String),

    /// A view handle was attached to a node that doesn't exist
    #[error("Unknown node: {node_id}")]
    UnknownNode { node_id: NodeId },

    /// An event from the bridge could not be decoded
    #[error("Event decode error: {0}")]
    Decode(#[from] roomkit_types::RoomKitError),

    /// I/O error reading a recorded event log
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
