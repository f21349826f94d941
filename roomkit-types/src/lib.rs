//! RoomKit Types
//!
//! Value shapes delivered by the native conferencing bridge (peers, tracks,
//! roles, rooms) and the closed set of room events consumed by the tile
//! reconciler.

pub mod events;
pub mod schemas;
pub mod error;

pub use events::*;
pub use schemas::*;
pub use error::*;
