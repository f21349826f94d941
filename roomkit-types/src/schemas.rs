//! Peer, track, role and room snapshots read from the native bridge
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
use std::fmt;

// ============================================================================
// Tracks
// ============================================================================

/// Media kind of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Audio,
    Video,
}

/// Where a track originates from
///
/// Everything other than `Regular` is an auxiliary source and gets a tile of
/// its own. On the wire the source is a bare string tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum TrackSource {
    /// Camera or microphone
    #[default]
    Regular,
    /// Screen share
    Screen,
    /// Video produced by a plugin (whiteboard, virtual background preview, ...)
    Plugin,
    /// Any source tag the bridge reports that we don't know about
    Other(String),
}

impl From<String> for TrackSource {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "regular" => TrackSource::Regular,
            "screen" => TrackSource::Screen,
            "plugin" => TrackSource::Plugin,
            _ => TrackSource::Other(tag),
        }
    }
}

impl From<TrackSource> for String {
    fn from(source: TrackSource) -> Self {
        match source {
            TrackSource::Other(tag) => tag,
            known => known.to_string(),
        }
    }
}

impl TrackSource {
    pub fn is_regular(&self) -> bool {
        matches!(self, TrackSource::Regular)
    }
}

impl fmt::Display for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackSource::Regular => f.write_str("regular"),
            TrackSource::Screen => f.write_str("screen"),
            TrackSource::Plugin => f.write_str("plugin"),
            TrackSource::Other(name) => f.write_str(name),
        }
    }
}

/// Snapshot of a media track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub track_id: String,
    pub kind: TrackKind,
    #[serde(default)]
    pub source: TrackSource,
    #[serde(default)]
    pub is_mute: bool,
}

impl Track {
    /// Create an unmuted track
    pub fn new(track_id: impl Into<String>, kind: TrackKind, source: TrackSource) -> Self {
        Self {
            track_id: track_id.into(),
            kind,
            source,
            is_mute: false,
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == TrackKind::Video
    }

    pub fn is_regular(&self) -> bool {
        self.source.is_regular()
    }

    /// Same track with a different mute flag
    pub fn with_mute(mut self, is_mute: bool) -> Self {
        self.is_mute = is_mute;
        self
    }
}

// ============================================================================
// Peers
// ============================================================================

/// Publish permissions attached to a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PublishSettings {
    /// Track kinds the role may publish ("audio", "video", "screen")
    #[serde(default)]
    pub allowed: Option<Vec<String>>,
}

/// Role a peer currently holds in the room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub publish_settings: Option<PublishSettings>,
}

impl Role {
    /// Role that may publish the given track kinds
    pub fn publisher(name: impl Into<String>, allowed: &[&str]) -> Self {
        Self {
            name: name.into(),
            publish_settings: Some(PublishSettings {
                allowed: Some(allowed.iter().map(|s| s.to_string()).collect()),
            }),
        }
    }

    /// Role with no publish permissions at all
    pub fn viewer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            publish_settings: None,
        }
    }

    /// False when the publish permission set is missing or empty
    pub fn can_publish(&self) -> bool {
        self.publish_settings
            .as_ref()
            .and_then(|settings| settings.allowed.as_ref())
            .is_some_and(|allowed| !allowed.is_empty())
    }
}

/// Connection quality as scored by the native SDK (-1 unknown, 0..=5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkQuality {
    pub downlink_score: i32,
}

/// Snapshot of a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub peer_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_local: bool,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub network_quality: Option<NetworkQuality>,
    #[serde(default)]
    pub audio_track: Option<Track>,
    #[serde(default)]
    pub video_track: Option<Track>,
    #[serde(default)]
    pub auxiliary_tracks: Vec<Track>,
}

impl Peer {
    /// Remote peer with no tracks
    pub fn remote(peer_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            peer_id: peer_id.into(),
            name: name.into(),
            is_local: false,
            role: None,
            metadata: None,
            network_quality: None,
            audio_track: None,
            video_track: None,
            auxiliary_tracks: Vec::new(),
        }
    }

    /// Local peer with no tracks
    pub fn local(peer_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_local: true,
            ..Self::remote(peer_id, name)
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_audio(mut self, track: Track) -> Self {
        self.audio_track = Some(track);
        self
    }

    pub fn with_video(mut self, track: Track) -> Self {
        self.video_track = Some(track);
        self
    }

    pub fn without_video(mut self) -> Self {
        self.video_track = None;
        self
    }

    pub fn without_audio(mut self) -> Self {
        self.audio_track = None;
        self
    }

    /// True once neither a regular audio nor a regular video track is attached
    pub fn has_no_regular_tracks(&self) -> bool {
        self.audio_track.is_none() && self.video_track.is_none()
    }
}

// ============================================================================
// Room
// ============================================================================

/// Snapshot of the room delivered with a successful join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub room_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub local_peer: Option<Peer>,
    #[serde(default)]
    pub peers: Vec<Peer>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

impl Room {
    pub fn new(room_id: impl Into<String>, local_peer: Option<Peer>) -> Self {
        Self {
            room_id: room_id.into(),
            name: String::new(),
            local_peer,
            peers: Vec::new(),
            started_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_without_settings_cannot_publish() {
        assert!(!Role::viewer("viewer").can_publish());

        let empty = Role {
            name: "listener".to_string(),
            publish_settings: Some(PublishSettings { allowed: Some(vec![]) }),
        };
        assert!(!empty.can_publish());

        let undefined = Role {
            name: "listener".to_string(),
            publish_settings: Some(PublishSettings { allowed: None }),
        };
        assert!(!undefined.can_publish());
    }

    #[test]
    fn test_role_with_permissions_can_publish() {
        assert!(Role::publisher("host", &["audio", "video"]).can_publish());
    }

    #[test]
    fn test_track_source_defaults_to_regular() {
        let json = r#"{"track_id":"t1","kind":"video"}"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.source, TrackSource::Regular);
        assert!(!track.is_mute);
        assert!(track.is_video());
    }

    #[test]
    fn test_unknown_source_tag_round_trips() {
        let json = r#"{"track_id":"t1","kind":"video","source":"whiteboard"}"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.source, TrackSource::Other("whiteboard".to_string()));
        assert!(!track.is_regular());

        let encoded = serde_json::to_value(&track).unwrap();
        assert_eq!(encoded["source"], "whiteboard");
    }

    #[test]
    fn test_known_source_tags() {
        for (tag, source) in [
            ("regular", TrackSource::Regular),
            ("screen", TrackSource::Screen),
            ("plugin", TrackSource::Plugin),
        ] {
            assert_eq!(TrackSource::from(tag.to_string()), source);
            assert_eq!(serde_json::to_value(&source).unwrap(), tag);
        }
    }

    #[test]
    fn test_peer_regular_tracks() {
        let peer = Peer::remote("p1", "Ada")
            .with_audio(Track::new("a1", TrackKind::Audio, TrackSource::Regular));
        assert!(!peer.has_no_regular_tracks());
        assert!(peer.without_audio().has_no_regular_tracks());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(TrackSource::Screen.to_string(), "screen");
        assert_eq!(TrackSource::Other("whiteboard".into()).to_string(), "whiteboard");
    }
}
