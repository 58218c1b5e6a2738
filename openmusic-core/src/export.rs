//! Playlist export queue message
//!
//! Published by the API on `POST /export/playlists/{id}` and consumed by the
//! export worker. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Default queue name for export requests
pub const DEFAULT_EXPORT_QUEUE: &str = "export:playlists";

/// Song entry inside an exported playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedSong {
    pub id: String,
    pub title: String,
    pub performer: String,
}

/// Playlist snapshot taken when the export was requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPlaylist {
    pub id: String,
    pub name: String,
    pub songs: Vec<ExportedSong>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMessage {
    pub playlist: ExportedPlaylist,
    pub target_email: String,
}

/// Body of the `playlist.json` attachment
#[derive(Serialize)]
struct Attachment<'a> {
    playlist: &'a ExportedPlaylist,
}

impl ExportMessage {
    pub fn new(playlist: ExportedPlaylist, target_email: impl Into<String>) -> Self {
        Self {
            playlist,
            target_email: target_email.into(),
        }
    }

    /// Serialize for publishing.
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| CoreError::json("export message", e))
    }

    /// Parse a payload received from the queue.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).map_err(|e| CoreError::json("export message", e))
    }
}

impl ExportedPlaylist {
    /// Render the attachment sent to the requesting user.
    pub fn attachment_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&Attachment { playlist: self })
            .map_err(|e| CoreError::json("export attachment", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExportedPlaylist {
        ExportedPlaylist {
            id: "playlist-1".into(),
            name: "Road trip".into(),
            songs: vec![ExportedSong {
                id: "song-1".into(),
                title: "Fix You".into(),
                performer: "Coldplay".into(),
            }],
        }
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let message = ExportMessage::new(sample(), "me@example.com");
        let value: serde_json::Value =
            serde_json::from_slice(&message.to_payload().unwrap()).unwrap();

        assert_eq!(value["targetEmail"], "me@example.com");
        assert_eq!(value["playlist"]["songs"][0]["performer"], "Coldplay");
    }

    #[test]
    fn parses_producer_payload() {
        let raw = br#"{"playlist":{"id":"playlist-1","name":"Road trip","songs":[]},"targetEmail":"a@b.co"}"#;
        let message = ExportMessage::from_payload(raw).unwrap();
        assert_eq!(message.target_email, "a@b.co");
        assert!(message.playlist.songs.is_empty());
    }

    #[test]
    fn rejects_garbage_payload() {
        let err = ExportMessage::from_payload(b"not json").unwrap_err();
        assert!(err.to_string().contains("export message"));
    }

    #[test]
    fn attachment_wraps_playlist() {
        let json = sample().attachment_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["playlist"]["name"], "Road trip");
        assert_eq!(value["playlist"]["songs"].as_array().unwrap().len(), 1);
    }
}
