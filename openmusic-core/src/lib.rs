//! openmusic-core: pieces shared by the API server and the export consumer.
//!
//! - [`config`]: layered configuration (defaults, TOML file, environment)
//! - [`export`]: the JSON message carried on the playlist export queue
//! - [`ids`]: prefixed record identifiers

pub mod config;
pub mod error;
pub mod export;
pub mod ids;

pub use config::OpenMusicConfig;
pub use error::{CoreError, Result};
pub use export::{ExportMessage, ExportedPlaylist, ExportedSong};
pub use ids::generate_id;
