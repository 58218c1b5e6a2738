//! Handling of a single export request
//!
//! The playlist is read again from the database so the mail reflects its
//! current songs. When that read fails (playlist deleted in the meantime, or
//! database unavailable) the snapshot carried by the message is sent instead.

use openmusic_core::{ExportMessage, ExportedPlaylist};
use openmusic_server::db::{PlaylistRepo, PlaylistSongRepo};
use sqlx::PgPool;

use crate::mailer::MailSender;
use crate::ConsumerError;

pub struct ExportListener<M> {
    pool: PgPool,
    mailer: M,
}

impl<M: MailSender> ExportListener<M> {
    pub fn new(pool: PgPool, mailer: M) -> Self {
        Self { pool, mailer }
    }

    /// Decode one queue payload and mail the playlist it names.
    pub async fn handle(&self, payload: &[u8]) -> Result<(), ConsumerError> {
        let message = ExportMessage::from_payload(payload)?;
        let playlist = self.current_playlist(&message.playlist).await;

        self.mailer
            .send_export(&message.target_email, &playlist)
            .await?;

        tracing::info!(
            playlist_id = %playlist.id,
            songs = playlist.songs.len(),
            "Playlist export sent"
        );
        Ok(())
    }

    async fn current_playlist(&self, snapshot: &ExportedPlaylist) -> ExportedPlaylist {
        let playlist = match PlaylistRepo::new(&self.pool).get(&snapshot.id).await {
            Ok(playlist) => playlist,
            Err(e) => {
                tracing::warn!(
                    playlist_id = %snapshot.id,
                    error = %e,
                    "Playlist lookup failed, sending queued snapshot"
                );
                return snapshot.clone();
            }
        };

        match PlaylistSongRepo::new(&self.pool).list(&snapshot.id).await {
            Ok(songs) => ExportedPlaylist {
                id: playlist.id,
                name: playlist.name,
                songs: songs.into_iter().map(Into::into).collect(),
            },
            Err(e) => {
                tracing::warn!(
                    playlist_id = %snapshot.id,
                    error = %e,
                    "Song lookup failed, sending queued snapshot"
                );
                snapshot.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use openmusic_core::ExportedSong;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, ExportedPlaylist)>>,
    }

    #[async_trait]
    impl MailSender for RecordingMailer {
        async fn send_export(
            &self,
            target_email: &str,
            playlist: &ExportedPlaylist,
        ) -> Result<(), ConsumerError> {
            self.sent
                .lock()
                .unwrap()
                .push((target_email.to_string(), playlist.clone()));
            Ok(())
        }
    }

    fn unreachable_pool() -> PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://127.0.0.1:1/openmusic_unused")
            .unwrap()
    }

    fn message() -> ExportMessage {
        ExportMessage::new(
            ExportedPlaylist {
                id: "playlist-1".into(),
                name: "Road trip".into(),
                songs: vec![ExportedSong {
                    id: "song-1".into(),
                    title: "Fix You".into(),
                    performer: "Coldplay".into(),
                }],
            },
            "listener@example.com",
        )
    }

    #[tokio::test]
    async fn falls_back_to_snapshot() {
        let listener = ExportListener::new(unreachable_pool(), RecordingMailer::default());

        let payload = message().to_payload().unwrap();
        listener.handle(&payload).await.unwrap();

        let sent = listener.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "listener@example.com");
        assert_eq!(sent[0].1, message().playlist);
    }

    #[tokio::test]
    async fn garbage_payload_is_rejected() {
        let listener = ExportListener::new(unreachable_pool(), RecordingMailer::default());

        let err = listener.handle(b"{\"playlist\": 3}").await.unwrap_err();
        assert!(matches!(err, ConsumerError::Core(_)));
        assert!(listener.mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn sends_current_songs() {
        use openmusic_server::db::{NewSong, SongRepo, UserRepo};

        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = openmusic_server::db::create_pool(&url).await.unwrap();
        openmusic_server::db::migrations::run(&pool).await.unwrap();

        let owner = UserRepo::new(&pool)
            .create(&openmusic_core::generate_id("owner"), "hash", "Owner")
            .await
            .unwrap();
        let playlist_id = PlaylistRepo::new(&pool).create("Live", &owner).await.unwrap();
        let song_id = SongRepo::new(&pool)
            .create(&NewSong {
                title: "Clocks".into(),
                year: 2002,
                genre: "Rock".into(),
                performer: "Coldplay".into(),
                duration: None,
                album_id: None,
            })
            .await
            .unwrap();
        PlaylistSongRepo::new(&pool)
            .add(&playlist_id, &song_id)
            .await
            .unwrap();

        let mut queued = message();
        queued.playlist.id = playlist_id.clone();

        let listener = ExportListener::new(pool, RecordingMailer::default());
        listener.handle(&queued.to_payload().unwrap()).await.unwrap();

        let sent = listener.mailer.sent.lock().unwrap();
        assert_eq!(sent[0].1.name, "Live");
        assert_eq!(sent[0].1.songs[0].id, song_id);
    }
}
