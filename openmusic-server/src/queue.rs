//! Export request producer
//!
//! Messages go to a durable AMQP queue with persistent delivery mode so a
//! broker restart does not drop pending exports.

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use openmusic_core::{CoreError, ExportMessage};
use tokio::sync::Mutex;

/// AMQP delivery mode for messages that survive a broker restart
const PERSISTENT: u8 = 2;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("amqp error: {0}")]
    Amqp(#[from] lapin::Error),

    #[error(transparent)]
    Encode(#[from] CoreError),
}

#[async_trait]
pub trait ExportPublisher: Send + Sync {
    async fn publish(&self, message: &ExportMessage) -> Result<(), PublishError>;
}

/// Declare the export queue as durable on `channel`.
pub async fn declare_export_queue(channel: &Channel, queue: &str) -> Result<(), lapin::Error> {
    channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await?;
    Ok(())
}

/// Publisher that connects on first use and reconnects when the channel drops.
pub struct AmqpPublisher {
    amqp_url: String,
    queue: String,
    channel: Mutex<Option<(Connection, Channel)>>,
}

impl AmqpPublisher {
    pub fn new(amqp_url: impl Into<String>, queue: impl Into<String>) -> Self {
        Self {
            amqp_url: amqp_url.into(),
            queue: queue.into(),
            channel: Mutex::new(None),
        }
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    async fn open_channel(&self) -> Result<(Connection, Channel), lapin::Error> {
        let connection =
            Connection::connect(&self.amqp_url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;
        declare_export_queue(&channel, &self.queue).await?;
        tracing::info!(queue = %self.queue, "Connected export publisher");
        Ok((connection, channel))
    }
}

#[async_trait]
impl ExportPublisher for AmqpPublisher {
    async fn publish(&self, message: &ExportMessage) -> Result<(), PublishError> {
        let payload = message.to_payload()?;

        let mut guard = self.channel.lock().await;
        let live = match guard.take() {
            Some((connection, channel)) if channel.status().connected() => (connection, channel),
            _ => self.open_channel().await?,
        };
        let (_, channel) = guard.insert(live);

        channel
            .basic_publish(
                "",
                &self.queue,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default()
                    .with_delivery_mode(PERSISTENT)
                    .with_content_type("application/json".into()),
            )
            .await?
            .await?;

        tracing::info!(
            queue = %self.queue,
            playlist_id = %message.playlist.id,
            "Export request published"
        );
        Ok(())
    }
}

/// Publisher that keeps messages in memory, for tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingPublisher {
    pub messages: std::sync::Mutex<Vec<ExportMessage>>,
}

#[cfg(test)]
#[async_trait]
impl ExportPublisher for RecordingPublisher {
    async fn publish(&self, message: &ExportMessage) -> Result<(), PublishError> {
        self.messages
            .lock()
            .expect("recording publisher poisoned")
            .push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openmusic_core::ExportedPlaylist;

    fn message() -> ExportMessage {
        ExportMessage::new(
            ExportedPlaylist {
                id: "playlist-1".into(),
                name: "Focus".into(),
                songs: vec![],
            },
            "me@example.com",
        )
    }

    #[tokio::test]
    async fn recording_publisher_keeps_messages() {
        let publisher = RecordingPublisher::default();
        publisher.publish(&message()).await.unwrap();
        assert_eq!(publisher.messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_broker_is_amqp_error() {
        let publisher = AmqpPublisher::new("amqp://127.0.0.1:1", "export:playlists");
        let err = publisher.publish(&message()).await.unwrap_err();
        assert!(matches!(err, PublishError::Amqp(_)));
    }

    #[tokio::test]
    #[ignore = "requires rabbitmq"]
    async fn publishes_to_broker() {
        let url = std::env::var("RABBITMQ_SERVER").unwrap_or_else(|_| "amqp://localhost".into());
        let publisher = AmqpPublisher::new(url, "export:playlists:test");
        publisher.publish(&message()).await.unwrap();
    }
}
