//! AMQP subscription loop
//!
//! Deliveries are auto-acknowledged: a message whose handling fails is
//! logged and dropped, never redelivered.

use std::future::Future;

use futures::StreamExt;
use lapin::options::BasicConsumeOptions;
use lapin::types::FieldTable;
use lapin::{Connection, ConnectionProperties};
use openmusic_server::queue::declare_export_queue;

use crate::listener::ExportListener;
use crate::mailer::MailSender;
use crate::ConsumerError;

const CONSUMER_TAG: &str = "openmusic-export";

pub struct ExportConsumer {
    amqp_url: String,
    queue: String,
}

impl ExportConsumer {
    pub fn new(amqp_url: impl Into<String>, queue: impl Into<String>) -> Self {
        Self {
            amqp_url: amqp_url.into(),
            queue: queue.into(),
        }
    }

    /// Consume until `shutdown` resolves or the broker closes the stream.
    pub async fn run<M, F>(
        &self,
        listener: &ExportListener<M>,
        shutdown: F,
    ) -> Result<(), ConsumerError>
    where
        M: MailSender,
        F: Future<Output = ()>,
    {
        let connection =
            Connection::connect(&self.amqp_url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;
        declare_export_queue(&channel, &self.queue).await?;

        let mut deliveries = channel
            .basic_consume(
                &self.queue,
                CONSUMER_TAG,
                BasicConsumeOptions {
                    no_ack: true,
                    ..BasicConsumeOptions::default()
                },
                FieldTable::default(),
            )
            .await?;
        tracing::info!(queue = %self.queue, "Waiting for export requests");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Stopping export consumer");
                    break;
                }
                delivery = deliveries.next() => match delivery {
                    Some(Ok(delivery)) => {
                        if let Err(e) = listener.handle(&delivery.data).await {
                            tracing::error!(error = %e, "Export failed, message dropped");
                        }
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => {
                        tracing::warn!("Broker closed the export stream");
                        break;
                    }
                },
            }
        }

        if let Err(e) = connection.close(200, "consumer shutdown").await {
            tracing::debug!(error = %e, "Connection already closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SmtpMailer;
    use openmusic_core::config::MailConfig;

    #[tokio::test]
    async fn unreachable_broker_is_amqp_error() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/openmusic_unused")
            .unwrap();
        let mailer = SmtpMailer::from_config(&MailConfig {
            from: Some("noreply@openmusic.test".into()),
            ..MailConfig::default()
        })
        .unwrap();
        let listener = ExportListener::new(pool, mailer);

        let consumer = ExportConsumer::new("amqp://127.0.0.1:1", "export:playlists");
        let err = consumer
            .run(&listener, std::future::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, ConsumerError::Amqp(_)));
    }
}
