//! SMTP delivery of exported playlists

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use openmusic_core::config::MailConfig;
use openmusic_core::ExportedPlaylist;

use crate::ConsumerError;

pub const EXPORT_SUBJECT: &str = "Playlist export";
pub const ATTACHMENT_NAME: &str = "playlist.json";

#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send_export(
        &self,
        target_email: &str,
        playlist: &ExportedPlaylist,
    ) -> Result<(), ConsumerError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a transport that upgrades to TLS when the server offers it.
    pub fn from_config(config: &MailConfig) -> Result<Self, ConsumerError> {
        let from: Mailbox = config.sender()?.parse()?;
        let tls = TlsParameters::new(config.host.clone())?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(Tls::Opportunistic(tls));
        if let (Some(user), Some(password)) = (&config.user, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        tracing::info!(host = %config.host, port = config.port, "SMTP mailer configured");
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send_export(
        &self,
        target_email: &str,
        playlist: &ExportedPlaylist,
    ) -> Result<(), ConsumerError> {
        let email = build_export_email(self.from.clone(), target_email, playlist)?;
        self.transport.send(email).await?;
        Ok(())
    }
}

/// Email with a short text part and the playlist as a JSON attachment.
pub fn build_export_email(
    from: Mailbox,
    target_email: &str,
    playlist: &ExportedPlaylist,
) -> Result<Message, ConsumerError> {
    let attachment = playlist.attachment_json()?;
    let text = format!(
        "Attached is the export of playlist \"{}\" ({} songs).",
        playlist.name,
        playlist.songs.len()
    );

    let email = Message::builder()
        .from(from)
        .to(target_email.parse()?)
        .subject(EXPORT_SUBJECT)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(text))
                .singlepart(
                    Attachment::new(ATTACHMENT_NAME.to_string())
                        .body(attachment, json_content_type()),
                ),
        )?;

    Ok(email)
}

fn json_content_type() -> ContentType {
    ContentType::parse("application/json").unwrap_or(ContentType::TEXT_PLAIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openmusic_core::ExportedSong;

    fn playlist() -> ExportedPlaylist {
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
    fn email_carries_subject_and_attachment() {
        let from: Mailbox = "OpenMusic <noreply@openmusic.test>".parse().unwrap();
        let email = build_export_email(from, "listener@example.com", &playlist()).unwrap();

        let raw = String::from_utf8(email.formatted()).unwrap();
        assert!(raw.contains("Subject: Playlist export"));
        assert!(raw.contains("To: listener@example.com"));
        assert!(raw.contains(ATTACHMENT_NAME));
        assert!(raw.contains("application/json"));
    }

    #[test]
    fn bad_target_is_address_error() {
        let from: Mailbox = "noreply@openmusic.test".parse().unwrap();
        let err = build_export_email(from, "not an address", &playlist()).unwrap_err();
        assert!(matches!(err, ConsumerError::Address(_)));
    }

    #[test]
    fn mailer_requires_sender() {
        let config = MailConfig::default();
        assert!(matches!(
            SmtpMailer::from_config(&config),
            Err(ConsumerError::Core(_))
        ));
    }
}
