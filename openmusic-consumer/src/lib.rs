//! openmusic-consumer: the playlist export worker
//!
//! Reads export requests from the durable queue the API publishes to, looks
//! the playlist up again and mails it to the requester as `playlist.json`.
//!
//! - [`consumer`]: AMQP subscription loop
//! - [`listener`]: per-message handling
//! - [`mailer`]: SMTP delivery

pub mod consumer;
pub mod error;
pub mod listener;
pub mod mailer;

pub use consumer::ExportConsumer;
pub use error::ConsumerError;
pub use listener::ExportListener;
pub use mailer::{MailSender, SmtpMailer};
