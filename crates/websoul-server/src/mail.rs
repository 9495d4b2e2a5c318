//! Mail delivery.
//!
//! [`MailTransport`] is the seam the inquiry route sends through. The
//! production implementation, [`SmtpMailTransport`], uses `lettre`'s async
//! SMTP client: implicit TLS when `secure` is set, opportunistic STARTTLS
//! otherwise, and login only when a user is configured.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{debug, info};
use websoul_settings::SmtpSettings;

use crate::inquiry::OutgoingMail;

/// Errors delivering a mail.
#[derive(Debug, Error)]
pub enum MailError {
    /// Neither `SMTP_FROM` nor `SMTP_USER` is set.
    #[error("no sender address configured")]
    NoSender,
    /// A sender or recipient address did not parse.
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    /// The message could not be assembled.
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    /// Connecting, authenticating or sending failed.
    #[error("smtp error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Accepts a composed mail and reports whether it was sent.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver `mail`.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// SMTP delivery through `lettre`.
#[derive(Clone)]
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// Transport for `smtp`. Does not connect until the first send.
    pub fn from_settings(smtp: &SmtpSettings) -> Result<Self, MailError> {
        let host = smtp.effective_host();
        let builder = if smtp.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            let tls = TlsParameters::new(host.to_string())?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .tls(Tls::Opportunistic(tls))
        };
        let mut builder = builder.port(smtp.port);
        if smtp.has_credentials() {
            builder = builder.credentials(Credentials::new(
                smtp.user.clone(),
                smtp.password.clone(),
            ));
        }
        debug!(host, port = smtp.port, secure = smtp.secure, "smtp transport configured");
        Ok(Self {
            transport: builder.build(),
        })
    }
}

impl std::fmt::Debug for SmtpMailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailTransport").finish_non_exhaustive()
    }
}

/// Convert `mail` into a `lettre` message.
pub fn build_message(mail: &OutgoingMail) -> Result<Message, MailError> {
    let from: Mailbox = mail.from.as_deref().ok_or(MailError::NoSender)?.parse()?;
    let to: Mailbox = mail.to.parse()?;
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(mail.body.clone())?;
    Ok(message)
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = build_message(mail)?;
        let response = self.transport.send(message).await?;
        info!(to = %mail.to, code = %response.code(), "inquiry mail sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            from: Some("noreply@websoul.co.kr".into()),
            to: "support@websoul.co.kr".into(),
            subject: "[웹소울랩 문의] ACME".into(),
            body: "문의내용:\nhello".into(),
        }
    }

    #[test]
    fn builds_plain_text_message() {
        let message = build_message(&mail()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: noreply@websoul.co.kr"));
        assert!(raw.contains("To: support@websoul.co.kr"));
        assert!(raw.contains("Content-Type: text/plain; charset=utf-8"));
    }

    #[test]
    fn missing_sender_is_error() {
        let mail = OutgoingMail {
            from: None,
            ..mail()
        };
        assert_matches!(build_message(&mail), Err(MailError::NoSender));
    }

    #[test]
    fn bad_recipient_is_address_error() {
        let mail = OutgoingMail {
            to: "not an address".into(),
            ..mail()
        };
        assert_matches!(build_message(&mail), Err(MailError::Address(_)));
    }

    #[tokio::test]
    async fn transport_builds_from_defaults() {
        assert!(SmtpMailTransport::from_settings(&SmtpSettings::default()).is_ok());
    }

    #[tokio::test]
    async fn secure_transport_builds() {
        let smtp = SmtpSettings {
            host: "smtp.example.com".into(),
            port: 465,
            secure: true,
            user: "relay@example.com".into(),
            password: "secret".into(),
            ..SmtpSettings::default()
        };
        assert!(SmtpMailTransport::from_settings(&smtp).is_ok());
    }
}
