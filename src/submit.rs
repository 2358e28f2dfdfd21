// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright © 2025 RemasteredArch
//
// This file is part of smtp_relay.
//
// smtp_relay is free software: you can redistribute it and/or modify it under the terms of the
// GNU Affero General Public License as published by the Free Software Foundation, either version
// 3 of the License, or (at your option) any later version.
//
// smtp_relay is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See
// the GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License along with
// smtp_relay. If not, see <https://www.gnu.org/licenses/>.

//! Submits composed messages to the upstream mail provider.
//!
//! [`SmtpMailer`] performs the real authenticated SMTP-over-TLS submission; [`Mailer`] is the
//! seam that lets tests swap it for a recording mock.

use async_trait::async_trait;
use lettre::{
    address::Envelope,
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{Tls, TlsParameters},
        SUBMISSIONS_PORT,
    },
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};

use crate::config::Config;

/// Something that can submit one rendered message under one envelope.
///
/// Each call stands for one complete submission (MAIL, RCPT, DATA, QUIT) to the upstream
/// server. Implementations must be safe to share across concurrently running connection
/// handlers.
#[async_trait]
pub trait Mailer {
    /// Submit `message` under `envelope`.
    async fn submit(&self, envelope: Envelope, message: &[u8]) -> Result<(), SubmitError>;
}

/// Build the fixed envelope for the relay: MAIL FROM is the configured sender, RCPT TO the one
/// configured destination.
///
/// # Errors
///
/// Returns [`SubmitError::Address`] if either configured address does not parse as a mailbox.
pub fn envelope(config: &Config) -> Result<Envelope, SubmitError> {
    Ok(Envelope::new(
        Some(config.sender.parse()?),
        vec![config.destination.parse()?],
    )?)
}

/// The production [`Mailer`]: an authenticated lettre SMTP transport over implicit TLS.
///
/// Dials `<smtp-server>:465` with the server name set for certificate verification against the
/// standard trust store, and authenticates with a plaintext-credential mechanism using the
/// configured sender identity and password. The transport is built once, but every submission
/// opens a fresh SMTP session; nothing is pooled.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport for the configured upstream server.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Transport`] if the TLS parameters cannot be built.
    pub fn new(config: &Config) -> Result<Self, SubmitError> {
        let tls_parameters = TlsParameters::builder(config.smtp_server.clone()).build_rustls()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_server)
            .port(SUBMISSIONS_PORT)
            .tls(Tls::Wrapper(tls_parameters))
            .credentials(Credentials::new(
                config.sender.clone(),
                config.password.clone(),
            ))
            .authentication(vec![Mechanism::Plain, Mechanism::Login])
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn submit(&self, envelope: Envelope, message: &[u8]) -> Result<(), SubmitError> {
        self.transport.send_raw(&envelope, message).await?;

        Ok(())
    }
}

/// A reason a submission could not be made.
#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    /// A configured address does not parse as a mailbox.
    #[error("invalid sender or destination address: {0}")]
    Address(#[from] lettre::address::AddressError),
    /// The envelope could not be built from the parsed addresses.
    #[error("failed to build the envelope: {0}")]
    Envelope(#[from] lettre::error::Error),
    /// The SMTP transport failed: TLS setup, dial, authentication, or any protocol step.
    #[error("smtp transport: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT};

    fn config() -> Config {
        Config {
            port: DEFAULT_PORT,
            smtp_server: "smtp.example.com".to_owned(),
            sender: "relay@example.com".to_owned(),
            password: "hunter2".to_owned(),
            destination: "inbox@example.com".to_owned(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    #[test]
    fn envelope_is_sender_to_destination() {
        assert_eq!(
            envelope(&config()).expect("failed to build the envelope"),
            Envelope::new(
                Some("relay@example.com".parse().unwrap()),
                vec!["inbox@example.com".parse().unwrap()]
            )
            .unwrap()
        );
    }

    #[test]
    fn envelope_rejects_a_malformed_destination() {
        let mut config = config();
        config.destination = "not a mailbox".to_owned();

        assert!(matches!(
            envelope(&config),
            Err(SubmitError::Address(_))
        ));
    }

    #[tokio::test]
    async fn submission_to_an_unreachable_server_fails() {
        let mut config = config();
        // Nothing is listening on localhost:465 in the test environment.
        config.smtp_server = "localhost".to_owned();

        let mailer = SmtpMailer::new(&config).unwrap();
        let envelope = envelope(&config).unwrap();

        assert!(mailer.submit(envelope, b"content").await.is_err());
    }
}
