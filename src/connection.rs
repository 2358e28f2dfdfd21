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

//! Handles one accepted TCP connection end-to-end.
//!
//! See [`handle`].

use log::{debug, error, info, warn};
use tokio::{io::AsyncReadExt, net::TcpStream};

use crate::{
    config::Config,
    message::{ComposeError, Message},
    submit::{self, Mailer, SubmitError},
};

mod log_channels {
    pub const CONNECTION: &str = "relay::connection";
    pub const DRAIN: &str = "relay::drain";
    pub const COMPOSE: &str = "relay::compose";
    pub const SUBMIT: &str = "relay::submit";
}

/// Relay one accepted connection: drain it to EOF, compose the message, and submit it upstream.
///
/// The client never receives a status; every failure is a logged side effect, tagged with the
/// step it happened in. A read error is tolerated (the bytes read so far are still relayed), but
/// a failed step short-circuits the steps that depend on it — there is no point opening an SMTP
/// session for a message that could not be composed.
///
/// The connection is closed when this function returns, regardless of outcome.
pub async fn handle<M>(mut stream: TcpStream, config: &Config, mailer: &M) -> RelayOutcome
where
    M: Mailer + Send + Sync + ?Sized,
{
    let peer = stream
        .peer_addr()
        .map_or_else(|_| "<unknown>".to_owned(), |addr| addr.to_string());

    info!(
        target: log_channels::CONNECTION,
        "connection opened by {peer}"
    );

    let payload = drain(&mut stream, &peer).await;
    let outcome = relay(config, mailer, payload).await;

    match &outcome {
        RelayOutcome::Relayed => info!(
            target: log_channels::SUBMIT,
            "relayed message from {peer} to {}", config.destination
        ),
        RelayOutcome::ComposeFailed(err) => error!(
            target: log_channels::COMPOSE,
            "failed to compose message from {peer}: {err}"
        ),
        RelayOutcome::SubmitFailed(err) => error!(
            target: log_channels::SUBMIT,
            "failed to submit message from {peer}: {err}"
        ),
    }

    info!(
        target: log_channels::CONNECTION,
        "connection with {peer} closed ({outcome:?})"
    );

    // `stream` is dropped here, closing the client connection unconditionally.
    outcome
}

/// Read everything the client sends until it closes its write side.
///
/// A read error is not fatal: whatever arrived before it is kept and relayed best-effort.
async fn drain(stream: &mut TcpStream, peer: &str) -> Vec<u8> {
    let mut payload = Vec::new();

    if let Err(err) = stream.read_to_end(&mut payload).await {
        warn!(
            target: log_channels::DRAIN,
            "read from {peer}: {err}; continuing with the {} bytes received so far",
            payload.len()
        );
    }

    debug!(
        target: log_channels::DRAIN,
        "read {} bytes from {peer}: {:?}",
        payload.len(),
        String::from_utf8_lossy(&payload)
    );

    payload
}

/// The short-circuiting compose-then-submit chain.
async fn relay<M>(config: &Config, mailer: &M, payload: Vec<u8>) -> RelayOutcome
where
    M: Mailer + Send + Sync + ?Sized,
{
    let message = match Message::compose(config, payload) {
        Ok(message) => message,
        Err(err) => return RelayOutcome::ComposeFailed(err),
    };

    let envelope = match submit::envelope(config) {
        Ok(envelope) => envelope,
        Err(err) => return RelayOutcome::SubmitFailed(err),
    };

    match mailer.submit(envelope, &message.to_bytes()).await {
        Ok(()) => RelayOutcome::Relayed,
        Err(err) => RelayOutcome::SubmitFailed(err),
    }
}

/// How one relayed connection ended.
///
/// Whatever the variant, the client connection itself ends up closed.
#[derive(Debug)]
pub enum RelayOutcome {
    /// The message was accepted by the upstream server.
    Relayed,
    /// The message could not be composed; no SMTP session was attempted.
    ComposeFailed(ComposeError),
    /// The envelope could not be built or the SMTP session failed.
    SubmitFailed(SubmitError),
}
