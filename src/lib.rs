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

//! A minimal TCP-to-email bridge.
//!
//! The listening side speaks no protocol at all: a client connects, writes bytes, and closes its
//! write side. Each accepted connection is drained to EOF, wrapped as the body of a fixed-form
//! email, and submitted to a configured mail provider over an authenticated, implicit-TLS SMTP
//! session. The client never receives a status; the bridge is fire-and-forget.
//!
//! See [`listen`] for the accept loop and [`connection::handle`] for the per-connection pipeline.

#![warn(clippy::nursery, clippy::pedantic)]
#![cfg_attr(debug_assertions, allow(clippy::missing_errors_doc))]

use std::{io, sync::Arc};

use async_stream::stream;
use futures_core::Stream;
use tokio::{net::TcpListener, sync::Semaphore, task::JoinHandle};

pub mod config;
pub mod connection;
pub mod message;
pub mod submit;


pub use config::Config;
pub use connection::RelayOutcome;
pub use submit::{Mailer, SmtpMailer};

/// Accept connections forever, spawning one relay task per accepted connection.
///
/// Returns a stream of sessions: each item is either the [`JoinHandle`] of a freshly spawned
/// [`connection::handle`] task or the error from a failed [`TcpListener::accept`]. A failed
/// accept loses only that one connection attempt; the loop keeps serving, and it is up to the
/// caller to log the error and move on. A slow or stuck session never blocks the accept loop.
///
/// Admission is bounded by [`Config::max_connections`]: once that many sessions are in flight,
/// the loop stops accepting until a permit frees up.
pub fn listen<M>(
    listener: TcpListener,
    config: Arc<Config>,
    mailer: Arc<M>,
) -> impl Stream<Item = io::Result<JoinHandle<RelayOutcome>>>
where
    M: Mailer + Send + Sync + 'static,
{
    stream! {
        let limiter = Arc::new(Semaphore::new(config.max_connections));

        loop {
            let Ok(permit) = Arc::clone(&limiter).acquire_owned().await else {
                // The semaphore is owned by this loop and never closed.
                break;
            };

            match listener.accept().await {
                Ok((stream, _)) => {
                    let config = Arc::clone(&config);
                    let mailer = Arc::clone(&mailer);

                    yield Ok(tokio::spawn(async move {
                        // Hold the admission permit for the whole session.
                        let _permit = permit;

                        connection::handle(stream, &config, mailer.as_ref()).await
                    }));
                }
                Err(err) => yield Err(err),
            }
        }
    }
}
