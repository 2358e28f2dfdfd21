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

//! The relay daemon: flag and environment parsing, logging setup, and process startup around
//! [`smtp_relay::listen`].
//!
//! Startup failures (bad configuration, transport setup, bind) abort the process. Once serving,
//! only the accept loop lives here; everything per-connection is the library's concern.

#![warn(clippy::nursery, clippy::pedantic)]

mod args;

use std::sync::Arc;

use anyhow::Context;
use args::Args;
use futures_util::{pin_mut, StreamExt};
use log::{info, warn};
use smtp_relay::{Config, SmtpMailer};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from(<Args as clap::Parser>::parse());
    config.validate().context("invalid configuration")?;

    let mailer = SmtpMailer::new(&config).with_context(|| {
        format!(
            "failed to build the submission transport for `{}`",
            config.smtp_server
        )
    })?;

    let listener = TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    info!("listening on {}", config.listen_addr());

    let sessions = smtp_relay::listen(listener, Arc::new(config), Arc::new(mailer));
    pin_mut!(sessions);

    while let Some(session) = sessions.next().await {
        if let Err(err) = session {
            // One failed accept loses one connection attempt, not the service.
            warn!("accept: {err}");
        }
    }

    Ok(())
}
