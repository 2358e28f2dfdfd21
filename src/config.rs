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

//! The relay's configuration record.
//!
//! Constructed once at startup, validated, and shared read-only by every connection handler.
//! How the values are sourced (flags, environment) is the consuming binary's concern.

use std::net::{Ipv4Addr, SocketAddr};

/// The TCP port the relay listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 12345;

/// The default cap on simultaneously handled connections.
pub const DEFAULT_MAX_CONNECTIONS: usize = 64;

/// Immutable relay configuration, shared by all connection handlers.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Config {
    /// The TCP port the relay listens on, on all interfaces.
    pub port: u16,
    /// Hostname of the upstream SMTP server. Submission always dials port 465 (implicit TLS).
    pub smtp_server: String,
    /// The sender address, which doubles as the SMTP authentication identity.
    pub sender: String,
    /// The secret for SMTP authentication.
    pub password: String,
    /// The fixed destination address every payload is relayed to.
    pub destination: String,
    /// Cap on simultaneously handled connections. See [`crate::listen`].
    pub max_connections: usize,
}

impl Config {
    /// Check that every required value is present before the listener starts.
    ///
    /// The port and connection cap always carry a value ([`DEFAULT_PORT`],
    /// [`DEFAULT_MAX_CONNECTIONS`]), so only the string fields can fail.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] naming the first empty field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("smtp-server", &self.smtp_server),
            ("smtp-sender-email", &self.sender),
            ("smtp-password", &self.password),
            ("dest-email", &self.destination),
        ] {
            if value.is_empty() {
                return Err(ConfigError::MissingValue(name));
            }
        }

        Ok(())
    }

    /// The all-interfaces socket address for [`Self::port`].
    #[must_use]
    pub const fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port)
    }
}

/// A reason the configuration cannot be used to start the relay.
#[derive(thiserror::Error, PartialEq, Eq, Debug, Clone)]
pub enum ConfigError {
    /// A required value was left empty.
    #[error("missing value for `{0}`")]
    MissingValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> Config {
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
    fn validate_accepts_filled_config() {
        assert_eq!(filled().validate(), Ok(()));
    }

    #[test]
    fn validate_names_the_empty_field() {
        let mut config = filled();
        config.smtp_server = String::new();
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingValue("smtp-server"))
        );

        let mut config = filled();
        config.password = String::new();
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingValue("smtp-password"))
        );

        let mut config = filled();
        config.destination = String::new();
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingValue("dest-email"))
        );
    }

    #[test]
    fn listen_addr_uses_the_configured_port() {
        let addr = filled().listen_addr();
        assert_eq!(addr.port(), DEFAULT_PORT);
        assert!(addr.ip().is_unspecified());
    }
}
