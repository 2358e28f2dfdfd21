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

use smtp_relay::config::{Config, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT};

/// Flags and environment variables configuring the relay daemon.
///
/// Every flag can also be supplied through the environment with the fixed `SMTP_RELAY_` prefix,
/// with flags taking precedence.
#[derive(Debug, clap::Parser, PartialEq, Eq)]
#[clap(about, version, author)]
pub struct Args {
    /// The TCP port the server listens on
    #[clap(short, long, env = "SMTP_RELAY_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Hostname of the upstream SMTP server (submission dials port 465)
    #[clap(short = 's', long, env = "SMTP_RELAY_SMTP_SERVER")]
    pub smtp_server: String,

    /// Sender address, which doubles as the SMTP authentication identity
    #[clap(short = 'e', long, env = "SMTP_RELAY_SMTP_SENDER_EMAIL")]
    pub smtp_sender_email: String,

    /// Password for SMTP authentication
    #[clap(long, env = "SMTP_RELAY_SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: String,

    /// Destination address every payload is relayed to
    #[clap(short = 'd', long, env = "SMTP_RELAY_DEST_EMAIL")]
    pub dest_email: String,

    /// Maximum number of connections handled at once
    #[clap(
        long,
        env = "SMTP_RELAY_MAX_CONNECTIONS",
        default_value_t = DEFAULT_MAX_CONNECTIONS
    )]
    pub max_connections: usize,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            port: args.port,
            smtp_server: args.smtp_server,
            sender: args.smtp_sender_email,
            password: args.smtp_password,
            destination: args.dest_email,
            max_connections: args.max_connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_args() {
        assert!(<Args as clap::Parser>::try_parse_from([""]).is_err());

        assert_eq!(
            Args {
                port: DEFAULT_PORT,
                smtp_server: "smtp.example.com".to_owned(),
                smtp_sender_email: "relay@example.com".to_owned(),
                smtp_password: "hunter2".to_owned(),
                dest_email: "inbox@example.com".to_owned(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
            },
            <Args as clap::Parser>::try_parse_from([
                "",
                "-s",
                "smtp.example.com",
                "-e",
                "relay@example.com",
                "--smtp-password",
                "hunter2",
                "-d",
                "inbox@example.com",
            ])
            .unwrap()
        );

        assert_eq!(
            Args {
                port: 2525,
                smtp_server: "smtp.example.com".to_owned(),
                smtp_sender_email: "relay@example.com".to_owned(),
                smtp_password: "hunter2".to_owned(),
                dest_email: "inbox@example.com".to_owned(),
                max_connections: 8,
            },
            <Args as clap::Parser>::try_parse_from([
                "",
                "--port",
                "2525",
                "--smtp-server",
                "smtp.example.com",
                "--smtp-sender-email",
                "relay@example.com",
                "--smtp-password",
                "hunter2",
                "--dest-email",
                "inbox@example.com",
                "--max-connections",
                "8",
            ])
            .unwrap()
        );
    }

    #[test]
    fn args_map_onto_the_config_record() {
        let args = Args {
            port: 2525,
            smtp_server: "smtp.example.com".to_owned(),
            smtp_sender_email: "relay@example.com".to_owned(),
            smtp_password: "hunter2".to_owned(),
            dest_email: "inbox@example.com".to_owned(),
            max_connections: 8,
        };

        let config = Config::from(args);
        assert_eq!(config.port, 2525);
        assert_eq!(config.sender, "relay@example.com");
        assert_eq!(config.destination, "inbox@example.com");
        assert_eq!(config.validate(), Ok(()));
    }
}
