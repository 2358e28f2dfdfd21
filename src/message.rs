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

//! Composes the relayed email from a drained payload.
//!
//! See [`Message::compose`].

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::config::Config;

/// The line ending sequence required by [RFC 5321 section
/// 2.3.8](https://www.rfc-editor.org/rfc/rfc5321.html#section-2.3.8).
pub const CRLF: &str = "\r\n";

/// The fixed `Subject` of every relayed message.
pub const SUBJECT: &str = "Notification";

/// One relayed email: a fixed header block and the raw payload as body.
///
/// Headers are an explicitly ordered list of `(name, value)` pairs, always `From`, `To`,
/// `Subject`, `Date` in that order, so the rendered bytes are deterministic. The body is carried
/// verbatim; no encoding is assumed and no transformation is applied.
///
/// Built fresh per connection and discarded after submission.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Message {
    headers: Vec<(&'static str, String)>,
    body: Vec<u8>,
}

impl Message {
    /// Compose a message carrying `payload`, stamped with the current time.
    ///
    /// - `From` is the configured sender and `To` the configured destination.
    /// - `Subject` is always [`SUBJECT`].
    /// - `Date` is the submission time in RFC 3339.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Date`] if the current time cannot be rendered as RFC 3339.
    pub fn compose(config: &Config, payload: Vec<u8>) -> Result<Self, ComposeError> {
        let date = OffsetDateTime::now_utc().format(&Rfc3339)?;

        Ok(Self {
            headers: vec![
                ("From", config.sender.clone()),
                ("To", config.destination.clone()),
                ("Subject", SUBJECT.to_owned()),
                ("Date", date),
            ],
            body: payload,
        })
    }

    /// The ordered header pairs.
    #[must_use]
    pub fn headers(&self) -> &[(&'static str, String)] {
        &self.headers
    }

    /// The raw payload carried as the body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Render the message as wire bytes.
    ///
    /// Every header line is terminated with [`CRLF`], the header block and body are separated by
    /// a blank line, and the body follows byte-for-byte:
    ///
    /// ```text
    /// From: <sender>\r\n
    /// To: <dest>\r\n
    /// Subject: Notification\r\n
    /// Date: <RFC 3339 timestamp>\r\n
    /// \r\n
    /// <raw payload>
    /// ```
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let header_len: usize = self
            .headers
            .iter()
            .map(|(name, value)| name.len() + 2 + value.len() + CRLF.len())
            .sum();
        let mut bytes = Vec::with_capacity(header_len + CRLF.len() + self.body.len());

        for (name, value) in &self.headers {
            bytes.extend_from_slice(name.as_bytes());
            bytes.extend_from_slice(b": ");
            bytes.extend_from_slice(value.as_bytes());
            bytes.extend_from_slice(CRLF.as_bytes());
        }

        bytes.extend_from_slice(CRLF.as_bytes());
        bytes.extend_from_slice(&self.body);

        bytes
    }
}

/// A reason a [`Message`] could not be composed.
#[derive(thiserror::Error, Debug)]
pub enum ComposeError {
    /// The submission time could not be rendered as RFC 3339.
    #[error("failed to format the `Date` header: {0}")]
    Date(#[from] time::error::Format),
}
