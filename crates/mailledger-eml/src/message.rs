//! Parsed email message.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};

use crate::content_type::ContentType;
use crate::encoding::TransferEncoding;
use crate::error::{Error, Result};
use crate::header::{Headers, names};
use crate::parser::Parser;
use crate::time::parse_date;

/// A single-part email message parsed from an EML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    headers: Headers,
    encoding: TransferEncoding,
    /// Body after transfer decoding.
    body: Vec<u8>,
}

impl Message {
    pub(crate) const fn new(headers: Headers, encoding: TransferEncoding, body: Vec<u8>) -> Self {
        Self {
            headers,
            encoding,
            body,
        }
    }

    /// Returns the resolved transfer encoding of the body.
    #[must_use]
    pub const fn encoding(&self) -> TransferEncoding {
        self.encoding
    }

    /// Returns all values of a header in source order, ignoring name case.
    ///
    /// Absent headers yield an empty slice.
    #[must_use]
    pub fn generic_header(&self, name: &str) -> &[String] {
        self.headers.get_all(name)
    }

    /// Returns the header collection.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the header collection for editing.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Gets the From header.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.headers.get(names::FROM)
    }

    /// Gets the To header.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.headers.get(names::TO)
    }

    /// Gets the Cc header.
    #[must_use]
    pub fn cc(&self) -> Option<&str> {
        self.headers.get(names::CC)
    }

    /// Gets the raw Subject header.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.headers.get(names::SUBJECT)
    }

    /// Gets the Subject header with RFC 2047 encoded words decoded.
    #[must_use]
    pub fn decoded_subject(&self) -> Option<String> {
        self.headers.decoded(names::SUBJECT)
    }

    /// Gets the Message-ID header.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.headers.get(names::MESSAGE_ID)
    }

    /// Gets the MIME-Version header.
    #[must_use]
    pub fn mime_version(&self) -> Option<&str> {
        self.headers.get(names::MIME_VERSION)
    }

    /// Gets the Date header as a timestamp.
    ///
    /// Returns `None` if the header is absent or was edited into an
    /// unparseable value after parsing.
    #[must_use]
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.headers
            .get(names::DATE)
            .and_then(|value| parse_date(value).ok())
    }

    /// Gets the content type, defaulting to `text/plain; charset=us-ascii`.
    ///
    /// # Errors
    ///
    /// Returns an error if the Content-Type header is malformed.
    pub fn content_type(&self) -> Result<ContentType> {
        self.headers
            .get(names::CONTENT_TYPE)
            .map_or_else(|| Ok(ContentType::rfc2045_default()), ContentType::parse)
    }

    /// Returns the declared charset of the body, if any.
    ///
    /// The body is never transcoded; this only reports the declaration.
    #[must_use]
    pub fn charset(&self) -> Option<String> {
        self.content_type()
            .ok()
            .and_then(|ct| ct.charset().map(str::to_string))
    }

    /// Returns the decoded body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the decoded body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Consumes the message, returning its headers, encoding and body.
    #[must_use]
    pub fn into_parts(self) -> (Headers, TransferEncoding, Vec<u8>) {
        (self.headers, self.encoding, self.body)
    }
}

impl FromStr for Message {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Parser::new().parse_str(s)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn sample() -> Message {
        let mut headers = Headers::new();
        headers.add("From", "sender@example.com");
        headers.add("To", "recipient@example.com");
        headers.add("Cc", "copy@example.com");
        headers.add("Subject", "=?utf-8?Q?Caf=C3=A9?=");
        headers.add("Date", "Wed, 01 Nov 2023 00:00:00 +0000");
        headers.add("Message-ID", "<1@example.com>");
        headers.add("MIME-Version", "1.0");
        headers.add("Content-Type", "text/plain; charset=UTF-8");

        Message::new(headers, TransferEncoding::EightBit, b"Hello, World!".to_vec())
    }

    #[test]
    fn test_message_accessors() {
        let message = sample();

        assert_eq!(message.from(), Some("sender@example.com"));
        assert_eq!(message.to(), Some("recipient@example.com"));
        assert_eq!(message.cc(), Some("copy@example.com"));
        assert_eq!(message.message_id(), Some("<1@example.com>"));
        assert_eq!(message.mime_version(), Some("1.0"));
        assert_eq!(message.subject(), Some("=?utf-8?Q?Caf=C3=A9?="));
        assert_eq!(message.decoded_subject().as_deref(), Some("Café"));
        assert_eq!(message.encoding(), TransferEncoding::EightBit);
        assert_eq!(message.body_text(), "Hello, World!");
    }

    #[test]
    fn test_message_generic_header() {
        let message = sample();

        assert_eq!(message.generic_header("message-id"), ["<1@example.com>"]);
        assert!(message.generic_header("X-Missing").is_empty());
    }

    #[test]
    fn test_message_date() {
        let mut message = sample();
        assert_eq!(message.date().unwrap().timestamp(), 1_698_796_800);

        message.headers_mut().set("Date", "not a date");
        assert!(message.date().is_none());
    }

    #[test]
    fn test_message_content_type() {
        let mut message = sample();
        assert_eq!(message.charset().as_deref(), Some("UTF-8"));
        assert!(message.content_type().unwrap().is_text());

        message.headers_mut().remove("content-type");
        assert_eq!(message.content_type().unwrap(), ContentType::rfc2045_default());
        assert_eq!(message.charset().as_deref(), Some("us-ascii"));

        message.headers_mut().set("Content-Type", "garbage");
        assert!(message.content_type().is_err());
        assert_eq!(message.charset(), None);
    }

    #[test]
    fn test_message_lossy_body_text() {
        let message = Message::new(Headers::new(), TransferEncoding::Base64, vec![b'a', 0xff, b'b']);
        assert_eq!(message.body(), [b'a', 0xff, b'b']);
        assert_eq!(message.body_text(), "a\u{fffd}b");
    }

    #[test]
    fn test_message_into_parts() {
        let (headers, encoding, body) = sample().into_parts();
        assert_eq!(headers.get("subject"), Some("=?utf-8?Q?Caf=C3=A9?="));
        assert_eq!(encoding, TransferEncoding::EightBit);
        assert_eq!(body, b"Hello, World!");
    }

    #[test]
    fn test_message_from_str() {
        let message: Message = "Date: Wed, 01 Nov 2023 00:00:00 +0000\r\nSubject: Hi\r\n\r\nBody"
            .parse()
            .unwrap();
        assert_eq!(message.subject(), Some("Hi"));
        assert_eq!(message.body(), b"Body");
    }
}
