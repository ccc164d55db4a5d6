//! EML document parser.
//!
//! Turns raw RFC 5322 text into a [`Message`]:
//!
//! 1. split the header block from the body at the first blank line,
//! 2. unfold and collect headers,
//! 3. resolve `Content-Transfer-Encoding` and decode the body,
//! 4. validate the `Date` header or apply the [`MissingDatePolicy`].

use std::fmt;
use std::path::Path;

use crate::config::{Config, MissingDatePolicy};
use crate::encoding::TransferEncoding;
use crate::error::{Error, Result};
use crate::header::{Headers, names};
use crate::message::Message;
use crate::source::{self, Source};
use crate::time::{Clock, SystemClock, format_date, parse_date};

/// Configured EML parser.
///
/// A parser holds no per-message state and can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct Parser<C = SystemClock> {
    config: Config,
    clock: C,
}

impl Parser {
    /// Creates a parser with the default configuration and system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with the given configuration and system clock.
    #[must_use]
    pub const fn with_config(config: Config) -> Self {
        Self {
            config,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> Parser<C> {
    /// Creates a parser reading the current time from `clock`.
    #[must_use]
    pub const fn with_clock(config: Config, clock: C) -> Self {
        Self { config, clock }
    }

    /// Returns the parser configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Parses a raw message held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDate`] for an unparseable `Date` header,
    /// [`Error::MissingDate`] if the date is absent and the policy rejects
    /// it, and [`Error::InvalidEncodingPayload`] if the body does not decode.
    pub fn parse_str(&self, text: &str) -> Result<Message> {
        self.parse_text(text, &"string")
    }

    /// Reads and parses an `.eml` file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or any error of
    /// [`Parser::parse_str`].
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Message> {
        let path = path.as_ref();
        let text = source::load_from_file(path)?;
        self.parse_text(&text, &path.display())
    }

    /// Loads and parses a message from any [`Source`].
    ///
    /// # Errors
    ///
    /// Same as [`Parser::parse_file`].
    pub fn parse_source(&self, source: &Source) -> Result<Message> {
        let text = source.load()?;
        self.parse_text(&text, source)
    }

    fn parse_text(&self, text: &str, origin: &dyn fmt::Display) -> Result<Message> {
        tracing::debug!(%origin, bytes = text.len(), "Parsing EML");

        let (head, body) = split_message(text);
        let mut headers = Headers::parse(head);

        self.apply_date_policy(&mut headers)?;

        let encoding = self.resolve_encoding(&headers);
        let body = encoding.decode(body)?;

        tracing::debug!(
            %origin,
            headers = headers.len(),
            %encoding,
            body_bytes = body.len(),
            "Parsed EML"
        );

        Ok(Message::new(headers, encoding, body))
    }

    fn apply_date_policy(&self, headers: &mut Headers) -> Result<()> {
        if let Some(value) = headers.get(names::DATE) {
            parse_date(value)?;
            return Ok(());
        }

        match self.config.missing_date {
            MissingDatePolicy::SynthesizeNow => {
                let date = format_date(&self.clock.now());
                tracing::warn!(%date, "Message has no Date header, using current time");
                headers.add(names::DATE, date);
                Ok(())
            }
            MissingDatePolicy::Reject => Err(Error::MissingDate),
            MissingDatePolicy::Leave => Ok(()),
        }
    }

    fn resolve_encoding(&self, headers: &Headers) -> TransferEncoding {
        let fallback = self.config.default_encoding;
        let Some(token) = headers.get(names::CONTENT_TRANSFER_ENCODING) else {
            return fallback;
        };

        TransferEncoding::parse(token).unwrap_or_else(|| {
            tracing::warn!(token, default = %fallback, "Unrecognized Content-Transfer-Encoding");
            fallback
        })
    }
}

/// Splits a raw message at the first blank line.
///
/// Returns the header block (without the blank line) and the body verbatim.
/// A message without a blank line is all headers.
fn split_message(text: &str) -> (&str, &str) {
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        let content = content.strip_suffix('\r').unwrap_or(content);
        if content.is_empty() {
            return (&text[..offset], &text[offset + line.len()..]);
        }
        offset += line.len();
    }

    (text, "")
}

/// Parses a raw message with the default parser.
///
/// # Errors
///
/// See [`Parser::parse_str`].
pub fn parse_from_string(text: &str) -> Result<Message> {
    Parser::new().parse_str(text)
}

/// Reads and parses an `.eml` file with the default parser.
///
/// # Errors
///
/// See [`Parser::parse_file`].
pub fn parse_from_file(path: impl AsRef<Path>) -> Result<Message> {
    Parser::new().parse_file(path)
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
    use crate::time::FixedClock;

    const DATED: &str = "Date: Wed, 01 Nov 2023 00:00:00 +0000\n";

    fn fixed_parser(config: Config) -> Parser<FixedClock> {
        let instant = parse_date("Mon, 02 Jan 2006 15:04:05 -0700").unwrap();
        Parser::with_clock(config, FixedClock::new(instant))
    }

    #[test]
    fn test_split_message_lf() {
        let (head, body) = split_message("A: 1\nB: 2\n\nbody\n\nmore");
        assert_eq!(head, "A: 1\nB: 2\n");
        assert_eq!(body, "body\n\nmore");
    }

    #[test]
    fn test_split_message_crlf() {
        let (head, body) = split_message("A: 1\r\n\r\nline\r\n");
        assert_eq!(head, "A: 1\r\n");
        assert_eq!(body, "line\r\n");
    }

    #[test]
    fn test_split_message_without_body() {
        assert_eq!(split_message("A: 1\nB: 2"), ("A: 1\nB: 2", ""));
        assert_eq!(split_message("A: 1\n\n"), ("A: 1\n", ""));
        assert_eq!(split_message("\nbody"), ("", "body"));
    }

    #[test]
    fn test_split_message_whitespace_line_is_not_blank() {
        let (head, body) = split_message("A: 1\n  fold\n\nbody");
        assert_eq!(head, "A: 1\n  fold\n");
        assert_eq!(body, "body");
    }

    #[test]
    fn test_parse_mixed_line_endings() {
        let text = format!("{DATED}Subject: mixed\r\n  ending\n\r\nfirst\r\nsecond\n");
        let message = parse_from_string(&text).unwrap();

        assert_eq!(message.subject(), Some("mixed ending"));
        assert_eq!(message.body_text(), "first\r\nsecond\n");
    }

    #[test]
    fn test_resolve_encoding_default() {
        let text = format!("{DATED}\nbody");
        let message = parse_from_string(&text).unwrap();
        assert_eq!(message.encoding(), TransferEncoding::EightBit);

        let text = format!("{DATED}Content-Transfer-Encoding: x-unknown\n\na=3Db");
        let message = parse_from_string(&text).unwrap();
        assert_eq!(message.encoding(), TransferEncoding::EightBit);
        assert_eq!(message.body(), b"a=3Db");
    }

    #[test]
    fn test_resolve_encoding_configured_default() {
        let config = Config::builder()
            .default_encoding(TransferEncoding::SevenBit)
            .build();
        let text = format!("{DATED}Content-Transfer-Encoding: binary\n\nbody");
        let message = Parser::with_config(config).parse_str(&text).unwrap();
        assert_eq!(message.encoding(), TransferEncoding::SevenBit);
    }

    #[test]
    fn test_resolve_encoding_case_insensitive() {
        let text = format!("{DATED}content-transfer-encoding:   QUOTED-PRINTABLE \n\na=3Db");
        let message = parse_from_string(&text).unwrap();
        assert_eq!(message.encoding(), TransferEncoding::QuotedPrintable);
        assert_eq!(message.body(), b"a=b");
    }

    #[test]
    fn test_first_transfer_encoding_wins() {
        let text = format!(
            "{DATED}Content-Transfer-Encoding: base64\nContent-Transfer-Encoding: 8bit\n\naGk="
        );
        let message = parse_from_string(&text).unwrap();
        assert_eq!(message.encoding(), TransferEncoding::Base64);
        assert_eq!(message.body(), b"hi");
    }

    #[test]
    fn test_invalid_base64_is_fatal() {
        let text = format!("{DATED}Content-Transfer-Encoding: base64\n\n!!not base64!!");
        let err = parse_from_string(&text).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidEncodingPayload {
                encoding: TransferEncoding::Base64,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_quoted_printable_is_fatal() {
        let text = format!("{DATED}Content-Transfer-Encoding: quoted-printable\n\n100=%");
        assert!(matches!(
            parse_from_string(&text),
            Err(Error::InvalidEncodingPayload { .. })
        ));
    }

    #[test]
    fn test_missing_date_synthesized_from_clock() {
        let parser = fixed_parser(Config::default());
        let message = parser.parse_str("Subject: no date\n\nbody").unwrap();

        assert_eq!(
            message.generic_header("date"),
            ["Mon, 02 Jan 2006 15:04:05 -0700"]
        );
        assert_eq!(message.date().unwrap().timestamp(), 1_136_239_445);
    }

    #[test]
    fn test_missing_date_reject() {
        let config = Config::builder()
            .missing_date(MissingDatePolicy::Reject)
            .build();
        let err = fixed_parser(config).parse_str("Subject: x\n\n").unwrap_err();
        assert!(matches!(err, Error::MissingDate));
    }

    #[test]
    fn test_missing_date_leave() {
        let config = Config::builder()
            .missing_date(MissingDatePolicy::Leave)
            .build();
        let message = fixed_parser(config).parse_str("Subject: x\n\n").unwrap();
        assert!(message.generic_header("Date").is_empty());
        assert!(message.date().is_none());
    }

    #[test]
    fn test_invalid_date_is_fatal_under_every_policy() {
        let text = "Date: Inv, 99 Nov 9999 99:99:00 +0000\nSubject: x\n\nbody";
        for policy in [
            MissingDatePolicy::SynthesizeNow,
            MissingDatePolicy::Reject,
            MissingDatePolicy::Leave,
        ] {
            let config = Config::builder().missing_date(policy).build();
            let err = fixed_parser(config).parse_str(text).unwrap_err();
            assert!(matches!(err, Error::InvalidDate { .. }), "{policy:?}");
        }
    }

    #[test]
    fn test_synthesized_date_is_appended_last() {
        let parser = fixed_parser(Config::default());
        let message = parser.parse_str("Subject: x\nFrom: a@example.com\n\n").unwrap();

        let names: Vec<_> = message.headers().iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Subject", "From", "Date"]);
    }

    #[test]
    fn test_parse_source() {
        let parser = fixed_parser(Config::default());
        let message = parser
            .parse_source(&Source::from("Subject: via source\n\nhi"))
            .unwrap();
        assert_eq!(message.subject(), Some("via source"));
        assert_eq!(message.body(), b"hi");
    }

    #[test]
    fn test_parse_empty_input() {
        let message = fixed_parser(Config::default()).parse_str("").unwrap();
        assert_eq!(message.headers().len(), 1);
        assert!(message.body().is_empty());
    }
}
