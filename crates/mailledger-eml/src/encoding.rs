//! Content transfer encodings and their decoders.
//!
//! Supports Base64, Quoted-Printable, and RFC 2047 encoded words in header
//! values.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    #[cfg_attr(feature = "serde", serde(rename = "7bit"))]
    SevenBit,
    /// 8-bit text, passed through undecoded.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "8bit"))]
    EightBit,
    /// Quoted-Printable encoding.
    #[cfg_attr(feature = "serde", serde(rename = "quoted-printable"))]
    QuotedPrintable,
    /// Base64 encoding.
    #[cfg_attr(feature = "serde", serde(rename = "base64"))]
    Base64,
}

impl TransferEncoding {
    /// Parses a `Content-Transfer-Encoding` token, ignoring case and
    /// surrounding whitespace.
    ///
    /// Returns `None` for tokens outside the supported set.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        [
            Self::SevenBit,
            Self::EightBit,
            Self::QuotedPrintable,
            Self::Base64,
        ]
        .into_iter()
        .find(|encoding| encoding.as_str().eq_ignore_ascii_case(token))
    }

    /// Returns the canonical token for this encoding.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SevenBit => "7bit",
            Self::EightBit => "8bit",
            Self::QuotedPrintable => "quoted-printable",
            Self::Base64 => "base64",
        }
    }

    /// Decodes a raw body according to this encoding.
    ///
    /// `7bit` and `8bit` bodies are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncodingPayload`] if the body is not valid
    /// under this encoding.
    pub fn decode(self, body: &str) -> Result<Vec<u8>> {
        match self {
            Self::SevenBit | Self::EightBit => Ok(body.as_bytes().to_vec()),
            Self::QuotedPrintable => decode_quoted_printable(body.as_bytes()),
            Self::Base64 => decode_base64(body.as_bytes()),
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decodes Base64 data, ignoring embedded whitespace and line breaks.
///
/// # Errors
///
/// Returns an error if the input is not valid standard Base64.
pub fn decode_base64(data: &[u8]) -> Result<Vec<u8>> {
    let cleaned: Vec<u8> = data
        .iter()
        .copied()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();

    STANDARD
        .decode(cleaned)
        .map_err(|e| Error::payload(TransferEncoding::Base64, e.to_string()))
}

/// Decodes Quoted-Printable data (RFC 2045).
///
/// A `=` followed by optional trailing whitespace and a line break (or the
/// end of input) is a soft line break and is dropped with its terminator.
///
/// # Errors
///
/// Returns an error if `=` is followed by anything other than two hex
/// digits or a soft line break.
pub fn decode_quoted_printable(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(data.len());
    let mut pos = 0;

    while pos < data.len() {
        let byte = data[pos];
        if byte != b'=' {
            result.push(byte);
            pos += 1;
            continue;
        }

        let rest = &data[pos + 1..];
        let padding = rest
            .iter()
            .take_while(|b| matches!(b, b' ' | b'\t'))
            .count();
        let after = &rest[padding..];

        // Soft line break
        if after.is_empty() {
            break;
        }
        if after.starts_with(b"\r\n") {
            pos += 1 + padding + 2;
            continue;
        }
        if after[0] == b'\n' {
            pos += 1 + padding + 1;
            continue;
        }

        // Hex encoded byte
        match (
            rest.first().copied().and_then(hex_value),
            rest.get(1).copied().and_then(hex_value),
        ) {
            (Some(high), Some(low)) => {
                result.push((high << 4) | low);
                pos += 3;
            }
            _ => {
                return Err(Error::payload(
                    TransferEncoding::QuotedPrintable,
                    format!("malformed escape sequence at byte {pos}"),
                ));
            }
        }
    }

    Ok(result)
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

/// Decodes RFC 2047 encoded words inside a header value.
///
/// Format: `=?charset?encoding?encoded-text?=`. Whitespace between two
/// adjacent encoded words is dropped. Words that do not decode are kept
/// verbatim. Decoded bytes are read as UTF-8; other charsets are not
/// transcoded.
#[must_use]
pub fn decode_rfc2047(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    let mut after_word = false;

    while let Some(start) = rest.find("=?") {
        let (before, candidate) = rest.split_at(start);
        if let Some((decoded, consumed)) = decode_encoded_word(candidate) {
            if !(after_word && before.chars().all(char::is_whitespace)) {
                result.push_str(before);
            }
            result.push_str(&decoded);
            rest = &candidate[consumed..];
            after_word = true;
        } else {
            result.push_str(before);
            result.push_str("=?");
            rest = &candidate[2..];
            after_word = false;
        }
    }

    result.push_str(rest);
    result
}

/// Decodes one encoded word at the start of `word`, returning the text and
/// the number of bytes consumed.
fn decode_encoded_word(word: &str) -> Option<(String, usize)> {
    let inner = word.strip_prefix("=?")?;
    let (charset, inner) = inner.split_once('?')?;
    let (encoding, inner) = inner.split_once('?')?;
    let end = inner.find("?=")?;
    let payload = &inner[..end];

    if charset.is_empty() || payload.contains(char::is_whitespace) {
        return None;
    }

    let bytes = match encoding {
        "B" | "b" => STANDARD.decode(payload).ok()?,
        "Q" | "q" => decode_quoted_printable(payload.replace('_', " ").as_bytes()).ok()?,
        _ => return None,
    };

    let consumed = 2 + charset.len() + 1 + encoding.len() + 1 + end + 2;
    Some((String::from_utf8_lossy(&bytes).into_owned(), consumed))
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

    #[test]
    fn test_transfer_encoding_parse() {
        assert_eq!(TransferEncoding::parse("7bit"), Some(TransferEncoding::SevenBit));
        assert_eq!(TransferEncoding::parse("8BIT"), Some(TransferEncoding::EightBit));
        assert_eq!(TransferEncoding::parse(" Base64 "), Some(TransferEncoding::Base64));
        assert_eq!(
            TransferEncoding::parse("Quoted-Printable"),
            Some(TransferEncoding::QuotedPrintable)
        );
        assert_eq!(TransferEncoding::parse("binary"), None);
        assert_eq!(TransferEncoding::parse("x-uuencode"), None);
    }

    #[test]
    fn test_transfer_encoding_display() {
        assert_eq!(TransferEncoding::QuotedPrintable.to_string(), "quoted-printable");
        assert_eq!(TransferEncoding::default().as_str(), "8bit");
    }

    #[test]
    fn test_base64_decode() {
        let decoded = decode_base64(b"SGVsbG8sIFdvcmxkIQ==").unwrap();
        assert_eq!(decoded, b"Hello, World!");
    }

    #[test]
    fn test_base64_decode_wrapped() {
        let decoded = decode_base64(b"SGVsbG8s\r\nIFdvcmxk\nIQ==\n").unwrap();
        assert_eq!(decoded, b"Hello, World!");
    }

    #[test]
    fn test_base64_decode_invalid() {
        let err = decode_base64(b"SGVsbG8*IFdvcmxkIQ==").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidEncodingPayload {
                encoding: TransferEncoding::Base64,
                ..
            }
        ));

        assert!(decode_base64(b"SGVsbG8").is_err());
    }

    #[test]
    fn test_quoted_printable_decode() {
        let decoded = decode_quoted_printable(b"Hello, World!").unwrap();
        assert_eq!(decoded, b"Hello, World!");

        let decoded = decode_quoted_printable(b"H=C3=A9llo").unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "Héllo");

        let decoded = decode_quoted_printable(b"a=3db").unwrap();
        assert_eq!(decoded, b"a=b");
    }

    #[test]
    fn test_quoted_printable_keeps_raw_utf8() {
        let decoded = decode_quoted_printable("Grüße =E2=9C=93".as_bytes()).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "Grüße ✓");
    }

    #[test]
    fn test_quoted_printable_soft_line_break() {
        assert_eq!(decode_quoted_printable(b"Hello=\r\nWorld").unwrap(), b"HelloWorld");
        assert_eq!(decode_quoted_printable(b"Hello=\nWorld").unwrap(), b"HelloWorld");
        assert_eq!(decode_quoted_printable(b"Hello= \t\nWorld").unwrap(), b"HelloWorld");
        assert_eq!(decode_quoted_printable(b"Hello=").unwrap(), b"Hello");
    }

    #[test]
    fn test_quoted_printable_hard_line_break_kept() {
        let decoded = decode_quoted_printable(b"line one\r\nline two\n").unwrap();
        assert_eq!(decoded, b"line one\r\nline two\n");
    }

    #[test]
    fn test_quoted_printable_malformed_escape() {
        assert!(decode_quoted_printable(b"50=% off").is_err());
        assert!(decode_quoted_printable(b"tail=4").is_err());
        assert!(decode_quoted_printable(b"= x").is_err());
    }

    #[test]
    fn test_decode_dispatch() {
        assert_eq!(TransferEncoding::EightBit.decode("a=3Db").unwrap(), b"a=3Db");
        assert_eq!(TransferEncoding::SevenBit.decode("plain").unwrap(), b"plain");
        assert_eq!(TransferEncoding::QuotedPrintable.decode("a=3Db").unwrap(), b"a=b");
        assert_eq!(TransferEncoding::Base64.decode("YT1i").unwrap(), b"a=b");
    }

    #[test]
    fn test_rfc2047_decode() {
        assert_eq!(decode_rfc2047("Hello"), "Hello");
        assert_eq!(decode_rfc2047("=?utf-8?B?SMOpbGxv?="), "Héllo");
        assert_eq!(decode_rfc2047("=?UTF-8?Q?H=C3=A9llo_there?="), "Héllo there");
    }

    #[test]
    fn test_rfc2047_mixed_text() {
        assert_eq!(
            decode_rfc2047("Re: =?utf-8?Q?caf=C3=A9?= tomorrow"),
            "Re: café tomorrow"
        );
    }

    #[test]
    fn test_rfc2047_adjacent_words_joined() {
        assert_eq!(
            decode_rfc2047("=?utf-8?Q?Gr=C3=BC?=\r\n =?utf-8?Q?=C3=9Fe?="),
            "Grüße"
        );
    }

    #[test]
    fn test_rfc2047_malformed_kept() {
        assert_eq!(decode_rfc2047("=?utf-8?X?abc?="), "=?utf-8?X?abc?=");
        assert_eq!(decode_rfc2047("price =? unknown"), "price =? unknown");
        assert_eq!(decode_rfc2047("=?utf-8?B?***?="), "=?utf-8?B?***?=");
    }

    mod properties {
        use crate::encoding::{decode_base64, decode_quoted_printable};
        use base64::Engine;
        use base64::engine::general_purpose::STANDARD;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_quoted_printable_identity_without_escapes(text in "[a-zA-Z0-9 .,;:!?\\-\n]{0,200}") {
                let decoded = decode_quoted_printable(text.as_bytes()).unwrap();
                prop_assert_eq!(decoded, text.as_bytes());
            }

            #[test]
            fn prop_base64_ignores_line_wrapping(data in proptest::collection::vec(any::<u8>(), 0..300), width in 1usize..80) {
                let encoded = STANDARD.encode(&data);
                let wrapped = encoded
                    .as_bytes()
                    .chunks(width)
                    .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                    .collect::<Vec<_>>()
                    .join("\r\n");
                prop_assert_eq!(decode_base64(wrapped.as_bytes()).unwrap(), data);
            }
        }
    }
}
