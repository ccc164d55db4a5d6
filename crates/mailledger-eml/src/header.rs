//! Email header handling.

use crate::encoding::decode_rfc2047;
use std::collections::HashMap;
use std::fmt;

/// Well-known header names.
pub mod names {
    /// `Date`
    pub const DATE: &str = "Date";
    /// `From`
    pub const FROM: &str = "From";
    /// `To`
    pub const TO: &str = "To";
    /// `Cc`
    pub const CC: &str = "Cc";
    /// `Subject`
    pub const SUBJECT: &str = "Subject";
    /// `Message-ID`
    pub const MESSAGE_ID: &str = "Message-ID";
    /// `MIME-Version`
    pub const MIME_VERSION: &str = "MIME-Version";
    /// `Content-Type`
    pub const CONTENT_TYPE: &str = "Content-Type";
    /// `Content-Transfer-Encoding`
    pub const CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";
}

/// One header name with all of its values.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    /// Name as first seen in the source.
    name: String,
    values: Vec<String>,
}

/// Ordered collection of email headers.
///
/// Lookups ignore ASCII case. Header names keep the order in which they
/// first appeared, and the values of a repeated header keep source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<Entry>,
    /// Lower-cased name to position in `entries`.
    index: HashMap<String, usize>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value after any existing values for that name.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let key = name.to_ascii_lowercase();

        if let Some(&pos) = self.index.get(&key) {
            self.entries[pos].values.push(value);
        } else {
            self.index.insert(key, self.entries.len());
            self.entries.push(Entry {
                name,
                values: vec![value],
            });
        }
    }

    /// Sets a header value, replacing any existing values.
    ///
    /// An existing header keeps its position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let key = name.to_ascii_lowercase();

        if let Some(&pos) = self.index.get(&key) {
            self.entries[pos].values = vec![value.into()];
        } else {
            self.add(name, value);
        }
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Gets all values for a header, in source order.
    ///
    /// Returns an empty slice when the header is absent.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.index
            .get(&name.to_ascii_lowercase())
            .map(|&pos| self.entries[pos].values.as_slice())
            .unwrap_or_default()
    }

    /// Gets the first value for a header with RFC 2047 encoded words decoded.
    #[must_use]
    pub fn decoded(&self, name: &str) -> Option<String> {
        self.get(name).map(decode_rfc2047)
    }

    /// Returns true if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_ascii_lowercase())
    }

    /// Removes all values for a header.
    pub fn remove(&mut self, name: &str) {
        let Some(pos) = self.index.remove(&name.to_ascii_lowercase()) else {
            return;
        };
        self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
    }

    /// Returns the number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over all headers as `(name, value)` pairs.
    ///
    /// Names use their original casing and are grouped in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|entry| {
            entry
                .values
                .iter()
                .map(move |v| (entry.name.as_str(), v.as_str()))
        })
    }

    /// Parses a header block.
    ///
    /// Headers are in the format:
    /// ```text
    /// Header-Name: value
    ///   folded continuation
    /// ```
    ///
    /// Parsing stops at the first blank line. Lines without a colon and
    /// continuations with no preceding header are skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for (number, line) in text.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                break;
            }

            // Continuation line (starts with space or tab)
            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = current.as_mut() {
                    let folded = line.trim();
                    if !folded.is_empty() {
                        if !value.is_empty() {
                            value.push(' ');
                        }
                        value.push_str(folded);
                    }
                } else {
                    tracing::debug!(line = number + 1, "Skipping continuation without header");
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(name, value);
            }

            match line.split_once(':') {
                Some((name, value)) if !name.trim().is_empty() => {
                    current = Some((name.trim().to_string(), value.trim().to_string()));
                }
                _ => tracing::debug!(line = number + 1, "Skipping malformed header line"),
            }
        }

        if let Some((name, value)) = current {
            headers.add(name, value);
        }

        headers
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{name}: {value}\r\n")?;
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
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

    #[test]
    fn test_headers_new() {
        let headers = Headers::new();
        assert!(headers.is_empty());
        assert_eq!(headers.len(), 0);
    }

    #[test]
    fn test_headers_add_get() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
        assert!(headers.contains("content-TYPE"));
    }

    #[test]
    fn test_headers_missing_is_empty() {
        let headers = Headers::new();
        assert!(headers.get_all("Cc").is_empty());
        assert_eq!(headers.get("Cc"), None);
    }

    #[test]
    fn test_headers_repeated_keep_order() {
        let mut headers = Headers::new();
        headers.add("Received", "from a");
        headers.add("Subject", "Hi");
        headers.add("received", "from b");
        headers.add("RECEIVED", "from c");

        assert_eq!(headers.get_all("Received"), ["from a", "from b", "from c"]);
        assert_eq!(headers.len(), 2);

        let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Received", "Received", "Received", "Subject"]);
    }

    #[test]
    fn test_headers_set() {
        let mut headers = Headers::new();
        headers.add("To", "alice@example.com");
        headers.add("Subject", "Test");
        headers.add("To", "bob@example.com");
        assert_eq!(headers.get_all("To").len(), 2);

        headers.set("to", "charlie@example.com");
        assert_eq!(headers.get_all("To"), ["charlie@example.com"]);
        assert_eq!(headers.iter().next(), Some(("To", "charlie@example.com")));
    }

    #[test]
    fn test_headers_remove() {
        let mut headers = Headers::new();
        headers.add("From", "a@example.com");
        headers.add("Subject", "Test");
        headers.add("To", "b@example.com");

        headers.remove("subject");
        assert!(headers.get("Subject").is_none());
        assert_eq!(headers.get("To"), Some("b@example.com"));
        assert_eq!(headers.get("From"), Some("a@example.com"));

        headers.add("Subject", "Again");
        assert_eq!(headers.iter().last(), Some(("Subject", "Again")));
    }

    #[test]
    fn test_headers_parse() {
        let text = concat!(
            "From: sender@example.com\r\n",
            "To: recipient@example.com\r\n",
            "Subject: Test Message\r\n",
            "Content-Type: text/plain;\r\n",
            " charset=utf-8\r\n",
            "\r\n",
            "Ignored: body line\r\n"
        );

        let headers = Headers::parse(text);
        assert_eq!(headers.get("From"), Some("sender@example.com"));
        assert_eq!(headers.get("To"), Some("recipient@example.com"));
        assert_eq!(headers.get("Subject"), Some("Test Message"));
        assert_eq!(
            headers.get("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
        assert!(!headers.contains("Ignored"));
    }

    #[test]
    fn test_headers_parse_multiline_fold() {
        let text = "Subject: one\n\ttwo\n   three\nX-Other:   spaced   \n";

        let headers = Headers::parse(text);
        assert_eq!(headers.get("Subject"), Some("one two three"));
        assert_eq!(headers.get("X-Other"), Some("spaced"));
    }

    #[test]
    fn test_headers_parse_value_with_colons() {
        let headers = Headers::parse("X-Url: https://example.com:8080/path\n");
        assert_eq!(headers.get("X-Url"), Some("https://example.com:8080/path"));
    }

    #[test]
    fn test_headers_parse_skips_garbage() {
        let text = " orphan continuation\nnot a header\n: no name\nSubject: kept\n";

        let headers = Headers::parse(text);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Subject"), Some("kept"));
    }

    #[test]
    fn test_headers_parse_empty_value_folded() {
        let headers = Headers::parse("To:\n  <a@example.com>\n");
        assert_eq!(headers.get("To"), Some("<a@example.com>"));
    }

    #[test]
    fn test_headers_decoded() {
        let mut headers = Headers::new();
        headers.add("Subject", "=?utf-8?B?SMOpbGxv?= world");
        assert_eq!(headers.decoded("subject").as_deref(), Some("Héllo world"));
        assert_eq!(headers.get("subject"), Some("=?utf-8?B?SMOpbGxv?= world"));
        assert_eq!(headers.decoded("X-Missing"), None);
    }

    #[test]
    fn test_headers_display() {
        let mut headers = Headers::new();
        headers.add("from", "sender@example.com");
        headers.add("Message-ID", "<1@example.com>");

        let s = headers.to_string();
        assert_eq!(s, "from: sender@example.com\r\nMessage-ID: <1@example.com>\r\n");
    }

    #[test]
    fn test_headers_iter() {
        let mut headers = Headers::new();
        headers.add("From", "sender@example.com");
        headers.add("To", "recipient@example.com");

        let mut count = 0;
        for (name, value) in &headers {
            assert!(!name.is_empty());
            assert!(!value.is_empty());
            count += 1;
        }
        assert_eq!(count, 2);
    }

    mod properties {
        use crate::header::Headers;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_lookup_ignores_ascii_case(
                name in "[A-Za-z][A-Za-z0-9-]{0,20}",
                flips in proptest::collection::vec(any::<bool>(), 21),
                value in "[ -~]{0,40}",
            ) {
                let mut headers = Headers::new();
                headers.add(name.as_str(), value.trim());

                let recased: String = name
                    .chars()
                    .zip(&flips)
                    .map(|(c, &upper)| if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
                    .collect();

                prop_assert_eq!(headers.get(&recased), Some(value.trim()));
                prop_assert_eq!(headers.get_all(&recased), headers.get_all(&name));
            }
        }
    }
}
