//! Parser configuration types.

use crate::encoding::TransferEncoding;

/// What to do with a message that has no `Date` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MissingDatePolicy {
    /// Insert a `Date` header with the current time. **Default.**
    #[default]
    SynthesizeNow,
    /// Fail with [`Error::MissingDate`](crate::Error::MissingDate).
    Reject,
    /// Leave the header absent.
    Leave,
}

/// EML parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Handling of a missing `Date` header.
    pub missing_date: MissingDatePolicy,
    /// Encoding assumed when `Content-Transfer-Encoding` is absent or
    /// unrecognized. Defaults to `8bit`.
    pub default_encoding: TransferEncoding,
}

impl Config {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for parser configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    missing_date: MissingDatePolicy,
    default_encoding: TransferEncoding,
}

impl ConfigBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the missing `Date` policy.
    #[must_use]
    pub const fn missing_date(mut self, policy: MissingDatePolicy) -> Self {
        self.missing_date = policy;
        self
    }

    /// Sets the fallback transfer encoding.
    #[must_use]
    pub const fn default_encoding(mut self, encoding: TransferEncoding) -> Self {
        self.default_encoding = encoding;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub const fn build(self) -> Config {
        Config {
            missing_date: self.missing_date,
            default_encoding: self.default_encoding,
        }
    }
}
