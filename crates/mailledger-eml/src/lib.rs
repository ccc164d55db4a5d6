//! # mailledger-eml
//!
//! Parser for raw `.eml` documents (RFC 5322 headers plus a single MIME
//! body part).
//!
//! ## Features
//!
//! - **Header parsing**: folded headers, repeated names, case-insensitive lookup
//! - **Body decoding**: 7bit, 8bit, Quoted-Printable and Base64 transfer encodings
//! - **Date handling**: invalid `Date` headers are rejected, missing ones are
//!   stamped with the current time (configurable)
//! - **Sources**: parse from strings or files
//!
//! ## Quick Start
//!
//! ```
//! use mailledger_eml::{TransferEncoding, parse_from_string};
//!
//! let raw = "Date: Wed, 01 Nov 2023 00:00:00 +0000\r\n\
//!            Subject: Test\r\n\
//!            Content-Transfer-Encoding: base64\r\n\
//!            \r\n\
//!            SGVsbG8sIFdvcmxkIQ==";
//!
//! let message = parse_from_string(raw)?;
//! assert_eq!(message.encoding(), TransferEncoding::Base64);
//! assert_eq!(message.generic_header("subject"), ["Test"]);
//! assert_eq!(message.body_text(), "Hello, World!");
//! # Ok::<(), mailledger_eml::Error>(())
//! ```
//!
//! ### Configuring the parser
//!
//! ```
//! use mailledger_eml::{Config, MissingDatePolicy, Parser};
//!
//! let config = Config::builder()
//!     .missing_date(MissingDatePolicy::Reject)
//!     .build();
//!
//! let parser = Parser::with_config(config);
//! assert!(parser.parse_str("Subject: undated\r\n\r\nbody").is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod content_type;
mod error;
mod header;
mod message;
mod parser;
mod source;

pub mod encoding;
pub mod time;

pub use config::{Config, ConfigBuilder, MissingDatePolicy};
pub use content_type::ContentType;
pub use encoding::TransferEncoding;
pub use error::{Error, Result};
pub use header::{Headers, names};
pub use message::Message;
pub use parser::{Parser, parse_from_file, parse_from_string};
pub use source::{Source, load_from_file, load_from_string};
