//! Raw message sources.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Where a raw message comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Literal message text.
    Text(String),
    /// Path to an `.eml` file.
    File(PathBuf),
}

impl Source {
    /// Reads the raw text of this source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if a file source cannot be
    /// read as UTF-8 text.
    pub fn load(&self) -> Result<Cow<'_, str>> {
        match self {
            Self::Text(text) => Ok(Cow::Borrowed(load_from_string(text))),
            Self::File(path) => load_from_file(path).map(Cow::Owned),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(_) => write!(f, "string"),
            Self::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

/// Returns literal message text unchanged.
#[must_use]
pub const fn load_from_string(content: &str) -> &str {
    content
}

/// Reads a whole file as UTF-8 text.
///
/// # Errors
///
/// Returns the underlying I/O error, including `InvalidData` for files
/// that are not valid UTF-8.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    tracing::trace!(path = %path.display(), bytes = text.len(), "Loaded message file");
    Ok(text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Write;

    #[test]
    fn test_load_from_string() {
        assert_eq!(load_from_string("Subject: x\n\nbody"), "Subject: x\n\nbody");

        let source = Source::from("Subject: x\n\nbody");
        assert!(matches!(source.load().unwrap(), Cow::Borrowed("Subject: x\n\nbody")));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Subject: from disk\r\n\r\nHello").unwrap();

        assert_eq!(load_from_file(file.path()).unwrap(), "Subject: from disk\r\n\r\nHello");

        let source = Source::from(file.path());
        assert_eq!(source.load().unwrap(), "Subject: from disk\r\n\r\nHello");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_file(dir.path().join("absent.eml")).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_load_non_utf8_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Subject: \xff\xfe\r\n\r\n").unwrap();

        let err = load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::InvalidData));
    }

    #[test]
    fn test_source_display() {
        assert_eq!(Source::from("x").to_string(), "string");
        assert_eq!(
            Source::from(PathBuf::from("/tmp/a.eml")).to_string(),
            "file /tmp/a.eml"
        );
    }
}
