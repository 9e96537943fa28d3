//! Error types for romforge.
//!
//! The scraper has a small failure taxonomy of its own: a missing rom file
//! aborts a lookup outright, a malformed response envelope drives the retry
//! ladder forward, and an exhausted ladder surfaces as "rom not found" with
//! diagnostic context attached.

use std::path::PathBuf;

/// Unified error type for the scraper and conversion paths.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The rom path handed to the identity resolver does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A service response failed the XML envelope check. Handled internally
    /// by advancing the retry ladder, so callers normally never see it.
    ///
    /// The raw body is kept for diagnostics but excluded from the display
    /// form, since it may contain bytes unsafe for the caller's output
    /// encoding.
    #[error("Invalid response from {url}")]
    InvalidResponse {
        /// Request URL that produced the malformed body.
        url: String,
        /// Raw response body, possibly not XML at all.
        body: String,
    },

    /// Every retry rung was exhausted without a well-formed response.
    #[error("Rom not found: system {system_id}, name \"{rom_name}\"")]
    RomNotFound {
        /// System id the lookup was scoped to.
        system_id: String,
        /// Identifying name used on the final attempt.
        rom_name: String,
        /// Last raw response body, for diagnostics only. Never included in
        /// the display form.
        response: Option<String>,
    },

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP transport failed (DNS, refused connection, non-2xx status).
    /// Transport failures are never retried by the lookup ladder.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An XML document could not be read.
    #[error("XML error: {0}")]
    Xml(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

/// Result type alias using the romforge Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_omits_raw_response() {
        let err = Error::RomNotFound {
            system_id: "4".into(),
            rom_name: "Super Mario World".into(),
            response: Some("<html>totally not xml</html>".into()),
        };
        let shown = err.to_string();
        assert!(shown.contains("system 4"));
        assert!(shown.contains("Super Mario World"));
        assert!(!shown.contains("html"));
    }

    #[test]
    fn display_invalid_response_url_only() {
        let err = Error::InvalidResponse {
            url: "https://example.test/api/jeuInfos.php".into(),
            body: "API closed".into(),
        };
        let shown = err.to_string();
        assert!(shown.contains("jeuInfos"));
        assert!(!shown.contains("API closed"));
    }

    #[test]
    fn file_not_found_carries_path() {
        let err = Error::FileNotFound(PathBuf::from("/roms/missing.zip"));
        assert!(err.to_string().contains("missing.zip"));
    }

    #[test]
    fn io_errors_convert() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(Error::from(io_err), Error::Io(_)));
    }
}
