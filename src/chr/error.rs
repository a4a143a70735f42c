use std::io;
use std::path::PathBuf;

/// Per-file export failure. The messages are what the user sees after `<file>: `.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No file")]
    NotFound {
        #[source]
        source: io::Error,
    },

    #[error("Too small")]
    TooSmall,

    #[error("Unsupported file format. Expected iNES or NES 2.0 ROM")]
    UnsupportedFormat,

    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: png::EncodingError,
    },
}
