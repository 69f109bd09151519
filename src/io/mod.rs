//! Mesh import/export.

#[cfg(feature = "stl-io")]
mod stl;

/// I/O and format-conversion errors.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("std::io::Error: {0}")]
    StdIo(#[from] std::io::Error),

    #[error("Input is malformed: {0}")]
    MalformedInput(String),
}
