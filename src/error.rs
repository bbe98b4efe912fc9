//! Error types for animation, loading, and export operations.

use std::path::PathBuf;

/// Errors raised while building an animation controller.
#[derive(Debug, thiserror::Error)]
pub enum AnimationError {
    /// The program produced no frames to play
    #[error("program has no frames to play")]
    NoFrames,
    /// The controller could not be created for another reason
    #[error("failed to create animation: {0}")]
    Creation(String),
}

/// Errors raised while loading frame files from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no frame files found in '{}'", path.display())]
    NoFrames { path: PathBuf },
}

/// Errors raised by export and clipboard operations.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Another export is still running
    #[error("an export is already in progress")]
    Busy,
    /// No mounted grid surface to read from
    #[error("could not find ASCII content")]
    SurfaceNotFound,
    /// The controller did not report the requested frame as rendered
    #[error("frame {expected} was not rendered before capture (last rendered: {rendered:?})")]
    RenderNotFlushed {
        expected: usize,
        rendered: Option<usize>,
    },
    /// The rasterizer failed to produce an image
    #[error("capture failed: {0}")]
    Capture(String),
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("clipboard write failed: {0}")]
    Clipboard(String),
    #[error("failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when loading configuration.
#[cfg(feature = "toml")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
