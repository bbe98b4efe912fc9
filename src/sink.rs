//! Destinations for exported artifacts and clipboard payloads.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::ExportError;

pub const PNG_MIME: &str = "image/png";
pub const SVG_MIME: &str = "image/svg+xml";
pub const ZIP_MIME: &str = "application/zip";

/// A finished export ready to be saved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Suggested file name
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, mime: &'static str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }
}

/// Receives exported files.
pub trait ArtifactSink {
    fn save(&self, artifact: Artifact) -> Result<(), ExportError>;
}

impl<S: ArtifactSink + ?Sized> ArtifactSink for Rc<S> {
    fn save(&self, artifact: Artifact) -> Result<(), ExportError> {
        (**self).save(artifact)
    }
}

/// Writes artifacts into a directory, replacing files of the same name.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn save(&self, artifact: Artifact) -> Result<(), ExportError> {
        fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(&artifact.name);
        fs::write(&path, &artifact.bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("Saved {} ({} bytes)", path.display(), artifact.bytes.len());
        Ok(())
    }
}

/// Keeps artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: RefCell<Vec<Artifact>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All artifacts saved so far, oldest first.
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.saved.borrow().clone()
    }

    /// The most recent artifact with the given name.
    pub fn get(&self, name: &str) -> Option<Artifact> {
        self.saved.borrow().iter().rev().find(|a| a.name == name).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.borrow().is_empty()
    }
}

impl ArtifactSink for MemorySink {
    fn save(&self, artifact: Artifact) -> Result<(), ExportError> {
        self.saved.borrow_mut().push(artifact);
        Ok(())
    }
}

/// Text clipboard.
pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<(), ExportError>;
}

impl<C: Clipboard + ?Sized> Clipboard for Rc<C> {
    fn write_text(&self, text: &str) -> Result<(), ExportError> {
        (**self).write_text(text)
    }
}

/// In-process clipboard, optionally rejecting every write.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: RefCell<Option<String>>,
    reject: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose writes always fail, as when permission is denied.
    pub fn rejecting() -> Self {
        Self {
            contents: RefCell::new(None),
            reject: true,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ExportError> {
        if self.reject {
            return Err(ExportError::Clipboard("write permission denied".into()));
        }
        *self.contents.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

/// The operating system clipboard.
#[cfg(feature = "clipboard")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClipboard;

#[cfg(feature = "clipboard")]
impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ExportError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ExportError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ExportError::Clipboard(e.to_string()))
    }
}
