//! Loading frame programs from a directory of `frame_NNNN.txt` files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LoadError;
use crate::{FrameFile, Program, SourceType};

/// Extension of text frame files.
pub const FRAME_EXTENSION: &str = "txt";

/// Source of frame listings and frame text.
///
/// Implement this for other storage (bundled assets, an HTTP cache, ...).
pub trait FrameDataProvider {
    /// List the frame files in `directory`, ordered by frame index.
    fn get_frame_files(&self, directory: &Path) -> Result<Vec<FrameFile>, LoadError>;

    /// Read the text of one frame.
    fn read_frame_text(&self, path: &Path) -> Result<String, LoadError>;
}

/// Reads frames from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsProvider;

impl FrameDataProvider for FsProvider {
    fn get_frame_files(&self, directory: &Path) -> Result<Vec<FrameFile>, LoadError> {
        let io_err = |source: std::io::Error| LoadError::Io {
            path: directory.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(directory).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(FRAME_EXTENSION)
            {
                continue;
            }
            let (Some(name), Some(stem)) = (
                path.file_name().and_then(|n| n.to_str()),
                path.file_stem().and_then(|s| s.to_str()),
            ) else {
                log::debug!("Skipping non UTF-8 frame file {}", path.display());
                continue;
            };
            let fallback = files.len() as u32;
            let index = FrameFile::extract_index(stem, fallback);
            files.push(FrameFile::new(
                path.to_string_lossy().into_owned(),
                name.to_string(),
                index,
            ));
        }

        files.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.name.cmp(&b.name)));
        Ok(files)
    }

    fn read_frame_text(&self, path: &Path) -> Result<String, LoadError> {
        fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load every frame in `directory` into a fixed-frame program.
///
/// A single trailing newline is stripped from each frame so frames written
/// by line-oriented tools keep their exact row count.
pub fn load_program<P: FrameDataProvider>(
    provider: &P,
    directory: &Path,
    source_type: SourceType,
) -> Result<Program, LoadError> {
    let frame_files = provider.get_frame_files(directory)?;
    if frame_files.is_empty() {
        return Err(LoadError::NoFrames {
            path: directory.to_path_buf(),
        });
    }

    let mut frames = Vec::with_capacity(frame_files.len());
    for frame_file in &frame_files {
        let mut text = provider.read_frame_text(&PathBuf::from(&frame_file.path))?;
        if text.ends_with('\n') {
            text.pop();
            if text.ends_with('\r') {
                text.pop();
            }
        }
        frames.push(text);
    }

    log::info!("Loaded {} frames from {}", frames.len(), directory.display());
    Ok(Program::from_frames(source_type, frames))
}

/// [`load_program`] using the local filesystem.
pub fn load_program_dir(
    directory: impl AsRef<Path>,
    source_type: SourceType,
) -> Result<Program, LoadError> {
    load_program(&FsProvider, directory.as_ref(), source_type)
}
