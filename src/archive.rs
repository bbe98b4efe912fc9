//! Zip archives of numbered PNG frames.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ExportError;

/// Minimum zero-padding of frame numbers in archive entry names.
pub const MIN_FRAME_DIGITS: usize = 4;

/// Zero-padding width for an archive holding `total` frames.
///
/// At least [`MIN_FRAME_DIGITS`], widened so every index of the
/// animation has the same width and names sort lexically.
pub fn frame_name_width(total: usize) -> usize {
    let last = total.saturating_sub(1);
    let digits = last.checked_ilog10().map_or(1, |d| d as usize + 1);
    digits.max(MIN_FRAME_DIGITS)
}

/// Archive entry name for frame `index`, e.g. `frame_0007.png`.
pub fn frame_file_name(index: usize, width: usize) -> String {
    format!("frame_{index:0width$}.png")
}

/// In-memory zip archive that frames are appended to in order.
pub struct FrameArchive {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    width: usize,
    entries: usize,
}

impl FrameArchive {
    /// Start an archive sized for `total` frames.
    pub fn new(total: usize) -> Self {
        let width = frame_name_width(total);
        if width > MIN_FRAME_DIGITS {
            log::warn!(
                "{} frames exceed {}-digit names; padding frame numbers to {} digits",
                total,
                MIN_FRAME_DIGITS,
                width
            );
        }
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            width,
            entries: 0,
        }
    }

    /// Add the encoded PNG for frame `index`.
    pub fn add_frame(&mut self, index: usize, png: &[u8]) -> Result<(), ExportError> {
        // PNG data is already deflated
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let name = frame_file_name(index, self.width);
        self.writer.start_file(name.as_str(), options)?;
        self.writer.write_all(png).map_err(|source| ExportError::Io {
            path: name.into(),
            source,
        })?;
        self.entries += 1;
        Ok(())
    }

    /// Number of frames added so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Write the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>, ExportError> {
        Ok(self.writer.finish()?.into_inner())
    }
}
