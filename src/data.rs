//! Core data structures: programs, frame files, and grid dimensions.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Kind of media a program was generated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SourceType {
    Image,
    Video,
    Code,
    Gif,
}

impl SourceType {
    /// Whether this source plays back as a multi-frame animation.
    #[inline]
    pub fn is_animated(self) -> bool {
        matches!(self, SourceType::Code | SourceType::Gif | SourceType::Video)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Image => "image",
            SourceType::Video => "video",
            SourceType::Code => "code",
            SourceType::Gif => "gif",
        }
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(SourceType::Image),
            "video" => Ok(SourceType::Video),
            "code" => Ok(SourceType::Code),
            "gif" => Ok(SourceType::Gif),
            other => Err(format!("unknown source type: {other}")),
        }
    }
}

/// Character-grid size in columns and rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl Dimensions {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Measure the grid spanned by newline-separated text.
    pub fn of_text(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let height = lines.len();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Generator for procedurally produced frames (e.g. code sources).
pub type FrameGenerator = Box<dyn Fn(usize) -> String>;

enum Frames {
    Fixed(Vec<String>),
    Generated { count: usize, generate: FrameGenerator },
}

/// Description of the content driving an animation.
///
/// A program is shared immutably between the owner and the animation host;
/// the host rebuilds its controller whenever it receives a different program.
pub struct Program {
    source_type: SourceType,
    frames: Frames,
    fps: u32,
}

impl Program {
    /// Default playback rate for new programs.
    pub const DEFAULT_FPS: u32 = 30;

    /// A single still frame.
    pub fn still(source_type: SourceType, text: impl Into<String>) -> Self {
        Self::from_frames(source_type, vec![text.into()])
    }

    /// A fixed list of pre-rendered frames.
    pub fn from_frames(source_type: SourceType, frames: Vec<String>) -> Self {
        Self {
            source_type,
            frames: Frames::Fixed(frames),
            fps: Self::DEFAULT_FPS,
        }
    }

    /// `count` frames produced on demand by `generate`.
    pub fn generated<F>(source_type: SourceType, count: usize, generate: F) -> Self
    where
        F: Fn(usize) -> String + 'static,
    {
        Self {
            source_type,
            frames: Frames::Generated {
                count,
                generate: Box::new(generate),
            },
            fps: Self::DEFAULT_FPS,
        }
    }

    /// Set the playback rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    #[inline]
    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    #[inline]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn frame_count(&self) -> usize {
        match &self.frames {
            Frames::Fixed(frames) => frames.len(),
            Frames::Generated { count, .. } => *count,
        }
    }

    /// Text of the frame at `index`, or `None` past the end.
    pub fn frame(&self, index: usize) -> Option<Cow<'_, str>> {
        match &self.frames {
            Frames::Fixed(frames) => frames.get(index).map(|f| Cow::Borrowed(f.as_str())),
            Frames::Generated { count, generate } => {
                (index < *count).then(|| Cow::Owned(generate(index)))
            }
        }
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("source_type", &self.source_type)
            .field("frame_count", &self.frame_count())
            .field("fps", &self.fps)
            .finish()
    }
}

/// Metadata about a frame file on disk.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameFile {
    /// Full path to the frame file
    pub path: String,
    /// Filename (e.g., "frame_0001.txt")
    pub name: String,
    /// Frame index for ordering (extracted from filename)
    pub index: u32,
}

impl FrameFile {
    pub fn new(path: String, name: String, index: u32) -> Self {
        Self { path, name, index }
    }

    /// Extract frame index from a filename stem.
    ///
    /// Handles patterns like:
    /// - "frame_0001" -> 1
    /// - "0042" -> 42
    /// - "my_frame_3" -> 3
    pub fn extract_index(stem: &str, fallback: u32) -> u32 {
        if let Some(suffix) = stem.strip_prefix("frame_") {
            suffix.parse::<u32>().unwrap_or(fallback)
        } else {
            let num_str: String = stem.chars().filter(|c| c.is_ascii_digit()).collect();
            num_str.parse::<u32>().unwrap_or(fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_index() {
        assert_eq!(FrameFile::extract_index("frame_0001", 0), 1);
        assert_eq!(FrameFile::extract_index("frame_42", 0), 42);
        assert_eq!(FrameFile::extract_index("0042", 0), 42);
        assert_eq!(FrameFile::extract_index("my_frame_3", 0), 3);
        assert_eq!(FrameFile::extract_index("no_digits", 99), 99);
        assert_eq!(FrameFile::extract_index("frame_x", 7), 7);
    }

    #[test]
    fn test_animated_sources() {
        assert!(SourceType::Code.is_animated());
        assert!(SourceType::Gif.is_animated());
        assert!(SourceType::Video.is_animated());
        assert!(!SourceType::Image.is_animated());
    }

    #[test]
    fn test_source_type_parse() {
        assert_eq!("gif".parse::<SourceType>(), Ok(SourceType::Gif));
        assert_eq!(" Code ".parse::<SourceType>(), Ok(SourceType::Code));
        assert!("audio".parse::<SourceType>().is_err());
    }

    #[test]
    fn test_dimensions_of_text() {
        assert_eq!(Dimensions::of_text("ABC\nDEF\nGHI"), Dimensions::new(3, 3));
        assert_eq!(Dimensions::of_text("ABCD\nEF"), Dimensions::new(4, 2));
        assert!(Dimensions::of_text("").is_empty());
    }

    #[test]
    fn test_fixed_frames() {
        let program = Program::from_frames(SourceType::Gif, vec!["a".into(), "b".into()]);
        assert_eq!(program.frame_count(), 2);
        assert_eq!(program.frame(1).as_deref(), Some("b"));
        assert_eq!(program.frame(2), None);
    }

    #[test]
    fn test_generated_frames() {
        let program = Program::generated(SourceType::Code, 3, |i| format!("frame {i}")).with_fps(0);
        assert_eq!(program.fps(), 1);
        assert_eq!(program.frame_count(), 3);
        assert_eq!(program.frame(2).as_deref(), Some("frame 2"));
        assert_eq!(program.frame(3), None);
    }
}
