//! # ascii-studio-core
//!
//! Display, animation hosting, and export core for an ASCII art studio.
//!
//! This crate provides platform-agnostic logic for:
//! - Rendering a text program into a fixed-size character grid surface
//! - Hosting one animation controller per surface and rebuilding it when
//!   its inputs change, carrying playback state across
//! - Exporting the grid as PNG, SVG, or a zip of numbered PNG frames
//! - Copying the grid text or its SVG to the clipboard
//!
//! ## Features
//!
//! - `serde` - Enable serialization/deserialization for data structures
//! - `toml` - Load [`settings::StudioConfig`] from TOML files
//! - `web` - Rasterize through an offscreen browser canvas
//! - `clipboard` - Write to the system clipboard
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use ascii_studio_core::{
//!     AnimationHost, AnimationOptions, Dimensions, ExportController, MemoryClipboard,
//!     MemorySink, Program, SourceType, SurfaceHandle,
//! };
//!
//! let mut host = AnimationHost::new();
//! host.mount(SurfaceHandle::default());
//!
//! let program = Rc::new(Program::generated(SourceType::Code, 8, |i| format!("{i:>2}")));
//! host.update(&program, AnimationOptions::default());
//!
//! let sink = Rc::new(MemorySink::new());
//! let mut exporter = ExportController::new(Rc::clone(&sink), MemoryClipboard::new());
//! exporter.sync_format(SourceType::Code, 8);
//! exporter
//!     .export_content(host.export_context(Dimensions::new(2, 1), 8))
//!     .unwrap();
//! assert!(sink.get("ascii-animation-frames.zip").is_some());
//! ```

mod animation;
mod archive;
mod color;
mod data;
mod error;
mod export;
mod host;
mod loader;
mod notify;
pub mod render;
pub mod settings;
mod sink;
pub mod sizing;
mod surface;
pub mod svg;

pub use animation::{
    AnimationControl, AnimationFactory, AnimationOptions, FrameCallback, FramePlayer, LoopMode,
    PlaybackState, PlayerFactory,
};
pub use archive::{frame_file_name, frame_name_width, FrameArchive};
pub use color::{parse_color, simplify_color, CURRENT_COLOR};
pub use data::{Dimensions, FrameFile, FrameGenerator, Program, SourceType};
pub use error::{AnimationError, ExportError, LoadError};
pub use export::{
    ExportContext, ExportController, ExportOutcome, ExportState, FRAMES_FILE_NAME,
    PNG_FILE_NAME, SVG_FILE_NAME,
};
pub use host::AnimationHost;
pub use loader::{load_program, load_program_dir, FrameDataProvider, FsProvider};
pub use notify::{LogNotifier, Notice, NoticeKind, Notifier, RecordingNotifier};
pub use settings::{AnimationSettings, ExportFormat, ExportScale, StudioConfig};
pub use sink::{
    Artifact, ArtifactSink, Clipboard, DirectorySink, MemoryClipboard, MemorySink,
};
pub use surface::{ContentSource, GridSurface, GridType, SurfaceHandle, SurfaceStyle};

#[cfg(feature = "toml")]
pub use error::ConfigError;

#[cfg(feature = "clipboard")]
pub use sink::SystemClipboard;

#[cfg(feature = "web")]
pub use render::web::CanvasRasterizer;
