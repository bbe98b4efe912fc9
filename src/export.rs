//! Export of the rendered grid as PNG, SVG, or a zip of PNG frames, and
//! clipboard copy of its text or SVG.
//!
//! The exporter never owns the animation controller. Each operation
//! borrows it through an [`ExportContext`], pauses playback for the
//! duration, and puts the previous frame and play state back afterwards.

use image::RgbaImage;

use crate::animation::AnimationControl;
use crate::archive::FrameArchive;
use crate::error::ExportError;
use crate::notify::{LogNotifier, Notifier};
use crate::render::{encode_png, BitmapRasterizer, CaptureScene, Rasterizer};
use crate::settings::{default_format, ExportFormat, ExportScale};
use crate::sink::{Artifact, ArtifactSink, Clipboard, PNG_MIME, SVG_MIME, ZIP_MIME};
use crate::sizing::{CellMetrics, GlyphMeasure, MonospaceAdvance};
use crate::surface::SurfaceHandle;
use crate::svg::{render_svg, SvgLayout};
use crate::{Dimensions, Program, SourceType};

pub const PNG_FILE_NAME: &str = "ascii-art.png";
pub const SVG_FILE_NAME: &str = "ascii-art.svg";
pub const FRAMES_FILE_NAME: &str = "ascii-animation-frames.zip";

/// Notification id shared by progress and completion of a frame export.
pub const PROGRESS_ID: &str = "export-progress";

/// Progress is reported every this many frames (and on the last one).
pub const PROGRESS_INTERVAL: usize = 5;

/// Export lifecycle. New exports are rejected while `Exporting`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportState {
    #[default]
    Idle,
    Exporting,
}

/// What an export operation did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Nothing to export
    Skipped,
    /// An artifact with this name was saved
    Saved(String),
    Copied,
}

/// Borrowed view of the state an export reads and drives.
pub struct ExportContext<'a> {
    pub program: Option<&'a Program>,
    pub controller: Option<&'a mut (dyn AnimationControl + 'static)>,
    pub surface: Option<&'a SurfaceHandle>,
    pub dimensions: Dimensions,
    /// Frames exported for animated sources
    pub animation_length: usize,
}

impl<'a> ExportContext<'a> {
    fn source_type(&self) -> Option<SourceType> {
        self.program.map(Program::source_type)
    }

    fn content(&self) -> Option<String> {
        self.surface?.borrow().content(self.dimensions)
    }
}

/// Drives exports and clipboard copies.
pub struct ExportController {
    format: ExportFormat,
    scale: ExportScale,
    state: ExportState,
    rasterizer: Box<dyn Rasterizer>,
    measure: Box<dyn GlyphMeasure>,
    sink: Box<dyn ArtifactSink>,
    clipboard: Box<dyn Clipboard>,
    notifier: Box<dyn Notifier>,
}

impl ExportController {
    /// Create a controller using the bitmap rasterizer and fixed glyph advance.
    pub fn new(sink: impl ArtifactSink + 'static, clipboard: impl Clipboard + 'static) -> Self {
        Self {
            format: ExportFormat::Svg,
            scale: ExportScale::default(),
            state: ExportState::Idle,
            rasterizer: Box::new(BitmapRasterizer::default()),
            measure: Box::new(MonospaceAdvance::default()),
            sink: Box::new(sink),
            clipboard: Box::new(clipboard),
            notifier: Box::new(LogNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: impl Rasterizer + 'static) -> Self {
        self.rasterizer = Box::new(rasterizer);
        self
    }

    pub fn with_glyph_measure(mut self, measure: impl GlyphMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    #[inline]
    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn set_format(&mut self, format: ExportFormat) {
        self.format = format;
    }

    #[inline]
    pub fn scale(&self) -> ExportScale {
        self.scale
    }

    pub fn set_scale(&mut self, scale: ExportScale) {
        self.scale = scale;
    }

    /// Reselect the format after the source type or animation length changed.
    pub fn sync_format(&mut self, source: SourceType, animation_length: usize) {
        self.format = default_format(source, animation_length);
    }

    #[inline]
    pub fn state(&self) -> ExportState {
        self.state
    }

    #[inline]
    pub fn is_exporting(&self) -> bool {
        self.state == ExportState::Exporting
    }

    fn begin(&mut self) -> Result<(), ExportError> {
        if self.is_exporting() {
            return Err(ExportError::Busy);
        }
        self.state = ExportState::Exporting;
        Ok(())
    }

    /// Export the current content in the selected format.
    ///
    /// Animated sources (code, gif, video) with a controller export
    /// `animation_length` frames; everything else exports one frame. Without
    /// a program this does nothing. Failures are reported through the
    /// notifier and the state always returns to idle.
    pub fn export_content(
        &mut self,
        mut ctx: ExportContext<'_>,
    ) -> Result<ExportOutcome, ExportError> {
        let Some(source) = ctx.source_type() else {
            return Ok(ExportOutcome::Skipped);
        };
        self.begin()?;

        let animated = source.is_animated() && ctx.controller.is_some();
        let total = if animated { ctx.animation_length.max(1) } else { 1 };

        let mut was_playing = false;
        let mut current_frame = 0;
        if animated {
            if let Some(controller) = ctx.controller.as_deref_mut() {
                was_playing = controller.state().playing;
                controller.toggle_play(false);
                current_frame = controller.state().frame;
            }
        }

        let result = if total == 1 {
            let result = self.export_single_frame(&ctx);
            if animated && was_playing {
                if let Some(controller) = ctx.controller.as_deref_mut() {
                    controller.toggle_play(true);
                }
            }
            result
        } else {
            self.export_animation_frames(&mut ctx, total, current_frame, was_playing)
        };

        self.state = ExportState::Idle;
        if let Err(err) = &result {
            log::error!("Error exporting frames: {}", err);
            if !matches!(err, ExportError::SurfaceNotFound) {
                self.notifier.error("An error occurred while exporting");
            }
        }
        result
    }

    fn export_single_frame(&self, ctx: &ExportContext<'_>) -> Result<ExportOutcome, ExportError> {
        self.notifier.info("Preparing image...");
        match self.format {
            ExportFormat::Svg => self.export_as_svg(ctx),
            ExportFormat::Png | ExportFormat::Frames => self.export_as_png(ctx),
        }
    }

    /// Capture the grid and save it as `ascii-art.png`.
    pub fn export_as_png(&self, ctx: &ExportContext<'_>) -> Result<ExportOutcome, ExportError> {
        let Some(image) = self.capture_frame(ctx)? else {
            return Ok(ExportOutcome::Skipped);
        };
        let png = encode_png(&image)?;
        self.sink.save(Artifact::new(PNG_FILE_NAME, PNG_MIME, png))?;

        self.notifier.info("Frame has been exported as PNG");
        Ok(ExportOutcome::Saved(PNG_FILE_NAME.to_string()))
    }

    /// Synthesize SVG markup and save it as `ascii-art.svg`.
    pub fn export_as_svg(&self, ctx: &ExportContext<'_>) -> Result<ExportOutcome, ExportError> {
        let svg = self.generate_svg(ctx)?;
        self.sink.save(Artifact::new(SVG_FILE_NAME, SVG_MIME, svg.into_bytes()))?;

        self.notifier.info("Exported as SVG");
        Ok(ExportOutcome::Saved(SVG_FILE_NAME.to_string()))
    }

    /// SVG markup for the current frame.
    ///
    /// Reads the surface text directly and infers the cell width by measuring
    /// glyphs. Notifies and fails with [`ExportError::SurfaceNotFound`] when
    /// no surface is mounted.
    pub fn generate_svg(&self, ctx: &ExportContext<'_>) -> Result<String, ExportError> {
        let Some(handle) = ctx.surface else {
            self.notifier.info("Could not find ASCII content");
            return Err(ExportError::SurfaceNotFound);
        };
        let surface = handle.borrow();
        let style = surface.style();

        let lines: Vec<String> = surface
            .content(ctx.dimensions)
            .map(|content| content.split('\n').map(str::to_string).collect())
            .unwrap_or_default();
        let layout = SvgLayout {
            dimensions: ctx.dimensions,
            metrics: CellMetrics::measure(
                self.measure.as_ref(),
                style.font_size,
                style.line_height,
            ),
            font_family: &style.font_family,
            grid: surface.overlay(),
        };
        Ok(render_svg(&lines, &layout))
    }

    /// Export `total` frames into `ascii-animation-frames.zip`.
    ///
    /// Each frame is seeked, confirmed rendered, captured, and added as
    /// `frame_NNNN.png`. Afterwards the controller is left at
    /// `restore_frame` with playing set to `restore_playing`, whatever
    /// happened. If a frame fails, the frames captured so far are still
    /// archived and saved before the error is returned.
    pub fn export_animation_frames(
        &self,
        ctx: &mut ExportContext<'_>,
        total: usize,
        restore_frame: usize,
        restore_playing: bool,
    ) -> Result<ExportOutcome, ExportError> {
        let mut archive = FrameArchive::new(total);
        let mut failure = None;

        for index in 0..total {
            let png = match self.capture_animation_frame(ctx, index) {
                Ok(Some(png)) => png,
                Ok(None) => continue,
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            };
            if let Err(err) = archive.add_frame(index, &png) {
                failure = Some(err);
                break;
            }

            if index % PROGRESS_INTERVAL == 0 || index == total - 1 {
                let percent = ((index + 1) as f64 / total as f64 * 100.0).round();
                self.notifier
                    .loading(PROGRESS_ID, &format!("Exporting frames: {percent}%"));
            }
        }

        if let Some(controller) = ctx.controller.as_deref_mut() {
            controller.set_frame(restore_frame);
            controller.toggle_play(restore_playing);
        }

        let written = archive.len();
        let saved = archive
            .finish()
            .and_then(|bytes| self.sink.save(Artifact::new(FRAMES_FILE_NAME, ZIP_MIME, bytes)));

        if let Some(err) = failure {
            match &saved {
                Ok(()) => log::warn!("Saved partial archive with {} of {} frames", written, total),
                Err(save_err) => log::error!("Could not save partial archive: {}", save_err),
            }
            return Err(err);
        }
        saved?;

        log::info!("Exported {} frames to {}", written, FRAMES_FILE_NAME);
        self.notifier.success(PROGRESS_ID, "Export complete!");
        Ok(ExportOutcome::Saved(FRAMES_FILE_NAME.to_string()))
    }

    /// Seek to `index`, wait for the render signal, capture and encode.
    fn capture_animation_frame(
        &self,
        ctx: &mut ExportContext<'_>,
        index: usize,
    ) -> Result<Option<Vec<u8>>, ExportError> {
        if let Some(controller) = ctx.controller.as_deref_mut() {
            controller.set_frame(index);
            let expected = controller.state().frame;
            let rendered = controller.rendered_frame();
            if rendered != Some(expected) {
                return Err(ExportError::RenderNotFlushed { expected, rendered });
            }
        }

        match self.capture_frame(ctx)? {
            Some(image) => encode_png(&image).map(Some),
            None => Ok(None),
        }
    }

    /// Rasterize the surface and its overlay at the selected scale.
    ///
    /// Returns `None` when there is no surface or nothing rendered on it.
    pub fn capture_frame(&self, ctx: &ExportContext<'_>) -> Result<Option<RgbaImage>, ExportError> {
        let Some(handle) = ctx.surface else {
            return Ok(None);
        };
        let Some(mut scene) = CaptureScene::from_surface(&handle.borrow(), ctx.dimensions) else {
            return Ok(None);
        };
        scene.prepare();
        self.rasterizer.capture(&scene, self.scale.factor()).map(Some)
    }

    /// Copy the plain grid text to the clipboard.
    pub fn copy_text(&self, ctx: &ExportContext<'_>) -> Result<ExportOutcome, ExportError> {
        if ctx.program.is_none() {
            return Ok(ExportOutcome::Skipped);
        }

        let text = ctx.content().unwrap_or_default();
        match self.clipboard.write_text(&text) {
            Ok(()) => {
                self.notifier.info("ASCII art has been copied to your clipboard");
                Ok(ExportOutcome::Copied)
            }
            Err(err) => {
                log::error!("Error copying to clipboard: {}", err);
                self.notifier.error("Could not copy to clipboard");
                Err(err)
            }
        }
    }

    /// Copy the SVG markup of the current frame to the clipboard.
    pub fn copy_svg(&mut self, ctx: &ExportContext<'_>) -> Result<ExportOutcome, ExportError> {
        if ctx.program.is_none() {
            return Ok(ExportOutcome::Skipped);
        }
        self.begin()?;

        let result = self
            .generate_svg(ctx)
            .and_then(|svg| self.clipboard.write_text(&svg));
        self.state = ExportState::Idle;

        match result {
            Ok(()) => {
                self.notifier.info("SVG has been copied to clipboard");
                Ok(ExportOutcome::Copied)
            }
            Err(ExportError::SurfaceNotFound) => Err(ExportError::SurfaceNotFound),
            Err(err) => {
                log::error!("Error copying SVG to clipboard: {}", err);
                self.notifier.error("Failed to copy SVG to clipboard");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationOptions, FramePlayer, PlaybackState};
    use crate::notify::{NoticeKind, RecordingNotifier};
    use crate::sink::{MemoryClipboard, MemorySink};
    use crate::surface::{GridSurface, GridType, SurfaceStyle};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::rc::Rc;

    struct Harness {
        exporter: ExportController,
        sink: Rc<MemorySink>,
        clipboard: Rc<MemoryClipboard>,
        notifier: Rc<RecordingNotifier>,
    }

    fn harness_with(clipboard: MemoryClipboard) -> Harness {
        let sink = Rc::new(MemorySink::new());
        let clipboard = Rc::new(clipboard);
        let notifier = Rc::new(RecordingNotifier::new());
        let exporter = ExportController::new(Rc::clone(&sink), Rc::clone(&clipboard))
            .with_notifier(Rc::clone(&notifier));
        Harness {
            exporter,
            sink,
            clipboard,
            notifier,
        }
    }

    fn harness() -> Harness {
        harness_with(MemoryClipboard::new())
    }

    fn animated(count: usize) -> (Rc<Program>, SurfaceHandle, FramePlayer) {
        let program = Rc::new(Program::generated(SourceType::Code, count, |i| {
            format!("{:02}\n{:02}", i % 100, i % 100)
        }));
        let surface = SurfaceHandle::default();
        let player =
            FramePlayer::new(Rc::clone(&program), surface.clone(), &AnimationOptions::default())
                .unwrap();
        (program, surface, player)
    }

    fn still(text: &str) -> (Program, SurfaceHandle) {
        let surface = SurfaceHandle::default();
        surface.borrow_mut().set_text(text);
        (Program::still(SourceType::Image, text), surface)
    }

    fn zip_names(bytes: &[u8]) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_no_program_is_noop() {
        let mut h = harness();
        let surface = SurfaceHandle::default();
        let ctx = || ExportContext {
            program: None,
            controller: None,
            surface: Some(&surface),
            dimensions: Dimensions::new(2, 2),
            animation_length: 10,
        };

        assert_eq!(h.exporter.export_content(ctx()).unwrap(), ExportOutcome::Skipped);
        assert_eq!(h.exporter.copy_text(&ctx()).unwrap(), ExportOutcome::Skipped);
        assert_eq!(h.exporter.copy_svg(&ctx()).unwrap(), ExportOutcome::Skipped);
        assert!(h.notifier.is_empty());
        assert!(h.sink.is_empty());
        assert_eq!(h.clipboard.contents(), None);
        assert_eq!(h.exporter.state(), ExportState::Idle);
    }

    #[test]
    fn test_still_exports_svg() {
        let mut h = harness();
        let (program, surface) = still("AB\nCD");
        h.exporter.sync_format(SourceType::Image, 10);
        assert_eq!(h.exporter.format(), ExportFormat::Svg);

        let outcome = h
            .exporter
            .export_content(ExportContext {
                program: Some(&program),
                controller: None,
                surface: Some(&surface),
                dimensions: Dimensions::new(2, 2),
                animation_length: 10,
            })
            .unwrap();

        assert_eq!(outcome, ExportOutcome::Saved(SVG_FILE_NAME.into()));
        let artifact = h.sink.get(SVG_FILE_NAME).unwrap();
        assert_eq!(artifact.mime, SVG_MIME);
        let svg = String::from_utf8(artifact.bytes).unwrap();
        assert!(svg.contains(">AB</tspan>"));
        assert!(svg.contains(">CD</tspan>"));
        assert_eq!(h.notifier.messages(), vec!["Preparing image...", "Exported as SVG"]);
        assert_eq!(h.exporter.state(), ExportState::Idle);
    }

    #[test]
    fn test_still_exports_png_at_scale() {
        let mut h = harness();
        let (program, surface) = still("AB\nCD");
        h.exporter.set_format(ExportFormat::Png);
        h.exporter.set_scale(ExportScale::X3);

        h.exporter
            .export_content(ExportContext {
                program: Some(&program),
                controller: None,
                surface: Some(&surface),
                dimensions: Dimensions::new(2, 2),
                animation_length: 1,
            })
            .unwrap();

        let artifact = h.sink.get(PNG_FILE_NAME).unwrap();
        let decoded = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (2 * 8 * 3, 2 * 16 * 3));
        assert_eq!(
            h.notifier.messages(),
            vec!["Preparing image...", "Frame has been exported as PNG"]
        );
    }

    #[test]
    fn test_png_without_surface_is_skipped() {
        let mut h = harness();
        let program = Program::still(SourceType::Image, "x");
        h.exporter.set_format(ExportFormat::Png);

        let outcome = h
            .exporter
            .export_content(ExportContext {
                program: Some(&program),
                controller: None,
                surface: None,
                dimensions: Dimensions::new(1, 1),
                animation_length: 1,
            })
            .unwrap();
        assert_eq!(outcome, ExportOutcome::Skipped);
        assert!(h.sink.is_empty());
    }

    #[test]
    fn test_svg_without_surface_notifies_once() {
        let mut h = harness();
        let program = Program::still(SourceType::Image, "x");

        let result = h.exporter.export_content(ExportContext {
            program: Some(&program),
            controller: None,
            surface: None,
            dimensions: Dimensions::new(1, 1),
            animation_length: 1,
        });
        assert!(matches!(result, Err(ExportError::SurfaceNotFound)));
        assert_eq!(
            h.notifier.messages(),
            vec!["Preparing image...", "Could not find ASCII content"]
        );
        assert!(h.sink.is_empty());
        assert!(!h.exporter.is_exporting());
    }

    #[test]
    fn test_animation_export_writes_all_frames() {
        let mut h = harness();
        let (program, surface, mut player) = animated(12);
        player.set_frame(7);
        player.toggle_play(true);
        h.exporter.sync_format(SourceType::Code, 12);

        let outcome = h
            .exporter
            .export_content(ExportContext {
                program: Some(&program),
                controller: Some(&mut player),
                surface: Some(&surface),
                dimensions: Dimensions::new(2, 2),
                animation_length: 12,
            })
            .unwrap();

        assert_eq!(outcome, ExportOutcome::Saved(FRAMES_FILE_NAME.into()));
        let artifact = h.sink.get(FRAMES_FILE_NAME).unwrap();
        assert_eq!(artifact.mime, ZIP_MIME);
        let expected: Vec<String> = (0..12).map(|i| format!("frame_{i:04}.png")).collect();
        assert_eq!(zip_names(&artifact.bytes), expected);

        assert_eq!(player.state(), PlaybackState { playing: true, frame: 7 });
        assert_eq!(surface.borrow().text(), "07\n07");
    }

    #[test]
    fn test_blank_frame_is_exported() {
        let mut h = harness();
        let program = Rc::new(Program::generated(SourceType::Code, 3, |i| {
            if i == 1 { String::new() } else { "ab".to_string() }
        }));
        let surface = SurfaceHandle::default();
        let mut player =
            FramePlayer::new(Rc::clone(&program), surface.clone(), &AnimationOptions::default())
                .unwrap();
        let mut ctx = ExportContext {
            program: Some(&program),
            controller: Some(&mut player),
            surface: Some(&surface),
            dimensions: Dimensions::new(2, 1),
            animation_length: 3,
        };
        h.exporter.export_animation_frames(&mut ctx, 3, 0, false).unwrap();

        let archive = h.sink.get(FRAMES_FILE_NAME).unwrap();
        assert_eq!(
            zip_names(&archive.bytes),
            vec!["frame_0000.png", "frame_0001.png", "frame_0002.png"]
        );

        player.set_frame(1);
        h.exporter.set_format(ExportFormat::Png);
        let outcome = h
            .exporter
            .export_content(ExportContext {
                program: Some(&program),
                controller: None,
                surface: Some(&surface),
                dimensions: Dimensions::new(2, 1),
                animation_length: 1,
            })
            .unwrap();
        assert_eq!(outcome, ExportOutcome::Saved(PNG_FILE_NAME.into()));
    }

    #[test]
    fn test_progress_notifications() {
        let h = harness();
        let (program, surface, mut player) = animated(12);
        let mut ctx = ExportContext {
            program: Some(&program),
            controller: Some(&mut player),
            surface: Some(&surface),
            dimensions: Dimensions::new(2, 2),
            animation_length: 12,
        };

        h.exporter.export_animation_frames(&mut ctx, 12, 0, false).unwrap();

        assert_eq!(
            h.notifier.messages(),
            vec![
                "Exporting frames: 8%",
                "Exporting frames: 50%",
                "Exporting frames: 92%",
                "Exporting frames: 100%",
                "Export complete!",
            ]
        );
        let notices = h.notifier.notices();
        assert!(notices.iter().all(|n| n.id.as_deref() == Some(PROGRESS_ID)));
        assert_eq!(notices.last().unwrap().kind, NoticeKind::Success);
    }

    #[test]
    fn test_restores_state_for_any_length() {
        for (total, frame, playing) in [(1, 0, true), (5, 3, false), (10, 9, true)] {
            let h = harness();
            let (program, surface, mut player) = animated(10);
            player.toggle_play(!playing);
            let mut ctx = ExportContext {
                program: Some(&program),
                controller: Some(&mut player),
                surface: Some(&surface),
                dimensions: Dimensions::new(2, 2),
                animation_length: total,
            };
            h.exporter
                .export_animation_frames(&mut ctx, total, frame, playing)
                .unwrap();

            assert_eq!(player.state(), PlaybackState { playing, frame });
            let archive = h.sink.get(FRAMES_FILE_NAME).unwrap();
            assert_eq!(zip_names(&archive.bytes).len(), total);
        }
    }

    /// Rasterizer failing from the given capture onwards.
    struct FailingAfter {
        remaining: std::cell::Cell<usize>,
    }

    impl Rasterizer for FailingAfter {
        fn capture(&self, scene: &CaptureScene, scale: u32) -> Result<RgbaImage, ExportError> {
            if self.remaining.get() == 0 {
                return Err(ExportError::Capture("device lost".into()));
            }
            self.remaining.set(self.remaining.get() - 1);
            BitmapRasterizer::default().capture(scene, scale)
        }
    }

    #[test]
    fn test_failed_frame_saves_partial_archive() {
        let mut h = harness();
        h.exporter = h.exporter.with_rasterizer(FailingAfter {
            remaining: std::cell::Cell::new(3),
        });
        let (program, surface, mut player) = animated(10);
        player.set_frame(4);
        player.toggle_play(true);

        let result = h.exporter.export_content(ExportContext {
            program: Some(&program),
            controller: Some(&mut player),
            surface: Some(&surface),
            dimensions: Dimensions::new(2, 2),
            animation_length: 10,
        });

        assert!(matches!(result, Err(ExportError::Capture(_))));
        assert_eq!(player.state(), PlaybackState { playing: true, frame: 4 });
        let archive = h.sink.get(FRAMES_FILE_NAME).unwrap();
        assert_eq!(
            zip_names(&archive.bytes),
            vec!["frame_0000.png", "frame_0001.png", "frame_0002.png"]
        );
        assert_eq!(
            h.notifier.messages().last().map(String::as_str),
            Some("An error occurred while exporting")
        );
        assert!(!h.exporter.is_exporting());
    }

    /// Controller that never reports a render.
    struct Stalled(PlaybackState);

    impl AnimationControl for Stalled {
        fn state(&self) -> PlaybackState {
            self.0
        }
        fn set_frame(&mut self, frame: usize) {
            self.0.frame = frame;
        }
        fn toggle_play(&mut self, playing: bool) {
            self.0.playing = playing;
        }
        fn tick(&mut self) -> bool {
            false
        }
        fn rendered_frame(&self) -> Option<usize> {
            None
        }
        fn cleanup(&mut self) {}
    }

    #[test]
    fn test_unflushed_render_aborts() {
        let h = harness();
        let (program, surface) = still("ab");
        let mut controller = Stalled(PlaybackState { playing: false, frame: 2 });
        let mut ctx = ExportContext {
            program: Some(&program),
            controller: Some(&mut controller),
            surface: Some(&surface),
            dimensions: Dimensions::new(2, 1),
            animation_length: 3,
        };

        let result = h.exporter.export_animation_frames(&mut ctx, 3, 2, false);
        assert!(matches!(
            result,
            Err(ExportError::RenderNotFlushed { expected: 0, rendered: None })
        ));
        assert_eq!(controller.state().frame, 2);
    }

    #[test]
    fn test_single_frame_animation_resumes_playback() {
        let mut h = harness();
        let (program, surface, mut player) = animated(4);
        player.toggle_play(true);
        h.exporter.sync_format(SourceType::Code, 1);

        h.exporter
            .export_content(ExportContext {
                program: Some(&program),
                controller: Some(&mut player),
                surface: Some(&surface),
                dimensions: Dimensions::new(2, 2),
                animation_length: 1,
            })
            .unwrap();

        assert!(h.sink.get(SVG_FILE_NAME).is_some());
        assert!(player.state().playing);
    }

    #[test]
    fn test_busy_rejects_reentry() {
        let mut h = harness();
        let (program, surface) = still("x");
        h.exporter.state = ExportState::Exporting;

        let ctx = ExportContext {
            program: Some(&program),
            controller: None,
            surface: Some(&surface),
            dimensions: Dimensions::new(1, 1),
            animation_length: 1,
        };
        assert!(matches!(h.exporter.copy_svg(&ctx), Err(ExportError::Busy)));
        assert!(matches!(h.exporter.export_content(ctx), Err(ExportError::Busy)));
        assert!(h.sink.is_empty());
    }

    #[test]
    fn test_copy_text() {
        let h = harness();
        let (program, surface) = still("ab\ncd");
        let ctx = ExportContext {
            program: Some(&program),
            controller: None,
            surface: Some(&surface),
            dimensions: Dimensions::new(3, 2),
            animation_length: 1,
        };

        assert_eq!(h.exporter.copy_text(&ctx).unwrap(), ExportOutcome::Copied);
        assert_eq!(h.clipboard.contents().as_deref(), Some("ab \ncd "));
        assert_eq!(
            h.notifier.messages(),
            vec!["ASCII art has been copied to your clipboard"]
        );
    }

    #[test]
    fn test_copy_failures_notify() {
        let mut h = harness_with(MemoryClipboard::rejecting());
        let (program, surface) = still("ab");
        let ctx = ExportContext {
            program: Some(&program),
            controller: None,
            surface: Some(&surface),
            dimensions: Dimensions::new(2, 1),
            animation_length: 1,
        };

        assert!(matches!(h.exporter.copy_text(&ctx), Err(ExportError::Clipboard(_))));
        assert!(matches!(h.exporter.copy_svg(&ctx), Err(ExportError::Clipboard(_))));
        assert_eq!(
            h.notifier.messages(),
            vec!["Could not copy to clipboard", "Failed to copy SVG to clipboard"]
        );
        assert!(!h.exporter.is_exporting());
    }

    #[test]
    fn test_copy_svg_with_grid_overlay() {
        let mut h = harness();
        let surface = SurfaceHandle::new(GridSurface::with_style(SurfaceStyle::default()));
        surface.borrow_mut().set_text("abc\ndef");
        surface.borrow_mut().set_overlay(GridType::Both);
        let program = Program::still(SourceType::Image, "abc\ndef");

        let ctx = ExportContext {
            program: Some(&program),
            controller: None,
            surface: Some(&surface),
            dimensions: Dimensions::new(3, 2),
            animation_length: 1,
        };
        assert_eq!(h.exporter.copy_svg(&ctx).unwrap(), ExportOutcome::Copied);

        let svg = h.clipboard.contents().unwrap();
        assert_eq!(svg.matches("<line class=\"grid-line\"").count(), 1 + 2);
        assert_eq!(h.notifier.messages(), vec!["SVG has been copied to clipboard"]);
    }
}
