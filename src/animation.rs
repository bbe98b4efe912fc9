//! Animation controllers that play a program into a grid surface.

use std::fmt;
use std::rc::Rc;

use crate::error::AnimationError;
use crate::surface::SurfaceHandle;
use crate::Program;

/// Snapshot of a controller's playback position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub playing: bool,
    pub frame: usize,
}

/// Commands and queries supported by an animation controller.
///
/// A controller is bound to one surface for its whole life. `set_frame`
/// renders synchronously: once it returns, [`rendered_frame`] reports the
/// frame now on the surface, which is what exporters wait on before capture.
///
/// [`rendered_frame`]: AnimationControl::rendered_frame
pub trait AnimationControl {
    fn state(&self) -> PlaybackState;

    /// Seek to `frame` and render it.
    fn set_frame(&mut self, frame: usize);

    /// Start (`true`) or pause (`false`) playback.
    fn toggle_play(&mut self, playing: bool);

    /// Advance one step if playing. Returns `true` when a new frame was rendered.
    fn tick(&mut self) -> bool;

    /// Index of the frame currently on the surface, if any.
    fn rendered_frame(&self) -> Option<usize>;

    /// Release timers and listeners. The controller is inert afterwards.
    fn cleanup(&mut self);
}

/// Callback invoked with the frame index after each render.
pub type FrameCallback = Rc<dyn Fn(usize)>;

/// Per-controller options supplied by the host's owner.
#[derive(Clone, Default)]
pub struct AnimationOptions {
    /// Cap on the number of frames played
    pub max_frames: Option<usize>,
    pub on_frame_update: Option<FrameCallback>,
}

impl AnimationOptions {
    /// Whether two option sets would produce the same controller.
    ///
    /// Callbacks compare by identity.
    pub fn same_as(&self, other: &AnimationOptions) -> bool {
        let same_callback = match (&self.on_frame_update, &other.on_frame_update) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        self.max_frames == other.max_frames && same_callback
    }
}

impl fmt::Debug for AnimationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationOptions")
            .field("max_frames", &self.max_frames)
            .field("on_frame_update", &self.on_frame_update.is_some())
            .finish()
    }
}

/// Creates controllers for the animation host.
pub trait AnimationFactory {
    fn create(
        &self,
        program: &Rc<Program>,
        surface: SurfaceHandle,
        options: &AnimationOptions,
    ) -> Result<Box<dyn AnimationControl>, AnimationError>;
}

/// Loop mode for animation playback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Stop at the end of the animation
    Once,
    /// Loop back to start when reaching the end
    #[default]
    Loop,
}

/// Factory producing [`FramePlayer`] controllers.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlayerFactory {
    pub loop_mode: LoopMode,
}

impl AnimationFactory for PlayerFactory {
    fn create(
        &self,
        program: &Rc<Program>,
        surface: SurfaceHandle,
        options: &AnimationOptions,
    ) -> Result<Box<dyn AnimationControl>, AnimationError> {
        let mut player = FramePlayer::new(Rc::clone(program), surface, options)?;
        player.set_loop_mode(self.loop_mode);
        Ok(Box::new(player))
    }
}

/// Default controller: plays a program's frames into a surface.
///
/// Timing is left to the caller, which calls `tick()` at the rate given by
/// `interval_ms()`.
///
/// ## Example
///
/// ```rust
/// use std::rc::Rc;
/// use ascii_studio_core::{
///     AnimationControl, AnimationOptions, FramePlayer, Program, SourceType, SurfaceHandle,
/// };
///
/// let program = Rc::new(Program::generated(SourceType::Code, 10, |i| i.to_string()).with_fps(24));
/// let surface = SurfaceHandle::default();
/// let mut player =
///     FramePlayer::new(program, surface.clone(), &AnimationOptions::default()).unwrap();
///
/// player.toggle_play(true);
/// for _ in 0..3 {
///     player.tick();
/// }
/// assert_eq!(player.state().frame, 3);
/// assert_eq!(surface.borrow().text(), "3");
/// assert_eq!(player.interval_ms(), 41);
/// ```
pub struct FramePlayer {
    program: Rc<Program>,
    surface: SurfaceHandle,
    on_frame_update: Option<FrameCallback>,
    /// Current frame index
    current_frame: usize,
    /// Number of playable frames (after `max_frames`)
    frame_count: usize,
    fps: u32,
    playing: bool,
    loop_mode: LoopMode,
    /// Last frame written to the surface
    rendered: Option<usize>,
    /// Cleared by `cleanup()`
    active: bool,
}

impl FramePlayer {
    /// Create a player and render the first frame.
    pub fn new(
        program: Rc<Program>,
        surface: SurfaceHandle,
        options: &AnimationOptions,
    ) -> Result<Self, AnimationError> {
        let mut frame_count = program.frame_count();
        if let Some(max) = options.max_frames {
            frame_count = frame_count.min(max);
        }
        if frame_count == 0 {
            return Err(AnimationError::NoFrames);
        }

        let mut player = Self {
            fps: program.fps(),
            program,
            surface,
            on_frame_update: options.on_frame_update.clone(),
            current_frame: 0,
            frame_count,
            playing: false,
            loop_mode: LoopMode::Loop,
            rendered: None,
            active: true,
        };
        player.render();
        Ok(player)
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Set the playback FPS.
    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps.max(1);
    }

    #[inline]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Get the interval in milliseconds between frames.
    ///
    /// Use this to configure your timer.
    #[inline]
    pub fn interval_ms(&self) -> u32 {
        (1000.0 / self.fps as f64).max(1.0) as u32
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    #[inline]
    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn render(&mut self) {
        if !self.active {
            return;
        }
        let text = self
            .program
            .frame(self.current_frame)
            .map(|frame| frame.into_owned())
            .unwrap_or_default();
        self.surface.borrow_mut().set_text(text);
        self.rendered = Some(self.current_frame);

        if let Some(callback) = &self.on_frame_update {
            callback(self.current_frame);
        }
    }
}

impl AnimationControl for FramePlayer {
    fn state(&self) -> PlaybackState {
        PlaybackState {
            playing: self.playing,
            frame: self.current_frame,
        }
    }

    /// Frames past the end wrap around, matching looped playback.
    fn set_frame(&mut self, frame: usize) {
        self.current_frame = frame % self.frame_count;
        self.render();
    }

    fn toggle_play(&mut self, playing: bool) {
        self.playing = playing && self.active;
    }

    fn tick(&mut self) -> bool {
        if !self.playing || !self.active {
            return false;
        }

        if self.current_frame + 1 >= self.frame_count {
            match self.loop_mode {
                LoopMode::Loop => self.current_frame = 0,
                LoopMode::Once => {
                    self.playing = false;
                    return false;
                }
            }
        } else {
            self.current_frame += 1;
        }
        self.render();
        true
    }

    fn rendered_frame(&self) -> Option<usize> {
        self.rendered
    }

    fn cleanup(&mut self) {
        log::debug!("Cleaning up frame player at frame {}", self.current_frame);
        self.playing = false;
        self.active = false;
        self.on_frame_update = None;
    }
}

impl fmt::Debug for FramePlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramePlayer")
            .field("program", &self.program)
            .field("current_frame", &self.current_frame)
            .field("frame_count", &self.frame_count)
            .field("fps", &self.fps)
            .field("playing", &self.playing)
            .field("loop_mode", &self.loop_mode)
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceType;
    use std::cell::RefCell;

    fn numbered(count: usize) -> Rc<Program> {
        Rc::new(Program::generated(SourceType::Code, count, |i| format!("#{i}")))
    }

    fn player(count: usize) -> (FramePlayer, SurfaceHandle) {
        let surface = SurfaceHandle::default();
        let player =
            FramePlayer::new(numbered(count), surface.clone(), &AnimationOptions::default())
                .unwrap();
        (player, surface)
    }

    #[test]
    fn test_renders_first_frame_on_creation() {
        let (player, surface) = player(5);
        assert_eq!(surface.borrow().text(), "#0");
        assert_eq!(player.rendered_frame(), Some(0));
        assert_eq!(player.state(), PlaybackState { playing: false, frame: 0 });
    }

    #[test]
    fn test_basic_playback() {
        let (mut ctrl, surface) = player(10);

        ctrl.toggle_play(true);
        for _ in 0..5 {
            assert!(ctrl.tick());
        }
        assert_eq!(ctrl.state().frame, 5);
        assert_eq!(surface.borrow().text(), "#5");

        ctrl.toggle_play(false);
        assert!(!ctrl.tick());
        assert_eq!(ctrl.state().frame, 5);
    }

    #[test]
    fn test_loop_mode() {
        let (mut ctrl, _) = player(5);
        ctrl.toggle_play(true);

        // 0 -> 1 -> 2 -> 3 -> 4 -> 0 -> 1
        for _ in 0..6 {
            ctrl.tick();
        }
        assert_eq!(ctrl.state().frame, 1);
        assert!(ctrl.state().playing);
    }

    #[test]
    fn test_once_mode() {
        let (mut ctrl, _) = player(5);
        ctrl.set_loop_mode(LoopMode::Once);
        ctrl.toggle_play(true);

        for _ in 0..5 {
            ctrl.tick();
        }
        assert_eq!(ctrl.state().frame, 4);
        assert!(!ctrl.state().playing);
    }

    #[test]
    fn test_set_frame_renders_and_wraps() {
        let (mut ctrl, surface) = player(4);

        ctrl.set_frame(3);
        assert_eq!(ctrl.rendered_frame(), Some(3));
        assert_eq!(surface.borrow().text(), "#3");

        ctrl.set_frame(6);
        assert_eq!(ctrl.state().frame, 2);
        assert_eq!(ctrl.rendered_frame(), Some(2));
    }

    #[test]
    fn test_max_frames_caps_playback() {
        let surface = SurfaceHandle::default();
        let options = AnimationOptions {
            max_frames: Some(3),
            ..Default::default()
        };
        let mut ctrl = FramePlayer::new(numbered(10), surface, &options).unwrap();
        assert_eq!(ctrl.frame_count(), 3);

        ctrl.toggle_play(true);
        for _ in 0..3 {
            ctrl.tick();
        }
        assert_eq!(ctrl.state().frame, 0);
    }

    #[test]
    fn test_empty_program_fails() {
        let program = Rc::new(Program::from_frames(SourceType::Gif, Vec::new()));
        let result =
            FramePlayer::new(program, SurfaceHandle::default(), &AnimationOptions::default());
        assert!(matches!(result, Err(AnimationError::NoFrames)));
    }

    #[test]
    fn test_frame_update_callback() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let options = AnimationOptions {
            on_frame_update: Some(Rc::new(move |frame| sink.borrow_mut().push(frame))),
            ..Default::default()
        };
        let mut ctrl = FramePlayer::new(numbered(3), SurfaceHandle::default(), &options).unwrap();
        ctrl.set_frame(2);
        ctrl.toggle_play(true);
        ctrl.tick();

        assert_eq!(*seen.borrow(), vec![0, 2, 0]);
    }

    #[test]
    fn test_cleanup_stops_playback() {
        let (mut ctrl, surface) = player(5);
        ctrl.toggle_play(true);
        ctrl.cleanup();

        assert!(!ctrl.is_active());
        assert!(!ctrl.tick());
        ctrl.toggle_play(true);
        assert!(!ctrl.state().playing);

        ctrl.set_frame(3);
        assert_eq!(surface.borrow().text(), "#0");
    }

    #[test]
    fn test_interval_ms() {
        let (mut ctrl, _) = player(2);
        ctrl.set_fps(24);
        assert_eq!(ctrl.interval_ms(), 41);
        ctrl.set_fps(60);
        assert_eq!(ctrl.interval_ms(), 16);
        ctrl.set_fps(0);
        assert_eq!(ctrl.fps(), 1);
    }

    #[test]
    fn test_options_identity() {
        let callback: FrameCallback = Rc::new(|_| {});
        let a = AnimationOptions {
            max_frames: Some(4),
            on_frame_update: Some(Rc::clone(&callback)),
        };
        let b = a.clone();
        let c = AnimationOptions {
            max_frames: Some(4),
            on_frame_update: Some(Rc::new(|_| {})),
        };
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
        assert!(!a.same_as(&AnimationOptions::default()));
    }
}
