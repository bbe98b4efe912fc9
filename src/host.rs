//! Owner of the grid surface and its single live animation controller.

use std::rc::Rc;

use crate::animation::{
    AnimationControl, AnimationFactory, AnimationOptions, PlaybackState, PlayerFactory,
};
use crate::export::ExportContext;
use crate::surface::SurfaceHandle;
use crate::{Dimensions, Program};

/// Hosts an animation on a surface.
///
/// The host is the only owner of the controller. Consumers borrow it through
/// [`controller`](AnimationHost::controller) /
/// [`controller_mut`](AnimationHost::controller_mut) or use the forwarding
/// commands, so at most one controller is ever live.
///
/// ## Example
///
/// ```rust
/// use std::rc::Rc;
/// use ascii_studio_core::{AnimationHost, AnimationOptions, Program, SourceType, SurfaceHandle};
///
/// let mut host = AnimationHost::new();
/// host.mount(SurfaceHandle::default());
///
/// let program = Rc::new(Program::from_frames(SourceType::Gif, vec!["a".into(), "b".into()]));
/// host.update(&program, AnimationOptions::default());
/// host.set_frame(1);
/// assert_eq!(host.state().frame, 1);
/// ```
pub struct AnimationHost<F: AnimationFactory = PlayerFactory> {
    factory: F,
    surface: Option<SurfaceHandle>,
    controller: Option<Box<dyn AnimationControl>>,
    program: Option<Rc<Program>>,
    options: AnimationOptions,
    /// Set when the inputs changed since the last initialization
    dirty: bool,
}

impl AnimationHost<PlayerFactory> {
    pub fn new() -> Self {
        Self::with_factory(PlayerFactory::default())
    }
}

impl Default for AnimationHost<PlayerFactory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: AnimationFactory> AnimationHost<F> {
    pub fn with_factory(factory: F) -> Self {
        Self {
            factory,
            surface: None,
            controller: None,
            program: None,
            options: AnimationOptions::default(),
            dirty: false,
        }
    }

    /// Attach the surface to render into and initialize if a program is set.
    pub fn mount(&mut self, surface: SurfaceHandle) {
        self.surface = Some(surface);
        self.dirty = true;
        self.sync();
    }

    /// Tear down the controller and detach the surface.
    pub fn unmount(&mut self) {
        self.teardown();
        self.surface = None;
    }

    #[inline]
    pub fn surface(&self) -> Option<&SurfaceHandle> {
        self.surface.as_ref()
    }

    #[inline]
    pub fn program(&self) -> Option<&Rc<Program>> {
        self.program.as_ref()
    }

    /// Supply the current inputs.
    ///
    /// The controller is rebuilt when `program` (by identity), `max_frames`,
    /// or the frame callback (by identity) changed. Returns `true` when a
    /// rebuild was attempted.
    pub fn update(&mut self, program: &Rc<Program>, options: AnimationOptions) -> bool {
        let same_program = self
            .program
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, program));
        if !same_program || !self.options.same_as(&options) {
            self.program = Some(Rc::clone(program));
            self.options = options;
            self.dirty = true;
        }
        self.sync()
    }

    fn sync(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        let (Some(surface), Some(program)) = (self.surface.clone(), self.program.clone()) else {
            return false;
        };
        self.dirty = false;

        let previous = self.teardown().unwrap_or_default();

        match self.factory.create(&program, surface, &self.options) {
            Ok(mut controller) => {
                controller.toggle_play(previous.playing);
                controller.set_frame(previous.frame);
                log::debug!(
                    "Animation controller created (playing: {}, frame: {})",
                    previous.playing,
                    previous.frame
                );
                self.controller = Some(controller);
            }
            Err(err) => {
                log::error!("Error creating animation controller: {}", err);
            }
        }
        true
    }

    /// Clean up and drop the live controller, returning its last state.
    fn teardown(&mut self) -> Option<PlaybackState> {
        let mut controller = self.controller.take()?;
        let state = controller.state();
        controller.cleanup();
        Some(state)
    }

    pub fn controller(&self) -> Option<&(dyn AnimationControl + 'static)> {
        self.controller.as_deref()
    }

    pub fn controller_mut(&mut self) -> Option<&mut (dyn AnimationControl + 'static)> {
        self.controller.as_deref_mut()
    }

    #[inline]
    pub fn has_controller(&self) -> bool {
        self.controller.is_some()
    }

    /// Current playback state, or the default when no controller is live.
    pub fn state(&self) -> PlaybackState {
        self.controller
            .as_ref()
            .map(|c| c.state())
            .unwrap_or_default()
    }

    pub fn toggle_play(&mut self, playing: bool) {
        if let Some(controller) = self.controller.as_mut() {
            controller.toggle_play(playing);
        }
    }

    pub fn set_frame(&mut self, frame: usize) {
        if let Some(controller) = self.controller.as_mut() {
            controller.set_frame(frame);
        }
    }

    /// Forward a timer tick. Returns `true` when a frame was rendered.
    pub fn tick(&mut self) -> bool {
        self.controller.as_mut().is_some_and(|c| c.tick())
    }

    /// Borrow the program, controller, and surface for an export.
    pub fn export_context(
        &mut self,
        dimensions: Dimensions,
        animation_length: usize,
    ) -> ExportContext<'_> {
        ExportContext {
            program: self.program.as_deref(),
            controller: self.controller.as_deref_mut(),
            surface: self.surface.as_ref(),
            dimensions,
            animation_length,
        }
    }
}

impl<F: AnimationFactory> Drop for AnimationHost<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}
