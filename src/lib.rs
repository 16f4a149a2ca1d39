// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod animator;
pub mod config;
pub mod geometry;
pub mod render;
pub mod shader;
pub mod tween;

pub use config::{DialLayout, JogDialConfig};
pub use render::{MaskTexture, Masks};

// External crate imports
use log::{debug, info, warn};
use pixels::{Pixels, SurfaceTexture};
use thiserror::Error;

// Standard library imports
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Instant;

// Window management imports
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use animator::SelectionAnimator;
use geometry::{build_ticks, Tick, TickGroup};
use render::{Canvas, Renderer};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Error, Debug)]
pub enum JogDialError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to load mask {path:?}: {source}")]
    MaskLoad {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Window error: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("Pixels error: {0}")]
    Pixels(#[from] pixels::Error),
}

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Command enum for driving the dial from another thread
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JogDialCommand {
    Advance {
        direction: i32,
        duration: f32,
        force: bool,
    },
    Step(i32), // uses the configured step duration
    Stop,
}

/// Ends the host loop of a dial from anywhere.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The dial widget: tick geometry, selection animator and renderer.
pub struct JogDial {
    config: JogDialConfig,
    ticks: Vec<Tick>,
    group: TickGroup,
    animator: SelectionAnimator,
    renderer: Renderer,
    stop: StopHandle,
}

impl JogDial {
    pub fn new(config: JogDialConfig, masks: Masks) -> Result<Self, JogDialError> {
        if config.tick_count == 0 {
            return Err(JogDialError::InvalidConfig(
                "tick_count must be positive".to_string(),
            ));
        }
        if config.width == 0 || config.height == 0 {
            return Err(JogDialError::InvalidConfig(format!(
                "canvas of {}x{}",
                config.width, config.height
            )));
        }
        if !(config.max_framerate.is_finite() && config.max_framerate > 0.0) {
            return Err(JogDialError::InvalidConfig(format!(
                "max_framerate of {}",
                config.max_framerate
            )));
        }

        let layout = config.layout;
        let ticks = build_ticks(config.tick_count, &layout);
        let group = TickGroup::new(&layout);
        let animator = SelectionAnimator::new(config.tick_count, config.initial_index, &layout);
        let renderer = Renderer::new(&config, masks);

        let mut dial = Self {
            config,
            ticks,
            group,
            animator,
            renderer,
            stop: StopHandle::default(),
        };
        // Land on the initial selection without a visible tween.
        dial.advance(0, 0.0, true);
        info!(
            "jog dial ready: {} ticks, {}x{}, selection {}",
            dial.config.tick_count,
            dial.config.width,
            dial.config.height,
            dial.current_index()
        );
        Ok(dial)
    }

    pub fn with_procedural_masks(config: JogDialConfig) -> Result<Self, JogDialError> {
        let masks = Masks::procedural(config.width, config.height);
        Self::new(config, masks)
    }

    /// Moves the selection by `direction` ticks over `duration` seconds.
    /// Returns whether an animation was started.
    pub fn advance(&mut self, direction: i32, duration: f32, force: bool) -> bool {
        self.animator
            .advance(direction, duration, force, &mut self.ticks, &mut self.group)
    }

    pub fn current_index(&self) -> usize {
        self.animator.current_index()
    }

    pub fn tick_count(&self) -> usize {
        self.ticks.len()
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    /// Current rotation of the tick group in radians.
    pub fn rotation(&self) -> f32 {
        self.group.rotation
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn config(&self) -> &JogDialConfig {
        &self.config
    }

    pub fn interaction_radius(&self) -> f32 {
        self.config.interaction_radius()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Advances running animations by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.animator.update(dt, &mut self.ticks, &mut self.group);
    }

    /// Renders one frame into an RGBA8 buffer of `width * height * 4` bytes.
    pub fn render_frame(&mut self, frame: &mut [u8]) {
        self.renderer.render_buffer(&self.ticks, &self.group);
        let mut canvas = Canvas::new(
            frame,
            self.config.width as usize,
            self.config.height as usize,
        );
        self.renderer.composite(&mut canvas);
    }

    pub fn apply_command(&mut self, command: JogDialCommand) {
        match command {
            JogDialCommand::Advance {
                direction,
                duration,
                force,
            } => {
                self.advance(direction, duration, force);
            }
            JogDialCommand::Step(direction) => {
                self.advance(direction, self.config.step_duration, false);
            }
            JogDialCommand::Stop => self.stop.stop(),
        }
    }

    fn drain_commands(&mut self, receiver: &Receiver<JogDialCommand>) {
        while let Ok(command) = receiver.try_recv() {
            debug!("command {:?}", command);
            self.apply_command(command);
        }
    }

    pub fn show(&mut self) -> Result<(), JogDialError> {
        self.run_window(None)
    }

    pub fn show_with_commands(
        &mut self,
        receiver: Receiver<JogDialCommand>,
    ) -> Result<(), JogDialError> {
        self.run_window(Some(receiver))
    }

    /// Clears a stop requested during an earlier session.
    fn begin_session(&mut self) {
        self.stop.reset();
    }

    fn run_window(
        &mut self,
        receiver: Option<Receiver<JogDialCommand>>,
    ) -> Result<(), JogDialError> {
        self.begin_session();
        let width = self.config.width;
        let height = self.config.height;

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(width as f64, height as f64))
            .with_resizable(false)
            .build(&event_loop)?;

        let window = Arc::new(window);
        let window_clone = window.clone();
        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(width, height, surface_texture)?;

        let frame_duration = std::time::Duration::from_secs_f64(1.0 / self.config.max_framerate);
        let mut last_frame = Instant::now();
        let mut last_update = Instant::now();
        let step = self.config.step_duration;

        info!("starting render loop at {} fps", self.config.max_framerate);
        let dial = &mut *self;
        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                            warn!("Failed to resize surface: {}", e);
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. }
                        if event.state == ElementState::Pressed =>
                    {
                        match event.logical_key {
                            Key::Named(NamedKey::ArrowRight) => {
                                dial.advance(1, step, false);
                            }
                            Key::Named(NamedKey::ArrowLeft) => {
                                dial.advance(-1, step, false);
                            }
                            Key::Named(NamedKey::Escape) => dial.stop.stop(),
                            _ => {}
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(ref receiver) = receiver {
                            dial.drain_commands(receiver);
                        }
                        let now = Instant::now();
                        dial.update(now.duration_since(last_update).as_secs_f32());
                        last_update = now;

                        dial.render_frame(pixels.frame_mut());
                        if let Err(e) = pixels.render() {
                            warn!("Failed to present frame: {}", e);
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if dial.stop.is_stopped() {
                        window_target.exit();
                    } else if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        info!("render loop stopped at selection {}", self.current_index());
        Ok(())
    }
}
