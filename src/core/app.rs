use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Instant;

use glam::{Vec2, Vec3};
use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use log::{info, warn};
use raw_window_handle::HasRawWindowHandle;
use thiserror::Error;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{DeviceEvent, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Fullscreen, Window, WindowBuilder};

use crate::core::input::Input;
use crate::core::platform::driver::GlDriver;
use crate::core::platform::opengl::GlowDriver;
use crate::core::rendering::camera::Camera;
use crate::core::rendering::render_state::GlContext;
use crate::core::time::Time;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window creation failure: {0}")]
    Window(String),
    #[error(transparent)]
    Context(#[from] glutin::error::Error),
}

/// Window and context settings, builder style
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub resizable: bool,
    pub samples: u8,
    pub vsync: bool,
    /// Hide the cursor and keep it inside the window, for free-fly cameras
    pub grab_cursor: bool,
}

impl AppConfig {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        AppConfig {
            name: name.to_owned(),
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn with_samples(mut self, samples: u8) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_grab_cursor(mut self, grab_cursor: bool) -> Self {
        self.grab_cursor = grab_cursor;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            name: "Proto GL".to_owned(),
            width: 800,
            height: 600,
            fullscreen: false,
            resizable: false,
            samples: 4,
            vsync: true,
            grab_cursor: true,
        }
    }
}

/// Keys driving [AppContext::update_free_fly_camera]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeFlyKeys {
    pub back: KeyCode,
    pub forward: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
}

impl Default for FreeFlyKeys {
    fn default() -> Self {
        FreeFlyKeys {
            back: KeyCode::KeyS,
            forward: KeyCode::KeyW,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
        }
    }
}

/// What an [Application] sees of the running app
pub struct AppContext {
    gl: Rc<GlContext>,
    config: AppConfig,
    pub camera: Camera,
    pub input: Input,
    resolution: Vec2,
    physical_resolution: Vec2,
    global_time: f32,
}

impl AppContext {
    pub fn new(gl: Rc<GlContext>, config: AppConfig) -> Self {
        let resolution = Vec2::new(config.width as f32, config.height as f32);
        let mut camera = Camera::default();
        if config.height > 0 {
            camera.set_aspect_ratio(resolution.x / resolution.y);
        }

        AppContext {
            gl,
            config,
            camera,
            input: Input::new(),
            resolution,
            physical_resolution: resolution,
            global_time: 0.0,
        }
    }

    #[inline(always)]
    pub fn gl(&self) -> &Rc<GlContext> {
        &self.gl
    }

    #[inline(always)]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Window size in logical pixels
    #[inline(always)]
    pub fn resolution(&self) -> Vec2 {
        self.resolution
    }

    /// Framebuffer size in device pixels
    #[inline(always)]
    pub fn physical_resolution(&self) -> Vec2 {
        self.physical_resolution
    }

    /// Seconds since the loop started
    #[inline(always)]
    pub fn global_time(&self) -> f32 {
        self.global_time
    }

    pub(crate) fn on_resize(&mut self, physical: PhysicalSize<u32>, scale_factor: f64) {
        let logical: LogicalSize<f32> = physical.to_logical(scale_factor);
        self.physical_resolution = Vec2::new(physical.width as f32, physical.height as f32);
        self.resolution = Vec2::new(logical.width, logical.height);
        if physical.height > 0 {
            self.camera
                .set_aspect_ratio(physical.width as f32 / physical.height as f32);
        }
    }

    pub(crate) fn set_global_time(&mut self, global_time: f32) {
        self.global_time = global_time;
    }

    /// Move the camera along its forward and right axes while the keys are
    /// held, then turn it by the cursor motion of this frame.
    pub fn update_free_fly_camera(
        &mut self,
        delta_time: f32,
        keys: FreeFlyKeys,
        sensitivity: f32,
        speed: f32,
    ) {
        let step = delta_time * speed;
        let mut offset = Vec3::ZERO;

        if self.input.is_key_down(keys.back) {
            offset -= self.camera.forward();
        } else if self.input.is_key_down(keys.forward) {
            offset += self.camera.forward();
        }

        if self.input.is_key_down(keys.right) {
            offset += self.camera.right();
        } else if self.input.is_key_down(keys.left) {
            offset -= self.camera.right();
        }

        self.camera.translate(offset * step);

        let cursor = self.input.cursor_delta();
        self.camera
            .rotate(Vec2::new(-sensitivity * cursor.y, -sensitivity * cursor.x));
    }
}

/// User code driven by [App::run]
pub trait Application {
    /// Called once, after the GL context is ready
    fn init(&mut self, context: &mut AppContext);

    fn update(&mut self, context: &mut AppContext, delta_time: f32);

    /// Called with the viewport set and the framebuffer cleared
    fn render(&mut self, context: &mut AppContext, delta_time: f32);

    /// Called before the GL context goes away. GL resources still owned by
    /// the application are dropped right after.
    fn on_close(&mut self, _context: &mut AppContext) {}
}

/// A window, its GL context and the loop that runs an [Application] in it
pub struct App;

struct GlWindow {
    window: Window,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
}

impl App {
    /// Open the window and run `application` until the window is closed.
    ///
    /// Blocks the calling thread, which becomes the only thread allowed to
    /// touch the GL context.
    pub fn run<A: Application + 'static>(config: AppConfig, application: A) -> Result<(), AppError> {
        info!("App init");
        let event_loop = EventLoop::new()?;
        let (gl_window, gl) = create_window(&config, &event_loop)?;

        let driver: Rc<dyn GlDriver> = Rc::new(GlowDriver::new(gl));
        let gl_context = GlContext::new(driver);
        gl_context.initialize();

        let mut context = AppContext::new(gl_context, config);
        context.on_resize(gl_window.window.inner_size(), gl_window.window.scale_factor());

        let mut application = Some(application);
        if let Some(application) = application.as_mut() {
            application.init(&mut context);
        }

        let mut time = Time::new(Instant::now());
        event_loop.run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        info!("Window close requested");
                        elwt.exit();
                    }
                    WindowEvent::Resized(size) => {
                        if let (Some(width), Some(height)) =
                            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                        {
                            gl_window
                                .surface
                                .resize(&gl_window.context, width, height);
                        }
                        context.on_resize(size, gl_window.window.scale_factor());
                    }
                    WindowEvent::Focused(false) => context.input.release_all(),
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key: PhysicalKey::Code(key),
                                state,
                                ..
                            },
                        ..
                    } => context.input.on_key(key, state),
                    WindowEvent::RedrawRequested => {
                        let Some(application) = application.as_mut() else {
                            return;
                        };

                        time.step(Instant::now());
                        let delta_time = time.delta_seconds();
                        context.set_global_time(time.global_seconds());

                        application.update(&mut context, delta_time);

                        let physical = context.physical_resolution();
                        let driver = context.gl().driver();
                        driver.viewport(0, 0, physical.x as i32, physical.y as i32);
                        driver.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

                        application.render(&mut context, delta_time);

                        if let Err(error) = gl_window.surface.swap_buffers(&gl_window.context) {
                            warn!("Error swapping buffers: {}", error);
                        }
                        context.input.end_frame();
                    }
                    _ => {}
                },
                Event::DeviceEvent {
                    event: DeviceEvent::MouseMotion { delta },
                    ..
                } => context.input.on_cursor_motion(delta.0, delta.1),
                Event::AboutToWait => gl_window.window.request_redraw(),
                Event::LoopExiting => {
                    info!("App destroy");
                    if let Some(mut application) = application.take() {
                        application.on_close(&mut context);
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

/// Create the window, a GL 3.3 core context current on it, and the glow
/// context that loads its functions.
fn create_window(
    config: &AppConfig,
    event_loop: &EventLoop<()>,
) -> Result<(GlWindow, glow::Context), AppError> {
    let fullscreen = config
        .fullscreen
        .then_some(Fullscreen::Borderless(None));
    let window_builder = WindowBuilder::new()
        .with_title(config.name.clone())
        .with_inner_size(LogicalSize::new(config.width, config.height))
        .with_resizable(config.resizable)
        .with_fullscreen(fullscreen)
        .with_decorations(true);

    let template = ConfigTemplateBuilder::new().with_multisampling(config.samples);
    let (window, gl_config) = glutin_winit::DisplayBuilder::new()
        .with_window_builder(Some(window_builder))
        .build(event_loop, template, |configs| {
            // Most samples without going over the requested count
            configs
                .max_by_key(|candidate| candidate.num_samples().min(config.samples))
                .expect("glutin offers at least one config")
        })
        .map_err(|error| AppError::Window(error.to_string()))?;

    let window = window.ok_or_else(|| AppError::Window("no window was created".to_owned()))?;
    let raw_window_handle = window.raw_window_handle();

    let context_attrs = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .with_profile(GlProfile::Core)
        .build(Some(raw_window_handle));
    let not_current = unsafe {
        gl_config
            .display()
            .create_context(&gl_config, &context_attrs)?
    };

    let size = window.inner_size();
    let (width, height) = (
        NonZeroU32::new(size.width).unwrap_or(NonZeroU32::MIN),
        NonZeroU32::new(size.height).unwrap_or(NonZeroU32::MIN),
    );
    let surface_attrs = SurfaceAttributesBuilder::<WindowSurface>::new()
        .with_srgb(Some(true))
        .build(raw_window_handle, width, height);
    let surface = unsafe {
        gl_config
            .display()
            .create_window_surface(&gl_config, &surface_attrs)?
    };

    let context = not_current.make_current(&surface)?;

    let interval = if config.vsync {
        SwapInterval::Wait(NonZeroU32::MIN)
    } else {
        SwapInterval::DontWait
    };
    if let Err(error) = surface.set_swap_interval(&context, interval) {
        warn!("Could not set the swap interval: {}", error);
    }

    if config.grab_cursor {
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
        if let Err(error) = grabbed {
            warn!("Could not grab the cursor: {}", error);
        }
        window.set_cursor_visible(false);
    }

    let gl = unsafe {
        glow::Context::from_loader_function_cstr(|s| context.display().get_proc_address(s).cast())
    };

    Ok((
        GlWindow {
            window,
            surface,
            context,
        },
        gl,
    ))
}
