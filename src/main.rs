//! Skyscape - an animated sky backdrop
//!
//! Gradient sky, drifting fBm cloud cover, cel-shaded cloud puffs and a
//! noise-displaced terrain, recolored live from a palette.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use skyscape::camera::CameraSystem;
use skyscape::cli::Args;
use skyscape::lifecycle::{FramePump, Mounted};
use skyscape::palette;
use skyscape::params::RenderConfig;
use skyscape::rendering::RenderSystem;
use skyscape::scene::Scene;

/// Ambient intensity change per `-` / `=` key press
const AMBIENT_STEP: f32 = 0.1;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    mounted: Option<Mounted<RenderSystem>>,

    // Scene state (geometry is fixed, uniforms change)
    scene: Scene,
    camera: CameraSystem,

    // Configuration
    render_config: RenderConfig,

    // Time base shared across re-mounts
    start_time: Instant,
}

impl App {
    fn new(scene: Scene, camera: CameraSystem, render_config: RenderConfig) -> Self {
        Self {
            window: None,
            mounted: None,
            scene,
            camera,
            render_config,
            start_time: Instant::now(),
        }
    }

    /// Acquire surface and GPU for the current window
    fn mount(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.clone() else {
            return;
        };
        match pollster::block_on(RenderSystem::new(window, &self.scene, &self.render_config)) {
            Ok(render_system) => {
                let (width, height) = render_system.size();
                log::info!("Rendering at {}x{}", width, height);
                let pump = FramePump::starting_at(self.start_time);
                self.mounted = Some(Mounted::with_pump(render_system, pump));
            }
            Err(e) => {
                log::error!("Failed to mount scene: {}", e);
                event_loop.exit();
            }
        }
    }

    fn unmount(&mut self) {
        if let Some(mut mounted) = self.mounted.take() {
            mounted.unmount();
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.unmount();
        event_loop.exit();
    }

    fn handle_key(&mut self, code: KeyCode) {
        let sync = &mut self.scene.sync;
        match code {
            KeyCode::KeyL => {
                let enabled = !sync.lights_enabled();
                sync.on_lights_toggle(enabled);
                log::info!("Lights {}", if enabled { "on" } else { "off" });
            }
            KeyCode::KeyP => log::info!("Palette: {}", sync.palette()),
            KeyCode::Minus | KeyCode::Equal => {
                let step = if code == KeyCode::Equal {
                    AMBIENT_STEP
                } else {
                    -AMBIENT_STEP
                };
                let intensity = (sync.lights().ambient.intensity + step).max(0.0);
                sync.on_ambient_intensity(intensity);
                log::info!("Ambient intensity {:.1}", intensity);
            }
            KeyCode::Digit1 | KeyCode::Digit2 | KeyCode::Digit3 | KeyCode::Digit4 => {
                let index = match code {
                    KeyCode::Digit1 => 0,
                    KeyCode::Digit2 => 1,
                    KeyCode::Digit3 => 2,
                    _ => 3,
                };
                let (name, preset) = palette::presets()[index];
                sync.on_palette_change(&preset);
                log::info!("Palette preset: {}", name);
            }
            _ => {}
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if !self.render_config.set_viewport(width, height) {
            return;
        }
        if let Some(render_system) = self.mounted.as_mut().and_then(Mounted::resources_mut) {
            render_system.resize(width, height);
        }
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let result = {
            let Some(mounted) = self.mounted.as_mut() else {
                return;
            };
            let Some((time_s, render_system)) = mounted.frame() else {
                return;
            };

            // Animate the cloud dome and push any changed uniforms
            self.scene.sync.on_tick(time_s);
            render_system.upload(&mut self.scene.sync);

            let (view_proj, eye) = self
                .camera
                .create_view_proj_matrix(time_s, &self.render_config);
            render_system.update_camera(view_proj, eye);

            let result = render_system.render();
            if let Err(wgpu::SurfaceError::Outdated) = result {
                render_system.reconfigure();
            }
            result
        };

        match result {
            Ok(()) | Err(wgpu::SurfaceError::Outdated) => {}
            Err(wgpu::SurfaceError::Lost) => {
                log::warn!("Surface lost, re-mounting");
                self.unmount();
                self.mount(event_loop);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                self.shutdown(event_loop);
            }
            Err(e) => log::warn!("Dropped frame: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.mounted.is_some() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.mounted.is_some() {
            return; // Already mounted
        }

        if self.window.is_none() {
            let window_attributes = Window::default_attributes()
                .with_title("Skyscape")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.render_config.window_width,
                    self.render_config.window_height,
                ));

            match event_loop.create_window(window_attributes) {
                Ok(window) => self.window = Some(Arc::new(window)),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            }
        }

        self.mount(event_loop);
        log::info!(
            "L toggles lights, -/= dim or brighten ambient, 1-4 pick a palette, P prints it, Esc quits"
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    self.shutdown(event_loop);
                } else {
                    self.handle_key(code);
                }
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let render_config = args.render_config();
    let camera = CameraSystem::new(args.camera_preset());

    let scene = Scene::build(args.scene_config()).map_err(|e| {
        log::error!("{}", e);
        e
    })?;

    let mut app = App::new(scene, camera, render_config);
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;
    Ok(())
}
