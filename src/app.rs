use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::DemoConfig,
    gfx::{rendering::RenderEngine, scene::Scene},
    sampling::KnotSampler,
    text::{build_label_geometry, FontLoad, FontLoader},
};

const WINDOW_TITLE: &str = "neon-knots";

pub struct NeonKnotsApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

pub(crate) struct AppState {
    config: DemoConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Scene,
    font_loader: Option<FontLoader>,
    closed: bool,
}

impl NeonKnotsApp {
    /// Builds the knot field and starts the font download
    ///
    /// GPU resources are created later, when the window is resumed.
    pub fn new(config: DemoConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new()?;

        let font_loader = match FontLoader::start(&config.label.font_url) {
            Ok(loader) => Some(loader),
            Err(e) => {
                log::warn!("Font load not started, the label will be missing: {}", e);
                None
            }
        };

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState::new(config, font_loader),
        })
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) -> anyhow::Result<()> {
        let Some(event_loop) = self.event_loop.take() else {
            anyhow::bail!("event loop already consumed");
        };
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;
        Ok(())
    }

    pub fn scene(&self) -> &Scene {
        &self.app_state.scene
    }
}

impl AppState {
    pub(crate) fn new(config: DemoConfig, font_loader: Option<FontLoader>) -> Self {
        let mut sampler = KnotSampler::new(&config);
        let (width, height) = config.window_size;
        let aspect = width as f32 / height.max(1) as f32;
        let scene = Scene::build_knot_field(&config, &mut sampler, aspect);

        Self {
            config,
            window: None,
            render_engine: None,
            scene,
            font_loader,
            closed: false,
        }
    }

    /// True while a window and renderer are attached
    pub(crate) fn is_mounted(&self) -> bool {
        self.window.is_some() && self.render_engine.is_some()
    }

    /// Drops the renderer and window; no more frames are scheduled afterwards
    pub(crate) fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // Surface goes before the window it was created from
        self.render_engine = None;
        self.window = None;
        self.font_loader = None;
        log::info!("Torn down");
    }

    /// Whether `resumed` may create a window; never again after teardown
    pub(crate) fn can_mount(&self) -> bool {
        self.window.is_none() && !self.closed
    }

    /// Tracks the new size in the camera and, once mounted, the surface
    pub(crate) fn handle_resize(&mut self, width: u32, height: u32) {
        if self.closed || width == 0 || height == 0 {
            return;
        }
        // The surface may be clamped to the device limit; the camera follows it
        let (width, height) = match self.render_engine.as_mut() {
            Some(render_engine) => {
                render_engine.resize(width, height);
                render_engine.get_surface_size()
            }
            None => (width, height),
        };
        self.scene.resize(width, height);
    }

    /// CPU half of a frame: animation, camera and the pending font
    pub(crate) fn advance(&mut self) {
        self.scene.advance_frame(self.config.rotation_step);
        self.scene.update();
        self.poll_font();
    }

    fn poll_font(&mut self) {
        let Some(loader) = self.font_loader.as_mut() else {
            return;
        };

        match loader.poll() {
            FontLoad::Pending | FontLoad::Finished => {}
            FontLoad::Ready(typeface) => {
                self.font_loader = None;
                match build_label_geometry(&typeface, &self.config.label) {
                    Ok(geometry) => {
                        self.scene.attach_label(&geometry, &self.config.label);
                        if let Some(render_engine) = self.render_engine.as_ref() {
                            render_engine.init_scene(&mut self.scene);
                        }
                    }
                    Err(e) => log::warn!("Could not build the label: {}", e),
                }
            }
            FontLoad::Failed(e) => {
                log::warn!("Font load from {} failed: {}", loader.url(), e);
                self.font_loader = None;
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.advance();

        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };
        render_engine.update(&mut self.scene);

        match render_engine.render_frame(&self.scene) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                render_engine.reconfigure();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("Surface timeout, skipping frame");
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory, exiting");
                self.teardown();
                event_loop.exit();
            }
            Err(e) => log::warn!("Frame dropped: {}", e),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.can_mount() {
            return;
        }

        let (width, height) = self.config.window_size;
        let attributes = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(width, height));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let (width, height) = window.inner_size().into();
        let renderer = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            self.config.vsync,
            self.config.msaa_samples,
        ));

        match renderer {
            Ok(renderer) => {
                if width > 0 && height > 0 {
                    self.scene.resize(width, height);
                }
                renderer.init_scene(&mut self.scene);
                self.render_engine = Some(renderer);
                self.window = Some(window);
                log::info!("Mounted {}x{} surface", width, height);
            }
            Err(e) => {
                log::error!("Renderer initialisation failed: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                    && event.state == ElementState::Pressed
                {
                    self.teardown();
                    event_loop.exit();
                    return;
                }
                self.scene.camera_manager.process_keyboard_event(&event);
            }
            WindowEvent::MouseInput { button, state, .. } => {
                self.scene.camera_manager.process_mouse_input(button, state);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.handle_resize(width, height);
            }
            WindowEvent::CloseRequested => {
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if self.is_mounted() {
                    self.redraw(event_loop);
                }
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if !self.is_mounted() {
            return;
        }
        self.scene.camera_manager.process_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.is_mounted() {
            return;
        }
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{FontError, Typeface};
    use futures::channel::oneshot;

    const TINY_FONT: &str = r#"{
        "glyphs": {
            "I": { "ha": 400, "o": "m 0 0 l 200 0 l 200 1000 l 0 1000" },
            "?": { "ha": 400, "o": "m 0 0 l 200 0 l 200 200 l 0 200" }
        },
        "resolution": 1000,
        "boundingBox": { "yMin": 0, "yMax": 1000 }
    }"#;

    fn state_with_loader(loader: Option<FontLoader>) -> AppState {
        AppState::new(DemoConfig::default().with_seed(99), loader)
    }

    #[test]
    fn test_fresh_state_is_not_mounted() {
        let state = state_with_loader(None);
        assert!(!state.is_mounted());
        assert_eq!(state.scene.object_count(), 50);
    }

    #[test]
    fn test_resize_updates_camera_until_teardown() {
        let mut state = state_with_loader(None);
        assert!((state.scene.camera_manager.camera.aspect - 1.5).abs() < 1e-6);

        state.handle_resize(1600, 400);
        assert!((state.scene.camera_manager.camera.aspect - 4.0).abs() < 1e-6);

        state.teardown();
        state.handle_resize(400, 1600);
        assert!((state.scene.camera_manager.camera.aspect - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_size_resize_is_ignored() {
        let mut state = state_with_loader(None);
        state.handle_resize(0, 800);
        assert!((state.scene.camera_manager.camera.aspect - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_teardown_blocks_remount() {
        let mut state = state_with_loader(None);
        assert!(state.can_mount());

        state.teardown();
        assert!(!state.can_mount());
        assert!(!state.is_mounted());
    }

    #[test]
    fn test_unresolved_font_keeps_knots_only() {
        let (_sender, receiver) = oneshot::channel::<Result<Typeface, FontError>>();
        let loader = FontLoader::from_receiver("test://never", receiver);
        let mut state = state_with_loader(Some(loader));

        for _ in 0..120 {
            state.advance();
        }

        assert_eq!(state.scene.object_count(), 50);
        assert!(state.scene.label().is_none());
        assert!(state.font_loader.as_ref().is_some_and(|l| l.is_pending()));
    }

    #[test]
    fn test_loaded_font_attaches_label_once() {
        let (sender, receiver) = oneshot::channel();
        let loader = FontLoader::from_receiver("test://tiny", receiver);
        let mut state = state_with_loader(Some(loader));

        let typeface = Typeface::from_json(TINY_FONT).unwrap();
        sender.send(Ok(typeface)).unwrap();

        state.advance();
        state.advance();

        assert_eq!(state.scene.object_count(), 51);
        assert!(state.scene.label().is_some());
        assert!(state.font_loader.is_none());
    }

    #[test]
    fn test_failed_font_leaves_scene_untouched() {
        let (sender, receiver) = oneshot::channel();
        let loader = FontLoader::from_receiver("test://broken", receiver);
        let mut state = state_with_loader(Some(loader));

        sender.send(Err(FontError::Canceled)).unwrap();
        state.advance();

        assert_eq!(state.scene.object_count(), 50);
        assert!(state.font_loader.is_none());
    }

    #[test]
    fn test_advance_rotates_knots() {
        let mut state = state_with_loader(None);
        for _ in 0..10 {
            state.advance();
        }
        let knot = &state.scene.objects[state.scene.knot_indices()[0]];
        assert!((knot.rotation.x - 0.1).abs() < 1e-5);
        assert!((knot.rotation.y - 0.1).abs() < 1e-5);
    }
}
