//! WGPU-based rendering engine
//!
//! Owns the surface, device and queue, the depth and multisample targets,
//! the global uniforms and the single PBR pipeline every object is drawn with.

use std::sync::Arc;
use thiserror::Error;
use wgpu::{Device, TextureFormat};

use crate::{
    gfx::{
        camera::camera_utils::CameraUniform,
        resources::{
            global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, Lighting},
            material::create_material_bind_group_layout,
            texture_resource::TextureResource,
        },
        scene::{
            object::{create_transform_bind_group_layout, DrawObject},
            scene::Scene,
        },
    },
    wgpu_utils::binding_builder::BindGroupLayoutWithDesc,
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

const PBR_PIPELINE: &str = "PBR";

/// Failures while bringing up the GPU
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface supports no texture formats on this adapter")]
    NoSurfaceFormat,
    #[error("render pipeline setup failed: {0}")]
    Pipeline(String),
}

/// FIFO waits for vblank, so frames follow the display refresh rate
pub fn present_mode_for(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

/// Clamps a requested surface size to `1..=max_dimension` on both axes
pub fn clamp_surface_size(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max_dimension = max_dimension.max(1);
    (
        width.clamp(1, max_dimension),
        height.clamp(1, max_dimension),
    )
}

/// Picks an sRGB surface format so linear shader output is encoded on write
pub fn choose_surface_format(formats: &[TextureFormat]) -> Option<TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first().copied())
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    sample_count: u32,
    depth_texture: TextureResource,
    msaa_target: Option<TextureResource>,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    transform_layout: BindGroupLayoutWithDesc,
    material_layout: BindGroupLayoutWithDesc,
    clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width`, `height` - Initial surface size in physical pixels
    /// * `vsync` - FIFO presentation when true
    /// * `msaa_samples` - Requested sample count; falls back to 1 if unsupported
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
        msaa_samples: u32,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&surface_capabilities.formats)
            .ok_or(RenderError::NoSurfaceFormat)?;

        let sample_count = if adapter
            .get_texture_format_features(format)
            .flags
            .sample_count_supported(msaa_samples)
        {
            msaa_samples.max(1)
        } else {
            log::warn!(
                "{}x MSAA unsupported for {:?}, rendering without multisampling",
                msaa_samples,
                format
            );
            1
        };

        let (width, height) =
            clamp_surface_size(width, height, device.limits().max_texture_dimension_2d);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: present_mode_for(vsync),
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Surface configured: {}x{} {:?}, {:?}, {}x MSAA",
            config.width,
            config.height,
            format,
            config.present_mode,
            sample_count
        );

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, sample_count, "depth_texture");
        let msaa_target = (sample_count > 1).then(|| {
            TextureResource::create_msaa_target(&device, &config, sample_count, "msaa_target")
        });

        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo);

        let transform_layout = create_transform_bind_group_layout(&device);
        let material_layout = create_material_bind_group_layout(&device);

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("pbr", include_str!("pbr.wgsl"));
        pipeline_manager.register_pipeline(
            PBR_PIPELINE,
            PipelineConfig::default()
                .with_label(PBR_PIPELINE)
                .with_shader("pbr")
                .with_color_format(format)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_sample_count(sample_count)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layouts().clone(),
                    transform_layout.layout.clone(),
                    material_layout.layout.clone(),
                ]),
        );
        pipeline_manager
            .create_all_pipelines()
            .map_err(|errors| RenderError::Pipeline(errors.join("; ")))?;

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            sample_count,
            depth_texture,
            msaa_target,
            pipeline_manager,
            global_ubo,
            global_bindings,
            transform_layout,
            material_layout,
            clear_color: wgpu::Color::BLACK,
        })
    }

    /// Uploads GPU resources for every scene object and material that lacks them
    pub fn init_scene(&self, scene: &mut Scene) {
        scene.init_gpu_resources(
            &self.device,
            &self.queue,
            &self.transform_layout,
            &self.material_layout,
        );
        log::debug!("Scene GPU resources ready: {:?}", scene.get_statistics());
    }

    /// Syncs camera, lights and object transforms for the next frame
    pub fn update(&mut self, scene: &mut Scene) {
        let camera: CameraUniform = scene.camera_manager.camera.uniform;
        let lighting: Lighting = scene.lighting;
        update_global_ubo(&mut self.global_ubo, &self.queue, &camera, &lighting);
        scene.update_all_transforms(&self.queue);
    }

    /// Draws every visible object in one pass and presents
    ///
    /// Surface errors are returned untouched so the caller can decide
    /// between reconfiguring, skipping the frame or exiting.
    pub fn render_frame(&mut self, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            // With MSAA the pass renders into the multisampled target and
            // resolves into the surface texture.
            let (view, resolve_target, store) = match &self.msaa_target {
                Some(msaa) => (
                    &msaa.view,
                    Some(&surface_texture_view),
                    wgpu::StoreOp::Discard,
                ),
                None => (&surface_texture_view, None, wgpu::StoreOp::Store),
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_groups(), &[]);

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(PBR_PIPELINE) {
                render_pass.set_pipeline(pipeline);

                for object in scene.objects.iter().filter(|object| object.visible) {
                    let material = scene.get_material_for_object(object);

                    if let Some(material_bind_group) = material.get_bind_group() {
                        render_pass.set_bind_group(2, material_bind_group, &[]);
                        render_pass.draw_object(object);
                    } else {
                        log::debug!(
                            "Skipping '{}' - material '{}' has no GPU resources",
                            object.name,
                            material.name
                        );
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Reconfigures the surface and recreates size-dependent targets
    ///
    /// Zero-sized requests (minimized windows) are ignored. Sizes beyond the
    /// device's texture limit are clamped to it.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        let max_dimension = self.device.limits().max_texture_dimension_2d;
        let (width, height) = clamp_surface_size(width, height, max_dimension);
        if (width, height) != (self.config.width, self.config.height) {
            log::debug!("Surface resized to {}x{}", width, height);
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
    }

    /// Re-applies the current configuration, e.g. after `SurfaceError::Lost`
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);

        self.depth_texture = TextureResource::create_depth_texture(
            &self.device,
            &self.config,
            self.sample_count,
            "depth_texture",
        );
        if self.sample_count > 1 {
            self.msaa_target = Some(TextureResource::create_msaa_target(
                &self.device,
                &self.config,
                self.sample_count,
                "msaa_target",
            ));
        }
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
