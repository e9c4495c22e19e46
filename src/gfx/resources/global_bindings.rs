//! Global uniform bindings for camera and scene lighting
//!
//! Manages the uniform buffer and bind group for per-frame state shared by
//! every object in the scene: camera matrices, the ambient light and the
//! single point light. Bound to slot 0 in the render pipeline.

use crate::{
    config::LightSettings,
    gfx::{camera::camera_utils::CameraUniform, resources::material::hex_to_linear_rgb},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Global uniform buffer content structure
///
/// MUST match the `Globals` struct in `pbr.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],

    ambient_color: [f32; 3],
    ambient_intensity: f32,
    light_position: [f32; 3],
    _padding: f32,
    light_color: [f32; 3],
    light_intensity: f32,
}
// 16 + 64 + 16 + 16 + 16 = 128 bytes

/// Ambient + point light pair, colors in linear RGB
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Lighting {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub point_position: [f32; 3],
    pub point_color: [f32; 3],
    pub point_intensity: f32,
}

impl Lighting {
    pub fn from_settings(settings: &LightSettings) -> Self {
        Self {
            ambient_color: hex_to_linear_rgb(settings.ambient_color),
            ambient_intensity: settings.ambient_intensity,
            point_position: settings.point_position,
            point_color: hex_to_linear_rgb(settings.point_color),
            point_intensity: settings.point_intensity,
        }
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self::from_settings(&LightSettings::default())
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Packs camera and light data into the layout the shader expects
pub fn global_ubo_content(camera: &CameraUniform, lighting: &Lighting) -> GlobalUBOContent {
    GlobalUBOContent {
        view_position: camera.view_position,
        view_proj: camera.view_proj,
        ambient_color: lighting.ambient_color,
        ambient_intensity: lighting.ambient_intensity,
        light_position: lighting.point_position,
        _padding: 0.0,
        light_color: lighting.point_color,
        light_intensity: lighting.point_intensity,
    }
}

/// Updates the global uniform buffer with camera and light data
///
/// Called once per frame before the render pass is recorded.
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: &CameraUniform,
    lighting: &Lighting,
) {
    ubo.update_content(queue, global_ubo_content(camera, lighting));
}

/// Manages bind group layouts and bind groups for global uniforms
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    /// Sets up the layout; the bind group is created by `create_bind_group()`
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform()) // camera + lights
            .create(device, "Globals Bind Group Layout");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Global Bind Group"),
        );
    }

    /// Used when creating render pipelines that need access to global uniforms.
    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// Returns the bind group for rendering, if `create_bind_group()` has run
    pub fn bind_groups(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}
