//! Material system for emissive PBR and unlit rendering
//!
//! Materials are stored in [`MaterialManager`] and objects reference them by ID.
//! All materials share one bind group layout, created once by the render
//! engine and passed in when GPU resources are built.

use std::collections::HashMap;
use wgpu::Device;

use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Material ID for referencing materials
pub type MaterialId = String;

/// GPU uniform data for materials
///
/// Must match `MaterialUniform` in `pbr.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive_intensity: f32,
    /// 1.0 skips lighting and outputs `base_color` as is
    pub unlit: f32,
    pub emissive: [f32; 3],
    _padding: f32,
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Converts a `0xRRGGBB` sRGB color into linear RGB
pub fn hex_to_linear_rgb(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Creates the bind group layout shared by every material (fragment-only uniform)
pub fn create_material_bind_group_layout(device: &Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_fragment(binding_types::uniform())
        .create(device, "Material Bind Group Layout")
}

struct MaterialGpuResources {
    ubo: MaterialUBO,
    bind_group: wgpu::BindGroup,
}

/// Material definition with PBR properties
///
/// Contains material properties and GPU resources. Materials are stored
/// centrally in MaterialManager and shared between objects.
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub unlit: bool,

    gpu: Option<MaterialGpuResources>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            emissive: [0.0, 0.0, 0.0],
            emissive_intensity: 1.0,
            unlit: false,
            gpu: None,
        }
    }
}

impl Material {
    /// Creates a new material with basic PBR properties
    ///
    /// # Arguments
    /// * `name` - Unique name for this material
    /// * `base_color` - RGBA base color, linear
    /// * `metallic` - Metallic factor (0.0 = dielectric, 1.0 = metallic)
    /// * `roughness` - Surface roughness (0.0 = mirror, 1.0 = rough)
    pub fn new(name: &str, base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// A glowing material whose base and emissive color are both `hex`
    pub fn neon(name: &str, hex: u32, emissive_intensity: f32, metallic: f32, roughness: f32) -> Self {
        let [r, g, b] = hex_to_linear_rgb(hex);
        Self::new(name, [r, g, b, 1.0], metallic, roughness)
            .with_emission(r, g, b)
            .with_emissive_intensity(emissive_intensity)
    }

    /// A flat color that ignores every light
    pub fn unlit(name: &str, hex: u32) -> Self {
        let [r, g, b] = hex_to_linear_rgb(hex);
        let mut material = Self::new(name, [r, g, b, 1.0], 0.0, 1.0);
        material.unlit = true;
        material
    }

    /// Builder pattern: Set emissive color
    pub fn with_emission(mut self, r: f32, g: f32, b: f32) -> Self {
        self.emissive = [r, g, b];
        self
    }

    pub fn with_emissive_intensity(mut self, intensity: f32) -> Self {
        self.emissive_intensity = intensity.max(0.0);
        self
    }

    pub fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            base_color: self.base_color,
            metallic: self.metallic,
            roughness: self.roughness,
            emissive_intensity: self.emissive_intensity,
            unlit: if self.unlit { 1.0 } else { 0.0 },
            emissive: self.emissive,
            _padding: 0.0,
        }
    }

    /// Creates GPU resources on first call, then syncs the uniform
    pub fn update_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
    ) {
        let uniform = self.uniform();
        let gpu = self.gpu.get_or_insert_with(|| {
            log::debug!("Creating GPU resources for material '{}'", self.name);
            let ubo = MaterialUBO::new(device);
            let bind_group = BindGroupBuilder::new(layout)
                .resource(ubo.binding_resource())
                .create(device, "Material Bind Group");
            MaterialGpuResources { ubo, bind_group }
        });
        gpu.ubo.update_content(queue, uniform);
    }

    /// Gets the bind group for rendering
    pub fn get_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.bind_group)
    }
}

/// Manages all materials in the scene
///
/// Objects reference materials by ID rather than storing material data
/// directly, so every knot of one color shares a single uniform buffer.
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material_id: MaterialId,
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialManager {
    /// Creates a new material manager with a default material
    pub fn new() -> Self {
        let default_material = Material::default();
        let default_material_id = default_material.name.clone();

        let mut materials = HashMap::new();
        materials.insert(default_material_id.clone(), default_material);

        Self {
            materials,
            default_material_id,
        }
    }

    /// Adds a material, replacing any material with the same name
    pub fn add_material(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub fn get_material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.materials.contains_key(id)
    }

    /// Gets the default material
    pub fn get_default_material(&self) -> &Material {
        &self.materials[&self.default_material_id]
    }

    /// Gets material for an object with fallback to default
    ///
    /// Handles objects with no material assigned and IDs that don't exist.
    pub fn get_material_for_object(&self, material_id: Option<&str>) -> &Material {
        material_id
            .and_then(|id| self.get_material(id))
            .unwrap_or_else(|| self.get_default_material())
    }

    /// Number of materials, including the default one
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Updates GPU resources for all materials
    pub fn update_all_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
    ) {
        for material in self.materials.values_mut() {
            material.update_gpu_resources(device, queue, layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 48);
        assert_eq!(std::mem::offset_of!(MaterialUniform, emissive), 32);
    }

    #[test]
    fn test_hex_to_linear_rgb() {
        assert_eq!(hex_to_linear_rgb(0xffffff), [1.0, 1.0, 1.0]);
        assert_eq!(hex_to_linear_rgb(0x000000), [0.0, 0.0, 0.0]);

        let [r, g, b] = hex_to_linear_rgb(0xff5733);
        assert_eq!(r, 1.0);
        assert!((g - 0.0953).abs() < 1e-3);
        assert!((b - 0.0331).abs() < 1e-3);
    }

    #[test]
    fn test_neon_material_glows_in_its_own_color() {
        let material = Material::neon("knot_00ffff", 0x00ffff, 1.5, 0.8, 0.2);
        let uniform = material.uniform();

        assert_eq!(uniform.base_color, [0.0, 1.0, 1.0, 1.0]);
        assert_eq!(uniform.emissive, [0.0, 1.0, 1.0]);
        assert_eq!(uniform.emissive_intensity, 1.5);
        assert_eq!(uniform.metallic, 0.8);
        assert_eq!(uniform.roughness, 0.2);
        assert_eq!(uniform.unlit, 0.0);
    }

    #[test]
    fn test_unlit_flag() {
        let material = Material::unlit("label", 0xffffff);
        assert_eq!(material.uniform().unlit, 1.0);
        assert_eq!(material.base_color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_manager_falls_back_to_default() {
        let mut manager = MaterialManager::new();
        manager.add_material(Material::unlit("label", 0xffffff));

        assert_eq!(manager.len(), 2);
        assert_eq!(manager.get_material_for_object(Some("label")).name, "label");
        assert_eq!(manager.get_material_for_object(Some("missing")).name, "default");
        assert_eq!(manager.get_material_for_object(None).name, "default");
    }
}
