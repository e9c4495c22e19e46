use std::ops::Range;

use cgmath::{Matrix4, Rad, Vector3, Zero};
use wgpu::{util::DeviceExt, Device};

use super::vertex::Vertex3D;
use crate::{
    gfx::{geometry::GeometryData, resources::material::MaterialId},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Per-object uniform; must match `Transform` in `pbr.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
}

/// Creates the bind group layout shared by every object transform (vertex-only uniform)
pub fn create_transform_bind_group_layout(device: &Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_vertex(binding_types::uniform())
        .create(device, "Transform Bind Group Layout")
}

pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let index_count = indices.len() as u32;
        Self {
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
            index_count,
        }
    }

    pub fn from_geometry(geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_scene_format();
        Self::new(vertices, indices)
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some() && self.index_buffer.is_some()
    }

    fn init_gpu_resources(&mut self, device: &Device, label: &str) {
        if self.vertices.is_empty() || self.indices.is_empty() {
            return;
        }

        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

// GPU resources struct to hold the transform uniform and its bind group
pub struct ObjectGpuResources {
    transform_ubo: UniformBuffer<TransformUniform>,
    transform_bind_group: wgpu::BindGroup,
}

/// A drawable scene object
///
/// The transform is kept as separate position, Euler rotation and uniform
/// scale so the frame driver can bump rotation angles directly. The model
/// matrix is `T * Rx * Ry * Rz * S`.
pub struct Object {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub position: Vector3<f32>,
    /// Euler angles in radians, applied in XYZ order
    pub rotation: Vector3<f32>,
    pub scale: f32,
    pub visible: bool,
    material_id: Option<MaterialId>,
    gpu_resources: Option<ObjectGpuResources>, // None until init_gpu_resources called
}

impl Object {
    pub fn new(name: &str, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.to_string(),
            meshes,
            position: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: 1.0,
            visible: true,
            material_id: None,
            gpu_resources: None,
        }
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: Assign a material by ID
    pub fn with_material(mut self, material_id: &str) -> Self {
        self.set_material(material_id);
        self
    }

    pub fn set_material(&mut self, material_id: &str) {
        self.material_id = Some(material_id.to_string());
    }

    pub fn get_material_id(&self) -> Option<&str> {
        self.material_id.as_deref()
    }

    /// Adds to the X and Y rotation angles, in radians
    pub fn rotate_xy(&mut self, delta: f32) {
        self.rotation.x += delta;
        self.rotation.y += delta;
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
            * Matrix4::from_scale(self.scale)
    }

    pub fn has_gpu_resources(&self) -> bool {
        self.gpu_resources.is_some()
    }

    /// Get the transform bind group for rendering
    pub fn get_transform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources
            .as_ref()
            .map(|res| &res.transform_bind_group)
    }

    /// Uploads mesh buffers and creates the transform uniform
    ///
    /// Objects that already have GPU resources are left untouched.
    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        transform_layout: &BindGroupLayoutWithDesc,
    ) {
        if self.gpu_resources.is_some() {
            return;
        }

        for mesh in &mut self.meshes {
            mesh.init_gpu_resources(device, &self.name);
        }

        let transform_ubo = UniformBuffer::new(device);
        let transform_bind_group = BindGroupBuilder::new(transform_layout)
            .resource(transform_ubo.binding_resource())
            .create(device, "Transform Bind Group");

        self.gpu_resources = Some(ObjectGpuResources {
            transform_ubo,
            transform_bind_group,
        });
        self.update_transform(queue);
    }

    /// Syncs the model matrix to the GPU if resources exist
    pub fn update_transform(&mut self, queue: &wgpu::Queue) {
        let model: [[f32; 4]; 4] = self.model_matrix().into();
        if let Some(gpu_resources) = &mut self.gpu_resources {
            gpu_resources
                .transform_ubo
                .update_content(queue, TransformUniform { model });
        }
    }
}

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
    fn draw_object(&mut self, object: &'a Object);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return; // Skip drawing if not uploaded
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }

    fn draw_object(&mut self, object: &'b Object) {
        let Some(transform_bind_group) = object.get_transform_bind_group() else {
            return;
        };
        self.set_bind_group(1, transform_bind_group, &[]);
        for mesh in &object.meshes {
            self.draw_mesh(mesh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};

    fn triangle() -> GeometryData {
        GeometryData {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_mesh_from_geometry() {
        let mesh = Mesh::from_geometry(&triangle());
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.index_count(), 3);
        assert!(!mesh.is_uploaded());
    }

    #[test]
    fn test_default_transform_is_identity() {
        let object = Object::new("knot", vec![]);
        assert_eq!(object.model_matrix(), Matrix4::identity());
        assert!(!object.has_gpu_resources());
        assert!(object.get_material_id().is_none());
    }

    #[test]
    fn test_model_matrix_applies_translation_last() {
        let mut object = Object::new("knot", vec![]).with_position(Vector3::new(-3.0, 0.0, 0.0));
        object.rotation.y = std::f32::consts::FRAC_PI_2;

        // +X rotated a quarter turn about Y lands on -Z, then translates
        let p = object.model_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!((p.x + 3.0).abs() < 1e-6);
        assert!((p.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_xy_accumulates() {
        let mut object = Object::new("knot", vec![]);
        for _ in 0..10 {
            object.rotate_xy(0.01);
        }
        assert!((object.rotation.x - 0.1).abs() < 1e-6);
        assert!((object.rotation.y - 0.1).abs() < 1e-6);
        assert_eq!(object.rotation.z, 0.0);
    }
}
