// src/wgpu_utils/uniform_buffer.rs
use std::marker::PhantomData;

/// Last path segment of `T`'s type name, used for buffer labels
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// A `Pod` value mirrored in a GPU uniform buffer
///
/// The last uploaded bytes are cached so per-frame updates with unchanged
/// content (camera at rest, static materials) skip the queue write.
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    last_upload: Option<Vec<u8>>,
    _content: PhantomData<Content>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("uniform {}", short_type_name::<Content>())),
            size: std::mem::size_of::<Content>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            last_upload: None,
            _content: PhantomData,
        }
    }

    /// Writes `content` unless it matches the previous upload byte for byte
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) {
        let bytes = bytemuck::bytes_of(&content);
        if self.last_upload.as_deref() == Some(bytes) {
            return;
        }
        queue.write_buffer(&self.buffer, 0, bytes);
        self.last_upload = Some(bytes.to_vec());
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }
}
