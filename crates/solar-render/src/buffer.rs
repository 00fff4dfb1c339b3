//! Vertex formats and GPU buffers for meshes and per-frame line data.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// A mesh on the GPU. Drawn indexed when it has an index buffer.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub index_buffer: Option<(wgpu::Buffer, wgpu::IndexFormat)>,
    pub index_count: u32,
}

impl MeshBuffer {
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        if let Some((buffer, format)) = &self.index_buffer {
            render_pass.set_index_buffer(buffer.slice(..), *format);
        }
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        match self.index_buffer {
            Some(_) => render_pass.draw_indexed(0..self.index_count, 0, 0..1),
            None => render_pass.draw(0..self.vertex_count, 0..1),
        }
    }

    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }
}

/// Borrowed index list. Sphere and ring meshes fit in `U16`; loaded models
/// may need `U32`.
pub enum IndexData<'a> {
    U16(&'a [u16]),
    U32(&'a [u32]),
}

impl IndexData<'_> {
    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            Self::U16(_) => wgpu::IndexFormat::Uint16,
            Self::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    pub fn count(&self) -> u32 {
        let len = match self {
            Self::U16(data) => data.len(),
            Self::U32(data) => data.len(),
        };
        len as u32
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::U16(data) => bytemuck::cast_slice(data),
            Self::U32(data) => bytemuck::cast_slice(data),
        }
    }
}

/// Creates static mesh buffers on one device.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    fn init(&self, label: &str, contents: &[u8], usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: usage | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn create_mesh<V: Pod>(&self, label: &str, vertices: &[V], indices: IndexData) -> MeshBuffer {
        let mut mesh = self.create_vertex_mesh(label, vertices);
        mesh.index_buffer = Some((
            self.create_index_buffer(&format!("{label} indices"), &indices),
            indices.format(),
        ));
        mesh.index_count = indices.count();
        mesh
    }

    /// Mesh drawn straight from its vertex list (orbit paths).
    pub fn create_vertex_mesh<V: Pod>(&self, label: &str, vertices: &[V]) -> MeshBuffer {
        MeshBuffer {
            vertex_buffer: self
                .create_vertex_buffer(&format!("{label} vertices"), bytemuck::cast_slice(vertices)),
            vertex_count: vertices.len() as u32,
            index_buffer: None,
            index_count: 0,
        }
    }

    pub fn create_vertex_buffer(&self, label: &str, data: &[u8]) -> wgpu::Buffer {
        self.init(label, data, wgpu::BufferUsages::VERTEX)
    }

    pub fn create_index_buffer(&self, label: &str, indices: &IndexData) -> wgpu::Buffer {
        self.init(label, indices.as_bytes(), wgpu::BufferUsages::INDEX)
    }
}

/// Two vertex buffers written on alternate frames.
///
/// Each upload goes to the buffer the previous frame did not draw from, so
/// a write never targets the buffer still referenced by in-flight commands.
pub struct DoubleBufferedVertices {
    buffers: [wgpu::Buffer; 2],
    capacity: u32,
    stride: u64,
    front: usize,
    vertex_count: u32,
}

impl DoubleBufferedVertices {
    /// Allocate two buffers, each holding `capacity` vertices of `stride` bytes.
    pub fn new(device: &wgpu::Device, label: &str, capacity: u32, stride: u64) -> Self {
        let size = (u64::from(capacity) * stride).max(stride);
        let make = |slot: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{label}-{slot}")),
                size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };

        Self {
            buffers: [make(0), make(1)],
            capacity,
            stride,
            front: 1,
            vertex_count: 0,
        }
    }

    /// Swap to the other buffer and write `vertices` into it.
    ///
    /// Vertices past capacity are dropped. Returns the number written.
    pub fn upload<V: Pod>(&mut self, queue: &wgpu::Queue, vertices: &[V]) -> u32 {
        debug_assert_eq!(std::mem::size_of::<V>() as u64, self.stride);
        self.front = next_slot(self.front);

        let count = vertices.len().min(self.capacity as usize);
        if count > 0 {
            queue.write_buffer(
                &self.buffers[self.front],
                0,
                bytemuck::cast_slice(&vertices[..count]),
            );
        }
        self.vertex_count = count as u32;
        self.vertex_count
    }

    /// Index (0 or 1) of the buffer written by the latest upload.
    pub fn front_slot(&self) -> usize {
        self.front
    }

    /// Vertices written by the latest upload.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Maximum vertices per upload.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Bind the front buffer at slot 0 and draw its vertices.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.vertex_count == 0 {
            return;
        }
        let bytes = u64::from(self.vertex_count) * self.stride;
        render_pass.set_vertex_buffer(0, self.buffers[self.front].slice(..bytes));
        render_pass.draw(0..self.vertex_count, 0..1);
    }
}

fn next_slot(slot: usize) -> usize {
    (slot + 1) % 2
}

/// Shooting-star segment endpoint; alpha carries the fade.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Vertex shared by planets, moons, rings, orbit paths, and the ship.
/// `color` is mixed with the texture; orbit paths use it alone.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

impl SceneVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;

    fn triangle() -> [SceneVertex; 3] {
        let v = |x: f32, y: f32| SceneVertex {
            position: [x, y, 0.0],
            color: [1.0; 3],
            uv: [0.0; 2],
            normal: [0.0, 0.0, 1.0],
        };
        [v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0)]
    }

    #[test]
    fn test_indexed_mesh_creation() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let allocator = BufferAllocator::new(&device);
        let mesh = allocator.create_mesh("tri", &triangle(), IndexData::U16(&[0, 1, 2]));

        assert!(mesh.is_indexed());
        assert_eq!(mesh.index_count, 3);
        assert_eq!(mesh.vertex_count, 3);
        assert!(matches!(mesh.index_buffer, Some((_, wgpu::IndexFormat::Uint16))));
    }

    #[test]
    fn test_vertex_mesh_has_no_index_buffer() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let allocator = BufferAllocator::new(&device);
        let mesh = allocator.create_vertex_mesh("tri", &triangle());

        assert!(!mesh.is_indexed());
        assert_eq!(mesh.vertex_count, 3);
        assert_eq!(mesh.index_count, 0);
    }

    #[test]
    fn test_double_buffer_alternates_and_clamps() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let stride = std::mem::size_of::<LineVertex>() as u64;
        let mut buffers = DoubleBufferedVertices::new(&device, "trails", 4, stride);
        let vertex = LineVertex {
            position: [0.0; 3],
            color: [1.0; 4],
        };

        assert_eq!(buffers.upload(&queue, &[vertex; 2]), 2);
        let first = buffers.front_slot();
        assert_eq!(buffers.upload(&queue, &[vertex; 9]), 4);
        assert_ne!(buffers.front_slot(), first);
        assert_eq!(buffers.vertex_count(), 4);
    }

    #[test]
    fn test_slots_alternate() {
        assert_eq!(next_slot(0), 1);
        assert_eq!(next_slot(1), 0);
    }

    #[test]
    fn test_index_width_matches_format() {
        let narrow = IndexData::U16(&[0, 1, 2]);
        let wide = IndexData::U32(&[0, 1, 2]);
        assert_eq!((narrow.format(), narrow.as_bytes().len()), (wgpu::IndexFormat::Uint16, 6));
        assert_eq!((wide.format(), wide.as_bytes().len()), (wgpu::IndexFormat::Uint32, 12));
        assert_eq!(wide.count(), 3);
    }

    #[test]
    fn test_line_vertex_layout() {
        let layout = LineVertex::layout();
        // position (f32×3) + color (f32×4)
        assert_eq!(layout.array_stride, 28);
        assert_eq!(layout.attributes.len(), 2);
    }

    #[test]
    fn test_scene_vertex_layout() {
        let layout = SceneVertex::layout();
        // position + color + uv + normal = 3 + 3 + 2 + 3 floats
        assert_eq!(layout.array_stride, 44);
        assert_eq!(layout.attributes.len(), 4);
        assert_eq!(layout.attributes[3].offset, 32);
        assert_eq!(
            std::mem::offset_of!(SceneVertex, normal) as u64,
            layout.attributes[3].offset
        );
    }
}
