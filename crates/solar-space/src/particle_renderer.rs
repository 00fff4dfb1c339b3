//! Draws the shooting-star pool as alpha-faded line segments.

use solar_render::{DoubleBufferedVertices, LinePipeline, LineVertex};

use crate::particles::ParticleField;

pub struct ShootingStarRenderer {
    vertices: DoubleBufferedVertices,
    scratch: Vec<LineVertex>,
}

impl ShootingStarRenderer {
    /// Room for two vertices (head and tail) per particle of a pool of `capacity`.
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let vertex_capacity = (capacity * 2) as u32;
        Self {
            vertices: DoubleBufferedVertices::new(
                device,
                "shooting-stars",
                vertex_capacity,
                std::mem::size_of::<LineVertex>() as u64,
            ),
            scratch: Vec::with_capacity(vertex_capacity as usize),
        }
    }

    /// Rebuild this frame's segments from the pool. Returns the vertex count uploaded.
    pub fn upload(&mut self, queue: &wgpu::Queue, field: &ParticleField) -> u32 {
        field.write_vertices(&mut self.scratch);
        self.vertices.upload(queue, &self.scratch)
    }

    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        pipeline: &LinePipeline,
        camera_bind_group: &wgpu::BindGroup,
    ) {
        if self.vertices.vertex_count() == 0 {
            return;
        }
        pass.set_pipeline(&pipeline.pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        self.vertices.draw(pass);
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.vertex_count()
    }
}
