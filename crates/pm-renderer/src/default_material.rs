//! Built-in Lambert material.

use std::sync::atomic::{AtomicBool, Ordering};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::material::{FrameLayouts, Material, MaterialId, TargetFormats};
use crate::pipeline::{PipelineConfig, create_uniform_bind_group, uniform_bind_group_layout};
use crate::vertex::MeshVertex;

const SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/default_material.wgsl")
);

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct MaterialUniform {
    base_color: [f32; 4],
    ambient: [f32; 4],
}

impl MaterialUniform {
    fn new(base_color: [f32; 4], ambient: Vec3) -> Self {
        Self {
            base_color,
            ambient: ambient.extend(1.0).to_array(),
        }
    }
}

/// CPU copy of the uniform. The GPU copy is stale while `dirty` is set.
#[derive(Debug)]
struct MaterialParams {
    uniform: MaterialUniform,
    dirty: AtomicBool,
}

impl MaterialParams {
    /// Params whose GPU copy was written at buffer creation.
    fn uploaded(uniform: MaterialUniform) -> Self {
        Self {
            uniform,
            dirty: AtomicBool::new(false),
        }
    }

    fn set(&mut self, uniform: MaterialUniform) {
        if self.uniform != uniform {
            self.uniform = uniform;
            *self.dirty.get_mut() = true;
        }
    }

    /// The uniform, if it changed since the last call.
    fn take_pending(&self) -> Option<&MaterialUniform> {
        self.dirty
            .swap(false, Ordering::AcqRel)
            .then_some(&self.uniform)
    }
}

/// Single-colour diffuse material lit by the sun and point lights, with
/// cascaded shadows.
pub struct DefaultMaterial {
    id: MaterialId,
    params: MaterialParams,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

impl DefaultMaterial {
    /// Build the material's pipeline against the renderer's layouts.
    pub fn new(
        device: &wgpu::Device,
        layouts: &FrameLayouts,
        formats: &TargetFormats,
        base_color: [f32; 4],
        ambient: Vec3,
    ) -> Self {
        let uniform = MaterialUniform::new(base_color, ambient);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Default Material Buffer"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let layout = uniform_bind_group_layout(
            device,
            "Default Material",
            wgpu::ShaderStages::FRAGMENT,
            false,
        );
        let bind_group = create_uniform_bind_group(device, &layout, &buffer, None, "Default Material");

        let (depth_write, depth_compare) = formats.forward_depth();
        let bind_group_layouts = [
            layouts.scene.as_ref(),
            layouts.view.as_ref(),
            layouts.object.as_ref(),
            &layout,
        ];
        let pipeline = PipelineConfig::new(
            "Default Material",
            SHADER,
            Some(formats.color),
            Some(formats.depth),
            &bind_group_layouts,
        )
        .with_vertex_layouts(vec![MeshVertex::layout()])
        .with_depth(depth_write, depth_compare)
        .with_sample_count(formats.sample_count)
        .build(device);

        Self {
            id: MaterialId::next(),
            params: MaterialParams::uploaded(uniform),
            buffer,
            bind_group,
            pipeline,
        }
    }

    /// Base color (linear RGBA).
    pub fn base_color(&self) -> [f32; 4] {
        self.params.uniform.base_color
    }

    /// Change the base color. Uploaded on the next frame.
    pub fn set_base_color(&mut self, base_color: [f32; 4]) {
        let uniform = MaterialUniform {
            base_color,
            ..self.params.uniform
        };
        self.params.set(uniform);
    }

    /// Change the ambient term. Uploaded on the next frame.
    pub fn set_ambient(&mut self, ambient: Vec3) {
        self.params.set(MaterialUniform::new(self.params.uniform.base_color, ambient));
    }
}

impl Material for DefaultMaterial {
    fn id(&self) -> MaterialId {
        self.id
    }

    fn update_uniforms(&self, queue: &wgpu::Queue) {
        if let Some(uniform) = self.params.take_pending() {
            queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniform));
        }
    }

    fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(3, &self.bind_group, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout() {
        let uniform = MaterialUniform::new([0.5, 0.5, 0.5, 1.0], Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
        assert_eq!(uniform.ambient, [0.1, 0.2, 0.3, 1.0]);
    }

    #[test]
    fn test_params_upload_only_after_change() {
        let mut params = MaterialParams::uploaded(MaterialUniform::new([1.0; 4], Vec3::ZERO));
        assert!(params.take_pending().is_none());

        // Same value does not dirty the buffer.
        params.set(MaterialUniform::new([1.0; 4], Vec3::ZERO));
        assert!(params.take_pending().is_none());

        params.set(MaterialUniform::new([0.0, 1.0, 0.0, 1.0], Vec3::ZERO));
        let pending = params.take_pending().copied();
        assert_eq!(pending.map(|u| u.base_color), Some([0.0, 1.0, 0.0, 1.0]));
        assert!(params.take_pending().is_none());
    }
}
