//! Cascaded shadow caster pass.

use crate::cascades::StableCascadedShadows;
use crate::constants::formats;
use crate::constants::shadow::{DEPTH_BIAS, NUM_CASCADES, SLOPE_BIAS};
use crate::pipeline::{PipelineConfig, create_uniform_bind_group, uniform_bind_group_layout};
use crate::uniforms::CascadeUniform;
use crate::vertex::MeshVertex;

use super::gpu_resources::{self, DynamicUniformBuffer, ShadowTextures};
use super::render_pass::ObjectBindings;
use super::storage::Draw;

/// Shadow resources, allocated only when shadows are enabled.
pub struct ShadowPass {
    textures: ShadowTextures,
    cascade_buffer: DynamicUniformBuffer,
    cascade_bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

impl ShadowPass {
    /// Allocate the cascade array and the caster pipeline.
    pub fn new(device: &wgpu::Device, resolution: u32, object_layout: &wgpu::BindGroupLayout) -> Self {
        tracing::info!(
            "Allocating {} shadow cascades at {}x{}",
            NUM_CASCADES,
            resolution,
            resolution
        );

        let textures = gpu_resources::create_shadow_textures(device, resolution);
        let cascade_buffer = DynamicUniformBuffer::new(
            device,
            "Shadow Cascade Buffer",
            std::mem::size_of::<CascadeUniform>() as u64,
            NUM_CASCADES,
        );

        let cascade_layout =
            uniform_bind_group_layout(device, "Shadow Cascade", wgpu::ShaderStages::VERTEX, true);
        let cascade_bind_group = create_uniform_bind_group(
            device,
            &cascade_layout,
            &cascade_buffer.buffer,
            cascade_buffer.binding_size(),
            "Shadow Cascade",
        );

        let layouts = [&cascade_layout, object_layout];
        let pipeline = PipelineConfig::new(
            "Shadow Caster",
            include_str!("../shaders/shadow_cascade.wgsl"),
            None,
            Some(formats::DEPTH),
            &layouts,
        )
        .with_vertex_layouts(vec![MeshVertex::layout()])
        .with_depth_bias(DEPTH_BIAS, SLOPE_BIAS)
        .build(device);

        Self {
            textures,
            cascade_buffer,
            cascade_bind_group,
            pipeline,
        }
    }

    /// Cascade array textures.
    pub fn textures(&self) -> &ShadowTextures {
        &self.textures
    }

    /// Upload the light matrix of every cascade.
    pub fn update(&self, queue: &wgpu::Queue, cascades: &StableCascadedShadows) {
        let uniforms: Vec<CascadeUniform> = cascades
            .cascades()
            .iter()
            .map(|c| CascadeUniform {
                shadow_matrix: c.shadow_matrix.to_cols_array_2d(),
            })
            .collect();
        self.cascade_buffer.write(queue, &uniforms);
    }

    /// Render every caster into every cascade layer.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, draws: &[Draw], objects: &ObjectBindings<'_>) {
        let casters = draws.iter().filter(|d| d.cast_shadow).count();
        tracing::trace!("Shadow pass: {} casters", casters);

        for (layer, view) in self.textures.layer_views.iter().enumerate() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Cascade Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if casters == 0 {
                continue;
            }

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.cascade_bind_group, &[self.cascade_buffer.offset(layer)]);
            for (slot, draw) in draws.iter().enumerate().filter(|(_, d)| d.cast_shadow) {
                objects.bind(&mut pass, 1, slot);
                draw.mesh.draw(&mut pass);
            }
        }
    }
}
