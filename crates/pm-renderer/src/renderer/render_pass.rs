//! Per-view render pass execution.
//!
//! Each function records one render pass. Attachments are stored between
//! passes so a view can be cleared, prepassed, shaded and resolved in
//! separate steps.

use crate::material::{MaterialId, Skybox};
use crate::render_queue::RenderQueue;

use super::gpu_resources::DynamicUniformBuffer;
use super::storage::Draw;

/// Per-object uniforms addressed by draw slot.
pub struct ObjectBindings<'a> {
    /// Bind group over the object buffer.
    pub bind_group: &'a wgpu::BindGroup,
    /// The object buffer.
    pub buffer: &'a DynamicUniformBuffer,
}

impl ObjectBindings<'_> {
    /// Bind the uniforms of `slot` at `group`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, group: u32, slot: usize) {
        pass.set_bind_group(group, self.bind_group, &[self.buffer.offset(slot)]);
    }
}

/// Frame-wide bind groups for forward and prepass pipelines.
pub struct FrameBindings<'a> {
    /// Group 0.
    pub scene: &'a wgpu::BindGroup,
    /// Group 1.
    pub view: &'a wgpu::BindGroup,
    /// Group 2.
    pub objects: ObjectBindings<'a>,
}

/// Color and depth a view renders into.
#[derive(Clone, Copy)]
pub struct ViewAttachments<'a> {
    /// Multisampled target, or the view texture without MSAA.
    pub color: &'a wgpu::TextureView,
    /// Depth matching `color`.
    pub depth: &'a wgpu::TextureView,
}

fn color_attachment(
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
) -> wgpu::RenderPassColorAttachment<'_> {
    wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load,
            store: wgpu::StoreOp::Store,
        },
    }
}

fn depth_attachment(
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<f32>,
) -> wgpu::RenderPassDepthStencilAttachment<'_> {
    wgpu::RenderPassDepthStencilAttachment {
        view,
        depth_ops: Some(wgpu::Operations {
            load,
            store: wgpu::StoreOp::Store,
        }),
        stencil_ops: None,
    }
}

/// Clear color to `clear_color` and depth to the far plane.
pub fn clear(encoder: &mut wgpu::CommandEncoder, target: ViewAttachments<'_>, clear_color: [f32; 4]) {
    let [r, g, b, a] = clear_color.map(f64::from);
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Clear Pass"),
        color_attachments: &[Some(color_attachment(
            target.color,
            wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
        ))],
        depth_stencil_attachment: Some(depth_attachment(target.depth, wgpu::LoadOp::Clear(1.0))),
        timestamp_writes: None,
        occlusion_query_set: None,
    });
}

/// Write depth for every queued draw.
pub fn depth_prepass(
    encoder: &mut wgpu::CommandEncoder,
    target: ViewAttachments<'_>,
    pipeline: &wgpu::RenderPipeline,
    bindings: &FrameBindings<'_>,
    render_queue: &RenderQueue,
    draws: &[Draw],
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Depth Prepass"),
        color_attachments: &[],
        depth_stencil_attachment: Some(depth_attachment(target.depth, wgpu::LoadOp::Load)),
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bindings.scene, &[]);
    pass.set_bind_group(1, bindings.view, &[]);
    for entry in render_queue.entries() {
        bindings.objects.bind(&mut pass, 2, entry.slot);
        draws[entry.slot].mesh.draw(&mut pass);
    }
}

/// Draw the background.
pub fn skybox(encoder: &mut wgpu::CommandEncoder, target: ViewAttachments<'_>, skybox: &dyn Skybox) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Skybox Pass"),
        color_attachments: &[Some(color_attachment(target.color, wgpu::LoadOp::Load))],
        depth_stencil_attachment: Some(depth_attachment(target.depth, wgpu::LoadOp::Load)),
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    skybox.render(&mut pass);
}

/// Shade every queued draw, rebinding materials only when they change.
pub fn forward(
    encoder: &mut wgpu::CommandEncoder,
    target: ViewAttachments<'_>,
    bindings: &FrameBindings<'_>,
    render_queue: &RenderQueue,
    draws: &[Draw],
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Forward Pass"),
        color_attachments: &[Some(color_attachment(target.color, wgpu::LoadOp::Load))],
        depth_stencil_attachment: Some(depth_attachment(target.depth, wgpu::LoadOp::Load)),
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    pass.set_bind_group(0, bindings.scene, &[]);
    pass.set_bind_group(1, bindings.view, &[]);

    let mut bound: Option<MaterialId> = None;
    for entry in render_queue.entries() {
        let draw = &draws[entry.slot];
        if bound != Some(entry.material) {
            draw.material.bind(&mut pass);
            bound = Some(entry.material);
        }
        bindings.objects.bind(&mut pass, 2, entry.slot);
        draw.mesh.draw(&mut pass);
    }
}

/// Resolve the multisampled color target into the view texture.
pub fn resolve_color(
    encoder: &mut wgpu::CommandEncoder,
    multisampled: &wgpu::TextureView,
    resolved: &wgpu::TextureView,
) {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Color Resolve Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: multisampled,
            resolve_target: Some(resolved),
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Discard,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
}

/// Run a fullscreen triangle into `color` and/or `depth`.
pub fn fullscreen(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
    color: Option<&wgpu::TextureView>,
    depth: Option<&wgpu::TextureView>,
) {
    let color_attachments: Vec<_> = color
        .map(|view| color_attachment(view, wgpu::LoadOp::Clear(wgpu::Color::BLACK)))
        .into_iter()
        .map(Some)
        .collect();
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &color_attachments,
        depth_stencil_attachment: depth.map(|view| depth_attachment(view, wgpu::LoadOp::Clear(1.0))),
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
