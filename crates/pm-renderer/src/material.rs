//! Interfaces the render system draws through.
//!
//! Materials, meshes and skyboxes are owned by the application and shared
//! with the renderer as `Arc`s. The renderer sets bind groups 0 to 2 (scene,
//! view, object) before calling into them; materials own group 3.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::payload::IblCubemaps;
use crate::view::ViewData;

/// Identity used to group draws that share pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MaterialId(pub u64);

static NEXT_MATERIAL_ID: AtomicU64 = AtomicU64::new(1);

impl MaterialId {
    /// A process-wide unique id, increasing in allocation order.
    pub fn next() -> Self {
        Self(NEXT_MATERIAL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "material#{}", self.0)
    }
}

/// Shadow inputs offered to materials when shadows are active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowBinding {
    /// Number of valid cascades in the scene uniform block.
    pub cascade_count: u32,
    /// Resolution of each cascade layer.
    pub resolution: u32,
}

/// Surface shading for a set of draws.
pub trait Material: Send + Sync {
    /// Identity used for sorting.
    fn id(&self) -> MaterialId;

    /// Upload material parameters. Called once per frame before drawing.
    fn update_uniforms(&self, queue: &wgpu::Queue);

    /// Set the pipeline and material bind groups.
    fn bind(&self, pass: &mut wgpu::RenderPass<'_>);

    /// Unlit materials skip the light and shadow hooks.
    fn receives_lighting(&self) -> bool {
        true
    }

    /// Called when the cascaded shadow map is active this frame.
    fn update_shadow_uniforms(&self, _queue: &wgpu::Queue, _shadows: &ShadowBinding) {}

    /// Called when the payload carries image based lighting.
    fn update_ibl_uniforms(&self, _queue: &wgpu::Queue, _ibl: &IblCubemaps) {}
}

/// Geometry that can issue its own draw call.
///
/// Vertex buffer slot 0 must follow [`MeshVertex`](crate::vertex::MeshVertex)
/// so the depth-only pipelines can draw it too.
pub trait Drawable: Send + Sync {
    /// Bind buffers and draw with the currently bound pipeline.
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>);
}

/// Background drawn before opaque geometry.
pub trait Skybox: Send + Sync {
    /// Upload per-view data. Called before the view's passes are encoded.
    fn prepare(&self, queue: &wgpu::Queue, view: &ViewData);

    /// Draw into the current pass without depth testing.
    fn render(&self, pass: &mut wgpu::RenderPass<'_>);
}

/// Formats and depth state a forward material pipeline must match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetFormats {
    /// Color attachment format.
    pub color: wgpu::TextureFormat,
    /// Depth attachment format.
    pub depth: wgpu::TextureFormat,
    /// MSAA sample count of the attachments.
    pub sample_count: u32,
    /// Depth is already populated by a prepass when the forward pass runs.
    pub depth_prepass: bool,
}

impl TargetFormats {
    /// Depth write and compare function for forward geometry.
    ///
    /// After a prepass the forward pass only tests against the stored depth.
    pub fn forward_depth(&self) -> (bool, wgpu::CompareFunction) {
        if self.depth_prepass {
            (false, wgpu::CompareFunction::LessEqual)
        } else {
            (true, wgpu::CompareFunction::Less)
        }
    }
}

/// Bind group layouts the renderer binds before a material's own group.
///
/// Forward pipelines use them as groups 0 (scene), 1 (view) and 2 (object,
/// dynamic offset); group 3 belongs to the material.
#[derive(Debug, Clone)]
pub struct FrameLayouts {
    /// Scene uniforms, shadow cascades and comparison sampler.
    pub scene: Arc<wgpu::BindGroupLayout>,
    /// Per-view uniforms.
    pub view: Arc<wgpu::BindGroupLayout>,
    /// Per-object uniforms.
    pub object: Arc<wgpu::BindGroupLayout>,
}

/// Shared material handle.
pub type MaterialHandle = Arc<dyn Material>;

/// Shared mesh handle.
pub type DrawableHandle = Arc<dyn Drawable>;
