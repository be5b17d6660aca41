//! Rendering constants
//!
//! Fixed sizes and formats shared between the CPU side and the shaders.
//! Values that appear in WGSL must be kept in sync by hand.

/// Shadow mapping constants
pub mod shadow {
    /// Number of cascades in the shadow map array.
    pub const NUM_CASCADES: usize = 4;
    /// Default shadow map resolution per cascade.
    pub const DEFAULT_RESOLUTION: u32 = 1024;
    /// Default blend between linear (0) and logarithmic (1) split placement.
    pub const DEFAULT_SPLIT_LAMBDA: f32 = 0.5;
    /// Bounding sphere radii are rounded up to this step.
    pub const RADIUS_QUANTUM: f32 = 1.0 / 32.0;
    /// Depth bias applied by the caster pipeline.
    pub const DEPTH_BIAS: i32 = 2;
    /// Slope-scaled depth bias applied by the caster pipeline.
    pub const SLOPE_BIAS: f32 = 2.0;
}

/// Lighting constants
pub mod lighting {
    /// Maximum number of point lights in the per-scene uniform block.
    pub const MAX_POINT_LIGHTS: usize = 8;
}

/// Render target formats
pub mod formats {
    /// HDR color written by the forward pass.
    pub const COLOR: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
    /// Depth for views and shadow cascades.
    pub const DEPTH: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    /// Tonemapped output.
    pub const POST: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
}

/// Viewport defaults
pub mod viewport {
    /// Default clear color (linear RGBA).
    pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    /// Default MSAA sample count.
    pub const SAMPLE_COUNT: u32 = 4;
    /// Default render size.
    pub const RENDER_SIZE: [u32; 2] = [1280, 720];
}

/// Uniform buffer sizing
pub mod buffers {
    /// Per-object slots allocated up front; the buffer grows on demand.
    pub const INITIAL_OBJECT_CAPACITY: usize = 256;
}
