//! Polymer engine renderer
//!
//! wgpu forward renderer with cascaded shadows, driven by a per-frame
//! [`RenderPayload`] gathered from the entity runtime.
//!
//! # Architecture
//!
//! - [`PbrRenderSystem`] - Render system owning meshes, materials, lights and GPU targets
//! - [`RenderPayload`] - Per-frame snapshot of transforms, lights and views
//! - [`StableCascadedShadows`] - Shimmer-free cascade fitting
//! - [`RenderQueue`] - Material-major draw ordering
//! - [`FramePlan`] - Pass order for the current settings
//! - [`Material`] / [`Drawable`] / [`Skybox`] - Application-provided draw hooks
//!
//! # Module Structure
//!
//! ```text
//! pm-renderer/
//! ├── constants.rs        # Formats, limits and defaults
//! ├── settings.rs         # RendererSettings (RON persistence)
//! ├── uniforms.rs         # GPU uniform layouts
//! ├── light.rs            # Point and directional lights
//! ├── view.rs             # ViewData and stereo center view
//! ├── frustum.rs          # Culling planes
//! ├── cascades.rs         # Cascaded shadow fitting
//! ├── render_queue.rs     # Draw ordering
//! ├── plan.rs             # Frame pass order
//! ├── payload.rs          # RenderPayload, Renderable
//! ├── material.rs         # Material, Drawable, Skybox traits
//! ├── components.rs       # Mesh and material components
//! ├── vertex.rs           # MeshVertex layout
//! ├── mesh.rs             # GpuMesh
//! ├── default_material.rs # Built-in Lambert material
//! ├── pipeline.rs         # Pipeline utilities
//! ├── profiling.rs        # CPU pass timings
//! ├── shaders/            # WGSL sources
//! └── renderer/           # PbrRenderSystem and its passes
//! ```

// Data
pub mod cascades;
pub mod constants;
pub mod frustum;
pub mod light;
pub mod payload;
pub mod plan;
pub mod render_queue;
pub mod settings;
pub mod uniforms;
pub mod view;

// GPU
pub mod components;
pub mod default_material;
pub mod material;
pub mod mesh;
pub mod pipeline;
pub mod profiling;
pub mod renderer;
pub mod vertex;

pub use cascades::{Cascade, StableCascadedShadows};
pub use components::{MaterialComponent, MeshComponent, SceneComponent};
pub use default_material::DefaultMaterial;
pub use frustum::{Frustum, Plane};
pub use light::{DirectionalLight, DirectionalLightComponent, PointLight, PointLightComponent};
pub use material::{
    Drawable, DrawableHandle, FrameLayouts, Material, MaterialHandle, MaterialId, ShadowBinding,
    Skybox, TargetFormats,
};
pub use mesh::GpuMesh;
pub use payload::{IblCubemaps, RenderPayload, Renderable};
pub use plan::{FramePlan, Pass};
pub use profiling::CpuProfiler;
pub use render_queue::{QueueEntry, RenderQueue};
pub use renderer::{Draw, PbrRenderSystem, RenderComponents};
pub use settings::{CascadeConfig, RendererSettings, SettingsError};
pub use vertex::MeshVertex;
pub use view::{ViewData, merged_center_view};
