//! Polymer engine core
//!
//! Entity-component runtime shared by the editor and the renderer.
//!
//! # Module Structure
//!
//! ```text
//! pm-core/
//! ├── entity.rs        # Entity ids and allocation
//! ├── type_id.rs       # Component type registry
//! ├── component.rs     # Component and payload traits
//! ├── pool.rs          # Dense component storage
//! ├── system.rs        # System contract
//! ├── orchestrator.rs  # Routing of create/destroy requests
//! ├── math.rs          # Rigid poses
//! ├── transform/       # Scene graph and world transforms
//! └── systems/         # Ready-made systems
//! ```

pub mod component;
pub mod entity;
pub mod math;
pub mod orchestrator;
pub mod pool;
pub mod system;
pub mod systems;
pub mod transform;
pub mod type_id;

pub use component::{Component, ComponentSource};
pub use entity::{Entity, EntityAllocator};
pub use math::Pose;
pub use orchestrator::EntityOrchestrator;
pub use pool::ComponentPool;
pub use system::{AsAny, System, SystemId};
pub use systems::PoolSystem;
pub use transform::{
    SceneGraphComponent, TransformError, TransformSystem, WorldTransformComponent,
};
pub use type_id::{PolyTypeId, TypeRegistry};
