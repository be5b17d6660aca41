//! Ready-made systems.

mod pool_system;

pub use pool_system::PoolSystem;
