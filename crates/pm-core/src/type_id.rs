//! Component type identifiers.
//!
//! Every component type gets a [`PolyTypeId`] from a [`TypeRegistry`]. The
//! registry is an ordinary value owned by the caller (usually the
//! orchestrator) so that identifiers are assigned by an explicit setup step
//! instead of hidden statics.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

/// Stable numeric tag identifying one component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolyTypeId(pub u32);

impl fmt::Display for PolyTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Maps Rust types to [`PolyTypeId`]s in registration order.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    ids: HashMap<TypeId, PolyTypeId>,
    names: Vec<&'static str>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`, returning its identifier.
    ///
    /// Registering the same type twice returns the id assigned the first time.
    pub fn register<T: 'static>(&mut self) -> PolyTypeId {
        let next = PolyTypeId(self.names.len() as u32);
        let names = &mut self.names;
        *self.ids.entry(TypeId::of::<T>()).or_insert_with(|| {
            names.push(type_name::<T>());
            next
        })
    }

    /// Identifier of `T`, if it was registered.
    pub fn id_of<T: 'static>(&self) -> Option<PolyTypeId> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    /// Rust type name of a registered identifier.
    pub fn name_of(&self, id: PolyTypeId) -> Option<&'static str> {
        self.names.get(id.0 as usize).copied()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
