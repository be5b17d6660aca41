//! Entity identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque entity identifier used as a key across every component pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u64);

impl Entity {
    /// Reserved "no entity" sentinel.
    pub const INVALID: Entity = Entity(u64::MAX);

    /// Broadcast target meaning "every entity". Systems clear all state on it.
    pub const ALL: Entity = Entity(u64::MAX - 1);

    /// Returns true unless this is one of the reserved sentinels.
    pub fn is_valid(self) -> bool {
        self != Self::INVALID && self != Self::ALL
    }

    /// Raw integer value.
    pub fn id(self) -> u64 {
        self.0
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::INVALID => write!(f, "entity(invalid)"),
            Self::ALL => write!(f, "entity(all)"),
            Entity(id) => write!(f, "entity({id})"),
        }
    }
}

impl From<u64> for Entity {
    fn from(id: u64) -> Self {
        Entity(id)
    }
}

/// Hands out fresh entity ids in increasing order.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    next: u64,
}

impl EntityAllocator {
    /// Create an allocator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next entity id.
    pub fn allocate(&mut self) -> Entity {
        let e = Entity(self.next);
        self.next += 1;
        debug_assert!(e.is_valid(), "entity id space exhausted");
        e
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_invalid() {
        assert!(!Entity::INVALID.is_valid());
        assert!(!Entity::ALL.is_valid());
        assert!(Entity(0).is_valid());
        assert_ne!(Entity::INVALID, Entity::ALL);
    }

    #[test]
    fn test_default_is_invalid() {
        assert_eq!(Entity::default(), Entity::INVALID);
    }

    #[test]
    fn test_allocator_is_monotonic() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_eq!(a, Entity(0));
        assert_eq!(b, Entity(1));
        assert_eq!(alloc.allocated(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(Entity(7).to_string(), "entity(7)");
        assert_eq!(Entity::INVALID.to_string(), "entity(invalid)");
    }
}
