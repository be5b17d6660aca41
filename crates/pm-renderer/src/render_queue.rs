//! Draw ordering.
//!
//! The queue is rebuilt from a snapshot every frame. Both orderings use a
//! stable sort, so entries that compare equal keep their submission order.

use std::cmp::Ordering;

use glam::Vec3;

use pm_core::Entity;

use crate::material::MaterialId;
use crate::payload::Renderable;

/// One queued draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueEntry {
    /// Entity to draw.
    pub entity: Entity,
    /// Index of the entity's per-object uniform slot.
    pub slot: usize,
    /// Material identity used for grouping.
    pub material: MaterialId,
    /// Distance from the sorting eye.
    pub distance: f32,
}

/// Flat, ordered list of draws.
#[derive(Debug, Clone, Default)]
pub struct RenderQueue {
    entries: Vec<QueueEntry>,
}

impl RenderQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every renderable `material_of` returns a material for.
    ///
    /// The uniform slot of each entry is its index in `renderables`.
    pub fn build(
        eye: Vec3,
        renderables: &[Renderable],
        mut material_of: impl FnMut(&Renderable) -> Option<MaterialId>,
    ) -> Self {
        let mut queue = Self::new();
        for (slot, renderable) in renderables.iter().enumerate() {
            if let Some(material) = material_of(renderable) {
                queue.push(eye, renderable.entity, slot, material, renderable.position());
            }
        }
        queue
    }

    /// Queue a draw for an object at `position`, measured from `eye`.
    pub fn push(&mut self, eye: Vec3, entity: Entity, slot: usize, material: MaterialId, position: Vec3) {
        self.entries.push(QueueEntry {
            entity,
            slot,
            material,
            distance: eye.distance(position),
        });
    }

    /// Group by material id (ascending), then front to back.
    pub fn sort_material_major(&mut self) {
        self.entries.sort_by(material_major);
    }

    /// Front to back, ignoring materials.
    pub fn sort_by_distance(&mut self) {
        self.entries.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    }

    /// Entries in draw order.
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Entities in draw order.
    pub fn entities(&self) -> Vec<Entity> {
        self.entries.iter().map(|e| e.entity).collect()
    }

    /// Number of queued draws.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry, keeping the allocation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn material_major(a: &QueueEntry, b: &QueueEntry) -> Ordering {
    a.material
        .cmp(&b.material)
        .then_with(|| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(items: &[(u64, u64, f32)]) -> RenderQueue {
        let mut q = RenderQueue::new();
        for (slot, &(entity, material, z)) in items.iter().enumerate() {
            q.push(Vec3::ZERO, Entity(entity), slot, MaterialId(material), Vec3::new(0.0, 0.0, z));
        }
        q
    }

    #[test]
    fn test_material_major() {
        let mut q = queue(&[(0, 2, 1.0), (1, 1, 5.0), (2, 2, 0.5), (3, 1, 2.0)]);
        q.sort_material_major();
        assert_eq!(q.entities(), vec![Entity(3), Entity(1), Entity(2), Entity(0)]);
    }

    #[test]
    fn test_distance_only() {
        let mut q = queue(&[(0, 2, 3.0), (1, 1, -5.0), (2, 2, 0.5), (3, 1, 2.0)]);
        q.sort_by_distance();
        assert_eq!(q.entities(), vec![Entity(2), Entity(3), Entity(0), Entity(1)]);
    }

    #[test]
    fn test_ties_keep_submission_order() {
        let mut q = queue(&[(7, 1, 1.0), (3, 1, 1.0), (5, 1, 1.0)]);
        q.sort_material_major();
        assert_eq!(q.entities(), vec![Entity(7), Entity(3), Entity(5)]);
        q.sort_by_distance();
        assert_eq!(q.entities(), vec![Entity(7), Entity(3), Entity(5)]);
    }

    #[test]
    fn test_build_skips_unmaterialed() {
        use pm_core::Pose;

        let renderables: Vec<Renderable> = (0..4)
            .map(|i| Renderable {
                entity: Entity(i),
                world_pose: Pose::from_translation(Vec3::new(0.0, 0.0, -(i as f32))),
                scale: Vec3::ONE,
            })
            .collect();
        let mut q = RenderQueue::build(Vec3::ZERO, &renderables, |r| {
            (r.entity != Entity(2)).then_some(MaterialId(r.entity.0 % 2))
        });
        assert_eq!(q.len(), 3);
        assert_eq!(q.entries()[2].slot, 3);

        q.sort_material_major();
        assert_eq!(q.entities(), vec![Entity(0), Entity(1), Entity(3)]);
    }

    #[test]
    fn test_distance_from_eye() {
        let mut q = RenderQueue::new();
        q.push(Vec3::new(0.0, 3.0, 0.0), Entity(0), 0, MaterialId(0), Vec3::new(4.0, 0.0, 0.0));
        assert!((q.entries()[0].distance - 5.0).abs() < 1e-6);
        assert_eq!(q.len(), 1);
        q.clear();
        assert!(q.is_empty());
    }
}
