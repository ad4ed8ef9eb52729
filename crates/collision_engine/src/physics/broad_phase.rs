//! Destructive AABB broad phase over an octree
//!
//! Each pass advances every box collider by its entity's velocity, rebuilds
//! the octree from scratch, then queries it with each projectile box.
//! Non-projectile entities a projectile box overlaps are destroyed through
//! the registry; projectiles pass through each other and survive their own
//! hits.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::config::PhysicsConfig;
use crate::ecs::{AabbCollider, ColliderKind, Entity, Registry, Transform};
use crate::foundation::math::Vec3;
use crate::spatial::{Aabb, Octree, OctreeConfig};

/// Octree-backed broad phase that culls whatever projectiles sweep over
pub struct BroadPhase {
    bounds: Aabb,
    config: OctreeConfig,
}

impl BroadPhase {
    /// Create a broad phase over a symmetric world cube
    pub fn new(world_extent: f32, config: OctreeConfig) -> Self {
        Self {
            bounds: Aabb::from_center_extents(Vec3::zeros(), Vec3::repeat(world_extent)),
            config,
        }
    }

    /// Create a broad phase from a [`PhysicsConfig`]
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::new(config.world_extent, config.octree.clone())
    }

    /// Advance all box colliders, then destroy every non-projectile entity
    /// a projectile box overlaps
    ///
    /// Returns the destroyed entities in ascending id order.
    pub fn cull(&self, registry: &mut Registry) -> Vec<Entity> {
        // Advance boxes by their entity's velocity
        let movers: Vec<(Entity, Vec3)> = registry
            .execute::<AabbCollider, Transform>()
            .map(|(entity, _, transform)| (entity, transform.velocity))
            .collect();
        let storage = registry.storage_mut::<AabbCollider>();
        for (entity, velocity) in movers {
            if let Some(collider) = storage.at_mut(entity) {
                collider.aabb.translate(velocity);
            }
        }

        // Fresh octree over the advanced boxes
        let mut octree = Octree::new(self.bounds, self.config.clone());
        let mut kinds: HashMap<Entity, ColliderKind> = HashMap::new();
        let mut projectiles: Vec<(Entity, Aabb)> = Vec::new();
        for (entity, collider) in storage.iter() {
            octree.insert(collider.aabb, entity);
            kinds.insert(entity, collider.kind);
            if collider.kind == ColliderKind::Projectile {
                projectiles.push((entity, collider.aabb));
            }
        }

        let mut destroyed = BTreeSet::new();
        for (projectile, aabb) in projectiles {
            for hit in octree.query_aabb(&aabb) {
                if hit.entity == projectile || kinds[&hit.entity] == ColliderKind::Projectile {
                    continue;
                }
                if destroyed.insert(hit.entity) {
                    octree.remove(&hit.aabb, hit.entity);
                }
            }
        }

        let destroyed: Vec<Entity> = destroyed.into_iter().collect();
        for &entity in &destroyed {
            registry.destroy(entity);
        }
        if !destroyed.is_empty() {
            debug!("broad phase destroyed {} entity(ies)", destroyed.len());
        }
        destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_box(
        registry: &mut Registry,
        kind: ColliderKind,
        center: Vec3,
        velocity: Vec3,
    ) -> Entity {
        let entity = registry.create();
        registry.insert(
            entity,
            Transform {
                position: center,
                velocity,
                ..Default::default()
            },
        );
        registry.insert(
            entity,
            AabbCollider {
                kind,
                aabb: Aabb::from_center_extents(center, Vec3::new(0.5, 0.5, 0.5)),
            },
        );
        entity
    }

    fn broad_phase() -> BroadPhase {
        BroadPhase::new(100.0, OctreeConfig::default())
    }

    #[test]
    fn projectile_destroys_every_overlapped_target() {
        let mut registry = Registry::new();
        let projectile = spawn_box(
            &mut registry,
            ColliderKind::Projectile,
            Vec3::zeros(),
            Vec3::zeros(),
        );
        let near = spawn_box(
            &mut registry,
            ColliderKind::Target,
            Vec3::new(0.6, 0.0, 0.0),
            Vec3::zeros(),
        );
        let also_near = spawn_box(
            &mut registry,
            ColliderKind::MovingTarget,
            Vec3::new(-0.6, 0.0, 0.0),
            Vec3::zeros(),
        );
        let far = spawn_box(
            &mut registry,
            ColliderKind::Target,
            Vec3::new(30.0, 0.0, 0.0),
            Vec3::zeros(),
        );

        let destroyed = broad_phase().cull(&mut registry);

        assert_eq!(destroyed, vec![near, also_near]);
        assert!(registry.is_alive(projectile));
        assert!(registry.is_alive(far));
        assert!(!registry.is_alive(near));
        assert!(!registry.is_alive(also_near));
    }

    #[test]
    fn target_hit_by_two_projectiles_is_destroyed_once() {
        let mut registry = Registry::new();
        let left = spawn_box(
            &mut registry,
            ColliderKind::Projectile,
            Vec3::new(-0.3, 0.0, 0.0),
            Vec3::zeros(),
        );
        let right = spawn_box(
            &mut registry,
            ColliderKind::Projectile,
            Vec3::new(0.3, 0.0, 0.0),
            Vec3::zeros(),
        );
        let target = spawn_box(
            &mut registry,
            ColliderKind::Target,
            Vec3::zeros(),
            Vec3::zeros(),
        );

        // Both projectile queries report the same target; it is listed and
        // destroyed exactly once.
        let destroyed = broad_phase().cull(&mut registry);

        assert_eq!(destroyed, vec![target]);
        assert!(!registry.is_alive(target));
        assert!(registry.is_alive(left));
        assert!(registry.is_alive(right));
    }

    #[test]
    fn projectiles_pass_through_each_other() {
        let mut registry = Registry::new();
        let a = spawn_box(
            &mut registry,
            ColliderKind::Projectile,
            Vec3::zeros(),
            Vec3::zeros(),
        );
        let b = spawn_box(
            &mut registry,
            ColliderKind::Projectile,
            Vec3::new(0.2, 0.0, 0.0),
            Vec3::zeros(),
        );

        let destroyed = broad_phase().cull(&mut registry);

        assert!(destroyed.is_empty());
        assert!(registry.is_alive(a));
        assert!(registry.is_alive(b));
    }

    #[test]
    fn boxes_advance_by_velocity_before_the_query() {
        let mut registry = Registry::new();
        spawn_box(
            &mut registry,
            ColliderKind::Projectile,
            Vec3::zeros(),
            Vec3::new(4.0, 0.0, 0.0),
        );
        let target = spawn_box(
            &mut registry,
            ColliderKind::Target,
            Vec3::new(4.5, 0.0, 0.0),
            Vec3::zeros(),
        );

        let phase = broad_phase();
        // Boxes start 4.5 apart; one tick of velocity 4 closes the gap.
        let destroyed = phase.cull(&mut registry);
        assert_eq!(destroyed, vec![target]);

        // A second pass finds nothing left to destroy.
        assert!(phase.cull(&mut registry).is_empty());
    }

    #[test]
    fn destroyed_entities_lose_all_components() {
        let mut registry = Registry::new();
        spawn_box(
            &mut registry,
            ColliderKind::Projectile,
            Vec3::zeros(),
            Vec3::zeros(),
        );
        let target = spawn_box(
            &mut registry,
            ColliderKind::Target,
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::zeros(),
        );

        broad_phase().cull(&mut registry);

        assert!(registry.get::<Transform>(target).is_none());
        assert!(registry.get::<AabbCollider>(target).is_none());
    }
}
