//! Vertex-in-hull narrow phase over convex mesh colliders
//!
//! Every tick the colliders' hull vertices are transformed into world space
//! once, then each unordered pair of colliders is tested for penetrating
//! vertices. A vertex is inside a hull when it is on or behind every
//! transformed face plane. Per target hull the map keeps a single contact
//! candidate: the penetrating vertex farthest from the target's world
//! centroid, so a grazing corner beats a barely-submerged one.

use std::collections::HashMap;

use log::{debug, trace};

use crate::config::PhysicsConfig;
use crate::ecs::{Entity, MeshCollider, Registry, Transform};
use crate::foundation::math::{distance_from_plane, Point3, Vec3};

use super::resolution::resolve;

/// Deepest-vertex contact between two convex colliders
#[derive(Debug, Clone, Copy)]
pub struct ContactCandidate {
    /// Entity owning the penetrating vertex
    pub source: Entity,

    /// Entity whose hull contains the vertex
    pub target: Entity,

    /// Penetrating vertex in world space
    pub point: Vec3,

    /// Distance of the vertex from the target's world centroid
    pub centroid_distance: f32,
}

/// Narrow-phase collision system for convex mesh colliders
pub struct MeshCollisionSystem {
    restitution: f32,
}

impl Default for MeshCollisionSystem {
    fn default() -> Self {
        Self { restitution: 0.85 }
    }
}

impl MeshCollisionSystem {
    /// Create a system with the default restitution
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a system configured from a [`PhysicsConfig`]
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self {
            restitution: config.restitution,
        }
    }

    /// Find at most one contact candidate per target hull
    ///
    /// Each unordered collider pair contributes at most one candidate: the
    /// lower-id entity's hull is probed with the other's vertices first and
    /// the mirrored orientation is only tried when that probe finds nothing.
    pub fn detect(&self, registry: &Registry) -> HashMap<Entity, ContactCandidate> {
        let mut candidates = HashMap::new();
        let Some(colliders) = registry.storage::<MeshCollider>() else {
            return candidates;
        };

        // World-space vertices and centroid, one transform pass per entity
        let mut world: HashMap<Entity, (Vec<Vec3>, Vec3)> = HashMap::new();
        let mut entities: Vec<Entity> = Vec::new();
        for (entity, collider, transform) in registry.execute::<MeshCollider, Transform>() {
            let matrix = transform.world_matrix();
            let vertices: Vec<Vec3> = collider
                .mesh
                .positions
                .iter()
                .map(|p| matrix.transform_point(&Point3::from(*p)).coords)
                .collect();
            let centroid = matrix
                .transform_point(&Point3::from(collider.mesh.centroid))
                .coords;
            world.insert(entity, (vertices, centroid));
            entities.push(entity);
        }
        entities.sort_unstable();

        for i in 0..entities.len() {
            for j in (i + 1)..entities.len() {
                let found = Self::probe_pair(colliders, &world, entities[i], entities[j])
                    .or_else(|| Self::probe_pair(colliders, &world, entities[j], entities[i]));
                let Some(candidate) = found else {
                    continue;
                };
                let keep_existing = candidates
                    .get(&candidate.target)
                    .is_some_and(|existing| existing.centroid_distance >= candidate.centroid_distance);
                if !keep_existing {
                    candidates.insert(candidate.target, candidate);
                }
            }
        }

        debug!("narrow phase found {} contact candidate(s)", candidates.len());
        candidates
    }

    /// Detect and resolve all contacts, in ascending target order
    ///
    /// Contacts the resolver rejects (no entry face found, or penetration
    /// deeper than the approach speed) are skipped and retried naturally on
    /// the next tick.
    pub fn update(&self, registry: &mut Registry) {
        let candidates = self.detect(registry);
        let mut ordered: Vec<ContactCandidate> = candidates.into_values().collect();
        ordered.sort_unstable_by_key(|c| c.target);

        for candidate in ordered {
            match resolve(&candidate, self.restitution, registry) {
                Ok(()) => trace!(
                    "resolved contact between {:?} and {:?}",
                    candidate.source,
                    candidate.target
                ),
                Err(error) => trace!(
                    "skipped contact between {:?} and {:?}: {error}",
                    candidate.source,
                    candidate.target
                ),
            }
        }
    }

    /// Probe the target hull with the source's vertices
    ///
    /// Returns the penetrating vertex farthest from the target's world
    /// centroid, or `None` when no vertex is inside.
    fn probe_pair(
        colliders: &crate::ecs::ComponentStorage<MeshCollider>,
        world: &HashMap<Entity, (Vec<Vec3>, Vec3)>,
        target: Entity,
        source: Entity,
    ) -> Option<ContactCandidate> {
        let mesh = &colliders.at(target)?.mesh;
        let (target_vertices, target_centroid) = world.get(&target)?;
        let (source_vertices, _) = world.get(&source)?;

        let mut best: Option<ContactCandidate> = None;
        for &vertex in source_vertices {
            let mut inside = true;
            for face in &mesh.faces {
                let [i0, i1, i2] = face.indices;
                let distance = distance_from_plane(
                    target_vertices[i0],
                    target_vertices[i1],
                    target_vertices[i2],
                    vertex,
                );
                if distance > 0.0 {
                    inside = false;
                    break;
                }
            }
            if !inside {
                continue;
            }

            let centroid_distance = (vertex - target_centroid).norm();
            let deeper = best
                .as_ref()
                .map_or(true, |b| centroid_distance > b.centroid_distance);
            if deeper {
                best = Some(ContactCandidate {
                    source,
                    target,
                    point: vertex,
                    centroid_distance,
                });
            }
        }
        best
    }
}
