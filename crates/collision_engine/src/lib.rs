//! # Collision Engine
//!
//! Convex-hull collision detection and impulse-based response for rigid
//! bodies, driven through a sparse-set entity registry.
//!
//! ## Features
//!
//! - **Convex Hulls**: Incremental hull construction over point clouds
//! - **Narrow Phase**: Vertex-in-hull contact detection between mesh colliders
//! - **Contact Resolution**: Positional correction plus a restitution impulse
//! - **Broad Phase**: Octree-backed destructive culling for projectile boxes
//! - **Hull Sharing**: One cached hull per source mesh across all colliders
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use collision_engine::prelude::*;
//!
//! fn main() {
//!     let mut registry = Registry::new();
//!     let mut store = MeshStore::new();
//!     let mut cache = HullCache::new();
//!
//!     let key = store.insert(vec![
//!         Vec3::new(-0.5, -0.5, -0.5),
//!         Vec3::new(0.5, -0.5, -0.5),
//!         Vec3::new(-0.5, 0.5, -0.5),
//!         Vec3::new(-0.5, -0.5, 0.5),
//!     ]);
//!     let body = registry.create();
//!     registry.insert(body, Transform::default());
//!     cache
//!         .attach_mesh_collider(&mut registry, &store, body, key, ColliderKind::Target)
//!         .expect("tetrahedron is non-degenerate");
//!
//!     let config = PhysicsConfig::default();
//!     let narrow = MeshCollisionSystem::from_config(&config);
//!     let broad = BroadPhase::from_config(&config);
//!     loop {
//!         narrow.update(&mut registry);
//!         broad.cull(&mut registry);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;
pub mod physics;
pub mod spatial;

pub use config::{Config, ConfigError, PhysicsConfig};
pub use physics::{
    BroadPhase, ContactCandidate, ConvexHull, ConvexMesh, DegenerateInputError, HullCache,
    MeshCollisionSystem, MeshKey, MeshStore, ResolveError, EPSILON,
};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, PhysicsConfig},
        ecs::{
            AabbCollider, ColliderKind, Component, Entity, MeshCollider, PhysicsObject, Registry,
            Transform,
        },
        foundation::math::{Mat3, Mat4, Vec3},
        physics::{
            BroadPhase, ContactCandidate, ConvexHull, ConvexMesh, DegenerateInputError, HullCache,
            MeshCollisionSystem, MeshKey, MeshStore,
        },
        spatial::{Aabb, Octree, OctreeConfig},
    };
}
