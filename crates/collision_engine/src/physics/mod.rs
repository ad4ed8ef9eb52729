//! Collision detection and response
//!
//! The pipeline runs in three stages each tick: the mesh narrow phase
//! ([`narrow_phase`]) finds the deepest penetrating vertex per overlapping
//! hull pair, the contact resolver ([`resolution`]) applies positional
//! correction and an impulse at that contact, and the destructive AABB
//! broad phase ([`broad_phase`]) culls whatever the projectile boxes sweep
//! over. Hulls come from [`hull`] and are shared through [`hull_cache`].

pub mod broad_phase;
pub mod hull;
pub mod hull_cache;
pub mod narrow_phase;
pub mod resolution;

pub use broad_phase::BroadPhase;
pub use hull::{ConvexHull, ConvexMesh, DegenerateInputError, MeshFace};
pub use hull_cache::{HullCache, MeshKey, MeshStore};
pub use narrow_phase::{ContactCandidate, MeshCollisionSystem};
pub use resolution::{resolve, ResolveError};

/// Geometric tolerance shared by hull construction and contact queries
///
/// A point farther than this beyond a face plane is outside the hull; the
/// same value bounds the area slack in the point-in-triangle test.
pub const EPSILON: f32 = 1e-4;
