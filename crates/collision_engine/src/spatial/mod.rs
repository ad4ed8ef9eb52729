//! Spatial partitioning for broad-phase collision culling

pub mod bounds;
pub mod octree;

pub use bounds::Aabb;
pub use octree::{Octree, OctreeConfig};
