//! Convex hull construction and the resulting immutable mesh

pub mod builder;
pub mod mesh;

pub use builder::{ConvexHull, DegenerateInputError};
pub use mesh::{ConvexMesh, MeshFace};
