//! Immutable convex mesh produced by hull construction

use crate::foundation::math::Vec3;

/// Triangular face of a convex mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshFace {
    /// Indices into the mesh positions, wound so the normal points outward
    pub indices: [usize; 3],

    /// Outward unit normal in mesh space
    pub normal: Vec3,
}

/// Convex polyhedron with outward face normals
///
/// Immutable after construction; shared by reference (`Arc`) across every
/// collider built from the same source mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexMesh {
    /// Hull vertex positions in mesh space
    pub positions: Vec<Vec3>,

    /// Triangular faces with outward winding
    pub faces: Vec<MeshFace>,

    /// Mean of the hull vertices
    pub centroid: Vec3,
}

impl ConvexMesh {
    /// The three vertex positions of a face
    pub fn face_positions(&self, face: &MeshFace) -> [Vec3; 3] {
        [
            self.positions[face.indices[0]],
            self.positions[face.indices[1]],
            self.positions[face.indices[2]],
        ]
    }

    /// Number of distinct undirected edges
    pub fn edge_count(&self) -> usize {
        let mut edges = std::collections::HashSet::new();
        for face in &self.faces {
            for k in 0..3 {
                let a = face.indices[k];
                let b = face.indices[(k + 1) % 3];
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.len()
    }
}
