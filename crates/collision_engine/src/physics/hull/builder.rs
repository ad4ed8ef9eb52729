//! Incremental convex hull construction (QuickHull)
//!
//! Builds the hull from a seed tetrahedron of axis-extreme points, then
//! repeatedly expands through the farthest outside point: faces visible from
//! that eye point are deleted, the horizon edge cycle separating visible
//! from hidden faces gains one new triangle per edge, and the deleted faces'
//! outside sets are redistributed. The working structure is an index arena
//! of faces and edges (faces hold three edge indices, edges hold up to two
//! face indices) that stays a closed 2-manifold at every completed step.

use std::collections::HashMap;

use log::{debug, warn};
use thiserror::Error;

use crate::foundation::math::{distance_from_line, distance_from_plane, face_normal, Vec3};
use crate::physics::EPSILON;

use super::mesh::{ConvexMesh, MeshFace};

/// Hull construction on a point set that does not span three dimensions
#[derive(Debug, Error)]
#[error("point set does not span three dimensions")]
pub struct DegenerateInputError;

/// Convex hull builder entry point
pub struct ConvexHull;

impl ConvexHull {
    /// Build the convex hull of a point cloud
    ///
    /// Fails with [`DegenerateInputError`] when the points are collinear,
    /// coplanar or fewer than four.
    pub fn build(points: &[Vec3]) -> Result<ConvexMesh, DegenerateInputError> {
        let mut builder = HullBuilder::new(points.to_vec());
        builder.seed_simplex()?;
        builder.assign_initial_outside_sets();
        builder.expand();
        let mesh = builder.extract();
        debug!(
            "built convex hull: {} vertices, {} faces from {} input points",
            mesh.positions.len(),
            mesh.faces.len(),
            points.len()
        );
        Ok(mesh)
    }
}

/// Construction-time face: ordered vertex indices, linked edges and the
/// outside set of input-point indices still beyond its plane
struct Face {
    verts: [usize; 3],
    edges: [usize; 3],
    outside: Vec<usize>,
    alive: bool,
}

/// Construction-time edge shared by up to two faces
struct Edge {
    faces: [Option<usize>; 2],
    alive: bool,
}

struct HullBuilder {
    /// Input point cloud; indices in outside sets refer to this
    points: Vec<Vec3>,
    /// Points already consumed as hull vertices
    claimed: Vec<bool>,
    /// Hull vertices accepted so far; face vertex indices refer to this
    vertices: Vec<Vec3>,
    faces: Vec<Face>,
    edges: Vec<Edge>,
    /// Undirected vertex pair -> edge arena index, for live edges only
    edge_lookup: HashMap<(usize, usize), usize>,
}

impl HullBuilder {
    fn new(points: Vec<Vec3>) -> Self {
        let claimed = vec![false; points.len()];
        Self {
            points,
            claimed,
            vertices: Vec::new(),
            faces: Vec::new(),
            edges: Vec::new(),
            edge_lookup: HashMap::new(),
        }
    }

    /// Signed distance of a point from a face plane
    fn face_distance(&self, face: usize, point: Vec3) -> f32 {
        let [a, b, c] = self.faces[face].verts;
        distance_from_plane(self.vertices[a], self.vertices[b], self.vertices[c], point)
    }

    /// Create a face over three hull vertices and link it into the edge arena
    fn add_face(&mut self, a: usize, b: usize, c: usize) -> usize {
        let face_idx = self.faces.len();
        let mut edges = [0usize; 3];
        for (k, (u, v)) in [(a, b), (b, c), (c, a)].into_iter().enumerate() {
            let key = (u.min(v), u.max(v));
            let edge_idx = match self.edge_lookup.get(&key) {
                Some(&idx) => {
                    let slot = &mut self.edges[idx].faces;
                    if slot[0].is_none() {
                        slot[0] = Some(face_idx);
                    } else {
                        slot[1] = Some(face_idx);
                    }
                    idx
                }
                None => {
                    let idx = self.edges.len();
                    self.edges.push(Edge {
                        faces: [Some(face_idx), None],
                        alive: true,
                    });
                    self.edge_lookup.insert(key, idx);
                    idx
                }
            };
            edges[k] = edge_idx;
        }
        self.faces.push(Face {
            verts: [a, b, c],
            edges,
            outside: Vec::new(),
            alive: true,
        });
        face_idx
    }

    /// Delete a face; edges left with no faces die with it
    fn remove_face(&mut self, face_idx: usize) {
        self.faces[face_idx].alive = false;
        for k in 0..3 {
            let edge_idx = self.faces[face_idx].edges[k];
            let edge = &mut self.edges[edge_idx];
            for slot in &mut edge.faces {
                if *slot == Some(face_idx) {
                    *slot = None;
                }
            }
            if edge.faces.iter().all(Option::is_none) {
                edge.alive = false;
                let [u, v] = [
                    self.faces[face_idx].verts[k],
                    self.faces[face_idx].verts[(k + 1) % 3],
                ];
                self.edge_lookup.remove(&(u.min(v), u.max(v)));
            }
        }
    }

    /// Pick the initial tetrahedron from the six axis-extreme points
    fn seed_simplex(&mut self) -> Result<(), DegenerateInputError> {
        if self.points.len() < 4 {
            return Err(DegenerateInputError);
        }

        let mut extremes = [0usize; 6];
        for axis in 0..3 {
            let mut min_i = 0;
            let mut max_i = 0;
            for (i, p) in self.points.iter().enumerate() {
                if p[axis] < self.points[min_i][axis] {
                    min_i = i;
                }
                if p[axis] > self.points[max_i][axis] {
                    max_i = i;
                }
            }
            if self.points[min_i][axis] == self.points[max_i][axis] {
                return Err(DegenerateInputError);
            }
            extremes[2 * axis] = min_i;
            extremes[2 * axis + 1] = max_i;
        }

        // P1, P2: most distant pair of extremes
        let (mut p1, mut p2) = (extremes[0], extremes[1]);
        let mut max_distance = f32::NEG_INFINITY;
        for i in 0..5 {
            for j in (i + 1)..6 {
                let d = (self.points[extremes[i]] - self.points[extremes[j]]).norm();
                if d > max_distance {
                    max_distance = d;
                    p1 = extremes[i];
                    p2 = extremes[j];
                }
            }
        }

        // P3: extreme farthest from the P1-P2 line
        let mut p3 = extremes[0];
        max_distance = f32::NEG_INFINITY;
        for &i in &extremes {
            let d = distance_from_line(self.points[p1], self.points[p2], self.points[i]);
            if d > max_distance {
                max_distance = d;
                p3 = i;
            }
        }
        if max_distance <= EPSILON {
            return Err(DegenerateInputError);
        }

        // P4: any point farthest from the P1-P2-P3 plane, either side
        let mut p4 = 0;
        let mut signed = 0.0f32;
        for (i, &p) in self.points.iter().enumerate() {
            let d = distance_from_plane(self.points[p1], self.points[p2], self.points[p3], p);
            if d.abs() > signed.abs() {
                signed = d;
                p4 = i;
            }
        }
        if signed.abs() <= EPSILON {
            return Err(DegenerateInputError);
        }

        self.vertices = vec![
            self.points[p1],
            self.points[p2],
            self.points[p3],
            self.points[p4],
        ];
        for i in [p1, p2, p3, p4] {
            self.claimed[i] = true;
        }

        // Winding fixed by which side of the base plane P4 landed on
        if signed > 0.0 {
            self.add_face(0, 2, 1);
            self.add_face(0, 1, 3);
            self.add_face(0, 3, 2);
            self.add_face(1, 2, 3);
        } else {
            self.add_face(0, 1, 2);
            self.add_face(0, 3, 1);
            self.add_face(0, 2, 3);
            self.add_face(1, 3, 2);
        }

        Ok(())
    }

    /// Assign every unclaimed point to the first face it lies beyond
    ///
    /// Points inside every face plane are interior and never looked at
    /// again.
    fn assign_initial_outside_sets(&mut self) {
        for i in 0..self.points.len() {
            if self.claimed[i] {
                continue;
            }
            let point = self.points[i];
            for f in 0..self.faces.len() {
                if self.face_distance(f, point) > EPSILON {
                    self.faces[f].outside.push(i);
                    break;
                }
            }
        }
    }

    /// Expand the hull until no face keeps outside points
    fn expand(&mut self) {
        while let Some(face_idx) = self
            .faces
            .iter()
            .position(|f| f.alive && !f.outside.is_empty())
        {
            // Eye: farthest outside point of that face (ties: first found)
            let mut eye = self.faces[face_idx].outside[0];
            let mut max_distance = f32::NEG_INFINITY;
            for k in 0..self.faces[face_idx].outside.len() {
                let candidate = self.faces[face_idx].outside[k];
                let d = self.face_distance(face_idx, self.points[candidate]);
                if d > max_distance {
                    max_distance = d;
                    eye = candidate;
                }
            }
            let eye_point = self.points[eye];
            self.claimed[eye] = true;

            // Faces the eye can see, same epsilon as the outside test
            let mut visible_mark = vec![false; self.faces.len()];
            let mut visible = Vec::new();
            for f in 0..self.faces.len() {
                if self.faces[f].alive && self.face_distance(f, eye_point) > EPSILON {
                    visible_mark[f] = true;
                    visible.push(f);
                }
            }

            // Horizon: directed edges between a visible and a hidden face,
            // taken in the visible face's winding
            let mut horizon = Vec::new();
            for &f in &visible {
                for k in 0..3 {
                    let edge = &self.edges[self.faces[f].edges[k]];
                    let neighbor = if edge.faces[0] == Some(f) {
                        edge.faces[1]
                    } else {
                        edge.faces[0]
                    };
                    let crosses = neighbor.map_or(true, |n| !visible_mark[n]);
                    if crosses {
                        horizon.push((
                            self.faces[f].verts[k],
                            self.faces[f].verts[(k + 1) % 3],
                        ));
                    }
                }
            }
            let horizon = order_horizon(horizon);

            // Orphan the visible faces' outside points, then delete the faces
            let mut orphans = Vec::new();
            for &f in &visible {
                let outside = std::mem::take(&mut self.faces[f].outside);
                orphans.extend(outside.into_iter().filter(|&p| p != eye));
            }
            for &f in &visible {
                self.remove_face(f);
            }

            // One new triangle per horizon edge, wound toward the eye
            let eye_vertex = self.vertices.len();
            self.vertices.push(eye_point);
            for &(a, b) in &horizon {
                self.add_face(a, b, eye_vertex);
            }

            // Redistribute orphans among the new and surviving faces
            for p in orphans {
                let point = self.points[p];
                for f in 0..self.faces.len() {
                    if self.faces[f].alive && self.face_distance(f, point) > EPSILON {
                        self.faces[f].outside.push(p);
                        break;
                    }
                }
            }

            debug_assert!(self.is_closed_manifold());
        }
    }

    /// Euler check over the live arena: V - E + F = 2 with every live edge
    /// shared by exactly two faces
    fn is_closed_manifold(&self) -> bool {
        let face_count = self.faces.iter().filter(|f| f.alive).count();
        let edge_count = self.edges.iter().filter(|e| e.alive).count();
        let mut used = std::collections::HashSet::new();
        for face in self.faces.iter().filter(|f| f.alive) {
            used.extend(face.verts);
        }
        let two_sided = self
            .edges
            .iter()
            .filter(|e| e.alive)
            .all(|e| e.faces.iter().all(Option::is_some));
        two_sided && used.len() + face_count == edge_count + 2
    }

    /// Compact surviving faces into the final mesh
    fn extract(self) -> ConvexMesh {
        let mut remap = vec![usize::MAX; self.vertices.len()];
        let mut positions = Vec::new();
        let mut faces = Vec::new();

        for face in self.faces.iter().filter(|f| f.alive) {
            let mut indices = [0usize; 3];
            for (k, &v) in face.verts.iter().enumerate() {
                if remap[v] == usize::MAX {
                    remap[v] = positions.len();
                    positions.push(self.vertices[v]);
                }
                indices[k] = remap[v];
            }
            let normal = face_normal(
                positions[indices[0]],
                positions[indices[1]],
                positions[indices[2]],
            );
            faces.push(MeshFace { indices, normal });
        }

        let sum = positions.iter().fold(Vec3::zeros(), |acc, p| acc + p);
        let centroid = sum / positions.len() as f32;

        ConvexMesh {
            positions,
            faces,
            centroid,
        }
    }
}

/// Chain directed horizon edges head-to-tail into a cycle
fn order_horizon(mut edges: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    if edges.is_empty() {
        return edges;
    }
    let mut ordered = Vec::with_capacity(edges.len());
    ordered.push(edges.swap_remove(0));
    while !edges.is_empty() {
        let head = ordered[ordered.len() - 1].1;
        match edges.iter().position(|e| e.0 == head) {
            Some(pos) => ordered.push(edges.swap_remove(pos)),
            None => {
                warn!("horizon did not close into a cycle; keeping remaining edges unordered");
                ordered.append(&mut edges);
            }
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_corners() -> Vec<Vec3> {
        let mut corners = Vec::new();
        for &x in &[-0.5f32, 0.5] {
            for &y in &[-0.5f32, 0.5] {
                for &z in &[-0.5f32, 0.5] {
                    corners.push(Vec3::new(x, y, z));
                }
            }
        }
        corners
    }

    fn assert_euler(mesh: &ConvexMesh) {
        let v = mesh.positions.len() as i64;
        let e = mesh.edge_count() as i64;
        let f = mesh.faces.len() as i64;
        assert_eq!(v - e + f, 2, "V={v} E={e} F={f}");
    }

    fn assert_contains_all(mesh: &ConvexMesh, points: &[Vec3]) {
        for point in points {
            for face in &mesh.faces {
                let [a, b, c] = mesh.face_positions(face);
                let d = distance_from_plane(a, b, c, *point);
                assert!(d <= EPSILON, "point {point:?} is {d} beyond a hull face");
            }
        }
    }

    #[test]
    fn tetrahedron_hull_is_the_tetrahedron() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let mesh = ConvexHull::build(&points).unwrap();

        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.faces.len(), 4);
        assert_euler(&mesh);
        assert_contains_all(&mesh, &points);
    }

    #[test]
    fn octahedron_hull_has_exact_counts() {
        let points = vec![
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
        ];
        let mesh = ConvexHull::build(&points).unwrap();

        assert_eq!(mesh.positions.len(), 6);
        assert_eq!(mesh.faces.len(), 8);
        assert_eq!(mesh.edge_count(), 12);
        assert_euler(&mesh);
        assert_contains_all(&mesh, &points);
    }

    #[test]
    fn cube_with_interior_points_keeps_euler_formula() {
        let mut points = cube_corners();
        points.push(Vec3::zeros());
        points.push(Vec3::new(0.1, 0.2, -0.1));
        points.push(Vec3::new(-0.3, 0.1, 0.3));

        let mesh = ConvexHull::build(&points).unwrap();

        assert_euler(&mesh);
        assert_contains_all(&mesh, &points);
        assert!(mesh.positions.len() >= 4);
        // Interior points never become hull vertices.
        assert!(mesh.positions.len() <= 8);
    }

    #[test]
    fn face_normals_point_away_from_centroid() {
        let mesh = ConvexHull::build(&cube_corners()).unwrap();
        for face in &mesh.faces {
            let [a, _, _] = mesh.face_positions(face);
            let outward = face.normal.dot(&(a - mesh.centroid));
            assert!(outward > 0.0, "normal points into the hull");
        }
    }

    #[test]
    fn coplanar_points_are_degenerate() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.25, 0.75, 0.0),
        ];
        assert!(ConvexHull::build(&points).is_err());
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let points: Vec<Vec3> = (0..6).map(|i| Vec3::new(i as f32, i as f32, i as f32)).collect();
        assert!(ConvexHull::build(&points).is_err());
    }

    #[test]
    fn too_few_points_are_degenerate() {
        let points = vec![Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        assert!(ConvexHull::build(&points).is_err());
    }

    #[test]
    fn centroid_is_mean_of_hull_vertices() {
        let mesh = ConvexHull::build(&cube_corners()).unwrap();
        assert!(mesh.centroid.norm() < 1e-5);
    }
}
