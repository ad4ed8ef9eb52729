//! Math utilities and types
//!
//! Provides fundamental math types for 3D collision geometry, plus the
//! plane/line/triangle predicates shared by hull construction and contact
//! resolution.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Rotation3, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }
}

/// Unit normal of the triangle (a, b, c), sign given by the winding order
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(&(c - a)).normalize()
}

/// Signed distance from point `x` to the plane of the triangle (a, b, c)
///
/// Positive on the side the winding normal points toward.
pub fn distance_from_plane(a: Vec3, b: Vec3, c: Vec3, x: Vec3) -> f32 {
    face_normal(a, b, c).dot(&(x - a))
}

/// Distance from point `x` to the infinite line through `a` and `b`
pub fn distance_from_line(a: Vec3, b: Vec3, x: Vec3) -> f32 {
    (b - a).cross(&(a - x)).norm() / (b - a).norm()
}

/// Intersect the line through `origin` along `direction` with a plane
///
/// Returns the intersection point and the distance travelled along the
/// (unnormalized) direction, or `None` when line and plane are parallel.
/// The point is reached by marching *against* the direction, which is the
/// convention the contact resolver relies on: a ray cast from a penetrating
/// vertex along the body's velocity walks back out through the face it
/// entered.
pub fn line_plane_intersection(
    origin: Vec3,
    direction: Vec3,
    plane_origin: Vec3,
    plane_normal: Vec3,
) -> Option<(Vec3, f32)> {
    let offset = (origin - plane_origin).dot(&plane_normal);
    let slope = direction.dot(&plane_normal);
    if slope.abs() < 1e-5 {
        return None;
    }
    let t = offset / slope;
    Some((origin - direction * t, t * direction.norm()))
}

/// Test whether point `p` (assumed on the triangle plane) lies inside the
/// triangle (a, b, c)
///
/// Compares the summed areas of the three sub-triangles against the full
/// triangle area; within `epsilon` counts as inside.
pub fn point_in_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3, epsilon: f32) -> bool {
    let area = (a - b).cross(&(a - c)).norm();
    let u = (p - a).cross(&(p - b)).norm();
    let v = (p - b).cross(&(p - c)).norm();
    let w = (p - c).cross(&(p - a)).norm();
    (u + v + w - area).abs() < epsilon
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn plane_distance_sign_follows_winding() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 1.0, 0.0);

        assert_relative_eq!(distance_from_plane(a, b, c, Vec3::new(0.2, 0.2, 3.0)), 3.0);
        assert_relative_eq!(distance_from_plane(a, b, c, Vec3::new(0.2, 0.2, -2.0)), -2.0);
    }

    #[test]
    fn line_distance_is_perpendicular() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10.0, 0.0, 0.0);
        assert_relative_eq!(distance_from_line(a, b, Vec3::new(5.0, 4.0, 0.0)), 4.0);
    }

    #[test]
    fn line_plane_intersection_walks_back_along_direction() {
        // Vertex at x = 0.3 entered through the plane x = 0.5 travelling -x.
        let (point, distance) = line_plane_intersection(
            Vec3::new(0.3, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(point.x, 0.5);
        assert_relative_eq!(distance, 0.2);
    }

    #[test]
    fn line_parallel_to_plane_has_no_intersection() {
        let hit = line_plane_intersection(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::zeros(),
            Vec3::new(0.0, 0.0, 1.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn point_in_triangle_accepts_interior_and_rejects_exterior() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(2.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 2.0, 0.0);

        assert!(point_in_triangle(Vec3::new(0.5, 0.5, 0.0), a, b, c, 1e-4));
        assert!(point_in_triangle(b, a, b, c, 1e-4)); // corner counts
        assert!(!point_in_triangle(Vec3::new(2.0, 2.0, 0.0), a, b, c, 1e-4));
    }
}
