//! Components consumed and mutated by the collision systems

use std::sync::Arc;

use crate::foundation::math::{Mat3, Mat4, Mat4Ext, Rotation3, Vec3};
use crate::physics::hull::ConvexMesh;
use crate::spatial::Aabb;

use super::registry::Component;

/// Rigid transform state, mutated in place each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,

    /// Linear velocity
    pub velocity: Vec3,

    /// Euler rotation (radians, applied X then Y then Z)
    pub rotation: Vec3,

    /// Angular velocity
    pub angular_velocity: Vec3,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            velocity: Vec3::zeros(),
            rotation: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// World matrix: translate, then the three axis rotations, then scale
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_z(self.rotation.z)
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Current orientation as a rotation matrix
    pub fn orientation(&self) -> Mat3 {
        let rotation = Rotation3::from_axis_angle(&Vec3::x_axis(), self.rotation.x)
            * Rotation3::from_axis_angle(&Vec3::y_axis(), self.rotation.y)
            * Rotation3::from_axis_angle(&Vec3::z_axis(), self.rotation.z);
        *rotation.matrix()
    }
}

/// Mass properties read by the contact resolver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsObject {
    /// Body mass
    pub mass: f32,

    /// Body-space inverse inertia tensor
    pub inverse_inertia: Mat3,
}

impl PhysicsObject {
    /// Create mass properties with the given inverse inertia tensor
    pub fn new(mass: f32, inverse_inertia: Mat3) -> Self {
        Self {
            mass,
            inverse_inertia,
        }
    }

    /// Inverse inertia tensor of a solid cuboid with the given side lengths
    pub fn cuboid_inverse_inertia(x: f32, y: f32, z: f32, mass: f32) -> Mat3 {
        Mat3::from_diagonal(&Vec3::new(
            (12.0 / mass) / (z * z + y * y),
            (12.0 / mass) / (x * x + z * z),
            (12.0 / mass) / (x * x + y * y),
        ))
    }

    /// Inverse inertia tensor rotated into world space for an orientation
    pub fn world_inverse_inertia(&self, orientation: &Mat3) -> Mat3 {
        orientation * self.inverse_inertia * orientation.transpose()
    }
}

/// Role a collider plays in the destructive broad phase
///
/// The mesh narrow phase ignores the tag; the AABB broad phase switches
/// on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderKind {
    /// Destroys whatever it overlaps in the AABB broad phase
    Projectile,
    /// Target that moves with its entity's velocity
    MovingTarget,
    /// Stationary target
    Target,
}

/// Convex-mesh collider for the narrow phase
#[derive(Debug, Clone)]
pub struct MeshCollider {
    /// Collider role tag
    pub kind: ColliderKind,

    /// Shared convex hull of the source mesh
    pub mesh: Arc<ConvexMesh>,
}

/// Axis-aligned box collider for the destructive broad phase
#[derive(Debug, Clone, Copy)]
pub struct AabbCollider {
    /// Collider role tag
    pub kind: ColliderKind,

    /// Current world-space bounds, advanced by velocity each tick
    pub aabb: Aabb,
}

impl Component for Transform {}
impl Component for PhysicsObject {}
impl Component for MeshCollider {}
impl Component for AabbCollider {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn world_matrix_applies_scale_before_translation() {
        let transform = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            scale: Vec3::new(2.0, 2.0, 2.0),
            ..Default::default()
        };

        let m = transform.world_matrix();
        let p = m.transform_point(&crate::foundation::math::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 3.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn orientation_is_identity_for_zero_rotation() {
        let transform = Transform::default();
        assert_relative_eq!(transform.orientation(), Mat3::identity(), epsilon = 1e-6);
    }

    #[test]
    fn cuboid_inverse_inertia_has_expected_diagonal() {
        let tensor = PhysicsObject::cuboid_inverse_inertia(2.0, 4.0, 2.0, 10.0);
        assert_relative_eq!(tensor[(0, 0)], 1.2 / (4.0 + 16.0), epsilon = 1e-6);
        assert_relative_eq!(tensor[(1, 1)], 1.2 / (4.0 + 4.0), epsilon = 1e-6);
        assert_relative_eq!(tensor[(2, 2)], 1.2 / (4.0 + 16.0), epsilon = 1e-6);
    }

    #[test]
    fn world_inverse_inertia_is_similarity_transform() {
        let object = PhysicsObject::new(10.0, PhysicsObject::cuboid_inverse_inertia(2.0, 4.0, 2.0, 10.0));
        let transform = Transform {
            rotation: Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2),
            ..Default::default()
        };
        let world = object.world_inverse_inertia(&transform.orientation());

        // Rotating a quarter turn about Z swaps the X and Y principal axes.
        assert_relative_eq!(world[(0, 0)], object.inverse_inertia[(1, 1)], epsilon = 1e-5);
        assert_relative_eq!(world[(1, 1)], object.inverse_inertia[(0, 0)], epsilon = 1e-5);
    }
}
