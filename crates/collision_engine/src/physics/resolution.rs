//! Impulse-based contact resolution
//!
//! The target hull owns the contact plane. A ray cast from the penetrating
//! vertex along the source body's velocity is walked back through the
//! target's faces to find the entry face; the intersection point becomes
//! the contact point and the distance walked the penetration depth. Both
//! bodies are separated along the entry face normal in proportion to their
//! inverse masses, then a single restitution impulse is applied at the
//! contact point to linear and angular velocity.

use log::trace;
use thiserror::Error;

use crate::ecs::{Entity, MeshCollider, PhysicsObject, Registry, Transform};
use crate::foundation::math::{
    face_normal, line_plane_intersection, point_in_triangle, Point3, Vec3,
};
use crate::physics::EPSILON;

use super::narrow_phase::ContactCandidate;

/// Why a contact candidate could not be resolved this tick
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The backward ray along the source velocity exits through no face
    /// of the target hull
    #[error("no entry face found for the contact ray")]
    NoIntersectionFound,

    /// Penetration exceeds the contact approach speed; resolving now would
    /// overshoot, so the contact is left for a later tick
    #[error("penetration {penetration} exceeds approach speed {approach_speed}")]
    Deferred {
        /// Distance walked back through the entry face
        penetration: f32,
        /// Magnitude of the relative velocity at the contact point
        approach_speed: f32,
    },

    /// One of the two bodies is missing a required component
    #[error("entity {0:?} is missing a transform, physics object or collider")]
    MissingComponent(Entity),
}

/// Resolve one contact candidate with positional correction and an impulse
///
/// # Errors
///
/// See [`ResolveError`]; on error the registry is left untouched.
pub fn resolve(
    candidate: &ContactCandidate,
    restitution: f32,
    registry: &mut Registry,
) -> Result<(), ResolveError> {
    let missing = |entity| ResolveError::MissingComponent(entity);

    let mesh = registry
        .get::<MeshCollider>(candidate.target)
        .map(|c| std::sync::Arc::clone(&c.mesh))
        .ok_or(missing(candidate.target))?;
    let mut source_transform = *registry
        .get::<Transform>(candidate.source)
        .ok_or(missing(candidate.source))?;
    let mut target_transform = *registry
        .get::<Transform>(candidate.target)
        .ok_or(missing(candidate.target))?;
    let source_body = *registry
        .get::<PhysicsObject>(candidate.source)
        .ok_or(missing(candidate.source))?;
    let target_body = *registry
        .get::<PhysicsObject>(candidate.target)
        .ok_or(missing(candidate.target))?;

    let matrix = target_transform.world_matrix();
    let world: Vec<Vec3> = mesh
        .positions
        .iter()
        .map(|p| matrix.transform_point(&Point3::from(*p)).coords)
        .collect();

    for face in &mesh.faces {
        let [i0, i1, i2] = face.indices;
        let (w0, w1, w2) = (world[i0], world[i1], world[i2]);
        let normal = face_normal(w0, w1, w2);

        let Some((point, penetration)) =
            line_plane_intersection(candidate.point, source_transform.velocity, w0, normal)
        else {
            continue;
        };
        if penetration <= 0.0 || !point_in_triangle(point, w0, w1, w2, EPSILON) {
            continue;
        }

        let inv_mass_source = 1.0 / source_body.mass;
        let inv_mass_target = 1.0 / target_body.mass;
        let total_inv_mass = inv_mass_source + inv_mass_target;

        let inertia_source = source_body.world_inverse_inertia(&source_transform.orientation());
        let inertia_target = target_body.world_inverse_inertia(&target_transform.orientation());

        let r_source = point - source_transform.position;
        let r_target = point - target_transform.position;

        let full_velocity_source =
            source_transform.velocity + source_transform.angular_velocity.cross(&r_source);
        let full_velocity_target =
            target_transform.velocity + target_transform.angular_velocity.cross(&r_target);
        let contact_velocity = full_velocity_target - full_velocity_source;

        let approach_speed = contact_velocity.norm();
        if penetration > approach_speed {
            return Err(ResolveError::Deferred {
                penetration,
                approach_speed,
            });
        }

        // Separate along the entry normal, split by inverse mass
        source_transform.position += normal * penetration * (inv_mass_source / total_inv_mass);
        target_transform.position -= normal * penetration * (inv_mass_target / total_inv_mass);

        let angular_source = (inertia_source * r_source.cross(&normal))
            .cross(&r_source)
            .dot(&normal);
        let angular_target = (inertia_target * r_target.cross(&normal))
            .cross(&r_target)
            .dot(&normal);

        let j = -(1.0 + restitution) * contact_velocity.dot(&normal)
            / (total_inv_mass + angular_source + angular_target);
        let impulse = normal * j;

        source_transform.velocity -= impulse * inv_mass_source;
        target_transform.velocity += impulse * inv_mass_target;
        source_transform.angular_velocity += inertia_source * r_source.cross(&(-impulse));
        target_transform.angular_velocity += inertia_target * r_target.cross(&impulse);

        if let Some(transform) = registry.get_mut::<Transform>(candidate.source) {
            *transform = source_transform;
        }
        if let Some(transform) = registry.get_mut::<Transform>(candidate.target) {
            *transform = target_transform;
        }
        trace!(
            "contact at {point:?}: penetration {penetration}, impulse magnitude {}",
            j.abs()
        );
        return Ok(());
    }

    Err(ResolveError::NoIntersectionFound)
}
