//! Axis-aligned bounding boxes

use crate::foundation::math::Vec3;

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if this AABB fully contains another AABB
    pub fn contains(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Shift the box by an offset
    pub fn translate(&mut self, offset: Vec3) {
        self.min += offset;
        self.max += offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_is_inclusive_at_touching_faces() {
        let a = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let c = Aabb::new(Vec3::new(1.1, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn containment_and_translation() {
        let outer = Aabb::from_center_extents(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let mut inner = Aabb::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));

        assert!(outer.contains(&inner));
        inner.translate(Vec3::new(5.0, 0.0, 0.0));
        assert!(!outer.contains(&inner));
        assert_eq!(inner.center(), Vec3::new(5.0, 0.0, 0.0));
    }
}
