//! Octree spatial partitioning structure
//!
//! Divides 3D space into hierarchical regions for fast box-overlap queries.
//! Each node subdivides into 8 octants when entry density exceeds a
//! threshold; a box that straddles an octant boundary stays at the branch
//! node that still fully contains it.

use serde::{Deserialize, Serialize};

use crate::ecs::Entity;
use crate::foundation::math::Vec3;
use crate::spatial::Aabb;

/// Configuration for octree behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OctreeConfig {
    /// Maximum entries per node before subdivision
    pub max_entries_per_node: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Minimum node size (prevents excessive subdivision)
    pub min_node_size: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_entries_per_node: 8,
            max_depth: 8,
            min_node_size: 1.0,
        }
    }
}

/// Box stored in the octree with its owning entity
#[derive(Debug, Clone, Copy)]
pub struct OctreeEntry {
    /// Owning entity
    pub entity: Entity,
    /// World-space bounds of the entry
    pub aabb: Aabb,
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// World-space bounds of this node
    pub bounds: Aabb,

    /// Entries stored at this node (straddlers stay here even on branches)
    pub entries: Vec<OctreeEntry>,

    /// Child nodes (8 octants), None if this is a leaf
    pub children: Option<Box<[OctreeNode; 8]>>,

    /// Depth in the tree (0 = root)
    pub depth: u32,
}

impl OctreeNode {
    /// Create a new leaf node
    pub fn new(bounds: Aabb, depth: u32) -> Self {
        Self {
            bounds,
            entries: Vec::new(),
            children: None,
            depth,
        }
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Subdivide this node into 8 children
    fn subdivide(&mut self) {
        if self.children.is_some() {
            return; // Already subdivided
        }

        let center = self.bounds.center();
        let quarter_extents = self.bounds.extents() * 0.5;

        let mut children = Vec::with_capacity(8);
        for octant in 0..8 {
            let x_sign = if octant & 1 != 0 { 1.0 } else { -1.0 };
            let y_sign = if octant & 2 != 0 { 1.0 } else { -1.0 };
            let z_sign = if octant & 4 != 0 { 1.0 } else { -1.0 };

            let child_center = Vec3::new(
                center.x + quarter_extents.x * x_sign,
                center.y + quarter_extents.y * y_sign,
                center.z + quarter_extents.z * z_sign,
            );
            let child_bounds = Aabb::from_center_extents(child_center, quarter_extents);
            children.push(OctreeNode::new(child_bounds, self.depth + 1));
        }

        self.children = Some(Box::new([
            children[0].clone(),
            children[1].clone(),
            children[2].clone(),
            children[3].clone(),
            children[4].clone(),
            children[5].clone(),
            children[6].clone(),
            children[7].clone(),
        ]));

        // Redistribute entries that fit entirely inside one child
        let entries = std::mem::take(&mut self.entries);
        if let Some(ref mut children) = self.children {
            for entry in entries {
                let mut placed = false;
                for child in children.iter_mut() {
                    if child.bounds.contains(&entry.aabb) {
                        child.entries.push(entry);
                        placed = true;
                        break;
                    }
                }
                if !placed {
                    self.entries.push(entry);
                }
            }
        }
    }

    /// Insert an entry into this node
    pub fn insert(&mut self, entry: OctreeEntry, config: &OctreeConfig) -> bool {
        if !self.bounds.intersects(&entry.aabb) {
            return false;
        }

        if self.is_leaf() {
            let should_subdivide = self.entries.len() >= config.max_entries_per_node
                && self.depth < config.max_depth
                && self.bounds.extents().x > config.min_node_size;

            if !should_subdivide {
                self.entries.push(entry);
                return true;
            }
            self.subdivide();
        }

        // Branch node: push down into the child that fully contains the box
        if let Some(ref mut children) = self.children {
            for child in children.iter_mut() {
                if child.bounds.contains(&entry.aabb) {
                    return child.insert(entry, config);
                }
            }
        }

        // Straddles a boundary, keep it here
        self.entries.push(entry);
        true
    }

    /// Remove an entry by entity, searching nodes its box overlaps
    pub fn remove(&mut self, aabb: &Aabb, entity: Entity) -> bool {
        if !self.bounds.intersects(aabb) {
            return false;
        }

        if let Some(index) = self.entries.iter().position(|e| e.entity == entity) {
            self.entries.swap_remove(index);
            return true;
        }

        if let Some(ref mut children) = self.children {
            for child in children.iter_mut() {
                if child.remove(aabb, entity) {
                    return true;
                }
            }
        }

        false
    }

    /// Collect all entries whose boxes overlap the query box
    pub fn query_aabb(&self, aabb: &Aabb, results: &mut Vec<OctreeEntry>) {
        if !self.bounds.intersects(aabb) {
            return;
        }

        for entry in &self.entries {
            if entry.aabb.intersects(aabb) {
                results.push(*entry);
            }
        }

        if let Some(ref children) = self.children {
            for child in children.iter() {
                child.query_aabb(aabb, results);
            }
        }
    }

    /// Count total entries in this node and all children
    pub fn count_entries(&self) -> usize {
        let mut count = self.entries.len();
        if let Some(ref children) = self.children {
            for child in children.iter() {
                count += child.count_entries();
            }
        }
        count
    }
}

/// Octree spatial partitioning structure over axis-aligned boxes
#[derive(Debug, Clone)]
pub struct Octree {
    /// Root node containing the entire world space
    pub root: OctreeNode,

    /// Configuration
    config: OctreeConfig,
}

impl Octree {
    /// Create a new octree with given world bounds
    pub fn new(world_bounds: Aabb, config: OctreeConfig) -> Self {
        Self {
            root: OctreeNode::new(world_bounds, 0),
            config,
        }
    }

    /// Insert an entity's bounding box into the octree
    pub fn insert(&mut self, aabb: Aabb, entity: Entity) -> bool {
        self.root.insert(OctreeEntry { entity, aabb }, &self.config)
    }

    /// Remove an entity's bounding box from the octree
    pub fn remove(&mut self, aabb: &Aabb, entity: Entity) -> bool {
        self.root.remove(aabb, entity)
    }

    /// Query all entries whose boxes overlap the given box
    pub fn query_aabb(&self, aabb: &Aabb) -> Vec<OctreeEntry> {
        let mut results = Vec::new();
        self.root.query_aabb(aabb, &mut results);
        results
    }

    /// Get total entry count
    pub fn entry_count(&self) -> usize {
        self.root.count_entries()
    }
}
