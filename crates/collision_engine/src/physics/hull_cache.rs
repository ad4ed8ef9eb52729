//! Source meshes and the shared hull cache
//!
//! Source point clouds live in a [`MeshStore`] keyed by slotmap keys. The
//! [`HullCache`] memoizes one convex hull per source mesh so every collider
//! spawned from the same mesh shares a single [`ConvexMesh`] allocation.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use slotmap::{new_key_type, SlotMap};

use crate::ecs::{ColliderKind, Entity, MeshCollider, Registry};
use crate::foundation::math::Vec3;

use super::hull::{ConvexHull, ConvexMesh, DegenerateInputError};

new_key_type! {
    /// Handle to a source mesh in a [`MeshStore`]
    pub struct MeshKey;
}

/// Source point cloud a hull can be built from
#[derive(Debug, Clone)]
pub struct MeshData {
    /// Vertex positions in mesh space
    pub positions: Vec<Vec3>,
}

/// Storage for source meshes
#[derive(Default)]
pub struct MeshStore {
    meshes: SlotMap<MeshKey, MeshData>,
}

impl MeshStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a point cloud and return its key
    pub fn insert(&mut self, positions: Vec<Vec3>) -> MeshKey {
        self.meshes.insert(MeshData { positions })
    }

    /// Look up a source mesh
    pub fn get(&self, key: MeshKey) -> Option<&MeshData> {
        self.meshes.get(key)
    }

    /// Number of registered meshes
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

/// Memoized convex hulls, one per source mesh
#[derive(Default)]
pub struct HullCache {
    hulls: HashMap<MeshKey, Arc<ConvexMesh>>,
}

impl HullCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the hull for a source mesh, building it on first request
    ///
    /// # Errors
    ///
    /// [`DegenerateInputError`] when the key is stale or the point cloud
    /// does not span three dimensions.
    pub fn get_or_build(
        &mut self,
        store: &MeshStore,
        key: MeshKey,
    ) -> Result<Arc<ConvexMesh>, DegenerateInputError> {
        if let Some(hull) = self.hulls.get(&key) {
            return Ok(Arc::clone(hull));
        }
        let data = store.get(key).ok_or(DegenerateInputError)?;
        let hull = Arc::new(ConvexHull::build(&data.positions)?);
        debug!(
            "cached hull for mesh {key:?}: {} vertices, {} faces",
            hull.positions.len(),
            hull.faces.len()
        );
        self.hulls.insert(key, Arc::clone(&hull));
        Ok(hull)
    }

    /// Attach a [`MeshCollider`] sharing the cached hull to an entity
    ///
    /// # Errors
    ///
    /// [`DegenerateInputError`] when hull construction fails; the entity is
    /// left without a collider in that case.
    pub fn attach_mesh_collider(
        &mut self,
        registry: &mut Registry,
        store: &MeshStore,
        entity: Entity,
        key: MeshKey,
        kind: ColliderKind,
    ) -> Result<(), DegenerateInputError> {
        let mesh = self.get_or_build(store, key)?;
        registry.insert(entity, MeshCollider { kind, mesh });
        Ok(())
    }

    /// Number of cached hulls
    pub fn len(&self) -> usize {
        self.hulls.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.hulls.is_empty()
    }
}
