//! Entity-Component registry
//!
//! A minimal sparse-set entity registry: the access contract the collision
//! core consumes. Typed component storages support `insert`, `at`, `erase`
//! and iteration by entity; the registry owns entity lifecycle with id
//! recycling.

pub mod components;
pub mod entity;
pub mod registry;

pub use components::{AabbCollider, ColliderKind, MeshCollider, PhysicsObject, Transform};
pub use entity::Entity;
pub use registry::{Component, ComponentStorage, Registry};
