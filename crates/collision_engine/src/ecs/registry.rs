//! Sparse-set component storage and the entity registry
//!
//! Each component type lives in its own [`ComponentStorage`]: a sparse array
//! mapping entity ids to a dense component array, so iteration touches only
//! entities that actually carry the component. The [`Registry`] owns one
//! storage per component type plus entity lifecycle (create/destroy with id
//! recycling); destroying an entity erases it from every storage.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::Entity;

/// Marker trait for components
pub trait Component: 'static {}

/// Dense storage for one component type, indexed sparsely by entity id
pub struct ComponentStorage<T: Component> {
    sparse: Vec<Option<usize>>,
    entities: Vec<Entity>,
    data: Vec<T>,
}

impl<T: Component> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self {
            sparse: Vec::new(),
            entities: Vec::new(),
            data: Vec::new(),
        }
    }
}

impl<T: Component> ComponentStorage<T> {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a component to an entity
    ///
    /// If the entity already has a component of this type, the existing one
    /// is kept untouched. Returns a reference to the stored component.
    pub fn insert(&mut self, entity: Entity, component: T) -> &mut T {
        let id = entity.id() as usize;
        if let Some(Some(dense)) = self.sparse.get(id).copied() {
            return &mut self.data[dense];
        }

        if self.sparse.len() <= id {
            self.sparse.resize(id + 1, None);
        }
        self.sparse[id] = Some(self.data.len());
        self.entities.push(entity);
        self.data.push(component);
        self.data.last_mut().expect("component just pushed")
    }

    /// Retrieve the component of an entity
    pub fn at(&self, entity: Entity) -> Option<&T> {
        let dense = (*self.sparse.get(entity.id() as usize)?)?;
        Some(&self.data[dense])
    }

    /// Retrieve the component of an entity mutably
    pub fn at_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let dense = (*self.sparse.get(entity.id() as usize)?)?;
        Some(&mut self.data[dense])
    }

    /// Check whether an entity carries this component
    pub fn contains(&self, entity: Entity) -> bool {
        matches!(self.sparse.get(entity.id() as usize), Some(Some(_)))
    }

    /// Remove the component of an entity, if present (swap-remove)
    pub fn erase(&mut self, entity: Entity) {
        let id = entity.id() as usize;
        let Some(Some(dense)) = self.sparse.get(id).copied() else {
            return;
        };

        let last = self.entities.len() - 1;
        self.entities.swap_remove(dense);
        self.data.swap_remove(dense);
        self.sparse[id] = None;
        if dense != last {
            self.sparse[self.entities[dense].id() as usize] = Some(dense);
        }
    }

    /// Entities carrying this component, in dense order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Iterate over (entity, component) pairs
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.data.iter())
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the storage is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Type-erased storage interface used by the registry for entity destruction
trait AnyStorage {
    fn erase_entity(&mut self, entity: Entity);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyStorage for ComponentStorage<T> {
    fn erase_entity(&mut self, entity: Entity) {
        self.erase(entity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Entity registry: typed component storages plus entity lifecycle
#[derive(Default)]
pub struct Registry {
    storages: HashMap<TypeId, Box<dyn AnyStorage>>,
    alive: Vec<bool>,
    free_ids: Vec<u32>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new entity, recycling a previously destroyed id if available
    pub fn create(&mut self) -> Entity {
        if let Some(id) = self.free_ids.pop() {
            self.alive[id as usize] = true;
            return Entity::new(id);
        }
        let id = u32::try_from(self.alive.len()).expect("entity id space exhausted");
        self.alive.push(true);
        Entity::new(id)
    }

    /// Destroy an entity, erasing all of its components
    pub fn destroy(&mut self, entity: Entity) {
        let id = entity.id() as usize;
        if !self.alive.get(id).copied().unwrap_or(false) {
            return;
        }
        for storage in self.storages.values_mut() {
            storage.erase_entity(entity);
        }
        self.alive[id] = false;
        self.free_ids.push(entity.id());
    }

    /// Whether an entity is currently alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.id() as usize).copied().unwrap_or(false)
    }

    /// Access the storage for a component type, if any component of that
    /// type has ever been inserted
    pub fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref::<ComponentStorage<T>>())
    }

    /// Access the storage for a component type mutably, creating it lazily
    pub fn storage_mut<T: Component>(&mut self) -> &mut ComponentStorage<T> {
        self.storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::<ComponentStorage<T>>::default())
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
            .expect("storage registered under mismatched TypeId")
    }

    /// Attach a component to an entity
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> &mut T {
        self.storage_mut::<T>().insert(entity, component)
    }

    /// Retrieve a component of an entity
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.at(entity)
    }

    /// Retrieve a component of an entity mutably
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.storage_mut::<T>().at_mut(entity)
    }

    /// Iterate entities carrying both component types
    ///
    /// Walks the dense storage of `A` and yields only entities that also
    /// carry a `B`. Empty when either storage does not exist yet.
    pub fn execute<A: Component, B: Component>(
        &self,
    ) -> impl Iterator<Item = (Entity, &A, &B)> + '_ {
        let b = self.storage::<B>();
        self.storage::<A>()
            .into_iter()
            .flat_map(|a| a.iter())
            .filter_map(move |(entity, component)| Some((entity, component, b?.at(entity)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Health(u32);
    impl Component for Health {}

    struct Tag;
    impl Component for Tag {}

    #[test]
    fn insert_at_erase_round_trip() {
        let mut registry = Registry::new();
        let a = registry.create();
        let b = registry.create();

        registry.insert(a, Health(10));
        registry.insert(b, Health(20));

        assert_eq!(registry.get::<Health>(a).map(|h| h.0), Some(10));
        assert_eq!(registry.get::<Health>(b).map(|h| h.0), Some(20));

        registry.storage_mut::<Health>().erase(a);
        assert!(registry.get::<Health>(a).is_none());
        // Swap-removal must not disturb the surviving entry.
        assert_eq!(registry.get::<Health>(b).map(|h| h.0), Some(20));
    }

    #[test]
    fn insert_keeps_existing_component() {
        let mut registry = Registry::new();
        let a = registry.create();

        registry.insert(a, Health(10));
        registry.insert(a, Health(99));
        assert_eq!(registry.get::<Health>(a).map(|h| h.0), Some(10));
    }

    #[test]
    fn destroy_erases_all_components_and_recycles_ids() {
        let mut registry = Registry::new();
        let a = registry.create();
        registry.insert(a, Health(10));
        registry.insert(a, Tag);

        registry.destroy(a);
        assert!(!registry.is_alive(a));
        assert!(registry.get::<Health>(a).is_none());
        assert!(registry.get::<Tag>(a).is_none());

        let b = registry.create();
        assert_eq!(b.id(), a.id());
        assert!(registry.get::<Health>(b).is_none());
    }

    #[test]
    fn execute_yields_only_entities_with_both_components() {
        let mut registry = Registry::new();
        let both = registry.create();
        let health_only = registry.create();
        let tag_only = registry.create();

        registry.insert(both, Health(1));
        registry.insert(both, Tag);
        registry.insert(health_only, Health(2));
        registry.insert(tag_only, Tag);

        let joined: Vec<(Entity, u32)> = registry
            .execute::<Health, Tag>()
            .map(|(e, h, _)| (e, h.0))
            .collect();
        assert_eq!(joined, vec![(both, 1)]);

        // Missing storage on either side yields nothing.
        struct Unused;
        impl Component for Unused {}
        assert_eq!(registry.execute::<Unused, Tag>().count(), 0);
        assert_eq!(registry.execute::<Health, Unused>().count(), 0);
    }

    #[test]
    fn storage_iterates_in_dense_order() {
        let mut registry = Registry::new();
        let entities: Vec<Entity> = (0..4).map(|_| registry.create()).collect();
        for (i, &e) in entities.iter().enumerate() {
            registry.insert(e, Health(i as u32));
        }

        let storage = registry.storage::<Health>().unwrap();
        let collected: Vec<u32> = storage.iter().map(|(_, h)| h.0).collect();
        assert_eq!(collected, vec![0, 1, 2, 3]);
        assert_eq!(storage.entities().len(), 4);
    }
}
