//! # Group Resolver — Memoized Entity-Group Membership
//!
//! Deciding which groups an entity belongs to walks every group's member
//! and exclusion lists. Damage events arrive in bursts and repeat the same
//! entities, so the resolver memoizes by entity id in a `DashMap`, safe
//! under concurrent decision calls.
//!
//! Membership is cached until told otherwise: group definitions only
//! change through administrative edits, which call [`GroupResolver::clear`]
//! (or [`GroupResolver::invalidate`] for a single despawned or mutated
//! entity).

use std::sync::Arc;

use dashmap::DashMap;

use pax_core::{EntityGroup, EntityId, EntitySnapshot};

/// Concurrent memo cache of entity-id to group-name membership.
#[derive(Debug, Default)]
pub struct GroupResolver {
    cache: DashMap<EntityId, Arc<Vec<String>>>,
}

impl GroupResolver {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Names of every group containing the entity, in group declaration
    /// order. Computed once per entity id and cached.
    pub fn resolve(&self, groups: &[EntityGroup], entity: &EntitySnapshot) -> Arc<Vec<String>> {
        if let Some(hit) = self.cache.get(&entity.id) {
            return Arc::clone(&hit);
        }
        let names: Vec<String> = groups
            .iter()
            .filter(|g| g.contains(entity))
            .map(|g| g.name.clone())
            .collect();
        let names = Arc::new(names);
        self.cache.insert(entity.id, Arc::clone(&names));
        names
    }

    /// Drops one entity's cached membership (despawn, prefab change).
    pub fn invalidate(&self, id: EntityId) {
        self.cache.remove(&id);
    }

    /// Drops everything. Called after group definitions change.
    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
