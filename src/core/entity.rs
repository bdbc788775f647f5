//! Card identities and the per-battle card store

use crate::BattleError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one object created during a battle
///
/// Ids are handed out densely from zero and never reused, so two copies of
/// the same card definition always keep distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    pub fn new(id: u32) -> Self {
        EntityId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one physical card copy
pub type CardId = EntityId;

/// Anything the store can hold
pub trait GameEntity {
    fn id(&self) -> EntityId;
    fn name(&self) -> &str;
}

/// Append-only arena of entities indexed by their id
///
/// Nothing is ever removed during a battle, so the id is the slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore<T> {
    entities: Vec<T>,
}

impl<T: GameEntity> EntityStore<T> {
    pub fn new() -> Self {
        EntityStore {
            entities: Vec::new(),
        }
    }

    /// Create an entity under the next free id
    pub fn register(&mut self, make: impl FnOnce(EntityId) -> T) -> EntityId {
        let id = EntityId::new(self.entities.len() as u32);
        let entity = make(id);
        debug_assert_eq!(entity.id(), id);
        self.entities.push(entity);
        id
    }

    pub fn get(&self, id: EntityId) -> Result<&T> {
        self.entities
            .get(id.index())
            .ok_or(BattleError::EntityNotFound(id.as_u32()))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        id.index() < self.entities.len()
    }

    /// Entities in id order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<T: GameEntity> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Token {
        id: EntityId,
        label: &'static str,
    }

    impl GameEntity for Token {
        fn id(&self) -> EntityId {
            self.id
        }

        fn name(&self) -> &str {
            self.label
        }
    }

    #[test]
    fn test_register_hands_out_dense_ids() {
        let mut store = EntityStore::new();
        let a = store.register(|id| Token { id, label: "Strike" });
        let b = store.register(|id| Token { id, label: "Strike" });

        assert_eq!(a.as_u32(), 0);
        assert_eq!(b.as_u32(), 1);
        assert_eq!(store.len(), 2);

        // Same name, distinct identities
        assert_eq!(store.get(a).unwrap().name(), store.get(b).unwrap().name());
        assert_ne!(store.get(a).unwrap().id(), store.get(b).unwrap().id());
    }

    #[test]
    fn test_unknown_id() {
        let mut store = EntityStore::new();
        store.register(|id| Token { id, label: "Guard" });
        assert!(store.contains(EntityId::new(0)));
        assert!(!store.contains(EntityId::new(1)));
        assert!(matches!(
            store.get(EntityId::new(7)),
            Err(BattleError::EntityNotFound(7))
        ));
        assert_eq!(EntityId::new(7).to_string(), "#7");
    }
}
