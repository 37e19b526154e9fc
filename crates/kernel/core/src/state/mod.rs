//! Authoritative world state ("truth").
//!
//! The kernel exclusively owns this store. The tick engine mutates it, the
//! snapshot and save encoders read it, and callers only ever see copies.
mod common;
mod entity;
mod weapon;

pub use common::{EntityId, Quat, Tick, Vec3, forward};
pub use entity::{Entity, EntityFlags, HP_NOT_APPLICABLE};
pub use weapon::{ReloadTick, WeaponState};

use crate::content::ContentSet;

/// Entities plus the single weapon record and the tick counter.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct WorldState {
    pub tick: Tick,
    /// Player first (if any), then targets in content order. Never shrinks
    /// while content is loaded.
    pub entities: Vec<Entity>,
    /// Present iff a player exists.
    pub weapon: Option<WeaponState>,
}

impl WorldState {
    /// Empty world used before content is loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Seeds the world from validated content at tick 0.
    pub fn from_content(content: &ContentSet) -> Self {
        let mut entities = Vec::with_capacity(content.targets.len() + 1);
        let mut weapon = None;

        if let Some(player) = &content.player {
            entities.push(Entity::player(
                player.id,
                player.archetype_id,
                player.position,
                player.yaw,
                player.pitch,
                player.hp,
            ));
            weapon = Some(WeaponState::new(player.id, &content.weapon));
        }

        entities.extend(content.targets.iter().map(|target| {
            Entity::target(
                target.id,
                target.archetype_id,
                target.position,
                target.orientation,
                target.hp,
                target.radius,
            )
        }));

        Self {
            tick: Tick::ZERO,
            entities,
            weapon,
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn player(&self) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.is_player())
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.is_player())
    }

    pub fn targets(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|entity| entity.is_target())
    }

    /// Weapon record owned by `actor`, if any.
    pub fn weapon_of(&self, actor: EntityId) -> Option<&WeaponState> {
        self.weapon.as_ref().filter(|weapon| weapon.owner == actor)
    }
}
