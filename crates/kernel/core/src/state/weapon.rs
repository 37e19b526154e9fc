use crate::content::WeaponDef;

use super::common::EntityId;

/// Runtime record of the player's active weapon (slot 0 in v1).
///
/// `reloading` is never stored: it is always derived from
/// `reload_ticks_remaining > 0`, so the two cannot disagree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeaponState {
    pub owner: EntityId,
    pub slot: u32,
    pub weapon_id: u32,
    pub ammo_in_mag: i32,
    pub ammo_reserve: i32,
    pub reload_ticks_remaining: u32,
}

/// Outcome of advancing the reload timer by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadTick {
    /// No reload in progress.
    Idle,
    /// Countdown moved but has not finished.
    Counting,
    /// Countdown reached zero; `transferred` rounds moved into the magazine.
    Completed { transferred: i32 },
}

impl WeaponState {
    /// Fresh weapon with a full magazine.
    pub fn new(owner: EntityId, def: &WeaponDef) -> Self {
        Self {
            owner,
            slot: 0,
            weapon_id: def.weapon_id,
            ammo_in_mag: def.magazine_size,
            ammo_reserve: def.starting_reserve,
            reload_ticks_remaining: 0,
        }
    }

    #[inline]
    pub fn is_reloading(&self) -> bool {
        self.reload_ticks_remaining > 0
    }

    /// Rounds needed to fill the magazine.
    #[inline]
    pub fn rounds_needed(&self, def: &WeaponDef) -> i32 {
        (def.magazine_size - self.ammo_in_mag).max(0)
    }

    /// Whether a reload request would start a reload right now.
    pub fn can_start_reload(&self, def: &WeaponDef) -> bool {
        !self.is_reloading() && self.rounds_needed(def) > 0 && self.ammo_reserve > 0
    }

    /// Starts the reload countdown using the authored duration.
    pub fn start_reload(&mut self, def: &WeaponDef) {
        debug_assert!(self.can_start_reload(def));
        self.reload_ticks_remaining = def.reload_ticks;
    }

    /// Removes one round from the magazine.
    pub fn consume_round(&mut self) {
        debug_assert!(self.ammo_in_mag > 0);
        self.ammo_in_mag -= 1;
    }

    /// Advances the reload countdown; on completion transfers
    /// `min(needed, reserve)` rounds from reserve into the magazine.
    pub fn advance_reload(&mut self, def: &WeaponDef) -> ReloadTick {
        if !self.is_reloading() {
            return ReloadTick::Idle;
        }
        self.reload_ticks_remaining -= 1;
        if self.is_reloading() {
            return ReloadTick::Counting;
        }
        let transferred = self.rounds_needed(def).min(self.ammo_reserve);
        self.ammo_in_mag += transferred;
        self.ammo_reserve -= transferred;
        ReloadTick::Completed { transferred }
    }

    /// Presentation-only reload progress in `[0, 1]`, 1.0 when idle.
    pub fn reload_progress(&self, def: &WeaponDef) -> f32 {
        if !self.is_reloading() || def.reload_ticks == 0 {
            return 1.0;
        }
        let done = def.reload_ticks.saturating_sub(self.reload_ticks_remaining);
        done as f32 / def.reload_ticks as f32
    }
}
