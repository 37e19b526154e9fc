use bitflags::bitflags;

use super::common::{EntityId, Quat, Vec3};

bitflags! {
    /// Per-entity state bits exported verbatim in snapshots.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EntityFlags: u32 {
        const PLAYER    = 1 << 0;
        const TARGET    = 1 << 1;
        const DEAD      = 1 << 2;
        const SPRINTING = 1 << 3;
        const CROUCHED  = 1 << 4;
    }
}

impl EntityFlags {
    /// Bits that carry player movement stance and are persisted in saves.
    pub const STANCE: Self = Self::SPRINTING.union(Self::CROUCHED);
}

/// Marker value for entities whose hit points are not applicable.
pub const HP_NOT_APPLICABLE: i32 = -1;

/// World-visible object owned by the kernel.
///
/// Entities are never removed from the world; destruction only sets
/// [`EntityFlags::DEAD`].
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    /// Content archetype, 0 if none.
    pub archetype_id: u32,
    pub position: Vec3,
    /// Derived from `yaw`/`pitch` for look-capable actors.
    pub orientation: Quat,
    pub hp: i32,
    pub flags: EntityFlags,
    /// Look yaw in radians, wrapped to (-pi, pi].
    pub yaw: f32,
    /// Look pitch in radians, clamped to the configured limit.
    pub pitch: f32,
    /// Hit sphere radius; 0 for entities that cannot be shot.
    pub radius: f32,
}

impl Entity {
    pub fn player(
        id: EntityId,
        archetype_id: u32,
        position: Vec3,
        yaw: f32,
        pitch: f32,
        hp: i32,
    ) -> Self {
        Self {
            id,
            archetype_id,
            position,
            orientation: Quat::from_yaw_pitch(yaw, pitch),
            hp,
            flags: EntityFlags::PLAYER,
            yaw,
            pitch,
            radius: 0.0,
        }
    }

    pub fn target(
        id: EntityId,
        archetype_id: u32,
        position: Vec3,
        orientation: Quat,
        hp: i32,
        radius: f32,
    ) -> Self {
        Self {
            id,
            archetype_id,
            position,
            orientation,
            hp,
            flags: EntityFlags::TARGET,
            yaw: 0.0,
            pitch: 0.0,
            radius,
        }
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        self.flags.contains(EntityFlags::PLAYER)
    }

    #[inline]
    pub fn is_target(&self) -> bool {
        self.flags.contains(EntityFlags::TARGET)
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.flags.contains(EntityFlags::DEAD)
    }

    /// Living target that can intercept a shot.
    #[inline]
    pub fn is_live_target(&self) -> bool {
        self.is_target() && !self.is_dead()
    }

    /// Applies flat damage and returns `true` if this call destroyed the entity.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.hp == HP_NOT_APPLICABLE || self.is_dead() {
            return false;
        }
        self.hp = self.hp.saturating_sub(amount);
        if self.hp <= 0 {
            self.flags.insert(EntityFlags::DEAD);
            true
        } else {
            false
        }
    }
}
