use std::collections::BTreeSet;

use crate::abi::wire::{ByteReader, checked_span};
use crate::config::KernelConfig;
use crate::content::ContentSet;
use crate::error::{KernelError, Result};
use crate::state::{EntityFlags, EntityId, Quat, Tick, Vec3, WorldState};

use super::{
    SAVE_HEADER_SIZE, SAVE_MAGIC, SAVE_MAJOR, TARGET_RECORD_SIZE, WORLD_CHUNK_V1_0_SIZE,
    WORLD_CHUNK_V1_1_SIZE, checksum,
};

const WHAT: &str = "save";

/// Player fields restored from a save.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PlayerImage {
    pub id: EntityId,
    pub flags: EntityFlags,
    pub hp: i32,
    pub position: Vec3,
    pub orientation: Quat,
    pub yaw: f32,
    pub pitch: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TargetImage {
    pub id: EntityId,
    pub destroyed: bool,
    pub hp: i32,
    pub position: Vec3,
    pub orientation: Quat,
}

/// Fully decoded and structurally valid save, not yet applied.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SaveImage {
    pub minor: u16,
    pub tick: Tick,
    pub player: Option<PlayerImage>,
    pub weapon_id: u32,
    pub weapon_slot: u32,
    pub ammo_in_mag: i32,
    pub ammo_reserve: i32,
    pub reload_ticks_remaining: u32,
    pub targets: Vec<TargetImage>,
}

impl SaveImage {
    /// Validates framing, checksum and field ranges, in that order, and
    /// decodes the blob. Minor 0 blobs are migrated on the way in.
    pub(crate) fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < SAVE_HEADER_SIZE as usize {
            return Err(KernelError::parse(
                WHAT,
                format!("{} bytes is shorter than the header", bytes.len()),
            ));
        }

        let mut header = ByteReader::at(bytes, 0, WHAT);
        let magic = header.u32()?;
        if magic != SAVE_MAGIC {
            return Err(KernelError::parse(WHAT, format!("bad magic {magic:#010x}")));
        }
        let major = header.u16()?;
        if major != SAVE_MAJOR {
            return Err(KernelError::UnsupportedSaveVersion {
                found: major,
                supported: SAVE_MAJOR,
            });
        }
        let minor = header.u16()?;
        let total_size = header.u32()?;
        if total_size as usize != bytes.len() {
            return Err(KernelError::parse(
                WHAT,
                format!(
                    "declared size {total_size} does not match buffer of {}",
                    bytes.len()
                ),
            ));
        }
        let header_size = header.u32()?;
        let world_offset = header.u32()?;
        let world_size = header.u32()?;
        let stored = header.u32()?;
        let computed = checksum(bytes);
        if stored != computed {
            return Err(KernelError::ChecksumMismatch { stored, computed });
        }

        if header_size < SAVE_HEADER_SIZE || world_offset < header_size {
            return Err(KernelError::parse(WHAT, "world chunk overlaps the header"));
        }
        checked_span(world_offset, 1, world_size, bytes.len())
            .ok_or_else(|| KernelError::parse(WHAT, "world chunk out of bounds"))?;
        let required_world = if minor == 0 {
            WORLD_CHUNK_V1_0_SIZE
        } else {
            WORLD_CHUNK_V1_1_SIZE
        };
        if world_size < required_world {
            return Err(KernelError::parse(
                WHAT,
                format!("minor {minor} world chunk needs {required_world} bytes, has {world_size}"),
            ));
        }

        let mut r = ByteReader::at(bytes, world_offset as usize, WHAT);
        let tick = Tick(r.u64()?);
        let player_id = r.u32()?;
        let weapon_id = r.u32()?;
        let weapon_slot = r.u32()?;
        let player_flags = EntityFlags::from_bits_retain(r.u32()?);
        let player_hp = r.i32()?;
        let position = Vec3::from_array(r.f32x3()?);
        let orientation = Quat::from_array(r.f32x4()?);
        let ammo_in_mag = r.i32()?;
        let ammo_reserve = r.i32()?;
        let reload_ticks_remaining = r.u32()?;
        let target_count = r.u32()?;
        let target_offset = r.u32()?;
        let look = if minor == 0 {
            None
        } else {
            Some((r.f32()?, r.f32()?))
        };

        checked_span(target_offset, target_count, TARGET_RECORD_SIZE, bytes.len())
            .ok_or_else(|| KernelError::parse(WHAT, "target array out of bounds"))?;
        if u64::from(target_offset) < u64::from(world_offset) + u64::from(world_size) {
            return Err(KernelError::parse(
                WHAT,
                "target array overlaps the header or world chunk",
            ));
        }

        if ammo_in_mag < 0 || ammo_reserve < 0 {
            return Err(KernelError::parse(WHAT, "negative ammunition"));
        }
        if weapon_slot >= KernelConfig::WEAPON_SLOT_COUNT {
            return Err(KernelError::parse(
                WHAT,
                format!("weapon slot {weapon_slot} out of range"),
            ));
        }

        let player = if player_id == KernelConfig::NO_ENTITY {
            None
        } else {
            if !position.is_finite() || !orientation.is_finite() {
                return Err(KernelError::parse(WHAT, "non-finite player transform"));
            }
            let (yaw, pitch) = match look {
                Some(angles) => angles,
                None => {
                    tracing::debug!("migrating minor 0 save: deriving look angles");
                    orientation.to_yaw_pitch()
                }
            };
            if !yaw.is_finite() || !pitch.is_finite() {
                return Err(KernelError::parse(WHAT, "non-finite look angles"));
            }
            Some(PlayerImage {
                id: EntityId(player_id),
                flags: player_flags,
                hp: player_hp,
                position,
                orientation,
                yaw,
                pitch,
            })
        };

        let mut seen = BTreeSet::new();
        let mut targets = Vec::with_capacity(target_count as usize);
        for index in 0..target_count as usize {
            let offset = target_offset as usize + index * TARGET_RECORD_SIZE as usize;
            let target = read_target(&mut ByteReader::at(bytes, offset, WHAT))?;
            if !seen.insert(target.id) {
                return Err(KernelError::parse(
                    WHAT,
                    format!("duplicate target id {}", target.id),
                ));
            }
            targets.push(target);
        }

        Ok(Self {
            minor,
            tick,
            player,
            weapon_id,
            weapon_slot,
            ammo_in_mag,
            ammo_reserve,
            reload_ticks_remaining,
            targets,
        })
    }

    /// Checks that the save describes the currently loaded content.
    pub(crate) fn check_against(&self, world: &WorldState, content: &ContentSet) -> Result<()> {
        let current_player = world.player().map(|p| p.id);
        let saved_player = self.player.as_ref().map(|p| p.id);
        if current_player != saved_player {
            return Err(KernelError::ContentMismatch(format!(
                "player {saved_player:?} saved, {current_player:?} loaded"
            )));
        }
        if self.weapon_id != content.weapon.weapon_id {
            return Err(KernelError::ContentMismatch(format!(
                "weapon {} saved, {} loaded",
                self.weapon_id, content.weapon.weapon_id
            )));
        }
        if self.player.is_some() {
            if self.ammo_in_mag > content.weapon.magazine_size {
                return Err(KernelError::ContentMismatch(format!(
                    "{} rounds exceed magazine size {}",
                    self.ammo_in_mag, content.weapon.magazine_size
                )));
            }
            if self.reload_ticks_remaining > content.weapon.reload_ticks {
                return Err(KernelError::ContentMismatch(format!(
                    "reload countdown {} exceeds authored duration {}",
                    self.reload_ticks_remaining, content.weapon.reload_ticks
                )));
            }
        }
        for target in &self.targets {
            match world.entity(target.id) {
                Some(entity) if entity.is_target() => {}
                _ => return Err(KernelError::UnknownSavedTarget(target.id)),
            }
        }
        Ok(())
    }

    /// Overwrites live state. Only called after `decode` and `check_against`
    /// both succeeded.
    pub(crate) fn apply(self, world: &mut WorldState) {
        world.tick = self.tick;

        if let Some(saved) = &self.player {
            if let Some(player) = world.entity_mut(saved.id) {
                player.position = saved.position;
                player.orientation = saved.orientation;
                player.yaw = saved.yaw;
                player.pitch = saved.pitch;
                player.hp = saved.hp;
                player.flags = EntityFlags::PLAYER
                    | (saved.flags & (EntityFlags::STANCE | EntityFlags::DEAD));
            }
        }
        if let Some(weapon) = world.weapon.as_mut() {
            weapon.slot = self.weapon_slot;
            weapon.ammo_in_mag = self.ammo_in_mag;
            weapon.ammo_reserve = self.ammo_reserve;
            weapon.reload_ticks_remaining = self.reload_ticks_remaining;
        }

        for saved in &self.targets {
            if let Some(target) = world.entity_mut(saved.id) {
                target.position = saved.position;
                target.orientation = saved.orientation;
                target.hp = saved.hp;
                target.flags.set(EntityFlags::DEAD, saved.destroyed);
            }
        }
    }
}

fn read_target(r: &mut ByteReader<'_>) -> Result<TargetImage> {
    let id = EntityId(r.u32()?);
    let destroyed = match r.u32()? {
        0 => false,
        1 => true,
        other => {
            return Err(KernelError::parse(
                WHAT,
                format!("target {id} destroyed flag {other} is not 0 or 1"),
            ));
        }
    };
    let hp = r.i32()?;
    let position = Vec3::from_array(r.f32x3()?);
    let orientation = Quat::from_array(r.f32x4()?);
    if !position.is_finite() || !orientation.is_finite() {
        return Err(KernelError::parse(
            WHAT,
            format!("target {id} has a non-finite transform"),
        ));
    }
    Ok(TargetImage {
        id,
        destroyed,
        hp,
        position,
        orientation,
    })
}
