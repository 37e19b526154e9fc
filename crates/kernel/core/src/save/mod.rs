//! Versioned, checksummed save blob.
//!
//! ```text
//! header (32 B)  magic, major, minor, total_size, header_size,
//!                world_offset, world_size, checksum, reserved
//! world chunk    tick, player, weapon runtime state, target count/offset
//!                (+ yaw, pitch since minor 1)
//! targets        target_count * 40 B
//! ```
//!
//! The CRC-32 checksum covers the whole blob with the checksum field zeroed.
//! Loading goes through [`SaveImage::decode`] and
//! [`SaveImage::check_against`] before anything is applied, so a rejected
//! blob never touches live state.

mod image;

pub(crate) use image::SaveImage;

use crate::abi::wire::{ByteWriter, wire_size};
use crate::config::KernelConfig;
use crate::content::WeaponDef;
use crate::error::Result;
use crate::state::{Quat, Vec3, WorldState};

/// `'AXSV'` read as a little-endian `u32`.
pub const SAVE_MAGIC: u32 = 0x5653_5841;
pub const SAVE_MAJOR: u16 = 1;
/// Minor 1 appends the player's look angles to the world chunk.
pub const SAVE_MINOR: u16 = 1;

pub const SAVE_HEADER_SIZE: u32 = 32;
pub const WORLD_CHUNK_V1_0_SIZE: u32 = 76;
pub const WORLD_CHUNK_V1_1_SIZE: u32 = 84;
pub const TARGET_RECORD_SIZE: u32 = 40;

const CHECKSUM_OFFSET: usize = 24;

/// CRC-32 of `blob` with the checksum field treated as zero.
pub(crate) fn checksum(blob: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&blob[..CHECKSUM_OFFSET]);
    hasher.update(&[0u8; 4]);
    hasher.update(&blob[CHECKSUM_OFFSET + 4..]);
    hasher.finalize()
}

/// Encodes the current world in the latest save format.
pub(crate) struct SaveWriter<'a> {
    pub world: &'a WorldState,
    pub weapon_def: &'a WeaponDef,
}

impl SaveWriter<'_> {
    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        let world = self.world;
        let targets: Vec<_> = world.targets().collect();
        let target_offset = SAVE_HEADER_SIZE + WORLD_CHUNK_V1_1_SIZE;
        let size = target_offset as usize + targets.len() * TARGET_RECORD_SIZE as usize;
        let total_size = wire_size(size)?;
        let target_count = wire_size(targets.len())?;

        let mut blob = vec![0u8; size];
        let mut w = ByteWriter::new(&mut blob);

        w.u32(SAVE_MAGIC);
        w.u16(SAVE_MAJOR);
        w.u16(SAVE_MINOR);
        w.u32(total_size);
        w.u32(SAVE_HEADER_SIZE);
        w.u32(SAVE_HEADER_SIZE);
        w.u32(WORLD_CHUNK_V1_1_SIZE);
        w.u32(0);
        w.u32(0);

        let player = world.player();
        let weapon = world.weapon.as_ref();
        w.u64(world.tick.0);
        w.u32(player.map_or(KernelConfig::NO_ENTITY, |p| p.id.0));
        w.u32(weapon.map_or(self.weapon_def.weapon_id, |weapon| weapon.weapon_id));
        w.u32(weapon.map_or(0, |weapon| weapon.slot));
        w.u32(player.map_or(0, |p| p.flags.bits()));
        w.i32(player.map_or(0, |p| p.hp));
        w.f32s(&player.map_or(Vec3::ZERO, |p| p.position).to_array());
        w.f32s(&player.map_or(Quat::IDENTITY, |p| p.orientation).to_array());
        w.i32(weapon.map_or(0, |weapon| weapon.ammo_in_mag));
        w.i32(weapon.map_or(0, |weapon| weapon.ammo_reserve));
        w.u32(weapon.map_or(0, |weapon| weapon.reload_ticks_remaining));
        w.u32(target_count);
        w.u32(target_offset);
        w.f32(player.map_or(0.0, |p| p.yaw));
        w.f32(player.map_or(0.0, |p| p.pitch));

        for target in targets {
            w.u32(target.id.0);
            w.u32(u32::from(target.is_dead()));
            w.i32(target.hp);
            w.f32s(&target.position.to_array());
            w.f32s(&target.orientation.to_array());
        }
        debug_assert_eq!(w.position(), size);

        let crc = checksum(&blob);
        blob[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].copy_from_slice(&crc.to_le_bytes());
        Ok(blob)
    }
}
