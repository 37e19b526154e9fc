//! Read-only snapshot blob: a caller-owned copy of truth at one tick.
//!
//! Layout (little-endian, contiguous):
//!
//! | Part | Size |
//! |---|---|
//! | header | [`SNAPSHOT_HEADER_SIZE`] |
//! | entities | `entity_count * entity_stride` |
//! | weapon (optional) | `weapon_stride` |
//! | events | `event_count * event_stride` |
//!
//! Header fields: `magic, major, minor, size_bytes, reserved, tick,
//! entity_count, entity_stride, weapon_present, weapon_stride, event_count,
//! event_stride`.

mod parse;

pub use parse::{EntitySnapshot, Snapshot, WeaponSnapshot};

use crate::abi::wire::{ByteWriter, wire_size};
use crate::content::WeaponDef;
use crate::engine::{Event, EventLog};
use crate::error::Result;
use crate::state::{Entity, WeaponState, WorldState};

/// `'AXSN'` read as a little-endian `u32`.
pub const SNAPSHOT_MAGIC: u32 = 0x4E53_5841;
pub const SNAPSHOT_MAJOR: u16 = 1;
pub const SNAPSHOT_MINOR: u16 = 0;

pub const SNAPSHOT_HEADER_SIZE: u32 = 48;
pub const ENTITY_RECORD_SIZE: u32 = 44;
pub const WEAPON_RECORD_SIZE: u32 = 32;
pub const EVENT_RECORD_SIZE: u32 = 16;

/// Borrowed inputs of one snapshot encoding.
pub(crate) struct SnapshotWriter<'a> {
    pub world: &'a WorldState,
    pub events: &'a EventLog,
    /// Authored weapon, used for the derived reload fields.
    pub weapon_def: Option<&'a WeaponDef>,
}

impl SnapshotWriter<'_> {
    /// Exact byte size of the encoded snapshot.
    pub(crate) fn required_size(&self) -> usize {
        let weapon = if self.world.weapon.is_some() {
            WEAPON_RECORD_SIZE as usize
        } else {
            0
        };
        SNAPSHOT_HEADER_SIZE as usize
            + self.world.entities.len() * ENTITY_RECORD_SIZE as usize
            + weapon
            + self.events.len() * EVENT_RECORD_SIZE as usize
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        let size = self.required_size();
        let size_bytes = wire_size(size)?;
        let entity_count = wire_size(self.world.entities.len())?;
        let event_count = wire_size(self.events.len())?;

        let mut blob = vec![0u8; size];
        let mut w = ByteWriter::new(&mut blob);
        w.u32(SNAPSHOT_MAGIC);
        w.u16(SNAPSHOT_MAJOR);
        w.u16(SNAPSHOT_MINOR);
        w.u32(size_bytes);
        w.u32(0);
        w.u64(self.world.tick.0);
        w.u32(entity_count);
        w.u32(ENTITY_RECORD_SIZE);
        w.u32(u32::from(self.world.weapon.is_some()));
        w.u32(WEAPON_RECORD_SIZE);
        w.u32(event_count);
        w.u32(EVENT_RECORD_SIZE);

        for entity in &self.world.entities {
            write_entity(&mut w, entity);
        }
        if let Some(weapon) = &self.world.weapon {
            write_weapon(&mut w, weapon, self.weapon_def);
        }
        for event in self.events.as_slice() {
            write_event(&mut w, event);
        }
        debug_assert_eq!(w.position(), size);
        Ok(blob)
    }
}

fn write_entity(w: &mut ByteWriter<'_>, entity: &Entity) {
    w.u32(entity.id.0);
    w.u32(entity.archetype_id);
    w.u32(entity.flags.bits());
    w.i32(entity.hp);
    w.f32s(&entity.position.to_array());
    w.f32s(&entity.orientation.to_array());
}

fn write_weapon(w: &mut ByteWriter<'_>, weapon: &WeaponState, def: Option<&WeaponDef>) {
    w.u32(weapon.owner.0);
    w.u32(weapon.slot);
    w.u32(weapon.weapon_id);
    w.i32(weapon.ammo_in_mag);
    w.i32(weapon.ammo_reserve);
    w.u32(weapon.reload_ticks_remaining);
    w.u32(def.map_or(0, |def| def.reload_ticks));
    w.f32(def.map_or(1.0, |def| weapon.reload_progress(def)));
}

fn write_event(w: &mut ByteWriter<'_>, event: &Event) {
    w.u16(event.kind as u16);
    w.u16(0);
    w.u32(event.actor.0);
    w.u32(event.secondary);
    w.i32(event.value);
}
