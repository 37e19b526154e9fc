use crate::abi::wire::{ByteReader, checked_span};
use crate::engine::{Event, EventKind};
use crate::error::{KernelError, Result};
use crate::state::{EntityFlags, EntityId, Quat, Tick, Vec3};

use super::{
    ENTITY_RECORD_SIZE, EVENT_RECORD_SIZE, SNAPSHOT_HEADER_SIZE, SNAPSHOT_MAGIC, SNAPSHOT_MAJOR,
    WEAPON_RECORD_SIZE,
};

const WHAT: &str = "snapshot";

/// Entity record as exported in a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub archetype_id: u32,
    pub flags: EntityFlags,
    pub hp: i32,
    pub position: Vec3,
    pub orientation: Quat,
}

impl EntitySnapshot {
    pub fn is_dead(&self) -> bool {
        self.flags.contains(EntityFlags::DEAD)
    }
}

/// Weapon record as exported in a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponSnapshot {
    pub owner: EntityId,
    pub slot: u32,
    pub weapon_id: u32,
    pub ammo_in_mag: i32,
    pub ammo_reserve: i32,
    pub reload_ticks_remaining: u32,
    pub reload_ticks_total: u32,
    pub reload_progress: f32,
}

impl WeaponSnapshot {
    pub fn is_reloading(&self) -> bool {
        self.reload_ticks_remaining > 0
    }
}

/// Decoded snapshot blob.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub minor: u16,
    pub tick: Tick,
    pub entities: Vec<EntitySnapshot>,
    pub weapon: Option<WeaponSnapshot>,
    pub events: Vec<Event>,
}

impl Snapshot {
    /// Parses a snapshot produced by this or a newer minor of the same major.
    ///
    /// Record strides larger than the known sizes are honoured; trailing
    /// fields of newer minors are skipped.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::at(bytes, 0, WHAT);
        let magic = r.u32()?;
        if magic != SNAPSHOT_MAGIC {
            return Err(KernelError::parse(WHAT, format!("bad magic {magic:#010x}")));
        }
        let major = r.u16()?;
        if major != SNAPSHOT_MAJOR {
            return Err(KernelError::parse(WHAT, format!("unsupported major {major}")));
        }
        let minor = r.u16()?;
        let size = r.u32()? as usize;
        if size < SNAPSHOT_HEADER_SIZE as usize || size > bytes.len() {
            return Err(KernelError::parse(
                WHAT,
                format!("declared size {size} does not fit buffer of {}", bytes.len()),
            ));
        }
        let bytes = &bytes[..size];
        r.u32()?;
        let tick = Tick(r.u64()?);
        let entity_count = r.u32()?;
        let entity_stride = r.u32()?;
        let weapon_present = r.u32()?;
        let weapon_stride = r.u32()?;
        let event_count = r.u32()?;
        let event_stride = r.u32()?;

        if entity_stride < ENTITY_RECORD_SIZE
            || weapon_stride < WEAPON_RECORD_SIZE
            || event_stride < EVENT_RECORD_SIZE
        {
            return Err(KernelError::parse(WHAT, "record stride below the v1 size"));
        }
        if weapon_present > 1 {
            return Err(KernelError::parse(WHAT, "weapon_present must be 0 or 1"));
        }

        let entities_end = checked_span(SNAPSHOT_HEADER_SIZE, entity_count, entity_stride, size)
            .ok_or_else(|| KernelError::parse(WHAT, "entity array out of bounds"))?;
        let weapon_end = checked_span(entities_end as u32, weapon_present, weapon_stride, size)
            .ok_or_else(|| KernelError::parse(WHAT, "weapon record out of bounds"))?;
        checked_span(weapon_end as u32, event_count, event_stride, size)
            .ok_or_else(|| KernelError::parse(WHAT, "event array out of bounds"))?;

        let entities = (0..entity_count as usize)
            .map(|i| {
                let offset = SNAPSHOT_HEADER_SIZE as usize + i * entity_stride as usize;
                read_entity(&mut ByteReader::at(bytes, offset, WHAT))
            })
            .collect::<Result<Vec<_>>>()?;

        let weapon = if weapon_present == 1 {
            Some(read_weapon(&mut ByteReader::at(bytes, entities_end, WHAT))?)
        } else {
            None
        };

        let events = (0..event_count as usize)
            .map(|i| {
                let offset = weapon_end + i * event_stride as usize;
                read_event(&mut ByteReader::at(bytes, offset, WHAT))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            minor,
            tick,
            entities,
            weapon,
            events,
        })
    }

    pub fn entity(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn events_of(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |event| event.kind == kind)
    }
}

fn read_entity(r: &mut ByteReader<'_>) -> Result<EntitySnapshot> {
    Ok(EntitySnapshot {
        id: EntityId(r.u32()?),
        archetype_id: r.u32()?,
        flags: EntityFlags::from_bits_retain(r.u32()?),
        hp: r.i32()?,
        position: Vec3::from_array(r.f32x3()?),
        orientation: Quat::from_array(r.f32x4()?),
    })
}

fn read_weapon(r: &mut ByteReader<'_>) -> Result<WeaponSnapshot> {
    Ok(WeaponSnapshot {
        owner: EntityId(r.u32()?),
        slot: r.u32()?,
        weapon_id: r.u32()?,
        ammo_in_mag: r.i32()?,
        ammo_reserve: r.i32()?,
        reload_ticks_remaining: r.u32()?,
        reload_ticks_total: r.u32()?,
        reload_progress: r.f32()?,
    })
}

fn read_event(r: &mut ByteReader<'_>) -> Result<Event> {
    let tag = r.u16()?;
    let kind = EventKind::from_repr(tag)
        .ok_or_else(|| KernelError::parse(WHAT, format!("unknown event type {tag}")))?;
    r.skip(2)?;
    Ok(Event::new(kind, EntityId(r.u32()?), r.u32()?, r.i32()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EventLog;
    use crate::engine::test_support::{PLAYER, TARGET, context_for, world};
    use crate::snapshot::SnapshotWriter;
    use crate::state::WorldState;

    #[test]
    fn empty_world_has_header_only() {
        let world = WorldState::empty();
        let events = EventLog::new();
        let writer = SnapshotWriter {
            world: &world,
            events: &events,
            weapon_def: None,
        };
        let blob = writer.encode().unwrap();
        assert_eq!(blob.len(), SNAPSHOT_HEADER_SIZE as usize);

        let snapshot = Snapshot::parse(&blob).unwrap();
        assert_eq!(snapshot.tick, Tick::ZERO);
        assert!(snapshot.entities.is_empty());
        assert!(snapshot.weapon.is_none());
    }

    #[test]
    fn encodes_entities_weapon_and_events_in_order() {
        let (content, _) = context_for();
        let world = world(&content);
        let mut events = EventLog::new();
        events.push(Event::damage(PLAYER, TARGET, 10));
        let blob = SnapshotWriter {
            world: &world,
            events: &events,
            weapon_def: Some(&content.weapon),
        }
        .encode()
        .unwrap();
        assert_eq!(blob.len(), 48 + 2 * 44 + 32 + 16);
        assert_eq!(&blob[..4], b"AXSN");

        let snapshot = Snapshot::parse(&blob).unwrap();
        assert_eq!(snapshot.entities[0].id, PLAYER);
        assert_eq!(snapshot.entities[1].id, TARGET);
        let weapon = snapshot.weapon.unwrap();
        assert_eq!(weapon.ammo_in_mag, 12);
        assert_eq!(weapon.reload_ticks_total, 3);
        assert_eq!(weapon.reload_progress, 1.0);
        assert_eq!(snapshot.events, vec![Event::damage(PLAYER, TARGET, 10)]);
    }

    #[test]
    fn rejects_bad_magic_and_truncation() {
        let world = WorldState::empty();
        let events = EventLog::new();
        let mut blob = SnapshotWriter {
            world: &world,
            events: &events,
            weapon_def: None,
        }
        .encode()
        .unwrap();
        assert!(Snapshot::parse(&blob[..20]).is_err());
        blob[0] ^= 0xFF;
        assert!(matches!(
            Snapshot::parse(&blob),
            Err(KernelError::Parse { what: "snapshot", .. })
        ));
    }
}
