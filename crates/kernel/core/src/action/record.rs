//! Fixed-stride action record, v1.
//!
//! ```text
//! off  size  field
//!   0     8  target_tick  u64
//!   8     4  actor_id     u32
//!  12     2  type         u16 (ActionType)
//!  14     2  reserved     u16
//!  16    16  payload      move: f32 x, f32 y
//!                         look: f32 delta_yaw, f32 delta_pitch
//!                         fire / reload: u32 weapon_slot
//!                         sprint: u32 held
//!                         crouch: u32 toggle
//!                         (unused bytes are zero)
//! ```

use crate::abi::wire::{ByteReader, ByteWriter};
use crate::error::{KernelError, Result};
use crate::state::{EntityId, Tick};

use super::{Action, ActionKind, ActionType};

/// Byte size (and required stride) of an action record in batch version 1.
pub const ACTION_RECORD_V1_SIZE: u32 = 32;

const PAYLOAD_SIZE: usize = 16;

/// Writes one record; `buf` must hold at least [`ACTION_RECORD_V1_SIZE`] bytes.
pub fn encode(action: &Action, buf: &mut [u8]) {
    let mut w = ByteWriter::new(buf);
    w.u64(action.target_tick.0);
    w.u32(action.actor.0);
    w.u16(action.kind.action_type() as u16);
    w.u16(0);

    let start = w.position();
    match action.kind {
        ActionKind::Move { x, y } => w.f32s(&[x, y]),
        ActionKind::Look {
            delta_yaw,
            delta_pitch,
        } => w.f32s(&[delta_yaw, delta_pitch]),
        ActionKind::Fire { weapon_slot } | ActionKind::Reload { weapon_slot } => {
            w.u32(weapon_slot)
        }
        ActionKind::Sprint { held } => w.u32(held as u32),
        ActionKind::Crouch { toggle } => w.u32(toggle as u32),
    }
    let written = w.position() - start;
    w.zeros(PAYLOAD_SIZE - written);
}

/// Decodes and structurally validates the record at `index` in `bytes`.
///
/// Checks only what is knowable without world state: a known, non-`none`
/// type tag, finite floats and a non-zero target tick. A `stamp` replaces the
/// recorded target tick before the tick check.
pub fn decode(bytes: &[u8], index: usize, stamp: Option<Tick>) -> Result<Action> {
    let offset = index * ACTION_RECORD_V1_SIZE as usize;
    let mut r = ByteReader::at(bytes, offset, "action record");

    let recorded = Tick(r.u64()?);
    let target_tick = stamp.unwrap_or(recorded);
    let actor = EntityId(r.u32()?);
    let tag = r.u16()?;
    r.skip(2)?;

    let kind = match ActionType::from_repr(tag) {
        Some(ActionType::Move) => ActionKind::Move {
            x: r.f32()?,
            y: r.f32()?,
        },
        Some(ActionType::Look) => ActionKind::Look {
            delta_yaw: r.f32()?,
            delta_pitch: r.f32()?,
        },
        Some(ActionType::Fire) => ActionKind::Fire {
            weapon_slot: r.u32()?,
        },
        Some(ActionType::Reload) => ActionKind::Reload {
            weapon_slot: r.u32()?,
        },
        Some(ActionType::Sprint) => ActionKind::Sprint {
            held: r.u32()? != 0,
        },
        Some(ActionType::Crouch) => ActionKind::Crouch {
            toggle: r.u32()? != 0,
        },
        Some(ActionType::None) | None => {
            return Err(KernelError::UnknownActionType { index, tag });
        }
    };

    if !kind.is_finite() {
        return Err(KernelError::NonFinitePayload { index });
    }
    if target_tick == Tick::ZERO {
        return Err(KernelError::ZeroTargetTick { index });
    }

    Ok(Action {
        target_tick,
        actor,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(action: &Action) -> Vec<u8> {
        let mut buf = vec![0xEE; ACTION_RECORD_V1_SIZE as usize];
        encode(action, &mut buf);
        buf
    }

    #[test]
    fn layout_matches_documented_offsets() {
        let action = Action::move_to(Tick(0x0102), EntityId(7), 0.5, -1.0);
        let buf = encoded(&action);
        assert_eq!(&buf[0..8], &0x0102u64.to_le_bytes());
        assert_eq!(&buf[8..12], &7u32.to_le_bytes());
        assert_eq!(&buf[12..14], &1u16.to_le_bytes());
        assert_eq!(&buf[14..16], &[0, 0]);
        assert_eq!(&buf[16..20], &0.5f32.to_le_bytes());
        assert_eq!(&buf[20..24], &(-1.0f32).to_le_bytes());
        assert!(buf[24..32].iter().all(|b| *b == 0));
    }

    #[test]
    fn decodes_what_it_encodes() {
        let action = Action::look(Tick(3), EntityId(1), 0.25, -0.125);
        assert_eq!(decode(&encoded(&action), 0, None).unwrap(), action);
    }

    #[test]
    fn rejects_unknown_and_none_tags() {
        let mut buf = encoded(&Action::fire(Tick(1), EntityId(1)));
        buf[12..14].copy_from_slice(&99u16.to_le_bytes());
        assert_eq!(
            decode(&buf, 0, None),
            Err(KernelError::UnknownActionType { index: 0, tag: 99 })
        );
        buf[12..14].copy_from_slice(&0u16.to_le_bytes());
        assert!(matches!(
            decode(&buf, 0, None),
            Err(KernelError::UnknownActionType { tag: 0, .. })
        ));
    }

    #[test]
    fn rejects_nan_and_infinite_payloads() {
        let nan = Action::move_to(Tick(1), EntityId(1), f32::NAN, 0.0);
        let inf = Action::look(Tick(1), EntityId(1), 0.0, f32::INFINITY);
        assert_eq!(
            decode(&encoded(&nan), 0, None),
            Err(KernelError::NonFinitePayload { index: 0 })
        );
        assert_eq!(
            decode(&encoded(&inf), 0, None),
            Err(KernelError::NonFinitePayload { index: 0 })
        );
    }

    #[test]
    fn rejects_target_tick_zero() {
        let action = Action::reload(Tick::ZERO, EntityId(1));
        assert_eq!(
            decode(&encoded(&action), 0, None),
            Err(KernelError::ZeroTargetTick { index: 0 })
        );
    }

    #[test]
    fn stamp_overrides_recorded_tick() {
        let action = Action::fire(Tick::ZERO, EntityId(1));
        let decoded = decode(&encoded(&action), 0, Some(Tick(5))).unwrap();
        assert_eq!(decoded.target_tick, Tick(5));
    }
}
