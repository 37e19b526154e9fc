//! Typed input commands and their intake path.
//!
//! Actions cross the boundary as fixed-stride binary records (see [`record`]),
//! are structurally validated as a batch (see [`batch`]) and wait in the
//! [`ActionQueue`] until the tick whose number matches their target tick.
//! State-dependent checks happen only when that tick executes.

pub mod batch;
mod queue;
pub mod record;

pub use batch::{ActionBatch, OwnedActionBatch};
pub use queue::{ActionQueue, DueActions};
pub use record::ACTION_RECORD_V1_SIZE;

use crate::state::{EntityId, Tick};

/// Wire tag of an action record.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::FromRepr,
)]
#[strum(serialize_all = "snake_case")]
#[repr(u16)]
pub enum ActionType {
    None = 0,
    Move = 1,
    Look = 2,
    Fire = 3,
    Reload = 4,
    Sprint = 5,
    Crouch = 6,
}

/// Payload of an action, tagged by its variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActionKind {
    /// Movement input; `x` strafes right, `y` moves forward. Magnitude is
    /// clamped to 1.0 at execution.
    Move { x: f32, y: f32 },
    /// Look delta in radians.
    Look { delta_yaw: f32, delta_pitch: f32 },
    Fire { weapon_slot: u32 },
    Reload { weapon_slot: u32 },
    /// Sprint while `held`.
    Sprint { held: bool },
    /// Flips the crouched stance when `toggle` is set.
    Crouch { toggle: bool },
}

impl ActionKind {
    pub const fn action_type(&self) -> ActionType {
        match self {
            Self::Move { .. } => ActionType::Move,
            Self::Look { .. } => ActionType::Look,
            Self::Fire { .. } => ActionType::Fire,
            Self::Reload { .. } => ActionType::Reload,
            Self::Sprint { .. } => ActionType::Sprint,
            Self::Crouch { .. } => ActionType::Crouch,
        }
    }

    /// Whether every floating-point payload field is finite.
    pub fn is_finite(&self) -> bool {
        match *self {
            Self::Move { x, y } => x.is_finite() && y.is_finite(),
            Self::Look {
                delta_yaw,
                delta_pitch,
            } => delta_yaw.is_finite() && delta_pitch.is_finite(),
            _ => true,
        }
    }
}

/// A tick-stamped command issued by an actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Action {
    pub target_tick: Tick,
    pub actor: EntityId,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(target_tick: Tick, actor: EntityId, kind: ActionKind) -> Self {
        Self {
            target_tick,
            actor,
            kind,
        }
    }

    pub fn move_to(target_tick: Tick, actor: EntityId, x: f32, y: f32) -> Self {
        Self::new(target_tick, actor, ActionKind::Move { x, y })
    }

    pub fn look(target_tick: Tick, actor: EntityId, delta_yaw: f32, delta_pitch: f32) -> Self {
        Self::new(
            target_tick,
            actor,
            ActionKind::Look {
                delta_yaw,
                delta_pitch,
            },
        )
    }

    pub fn fire(target_tick: Tick, actor: EntityId) -> Self {
        Self::new(target_tick, actor, ActionKind::Fire { weapon_slot: 0 })
    }

    pub fn reload(target_tick: Tick, actor: EntityId) -> Self {
        Self::new(target_tick, actor, ActionKind::Reload { weapon_slot: 0 })
    }

    pub fn sprint(target_tick: Tick, actor: EntityId, held: bool) -> Self {
        Self::new(target_tick, actor, ActionKind::Sprint { held })
    }

    pub fn crouch_toggle(target_tick: Tick, actor: EntityId) -> Self {
        Self::new(target_tick, actor, ActionKind::Crouch { toggle: true })
    }
}
