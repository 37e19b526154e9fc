//! Per-action transition contract executed inside a tick.

use crate::config::KernelConfig;
use crate::content::ContentSet;
use crate::state::{EntityId, Tick, WorldState};

use super::event::EventLog;

/// Read-only facts available to a transition while a tick executes.
pub(crate) struct TickContext<'a> {
    pub tick: Tick,
    pub actor: EntityId,
    pub config: &'a KernelConfig,
    pub content: &'a ContentSet,
}

/// State-dependent reasons an action is skipped at execution time.
///
/// These never surface to the caller as errors: structural validation
/// already accepted the action, and the world decides at tick time whether
/// it applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("actor {0} does not exist")]
    UnknownActor(EntityId),

    #[error("actor {0} is dead")]
    DeadActor(EntityId),

    #[error("actor {0} is not controllable")]
    NotControllable(EntityId),

    #[error("actor {0} holds no weapon")]
    NoWeapon(EntityId),

    #[error("weapon slot {0} is not supported")]
    UnsupportedSlot(u32),
}

/// How one action kind validates against and mutates world state.
///
/// `pre_validate` sees the state **before** mutation and must be side-effect
/// free. `apply` may assume `pre_validate` succeeded. Outcomes that are part
/// of the game rules (a blocked shot, an ignored reload) are handled inside
/// `apply`, not reported as rejections.
pub(crate) trait TickTransition {
    fn pre_validate(&self, ctx: &TickContext<'_>, world: &WorldState) -> Result<(), Rejection>;

    fn apply(&self, ctx: &TickContext<'_>, world: &mut WorldState, events: &mut EventLog);
}

/// Runs `transition` through both phases, returning the rejection if the
/// world refused it.
pub(crate) fn drive<T>(
    transition: &T,
    ctx: &TickContext<'_>,
    world: &mut WorldState,
    events: &mut EventLog,
) -> Result<(), Rejection>
where
    T: TickTransition,
{
    transition.pre_validate(ctx, world)?;
    transition.apply(ctx, world, events);
    Ok(())
}

/// Actor must exist, be alive and be the player.
pub(crate) fn require_controllable(
    ctx: &TickContext<'_>,
    world: &WorldState,
) -> Result<(), Rejection> {
    let entity = world
        .entity(ctx.actor)
        .ok_or(Rejection::UnknownActor(ctx.actor))?;
    if entity.is_dead() {
        return Err(Rejection::DeadActor(ctx.actor));
    }
    if !entity.is_player() {
        return Err(Rejection::NotControllable(ctx.actor));
    }
    Ok(())
}

/// Actor must be controllable and own the weapon in `slot`.
pub(crate) fn require_weapon(
    ctx: &TickContext<'_>,
    world: &WorldState,
    slot: u32,
) -> Result<(), Rejection> {
    require_controllable(ctx, world)?;
    if slot >= KernelConfig::WEAPON_SLOT_COUNT {
        return Err(Rejection::UnsupportedSlot(slot));
    }
    if world.weapon_of(ctx.actor).is_none() {
        return Err(Rejection::NoWeapon(ctx.actor));
    }
    Ok(())
}
