use core::f32::consts::{PI, TAU};

use crate::state::{Quat, WorldState};

use super::event::EventLog;
use super::transition::{Rejection, TickContext, TickTransition, require_controllable};

/// Accumulates look deltas and re-derives the actor's orientation.
pub(crate) struct LookTransition {
    pub delta_yaw: f32,
    pub delta_pitch: f32,
}

impl TickTransition for LookTransition {
    fn pre_validate(&self, ctx: &TickContext<'_>, world: &WorldState) -> Result<(), Rejection> {
        require_controllable(ctx, world)
    }

    fn apply(&self, ctx: &TickContext<'_>, world: &mut WorldState, _events: &mut EventLog) {
        let limit = ctx.config.pitch_limit;
        if let Some(actor) = world.entity_mut(ctx.actor) {
            actor.yaw = wrap_angle(actor.yaw + self.delta_yaw);
            actor.pitch = (actor.pitch + self.delta_pitch).clamp(-limit, limit);
            actor.orientation = Quat::from_yaw_pitch(actor.yaw, actor.pitch);
        }
    }
}

/// Wraps an angle into `(-pi, pi]`.
pub(crate) fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}
