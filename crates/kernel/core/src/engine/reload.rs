use crate::content::WeaponDef;
use crate::state::{ReloadTick, WorldState};

use super::event::{Event, EventLog};
use super::transition::{Rejection, TickContext, TickTransition, require_weapon};

/// Starts a reload when one is useful; otherwise a silent no-op.
pub(crate) struct ReloadTransition {
    pub slot: u32,
}

impl TickTransition for ReloadTransition {
    fn pre_validate(&self, ctx: &TickContext<'_>, world: &WorldState) -> Result<(), Rejection> {
        require_weapon(ctx, world, self.slot)
    }

    fn apply(&self, ctx: &TickContext<'_>, world: &mut WorldState, events: &mut EventLog) {
        let def = &ctx.content.weapon;
        let Some(weapon) = world.weapon.as_mut() else {
            return;
        };
        if !weapon.can_start_reload(def) {
            tracing::trace!(actor = %ctx.actor, "reload ignored");
            return;
        }
        weapon.start_reload(def);
        events.push(Event::reload_started(
            ctx.actor,
            self.slot,
            weapon.reload_ticks_remaining,
        ));
    }
}

/// Counts the reload timer down by one tick after all actions have run.
pub(crate) fn advance_reload_timer(def: &WeaponDef, world: &mut WorldState, events: &mut EventLog) {
    let Some(weapon) = world.weapon.as_mut() else {
        return;
    };
    if let ReloadTick::Completed { transferred } = weapon.advance_reload(def) {
        events.push(Event::reload_complete(weapon.owner, weapon.slot, transferred));
    }
}
