//! Hitscan fire resolution.

use crate::state::{EntityFlags, EntityId, Vec3, WorldState, forward};

use super::event::{BlockReason, Event, EventLog};
use super::transition::{Rejection, TickContext, TickTransition, require_weapon};

pub(crate) struct FireTransition {
    pub slot: u32,
}

impl TickTransition for FireTransition {
    fn pre_validate(&self, ctx: &TickContext<'_>, world: &WorldState) -> Result<(), Rejection> {
        require_weapon(ctx, world, self.slot)
    }

    fn apply(&self, ctx: &TickContext<'_>, world: &mut WorldState, events: &mut EventLog) {
        let Some(weapon) = world.weapon.as_mut() else {
            return;
        };
        if weapon.is_reloading() {
            events.push(Event::fire_blocked(ctx.actor, self.slot, BlockReason::Reloading));
            return;
        }
        if weapon.ammo_in_mag <= 0 {
            events.push(Event::fire_blocked(ctx.actor, self.slot, BlockReason::EmptyMagazine));
            return;
        }
        weapon.consume_round();

        let Some(shooter) = world.entity(ctx.actor) else {
            return;
        };
        let eye_height = if shooter.flags.contains(EntityFlags::CROUCHED) {
            ctx.config.crouch_eye_height
        } else {
            ctx.config.eye_height
        };
        let origin = shooter.position.add(Vec3::new(0.0, eye_height, 0.0));
        let direction = forward(shooter.yaw, shooter.pitch);
        let weapon_def = &ctx.content.weapon;

        let Some(hit) = closest_hit(world, origin, direction, weapon_def.max_range) else {
            tracing::trace!(actor = %ctx.actor, tick = %ctx.tick, "shot missed");
            return;
        };
        let Some(target) = world.entity_mut(hit) else {
            return;
        };
        let destroyed = target.take_damage(weapon_def.damage);
        let remaining = target.hp;

        events.push(Event::damage(ctx.actor, hit, weapon_def.damage));
        if destroyed {
            tracing::debug!(entity = %hit, tick = %ctx.tick, "target destroyed");
            events.push(Event::destroyed(ctx.actor, hit, remaining));
        }
    }
}

/// Closest live target whose hit sphere the ray enters within `max_range`.
///
/// Ties on distance resolve to the lowest entity id.
pub(crate) fn closest_hit(
    world: &WorldState,
    origin: Vec3,
    direction: Vec3,
    max_range: f32,
) -> Option<EntityId> {
    world
        .entities
        .iter()
        .filter(|entity| entity.is_live_target())
        .filter_map(|entity| {
            ray_sphere(origin, direction, entity.position, entity.radius)
                .filter(|distance| *distance <= max_range)
                .map(|distance| (distance, entity.id))
        })
        .min_by(|(da, ia), (db, ib)| da.total_cmp(db).then(ia.cmp(ib)))
        .map(|(_, id)| id)
}

/// Entry distance along a unit-direction ray into a sphere, 0 if the origin
/// is inside it, `None` if the sphere is missed or behind the origin.
pub(crate) fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    if radius <= 0.0 {
        return None;
    }
    let offset = origin.sub(center);
    let b = offset.dot(direction);
    let c = offset.dot(offset) - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some((-b - discriminant.sqrt()).max(0.0))
}
