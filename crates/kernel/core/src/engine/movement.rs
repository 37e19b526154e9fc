use crate::state::{EntityFlags, Vec3, WorldState};

use super::event::EventLog;
use super::transition::{Rejection, TickContext, TickTransition, require_controllable};

/// Yaw-relative horizontal movement.
pub(crate) struct MoveTransition {
    pub x: f32,
    pub y: f32,
}

impl MoveTransition {
    /// Input clamped to unit magnitude.
    fn clamped_input(&self) -> (f32, f32) {
        let length = (self.x * self.x + self.y * self.y).sqrt();
        if length > 1.0 {
            (self.x / length, self.y / length)
        } else {
            (self.x, self.y)
        }
    }
}

impl TickTransition for MoveTransition {
    fn pre_validate(&self, ctx: &TickContext<'_>, world: &WorldState) -> Result<(), Rejection> {
        require_controllable(ctx, world)
    }

    fn apply(&self, ctx: &TickContext<'_>, world: &mut WorldState, _events: &mut EventLog) {
        let Some(actor) = world.entity_mut(ctx.actor) else {
            return;
        };

        let config = ctx.config;
        let speed = if actor.flags.contains(EntityFlags::CROUCHED) {
            config.move_speed * config.crouch_multiplier
        } else if actor.flags.contains(EntityFlags::SPRINTING) {
            config.move_speed * config.sprint_multiplier
        } else {
            config.move_speed
        };

        let (strafe, ahead) = self.clamped_input();
        let (sy, cy) = actor.yaw.sin_cos();
        let forward = Vec3::new(cy, 0.0, -sy);
        let right = Vec3::new(sy, 0.0, cy);
        let step = forward.scale(ahead).add(right.scale(strafe)).scale(speed);

        let mut position = actor.position.add(step);
        position.y = config.ground_y;
        actor.position = position;
    }
}

/// Sets or clears the sprinting stance.
pub(crate) struct SprintTransition {
    pub held: bool,
}

impl TickTransition for SprintTransition {
    fn pre_validate(&self, ctx: &TickContext<'_>, world: &WorldState) -> Result<(), Rejection> {
        require_controllable(ctx, world)
    }

    fn apply(&self, ctx: &TickContext<'_>, world: &mut WorldState, _events: &mut EventLog) {
        if let Some(actor) = world.entity_mut(ctx.actor) {
            actor.flags.set(EntityFlags::SPRINTING, self.held);
        }
    }
}

/// Flips the crouched stance when `toggle` is set; a cleared toggle is a no-op.
pub(crate) struct CrouchTransition {
    pub toggle: bool,
}

impl TickTransition for CrouchTransition {
    fn pre_validate(&self, ctx: &TickContext<'_>, world: &WorldState) -> Result<(), Rejection> {
        require_controllable(ctx, world)
    }

    fn apply(&self, ctx: &TickContext<'_>, world: &mut WorldState, _events: &mut EventLog) {
        if !self.toggle {
            return;
        }
        if let Some(actor) = world.entity_mut(ctx.actor) {
            actor.flags.toggle(EntityFlags::CROUCHED);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{PLAYER, context_for, world};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn forward_input_moves_along_plus_x_at_zero_yaw() {
        let (content, config) = context_for();
        let mut world = world(&content);
        let ctx = TickContext {
            tick: world.tick.next(),
            actor: PLAYER,
            config: &config,
            content: &content,
        };
        let mut events = EventLog::new();
        MoveTransition { x: 0.0, y: 1.0 }.apply(&ctx, &mut world, &mut events);

        let p = world.entity(PLAYER).unwrap().position;
        assert!(close(p.x, config.move_speed));
        assert!(close(p.z, 0.0));
        assert!(events.is_empty());
    }

    #[test]
    fn diagonal_input_is_clamped_to_unit_length() {
        let (content, config) = context_for();
        let mut world = world(&content);
        let ctx = TickContext {
            tick: world.tick.next(),
            actor: PLAYER,
            config: &config,
            content: &content,
        };
        MoveTransition { x: 1.0, y: 1.0 }.apply(&ctx, &mut world, &mut EventLog::new());

        let p = world.entity(PLAYER).unwrap().position;
        let travelled = (p.x * p.x + p.z * p.z).sqrt();
        assert!(close(travelled, config.move_speed));
    }

    #[test]
    fn crouch_overrides_sprint_speed() {
        let (content, config) = context_for();
        let mut world = world(&content);
        world
            .entity_mut(PLAYER)
            .unwrap()
            .flags
            .insert(EntityFlags::SPRINTING | EntityFlags::CROUCHED);
        let ctx = TickContext {
            tick: world.tick.next(),
            actor: PLAYER,
            config: &config,
            content: &content,
        };
        MoveTransition { x: 0.0, y: 1.0 }.apply(&ctx, &mut world, &mut EventLog::new());

        let p = world.entity(PLAYER).unwrap().position;
        assert!(close(p.x, config.move_speed * config.crouch_multiplier));
    }

    #[test]
    fn crouch_toggle_flips_stance() {
        let (content, config) = context_for();
        let mut world = world(&content);
        let ctx = TickContext {
            tick: world.tick.next(),
            actor: PLAYER,
            config: &config,
            content: &content,
        };
        let crouch = CrouchTransition { toggle: true };
        crouch.apply(&ctx, &mut world, &mut EventLog::new());
        assert!(world.entity(PLAYER).unwrap().flags.contains(EntityFlags::CROUCHED));
        crouch.apply(&ctx, &mut world, &mut EventLog::new());
        assert!(!world.entity(PLAYER).unwrap().flags.contains(EntityFlags::CROUCHED));
    }
}
