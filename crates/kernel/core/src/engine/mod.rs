//! Tick engine: advances truth by discrete steps.
//!
//! Each tick runs in a fixed order:
//!
//! 1. increment the tick counter and clear the event list;
//! 2. execute every action targeting this tick, in submission order, each
//!    through [`TickTransition::pre_validate`] then [`TickTransition::apply`];
//! 3. advance the reload timer.
//!
//! Because timers only move in step 3, a reload started in step 2 is still in
//! progress for any later same-tick fire. Nothing in here reads the clock or
//! draws random numbers.

mod combat;
pub mod event;
mod look;
mod movement;
mod reload;
mod transition;

pub use event::{BlockReason, Event, EventKind, EventLog};
pub use transition::Rejection;

use crate::action::{Action, ActionKind, ActionQueue};
use crate::config::KernelConfig;
use crate::content::ContentSet;
use crate::state::WorldState;

use combat::FireTransition;
use look::LookTransition;
use movement::{CrouchTransition, MoveTransition, SprintTransition};
use reload::{ReloadTransition, advance_reload_timer};
use transition::{TickContext, drive};

/// Borrowed view of the immutable inputs to a step.
pub(crate) struct TickEngine<'a> {
    config: &'a KernelConfig,
    content: &'a ContentSet,
}

impl<'a> TickEngine<'a> {
    pub(crate) fn new(config: &'a KernelConfig, content: &'a ContentSet) -> Self {
        Self { config, content }
    }

    /// Runs `ticks` full ticks; 0 is a no-op that leaves events untouched.
    pub(crate) fn step(
        &self,
        ticks: u32,
        world: &mut WorldState,
        queue: &mut ActionQueue,
        events: &mut EventLog,
    ) {
        for _ in 0..ticks {
            self.step_one(world, queue, events);
        }
    }

    fn step_one(&self, world: &mut WorldState, queue: &mut ActionQueue, events: &mut EventLog) {
        world.tick = world.tick.next();
        events.clear();
        let tick = world.tick;

        let taken = queue.take_due(tick);
        for stale in &taken.stale {
            tracing::warn!(
                %tick,
                target_tick = %stale.target_tick,
                actor = %stale.actor,
                kind = %stale.kind.action_type(),
                "discarding action scheduled for a past tick"
            );
        }

        for action in &taken.due {
            let ctx = TickContext {
                tick,
                actor: action.actor,
                config: self.config,
                content: self.content,
            };
            if let Err(rejection) = execute(action, &ctx, world, events) {
                tracing::debug!(
                    %tick,
                    kind = %action.kind.action_type(),
                    %rejection,
                    "action rejected"
                );
            }
        }

        advance_reload_timer(&self.content.weapon, world, events);
    }
}

fn execute(
    action: &Action,
    ctx: &TickContext<'_>,
    world: &mut WorldState,
    events: &mut EventLog,
) -> Result<(), Rejection> {
    match action.kind {
        ActionKind::Move { x, y } => drive(&MoveTransition { x, y }, ctx, world, events),
        ActionKind::Look {
            delta_yaw,
            delta_pitch,
        } => drive(
            &LookTransition {
                delta_yaw,
                delta_pitch,
            },
            ctx,
            world,
            events,
        ),
        ActionKind::Fire { weapon_slot } => {
            drive(&FireTransition { slot: weapon_slot }, ctx, world, events)
        }
        ActionKind::Reload { weapon_slot } => {
            drive(&ReloadTransition { slot: weapon_slot }, ctx, world, events)
        }
        ActionKind::Sprint { held } => drive(&SprintTransition { held }, ctx, world, events),
        ActionKind::Crouch { toggle } => drive(&CrouchTransition { toggle }, ctx, world, events),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{PLAYER, TARGET, context_for, world};
    use super::*;
    use crate::state::{EntityId, Tick};

    fn run(actions: Vec<Action>, ticks: u32) -> (WorldState, EventLog) {
        let (content, config) = context_for();
        let mut world = world(&content);
        let mut queue = ActionQueue::new();
        let mut events = EventLog::new();
        queue.extend(actions);
        TickEngine::new(&config, &content).step(ticks, &mut world, &mut queue, &mut events);
        (world, events)
    }

    #[test]
    fn same_tick_reload_blocks_following_fire() {
        let (world, events) = run(
            vec![
                Action::fire(Tick(1), PLAYER),
                Action::reload(Tick(2), PLAYER),
                Action::fire(Tick(2), PLAYER),
            ],
            2,
        );
        assert_eq!(
            events.as_slice(),
            &[
                Event::reload_started(PLAYER, 0, 3),
                Event::fire_blocked(PLAYER, 0, BlockReason::Reloading),
            ]
        );
        assert_eq!(world.weapon.as_ref().unwrap().reload_ticks_remaining, 2);
    }

    #[test]
    fn events_only_describe_the_latest_tick() {
        let (world, events) = run(vec![Action::fire(Tick(1), PLAYER)], 2);
        assert_eq!(world.tick, Tick(2));
        assert!(events.is_empty());
        assert_eq!(world.entity(TARGET).unwrap().hp, 90);
    }

    #[test]
    fn zero_ticks_is_a_no_op() {
        let (world, _) = run(vec![Action::fire(Tick(1), PLAYER)], 0);
        assert_eq!(world.tick, Tick::ZERO);
        assert_eq!(world.weapon.as_ref().unwrap().ammo_in_mag, 12);
    }

    #[test]
    fn unknown_actor_is_rejected_without_events() {
        let (world, events) = run(vec![Action::fire(Tick(1), EntityId(77))], 1);
        assert!(events.is_empty());
        assert_eq!(world.weapon.as_ref().unwrap().ammo_in_mag, 12);
    }

    #[test]
    fn targets_cannot_act() {
        let (world, events) = run(vec![Action::move_to(Tick(1), TARGET, 1.0, 0.0)], 1);
        assert!(events.is_empty());
        assert_eq!(world.entity(TARGET).unwrap().position.x, 5.0);
    }
}
