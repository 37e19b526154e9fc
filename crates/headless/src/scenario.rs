//! Scripted action sequences and the built-in demo content.
use anyhow::Result;
use axiom_core::{
    Action, ContentParams, EntityId, KernelConfig, PlayerSpawn, Quat, TargetSpawn, Tick, Vec3,
    WeaponDef,
};

/// Which action script to feed the kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Scenario {
    /// Fire straight ahead every few ticks.
    #[default]
    Fire,
    /// Spend a few rounds, reload, and fire into the reload window.
    Reload,
    /// Turn toward each target in turn and fire until it is destroyed.
    Sweep,
}

const FIRE_INTERVAL: u64 = 4;

impl Scenario {
    /// Builds the action script for `ticks` ticks of simulation.
    pub fn actions(
        self,
        content: &ContentParams,
        config: &KernelConfig,
        ticks: u32,
    ) -> Result<Vec<Action>> {
        let Some(player) = &content.player else {
            anyhow::bail!("Scenario {} needs a player in the loaded content", self);
        };
        let last = u64::from(ticks);

        let actions = match self {
            Scenario::Fire => (1..=last)
                .step_by(FIRE_INTERVAL as usize)
                .map(|t| Action::fire(Tick(t), player.id))
                .collect(),
            Scenario::Reload => reload_script(player.id, &content.weapon, last),
            Scenario::Sweep => sweep_script(player, content, config, last),
        };

        Ok(actions)
    }
}

fn reload_script(actor: EntityId, weapon: &WeaponDef, last: u64) -> Vec<Action> {
    let reload_at = 4;
    let reload_done = reload_at + u64::from(weapon.reload_ticks);

    let mut actions: Vec<_> = (1..reload_at).map(|t| Action::fire(Tick(t), actor)).collect();
    actions.push(Action::reload(Tick(reload_at), actor));
    // blocked
    actions.push(Action::fire(Tick(reload_at + 1), actor));
    actions.push(Action::fire(Tick(reload_done), actor));
    actions.retain(|action| action.target_tick.0 <= last);
    actions
}

fn sweep_script(
    player: &PlayerSpawn,
    content: &ContentParams,
    config: &KernelConfig,
    last: u64,
) -> Vec<Action> {
    let weapon = &content.weapon;
    let eye = Vec3::new(
        player.position.x,
        player.position.y + config.eye_height,
        player.position.z,
    );

    let mut actions = Vec::new();
    let (mut yaw, mut pitch) = (player.yaw, player.pitch);
    let mut magazine = weapon.magazine_size;
    let mut reserve = weapon.starting_reserve;
    let mut tick = 1u64;

    for target in &content.targets {
        let (aim_yaw, aim_pitch) = aim_at(eye, target.position);
        actions.push(Action::look(
            Tick(tick),
            player.id,
            aim_yaw - yaw,
            aim_pitch - pitch,
        ));
        (yaw, pitch) = (aim_yaw, aim_pitch);

        let mut remaining = target.hp;
        while remaining > 0 && tick <= last {
            if magazine == 0 {
                if reserve == 0 {
                    return actions;
                }
                actions.push(Action::reload(Tick(tick), player.id));
                let transferred = weapon.magazine_size.min(reserve);
                magazine += transferred;
                reserve -= transferred;
                tick += u64::from(weapon.reload_ticks);
                continue;
            }

            actions.push(Action::fire(Tick(tick), player.id));
            magazine -= 1;
            remaining -= weapon.damage.max(1);
            tick += 1;
        }
    }

    actions.retain(|action| action.target_tick.0 <= last);
    actions
}

/// Look angles that put `target` under the crosshair from `eye`.
fn aim_at(eye: Vec3, target: Vec3) -> (f32, f32) {
    let dx = target.x - eye.x;
    let dy = target.y - eye.y;
    let dz = target.z - eye.z;
    let yaw = (-dz).atan2(dx);
    let pitch = dy.atan2((dx * dx + dz * dz).sqrt());
    (yaw, pitch)
}

/// Demo range used when no content directory is configured.
pub fn demo_content() -> ContentParams {
    ContentParams::new(
        WeaponDef {
            weapon_id: 1000,
            magazine_size: 12,
            starting_reserve: 120,
            damage: 10,
            max_range: 100.0,
            reload_ticks: 30,
        },
        Some(PlayerSpawn {
            id: EntityId(1),
            archetype_id: 1,
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            hp: 100,
        }),
        vec![TargetSpawn {
            id: EntityId(2),
            archetype_id: 2,
            position: Vec3::new(5.0, KernelConfig::DEFAULT_EYE_HEIGHT, 0.0),
            orientation: Quat::IDENTITY,
            hp: 50,
            radius: 0.5,
        }],
    )
}

#[cfg(test)]
mod tests {
    use axiom_core::{CreateParams, EventKind, Kernel, OwnedActionBatch, Snapshot};

    use super::*;

    fn lane() -> ContentParams {
        let mut content = demo_content();
        content.targets.extend([
            TargetSpawn {
                id: EntityId(3),
                archetype_id: 2,
                position: Vec3::new(12.0, 1.6, 2.0),
                orientation: Quat::IDENTITY,
                hp: 80,
                radius: 0.5,
            },
            TargetSpawn {
                id: EntityId(4),
                archetype_id: 3,
                position: Vec3::new(30.0, 1.6, -4.0),
                orientation: Quat::IDENTITY,
                hp: 200,
                radius: 1.0,
            },
        ]);
        content
    }

    fn run(content: &ContentParams, scenario: Scenario, ticks: u32) -> Kernel {
        let mut kernel = Kernel::create(Some(&CreateParams::default())).unwrap();
        kernel.load_content(Some(content)).unwrap();
        let actions = scenario.actions(content, kernel.config(), ticks).unwrap();
        let batch = OwnedActionBatch::from_actions(&actions);
        kernel.submit_actions(Some(&batch.as_batch())).unwrap();
        kernel.step_ticks(ticks).unwrap();
        kernel
    }

    #[test]
    fn scenario_names_parse() {
        assert_eq!("sweep".parse::<Scenario>().unwrap(), Scenario::Sweep);
        assert_eq!("RELOAD".parse::<Scenario>().unwrap(), Scenario::Reload);
        assert!("strafe".parse::<Scenario>().is_err());
        assert_eq!(Scenario::default().to_string(), "fire");
    }

    #[test]
    fn fire_destroys_the_demo_target() {
        let kernel = run(&demo_content(), Scenario::Fire, 20);
        let snapshot = Snapshot::parse(&kernel.snapshot_vec().unwrap()).unwrap();
        assert!(snapshot.entity(EntityId(2)).unwrap().is_dead());
        assert_eq!(snapshot.weapon.unwrap().ammo_in_mag, 7);
    }

    #[test]
    fn reload_scenario_blocks_then_fires_again() {
        let content = demo_content();
        let ticks = 4 + content.weapon.reload_ticks;
        let kernel = run(&content, Scenario::Reload, ticks);

        let weapon = Snapshot::parse(&kernel.snapshot_vec().unwrap())
            .unwrap()
            .weapon
            .unwrap();
        assert_eq!((weapon.ammo_in_mag, weapon.ammo_reserve), (11, 117));
        assert_eq!(kernel.events()[0].kind, EventKind::Damage);
    }

    #[test]
    fn sweep_destroys_every_target() {
        let kernel = run(&lane(), Scenario::Sweep, 150);
        let snapshot = Snapshot::parse(&kernel.snapshot_vec().unwrap()).unwrap();
        for id in [2, 3, 4] {
            assert!(snapshot.entity(EntityId(id)).unwrap().is_dead(), "target {id}");
        }
    }

    #[test]
    fn scenarios_need_a_player() {
        let mut content = demo_content();
        content.player = None;
        let config = KernelConfig::default();
        assert!(Scenario::Fire.actions(&content, &config, 10).is_err());
    }
}
