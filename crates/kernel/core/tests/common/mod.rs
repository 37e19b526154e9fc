#![allow(dead_code)]

use axiom_core::{
    Action, ContentParams, CreateParams, EntityId, Event, EventKind, Kernel, KernelConfig,
    OwnedActionBatch, PlayerSpawn, Snapshot, TargetSpawn, Tick, Vec3, WeaponDef,
};

pub const PLAYER: EntityId = EntityId(1);
pub const TARGET: EntityId = EntityId(2);
pub const RELOAD_TICKS: u32 = 3;

pub fn weapon(magazine_size: i32, starting_reserve: i32, damage: i32) -> WeaponDef {
    WeaponDef {
        weapon_id: 1000,
        magazine_size,
        starting_reserve,
        damage,
        max_range: 100.0,
        reload_ticks: RELOAD_TICKS,
    }
}

pub fn target_at(id: u32, x: f32, hp: i32) -> TargetSpawn {
    TargetSpawn {
        id: EntityId(id),
        archetype_id: 0,
        position: Vec3::new(x, KernelConfig::DEFAULT_EYE_HEIGHT, 0.0),
        orientation: Default::default(),
        hp,
        radius: 0.5,
    }
}

pub fn player() -> PlayerSpawn {
    PlayerSpawn {
        id: PLAYER,
        archetype_id: 0,
        position: Vec3::ZERO,
        yaw: 0.0,
        pitch: 0.0,
        hp: 100,
    }
}

/// Player at the origin facing one target straight ahead.
pub fn content(weapon: WeaponDef, target_hp: i32) -> ContentParams {
    ContentParams::new(weapon, Some(player()), vec![target_at(TARGET.0, 5.0, target_hp)])
}

pub fn new_kernel() -> Kernel {
    Kernel::create(Some(&CreateParams::default())).expect("default params are valid")
}

pub fn loaded(params: &ContentParams) -> Kernel {
    let mut kernel = new_kernel();
    kernel.load_content(Some(params)).expect("content loads");
    kernel
}

pub fn submit(kernel: &mut Kernel, actions: &[Action]) {
    let batch = OwnedActionBatch::from_actions(actions);
    kernel
        .submit_actions(Some(&batch.as_batch()))
        .expect("batch is structurally valid");
}

pub fn snapshot(kernel: &mut Kernel) -> Snapshot {
    let bytes = kernel.snapshot_vec().expect("snapshot encodes");
    Snapshot::parse(&bytes).expect("snapshot parses")
}

/// Steps one tick at a time and collects every tick's events.
pub fn run_collect(kernel: &mut Kernel, ticks: u32) -> Vec<(Tick, Vec<Event>)> {
    (0..ticks)
        .map(|_| {
            kernel.step_ticks(1).expect("step succeeds");
            (kernel.tick(), kernel.events().to_vec())
        })
        .collect()
}

pub fn count(log: &[(Tick, Vec<Event>)], kind: EventKind) -> usize {
    log.iter()
        .flat_map(|(_, events)| events.iter())
        .filter(|event| event.kind == kind)
        .count()
}

pub fn total_damage(log: &[(Tick, Vec<Event>)]) -> i32 {
    log.iter()
        .flat_map(|(_, events)| events.iter())
        .filter(|event| event.kind == EventKind::Damage)
        .map(|event| event.value)
        .sum()
}
