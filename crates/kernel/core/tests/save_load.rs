mod common;

use std::collections::BTreeSet;

use axiom_core::{
    Action, ContentParams, EntityId, EventKind, Kernel, Lifecycle, OwnedActionBatch, ResultCode,
    SAVE_MAGIC, Tick,
};
use common::*;

const CHECKSUM: std::ops::Range<usize> = 24..28;

fn reseal(blob: &mut [u8]) {
    blob[CHECKSUM].fill(0);
    let crc = crc32fast::hash(blob);
    blob[CHECKSUM].copy_from_slice(&crc.to_le_bytes());
}

fn scenario() -> ContentParams {
    ContentParams::new(
        weapon(8, 24, 15),
        Some(player()),
        vec![target_at(2, 5.0, 30), target_at(3, 11.0, 45)],
    )
}

fn script() -> Vec<Action> {
    let mut actions = Vec::new();
    for t in 1..=30u64 {
        match t % 6 {
            0 => actions.push(Action::reload(Tick(t), PLAYER)),
            3 => actions.push(Action::look(Tick(t), PLAYER, 0.02, 0.01)),
            5 => actions.push(Action::crouch_toggle(Tick(t), PLAYER)),
            _ => actions.push(Action::fire(Tick(t), PLAYER)),
        }
    }
    actions
}

/// Snapshot bytes without the trailing event records.
fn logic_state(kernel: &Kernel) -> Vec<u8> {
    let mut blob = kernel.snapshot_vec().unwrap();
    let events = u32::from_le_bytes(blob[40..44].try_into().unwrap()) as usize;
    blob.truncate(blob.len() - events * 16);
    blob[8..12].fill(0);
    blob[40..44].fill(0);
    blob
}

#[test]
fn load_reproduces_the_saved_state() {
    let mut kernel = loaded(&scenario());
    submit(&mut kernel, &script());
    kernel.step_ticks(13).unwrap();
    let before = logic_state(&kernel);
    let blob = kernel.save_vec().unwrap();
    assert_eq!(u32::from_le_bytes(blob[0..4].try_into().unwrap()), SAVE_MAGIC);

    let mut restored = loaded(&scenario());
    restored.load_save_bytes(Some(blob.as_slice())).unwrap();

    assert_eq!(restored.lifecycle(), Lifecycle::Running);
    assert_eq!(restored.tick(), Tick(13));
    assert_eq!(logic_state(&restored), before);
    assert_eq!(restored.save_vec().unwrap(), blob);
}

#[test]
fn reload_in_progress_survives_a_round_trip() {
    let mut kernel = loaded(&scenario());
    submit(
        &mut kernel,
        &[Action::fire(Tick(1), PLAYER), Action::reload(Tick(2), PLAYER)],
    );
    kernel.step_ticks(2).unwrap();
    let blob = kernel.save_vec().unwrap();

    let mut restored = loaded(&scenario());
    restored.load_save_bytes(Some(blob.as_slice())).unwrap();
    let weapon = snapshot(&mut restored).weapon.unwrap();
    assert!(weapon.is_reloading());
    assert_eq!(weapon.reload_ticks_remaining, RELOAD_TICKS - 1);

    restored.step_ticks(RELOAD_TICKS - 1).unwrap();
    assert_eq!(restored.events()[0].kind, EventKind::ReloadComplete);
}

#[test]
fn continuing_after_a_round_trip_matches_an_uninterrupted_run() {
    let actions = script();
    const SPLIT: u64 = 11;
    const END: u32 = 30;

    let mut straight = loaded(&scenario());
    submit(&mut straight, &actions);
    let straight_log = run_collect(&mut straight, END);

    let mut first = loaded(&scenario());
    submit(&mut first, &actions);
    let mut split_log = run_collect(&mut first, SPLIT as u32);
    let blob = first.save_vec().unwrap();

    let mut second = loaded(&scenario());
    second.load_save_bytes(Some(blob.as_slice())).unwrap();
    let remaining: Vec<_> = actions
        .iter()
        .copied()
        .filter(|action| action.target_tick.0 > SPLIT)
        .collect();
    submit(&mut second, &remaining);
    split_log.extend(run_collect(&mut second, END - SPLIT as u32));

    let destroyed = |log: &[(Tick, Vec<axiom_core::Event>)]| -> BTreeSet<u32> {
        log.iter()
            .flat_map(|(_, events)| events.iter())
            .filter(|event| event.kind == EventKind::TargetDestroyed)
            .map(|event| event.secondary)
            .collect()
    };

    assert_eq!(total_damage(&split_log), total_damage(&straight_log));
    assert_eq!(destroyed(&split_log), destroyed(&straight_log));
    assert_eq!(
        count(&split_log, EventKind::FireBlocked),
        count(&straight_log, EventKind::FireBlocked)
    );
    assert_eq!(split_log, straight_log);
    assert_eq!(
        second.state_digest().unwrap(),
        straight.state_digest().unwrap()
    );
}

#[test]
fn successful_load_clears_queue_and_events() {
    let blob = loaded(&scenario()).save_vec().unwrap();

    let mut kernel = loaded(&scenario());
    submit(
        &mut kernel,
        &[Action::fire(Tick(1), PLAYER), Action::fire(Tick(5), PLAYER)],
    );
    kernel.step_ticks(1).unwrap();
    assert!(!kernel.events().is_empty());

    kernel.load_save_bytes(Some(blob.as_slice())).unwrap();
    assert!(kernel.events().is_empty());
    assert_eq!(kernel.pending_actions(), 0);
    assert_eq!(kernel.tick(), Tick::ZERO);
}

/// Every rejected blob must leave the running world untouched.
fn assert_rejected(kernel: &mut Kernel, blob: Option<&[u8]>, code: ResultCode) {
    let before = kernel.state_digest().unwrap();
    let tick = kernel.tick();
    let pending = kernel.pending_actions();

    let err = kernel.load_save_bytes(blob).unwrap_err();
    assert_eq!(err.code(), code, "{err}");
    assert!(!kernel.last_error().is_empty());
    assert_eq!(kernel.state_digest().unwrap(), before);
    assert_eq!(kernel.tick(), tick);
    assert_eq!(kernel.pending_actions(), pending);
}

fn running_kernel() -> Kernel {
    let mut kernel = loaded(&scenario());
    submit(
        &mut kernel,
        &[Action::fire(Tick(1), PLAYER), Action::fire(Tick(9), PLAYER)],
    );
    kernel.step_ticks(3).unwrap();
    kernel
}

fn good_blob() -> Vec<u8> {
    let mut donor = loaded(&scenario());
    submit(&mut donor, &[Action::fire(Tick(1), PLAYER)]);
    donor.step_ticks(2).unwrap();
    donor.save_vec().unwrap()
}

#[test]
fn corrupted_checksum_is_rejected_without_mutation() {
    let mut kernel = running_kernel();
    let mut blob = good_blob();
    let last = blob.len() - 1;
    blob[last] ^= 0x5A;
    assert_rejected(&mut kernel, Some(blob.as_slice()), ResultCode::ParseFailed);
}

#[test]
fn framing_errors_are_parse_failures() {
    let mut kernel = running_kernel();
    let blob = good_blob();

    assert_rejected(&mut kernel, Some(&blob[..20]), ResultCode::ParseFailed);
    assert_rejected(&mut kernel, Some(&blob[..blob.len() - 4]), ResultCode::ParseFailed);

    let mut bad_magic = blob.clone();
    bad_magic[0] = b'X';
    assert_rejected(&mut kernel, Some(bad_magic.as_slice()), ResultCode::ParseFailed);

    let mut out_of_bounds = blob.clone();
    // target_offset lives at world offset 32 + 72
    out_of_bounds[104..108].copy_from_slice(&10_000u32.to_le_bytes());
    reseal(&mut out_of_bounds);
    assert_rejected(&mut kernel, Some(out_of_bounds.as_slice()), ResultCode::ParseFailed);

    let mut negative_ammo = blob.clone();
    // ammo_in_mag lives at world offset 32 + 56
    negative_ammo[88..92].copy_from_slice(&(-3i32).to_le_bytes());
    reseal(&mut negative_ammo);
    assert_rejected(&mut kernel, Some(negative_ammo.as_slice()), ResultCode::ParseFailed);
}

#[test]
fn unsupported_major_is_rejected() {
    let mut kernel = running_kernel();
    let mut blob = good_blob();
    blob[4..6].copy_from_slice(&9u16.to_le_bytes());
    reseal(&mut blob);
    assert_rejected(&mut kernel, Some(blob.as_slice()), ResultCode::Unsupported);
}

#[test]
fn missing_or_empty_blob_is_invalid_argument() {
    let mut kernel = running_kernel();
    assert_rejected(&mut kernel, None, ResultCode::InvalidArgument);
    assert_rejected(&mut kernel, Some(&[][..]), ResultCode::InvalidArgument);
}

#[test]
fn save_for_different_content_is_bad_state() {
    let mut other = loaded(&ContentParams::new(
        weapon(8, 24, 15),
        Some(player()),
        vec![target_at(2, 5.0, 30), target_at(77, 11.0, 45)],
    ));
    other.step_ticks(1).unwrap();
    let foreign = other.save_vec().unwrap();

    let mut kernel = running_kernel();
    assert_rejected(&mut kernel, Some(foreign.as_slice()), ResultCode::BadState);

    let mut other_weapon = scenario();
    other_weapon.weapon.weapon_id = 2000;
    let foreign = loaded(&other_weapon).save_vec().unwrap();
    assert_rejected(&mut kernel, Some(foreign.as_slice()), ResultCode::BadState);
}

#[test]
fn minor_zero_saves_are_migrated() {
    let mut donor = loaded(&scenario());
    submit(
        &mut donor,
        &[
            Action::look(Tick(1), PLAYER, 0.4, 0.1),
            Action::fire(Tick(2), PLAYER),
        ],
    );
    donor.step_ticks(2).unwrap();
    let mut blob = donor.save_vec().unwrap();
    blob[6..8].copy_from_slice(&0u16.to_le_bytes());
    blob[20..24].copy_from_slice(&76u32.to_le_bytes());
    reseal(&mut blob);

    let mut kernel = loaded(&scenario());
    kernel.load_save_bytes(Some(blob.as_slice())).unwrap();
    assert_eq!(kernel.tick(), Tick(2));

    let restored = snapshot(&mut kernel);
    let original = snapshot(&mut donor);
    assert_eq!(restored.entity(PLAYER), original.entity(PLAYER));
    assert_eq!(restored.weapon, original.weapon);

    // Turning back by the same amount faces the original target again.
    submit(
        &mut kernel,
        &[
            Action::look(Tick(3), PLAYER, -0.4, -0.1),
            Action::fire(Tick(3), PLAYER),
        ],
    );
    kernel.step_ticks(1).unwrap();
    assert_eq!(kernel.events()[0].kind, EventKind::Damage);
    assert_eq!(kernel.events()[0].secondary, EntityId(2).0);
}

fn loaded_at_tick(tick: u64) -> Kernel {
    let mut blob = loaded(&scenario()).save_vec().unwrap();
    // the world chunk starts with the tick
    blob[32..40].copy_from_slice(&tick.to_le_bytes());
    reseal(&mut blob);

    let mut kernel = loaded(&scenario());
    kernel.load_save_bytes(Some(blob.as_slice())).unwrap();
    kernel
}

#[test]
fn stepping_past_the_last_tick_is_refused() {
    let mut kernel = loaded_at_tick(u64::MAX - 2);
    let before = kernel.state_digest().unwrap();

    let err = kernel.step_ticks(5).unwrap_err();
    assert_eq!(err.code(), ResultCode::BadState);
    assert_eq!(kernel.tick(), Tick(u64::MAX - 2));
    assert_eq!(kernel.state_digest().unwrap(), before);

    kernel.step_ticks(2).unwrap();
    assert_eq!(kernel.tick(), Tick(u64::MAX));
    assert_eq!(kernel.step_ticks(1).unwrap_err().code(), ResultCode::BadState);
    assert!(kernel.last_error().contains("overflows"));
    kernel.step_ticks(0).unwrap();
}

#[test]
fn next_tick_submission_at_the_last_tick_is_refused() {
    let mut kernel = loaded_at_tick(u64::MAX);
    let owned = OwnedActionBatch::from_actions(&[Action::fire(Tick::ZERO, PLAYER)]);

    let err = kernel
        .submit_actions_next_tick(Some(&owned.as_batch()))
        .unwrap_err();
    assert_eq!(err.code(), ResultCode::BadState);
    assert_eq!(kernel.pending_actions(), 0);
}
