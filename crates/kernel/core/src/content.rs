//! Content definitions consumed by the kernel.
//!
//! Content is produced by an external loader (see the `axiom-content` crate)
//! and handed over as plain numeric definitions. The kernel copies and
//! validates it once in [`crate::Kernel::load_content`]; afterwards it is
//! immutable until the next unload.

use std::collections::BTreeSet;

use crate::abi::{StructHeader, StructKind};
use crate::error::{KernelError, Result};
use crate::state::{EntityId, HP_NOT_APPLICABLE, Quat, Vec3};

/// Longest reload a weapon may author; reload events carry the duration as `i32`.
pub const MAX_RELOAD_TICKS: u32 = i32::MAX as u32;

/// Authored weapon statistics.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponDef {
    pub weapon_id: u32,
    pub magazine_size: i32,
    pub starting_reserve: i32,
    /// Flat damage per hit.
    pub damage: i32,
    pub max_range: f32,
    /// Authored reload duration; the single source of reload timing.
    pub reload_ticks: u32,
}

/// Player spawn definition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerSpawn {
    pub id: EntityId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub archetype_id: u32,
    pub position: Vec3,
    #[cfg_attr(feature = "serde", serde(default))]
    pub yaw: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pitch: f32,
    /// Hit points, or -1 when not applicable.
    pub hp: i32,
}

/// Shootable target definition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetSpawn {
    pub id: EntityId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub archetype_id: u32,
    /// Center of the hit sphere.
    pub position: Vec3,
    #[cfg_attr(feature = "serde", serde(default))]
    pub orientation: Quat,
    pub hp: i32,
    pub radius: f32,
}

/// Boundary struct accepted by [`crate::Kernel::load_content`].
#[derive(Clone, Debug, PartialEq)]
pub struct ContentParams {
    pub header: StructHeader,
    pub weapon: WeaponDef,
    pub player: Option<PlayerSpawn>,
    pub targets: Vec<TargetSpawn>,
}

impl ContentParams {
    pub fn new(weapon: WeaponDef, player: Option<PlayerSpawn>, targets: Vec<TargetSpawn>) -> Self {
        Self {
            header: StructHeader::v1(StructKind::ContentParams),
            weapon,
            player,
            targets,
        }
    }

    /// Validates the params and produces the kernel-owned content copy.
    pub(crate) fn validate(&self) -> Result<ContentSet> {
        self.header.check(StructKind::ContentParams)?;
        validate_weapon(&self.weapon)?;

        let mut ids = BTreeSet::new();
        if let Some(player) = &self.player {
            validate_player(player)?;
            ids.insert(player.id);
        }
        for target in &self.targets {
            validate_target(target)?;
            if !ids.insert(target.id) {
                return Err(invalid(format!("duplicate entity id {}", target.id)));
            }
        }

        Ok(ContentSet {
            weapon: self.weapon.clone(),
            player: self.player.clone(),
            targets: self.targets.clone(),
        })
    }
}

/// Validated content owned by the kernel while in `ContentLoaded`/`Running`.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentSet {
    pub weapon: WeaponDef,
    pub player: Option<PlayerSpawn>,
    pub targets: Vec<TargetSpawn>,
}

fn invalid(detail: String) -> KernelError {
    KernelError::InvalidContent(detail)
}

fn validate_weapon(weapon: &WeaponDef) -> Result<()> {
    if weapon.magazine_size <= 0 {
        return Err(invalid(format!(
            "weapon {} magazine size must be positive",
            weapon.weapon_id
        )));
    }
    if weapon.starting_reserve < 0 || weapon.damage < 0 {
        return Err(invalid(format!(
            "weapon {} reserve and damage must be non-negative",
            weapon.weapon_id
        )));
    }
    if !weapon.max_range.is_finite() || weapon.max_range <= 0.0 {
        return Err(invalid(format!(
            "weapon {} max range must be finite and positive",
            weapon.weapon_id
        )));
    }
    if weapon.reload_ticks == 0 || weapon.reload_ticks > MAX_RELOAD_TICKS {
        return Err(invalid(format!(
            "weapon {} reload duration must be between 1 and {MAX_RELOAD_TICKS} ticks",
            weapon.weapon_id
        )));
    }
    Ok(())
}

fn validate_player(player: &PlayerSpawn) -> Result<()> {
    if player.id.is_none() {
        return Err(invalid("player id is the reserved sentinel".into()));
    }
    if !player.position.is_finite() || !player.yaw.is_finite() || !player.pitch.is_finite() {
        return Err(invalid(format!("player {} transform is not finite", player.id)));
    }
    if player.hp <= 0 && player.hp != HP_NOT_APPLICABLE {
        return Err(invalid(format!("player {} hp must be positive or -1", player.id)));
    }
    Ok(())
}

fn validate_target(target: &TargetSpawn) -> Result<()> {
    if target.id.is_none() {
        return Err(invalid("target id is the reserved sentinel".into()));
    }
    if !target.position.is_finite() || !target.orientation.is_finite() {
        return Err(invalid(format!("target {} transform is not finite", target.id)));
    }
    if target.hp <= 0 {
        return Err(invalid(format!("target {} hp must be positive", target.id)));
    }
    if !target.radius.is_finite() || target.radius <= 0.0 {
        return Err(invalid(format!(
            "target {} radius must be finite and positive",
            target.id
        )));
    }
    Ok(())
}
