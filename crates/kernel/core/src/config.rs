use crate::error::{KernelError, Result};

/// Kernel configuration constants and tunable simulation parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KernelConfig {
    /// Horizontal distance covered per tick by a full-magnitude move input.
    pub move_speed: f32,
    /// Speed multiplier while sprinting (ignored while crouched).
    pub sprint_multiplier: f32,
    /// Speed multiplier while crouched.
    pub crouch_multiplier: f32,
    /// Height of the ground plane actors are pinned to when moving.
    pub ground_y: f32,
    /// Eye height above the actor position used as the fire ray origin.
    pub eye_height: f32,
    /// Eye height while crouched.
    pub crouch_eye_height: f32,
    /// Absolute pitch limit in radians; keeps the view from inverting.
    pub pitch_limit: f32,
    /// Upper bound on actions waiting in the queue.
    pub max_queued_actions: usize,
}

impl KernelConfig {
    // ===== compile-time constants =====
    /// Only weapon slot 0 exists in v1.
    pub const WEAPON_SLOT_COUNT: u32 = 1;
    /// Sentinel entity id meaning "no entity" in persisted data.
    pub const NO_ENTITY: u32 = u32::MAX;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MOVE_SPEED: f32 = 0.1;
    pub const DEFAULT_SPRINT_MULTIPLIER: f32 = 1.5;
    pub const DEFAULT_CROUCH_MULTIPLIER: f32 = 0.5;
    pub const DEFAULT_GROUND_Y: f32 = 0.0;
    pub const DEFAULT_EYE_HEIGHT: f32 = 1.6;
    pub const DEFAULT_CROUCH_EYE_HEIGHT: f32 = 1.0;
    pub const DEFAULT_PITCH_LIMIT: f32 = 89.0 * core::f32::consts::PI / 180.0;
    pub const DEFAULT_MAX_QUEUED_ACTIONS: usize = 65_536;

    pub fn new() -> Self {
        Self {
            move_speed: Self::DEFAULT_MOVE_SPEED,
            sprint_multiplier: Self::DEFAULT_SPRINT_MULTIPLIER,
            crouch_multiplier: Self::DEFAULT_CROUCH_MULTIPLIER,
            ground_y: Self::DEFAULT_GROUND_Y,
            eye_height: Self::DEFAULT_EYE_HEIGHT,
            crouch_eye_height: Self::DEFAULT_CROUCH_EYE_HEIGHT,
            pitch_limit: Self::DEFAULT_PITCH_LIMIT,
            max_queued_actions: Self::DEFAULT_MAX_QUEUED_ACTIONS,
        }
    }

    pub fn with_max_queued_actions(mut self, max_queued_actions: usize) -> Self {
        self.max_queued_actions = max_queued_actions;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let scalars = [
            self.move_speed,
            self.sprint_multiplier,
            self.crouch_multiplier,
            self.ground_y,
            self.eye_height,
            self.crouch_eye_height,
            self.pitch_limit,
        ];
        if scalars.iter().any(|value| !value.is_finite()) {
            return Err(KernelError::InvalidConfig("non-finite value"));
        }
        if self.move_speed < 0.0 || self.sprint_multiplier < 0.0 || self.crouch_multiplier < 0.0 {
            return Err(KernelError::InvalidConfig("speeds must be non-negative"));
        }
        if !(0.0..core::f32::consts::FRAC_PI_2).contains(&self.pitch_limit) {
            return Err(KernelError::InvalidConfig("pitch limit must lie in [0, pi/2)"));
        }
        Ok(())
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::new()
    }
}
