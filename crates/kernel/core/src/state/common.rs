use core::fmt;

/// Stable identifier of a world entity, unique for the lifetime of the loaded world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntityId(pub u32);

impl EntityId {
    /// Sentinel used in persisted data for "no entity".
    pub const NONE: Self = Self(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete simulation step counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The tick that follows this one.
    #[inline]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// `self + ticks`, or `None` past `u64::MAX`.
    pub const fn checked_add(self, ticks: u64) -> Option<Self> {
        match self.0.checked_add(ticks) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Three-component vector in world space (Y up).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn from_array(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    #[inline]
    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    #[inline]
    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    #[inline]
    pub fn scale(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    #[inline]
    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Unit quaternion (x, y, z, w).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub const fn from_array(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Rotation by `yaw` about +Y followed by `pitch` about the local +Z axis.
    ///
    /// Equivalent to `q_yaw * q_pitch`; at zero angles the forward axis is +X.
    pub fn from_yaw_pitch(yaw: f32, pitch: f32) -> Self {
        let (sy, cy) = (yaw * 0.5).sin_cos();
        let (sp, cp) = (pitch * 0.5).sin_cos();
        Self::new(sy * sp, sy * cp, cy * sp, cy * cp)
    }

    /// Recovers `(yaw, pitch)` from a quaternion built by [`Quat::from_yaw_pitch`].
    pub fn to_yaw_pitch(self) -> (f32, f32) {
        let Self { x, y, z, w } = self;
        // forward = rotate(+X)
        let fx = 1.0 - 2.0 * (y * y + z * z);
        let fy = 2.0 * (x * y + w * z);
        let fz = 2.0 * (x * z - w * y);
        let pitch = fy.clamp(-1.0, 1.0).asin();
        let yaw = (-fz).atan2(fx);
        (yaw, pitch)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Unit forward vector for the given look angles (+X at zero yaw and pitch).
pub fn forward(yaw: f32, pitch: f32) -> Vec3 {
    let (sy, cy) = yaw.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    Vec3::new(cp * cy, sp, -cp * sy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn identity_angles_give_identity_quat() {
        assert_eq!(Quat::from_yaw_pitch(0.0, 0.0), Quat::IDENTITY);
        assert_eq!(forward(0.0, 0.0), Vec3::new(1.0, 0.0, -0.0));
    }

    #[test]
    fn yaw_pitch_round_trip_through_quat() {
        let (yaw, pitch) = (0.7, -0.3);
        let (y2, p2) = Quat::from_yaw_pitch(yaw, pitch).to_yaw_pitch();
        assert!(close(yaw, y2), "yaw {yaw} vs {y2}");
        assert!(close(pitch, p2), "pitch {pitch} vs {p2}");
    }

    #[test]
    fn forward_is_unit_length() {
        let f = forward(1.2, 0.4);
        assert!(close(f.dot(f), 1.0));
    }
}
