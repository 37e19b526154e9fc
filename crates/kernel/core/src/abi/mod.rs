//! Versioned boundary types.
//!
//! Every struct that crosses the kernel boundary carries a [`StructHeader`]
//! with its own schema version and declared byte size. The kernel rejects an
//! unrecognized major version and any declared size smaller than its own v1
//! expectation, while accepting larger sizes and newer minors so that callers
//! built against a newer, additively extended schema keep working.

pub(crate) mod wire;

use core::fmt;

use crate::config::KernelConfig;
use crate::error::{KernelError, Result};

/// Kernel ABI major version. Callers with a different major are rejected.
pub const ABI_MAJOR: u16 = 1;
/// Kernel ABI minor version. Minor bumps are additive only.
pub const ABI_MINOR: u16 = 1;

/// Major/minor version pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbiVersion {
    pub major: u16,
    pub minor: u16,
}

impl AbiVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for AbiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Returns the ABI version implemented by this kernel build.
pub const fn abi_version() -> AbiVersion {
    AbiVersion::new(ABI_MAJOR, ABI_MINOR)
}

/// Identifies a boundary struct in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StructKind {
    CreateParams,
    ContentParams,
    ActionBatch,
}

impl StructKind {
    /// Schema major version the kernel understands for this struct.
    pub const fn supported_major(self) -> u16 {
        1
    }

    /// Declared byte size of the v1 schema.
    pub const fn v1_size(self) -> u32 {
        match self {
            // header + caller ABI version + reserved
            Self::CreateParams => 16,
            // header + target count + reserved
            Self::ContentParams => 16,
            // header + count + stride + actions handle
            Self::ActionBatch => 24,
        }
    }
}

/// Schema version and declared size carried by every boundary struct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StructHeader {
    pub major: u16,
    pub minor: u16,
    pub size_bytes: u32,
}

impl StructHeader {
    /// Header for the current (v1) schema of `kind`.
    pub const fn v1(kind: StructKind) -> Self {
        Self {
            major: 1,
            minor: 0,
            size_bytes: kind.v1_size(),
        }
    }

    /// Validates the header against the kernel's expectation for `kind`.
    ///
    /// The size check runs first: a truncated struct cannot be trusted to
    /// carry a meaningful version.
    pub fn check(&self, kind: StructKind) -> Result<()> {
        if self.size_bytes < kind.v1_size() {
            return Err(KernelError::StructTooSmall {
                kind,
                declared: self.size_bytes,
                required: kind.v1_size(),
            });
        }
        if self.major != kind.supported_major() {
            return Err(KernelError::UnsupportedStructVersion {
                kind,
                found: self.major,
                expected: kind.supported_major(),
            });
        }
        Ok(())
    }
}

/// Parameters accepted by [`crate::Kernel::create`].
#[derive(Clone, Debug, PartialEq)]
pub struct CreateParams {
    pub header: StructHeader,
    /// ABI version the caller was compiled against.
    pub caller_abi: AbiVersion,
    /// Simulation tunables; `KernelConfig::default()` matches the shipped game.
    pub config: KernelConfig,
}

impl CreateParams {
    pub fn new(config: KernelConfig) -> Self {
        Self {
            header: StructHeader::v1(StructKind::CreateParams),
            caller_abi: abi_version(),
            config,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.header.check(StructKind::CreateParams)?;
        if self.caller_abi.major != ABI_MAJOR {
            return Err(KernelError::AbiMismatch {
                caller: self.caller_abi.major,
                kernel: ABI_MAJOR,
            });
        }
        self.config.validate()
    }
}

impl Default for CreateParams {
    fn default() -> Self {
        Self::new(KernelConfig::default())
    }
}
