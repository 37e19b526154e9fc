//! Build/version identifiers and state digests for tooling.

use core::fmt;

use sha2::{Digest, Sha256};

use crate::abi::AbiVersion;
use crate::kernel::Lifecycle;
use crate::state::Tick;

/// Crate version baked in at compile time.
pub const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Non-authoritative report of versions and progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Diagnostics {
    pub abi: AbiVersion,
    pub build: &'static str,
    pub snapshot_major: u16,
    pub save_major: u16,
    pub save_minor: u16,
    pub tick: Tick,
    pub lifecycle: Lifecycle,
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "axiom-core {} (abi {}, snapshot v{}, save v{}.{}) tick {} [{}]",
            self.build,
            self.abi,
            self.snapshot_major,
            self.save_major,
            self.save_minor,
            self.tick,
            self.lifecycle
        )
    }
}

/// SHA-256 of a canonical byte blob.
pub type StateDigest = [u8; 32];

pub(crate) fn digest(bytes: &[u8]) -> StateDigest {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}
