//! Deterministic, tick-based simulation kernel.
//!
//! `axiom-core` owns authoritative world state, accepts typed actions through
//! versioned boundary structs, advances the world in discrete ticks and
//! exports read-only snapshot and save blobs. All mutation flows through
//! [`Kernel`]; identical content plus an identical action sequence always
//! yields the identical sequence of events.
pub mod abi;
pub mod action;
pub mod config;
pub mod content;
pub mod diagnostics;
pub mod engine;
pub mod error;
mod kernel;
pub mod save;
pub mod snapshot;
pub mod state;

pub use abi::{
    ABI_MAJOR, ABI_MINOR, AbiVersion, CreateParams, StructHeader, StructKind, abi_version,
};
pub use action::{
    ACTION_RECORD_V1_SIZE, Action, ActionBatch, ActionKind, ActionType, OwnedActionBatch,
};
pub use config::KernelConfig;
pub use content::{ContentParams, PlayerSpawn, TargetSpawn, WeaponDef};
pub use diagnostics::{BUILD_VERSION, Diagnostics, StateDigest};
pub use engine::{BlockReason, Event, EventKind};
pub use error::{ErrorClass, KernelError, Result, ResultCode};
pub use kernel::{Kernel, Lifecycle};
pub use save::{SAVE_MAGIC, SAVE_MAJOR, SAVE_MINOR};
pub use snapshot::{EntitySnapshot, SNAPSHOT_MAGIC, SNAPSHOT_MAJOR, Snapshot, WeaponSnapshot};
pub use state::{EntityFlags, EntityId, Quat, Tick, Vec3};
