//! Result codes and the kernel error type.
//!
//! Every kernel operation returns `Result<T, KernelError>`. Each error variant
//! maps onto exactly one [`ResultCode`], the small closed set of codes a caller
//! on the other side of the boundary can rely on. The `Display` text is the
//! best-effort diagnostic string and is not part of the logic contract.
//!
//! # Taxonomy
//!
//! - **Structural**: malformed, undersized or unversioned requests. Rejected
//!   before any state is touched.
//! - **State**: wrong lifecycle phase or unsupported version. The request was
//!   well formed but cannot be served now.
//! - **Data**: corrupt or mismatched save content. Rejected only after full
//!   validation, so the live world is never partially mutated.
//! - **Internal**: invariant violations inside the kernel.

use crate::abi::StructKind;
use crate::state::{EntityId, Tick};

/// Closed set of result codes surfaced at the boundary.
///
/// The numeric values are part of the ABI and never change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[repr(u32)]
pub enum ResultCode {
    Ok = 0,
    InvalidArgument = 1,
    Unsupported = 2,
    BufferTooSmall = 3,
    Internal = 4,
    Io = 5,
    BadState = 6,
    ParseFailed = 7,
}

impl ResultCode {
    /// Returns the numeric wire value of this code.
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Collapses an operation result into its boundary code.
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(error) => error.code(),
        }
    }
}

/// Error classification following the kernel's failure taxonomy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed request; the caller asked incorrectly.
    Structural,
    /// Well-formed request that cannot be served in the current state.
    State,
    /// Corrupt or mismatched persisted data.
    Data,
    /// Kernel invariant violated.
    Internal,
}

impl ErrorClass {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::State => "state",
            Self::Data => "data",
            Self::Internal => "internal",
        }
    }
}

/// Errors surfaced by kernel operations.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("{0} is missing")]
    MissingArgument(&'static str),

    #[error("{kind} declares {declared} bytes, at least {required} required")]
    StructTooSmall {
        kind: StructKind,
        declared: u32,
        required: u32,
    },

    #[error("{kind} schema major version {found} is not supported (expected {expected})")]
    UnsupportedStructVersion {
        kind: StructKind,
        found: u16,
        expected: u16,
    },

    #[error("caller ABI major version {caller} does not match kernel ABI major {kernel}")]
    AbiMismatch { caller: u16, kernel: u16 },

    #[error("invalid action batch: {0}")]
    InvalidBatch(&'static str),

    #[error("action {index}: unknown action type {tag}")]
    UnknownActionType { index: usize, tag: u16 },

    #[error("action {index}: non-finite payload value")]
    NonFinitePayload { index: usize },

    #[error("action {index}: target tick 0 is never executed")]
    ZeroTargetTick { index: usize },

    #[error("action queue capacity {capacity} exceeded ({queued} queued, {incoming} incoming)")]
    QueueFull {
        capacity: usize,
        queued: usize,
        incoming: usize,
    },

    #[error("invalid kernel config: {0}")]
    InvalidConfig(&'static str),

    #[error("invalid content: {0}")]
    InvalidContent(String),

    #[error("operation '{operation}' is not allowed in the {lifecycle} state")]
    BadState {
        operation: &'static str,
        lifecycle: &'static str,
    },

    #[error("destination buffer holds {provided} bytes, {required} required")]
    BufferTooSmall { required: u32, provided: u32 },

    #[error("blob too large to describe with 32-bit sizes ({0} bytes)")]
    BlobTooLarge(usize),

    #[error("{what}: {detail}")]
    Parse {
        what: &'static str,
        detail: String,
    },

    #[error("save major version {found} is not supported (kernel reads major {supported})")]
    UnsupportedSaveVersion { found: u16, supported: u16 },

    #[error("save checksum mismatch (stored {stored:#010x}, computed {computed:#010x})")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("save does not match loaded content: {0}")]
    ContentMismatch(String),

    #[error("save references unknown target {0}")]
    UnknownSavedTarget(EntityId),

    #[error("advancing tick {tick} by {ticks} overflows the tick counter")]
    TickOverflow { tick: Tick, ticks: u64 },

    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl KernelError {
    pub(crate) fn parse(what: &'static str, detail: impl Into<String>) -> Self {
        Self::Parse {
            what,
            detail: detail.into(),
        }
    }

    /// Returns the boundary result code for this error.
    pub fn code(&self) -> ResultCode {
        use KernelError::*;
        match self {
            MissingArgument(_)
            | StructTooSmall { .. }
            | InvalidBatch(_)
            | UnknownActionType { .. }
            | NonFinitePayload { .. }
            | ZeroTargetTick { .. }
            | QueueFull { .. }
            | InvalidConfig(_)
            | InvalidContent(_) => ResultCode::InvalidArgument,

            UnsupportedStructVersion { .. }
            | AbiMismatch { .. }
            | UnsupportedSaveVersion { .. } => ResultCode::Unsupported,

            BadState { .. }
            | TickOverflow { .. }
            | ContentMismatch(_)
            | UnknownSavedTarget(_) => ResultCode::BadState,

            BufferTooSmall { .. } => ResultCode::BufferTooSmall,

            Parse { .. } | ChecksumMismatch { .. } => ResultCode::ParseFailed,

            BlobTooLarge(_) | Internal(_) => ResultCode::Internal,
        }
    }

    /// Returns the taxonomy class of this error.
    pub fn class(&self) -> ErrorClass {
        use KernelError::*;
        match self {
            MissingArgument(_)
            | StructTooSmall { .. }
            | InvalidBatch(_)
            | UnknownActionType { .. }
            | NonFinitePayload { .. }
            | ZeroTargetTick { .. }
            | QueueFull { .. }
            | InvalidConfig(_)
            | InvalidContent(_)
            | BufferTooSmall { .. } => ErrorClass::Structural,

            UnsupportedStructVersion { .. }
            | AbiMismatch { .. }
            | UnsupportedSaveVersion { .. }
            | BadState { .. }
            | TickOverflow { .. } => ErrorClass::State,

            Parse { .. } | ChecksumMismatch { .. } | ContentMismatch(_) | UnknownSavedTarget(_) => {
                ErrorClass::Data
            }

            BlobTooLarge(_) | Internal(_) => ErrorClass::Internal,
        }
    }

    /// Returns a static identifier for this error variant.
    pub const fn error_code(&self) -> &'static str {
        use KernelError::*;
        match self {
            MissingArgument(_) => "KERNEL_MISSING_ARGUMENT",
            StructTooSmall { .. } => "KERNEL_STRUCT_TOO_SMALL",
            UnsupportedStructVersion { .. } => "KERNEL_UNSUPPORTED_STRUCT_VERSION",
            AbiMismatch { .. } => "KERNEL_ABI_MISMATCH",
            InvalidBatch(_) => "ACTION_INVALID_BATCH",
            UnknownActionType { .. } => "ACTION_UNKNOWN_TYPE",
            NonFinitePayload { .. } => "ACTION_NON_FINITE_PAYLOAD",
            ZeroTargetTick { .. } => "ACTION_ZERO_TARGET_TICK",
            QueueFull { .. } => "ACTION_QUEUE_FULL",
            InvalidConfig(_) => "KERNEL_INVALID_CONFIG",
            InvalidContent(_) => "CONTENT_INVALID",
            BadState { .. } => "KERNEL_BAD_STATE",
            TickOverflow { .. } => "KERNEL_TICK_OVERFLOW",
            BufferTooSmall { .. } => "BUFFER_TOO_SMALL",
            BlobTooLarge(_) => "BLOB_TOO_LARGE",
            Parse { .. } => "BLOB_PARSE_FAILED",
            UnsupportedSaveVersion { .. } => "SAVE_UNSUPPORTED_VERSION",
            ChecksumMismatch { .. } => "SAVE_CHECKSUM_MISMATCH",
            ContentMismatch(_) => "SAVE_CONTENT_MISMATCH",
            UnknownSavedTarget(_) => "SAVE_UNKNOWN_TARGET",
            Internal(_) => "KERNEL_INTERNAL",
        }
    }
}

pub type Result<T> = core::result::Result<T, KernelError>;
