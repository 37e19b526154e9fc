//! Versioned action batch descriptor and its structural validation.

use crate::abi::{StructHeader, StructKind};
use crate::error::{KernelError, Result};
use crate::state::Tick;

use super::Action;
use super::record::{self, ACTION_RECORD_V1_SIZE};

/// Borrowed batch descriptor: a header plus a fixed-stride record array.
#[derive(Clone, Copy, Debug)]
pub struct ActionBatch<'a> {
    pub header: StructHeader,
    pub action_count: u32,
    /// Must equal [`ACTION_RECORD_V1_SIZE`] for batch major version 1.
    pub action_stride_bytes: u32,
    /// `action_count * action_stride_bytes` bytes of records; may be absent
    /// only when `action_count` is zero.
    pub actions: Option<&'a [u8]>,
}

impl<'a> ActionBatch<'a> {
    /// Empty v1 batch.
    pub const fn empty() -> Self {
        Self {
            header: StructHeader::v1(StructKind::ActionBatch),
            action_count: 0,
            action_stride_bytes: ACTION_RECORD_V1_SIZE,
            actions: None,
        }
    }

    /// Structural validation only: header, array presence, stride, record
    /// tags and payload finiteness. Nothing here looks at world state.
    ///
    /// Returns the decoded actions in submission order, or the first
    /// failure; a batch is accepted or rejected as a whole.
    pub fn decode(&self) -> Result<Vec<Action>> {
        self.decode_with(None)
    }

    /// Same as [`ActionBatch::decode`], but every action is scheduled for
    /// `tick` regardless of its recorded target tick.
    pub fn decode_stamped(&self, tick: Tick) -> Result<Vec<Action>> {
        self.decode_with(Some(tick))
    }

    fn decode_with(&self, stamp: Option<Tick>) -> Result<Vec<Action>> {
        self.header.check(StructKind::ActionBatch)?;

        if self.action_stride_bytes != ACTION_RECORD_V1_SIZE {
            return Err(KernelError::InvalidBatch(
                "action stride must equal the v1 action record size",
            ));
        }
        if self.action_count == 0 {
            return Ok(Vec::new());
        }

        let bytes = self.actions.ok_or(KernelError::InvalidBatch(
            "action array is missing for a non-empty batch",
        ))?;
        let required = self.action_count as u64 * self.action_stride_bytes as u64;
        if (bytes.len() as u64) < required {
            return Err(KernelError::InvalidBatch(
                "action array is shorter than count * stride",
            ));
        }

        (0..self.action_count as usize)
            .map(|index| record::decode(bytes, index, stamp))
            .collect()
    }
}

/// Owned record buffer for callers that build batches from typed actions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OwnedActionBatch {
    bytes: Vec<u8>,
    count: u32,
}

impl OwnedActionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_actions(actions: &[Action]) -> Self {
        let mut batch = Self::new();
        for action in actions {
            batch.push(action);
        }
        batch
    }

    pub fn push(&mut self, action: &Action) {
        let start = self.bytes.len();
        self.bytes.resize(start + ACTION_RECORD_V1_SIZE as usize, 0);
        record::encode(action, &mut self.bytes[start..]);
        self.count += 1;
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Raw record bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Borrowed v1 descriptor over this buffer.
    pub fn as_batch(&self) -> ActionBatch<'_> {
        ActionBatch {
            header: StructHeader::v1(StructKind::ActionBatch),
            action_count: self.count,
            action_stride_bytes: ACTION_RECORD_V1_SIZE,
            actions: Some(self.bytes.as_slice()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResultCode;
    use crate::state::EntityId;

    #[test]
    fn empty_batch_is_trivially_valid() {
        assert_eq!(ActionBatch::empty().decode().unwrap(), Vec::new());
    }

    #[test]
    fn preserves_submission_order() {
        let actions = [
            Action::reload(Tick(2), EntityId(1)),
            Action::fire(Tick(2), EntityId(1)),
            Action::fire(Tick(1), EntityId(1)),
        ];
        let owned = OwnedActionBatch::from_actions(&actions);
        assert_eq!(owned.as_batch().decode().unwrap(), actions.to_vec());
    }

    #[test]
    fn rejects_wrong_stride() {
        let owned = OwnedActionBatch::from_actions(&[Action::fire(Tick(1), EntityId(1))]);
        let mut batch = owned.as_batch();
        batch.action_stride_bytes = 24;
        let err = batch.decode().unwrap_err();
        assert_eq!(err.code(), ResultCode::InvalidArgument);
    }

    #[test]
    fn rejects_missing_array_for_nonzero_count() {
        let mut batch = ActionBatch::empty();
        batch.action_count = 2;
        assert!(matches!(batch.decode(), Err(KernelError::InvalidBatch(_))));
    }

    #[test]
    fn rejects_truncated_array() {
        let owned = OwnedActionBatch::from_actions(&[Action::fire(Tick(1), EntityId(1))]);
        let mut batch = owned.as_batch();
        batch.action_count = 2;
        assert!(matches!(batch.decode(), Err(KernelError::InvalidBatch(_))));
    }

    #[test]
    fn one_bad_record_rejects_the_whole_batch() {
        let owned = OwnedActionBatch::from_actions(&[
            Action::fire(Tick(1), EntityId(1)),
            Action::move_to(Tick(1), EntityId(1), f32::NAN, 0.0),
        ]);
        assert_eq!(
            owned.as_batch().decode(),
            Err(KernelError::NonFinitePayload { index: 1 })
        );
    }

    #[test]
    fn rejects_unknown_batch_major() {
        let mut batch = ActionBatch::empty();
        batch.header.major = 9;
        assert_eq!(batch.decode().unwrap_err().code(), ResultCode::Unsupported);
    }
}
