//! The kernel instance and its lifecycle-gated operations.
//!
//! Every fallible operation either succeeds or leaves the instance exactly
//! as it was before the call; failures are also recorded in the instance's
//! last-error string.

use crate::abi::wire::copy_out;
use crate::abi::{CreateParams, abi_version};
use crate::action::{ActionBatch, ActionQueue};
use crate::config::KernelConfig;
use crate::content::{ContentParams, ContentSet};
use crate::diagnostics::{BUILD_VERSION, Diagnostics, StateDigest, digest};
use crate::engine::{Event, EventLog, TickEngine};
use crate::error::{KernelError, Result};
use crate::save::{SAVE_MAJOR, SAVE_MINOR, SaveImage, SaveWriter};
use crate::snapshot::{SNAPSHOT_MAJOR, SnapshotWriter};
use crate::state::{Tick, WorldState};

/// Instance lifecycle: `Created -> ContentLoaded -> Running`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Lifecycle {
    Created,
    ContentLoaded,
    Running,
}

impl Lifecycle {
    pub fn has_content(self) -> bool {
        !matches!(self, Self::Created)
    }
}

/// Deterministic simulation kernel.
///
/// Owns truth exclusively; callers only ever receive copies (snapshot and
/// save blobs) and hand in transient request structs.
#[derive(Debug)]
pub struct Kernel {
    config: KernelConfig,
    lifecycle: Lifecycle,
    content: Option<ContentSet>,
    world: WorldState,
    queue: ActionQueue,
    events: EventLog,
    last_error: String,
}

impl Kernel {
    /// Creates a fresh, empty instance.
    pub fn create(params: Option<&CreateParams>) -> Result<Self> {
        let params = params.ok_or(KernelError::MissingArgument("create params"))?;
        params.validate()?;
        tracing::info!(abi = %abi_version(), build = BUILD_VERSION, "kernel created");
        Ok(Self {
            config: params.config.clone(),
            lifecycle: Lifecycle::Created,
            content: None,
            world: WorldState::empty(),
            queue: ActionQueue::new(),
            events: EventLog::new(),
            last_error: String::new(),
        })
    }

    /// Releases an instance; `None` is a no-op.
    pub fn destroy(kernel: Option<Kernel>) {
        if let Some(kernel) = kernel {
            tracing::info!(tick = %kernel.world.tick, "kernel destroyed");
        }
    }

    pub fn load_content(&mut self, params: Option<&ContentParams>) -> Result<()> {
        let result = self.try_load_content(params);
        self.record(result)
    }

    fn try_load_content(&mut self, params: Option<&ContentParams>) -> Result<()> {
        let params = params.ok_or(KernelError::MissingArgument("content params"))?;
        self.require(&[Lifecycle::Created], "load_content")?;
        let content = params.validate()?;

        self.world = WorldState::from_content(&content);
        self.events.clear();
        tracing::info!(
            entities = self.world.entities.len(),
            weapon = content.weapon.weapon_id,
            "content loaded"
        );
        self.content = Some(content);
        self.lifecycle = Lifecycle::ContentLoaded;
        Ok(())
    }

    /// Drops content and all world state, returning to `Created`. Always safe.
    pub fn unload_content(&mut self) {
        self.content = None;
        self.world = WorldState::empty();
        self.queue.clear();
        self.events.clear();
        if self.lifecycle != Lifecycle::Created {
            tracing::info!(from = %self.lifecycle, "content unloaded");
        }
        self.lifecycle = Lifecycle::Created;
    }

    /// Structurally validates and enqueues a batch for its recorded target
    /// ticks. Valid in every lifecycle state.
    pub fn submit_actions(&mut self, batch: Option<&ActionBatch<'_>>) -> Result<()> {
        let result = self.try_submit(batch, false);
        self.record(result)
    }

    /// Like [`Kernel::submit_actions`], but schedules every action for the
    /// next tick to execute.
    pub fn submit_actions_next_tick(&mut self, batch: Option<&ActionBatch<'_>>) -> Result<()> {
        let result = self.try_submit(batch, true);
        self.record(result)
    }

    fn try_submit(&mut self, batch: Option<&ActionBatch<'_>>, next_tick: bool) -> Result<()> {
        let batch = batch.ok_or(KernelError::MissingArgument("action batch"))?;
        let actions = if next_tick {
            let tick = self.world.tick;
            let stamp = tick
                .checked_add(1)
                .ok_or(KernelError::TickOverflow { tick, ticks: 1 })?;
            batch.decode_stamped(stamp)?
        } else {
            batch.decode()?
        };
        if actions.is_empty() {
            return Ok(());
        }

        let capacity = self.config.max_queued_actions;
        if self.queue.len() + actions.len() > capacity {
            return Err(KernelError::QueueFull {
                capacity,
                queued: self.queue.len(),
                incoming: actions.len(),
            });
        }
        tracing::trace!(count = actions.len(), queued = self.queue.len(), "actions accepted");
        self.queue.extend(actions);
        Ok(())
    }

    /// Advances the world by `ticks` steps; 0 is a no-op.
    pub fn step_ticks(&mut self, ticks: u32) -> Result<()> {
        let result = self.try_step(ticks);
        self.record(result)
    }

    fn try_step(&mut self, ticks: u32) -> Result<()> {
        self.require(&[Lifecycle::ContentLoaded, Lifecycle::Running], "step_ticks")?;
        if ticks == 0 {
            return Ok(());
        }
        let tick = self.world.tick;
        let ticks_wide = u64::from(ticks);
        if tick.checked_add(ticks_wide).is_none() {
            return Err(KernelError::TickOverflow {
                tick,
                ticks: ticks_wide,
            });
        }
        let content = self
            .content
            .as_ref()
            .ok_or(KernelError::Internal("content missing in a loaded state"))?;

        TickEngine::new(&self.config, content).step(
            ticks,
            &mut self.world,
            &mut self.queue,
            &mut self.events,
        );
        if self.lifecycle == Lifecycle::ContentLoaded {
            tracing::info!(tick = %self.world.tick, "simulation running");
            self.lifecycle = Lifecycle::Running;
        }
        Ok(())
    }

    /// Query-then-copy snapshot export.
    ///
    /// `size_out` always receives the required size, even when the call
    /// fails with `BufferTooSmall`.
    pub fn snapshot_bytes(&mut self, dst: Option<&mut [u8]>, size_out: &mut u32) -> Result<()> {
        let result = self
            .snapshot_vec()
            .and_then(|blob| copy_out(&blob, dst, size_out));
        self.record(result)
    }

    /// Encodes the current snapshot into a fresh buffer.
    pub fn snapshot_vec(&self) -> Result<Vec<u8>> {
        SnapshotWriter {
            world: &self.world,
            events: &self.events,
            weapon_def: self.content.as_ref().map(|content| &content.weapon),
        }
        .encode()
    }

    /// Query-then-copy save export. Requires loaded content.
    pub fn save_bytes(&mut self, dst: Option<&mut [u8]>, size_out: &mut u32) -> Result<()> {
        let result = self
            .save_vec()
            .and_then(|blob| copy_out(&blob, dst, size_out));
        self.record(result)
    }

    /// Encodes the current state as a save blob.
    pub fn save_vec(&self) -> Result<Vec<u8>> {
        self.require(&[Lifecycle::ContentLoaded, Lifecycle::Running], "save")?;
        let content = self
            .content
            .as_ref()
            .ok_or(KernelError::Internal("content missing in a loaded state"))?;
        SaveWriter {
            world: &self.world,
            weapon_def: &content.weapon,
        }
        .encode()
    }

    /// Restores a save blob over the loaded content.
    ///
    /// All validation finishes before anything is written; on failure the
    /// running world is untouched.
    pub fn load_save_bytes(&mut self, bytes: Option<&[u8]>) -> Result<()> {
        let result = self.try_load_save(bytes);
        if let Err(err) = &result {
            tracing::warn!(error = %err, code = err.error_code(), "save rejected");
        }
        self.record(result)
    }

    fn try_load_save(&mut self, bytes: Option<&[u8]>) -> Result<()> {
        let bytes = bytes
            .filter(|bytes| !bytes.is_empty())
            .ok_or(KernelError::MissingArgument("save bytes"))?;
        self.require(&[Lifecycle::ContentLoaded, Lifecycle::Running], "load_save")?;
        let content = self
            .content
            .as_ref()
            .ok_or(KernelError::Internal("content missing in a loaded state"))?;

        let image = SaveImage::decode(bytes)?;
        image.check_against(&self.world, content)?;

        let minor = image.minor;
        image.apply(&mut self.world);
        self.queue.clear();
        self.events.clear();
        self.lifecycle = Lifecycle::Running;
        tracing::info!(tick = %self.world.tick, minor, "save loaded");
        Ok(())
    }

    /// Human-readable text of the most recent failure, empty if none.
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn tick(&self) -> Tick {
        self.world.tick
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Number of actions waiting for a future tick.
    pub fn pending_actions(&self) -> usize {
        self.queue.len()
    }

    /// Events produced by the most recent tick.
    pub fn events(&self) -> &[Event] {
        self.events.as_slice()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            abi: abi_version(),
            build: BUILD_VERSION,
            snapshot_major: SNAPSHOT_MAJOR,
            save_major: SAVE_MAJOR,
            save_minor: SAVE_MINOR,
            tick: self.world.tick,
            lifecycle: self.lifecycle,
        }
    }

    /// SHA-256 of the current snapshot bytes.
    pub fn state_digest(&self) -> Result<StateDigest> {
        self.snapshot_vec().map(|blob| digest(&blob))
    }

    fn require(&self, allowed: &[Lifecycle], operation: &'static str) -> Result<()> {
        if allowed.contains(&self.lifecycle) {
            Ok(())
        } else {
            Err(KernelError::BadState {
                operation,
                lifecycle: self.lifecycle.into(),
            })
        }
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            tracing::debug!(error = %err, code = %err.code(), "kernel call failed");
            self.last_error = err.to_string();
        }
        result
    }
}
