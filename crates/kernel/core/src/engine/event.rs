use crate::state::EntityId;

/// Wire tag of an event record.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::FromRepr,
)]
#[strum(serialize_all = "snake_case")]
#[repr(u16)]
pub enum EventKind {
    /// `secondary` = target, `value` = damage applied.
    Damage = 1,
    /// `secondary` = weapon slot, `value` = countdown in ticks.
    ReloadStarted = 2,
    /// `secondary` = weapon slot, `value` = rounds moved into the magazine.
    ReloadComplete = 3,
    /// `secondary` = target, `value` = remaining hp.
    TargetDestroyed = 4,
    /// `secondary` = weapon slot, `value` = [`BlockReason`] code.
    FireBlocked = 5,
}

/// Why a fire action did not produce a shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[strum(serialize_all = "snake_case")]
#[repr(i32)]
pub enum BlockReason {
    Reloading = 1,
    EmptyMagazine = 2,
}

/// Immutable record of something the tick engine did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Event {
    pub kind: EventKind,
    pub actor: EntityId,
    pub secondary: u32,
    pub value: i32,
}

impl Event {
    pub const fn new(kind: EventKind, actor: EntityId, secondary: u32, value: i32) -> Self {
        Self {
            kind,
            actor,
            secondary,
            value,
        }
    }

    pub const fn damage(actor: EntityId, target: EntityId, amount: i32) -> Self {
        Self::new(EventKind::Damage, actor, target.0, amount)
    }

    pub const fn destroyed(actor: EntityId, target: EntityId, remaining_hp: i32) -> Self {
        Self::new(EventKind::TargetDestroyed, actor, target.0, remaining_hp)
    }

    pub const fn reload_started(actor: EntityId, slot: u32, ticks: u32) -> Self {
        let ticks = if ticks > i32::MAX as u32 {
            i32::MAX
        } else {
            ticks as i32
        };
        Self::new(EventKind::ReloadStarted, actor, slot, ticks)
    }

    pub const fn reload_complete(actor: EntityId, slot: u32, transferred: i32) -> Self {
        Self::new(EventKind::ReloadComplete, actor, slot, transferred)
    }

    pub const fn fire_blocked(actor: EntityId, slot: u32, reason: BlockReason) -> Self {
        Self::new(EventKind::FireBlocked, actor, slot, reason as i32)
    }

    /// Block reason of a `FireBlocked` event.
    pub fn block_reason(&self) -> Option<BlockReason> {
        match self.kind {
            EventKind::FireBlocked => BlockReason::from_repr(self.value),
            _ => None,
        }
    }
}

/// Events produced by the most recent tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        tracing::trace!(kind = %event.kind, actor = %event.actor, value = event.value, "event");
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
