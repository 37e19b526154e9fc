use crate::state::Tick;

use super::Action;

/// Pending actions in submission order, keyed implicitly by target tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionQueue {
    pending: Vec<Action>,
}

/// Actions pulled from the queue for one tick.
#[derive(Debug, Default, PartialEq)]
pub struct DueActions {
    /// Actions targeting exactly the executing tick, in submission order.
    pub due: Vec<Action>,
    /// Actions whose target tick had already passed.
    pub stale: Vec<Action>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Appends a validated batch, keeping submission order.
    pub fn extend(&mut self, actions: Vec<Action>) {
        self.pending.extend(actions);
    }

    /// Removes and returns everything due at `tick` (and anything stale),
    /// leaving future actions queued in their original order.
    pub fn take_due(&mut self, tick: Tick) -> DueActions {
        let mut out = DueActions::default();
        if self.pending.is_empty() {
            return out;
        }
        let mut future = Vec::with_capacity(self.pending.len());
        for action in self.pending.drain(..) {
            if action.target_tick == tick {
                out.due.push(action);
            } else if action.target_tick < tick {
                out.stale.push(action);
            } else {
                future.push(action);
            }
        }
        self.pending = future;
        out
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.pending.iter()
    }
}
