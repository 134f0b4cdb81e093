//! Contact identity, life cycle, and tangential history bookkeeping.

use crowd_types::AgentId;
use hashbrown::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identity of a potential contact between two surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ContactKey {
    /// Contact between one shape of each of two agents.
    AgentAgent {
        /// The pair's owner (lower agent id).
        first: AgentId,
        /// Shape index on the owner.
        first_shape: usize,
        /// The other agent.
        second: AgentId,
        /// Shape index on the other agent.
        second_shape: usize,
    },
    /// Contact between an agent shape and one wall segment.
    AgentWall {
        /// The agent.
        agent: AgentId,
        /// Shape index on the agent.
        shape: usize,
        /// Index of the obstacle.
        obstacle: usize,
        /// Index of the segment within the obstacle.
        segment: usize,
    },
}

/// Life cycle of a contact pair.
///
/// `Absent → Touching` on first overlap; `Touching ↔ Sliding` by the
/// Coulomb-cone test; any overlap loss transitions to `Released`, which
/// destroys the tangential accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ContactState {
    /// No overlap and no history.
    #[default]
    Absent,
    /// Overlapping; the tangential force is inside the Coulomb cone.
    Touching,
    /// Overlapping; the tangential force is clamped to the cone boundary.
    Sliding,
    /// Overlap just lost; the accumulator has been discarded.
    Released,
}

/// Per-macro-step store of tangential displacement accumulators.
///
/// An entry lives while its contact overlaps and persists across sub-steps
/// within the macro step; losing the overlap destroys it. The ledger itself
/// is dropped at the end of the macro step, together with the neighbor
/// lists it shadows.
#[derive(Debug, Clone, Default)]
pub struct TangentialLedger {
    accumulators: HashMap<ContactKey, f64>,
}

impl TangentialLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated tangential displacement for `key`, if the contact is live.
    #[must_use]
    pub fn get(&self, key: &ContactKey) -> Option<f64> {
        self.accumulators.get(key).copied()
    }

    /// Store the accumulator for `key`.
    pub fn set(&mut self, key: ContactKey, value: f64) {
        self.accumulators.insert(key, value);
    }

    /// Drop the accumulator for `key`, returning whether one existed.
    pub fn release(&mut self, key: &ContactKey) -> bool {
        self.accumulators.remove(key).is_some()
    }

    /// Number of live contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accumulators.len()
    }

    /// Whether any contact is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accumulators.is_empty()
    }
}
