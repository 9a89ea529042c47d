//! Logical audio cue groups

use serde::{Deserialize, Serialize};

/// A family of one-shot clips. The simulation only decides which group
/// plays; the audio backend picks the concrete clip inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OneShotGroup {
    A,
    B,
    C,
    D,
}

impl OneShotGroup {
    pub const ALL: [OneShotGroup; 4] = [
        OneShotGroup::A,
        OneShotGroup::B,
        OneShotGroup::C,
        OneShotGroup::D,
    ];

    /// Groups used for landing cues. `B` is reserved for rising petals.
    pub const GROUNDED: [OneShotGroup; 3] = [OneShotGroup::A, OneShotGroup::C, OneShotGroup::D];

    /// Stable slot index, used by backends that store clips per group
    pub fn slot(self) -> usize {
        match self {
            OneShotGroup::A => 0,
            OneShotGroup::B => 1,
            OneShotGroup::C => 2,
            OneShotGroup::D => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OneShotGroup::A => "a",
            OneShotGroup::B => "b",
            OneShotGroup::C => "c",
            OneShotGroup::D => "d",
        }
    }
}
