use crate::ship::InstanceId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Disposition of one entity toward another, ordered worst to best.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum Attitude {
    Hostile,
    Cold,
    Neutral,
    Friendly,
}

/// Per-object standing table: a default attitude plus per-instance overrides.
#[derive(Clone, Debug)]
pub struct AttitudeSet {
    default: Attitude,
    overrides: HashMap<InstanceId, Attitude>,
}

impl AttitudeSet {
    pub fn new(default: Attitude) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn get_attitude(&self, id: InstanceId) -> Attitude {
        *self.overrides.get(&id).unwrap_or(&self.default)
    }

    pub fn set_attitude(&mut self, id: InstanceId, attitude: Attitude) {
        self.overrides.insert(id, attitude);
    }

    pub fn set_default(&mut self, attitude: Attitude) {
        self.default = attitude;
    }
}

impl Default for AttitudeSet {
    fn default() -> Self {
        AttitudeSet::new(Attitude::Neutral)
    }
}
