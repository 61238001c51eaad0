//! Change detection over the entity fields that feed the grid

use crate::domain::Schedule;
use crate::states::StateLookup;

/// The inputs of one entity that matter for recomputation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityFingerprint {
    pub state: Option<String>,
    /// Absent and empty schedules compare equal.
    pub schedule: Schedule,
}

/// Relevant state of every configured entity, in configuration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(Vec<EntityFingerprint>);

impl Fingerprint {
    pub fn capture(entity_ids: &[String], states: &impl StateLookup) -> Self {
        Self(
            entity_ids
                .iter()
                .map(|entity_id| {
                    let state = states.state(entity_id);
                    EntityFingerprint {
                        state: state.and_then(|state| state.state.clone()),
                        schedule: state
                            .and_then(|state| state.attributes.today.clone())
                            .unwrap_or_default(),
                    }
                })
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    last: Option<Fingerprint>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `fingerprint`, returning whether it differs from the previous one.
    pub fn observe(&mut self, fingerprint: Fingerprint) -> bool {
        if self.last.as_ref() == Some(&fingerprint) {
            return false;
        }
        self.last = Some(fingerprint);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
