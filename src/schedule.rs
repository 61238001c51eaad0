//! Schedule normalization
//!
//! Turns each entity's sparse `today` attribute into an ordered program list. Only start-times are
//! published upstream; every end-time is inferred from the next start, and the last program of a
//! channel runs until `24:00`.

use tracing::{debug, warn};

use crate::domain::{EpgSnapshot, Program, Schedule, TimeOfDay};
use crate::error::EpgError;
use crate::states::StateLookup;

/// Convert one schedule into programs in ascending start order.
///
/// Fails on the first key that is not a valid start-time; callers skip the whole entity.
pub fn normalize_schedule(schedule: &Schedule) -> Result<Vec<Program>, EpgError> {
    // BTreeMap iterates in string order, which is time order for strictly parsed keys.
    let starts = schedule
        .iter()
        .map(|(raw, descriptor)| TimeOfDay::parse_start(raw).map(|start| (start, descriptor)))
        .collect::<Result<Vec<_>, EpgError>>()?;

    let programs = starts
        .iter()
        .enumerate()
        .map(|(index, (start, descriptor))| Program {
            title: descriptor.title.clone(),
            description: descriptor.desc.clone(),
            start: *start,
            end: starts
                .get(index + 1)
                .map(|(next, _)| *next)
                .unwrap_or(TimeOfDay::END_OF_DAY),
        })
        .collect();

    Ok(programs)
}

/// Build the channel mapping for the configured entities.
///
/// Entities without state or without a schedule are left out. When two entities resolve to the
/// same display name the later one replaces the earlier one's programs, keeping the channel at the
/// position where the name first appeared.
pub fn build_snapshot(entity_ids: &[String], states: &impl StateLookup) -> EpgSnapshot {
    let mut snapshot = EpgSnapshot::new();

    for entity_id in entity_ids {
        let Some(state) = states.state(entity_id) else {
            continue;
        };
        let Some(schedule) = &state.attributes.today else {
            continue;
        };

        let programs = match normalize_schedule(schedule) {
            Ok(programs) => programs,
            Err(err) => {
                warn!(%entity_id, %err, "skipping entity with malformed schedule");
                continue;
            }
        };

        let name = state.display_name(entity_id).to_string();
        if let Some(previous) = snapshot.insert(name, programs) {
            debug!(%entity_id, replaced = previous.len(), "display name collision");
        }
    }

    snapshot
}
