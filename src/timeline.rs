//! Half-hour timeline header

use serde::Serialize;
use tracing::debug;

use crate::domain::TimeOfDay;

const HOURS_PER_DAY: u32 = 24;

/// Column header labels. Its length is the grid's column count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeline {
    labels: Vec<TimeOfDay>,
}

impl Timeline {
    /// Labels from `current_hour`'s `:00` up to and including the wrapped `00:00`/`00:30` pair
    /// after midnight, i.e. `2 * (25 - current_hour)` labels. Hours past 23 wrap for display only.
    pub fn generate(current_hour: u32) -> Self {
        let start_hour = current_hour.min(HOURS_PER_DAY - 1);
        let mut labels = Vec::with_capacity(2 * (HOURS_PER_DAY + 1 - start_hour) as usize);

        for offset in 0..=(HOURS_PER_DAY - start_hour) {
            let hour = (start_hour + offset) % HOURS_PER_DAY;
            for minute in [0, 30] {
                if let Some(label) = TimeOfDay::new(hour, minute) {
                    labels.push(label);
                }
            }
        }

        debug!(start_hour, columns = labels.len(), "generated timeline");
        Self { labels }
    }

    pub fn labels(&self) -> &[TimeOfDay] {
        &self.labels
    }

    pub fn column_count(&self) -> usize {
        self.labels.len()
    }
}
