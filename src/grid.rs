//! Time-to-column positioning
//!
//! Columns are 1-indexed half-hour slots counted from the current instant. A program occupies the
//! half-open column range `[start, end)`. Programs that began before now get zero or negative
//! columns; those pass through untouched and clipping is up to the rendering surface.

use chrono::NaiveTime;
use serde::Serialize;

use crate::clock::minutes_of_day;
use crate::domain::{Program, TimeOfDay};

const SLOT_MINUTES: i64 = 30;

/// Column of `time` relative to `now`. Both are read as the same calendar day.
pub fn column_index(time: TimeOfDay, now: NaiveTime) -> i64 {
    (time.minutes() - minutes_of_day(now)).div_euclid(SLOT_MINUTES) + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpan {
    pub start: i64,
    pub end: i64,
}

impl ColumnSpan {
    pub fn for_program(program: &Program, now: NaiveTime) -> Self {
        Self {
            start: column_index(program.start, now),
            end: column_index(program.end, now),
        }
    }

    pub fn width(self) -> i64 {
        self.end - self.start
    }

    /// The visible part of the span on a grid of `column_count` columns, if any.
    pub fn clip(self, column_count: usize) -> Option<ColumnSpan> {
        let last = i64::try_from(column_count).ok()? + 1;
        let start = self.start.max(1);
        let end = self.end.min(last);
        (start < end).then_some(ColumnSpan { start, end })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::{ColumnSpan, column_index};
    use crate::domain::{Program, TimeOfDay};

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
    }

    fn time(raw: &str) -> TimeOfDay {
        raw.parse().expect("valid time of day")
    }

    #[test]
    fn current_slot_is_column_one() {
        assert_eq!(column_index(time("08:00"), at(8, 0)), 1);
        assert_eq!(column_index(time("08:29"), at(8, 0)), 1);
        assert_eq!(column_index(time("08:30"), at(8, 0)), 2);
        assert_eq!(column_index(time("09:30"), at(8, 0)), 4);
    }

    #[test]
    fn past_times_are_not_clamped() {
        assert_eq!(column_index(time("07:59"), at(8, 0)), 0);
        assert_eq!(column_index(time("07:00"), at(8, 0)), -1);
        assert_eq!(column_index(time("00:00"), at(8, 15)), -16);
    }

    #[test]
    fn offsets_from_the_sampled_minute() {
        assert_eq!(column_index(time("08:00"), at(8, 10)), 0);
        assert_eq!(column_index(time("08:40"), at(8, 10)), 2);
        assert_eq!(column_index(TimeOfDay::END_OF_DAY, at(20, 0)), 9);
    }

    #[test]
    fn positions_are_monotonic() {
        let now = at(13, 17);
        let mut previous = i64::MIN;
        for minutes in 0..=(24 * 60) {
            let Some(time) = TimeOfDay::new(minutes / 60, minutes % 60) else {
                continue;
            };
            let column = column_index(time, now);
            assert!(column >= previous, "{time} went backwards");
            previous = column;
        }
    }

    #[test]
    fn program_span_covers_its_slots() {
        let program = Program {
            title: "A".to_string(),
            description: String::new(),
            start: time("08:00"),
            end: time("09:30"),
        };
        let span = ColumnSpan::for_program(&program, at(8, 0));
        assert_eq!(span, ColumnSpan { start: 1, end: 4 });
        assert_eq!(span.width(), 3);
    }

    #[test]
    fn clip_trims_to_visible_columns() {
        let span = ColumnSpan { start: -3, end: 4 };
        assert_eq!(span.clip(10), Some(ColumnSpan { start: 1, end: 4 }));

        let span = ColumnSpan { start: 8, end: 30 };
        assert_eq!(span.clip(10), Some(ColumnSpan { start: 8, end: 11 }));

        assert_eq!(ColumnSpan { start: -5, end: 1 }.clip(10), None);
        assert_eq!(ColumnSpan { start: 11, end: 12 }.clip(10), None);
    }
}
