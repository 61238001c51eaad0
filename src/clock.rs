use chrono::{Local, NaiveTime};

use crate::domain::TimeOfDay;

/// Source of the current wall-clock time.
///
/// Sample once per recomputation and pass the result along, so a pass that straddles a minute
/// boundary stays consistent.
pub trait Clock {
    fn now(&self) -> NaiveTime;
}

/// Local wall-clock time. No timezone conversion happens beyond what the OS reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

/// Minutes since midnight, ignoring seconds.
pub fn minutes_of_day(time: NaiveTime) -> i64 {
    TimeOfDay::from_time(time).minutes()
}
