use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::EpgError;

const MINUTES_PER_HOUR: i64 = 60;

/// A zero-padded `HH:MM` wall-clock time within a single day.
///
/// `24:00` is reserved for the synthesized end of the last program of a channel and is never
/// accepted as a start-time. Ordering matches the string order of the zero-padded form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub const END_OF_DAY: TimeOfDay = TimeOfDay {
        hour: 24,
        minute: 0,
    };

    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        let in_day = hour < 24 && minute < 60;
        let end_of_day = hour == 24 && minute == 0;
        (in_day || end_of_day).then_some(Self { hour, minute })
    }

    /// Parses a schedule key. Rejects the end-of-day sentinel.
    pub fn parse_start(raw: &str) -> Result<Self, EpgError> {
        let time: TimeOfDay = raw.parse()?;
        if time.is_end_of_day() {
            return Err(EpgError::InvalidTime(raw.to_string()));
        }
        Ok(time)
    }

    pub fn from_time(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
        }
    }

    pub fn hour(self) -> u32 {
        self.hour
    }

    pub fn minute(self) -> u32 {
        self.minute
    }

    pub fn minutes(self) -> i64 {
        i64::from(self.hour) * MINUTES_PER_HOUR + i64::from(self.minute)
    }

    pub fn is_end_of_day(self) -> bool {
        self == Self::END_OF_DAY
    }
}

impl FromStr for TimeOfDay {
    type Err = EpgError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || EpgError::InvalidTime(raw.to_string());
        let bytes = raw.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }

        let two_digits = |pair: &[u8]| -> Option<u32> {
            if pair.iter().all(u8::is_ascii_digit) {
                Some(u32::from(pair[0] - b'0') * 10 + u32::from(pair[1] - b'0'))
            } else {
                None
            }
        };

        let hour = two_digits(&bytes[0..2]).ok_or_else(invalid)?;
        let minute = two_digits(&bytes[3..5]).ok_or_else(invalid)?;
        TimeOfDay::new(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = EpgError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One entry of an entity's `today` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDescriptor {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub desc: String,
}

/// Start-time key to program, as pushed by the host. Keys are untrusted.
pub type Schedule = BTreeMap<String, ProgramDescriptor>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityAttributes {
    #[serde(default, deserialize_with = "string_or_none")]
    pub friendly_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_schedule")]
    pub today: Option<Schedule>,
}

/// Host-side state of one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    #[serde(default)]
    pub entity_id: String,
    #[serde(default, deserialize_with = "string_or_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub attributes: EntityAttributes,
}

impl EntityState {
    /// Channel key: the friendly name, falling back to the entity identifier.
    pub fn display_name<'a>(&'a self, entity_id: &'a str) -> &'a str {
        self.attributes
            .friendly_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(entity_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    pub title: String,
    pub description: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

// Attributes are written by every integration on the host. Values of an unexpected shape read as
// absent.

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(Some(value)),
        _ => Ok(None),
    }
}

/// A `today` attribute that is not an object is some other integration's data, not a schedule.
fn lenient_schedule<'de, D>(deserializer: D) -> Result<Option<Schedule>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }

    match serde_json::from_value(value) {
        Ok(schedule) => Ok(Some(schedule)),
        Err(err) => {
            warn!(%err, "ignoring malformed schedule");
            Ok(None)
        }
    }
}

/// Channel name to programs in start order. Iterates in the order channels were first seen.
pub type EpgSnapshot = IndexMap<String, Vec<Program>>;
