//! Electronic program guide grid layout.
//!
//! Turns per-entity "today" schedules into channel rows of programs placed on a half-hour
//! timeline that starts at the current hour.

pub mod card;
pub mod change;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod grid;
pub mod schedule;
pub mod states;
pub mod storage;
pub mod timeline;
pub mod tracing_ext;

pub use card::{CARD_SIZE, EpgCard, GridLayout, UpdateOutcome, build_grid};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CardConfig;
pub use domain::{EntityState, EpgSnapshot, Program, TimeOfDay};
pub use error::{EpgError, Result};
pub use grid::{ColumnSpan, column_index};
pub use states::{EntityStates, StateLookup};
pub use timeline::Timeline;
