//! One EPG card instance
//!
//! A card owns its configuration, the last fingerprint and the current snapshot. The host pushes
//! entity states through [`EpgCard::update`]; the snapshot is rebuilt wholesale only when the
//! fingerprint changes. Cards share nothing with each other.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use tracing::debug;

use crate::change::{ChangeDetector, Fingerprint};
use crate::config::CardConfig;
use crate::domain::{EpgSnapshot, Program};
use crate::error::Result;
use crate::grid::ColumnSpan;
use crate::schedule::build_snapshot;
use crate::states::StateLookup;
use crate::timeline::Timeline;

/// Layout hint reported to the host, in host grid rows.
pub const CARD_SIZE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing relevant changed; keep the current picture.
    Unchanged,
    /// Only the configuration changed; redraw from the retained snapshot.
    Redraw,
    /// The snapshot was rebuilt from new state.
    Rebuilt,
}

impl UpdateOutcome {
    pub fn needs_redraw(self) -> bool {
        !matches!(self, UpdateOutcome::Unchanged)
    }
}

#[derive(Debug, Clone)]
pub struct EpgCard {
    config: CardConfig,
    detector: ChangeDetector,
    snapshot: EpgSnapshot,
    config_changed: bool,
}

impl EpgCard {
    pub fn new(config: CardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            detector: ChangeDetector::new(),
            snapshot: EpgSnapshot::new(),
            config_changed: false,
        })
    }

    /// Replace the configuration. The next [`update`](Self::update) redraws at least.
    pub fn set_config(&mut self, config: CardConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        self.config_changed = true;
        Ok(())
    }

    pub fn update(&mut self, states: &impl StateLookup) -> UpdateOutcome {
        let config_changed = std::mem::take(&mut self.config_changed);
        let fingerprint = Fingerprint::capture(&self.config.entities, states);

        if self.detector.observe(fingerprint) {
            self.snapshot = build_snapshot(&self.config.entities, states);
            debug!(channels = self.snapshot.len(), "rebuilt epg snapshot");
            return UpdateOutcome::Rebuilt;
        }

        if config_changed {
            UpdateOutcome::Redraw
        } else {
            UpdateOutcome::Unchanged
        }
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &EpgSnapshot {
        &self.snapshot
    }

    pub fn card_size(&self) -> u32 {
        CARD_SIZE
    }

    pub fn layout(&self, now: NaiveTime) -> GridLayout {
        GridLayout::new(&self.snapshot, now, self.config.row_height)
    }
}

/// Timeline and snapshot for one instant, without any change tracking.
pub fn build_grid(
    config: &CardConfig,
    states: &impl StateLookup,
    now: NaiveTime,
) -> (Timeline, EpgSnapshot) {
    let timeline = Timeline::generate(now.hour());
    let snapshot = build_snapshot(&config.entities, states);
    (timeline, snapshot)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedProgram {
    #[serde(flatten)]
    pub program: Program,
    pub span: ColumnSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelLayout {
    pub name: String,
    pub programs: Vec<PlacedProgram>,
}

/// Everything a rendering surface needs to draw the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLayout {
    pub timeline: Timeline,
    pub column_count: usize,
    pub row_height: u32,
    pub card_size: u32,
    pub channels: Vec<ChannelLayout>,
}

impl GridLayout {
    pub fn new(snapshot: &EpgSnapshot, now: NaiveTime, row_height: u32) -> Self {
        let timeline = Timeline::generate(now.hour());
        let channels = snapshot
            .iter()
            .map(|(name, programs)| ChannelLayout {
                name: name.clone(),
                programs: programs
                    .iter()
                    .map(|program| PlacedProgram {
                        program: program.clone(),
                        span: ColumnSpan::for_program(program, now),
                    })
                    .collect(),
            })
            .collect();

        Self {
            column_count: timeline.column_count(),
            timeline,
            row_height,
            card_size: CARD_SIZE,
            channels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
