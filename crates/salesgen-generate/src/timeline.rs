//! Sale timestamps.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

/// How timestamps are assigned to sales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TimestampMode {
    /// Each sale draws its own second uniformly from the window.
    #[default]
    Independent,
    /// Distinct seconds sampled without replacement and assigned in
    /// ascending order, so timestamps follow sale ids.
    DistinctSorted,
}

impl TimestampMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Independent => "independent",
            Self::DistinctSorted => "distinct_sorted",
        }
    }
}

/// Inclusive window `[start, end]` at second granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl DateWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, GenerationError> {
        if end <= start {
            return Err(GenerationError::Config(format!(
                "end ({end}) must be after start ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window between midnight of both dates.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, GenerationError> {
        Self::new(start.and_time(Default::default()), end.and_time(Default::default()))
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Number of distinct seconds in the window, both ends included.
    pub fn seconds(&self) -> u64 {
        (self.end - self.start).num_seconds() as u64 + 1
    }

    pub fn ensure_distinct_capacity(&self, count: u64) -> Result<(), GenerationError> {
        if count > self.seconds() {
            return Err(GenerationError::Config(format!(
                "{count} distinct timestamps requested but the window only has {} seconds",
                self.seconds()
            )));
        }
        Ok(())
    }

    fn at_offset(&self, offset: u64) -> NaiveDateTime {
        self.start + Duration::seconds(offset as i64)
    }
}

/// Timestamp source for one run.
#[derive(Debug)]
pub struct Timeline {
    window: DateWindow,
    rng: ChaCha8Rng,
    planned: Option<std::vec::IntoIter<u64>>,
}

impl Timeline {
    /// Prepare timestamps for `count` sales.
    ///
    /// In [`TimestampMode::DistinctSorted`] the offsets are drawn up front,
    /// which fails when the window is shorter than `count` seconds.
    pub fn plan(
        window: DateWindow,
        mode: TimestampMode,
        count: u64,
        mut rng: ChaCha8Rng,
    ) -> Result<Self, GenerationError> {
        let planned = match mode {
            TimestampMode::Independent => None,
            TimestampMode::DistinctSorted => {
                window.ensure_distinct_capacity(count)?;
                let length = usize::try_from(window.seconds()).map_err(|_| {
                    GenerationError::Config("date window is too large".to_string())
                })?;
                let amount = usize::try_from(count).map_err(|_| {
                    GenerationError::Config(format!("{count} sales do not fit in memory"))
                })?;
                let mut offsets: Vec<u64> = index::sample(&mut rng, length, amount)
                    .into_iter()
                    .map(|offset| offset as u64)
                    .collect();
                offsets.sort_unstable();
                Some(offsets.into_iter())
            }
        };
        Ok(Self {
            window,
            rng,
            planned,
        })
    }

    pub fn window(&self) -> DateWindow {
        self.window
    }

    /// Timestamp for the next sale.
    ///
    /// A planned timeline that runs out falls back to independent draws.
    pub fn next_timestamp(&mut self) -> NaiveDateTime {
        if let Some(offset) = self.planned.as_mut().and_then(Iterator::next) {
            return self.window.at_offset(offset);
        }
        let offset = self.rng.random_range(0..self.window.seconds());
        self.window.at_offset(offset)
    }
}
