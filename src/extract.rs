//! Single-channel trial extraction.
//!
//! A trial starts at every event whose code equals the start-of-trial
//! sentinel.  Its label is read from the *next* event of the log, its
//! window is `[position, position + duration)` of the sentinel event.
//!
//! Invalid trials are dropped without aborting the scan:
//!
//! * no event follows the sentinel → [`SkipReason::MissingLabelEvent`]
//! * the following code is not in the table → [`SkipReason::UnknownLabel`]
//! * the window does not fit in the signal → [`SkipReason::OutOfRange`]
//!
//! Each skip is logged at `debug` level; the returned [`TrialSet`] simply
//! holds fewer trials than there are sentinels.
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use ndarray::{s, Array1, Array2, ArrayView1};
use tracing::debug;

use crate::constants::describe;
use crate::error::{Error, Result};
use crate::events::{Event, EventLog};
use crate::table::EventCodeTable;

/// Why a start-of-trial marker produced no trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The marker is the last event of the log.
    MissingLabelEvent,
    /// The event after the marker has a code outside the table.
    UnknownLabel { code: i32 },
    /// `[start, stop)` is not inside `[0, n_samples]`.
    OutOfRange { start: i64, stop: i64, n_samples: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SkipReason::MissingLabelEvent => write!(f, "no event after start marker"),
            SkipReason::UnknownLabel { code } => match describe(code) {
                Some(name) => write!(f, "label code {code} ({name}) not in table"),
                None => write!(f, "label code {code} not in table"),
            },
            SkipReason::OutOfRange { start, stop, n_samples } => {
                write!(f, "window [{start}, {stop}) outside signal of {n_samples} samples")
            }
        }
    }
}

/// Result of checking one start marker.
#[derive(Debug, Clone)]
pub enum TrialOutcome<'s, 't> {
    Valid { trial: ArrayView1<'s, f32>, label: &'t str },
    Skipped(SkipReason),
}

impl TrialOutcome<'_, '_> {
    pub fn is_valid(&self) -> bool {
        matches!(self, TrialOutcome::Valid { .. })
    }
}

/// Sample range covered by the span of `ev`.
///
/// A non-positive duration gives an empty range at `start`; only the bounds
/// of the signal are enforced.
fn window(ev: Event, n_samples: usize) -> std::result::Result<Range<usize>, SkipReason> {
    let start = ev.position;
    let stop = start.checked_add(ev.duration);
    let out_of_range = SkipReason::OutOfRange {
        start,
        stop: stop.unwrap_or(i64::MAX),
        n_samples,
    };
    let stop = stop.ok_or(out_of_range)?;
    let n = i64::try_from(n_samples).unwrap_or(i64::MAX);
    if start < 0 || start > n || stop > n {
        return Err(out_of_range);
    }
    let start = start as usize;
    let stop = stop.max(start as i64) as usize;
    Ok(start..stop)
}

/// Check the start marker at `index` against `signal_row` and `table`.
///
/// `index` is expected to come from [`EventLog::start_indices`]; an index
/// past the end of the log is reported as [`SkipReason::MissingLabelEvent`].
pub fn assess_trial<'s, 't>(
    signal_row: ArrayView1<'s, f32>,
    events: &EventLog,
    table: &'t EventCodeTable,
    index: usize,
) -> TrialOutcome<'s, 't> {
    let cue = index.checked_add(1).and_then(|next| events.get(next));
    let (Some(marker), Some(cue)) = (events.get(index), cue) else {
        return TrialOutcome::Skipped(SkipReason::MissingLabelEvent);
    };
    let Some(label) = table.label(cue.code) else {
        return TrialOutcome::Skipped(SkipReason::UnknownLabel { code: cue.code });
    };
    match window(marker, signal_row.len()) {
        Ok(r) => TrialOutcome::Valid {
            trial: signal_row.slice_move(s![r]),
            label,
        },
        Err(reason) => TrialOutcome::Skipped(reason),
    }
}

/// Extract every valid trial of one channel.
///
/// Output order is the order of the start markers in the log.  Calling this
/// twice with the same inputs returns equal sets.
///
/// ```
/// use mitrials::{extract_trials, EventCodeTable, EventLog};
/// use ndarray::Array1;
///
/// let signal = Array1::from_iter((0..40).map(|v| v as f32));
/// let events = EventLog::new(
///     vec![768, 769, 768, 770],
///     vec![0, 10, 20, 30],
///     vec![5, 5, 5, 5],
/// ).unwrap();
/// let table = EventCodeTable::from_pairs([(769, "left"), (770, "right")]);
///
/// let set = extract_trials(signal.view(), &events, &table, 768);
/// assert_eq!(set.classes(), &["left", "right"]);
/// assert_eq!(set.trials()[1].to_vec(), vec![20.0, 21.0, 22.0, 23.0, 24.0]);
/// ```
pub fn extract_trials(
    signal_row: ArrayView1<f32>,
    events: &EventLog,
    table: &EventCodeTable,
    start_code: i32,
) -> TrialSet {
    let mut out = TrialSet::new();
    for index in events.start_indices(start_code) {
        match assess_trial(signal_row, events, table, index) {
            TrialOutcome::Valid { trial, label } => {
                out.push(index, trial.to_owned(), label.to_string());
            }
            TrialOutcome::Skipped(reason) => {
                debug!(event = index, %reason, "skipping trial");
            }
        }
    }
    out
}

/// Trials of one channel with their labels, in chronological order.
///
/// Trials and labels are only ever appended together, so `trials()[i]`
/// always belongs to `classes()[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialSet {
    trials: Vec<Array1<f32>>,
    classes: Vec<String>,
    event_indices: Vec<usize>,
}

impl TrialSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, event_index: usize, trial: Array1<f32>, label: String) {
        self.trials.push(trial);
        self.classes.push(label);
        self.event_indices.push(event_index);
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn trials(&self) -> &[Array1<f32>] {
        &self.trials
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Log index of the start marker each trial was cut from.
    pub fn event_indices(&self) -> &[usize] {
        &self.event_indices
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Array1<f32>, &str)> {
        self.trials.iter().zip(self.classes.iter().map(String::as_str))
    }

    pub fn into_parts(self) -> (Vec<Array1<f32>>, Vec<String>) {
        (self.trials, self.classes)
    }

    /// Number of trials per label.
    pub fn class_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for c in &self.classes {
            *counts.entry(c.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Concatenate the trials into `[n_trials, T]`.
    ///
    /// Fails with [`Error::RaggedTrials`] unless every trial has the same
    /// length.  An empty set stacks to a `[0, 0]` array.
    pub fn stack(&self) -> Result<Array2<f32>> {
        let n_t = uniform_len(self.trials.iter().map(|t| t.len()))?;
        Ok(Array2::from_shape_fn((self.trials.len(), n_t), |(i, t)| {
            self.trials[i][t]
        }))
    }
}

/// Common length of a sequence of trial lengths (0 if there are none).
pub(crate) fn uniform_len(lens: impl Iterator<Item = usize>) -> Result<usize> {
    let mut bounds: Option<(usize, usize)> = None;
    for n in lens {
        bounds = Some(match bounds {
            None => (n, n),
            Some((lo, hi)) => (lo.min(n), hi.max(n)),
        });
    }
    match bounds {
        None => Ok(0),
        Some((min, max)) if min == max => Ok(min),
        Some((min, max)) => Err(Error::RaggedTrials { min, max }),
    }
}
