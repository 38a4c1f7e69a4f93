//! Multi-channel extraction.
//!
//! Two modes:
//!
//! * [`extract_trials_multi_channel`] runs [`extract_trials`] independently
//!   for each channel.  Trial counts may differ between channels.
//! * [`extract_trials_aligned`] keeps a trial only if it is valid on every
//!   requested channel, and returns one `[C, T]` block per trial.  Use it
//!   whenever channels are stacked into a single tensor.
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::events::EventLog;
use crate::extract::{assess_trial, extract_trials, uniform_len, TrialOutcome, TrialSet};
use crate::table::EventCodeTable;

/// One [`TrialSet`] per entry of `channels`, in the same order.
///
/// A channel index outside `signal` yields an empty set.
pub fn extract_trials_multi_channel(
    signal: ArrayView2<f32>,
    channels: &[usize],
    events: &EventLog,
    table: &EventCodeTable,
    start_code: i32,
) -> Vec<TrialSet> {
    let n_markers = events.count(start_code);
    channels
        .iter()
        .map(|&ch| {
            if ch >= signal.nrows() {
                warn!(channel = ch, n_channels = signal.nrows(), "channel not in recording");
                return TrialSet::new();
            }
            let set = extract_trials(signal.row(ch), events, table, start_code);
            info!(
                channel = ch,
                trials = set.len(),
                skipped = n_markers - set.len(),
                "extracted trials"
            );
            set
        })
        .collect()
}

/// Split per-channel sets into `(trials_by_channel, classes_by_channel)`.
pub fn unzip_channels(sets: Vec<TrialSet>) -> (Vec<Vec<Array1<f32>>>, Vec<Vec<String>>) {
    sets.into_iter().map(TrialSet::into_parts).unzip()
}

/// Trials valid on all requested channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedTrials {
    channels: Vec<usize>,
    trials: Vec<Array2<f32>>,
    classes: Vec<String>,
    event_indices: Vec<usize>,
}

impl AlignedTrials {
    pub fn channels(&self) -> &[usize] {
        &self.channels
    }

    /// `[C, T]` per trial, rows in `channels()` order.
    pub fn trials(&self) -> &[Array2<f32>] {
        &self.trials
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn event_indices(&self) -> &[usize] {
        &self.event_indices
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Stack into `[E, C, T]`; fails if trial lengths differ.
    pub fn to_tensor(&self) -> Result<Array3<f32>> {
        let n_t = uniform_len(self.trials.iter().map(|t| t.ncols()))?;
        let shape = (self.trials.len(), self.channels.len(), n_t);
        Ok(Array3::from_shape_fn(shape, |(e, c, t)| self.trials[e][[c, t]]))
    }

    /// Per-channel view in the permissive layout.
    pub fn to_trial_sets(&self) -> Vec<TrialSet> {
        (0..self.channels.len())
            .map(|c| {
                let mut set = TrialSet::new();
                for ((trial, label), &index) in
                    self.trials.iter().zip(&self.classes).zip(&self.event_indices)
                {
                    set.push(index, trial.row(c).to_owned(), label.clone());
                }
                set
            })
            .collect()
    }
}

/// Extract trials that are valid on every channel in `channels`.
///
/// A start marker rejected on any channel is dropped on all of them, so the
/// i-th trial is the same event for every row.  An empty channel list, or a
/// channel outside `signal`, yields no trials.
pub fn extract_trials_aligned(
    signal: ArrayView2<f32>,
    channels: &[usize],
    events: &EventLog,
    table: &EventCodeTable,
    start_code: i32,
) -> AlignedTrials {
    let mut out = AlignedTrials {
        channels: channels.to_vec(),
        ..AlignedTrials::default()
    };
    if channels.is_empty() {
        return out;
    }
    if let Some(&ch) = channels.iter().find(|&&ch| ch >= signal.nrows()) {
        warn!(channel = ch, n_channels = signal.nrows(), "channel not in recording");
        return out;
    }

    'markers: for index in events.start_indices(start_code) {
        let mut rows: Vec<ArrayView1<f32>> = Vec::with_capacity(channels.len());
        let mut label = "";
        for &ch in channels {
            match assess_trial(signal.row(ch), events, table, index) {
                TrialOutcome::Valid { trial, label: l } => {
                    rows.push(trial);
                    label = l;
                }
                TrialOutcome::Skipped(reason) => {
                    debug!(event = index, channel = ch, %reason, "dropping trial on all channels");
                    continue 'markers;
                }
            }
        }
        let n_t = rows[0].len();
        if rows.iter().any(|r| r.len() != n_t) {
            debug!(event = index, "channel windows disagree in length, dropping trial");
            continue;
        }
        out.trials
            .push(Array2::from_shape_fn((rows.len(), n_t), |(c, t)| rows[c][t]));
        out.classes.push(label.to_string());
        out.event_indices.push(index);
    }

    info!(
        channels = channels.len(),
        trials = out.trials.len(),
        markers = events.count(start_code),
        "extracted aligned trials"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal() -> Array2<f32> {
        Array2::from_shape_fn((4, 60), |(c, t)| (c * 100 + t) as f32)
    }

    fn events() -> EventLog {
        EventLog::new(
            vec![768, 769, 768, 1023, 768, 772],
            vec![0, 2, 20, 22, 40, 42],
            vec![10, 0, 10, 0, 10, 0],
        )
        .unwrap()
    }

    #[test]
    fn permissive_keeps_channel_order() {
        let sig = signal();
        let sets = extract_trials_multi_channel(
            sig.view(),
            &[3, 1],
            &events(),
            &EventCodeTable::default(),
            768,
        );
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].trials()[0][0], 300.0);
        assert_eq!(sets[1].trials()[0][0], 100.0);
        assert_eq!(sets[0].classes(), &["left", "tongue"]);
    }

    #[test]
    fn permissive_unknown_channel_is_empty() {
        let sig = signal();
        let sets = extract_trials_multi_channel(
            sig.view(),
            &[0, 9],
            &events(),
            &EventCodeTable::default(),
            768,
        );
        assert_eq!(sets[0].len(), 2);
        assert!(sets[1].is_empty());
    }

    #[test]
    fn aligned_builds_channel_blocks() {
        let sig = signal();
        let aligned =
            extract_trials_aligned(sig.view(), &[0, 2], &events(), &EventCodeTable::default(), 768);
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned.event_indices(), &[0, 4]);
        assert_eq!(aligned.trials()[1].dim(), (2, 10));
        assert_eq!(aligned.trials()[1][[1, 0]], 240.0);

        let tensor = aligned.to_tensor().unwrap();
        assert_eq!(tensor.dim(), (2, 2, 10));
        assert_eq!(tensor[[0, 1, 3]], 203.0);
    }

    #[test]
    fn aligned_with_missing_channel_is_empty() {
        let sig = signal();
        let aligned =
            extract_trials_aligned(sig.view(), &[0, 7], &events(), &EventCodeTable::default(), 768);
        assert!(aligned.is_empty());
        assert_eq!(aligned.channels(), &[0, 7]);
        assert!(extract_trials_aligned(sig.view(), &[], &events(), &EventCodeTable::default(), 768)
            .is_empty());
    }

    #[test]
    fn aligned_round_trips_to_trial_sets() {
        let sig = signal();
        let table = EventCodeTable::default();
        let aligned = extract_trials_aligned(sig.view(), &[1, 2], &events(), &table, 768);
        let per_channel = extract_trials_multi_channel(sig.view(), &[1, 2], &events(), &table, 768);
        assert_eq!(aligned.to_trial_sets(), per_channel);
    }

    #[test]
    fn unzip_gives_parallel_lists() {
        let sig = signal();
        let sets = extract_trials_multi_channel(
            sig.view(),
            &[0, 1, 2],
            &events(),
            &EventCodeTable::default(),
            768,
        );
        let (trials, classes) = unzip_channels(sets);
        assert_eq!(trials.len(), 3);
        assert_eq!(classes.len(), 3);
        for (t, c) in trials.iter().zip(&classes) {
            assert_eq!(t.len(), c.len());
        }
    }
}
