//! # mitrials — motor-imagery trial extraction
//!
//! Cuts labelled trials out of a continuous multi-channel EEG recording
//! using the event log stored alongside it (BCI Competition IV 2a layout).
//!
//! ## How a trial is found
//!
//! ```text
//! etyp   … 768   769   …   768   1023  …   768   772   …
//! epos   … 9000  9500  …   11000 11500 …   13000 13500 …
//! edur   … 1875  0     …   1875  0     …   1875  0     …
//!          │     └─ label "left"   │     └─ not in table   │     └─ label "tongue"
//!          └─ s[ch, 9000..10875]   └─ skipped              └─ s[ch, 13000..14875]
//! ```
//!
//! Every event equal to the start code opens a trial.  The label comes from
//! the *next* event, the window is `[epos, epos + edur)` of the start event.
//! Trials whose label is unknown, or whose window leaves the signal, are
//! dropped without disturbing the others.
//!
//! ## Quick start
//!
//! ```no_run
//! use mitrials::{extract, Extraction, ExtractConfig, Recording};
//!
//! let rec = Recording::load("A01T").unwrap();        // opens A01T.npz
//! let cfg = ExtractConfig::default();           // C3, Cz, C4; start code 768
//!
//! if let Extraction::PerChannel(sets) = extract(&rec, &cfg) {
//!     for (ch, set) in cfg.channels.iter().zip(&sets) {
//!         println!("channel {ch}: {} trials {:?}", set.len(), set.class_counts());
//!     }
//! }
//! ```
//!
//! ## Single channel
//!
//! ```
//! use mitrials::{extract_trials, EventCodeTable, EventLog};
//! use ndarray::Array1;
//!
//! let row = Array1::<f32>::zeros(100);
//! let events = EventLog::new(vec![768, 770], vec![10, 12], vec![50, 0]).unwrap();
//! let set = extract_trials(row.view(), &events, &EventCodeTable::default(), 768);
//!
//! let (trials, classes) = set.into_parts();
//! assert_eq!(classes, vec!["right"]);
//! assert_eq!(trials[0].len(), 50);
//! ```

pub mod channels;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod extract;
pub mod io;
pub mod npz;
pub mod recording;
pub mod table;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use channels::{
    extract_trials_aligned, extract_trials_multi_channel, unzip_channels, AlignedTrials,
};
pub use config::ExtractConfig;
pub use constants::{describe, DEFAULT_SFREQ, EVENT_START_OF_TRIAL};
pub use error::{Error, Result};
pub use events::{Event, EventLog};
pub use extract::{assess_trial, extract_trials, SkipReason, TrialOutcome, TrialSet};
pub use io::{load_recording, read_recording, write_recording, write_trials, StWriter};
pub use npz::{load_npz, read_npz};
pub use recording::Recording;
pub use table::EventCodeTable;

/// Output of [`extract`], depending on [`ExtractConfig::strict`].
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// One independent set per requested channel, in request order.
    PerChannel(Vec<TrialSet>),
    /// Trials valid on every requested channel.
    Aligned(AlignedTrials),
}

impl Extraction {
    /// Per-channel sets regardless of mode.
    pub fn into_trial_sets(self) -> Vec<TrialSet> {
        match self {
            Extraction::PerChannel(sets) => sets,
            Extraction::Aligned(aligned) => aligned.to_trial_sets(),
        }
    }
}

/// Extract the trials of `cfg.channels` from `rec`.
///
/// Never fails: malformed trials are skipped (and logged at `debug`), an
/// empty log or signal gives empty output.
pub fn extract(rec: &Recording, cfg: &ExtractConfig) -> Extraction {
    let signal = rec.signal.view();
    if cfg.strict {
        Extraction::Aligned(extract_trials_aligned(
            signal,
            &cfg.channels,
            &rec.events,
            &cfg.table,
            cfg.start_code,
        ))
    } else {
        Extraction::PerChannel(extract_trials_multi_channel(
            signal,
            &cfg.channels,
            &rec.events,
            &cfg.table,
            cfg.start_code,
        ))
    }
}
