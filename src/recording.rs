//! A continuous multi-channel recording with its event log.
use ndarray::Array2;
use std::path::Path;

use crate::constants::DEFAULT_SFREQ;
use crate::error::Result;
use crate::events::EventLog;

/// Input to extraction.  Never modified by it.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// `[C, T]` samples, rows are channels.
    pub signal: Array2<f32>,
    pub events: EventLog,
    /// Per-trial artifact flags as stored in the source file.  Carried
    /// through untouched; extraction does not read them.
    pub artifacts: Option<Vec<u8>>,
    /// Sampling rate in Hz.  Only used to express sample counts in seconds.
    pub sfreq: f32,
}

impl Recording {
    pub fn new(signal: Array2<f32>, events: EventLog) -> Self {
        Self { signal, events, artifacts: None, sfreq: DEFAULT_SFREQ }
    }

    pub fn with_artifacts(mut self, artifacts: Vec<u8>) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn with_sfreq(mut self, sfreq: f32) -> Self {
        self.sfreq = sfreq;
        self
    }

    /// Read a recording in the dataset layout.
    ///
    /// `.npz` goes through [`crate::npz`], anything else through the
    /// safetensors reader in [`crate::io`].  A path without extension gets
    /// `.npz` appended, so `Recording::load("A01T")` opens `A01T.npz`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            None => crate::npz::load_npz(&path.with_extension("npz")),
            Some(ext) if ext.eq_ignore_ascii_case("npz") => crate::npz::load_npz(path),
            Some(_) => crate::io::load_recording(path),
        }
    }

    pub fn n_channels(&self) -> usize {
        self.signal.nrows()
    }

    pub fn n_samples(&self) -> usize {
        self.signal.ncols()
    }

    pub fn samples_to_secs(&self, n: usize) -> f32 {
        n as f32 / self.sfreq
    }
}
