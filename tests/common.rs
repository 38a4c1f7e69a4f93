/// Shared helpers: synthetic recordings in the 2a layout.
use mitrials::{Event, EventLog, Recording};
use ndarray::{Array1, Array2};

pub const TRIAL_LEN: i64 = 1875; // 7.5 s @ 250 Hz

/// Signal where `signal[c, t] == c * 100_000 + t`, so every slice identifies
/// its own channel and offset.
#[allow(unused)]
pub fn tagged_signal(n_ch: usize, n_t: usize) -> Array2<f32> {
    Array2::from_shape_fn((n_ch, n_t), |(c, t)| (c * 100_000 + t) as f32)
}

#[allow(unused)]
pub fn ramp(n: usize) -> Array1<f32> {
    Array1::from_iter((0..n).map(|v| v as f32))
}

#[allow(unused)]
pub fn log(types: &[i32], pos: &[i64], dur: &[i64]) -> EventLog {
    EventLog::new(types.to_vec(), pos.to_vec(), dur.to_vec()).unwrap()
}

/// A run of `cues.len()` trials laid out like a 2a session:
/// `32766` at 0, then per trial `768` followed by its cue 500 samples
/// later, trials 2000 samples apart.  `None` cue means "rejected"
/// (`1023` after the start marker).
#[allow(unused)]
pub fn session(n_ch: usize, cues: &[Option<i32>]) -> Recording {
    let mut events = vec![Event { code: 32766, position: 0, duration: 0 }];
    for (i, cue) in cues.iter().enumerate() {
        let start = 1000 + i as i64 * 2000;
        events.push(Event { code: 768, position: start, duration: TRIAL_LEN });
        events.push(Event { code: cue.unwrap_or(1023), position: start + 500, duration: 0 });
    }
    let n_t = 1000 + cues.len() * 2000;
    Recording::new(tagged_signal(n_ch, n_t), EventLog::from_events(events))
}
