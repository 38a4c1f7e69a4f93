//! Event codes of the BCI Competition IV 2a recordings.
//!
//! The values come from the dataset description (`desc_2a.pdf`, table 2).
//! Only the four cue codes and the unknown-cue code carry a class label; the
//! rest mark recording structure or artifacts.

/// Idling EEG, eyes open.
pub const EVENT_EYES_OPEN:         i32 = 276;
/// Idling EEG, eyes closed.
pub const EVENT_EYES_CLOSED:       i32 = 277;
/// Start of a trial.  The cue follows as the next event.
pub const EVENT_START_OF_TRIAL:    i32 = 768;
/// Cue onset left hand (class 1).
pub const EVENT_CUE_LEFT:          i32 = 769;
/// Cue onset right hand (class 2).
pub const EVENT_CUE_RIGHT:         i32 = 770;
/// Cue onset both feet (class 3).
pub const EVENT_CUE_FOOT:          i32 = 771;
/// Cue onset tongue (class 4).
pub const EVENT_CUE_TONGUE:        i32 = 772;
/// Cue unknown (evaluation sessions).
pub const EVENT_CUE_UNKNOWN:       i32 = 783;
/// Trial rejected by expert scoring.
pub const EVENT_REJECTED_TRIAL:    i32 = 1023;
/// Eye movements.
pub const EVENT_EYE_MOVEMENTS:     i32 = 1072;
/// Start of a new run.
pub const EVENT_START_OF_RUN:      i32 = 32766;

/// Sampling rate of the 2a recordings in Hz.
pub const DEFAULT_SFREQ: f32 = 250.0;

/// Human-readable name of a known event code, for log output.
pub fn describe(code: i32) -> Option<&'static str> {
    Some(match code {
        EVENT_EYES_OPEN => "eyes open",
        EVENT_EYES_CLOSED => "eyes closed",
        EVENT_START_OF_TRIAL => "start of trial",
        EVENT_CUE_LEFT => "cue left hand",
        EVENT_CUE_RIGHT => "cue right hand",
        EVENT_CUE_FOOT => "cue foot",
        EVENT_CUE_TONGUE => "cue tongue",
        EVENT_CUE_UNKNOWN => "cue unknown",
        EVENT_REJECTED_TRIAL => "rejected trial",
        EVENT_EYE_MOVEMENTS => "eye movements",
        EVENT_START_OF_RUN => "start of run",
        _ => return None,
    })
}
