//! Extraction configuration.
//!
//! [`ExtractConfig`] gathers every knob of [`crate::extract`].  The defaults
//! reproduce the usual BCI IV 2a setup: trials start at code 768 and are read
//! from C3, Cz and C4.
use crate::constants::EVENT_START_OF_TRIAL;
use crate::table::EventCodeTable;

/// Configuration for [`crate::extract`].
///
/// All fields are `pub`; override what you need with struct-update syntax:
///
/// ```
/// use mitrials::ExtractConfig;
///
/// let cfg = ExtractConfig {
///     channels: vec![7],   // C3 only
///     strict:   true,
///     ..ExtractConfig::default()
/// };
/// assert_eq!(cfg.start_code, 768);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractConfig {
    /// Event code marking the start of a trial.
    ///
    /// Default: `768`.
    pub start_code: i32,

    /// Row indices of the channels to extract, in output order.
    ///
    /// In the 22-channel 2a montage, 7 = C3, 9 = Cz and 11 = C4.
    ///
    /// Default: `[7, 9, 11]`.
    pub channels: Vec<usize>,

    /// Keep only trials valid on *every* channel and return them as
    /// `[C, T]` blocks.  When `false` each channel is extracted on its own
    /// and may end up with a different number of trials.
    ///
    /// Default: `false`.
    pub strict: bool,

    /// Code → label table used for the event following each start marker.
    ///
    /// Default: [`EventCodeTable::default()`].
    pub table: EventCodeTable,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            start_code: EVENT_START_OF_TRIAL,
            channels: vec![7, 9, 11],
            strict: false,
            table: EventCodeTable::default(),
        }
    }
}
