//! The event log embedded in a recording.
//!
//! Three parallel sequences (type, position, duration) describe one logical
//! event per index.  [`EventLog::new`] refuses sequences of unequal length,
//! so every `EventLog` keeps `code[i]`, `position[i]` and `duration[i]`
//! referring to the same event.
use crate::error::{Error, Result};

/// One logical event of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub code: i32,
    /// Sample offset into the continuous signal.
    pub position: i64,
    /// Width of the associated span, in samples.
    pub duration: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    types: Vec<i32>,
    positions: Vec<i64>,
    durations: Vec<i64>,
}

impl EventLog {
    pub fn new(types: Vec<i32>, positions: Vec<i64>, durations: Vec<i64>) -> Result<Self> {
        if types.len() != positions.len() || types.len() != durations.len() {
            return Err(Error::EventLengthMismatch {
                types: types.len(),
                positions: positions.len(),
                durations: durations.len(),
            });
        }
        Ok(Self { types, positions, durations })
    }

    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut log = Self::default();
        for ev in events {
            log.types.push(ev.code);
            log.positions.push(ev.position);
            log.durations.push(ev.duration);
        }
        log
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Event> {
        Some(Event {
            code: *self.types.get(index)?,
            position: self.positions[index],
            duration: self.durations[index],
        })
    }

    pub fn types(&self) -> &[i32] {
        &self.types
    }

    pub fn positions(&self) -> &[i64] {
        &self.positions
    }

    pub fn durations(&self) -> &[i64] {
        &self.durations
    }

    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Number of events carrying `code`.
    pub fn count(&self, code: i32) -> usize {
        self.types.iter().filter(|&&c| c == code).count()
    }

    /// Indices of every event equal to `start_code`, in log order.
    pub fn start_indices(&self, start_code: i32) -> Vec<usize> {
        self.types
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == start_code)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_lengths_rejected() {
        let err = EventLog::new(vec![768, 769], vec![0], vec![5, 5]).unwrap_err();
        assert!(matches!(
            err,
            Error::EventLengthMismatch { types: 2, positions: 1, durations: 2 }
        ));
    }

    #[test]
    fn start_indices_in_log_order() {
        let log = EventLog::new(
            vec![32766, 768, 769, 768, 1023, 768],
            vec![0, 10, 20, 30, 40, 50],
            vec![0, 5, 0, 5, 0, 5],
        )
        .unwrap();
        assert_eq!(log.start_indices(768), vec![1, 3, 5]);
        assert_eq!(log.count(768), 3);
        assert_eq!(log.get(4).map(|e| e.code), Some(1023));
        assert_eq!(log.get(6), None);
    }

    #[test]
    fn from_events_keeps_correspondence() {
        let evs = [
            Event { code: 768, position: 100, duration: 50 },
            Event { code: 770, position: 150, duration: 0 },
        ];
        let log = EventLog::from_events(evs);
        assert_eq!(log.iter().collect::<Vec<_>>(), evs.to_vec());
        assert_eq!(log.positions(), &[100, 150]);
        assert_eq!(log.durations(), &[50, 0]);
    }
}
