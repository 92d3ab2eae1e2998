//! Recovers experiment-clock tick times from a sampled trigger signal.

use ndarray::Array1;

use crate::error::{Error, Result};

/// A binary clock/trigger signal sampled over time: one 0/1 level per
/// timestamp, timestamps strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockSignal {
    pub times: Array1<f64>,
    pub values: Array1<u8>,
}

impl ClockSignal {
    /// # Panics
    /// Panics if the two arrays differ in length, a level is neither 0 nor
    /// 1, or the timestamps are not strictly increasing.
    pub fn new(times: Array1<f64>, values: Array1<u8>) -> Self {
        assert!(
            times.len() == values.len(),
            "Clock signal holds {} timestamps but {} values",
            times.len(),
            values.len()
        );
        assert!(
            values.iter().all(|&level| level <= 1),
            "Clock levels must be 0 or 1"
        );
        assert!(
            times.iter().zip(times.iter().skip(1)).all(|(a, b)| a < b),
            "Clock timestamps must be strictly increasing"
        );
        Self { times, values }
    }
}

/// Reconstructs the tick times of the experiment clock from its sampled
/// signal.
///
/// A rising edge at sample `i >= 1` (level going 0 to 1) ticks at
/// `times[i]`. A signal already high at the first sample ticked at that
/// sample: the clock is guaranteed low before the experiment starts, so an
/// initial high level can only mean a tick coincident with the first sample.
/// That implicit tick is placed before any edge found by the scan.
///
/// # Errors
/// [`Error::NoClockSource`] when `clock` is `None`: a board can never be
/// clocked by itself, so a missing clock at decode time is a structural
/// defect, not an empty result.
pub fn reconstruct_ticks(clock: Option<&ClockSignal>, board: &str) -> Result<Array1<f64>> {
    let signal = match clock {
        Some(signal) => signal,
        None => {
            return Err(Error::NoClockSource {
                board: board.to_string(),
            })
        }
    };
    let mut ticks = Vec::new();
    if signal.values.first() == Some(&1) {
        ticks.push(signal.times[0]);
    }
    for i in 1..signal.values.len() {
        if signal.values[i] == 1 && signal.values[i - 1] == 0 {
            ticks.push(signal.times[i]);
        }
    }
    Ok(Array1::from_vec(ticks))
}

#[cfg(test)]
mod test {
    use crate::clock::*;
    use ndarray::{array, Array1};

    #[test]
    fn rising_edges_become_ticks() {
        let signal = ClockSignal::new(
            array![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            array![0, 0, 1, 0, 1, 1, 0],
        );
        let ticks = reconstruct_ticks(Some(&signal), "Dev1").unwrap();
        assert_eq!(ticks, array![2.0, 4.0]);
    }

    #[test]
    fn initial_high_counts_as_tick() {
        let signal = ClockSignal::new(array![0.0, 1.0, 2.0], array![1, 0, 1]);
        let ticks = reconstruct_ticks(Some(&signal), "Dev1").unwrap();
        assert_eq!(ticks, array![0.0, 2.0]);
    }

    #[test]
    fn constant_low_yields_no_ticks() {
        let signal = ClockSignal::new(array![0.0, 1.0, 2.0], array![0, 0, 0]);
        let ticks = reconstruct_ticks(Some(&signal), "Dev1").unwrap();
        assert_eq!(ticks.len(), 0);
    }

    #[test]
    fn empty_signal_yields_no_ticks() {
        let signal = ClockSignal::new(Array1::from_vec(vec![]), Array1::from_vec(vec![]));
        assert_eq!(reconstruct_ticks(Some(&signal), "Dev1").unwrap().len(), 0);
    }

    #[test]
    fn missing_clock_fails() {
        let err = reconstruct_ticks(None, "ni_card_A").unwrap_err();
        assert!(matches!(err, Error::NoClockSource { .. }));
        assert!(err.to_string().contains("ni_card_A"));
    }

    #[test]
    #[should_panic(expected = "strictly increasing")]
    fn unsorted_timestamps_panic() {
        ClockSignal::new(array![0.0, 2.0, 1.0], array![0, 1, 0]);
    }
}
