//! Packs independent digital-line states into dense bitfield words, and
//! expands such words back into per-line boolean sequences.
//!
//! A board exposes [`NUM_LINES`] digital lines on port 0. For every time step
//! the states of all lines are stored in a single `u32` word whose bit `n`
//! (least significant = line 0) holds the state of line `n`. [`pack`] and
//! [`unpack`] are pure transforms and exact inverses of each other: unpacking
//! a packed sequence reproduces every line that was packed, and reports
//! constant-false for every line that was not.

use indexmap::IndexMap;
use ndarray::{Array1, Array2, ArrayView1};

/// Number of digital lines a board exposes on port 0.
pub const NUM_LINES: usize = 32;

/// Packs per-line boolean sequences into one `u32` word per time step.
///
/// `lines` maps a line number to that line's state at every step; lines
/// absent from the map stay low for the whole run.
///
/// # Panics
/// Panics if a line number is `NUM_LINES` or above, or if any sequence
/// length differs from `n_samps`.
pub fn pack(lines: &IndexMap<u32, ArrayView1<bool>>, n_samps: usize) -> Array1<u32> {
    let mut words = Array1::<u32>::zeros(n_samps);
    for (&line, samples) in lines {
        assert!(
            (line as usize) < NUM_LINES,
            "Line {} exceeds the {} lines of a board port",
            line,
            NUM_LINES
        );
        assert!(
            samples.len() == n_samps,
            "Line {} holds {} samples while the compile unit spans {} steps",
            line,
            samples.len(),
            n_samps
        );
        for (word, &state) in words.iter_mut().zip(samples.iter()) {
            *word |= (state as u32) << line;
        }
    }
    words
}

/// Expands bitfield words back into [`NUM_LINES`] boolean sequences.
///
/// Returns a `(NUM_LINES, T)` matrix; row `n` is the state of line `n` at
/// every time step.
pub fn unpack(words: &Array1<u32>) -> Array2<bool> {
    let mut lines = Array2::from_elem((NUM_LINES, words.len()), false);
    for (t, &word) in words.iter().enumerate() {
        for line in 0..NUM_LINES {
            lines[[line, t]] = (word >> line) & 1 == 1;
        }
    }
    lines
}
