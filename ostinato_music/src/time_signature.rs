// Time signature generation: partitioning a measure's note-count into beats.
//
// A measure of `n` notes is split into beat groups of 2, 3, or 4 drawn
// uniformly, until the remainder is 3 or less; the remainder (if nonzero)
// becomes the final group. The sum of the groups is always exactly `n`, and
// the loop always ends because each draw removes at least 2 notes.
//
// The resulting `TimeSignature` drives rhythm.rs, which subdivides each beat
// into sixteenth-note onsets.

use ostinato_prng::MelodyRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Beat sizes a non-terminal group may take.
pub const BEAT_SIZES: [u32; 3] = [2, 3, 4];

/// Ordered beat groups of a measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    beats: Vec<u32>,
}

impl TimeSignature {
    /// Build a signature from explicit beat sizes (zero-sized beats dropped).
    pub fn from_beats(beats: Vec<u32>) -> Self {
        TimeSignature {
            beats: beats.into_iter().filter(|&b| b > 0).collect(),
        }
    }

    /// Randomly partition `note_count` into beat groups.
    ///
    /// `note_count == 0` yields an empty signature.
    pub fn generate(note_count: u32, rng: &mut MelodyRng) -> Self {
        let mut beats = Vec::new();
        let mut remaining = note_count;
        while remaining > 3 {
            let beat = BEAT_SIZES[rng.range_usize(0, BEAT_SIZES.len())];
            beats.push(beat);
            remaining -= beat;
        }
        if remaining > 0 {
            beats.push(remaining);
        }
        log::trace!("time signature for {note_count} notes: {beats:?}");
        TimeSignature { beats }
    }

    pub fn beats(&self) -> &[u32] {
        &self.beats
    }

    /// Total notes across all beats.
    pub fn note_count(&self) -> u32 {
        self.beats.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.beats.iter().map(|b| b.to_string()).collect();
        write!(f, "{}", parts.join("+"))
    }
}
