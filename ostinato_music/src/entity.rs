// Note events: merging the rhythm track with the melody track.
//
// `map_entities` zips onset positions with pitches one-to-one. The two
// tracks must have the same length; a mismatch is a caller bug and is
// reported as `LengthMismatch` rather than truncated or padded.
//
// `chordify` thins an event list into a sparser accent layer by keeping
// each event independently with a fixed probability.

use crate::error::{GenerateError, Result};
use crate::pitch::Pitch;
use ostinato_prng::MelodyRng;
use serde::{Deserialize, Serialize};

/// Default retention probability for `chordify`.
pub const DEFAULT_KEEP_PROBABILITY: f64 = 0.2;

/// A note starting at a sixteenth-note slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub position: u32,
    pub note: Pitch,
}

/// Pair onsets with notes positionally.
pub fn map_entities(onsets: &[u32], notes: &[Pitch]) -> Result<Vec<NoteEvent>> {
    if onsets.len() != notes.len() {
        return Err(GenerateError::LengthMismatch {
            onsets: onsets.len(),
            notes: notes.len(),
        });
    }
    Ok(onsets
        .iter()
        .zip(notes)
        .map(|(&position, &note)| NoteEvent { position, note })
        .collect())
}

/// Keep each event with probability `keep_probability`, preserving order.
pub fn chordify(
    events: &[NoteEvent],
    keep_probability: f64,
    rng: &mut MelodyRng,
) -> Result<Vec<NoteEvent>> {
    if !(0.0..=1.0).contains(&keep_probability) {
        return Err(GenerateError::InvalidProbability(keep_probability));
    }
    let kept: Vec<NoteEvent> = events
        .iter()
        .filter(|_| rng.random_bool(keep_probability))
        .copied()
        .collect();
    log::debug!("chordify kept {} of {} events", kept.len(), events.len());
    Ok(kept)
}
