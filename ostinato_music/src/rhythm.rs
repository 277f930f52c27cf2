// Rhythm generation: beat -> measure -> piece onset positions.
//
// All positions are 1-based sixteenth-note slots relative to the start of
// the structure they were generated in. A beat of `k` notes at note value `v`
// spans `k * 16 / v` slots. Slot 1 of every beat is always sounded; every
// other slot survives a coin flip weighted by `sparseness` (one "keep"
// outcome against `sparseness` "drop" outcomes).
//
// Measures concatenate their beats with a running slot offset, and pieces
// repeat a measure's onsets with a fixed stride. Because each beat's onsets
// lie within its own slot span, concatenation keeps the result strictly
// ascending.
//
// Consumes `TimeSignature` from time_signature.rs; the output is paired with
// melody notes in entity.rs.

use crate::error::{GenerateError, Result};
use crate::time_signature::TimeSignature;
use ostinato_prng::MelodyRng;

/// Strictly ascending 1-based sixteenth-note onset slots.
pub type OnsetSet = Vec<u32>;

/// Sixteenth-note slots in a whole note.
pub const SIXTEENTHS_PER_WHOLE: u32 = 16;

/// Number of sixteenth slots occupied by one note of `note_value`
/// (1 = whole, 2 = half, ... 16 = sixteenth).
pub fn slots_per_note(note_value: u32) -> Result<u32> {
    match note_value {
        1 | 2 | 4 | 8 | 16 => Ok(SIXTEENTHS_PER_WHOLE / note_value),
        _ => Err(GenerateError::InvalidNoteValue(note_value)),
    }
}

/// Subdivide one beat into sounded sixteenth slots.
///
/// Slot 1 is always kept; each later slot is kept with probability
/// `1 / (1 + sparseness)`. With `sparseness == 0` every slot is kept and no
/// randomness is consumed.
pub fn segment_beat(
    beat_note_count: u32,
    note_value: u32,
    sparseness: u32,
    rng: &mut MelodyRng,
) -> Result<OnsetSet> {
    let resolution = slots_per_note(note_value)?
        .checked_mul(beat_note_count)
        .ok_or(GenerateError::SlotOverflow)?;
    let mut onsets = Vec::with_capacity(resolution as usize);
    for slot in 1..=resolution {
        if slot == 1 || sparseness == 0 || keep_slot(sparseness, rng) {
            onsets.push(slot);
        }
    }
    Ok(onsets)
}

/// Uniform draw over one `true` and `sparseness` `false` outcomes.
fn keep_slot(sparseness: u32, rng: &mut MelodyRng) -> bool {
    rng.range_u64(0, sparseness as u64 + 1) == 0
}

/// Segment every beat of a time signature and lay them end to end.
pub fn assemble_measure(
    time_signature: &TimeSignature,
    note_value: u32,
    sparseness: u32,
    rng: &mut MelodyRng,
) -> Result<OnsetSet> {
    let slots = slots_per_note(note_value)?;
    let mut measure = Vec::new();
    let mut offset = 0;
    for &beat in time_signature.beats() {
        let onsets = segment_beat(beat, note_value, sparseness, rng)?;
        measure.extend(onsets.into_iter().map(|slot| slot + offset));
        offset = beat
            .checked_mul(slots)
            .and_then(|span| offset.checked_add(span))
            .ok_or(GenerateError::SlotOverflow)?;
    }
    Ok(measure)
}

/// Repeat a measure's onsets `measure_count` times, shifting repetition `k`
/// (0-based) by `k * note_count_per_measure`.
pub fn assemble_piece(
    measure_onsets: &[u32],
    measure_count: u32,
    note_count_per_measure: u32,
) -> OnsetSet {
    (0..measure_count)
        .flat_map(|k| {
            let stride = k * note_count_per_measure;
            measure_onsets.iter().map(move |&slot| slot + stride)
        })
        .collect()
}
