// Ostinato: procedural rhythm and melody generation.
//
// Generates note sequences from two independent tracks that are merged by
// position:
//
// - Rhythm: a time signature partitions a measure's note-count into beats,
//   each beat is subdivided into sixteenth-note onsets with tunable
//   sparseness, and the measure is repeated across the piece.
// - Melody: a random scale is chosen and a weighted random walk over its
//   degrees produces one note per onset, starting on the tonic and ending on
//   the tonic or its octave.
//
// Architecture:
// - pitch.rs: Pitch tokens, the `C#4` notation parser, MIDI/frequency maps
// - scale.rs: Scale type catalog and random scale selection
// - time_signature.rs: Random partition of a measure into 2/3/4-note beats
// - rhythm.rs: Beat segmentation, measure and piece onset assembly
// - interval_walk.rs: Rejection-sampling walk over scale degrees
// - entity.rs: Onset/note pairing and chordify thinning
// - schedule.rs: Time-stamped (time, instrument, note) hand-off data
// - voices.rs: Parallel, independently seeded voice generation
// - midi.rs: Standard MIDI File encoding of schedules
// - config.rs: JSON-loadable run configuration
// - error.rs: Error taxonomy
//
// Every random decision draws from an explicitly passed `MelodyRng`, so a
// seed reproduces a piece exactly.

pub mod config;
pub mod entity;
pub mod error;
pub mod interval_walk;
pub mod midi;
pub mod pitch;
pub mod rhythm;
pub mod scale;
pub mod schedule;
pub mod time_signature;
pub mod voices;

pub use config::{GenerationConfig, PieceParams, VoiceConfig};
pub use entity::{NoteEvent, chordify, map_entities};
pub use error::{GenerateError, Result};
pub use ostinato_prng::MelodyRng;
pub use pitch::Pitch;
pub use rhythm::OnsetSet;
pub use scale::{Scale, ScaleType};
pub use time_signature::TimeSignature;

use interval_walk::{build_sequence, degrees_to_notes};
use rhythm::{assemble_measure, assemble_piece, slots_per_note};

/// Generate the onset timeline of a whole piece.
///
/// One measure of `note_count` notes is generated and repeated
/// `measure_count` times. The stride between repetitions is the measure's
/// length in sixteenth slots, `note_count * 16 / note_value`.
pub fn generate_piece(
    measure_count: u32,
    note_count: u32,
    note_value: u32,
    sparseness: u32,
    rng: &mut MelodyRng,
) -> Result<OnsetSet> {
    let stride = note_count
        .checked_mul(slots_per_note(note_value)?)
        .ok_or(GenerateError::SlotOverflow)?;
    stride
        .checked_mul(measure_count)
        .ok_or(GenerateError::SlotOverflow)?;
    let time_signature = TimeSignature::generate(note_count, rng);
    let measure = assemble_measure(&time_signature, note_value, sparseness, rng)?;
    log::debug!(
        "measure {time_signature}: {} onsets in {stride} slots",
        measure.len()
    );
    Ok(assemble_piece(&measure, measure_count, stride))
}

/// Generate a complete note-event sequence.
///
/// With `scale == None` a random scale is drawn first. The melody has
/// exactly one note per onset.
pub fn generate_entity_map(
    params: &PieceParams,
    scale: Option<&Scale>,
    rng: &mut MelodyRng,
) -> Result<Vec<NoteEvent>> {
    let random_scale;
    let scale = match scale {
        Some(scale) => scale,
        None => {
            random_scale = Scale::generate_random(rng);
            &random_scale
        }
    };
    let onsets = generate_piece(
        params.measure_count,
        params.note_count,
        params.note_value,
        params.sparseness,
        rng,
    )?;
    let degrees = build_sequence(scale, onsets.len(), rng)?;
    let notes = degrees_to_notes(scale, &degrees)?;
    map_entities(&onsets, &notes)
}
