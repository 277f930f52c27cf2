// Error taxonomy for the generation pipeline.
//
// Every failure is local and synchronous: the component that detects it
// returns the error, and no partial result is produced. Callers either abort
// the piece or retry with corrected input (e.g. a longer scale).

use thiserror::Error;

/// Errors produced while parsing input or generating a piece.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Pitch notation did not match `<A-G>[#|b]<1-9>`.
    #[error("invalid pitch notation: {0:?}")]
    InvalidNotation(String),

    /// Onsets and notes must pair one-to-one.
    #[error("length mismatch: {onsets} onsets but {notes} notes")]
    LengthMismatch { onsets: usize, notes: usize },

    /// A computed pitch fell outside octaves 1..=9.
    #[error("pitch out of range: MIDI key {0}")]
    PitchOutOfRange(u16),

    /// A scale needs at least one pitch.
    #[error("scale has no pitches")]
    EmptyScale,

    /// The interval walk could not find a legal degree.
    #[error("degenerate scale of length {scale_len}: no legal degree after {rejections} rejected moves")]
    DegenerateScale { scale_len: usize, rejections: u32 },

    /// A degree outside `1..=scale_len` was looked up.
    #[error("degree {degree} outside scale of length {scale_len}")]
    DegreeOutOfRange { degree: u32, scale_len: usize },

    /// Note values must divide a whole note into sixteenths evenly.
    #[error("invalid note value {0}: must be one of 1, 2, 4, 8, 16")]
    InvalidNoteValue(u32),

    /// Slot positions of the requested piece do not fit in a `u32`.
    #[error("piece too long: slot positions overflow")]
    SlotOverflow,

    /// Tempo too slow to encode as a MIDI tempo event.
    #[error("invalid tempo {0} BPM: must be at least {min}", min = crate::config::MIN_TEMPO_BPM)]
    InvalidTempo(u16),

    /// Probabilities must lie in [0, 1].
    #[error("invalid probability {0}: must be within [0, 1]")]
    InvalidProbability(f64),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GenerateError>;
