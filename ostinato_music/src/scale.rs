// Scale catalog and random scale selection.
//
// A `ScaleType` is a named step pattern (semitones between consecutive
// degrees, summing to one octave). A `Scale` is the materialized pitch
// sequence: the root, each step above it, and the octave on top, so a
// heptatonic scale has 8 degrees and its top degree is the octave bookend
// that interval_walk.rs may end on.
//
// `Scale::generate_random` owns only the selection policy: a uniform scale
// type from the catalog and a uniform root over every pitch class in octaves
// 1..=8. Capping the root at octave 8 keeps the octave bookend representable.

use crate::error::{GenerateError, Result};
use crate::pitch::Pitch;
use ostinato_prng::MelodyRng;
use serde::{Deserialize, Serialize};

/// MIDI key of C1, the lowest root `generate_random` may pick.
const LOWEST_ROOT: u16 = 24;
/// MIDI key of B8, the highest root `generate_random` may pick.
const HIGHEST_ROOT: u16 = 119;

/// The fixed catalog of scale types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    Major,
    Minor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
    HarmonicMinor,
    MelodicMinor,
    MajorPentatonic,
    MinorPentatonic,
    Blues,
    WholeTone,
    Diminished,
    HungarianMinor,
    Chromatic,
}

impl ScaleType {
    pub const ALL: [ScaleType; 16] = [
        ScaleType::Major,
        ScaleType::Minor,
        ScaleType::Dorian,
        ScaleType::Phrygian,
        ScaleType::Lydian,
        ScaleType::Mixolydian,
        ScaleType::Locrian,
        ScaleType::HarmonicMinor,
        ScaleType::MelodicMinor,
        ScaleType::MajorPentatonic,
        ScaleType::MinorPentatonic,
        ScaleType::Blues,
        ScaleType::WholeTone,
        ScaleType::Diminished,
        ScaleType::HungarianMinor,
        ScaleType::Chromatic,
    ];

    /// Semitone steps between consecutive degrees. Always sums to 12.
    pub fn steps(self) -> &'static [u8] {
        match self {
            ScaleType::Major => &[2, 2, 1, 2, 2, 2, 1],
            ScaleType::Minor => &[2, 1, 2, 2, 1, 2, 2],
            ScaleType::Dorian => &[2, 1, 2, 2, 2, 1, 2],
            ScaleType::Phrygian => &[1, 2, 2, 2, 1, 2, 2],
            ScaleType::Lydian => &[2, 2, 2, 1, 2, 2, 1],
            ScaleType::Mixolydian => &[2, 2, 1, 2, 2, 1, 2],
            ScaleType::Locrian => &[1, 2, 2, 1, 2, 2, 2],
            ScaleType::HarmonicMinor => &[2, 1, 2, 2, 1, 3, 1],
            ScaleType::MelodicMinor => &[2, 1, 2, 2, 2, 2, 1],
            ScaleType::MajorPentatonic => &[2, 2, 3, 2, 3],
            ScaleType::MinorPentatonic => &[3, 2, 2, 3, 2],
            ScaleType::Blues => &[3, 2, 1, 1, 3, 2],
            ScaleType::WholeTone => &[2, 2, 2, 2, 2, 2],
            ScaleType::Diminished => &[2, 1, 2, 1, 2, 1, 2, 1],
            ScaleType::HungarianMinor => &[2, 1, 3, 1, 1, 3, 1],
            ScaleType::Chromatic => &[1; 12],
        }
    }
}

/// An ordered pitch sequence indexed by 1-based degree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    scale_type: Option<ScaleType>,
    pitches: Vec<Pitch>,
}

impl Scale {
    /// Materialize `scale_type` starting at `root`, octave included.
    pub fn new(root: Pitch, scale_type: ScaleType) -> Result<Self> {
        let mut key = root.midi();
        let mut pitches = vec![root];
        for &step in scale_type.steps() {
            key += step as u16;
            pitches.push(Pitch::from_midi(key).ok_or(GenerateError::PitchOutOfRange(key))?);
        }
        Ok(Scale {
            scale_type: Some(scale_type),
            pitches,
        })
    }

    /// Wrap an arbitrary non-empty pitch list as a scale.
    pub fn from_pitches(pitches: Vec<Pitch>) -> Result<Self> {
        if pitches.is_empty() {
            return Err(GenerateError::EmptyScale);
        }
        Ok(Scale {
            scale_type: None,
            pitches,
        })
    }

    /// Pick a uniform scale type and a uniform root in octaves 1..=8.
    pub fn generate_random(rng: &mut MelodyRng) -> Self {
        let index = rng.range_usize(0, ScaleType::ALL.len());
        let scale_type = ScaleType::ALL[index];
        let key = rng.range_u64(LOWEST_ROOT as u64, HIGHEST_ROOT as u64 + 1) as u16;
        let root = Pitch::from_midi(key).expect("root range lies within octaves 1..=8");
        let scale = Scale::new(root, scale_type)
            .expect("a root in octave 8 or lower leaves room for the octave above");
        log::debug!("random scale: {} {:?} ({} degrees)", root, scale_type, scale.len());
        scale
    }

    /// Catalog type, or `None` for a hand-built scale.
    pub fn scale_type(&self) -> Option<ScaleType> {
        self.scale_type
    }

    pub fn root(&self) -> Pitch {
        self.pitches[0]
    }

    /// Number of degrees (including the octave bookend for catalog scales).
    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    /// The pitch at a 1-based degree, or `None` outside `1..=len()`.
    pub fn degree(&self, degree: u32) -> Option<Pitch> {
        let index = (degree as usize).checked_sub(1)?;
        self.pitches.get(index).copied()
    }

    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }
}
