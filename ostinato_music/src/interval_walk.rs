// Interval walk: a weighted random walk over scale degrees.
//
// The walk holds a current degree in `[1, len]`. Each step draws one move
// from a static weighted table:
//
//   step up/down      ±1        0.38 each
//   leap up/down      ±(2..=5)  0.08 each
//   octave up/down    ±7        0.04 each
//
// and applies it to a pivot (initially the current degree). Down moves
// subtract their magnitude from the pivot. A candidate inside `[1, len]`
// becomes the new degree. An out-of-range candidate within one octave move
// (7 degrees) of the scale becomes the next pivot and the walk draws again,
// so a sequence of moves may wander just outside the scale and come back.
// A candidate farther out is discarded and redrawn from the current pivot.
// This keeps the pivot inside `[1 - 7, len + 7]`, where every position can
// reach the scale in a few moves, so rejections per step are geometrically
// distributed. The rejection counter is only a backstop; exceeding it is
// reported as `DegenerateScale` rather than looping. Scales shorter than two
// degrees are refused before any step is taken.
//
// `build_sequence` wraps the walk with the fixed bookends: the sequence
// starts on the tonic and ends on either the tonic or the top degree (the
// octave for catalog scales). Used by lib.rs to build the melody track.

use crate::error::{GenerateError, Result};
use crate::pitch::Pitch;
use crate::scale::Scale;
use ostinato_prng::MelodyRng;

/// Default cap on rejected draws within a single step.
pub const DEFAULT_MAX_REJECTIONS: u32 = 1_000_000;

/// How far outside `[1, len]` a rejected candidate may lie and still become
/// the next pivot. Equal to the largest single move.
pub const PIVOT_MARGIN: i64 = 7;

/// One kind of melodic motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    StepUp,
    StepDown,
    LeapUp,
    LeapDown,
    OctaveUp,
    OctaveDown,
}

impl Move {
    pub const ALL: [Move; 6] = [
        Move::StepUp,
        Move::StepDown,
        Move::LeapUp,
        Move::LeapDown,
        Move::OctaveUp,
        Move::OctaveDown,
    ];

    /// Relative probability of drawing this move. The table sums to 1.
    pub fn weight(self) -> f64 {
        match self {
            Move::StepUp | Move::StepDown => 0.38,
            Move::LeapUp | Move::LeapDown => 0.08,
            Move::OctaveUp | Move::OctaveDown => 0.04,
        }
    }

    /// Apply the move to `degree`. Leaps draw their magnitude uniformly
    /// from 2..=5; other moves consume no randomness.
    pub fn apply(self, degree: i64, rng: &mut MelodyRng) -> i64 {
        match self {
            Move::StepUp => degree + 1,
            Move::StepDown => degree - 1,
            Move::LeapUp => degree + leap_size(rng),
            Move::LeapDown => degree - leap_size(rng),
            Move::OctaveUp => degree + 7,
            Move::OctaveDown => degree - 7,
        }
    }

    /// Draw a move according to the weight table.
    pub fn draw(rng: &mut MelodyRng) -> Move {
        let weights = Move::ALL.map(Move::weight);
        let index = rng
            .choose_weighted(&weights)
            .expect("move weights are positive");
        Move::ALL[index]
    }
}

fn leap_size(rng: &mut MelodyRng) -> i64 {
    rng.range_u32_inclusive(2, 5) as i64
}

/// Walk state over the degrees of one scale.
#[derive(Debug, Clone)]
pub struct IntervalWalk {
    scale_len: usize,
    degree: i64,
    max_rejections: u32,
    last_rejections: u32,
}

impl IntervalWalk {
    /// Start a walk on degree 1 of a scale with `scale_len` degrees.
    pub fn new(scale_len: usize) -> Result<Self> {
        if scale_len < 2 {
            return Err(GenerateError::DegenerateScale {
                scale_len,
                rejections: 0,
            });
        }
        Ok(IntervalWalk {
            scale_len,
            degree: 1,
            max_rejections: DEFAULT_MAX_REJECTIONS,
            last_rejections: 0,
        })
    }

    pub fn with_max_rejections(mut self, max_rejections: u32) -> Self {
        self.max_rejections = max_rejections;
        self
    }

    /// The current degree.
    pub fn degree(&self) -> u32 {
        self.degree as u32
    }

    /// Rejected draws taken by the most recent successful step.
    pub fn last_rejections(&self) -> u32 {
        self.last_rejections
    }

    fn in_range(&self, degree: i64) -> bool {
        (1..=self.scale_len as i64).contains(&degree)
    }

    fn near_range(&self, degree: i64) -> bool {
        (1 - PIVOT_MARGIN..=self.scale_len as i64 + PIVOT_MARGIN).contains(&degree)
    }

    /// Take one step and return the new degree.
    ///
    /// On error the current degree is left unchanged.
    pub fn step(&mut self, rng: &mut MelodyRng) -> Result<u32> {
        let mut pivot = self.degree;
        let mut rejections = 0u32;
        loop {
            let candidate = Move::draw(rng).apply(pivot, rng);
            if self.in_range(candidate) {
                if rejections > 0 {
                    log::trace!("walk landed on {candidate} after {rejections} rejections");
                }
                self.degree = candidate;
                self.last_rejections = rejections;
                return Ok(self.degree());
            }
            rejections += 1;
            if rejections > self.max_rejections {
                return Err(GenerateError::DegenerateScale {
                    scale_len: self.scale_len,
                    rejections,
                });
            }
            if self.near_range(candidate) {
                pivot = candidate;
            }
        }
    }
}

/// Build an interval sequence of exactly `count` degrees.
///
/// The first degree is 1 and the last is 1 or `scale.len()`, chosen
/// uniformly. The `count - 2` degrees in between come from the walk.
/// `count == 1` yields `[1]`; `count == 0` yields an empty sequence.
pub fn build_sequence(scale: &Scale, count: usize, rng: &mut MelodyRng) -> Result<Vec<u32>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let mut degrees = Vec::with_capacity(count);
    degrees.push(1);
    if count == 1 {
        return Ok(degrees);
    }
    if count > 2 {
        let mut walk = IntervalWalk::new(scale.len())?;
        for _ in 0..count - 2 {
            degrees.push(walk.step(rng)?);
        }
    }
    let top = scale.len() as u32;
    let last = *rng.choose(&[1, top]).expect("bookend choices are non-empty");
    degrees.push(last);
    log::debug!("interval sequence of {count} over {top} degrees");
    Ok(degrees)
}

/// Look up each degree in `scale`.
pub fn degrees_to_notes(scale: &Scale, degrees: &[u32]) -> Result<Vec<Pitch>> {
    degrees
        .iter()
        .map(|&degree| {
            scale.degree(degree).ok_or(GenerateError::DegreeOutOfRange {
                degree,
                scale_len: scale.len(),
            })
        })
        .collect()
}
