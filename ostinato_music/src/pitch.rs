// Pitch tokens and the notation parser.
//
// A `Pitch` is a letter (A–G), an accidental (natural, sharp, flat), and an
// octave in 1..=9. Pitches are immutable and validated on construction; the
// only ways to obtain one are `Pitch::new`, `parse` / `FromStr`, and
// `Pitch::from_midi`.
//
// Notation is strict: one uppercase letter, an optional `#` or `b`, and a
// single octave digit. `c4`, `H4`, and `C10` are all rejected.
//
// MIDI numbering follows the common convention C4 = 60, and frequencies use
// twelve-tone equal temperament with A4 = 440 Hz. Used by scale.rs to
// materialize scales and by midi.rs to encode note-on events.

use crate::error::{GenerateError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Frequency of A4 in Hz.
pub const A4_HZ: f64 = 440.0;

/// Lowest and highest octave a `Pitch` may carry.
pub const MIN_OCTAVE: u8 = 1;
pub const MAX_OCTAVE: u8 = 9;

/// Letter class of a pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    /// Semitones above C within the octave.
    pub fn semitone(self) -> i16 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    fn from_char(c: char) -> Option<Letter> {
        match c {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    pub fn offset(self) -> i16 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

/// A validated pitch token such as `C#4`.
///
/// Serializes as its notation string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch {
    letter: Letter,
    accidental: Accidental,
    octave: u8,
}

impl Pitch {
    /// Build a pitch, rejecting octaves outside 1..=9.
    pub fn new(letter: Letter, accidental: Accidental, octave: u8) -> Result<Self> {
        if !(MIN_OCTAVE..=MAX_OCTAVE).contains(&octave) {
            return Err(GenerateError::InvalidNotation(format!(
                "{}{}{}",
                letter.as_char(),
                accidental.symbol(),
                octave
            )));
        }
        Ok(Pitch {
            letter,
            accidental,
            octave,
        })
    }

    /// Spell a MIDI key number as a pitch, using sharps for black keys.
    ///
    /// Returns `None` when the key falls outside octaves 1..=9 (keys 24..=131).
    pub fn from_midi(key: u16) -> Option<Pitch> {
        const SPELLING: [(Letter, Accidental); 12] = [
            (Letter::C, Accidental::Natural),
            (Letter::C, Accidental::Sharp),
            (Letter::D, Accidental::Natural),
            (Letter::D, Accidental::Sharp),
            (Letter::E, Accidental::Natural),
            (Letter::F, Accidental::Natural),
            (Letter::F, Accidental::Sharp),
            (Letter::G, Accidental::Natural),
            (Letter::G, Accidental::Sharp),
            (Letter::A, Accidental::Natural),
            (Letter::A, Accidental::Sharp),
            (Letter::B, Accidental::Natural),
        ];
        let octave = key / 12;
        if octave < 1 + MIN_OCTAVE as u16 || octave > 1 + MAX_OCTAVE as u16 {
            return None;
        }
        let (letter, accidental) = SPELLING[(key % 12) as usize];
        Some(Pitch {
            letter,
            accidental,
            octave: (octave - 1) as u8,
        })
    }

    pub fn letter(&self) -> Letter {
        self.letter
    }

    pub fn accidental(&self) -> Accidental {
        self.accidental
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    /// MIDI key number (C4 = 60). `Cb1` is the lowest at 23, `B#9` the
    /// highest at 132; keys above 127 cannot be sent over MIDI.
    pub fn midi(&self) -> u16 {
        let key = (self.octave as i16 + 1) * 12 + self.letter.semitone() + self.accidental.offset();
        key as u16
    }

    /// Equal-tempered frequency in Hz.
    pub fn frequency(&self) -> f64 {
        A4_HZ * 2f64.powf((self.midi() as f64 - 69.0) / 12.0)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.letter.as_char(),
            self.accidental.symbol(),
            self.octave
        )
    }
}

/// Parse notation like `C4`, `F#3`, or `Bb5` into a `Pitch`.
pub fn parse(notation: &str) -> Result<Pitch> {
    let invalid = || GenerateError::InvalidNotation(notation.to_string());
    let mut chars = notation.chars();

    let letter = chars.next().and_then(Letter::from_char).ok_or_else(invalid)?;
    let mut next = chars.next().ok_or_else(invalid)?;
    let accidental = match next {
        '#' => Accidental::Sharp,
        'b' => Accidental::Flat,
        _ => Accidental::Natural,
    };
    if accidental != Accidental::Natural {
        next = chars.next().ok_or_else(invalid)?;
    }
    let octave = next.to_digit(10).ok_or_else(invalid)? as u8;
    if chars.next().is_some() {
        return Err(invalid());
    }
    Pitch::new(letter, accidental, octave).map_err(|_| invalid())
}

impl FromStr for Pitch {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

impl TryFrom<String> for Pitch {
    type Error = GenerateError;

    fn try_from(value: String) -> Result<Self> {
        parse(&value)
    }
}

impl From<Pitch> for String {
    fn from(pitch: Pitch) -> String {
        pitch.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let p = parse("C#4").unwrap();
        assert_eq!(p.letter(), Letter::C);
        assert_eq!(p.accidental(), Accidental::Sharp);
        assert_eq!(p.octave(), 4);

        let p = parse("Bb1").unwrap();
        assert_eq!(p.accidental(), Accidental::Flat);
        assert_eq!(parse("G9").unwrap().octave(), 9);
    }

    #[test]
    fn test_parse_rejects_bad_notation() {
        for bad in ["H4", "C10", "c4", "", "C", "C#", "C0", "C#b4", "Cx4", " C4", "C4 "] {
            match parse(bad) {
                Err(GenerateError::InvalidNotation(s)) => assert_eq!(s, bad),
                other => panic!("{bad:?} should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_midi_numbers() {
        assert_eq!(parse("C4").unwrap().midi(), 60);
        assert_eq!(parse("A4").unwrap().midi(), 69);
        assert_eq!(parse("C#4").unwrap().midi(), 61);
        assert_eq!(parse("Db4").unwrap().midi(), 61);
        assert_eq!(parse("Cb4").unwrap().midi(), 59);
        assert_eq!(parse("C1").unwrap().midi(), 24);
    }

    #[test]
    fn test_from_midi_spells_with_sharps() {
        assert_eq!(Pitch::from_midi(61).unwrap().to_string(), "C#4");
        assert_eq!(Pitch::from_midi(60).unwrap().to_string(), "C4");
        assert_eq!(Pitch::from_midi(131).unwrap().to_string(), "B9");
        assert!(Pitch::from_midi(23).is_none());
        assert!(Pitch::from_midi(132).is_none());
    }

    #[test]
    fn test_frequency() {
        assert!((parse("A4").unwrap().frequency() - 440.0).abs() < 1e-9);
        assert!((parse("A5").unwrap().frequency() - 880.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_round_trips_notation() {
        for s in ["C4", "F#3", "Bb7", "E9"] {
            assert_eq!(parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_serde_as_string() {
        let p = parse("Eb5").unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"Eb5\"");
        let back: Pitch = serde_json::from_str("\"Eb5\"").unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<Pitch>("\"H2\"").is_err());
    }
}
