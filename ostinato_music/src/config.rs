// Data-driven generation configuration.
//
// All tunable parameters of a run live in `GenerationConfig`, which can be
// loaded from JSON (every field has a default, so partial files work) and
// then overridden by CLI flags in main.rs. A config describes one or more
// voices; each voice is an independent pipeline run with its own rhythm
// parameters, an optional fixed scale, and an optional chordify pass.
//
// `validate` checks everything that would otherwise only fail halfway
// through generation (note values, probabilities), so bad configs are
// rejected before any voice is started.

use crate::error::{GenerateError, Result};
use crate::pitch::Pitch;
use crate::rhythm::slots_per_note;
use crate::scale::{Scale, ScaleType};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Slowest tempo whose quarter-note length fits a 24-bit MIDI tempo event.
pub const MIN_TEMPO_BPM: u16 = 4;

/// Rhythm parameters for one piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieceParams {
    /// Number of times the generated measure repeats.
    pub measure_count: u32,
    /// Notes per measure, partitioned into beats by the time signature.
    pub note_count: u32,
    /// Note value of one counted note (16 = sixteenth, 8 = eighth, ...).
    pub note_value: u32,
    /// Higher values leave more rests; 0 sounds every slot.
    pub sparseness: u32,
}

impl Default for PieceParams {
    fn default() -> Self {
        PieceParams {
            measure_count: 4,
            note_count: 8,
            note_value: 16,
            sparseness: 1,
        }
    }
}

/// A fixed scale for a voice instead of a random one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleSpec {
    pub root: Pitch,
    pub scale_type: ScaleType,
}

impl ScaleSpec {
    pub fn build(&self) -> Result<Scale> {
        Scale::new(self.root, self.scale_type)
    }
}

/// One independently generated voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Instrument name handed to the scheduler.
    pub instrument: String,
    pub piece: PieceParams,
    /// `None` picks a random scale per run.
    pub scale: Option<ScaleSpec>,
    /// When set, the voice is thinned with `chordify` at this probability.
    pub chord_probability: Option<f64>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        VoiceConfig {
            instrument: "lead".to_string(),
            piece: PieceParams::default(),
            scale: None,
            chord_probability: None,
        }
    }
}

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// `None` seeds from the system clock.
    pub seed: Option<u64>,
    /// Quarter notes per minute; one slot is a sixteenth at this tempo.
    pub tempo_bpm: u16,
    pub voices: Vec<VoiceConfig>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            seed: None,
            tempo_bpm: 120,
            voices: vec![
                VoiceConfig::default(),
                VoiceConfig {
                    instrument: "chords".to_string(),
                    chord_probability: Some(crate::entity::DEFAULT_KEEP_PROBABILITY),
                    ..VoiceConfig::default()
                },
            ],
        }
    }
}

impl GenerationConfig {
    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Reject parameters that would fail mid-generation.
    pub fn validate(&self) -> Result<()> {
        if self.tempo_bpm < MIN_TEMPO_BPM {
            return Err(GenerateError::InvalidTempo(self.tempo_bpm));
        }
        for voice in &self.voices {
            slots_per_note(voice.piece.note_value)?;
            if let Some(p) = voice
                .chord_probability
                .filter(|p| !(0.0..=1.0).contains(p))
            {
                return Err(GenerateError::InvalidProbability(p));
            }
            if let Some(spec) = &voice.scale {
                spec.build()?;
            }
        }
        Ok(())
    }

    /// Wall-clock length of one sixteenth-note slot.
    pub fn slot_duration(&self) -> Duration {
        let bpm = self.tempo_bpm.max(1) as u64;
        // A quarter lasts 60/bpm seconds and holds four slots.
        Duration::from_micros(60_000_000 / bpm / 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::parse;

    #[test]
    fn test_default_is_valid() {
        let config = GenerationConfig::default();
        config.validate().unwrap();
        assert_eq!(config.voices.len(), 2);
        assert_eq!(config.voices[1].chord_probability, Some(0.2));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = GenerationConfig::from_json(
            r#"{
                "seed": 7,
                "voices": [
                    { "instrument": "bass", "piece": { "note_count": 6 },
                      "scale": { "root": "E2", "scale_type": "minor_pentatonic" } }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.tempo_bpm, 120);
        let voice = &config.voices[0];
        assert_eq!(voice.instrument, "bass");
        assert_eq!(voice.piece.note_count, 6);
        assert_eq!(voice.piece.note_value, 16);
        let spec = voice.scale.as_ref().unwrap();
        assert_eq!(spec.root, parse("E2").unwrap());
        assert_eq!(spec.scale_type, ScaleType::MinorPentatonic);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            GenerationConfig::from_json("{ not json"),
            Err(GenerateError::Config(_))
        ));
        assert!(GenerationConfig::from_json(r#"{"voices":[{"scale":{"root":"H2","scale_type":"major"}}]}"#).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GenerationConfig::default();
        config.voices[0].piece.note_value = 3;
        assert!(matches!(config.validate(), Err(GenerateError::InvalidNoteValue(3))));

        let mut config = GenerationConfig::default();
        config.voices[1].chord_probability = Some(2.0);
        assert!(matches!(config.validate(), Err(GenerateError::InvalidProbability(_))));

        let mut config = GenerationConfig::default();
        config.voices[0].scale = Some(ScaleSpec {
            root: parse("G9").unwrap(),
            scale_type: ScaleType::Major,
        });
        assert!(matches!(config.validate(), Err(GenerateError::PitchOutOfRange(_))));
    }

    #[test]
    fn test_validate_rejects_slow_tempo() {
        for tempo_bpm in [0, 1, 3] {
            let config = GenerationConfig {
                tempo_bpm,
                ..GenerationConfig::default()
            };
            assert!(matches!(config.validate(), Err(GenerateError::InvalidTempo(t)) if t == tempo_bpm));
        }
        let config = GenerationConfig {
            tempo_bpm: MIN_TEMPO_BPM,
            ..GenerationConfig::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_slot_duration() {
        let config = GenerationConfig {
            tempo_bpm: 60,
            ..GenerationConfig::default()
        };
        assert_eq!(config.slot_duration(), Duration::from_millis(250));
    }

    #[test]
    fn test_json_round_trip() {
        let config = GenerationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(GenerationConfig::from_json(&json).unwrap(), config);
    }
}
