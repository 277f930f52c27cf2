// End-to-end tests for the generation pipeline: rhythm and melody tracks
// merged into note events, chordify thinning, multi-voice generation,
// scheduling, and MIDI encoding. Everything runs from a fixed seed.

use midly::{MidiMessage, Smf, TrackEventKind};
use ostinato_music::config::{GenerationConfig, PieceParams, ScaleSpec, VoiceConfig};
use ostinato_music::interval_walk::build_sequence;
use ostinato_music::midi::encode_smf;
use ostinato_music::pitch::parse;
use ostinato_music::voices::{generate_voices, schedule_voices};
use ostinato_music::{
    GenerateError, MelodyRng, Scale, ScaleType, chordify, generate_entity_map, generate_piece,
    map_entities,
};
use std::time::Duration;

fn params(measure_count: u32, note_count: u32, note_value: u32, sparseness: u32) -> PieceParams {
    PieceParams {
        measure_count,
        note_count,
        note_value,
        sparseness,
    }
}

#[test]
fn test_same_seed_same_piece() {
    let p = params(6, 11, 8, 2);
    for seed in [0, 1, 42, u64::MAX] {
        let a = generate_entity_map(&p, None, &mut MelodyRng::new(seed)).unwrap();
        let b = generate_entity_map(&p, None, &mut MelodyRng::new(seed)).unwrap();
        assert_eq!(a, b, "seed {seed} diverged");
    }
}

#[test]
fn test_different_seeds_differ() {
    let p = params(4, 12, 16, 1);
    let a = generate_entity_map(&p, None, &mut MelodyRng::new(1)).unwrap();
    let b = generate_entity_map(&p, None, &mut MelodyRng::new(2)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_piece_structure_over_many_seeds() {
    let scale = Scale::new(parse("C4").unwrap(), ScaleType::Major).unwrap();
    for seed in 0..50 {
        let mut rng = MelodyRng::new(seed);
        let p = params(3, 9, 16, 3);
        let events = generate_entity_map(&p, Some(&scale), &mut rng).unwrap();

        // Every measure starts with a sounded slot 1.
        let positions: Vec<u32> = events.iter().map(|e| e.position).collect();
        for k in 0..3 {
            assert!(positions.contains(&(1 + k * 9)), "seed {seed}: measure {k}");
        }
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(positions.iter().all(|&s| (1..=27).contains(&s)));

        // Melody starts on the tonic and ends on the tonic or its octave.
        assert_eq!(events[0].note, parse("C4").unwrap());
        let last = events.last().unwrap().note;
        assert!(last == parse("C4").unwrap() || last == parse("C5").unwrap());
    }
}

#[test]
fn test_dense_piece_has_every_slot() {
    let mut rng = MelodyRng::new(9);
    let onsets = generate_piece(2, 5, 4, 0, &mut rng).unwrap();
    // Five quarter notes are twenty sixteenth slots per measure.
    assert_eq!(onsets, (1..=40).collect::<Vec<_>>());
}

#[test]
fn test_sequence_bounds_on_small_scales() {
    let mut rng = MelodyRng::new(10);
    let two = Scale::from_pitches(vec![parse("A3").unwrap(), parse("A4").unwrap()]).unwrap();
    let degrees = build_sequence(&two, 64, &mut rng).unwrap();
    assert_eq!(degrees.len(), 64);
    assert_eq!(degrees[0], 1);
    assert!(degrees.iter().all(|&d| d == 1 || d == 2));

    let one = Scale::from_pitches(vec![parse("A3").unwrap()]).unwrap();
    assert!(matches!(
        build_sequence(&one, 8, &mut rng),
        Err(GenerateError::DegenerateScale { scale_len: 1, .. })
    ));
    // Bookends only: no walk step is needed.
    assert_eq!(build_sequence(&one, 2, &mut rng).unwrap(), vec![1, 1]);
}

#[test]
fn test_map_entities_example() {
    let notes = [parse("C4").unwrap(), parse("E4").unwrap()];
    let events = map_entities(&[1, 5], &notes).unwrap();
    let pairs: Vec<(u32, String)> = events
        .iter()
        .map(|e| (e.position, e.note.to_string()))
        .collect();
    assert_eq!(pairs, vec![(1, "C4".to_string()), (5, "E4".to_string())]);
    assert!(matches!(
        map_entities(&[1, 5, 9], &notes),
        Err(GenerateError::LengthMismatch { onsets: 3, notes: 2 })
    ));
}

#[test]
fn test_chordify_on_generated_piece() {
    let mut rng = MelodyRng::new(11);
    let events = generate_entity_map(&params(8, 16, 16, 0), None, &mut rng).unwrap();
    assert_eq!(chordify(&events, 1.0, &mut rng).unwrap(), events);
    assert!(chordify(&events, 0.0, &mut rng).unwrap().is_empty());

    let thinned = chordify(&events, 0.5, &mut rng).unwrap();
    // Kept events are a subsequence of the input.
    let mut rest = events.iter();
    for kept in &thinned {
        assert!(rest.any(|e| e == kept));
    }
}

#[test]
fn test_parse_examples() {
    assert!(parse("C#4").is_ok());
    for bad in ["H4", "C10", "c4"] {
        assert!(matches!(parse(bad), Err(GenerateError::InvalidNotation(_))));
    }
}

#[test]
fn test_config_to_midi() {
    let config = GenerationConfig::from_json(
        r#"{
            "seed": 2024,
            "tempo_bpm": 90,
            "voices": [
                { "instrument": "lead" },
                { "instrument": "bass", "piece": { "note_value": 8, "sparseness": 0 },
                  "scale": { "root": "D2", "scale_type": "dorian" } },
                { "instrument": "chords", "piece": { "sparseness": 0 }, "chord_probability": 0.3 }
            ]
        }"#,
    )
    .unwrap();
    config.validate().unwrap();

    let voices = generate_voices(&config.voices, config.seed.unwrap()).unwrap();
    assert_eq!(voices.len(), 3);
    // Dense eighth notes: 8 notes * 2 slots * 4 measures.
    assert_eq!(voices[1].events.len(), 64);

    let schedule = schedule_voices(&voices, Duration::ZERO, config.slot_duration());
    assert_eq!(schedule.instruments(), vec!["lead", "bass", "chords"]);
    for note in &schedule.notes {
        assert!(note.time >= config.slot_duration());
    }

    let bytes = encode_smf(&schedule, config.tempo_bpm).unwrap();
    let smf = Smf::parse(&bytes).unwrap();
    assert_eq!(smf.tracks.len(), 4);
    let bass_ons = smf.tracks[2]
        .iter()
        .filter(|ev| {
            matches!(
                ev.kind,
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { .. },
                    ..
                }
            )
        })
        .count();
    assert_eq!(bass_ons, 64);
}

#[test]
fn test_voices_independent_of_neighbours() {
    let lead = VoiceConfig::default();
    let bass = VoiceConfig {
        instrument: "bass".into(),
        scale: Some(ScaleSpec {
            root: parse("G1").unwrap(),
            scale_type: ScaleType::MajorPentatonic,
        }),
        ..VoiceConfig::default()
    };
    let alone = generate_voices(std::slice::from_ref(&lead), 3).unwrap();
    let paired = generate_voices(&[lead, bass], 3).unwrap();
    assert_eq!(alone[0], paired[0]);
}
