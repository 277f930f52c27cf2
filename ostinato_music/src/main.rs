// Ostinato: CLI entry point.
//
// Generates one or more independent voices (rhythm + interval-walk melody),
// prints a summary of each, and optionally writes the note events as JSON
// and/or the scheduled piece as a Standard MIDI File.
//
// The run configuration comes from `--config` (JSON) or the built-in
// defaults; any flag given on the command line overrides the corresponding
// value in every voice.
//
// Usage:
//   cargo run -p ostinato_music -- [--config run.json] [--measures N]
//     [--notes N] [--note-value V] [--sparseness S] [--voices lead,bass]
//     [--chord-probability P] [--seed N] [--tempo BPM] [--midi out.mid] [--json]
//
// Set RUST_LOG=debug for per-stage logging.

use clap::Parser;
use ostinato_music::config::{GenerationConfig, VoiceConfig};
use ostinato_music::midi::encode_smf;
use ostinato_music::voices::{Voice, generate_voices, schedule_voices};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(name = "ostinato", about = "Procedural rhythm and melody generator")]
struct Args {
    /// JSON run configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of times the generated measure repeats
    #[arg(long)]
    measures: Option<u32>,

    /// Notes per measure
    #[arg(long)]
    notes: Option<u32>,

    /// Note value of one counted note (1, 2, 4, 8 or 16)
    #[arg(long)]
    note_value: Option<u32>,

    /// Rest density; 0 sounds every slot
    #[arg(long)]
    sparseness: Option<u32>,

    /// Comma-separated instrument names, one voice each
    #[arg(long, value_delimiter = ',')]
    voices: Option<Vec<String>>,

    /// Thin every voice with chordify at this keep probability
    #[arg(long)]
    chord_probability: Option<f64>,

    /// RNG seed (default: system clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Tempo in quarter notes per minute
    #[arg(long)]
    tempo: Option<u16>,

    /// Write the scheduled piece as a MIDI file
    #[arg(long)]
    midi: Option<PathBuf>,

    /// Print the generated voices as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match GenerationConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => GenerationConfig::default(),
    };
    apply_overrides(&mut config, &args);

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let seed = config.seed.unwrap_or_else(clock_seed);
    let voices = match generate_voices(&config.voices, seed) {
        Ok(voices) => voices,
        Err(e) => {
            eprintln!("Generation failed: {}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&voices) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing voices: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_summary(&voices, seed, config.tempo_bpm);
    }

    if let Some(path) = &args.midi {
        let schedule = schedule_voices(&voices, Duration::ZERO, config.slot_duration());
        let written = encode_smf(&schedule, config.tempo_bpm)
            .and_then(|bytes| std::fs::write(path, bytes).map_err(Into::into));
        match written {
            Ok(()) => {
                if !args.json {
                    println!(
                        "Wrote {} ({:.1}s)",
                        path.display(),
                        (schedule.end_time() + schedule.base_time).as_secs_f64()
                    );
                }
            }
            Err(e) => {
                eprintln!("Error writing MIDI: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn apply_overrides(config: &mut GenerationConfig, args: &Args) {
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(tempo) = args.tempo {
        config.tempo_bpm = tempo;
    }
    if let Some(names) = &args.voices {
        let template = config.voices.first().cloned().unwrap_or_default();
        config.voices = names
            .iter()
            .map(|name| VoiceConfig {
                instrument: name.clone(),
                ..template.clone()
            })
            .collect();
    }
    for voice in &mut config.voices {
        let piece = &mut voice.piece;
        if let Some(measures) = args.measures {
            piece.measure_count = measures;
        }
        if let Some(notes) = args.notes {
            piece.note_count = notes;
        }
        if let Some(note_value) = args.note_value {
            piece.note_value = note_value;
        }
        if let Some(sparseness) = args.sparseness {
            piece.sparseness = sparseness;
        }
        if args.chord_probability.is_some() {
            voice.chord_probability = args.chord_probability;
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn print_summary(voices: &[Voice], seed: u64, tempo_bpm: u16) {
    println!("=== Ostinato ===");
    println!("Seed: {}", seed);
    println!("Tempo: {} BPM", tempo_bpm);
    println!();
    for voice in voices {
        let scale_name = match voice.scale.scale_type() {
            Some(scale_type) => format!("{} {:?}", voice.scale.root(), scale_type),
            None => format!("{} (custom)", voice.scale.root()),
        };
        println!(
            "[{}] {} notes, scale {}",
            voice.instrument,
            voice.events.len(),
            scale_name
        );
        let line: Vec<String> = voice
            .events
            .iter()
            .map(|e| format!("{}:{}", e.position, e.note))
            .collect();
        println!("  {}", line.join(" "));
    }
}
