// Independent voice generation.
//
// A voice is one full pipeline run (rhythm, scale, interval walk, entity
// mapping, optional chordify) tagged with an instrument name. Voices share
// no state: each task owns a `MelodyRng` derived from the run seed and the
// voice's index via `MelodyRng::for_stream`, so voices can be generated in
// parallel on the rayon pool and still reproduce exactly from a seed.
// Results come back in submission order regardless of which task finishes
// first.
//
// `schedule_voices` turns the finished voices into a `Schedule` for the
// external playback scheduler (schedule.rs).

use crate::config::VoiceConfig;
use crate::entity::{NoteEvent, chordify};
use crate::error::Result;
use crate::generate_entity_map;
use crate::scale::Scale;
use crate::schedule::Schedule;
use ostinato_prng::MelodyRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A generated voice ready for scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub instrument: String,
    pub scale: Scale,
    pub events: Vec<NoteEvent>,
}

/// Run the full pipeline for one voice.
pub fn generate_voice(config: &VoiceConfig, rng: &mut MelodyRng) -> Result<Voice> {
    let scale = match &config.scale {
        Some(spec) => spec.build()?,
        None => Scale::generate_random(rng),
    };
    let mut events = generate_entity_map(&config.piece, Some(&scale), rng)?;
    if let Some(p) = config.chord_probability {
        events = chordify(&events, p, rng)?;
    }
    log::debug!(
        "voice {:?}: {} events over {} (root {})",
        config.instrument,
        events.len(),
        scale.len(),
        scale.root()
    );
    Ok(Voice {
        instrument: config.instrument.clone(),
        scale,
        events,
    })
}

/// Generate every voice in parallel; voice `i` draws from stream `i` of `seed`.
///
/// The first error (in submission order) aborts the whole run.
pub fn generate_voices(configs: &[VoiceConfig], seed: u64) -> Result<Vec<Voice>> {
    log::info!("generating {} voices from seed {seed}", configs.len());
    configs
        .par_iter()
        .enumerate()
        .map(|(index, config)| {
            let mut rng = MelodyRng::for_stream(seed, index as u64);
            generate_voice(config, &mut rng)
        })
        .collect()
}

/// Bind each voice's events to wall-clock times.
pub fn schedule_voices(voices: &[Voice], pivot_time: Duration, base_time: Duration) -> Schedule {
    voices
        .iter()
        .fold(Schedule::builder(pivot_time, base_time), |builder, voice| {
            builder.voice(&voice.instrument, &voice.events)
        })
        .build()
}
