// MIDI encoding of schedules.
//
// Converts a `Schedule` into an in-memory Standard MIDI File so an external
// player or DAW can perform it. Output is SMF Format 1: track 0 carries the
// tempo, then one track per instrument in order of first appearance, each on
// its own channel. Times are converted to ticks at the given tempo.
//
// Every note is gated for exactly one slot (`schedule.base_time`); the
// generator has no notion of note length. Pitches above MIDI key 127 (the
// top of octave 9) cannot be encoded and are dropped with a warning.
//
// Uses the `midly` crate for MIDI writing.

use crate::error::Result;
use crate::schedule::Schedule;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::time::Duration;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Largest value a 24-bit tempo meta event can carry.
const MAX_TEMPO_MICROSECONDS: u32 = 0xFF_FFFF;

/// Note-on velocity for every note.
const VELOCITY: u8 = 80;

/// Channel 10 (index 9) is reserved for percussion in General MIDI.
const DRUM_CHANNEL: u8 = 9;

fn to_ticks(time: Duration, tempo_bpm: u16) -> u32 {
    let quarters = time.as_secs_f64() * tempo_bpm.max(1) as f64 / 60.0;
    (quarters * TICKS_PER_QUARTER as f64).round() as u32
}

/// Melodic channel for the `index`-th instrument, skipping the drum channel.
fn channel_for(index: usize) -> u4 {
    let channel = (index % 15) as u8;
    u4::new(if channel >= DRUM_CHANNEL { channel + 1 } else { channel })
}

/// Convert a schedule to an in-memory SMF.
pub fn schedule_to_smf(schedule: &Schedule, tempo_bpm: u16) -> Smf<'_> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    // Track 0: tempo track. Tempos below MIN_TEMPO_BPM saturate at the
    // slowest encodable value.
    let tempo_microseconds =
        (60_000_000 / tempo_bpm.max(1) as u32).min(MAX_TEMPO_MICROSECONDS);
    smf.tracks.push(vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ]);

    let gate = to_ticks(schedule.base_time, tempo_bpm).max(1);

    for (index, name) in schedule.instruments().into_iter().enumerate() {
        let channel = channel_for(index);

        // (tick, is_note_on, key); note-offs sort before note-ons on a tie so
        // a repeated key is released before it is struck again.
        let mut timeline: Vec<(u32, bool, u8)> = Vec::new();
        for scheduled in schedule.notes.iter().filter(|n| n.instrument == name) {
            let key = scheduled.note.midi();
            if key > 127 {
                log::warn!("{} is above the MIDI range; skipping", scheduled.note);
                continue;
            }
            let start = to_ticks(scheduled.time, tempo_bpm);
            timeline.push((start, true, key as u8));
            timeline.push((start + gate, false, key as u8));
        }
        timeline.sort();

        let mut track: Track<'_> = Vec::with_capacity(timeline.len() + 2);
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
        });

        let mut last_tick = 0;
        for (tick, is_on, key) in timeline {
            let message = if is_on {
                MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(VELOCITY),
                }
            } else {
                MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(0),
                }
            };
            track.push(TrackEvent {
                delta: u28::new(tick - last_tick),
                kind: TrackEventKind::Midi { channel, message },
            });
            last_tick = tick;
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);
    }

    smf
}

/// Encode a schedule as SMF bytes.
pub fn encode_smf(schedule: &Schedule, tempo_bpm: u16) -> Result<Vec<u8>> {
    let smf = schedule_to_smf(schedule, tempo_bpm);
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}
