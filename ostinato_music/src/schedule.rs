// Schedule building: the hand-off to an external playback scheduler.
//
// A generated voice is a list of `NoteEvent`s whose positions are slot
// indices. The scheduler needs wall-clock times, so the builder maps each
// event to `pivot_time + position * base_time` and tags it with the voice's
// instrument name. The output is plain data; actually sounding the notes at
// those times is the caller's job.
//
// `Schedule::perform` is a convenience that dispatches every note, in time
// order, to a named `Instrument` without waiting; a real scheduler would
// sleep until each note's time first.

use crate::entity::NoteEvent;
use crate::pitch::Pitch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Anything that can sound a pitch.
pub trait Instrument {
    fn play(&mut self, note: Pitch);
}

/// One note bound to a time and an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledNote {
    /// Offset from the scheduler's clock origin.
    pub time: Duration,
    pub instrument: String,
    pub note: Pitch,
}

/// Accumulates voices before producing a `Schedule`.
#[derive(Debug, Clone)]
pub struct ScheduleBuilder {
    pivot_time: Duration,
    base_time: Duration,
    notes: Vec<ScheduledNote>,
}

impl ScheduleBuilder {
    /// Add a voice: every event is bound to `instrument`.
    pub fn voice(mut self, instrument: &str, events: &[NoteEvent]) -> Self {
        self.notes.extend(events.iter().map(|event| ScheduledNote {
            time: self.pivot_time + self.base_time * event.position,
            instrument: instrument.to_string(),
            note: event.note,
        }));
        self
    }

    pub fn build(self) -> Schedule {
        Schedule {
            base_time: self.base_time,
            notes: self.notes,
        }
    }
}

/// Scheduled notes, ordered by voice and then by position within the voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Duration of one sixteenth-note slot.
    pub base_time: Duration,
    pub notes: Vec<ScheduledNote>,
}

impl Schedule {
    pub fn builder(pivot_time: Duration, base_time: Duration) -> ScheduleBuilder {
        ScheduleBuilder {
            pivot_time,
            base_time,
            notes: Vec::new(),
        }
    }

    /// Instrument names in order of first appearance.
    pub fn instruments(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for note in &self.notes {
            if !names.contains(&note.instrument.as_str()) {
                names.push(&note.instrument);
            }
        }
        names
    }

    /// Notes sorted by time; simultaneous notes keep their voice order.
    pub fn in_time_order(&self) -> Vec<&ScheduledNote> {
        let mut notes: Vec<&ScheduledNote> = self.notes.iter().collect();
        notes.sort_by_key(|n| n.time);
        notes
    }

    /// Time of the last note, or zero for an empty schedule.
    pub fn end_time(&self) -> Duration {
        self.notes.iter().map(|n| n.time).max().unwrap_or_default()
    }

    /// Trigger every note on its instrument, in time order.
    ///
    /// Notes whose instrument is missing from `instruments` are skipped.
    pub fn perform(&self, instruments: &mut BTreeMap<String, Box<dyn Instrument>>) {
        for scheduled in self.in_time_order() {
            match instruments.get_mut(&scheduled.instrument) {
                Some(instrument) => instrument.play(scheduled.note),
                None => log::warn!(
                    "no instrument named {:?}; dropping {}",
                    scheduled.instrument,
                    scheduled.note
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::parse;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl Instrument for Recorder {
        fn play(&mut self, note: Pitch) {
            self.0.borrow_mut().push(note.to_string());
        }
    }

    fn event(position: u32, note: &str) -> NoteEvent {
        NoteEvent {
            position,
            note: parse(note).unwrap(),
        }
    }

    #[test]
    fn test_times_follow_positions() {
        let schedule = Schedule::builder(Duration::from_secs(2), Duration::from_millis(125))
            .voice("lead", &[event(1, "C4"), event(4, "E4")])
            .build();
        let times: Vec<Duration> = schedule.notes.iter().map(|n| n.time).collect();
        assert_eq!(
            times,
            vec![Duration::from_millis(2125), Duration::from_millis(2500)]
        );
        assert_eq!(schedule.end_time(), Duration::from_millis(2500));
        assert_eq!(schedule.notes[0].instrument, "lead");
    }

    #[test]
    fn test_voices_keep_submission_order() {
        let schedule = Schedule::builder(Duration::ZERO, Duration::from_millis(100))
            .voice("bass", &[event(1, "C2"), event(9, "G2")])
            .voice("lead", &[event(1, "C5"), event(3, "D5")])
            .build();
        assert_eq!(schedule.instruments(), vec!["bass", "lead"]);
        let ordered: Vec<String> = schedule
            .in_time_order()
            .iter()
            .map(|n| n.note.to_string())
            .collect();
        assert_eq!(ordered, ["C2", "C5", "D5", "G2"]);
    }

    #[test]
    fn test_perform_dispatches_by_instrument() {
        let bass_log = Rc::new(RefCell::new(Vec::new()));
        let lead_log = Rc::new(RefCell::new(Vec::new()));
        let mut instruments: BTreeMap<String, Box<dyn Instrument>> = BTreeMap::new();
        instruments.insert("bass".into(), Box::new(Recorder(bass_log.clone())));
        instruments.insert("lead".into(), Box::new(Recorder(lead_log.clone())));

        let schedule = Schedule::builder(Duration::ZERO, Duration::from_millis(100))
            .voice("bass", &[event(1, "C2"), event(5, "G2")])
            .voice("lead", &[event(2, "E5")])
            .voice("unknown", &[event(3, "A4")])
            .build();
        schedule.perform(&mut instruments);

        assert_eq!(*bass_log.borrow(), ["C2", "G2"]);
        assert_eq!(*lead_log.borrow(), ["E5"]);
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = Schedule::builder(Duration::ZERO, Duration::from_millis(100)).build();
        assert!(schedule.notes.is_empty());
        assert_eq!(schedule.end_time(), Duration::ZERO);
        assert!(schedule.instruments().is_empty());
    }
}
