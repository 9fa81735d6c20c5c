//! In-memory score model: parts → measures → events.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::key::{Key, KeySignature, TimeSignature};
use super::pitch::{Interval, Pitch};

/// What sounds (or doesn't) during an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Note(Pitch),
    Rest,
    Chord(Vec<Pitch>),
}

/// A note, rest or chord with its duration in quarter lengths.
///
/// Grace notes carry a duration of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub quarter_length: f64,
}

impl Event {
    pub fn note(pitch: Pitch, quarter_length: f64) -> Self {
        Self {
            kind: EventKind::Note(pitch),
            quarter_length,
        }
    }

    pub fn rest(quarter_length: f64) -> Self {
        Self {
            kind: EventKind::Rest,
            quarter_length,
        }
    }

    /// Pitches sounding in this event (empty for rests).
    pub fn pitches(&self) -> &[Pitch] {
        match &self.kind {
            EventKind::Note(pitch) => std::slice::from_ref(pitch),
            EventKind::Rest => &[],
            EventKind::Chord(pitches) => pitches,
        }
    }

    fn transpose(&self, interval: Interval) -> Self {
        let kind = match &self.kind {
            EventKind::Note(pitch) => EventKind::Note(pitch.transpose(interval)),
            EventKind::Rest => EventKind::Rest,
            EventKind::Chord(pitches) => {
                EventKind::Chord(pitches.iter().map(|p| p.transpose(interval)).collect())
            }
        };
        Self {
            kind,
            quarter_length: self.quarter_length,
        }
    }
}

/// One bar of a part, with the annotations that appeared in it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// Bar number from the source; `None` for a pickup before the first barline.
    pub number: Option<u32>,
    pub key: Option<Key>,
    pub key_signature: Option<KeySignature>,
    pub time_signature: Option<TimeSignature>,
    pub events: Vec<Event>,
}

impl Measure {
    pub fn new(number: Option<u32>) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    /// Total quarter-length duration of the events in this measure.
    pub fn duration(&self) -> f64 {
        self.events.iter().map(|e| e.quarter_length).sum()
    }
}

/// A single voice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub measures: Vec<Measure>,
}

impl Part {
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.measures.iter().flat_map(|m| m.events.iter())
    }
}

/// A parsed song.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Reference records (`!!!KEY: value`), keyed by record code.
    pub metadata: BTreeMap<String, String>,
    pub parts: Vec<Part>,
}

impl Score {
    /// The song title (`OTL` reference record), if present.
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("OTL").map(String::as_str)
    }

    /// Key annotation of the first measure of the first part.
    pub fn annotated_key(&self) -> Option<Key> {
        self.parts.first()?.measures.first()?.key
    }

    /// All notes, rests and chords in temporal order.
    ///
    /// Events from every part are merged by onset; for equal onsets the
    /// earlier part comes first.
    pub fn flat_events(&self) -> Vec<&Event> {
        let mut timed: Vec<(f64, usize, &Event)> = Vec::new();
        for (part_index, part) in self.parts.iter().enumerate() {
            let mut offset = 0.0;
            for event in part.events() {
                timed.push((offset, part_index, event));
                offset += event.quarter_length;
            }
        }
        timed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        timed.into_iter().map(|(_, _, event)| event).collect()
    }

    /// Total quarter-length duration of the longest part.
    pub fn duration(&self) -> f64 {
        self.parts
            .iter()
            .map(|p| p.measures.iter().map(Measure::duration).sum::<f64>())
            .fold(0.0, f64::max)
    }

    /// Returns a copy with every pitch, key and key signature moved by `interval`.
    pub fn transpose(&self, interval: Interval) -> Score {
        let parts = self
            .parts
            .iter()
            .map(|part| Part {
                measures: part
                    .measures
                    .iter()
                    .map(|m| Measure {
                        number: m.number,
                        key: m.key.map(|k| k.transpose(interval)),
                        key_signature: m.key_signature.map(|ks| ks.transpose(interval)),
                        time_signature: m.time_signature,
                        events: m.events.iter().map(|e| e.transpose(interval)).collect(),
                    })
                    .collect(),
            })
            .collect();
        Score {
            metadata: self.metadata.clone(),
            parts,
        }
    }
}
