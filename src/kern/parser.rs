//! Parser for Humdrum `**kern` files.
//!
//! Supports the subset used by monophonic and simple polyphonic folk-song
//! collections: reference records, one or more `**kern` spines (other spine
//! types are skipped), key / key-signature / meter interpretations, barlines
//! and note/rest/chord data tokens. Spine splits and joins are rejected.

use std::collections::BTreeMap;

use crate::error::{PipelineError, Result};
use crate::types::{Event, EventKind, Key, KeySignature, Measure, Part, Pitch, Score, Step, TimeSignature};

/// Spine manipulators that change the number of columns.
const SPINE_MANIPULATORS: &[&str] = &["*^", "*v", "*+", "*x"];

const SPINE_TERMINATOR: &str = "*-";

/// Parses the contents of a `**kern` file into a [`Score`].
///
/// # Example
///
/// ```ignore
/// use folkseq::kern::parse_kern;
///
/// let score = parse_kern("**kern\n*G:\n4g\n8a\n8b\n=1\n2g\n*-\n")?;
/// assert_eq!(score.parts.len(), 1);
/// ```
pub fn parse_kern(text: &str) -> Result<Score> {
    let mut metadata = BTreeMap::new();
    // For every column: the index of the part it feeds, or None for non-kern spines.
    let mut columns: Option<Vec<Option<usize>>> = None;
    let mut spines: Vec<SpineBuilder> = Vec::new();
    let mut terminated = false;
    let mut line_count = 0;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        line_count = line_no;
        let line = raw.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        if let Some(record) = line.strip_prefix("!!!") {
            if let Some((key, value)) = record.split_once(':') {
                metadata.insert(key.trim().to_string(), value.trim().to_string());
            }
            continue;
        }
        // Global comments span the whole line, so they have no columns.
        if terminated || line.starts_with("!!") || (line.starts_with('!') && columns.is_none()) {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();

        if columns.is_none() {
            if !line.starts_with("**") {
                return Err(PipelineError::parse(
                    line_no,
                    "data before exclusive interpretation",
                ));
            }
            let mut next_part = 0;
            let cols: Vec<Option<usize>> = fields
                .iter()
                .map(|field| {
                    (*field == "**kern").then(|| {
                        next_part += 1;
                        next_part - 1
                    })
                })
                .collect();
            if next_part == 0 {
                return Err(PipelineError::parse(line_no, "no **kern spine"));
            }
            spines = (0..next_part).map(|_| SpineBuilder::new()).collect();
            columns = Some(cols);
            continue;
        }
        let cols = columns.as_deref().unwrap_or_default();

        if fields.len() != cols.len() {
            return Err(PipelineError::parse(
                line_no,
                format!("expected {} columns, found {}", cols.len(), fields.len()),
            ));
        }

        if line.starts_with('!') {
            continue;
        }

        if line.starts_with('*') {
            if fields.contains(&SPINE_TERMINATOR) {
                if fields.iter().all(|f| *f == SPINE_TERMINATOR) {
                    terminated = true;
                    continue;
                }
                return Err(PipelineError::parse(line_no, "unsupported spine termination"));
            }
            for (field, part) in fields.iter().zip(cols.iter()) {
                if let Some(part) = part {
                    spines[*part].interpretation(field, line_no)?;
                }
            }
        } else if line.starts_with('=') {
            for (field, part) in fields.iter().zip(cols.iter()) {
                if let Some(part) = part {
                    spines[*part].barline(field);
                }
            }
        } else {
            for (field, part) in fields.iter().zip(cols.iter()) {
                if let Some(part) = part {
                    if let Some(event) = parse_data_token(field, line_no)? {
                        spines[*part].current.events.push(event);
                    }
                }
            }
        }
    }

    if columns.is_none() {
        return Err(PipelineError::parse(line_count, "no **kern spine"));
    }

    Ok(Score {
        metadata,
        parts: spines.into_iter().map(SpineBuilder::finish).collect(),
    })
}

/// Accumulates measures for one `**kern` spine.
struct SpineBuilder {
    measures: Vec<Measure>,
    current: Measure,
}

impl SpineBuilder {
    fn new() -> Self {
        Self {
            measures: Vec::new(),
            current: Measure::new(None),
        }
    }

    fn interpretation(&mut self, field: &str, line_no: usize) -> Result<()> {
        if SPINE_MANIPULATORS.contains(&field) {
            return Err(PipelineError::parse(
                line_no,
                format!("unsupported spine manipulator {}", field),
            ));
        }
        let body = field.trim_start_matches('*');
        if body.starts_with("k[") {
            self.current.key_signature = KeySignature::parse_kern(body);
        } else if body.ends_with(':') {
            // Unknown (`?:`) keys leave the measure without a key.
            if let Some(key) = Key::parse_kern(body) {
                self.current.key = Some(key);
            }
        } else if let Some(ts) = TimeSignature::parse_kern(body) {
            self.current.time_signature = Some(ts);
        }
        Ok(())
    }

    fn barline(&mut self, field: &str) {
        let digits: String = field
            .trim_start_matches('=')
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        let number = digits.parse().ok();

        if self.current.events.is_empty() {
            // Interpretations before the first barline stay with the first measure.
            if number.is_some() {
                self.current.number = number;
            }
            return;
        }
        let finished = std::mem::replace(&mut self.current, Measure::new(number));
        self.measures.push(finished);
    }

    fn finish(mut self) -> Part {
        let current = self.current;
        let has_annotations =
            current.key.is_some() || current.key_signature.is_some() || current.time_signature.is_some();
        if !current.events.is_empty() || (has_annotations && self.measures.is_empty()) {
            self.measures.push(current);
        }
        Part {
            measures: self.measures,
        }
    }
}

/// A single note or rest sub-token.
struct NoteToken {
    pitch: Option<Pitch>,
    rest: bool,
    quarter_length: f64,
}

/// Parses one data field. Returns `None` for the null token `.`.
fn parse_data_token(field: &str, line_no: usize) -> Result<Option<Event>> {
    if field == "." {
        return Ok(None);
    }
    let tokens = field
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(|t| parse_note_token(t, line_no))
        .collect::<Result<Vec<_>>>()?;

    let Some(first) = tokens.first() else {
        return Err(PipelineError::parse(line_no, "empty data token"));
    };
    let quarter_length = first.quarter_length;

    if tokens.len() == 1 {
        let kind = match (first.rest, first.pitch) {
            (false, Some(pitch)) => EventKind::Note(pitch),
            _ => EventKind::Rest,
        };
        return Ok(Some(Event {
            kind,
            quarter_length,
        }));
    }

    let pitches: Vec<Pitch> = tokens.iter().filter_map(|t| t.pitch).collect();
    if pitches.is_empty() {
        return Ok(Some(Event::rest(quarter_length)));
    }
    Ok(Some(Event {
        kind: EventKind::Chord(pitches),
        quarter_length,
    }))
}

fn parse_note_token(token: &str, line_no: usize) -> Result<NoteToken> {
    let chars: Vec<char> = token.chars().collect();
    let mut recip: Option<String> = None;
    let mut dots = 0;
    let mut grace = false;
    let mut rest = false;
    let mut letters: Option<(char, usize)> = None;
    let mut alter: i8 = 0;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '0'..='9' => {
                if recip.is_some() {
                    return Err(PipelineError::parse(
                        line_no,
                        format!("duration given twice in {:?}", token),
                    ));
                }
                let mut value = String::new();
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '%') {
                    value.push(chars[i]);
                    i += 1;
                }
                recip = Some(value);
                continue;
            }
            'a'..='g' | 'A'..='G' => {
                if letters.is_some() {
                    return Err(PipelineError::parse(
                        line_no,
                        format!("more than one pitch in {:?}", token),
                    ));
                }
                let mut count = 0;
                while i < chars.len() && chars[i] == c {
                    count += 1;
                    i += 1;
                }
                letters = Some((c, count));
                continue;
            }
            '.' => dots += 1,
            'r' => rest = true,
            '#' => alter += 1,
            '-' => alter -= 1,
            'q' | 'Q' | 'p' | 'P' => grace = true,
            // Ties, slurs, beams, articulations and editorial marks.
            _ => {}
        }
        i += 1;
    }

    let pitch = letters.and_then(|(letter, count)| {
        let step = Step::from_char(letter)?;
        let octave = if letter.is_ascii_lowercase() {
            3 + count as i32
        } else {
            4 - count as i32
        };
        Some(Pitch::new(step, alter, octave as i8))
    });

    if pitch.is_none() && !rest {
        return Err(PipelineError::parse(
            line_no,
            format!("no pitch or rest in {:?}", token),
        ));
    }

    let quarter_length = if grace {
        0.0
    } else {
        match recip {
            Some(recip) => recip_to_quarter_length(&recip, line_no)? * dot_factor(dots),
            None => {
                return Err(PipelineError::parse(
                    line_no,
                    format!("missing duration in {:?}", token),
                ))
            }
        }
    };

    Ok(NoteToken {
        pitch,
        rest,
        quarter_length,
    })
}

/// Converts a reciprocal duration (`4`, `12`, `0`, `3%2`) to quarter lengths.
fn recip_to_quarter_length(recip: &str, line_no: usize) -> Result<f64> {
    let invalid = || PipelineError::parse(line_no, format!("invalid duration {:?}", recip));

    if let Some((num, den)) = recip.split_once('%') {
        let num: f64 = num.parse().map_err(|_| invalid())?;
        let den: f64 = den.parse().map_err(|_| invalid())?;
        if num == 0.0 || den == 0.0 {
            return Err(invalid());
        }
        return Ok(4.0 * den / num);
    }

    // 0 is a breve, 00 a longa, 000 a maxima.
    if recip.chars().all(|c| c == '0') {
        return Ok(4.0 * 2f64.powi(recip.len() as i32));
    }

    let value: f64 = recip.parse().map_err(|_| invalid())?;
    Ok(4.0 / value)
}

fn dot_factor(dots: i32) -> f64 {
    2.0 - 0.5f64.powi(dots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::types::Mode;

    const SONG: &str = "!!!OTL: Das Lied\n\
        !!!ARE: Europa, Mitteleuropa, Deutschland\n\
        **kern\n\
        *ICvox\n\
        *Ivox\n\
        *M3/4\n\
        *k[f#]\n\
        *G:\n\
        {4g\n\
        =1\n\
        8.a\n\
        16b\n\
        4cc\n\
        4r\n\
        =2\n\
        2d#}\n\
        ==\n\
        *-\n\
        !!!ONB: ESAC (Essen Associative Code) Database\n";

    #[test]
    fn parses_structure_and_metadata() {
        let score = parse_kern(SONG).unwrap();
        assert_eq!(score.title(), Some("Das Lied"));
        assert!(score.metadata.contains_key("ONB"));
        assert_eq!(score.parts.len(), 1);

        let measures = &score.parts[0].measures;
        assert_eq!(measures.len(), 3);
        assert_eq!(measures[0].number, None);
        assert_eq!(measures[1].number, Some(1));
        assert_eq!(measures[2].number, Some(2));

        let first = &measures[0];
        assert_eq!(first.key, Some(Key::new(Step::G, 0, Mode::Major)));
        assert_eq!(first.key_signature, Some(KeySignature { sharps: 1 }));
        assert_eq!(first.time_signature.map(|t| t.to_string()).as_deref(), Some("3/4"));
    }

    #[test]
    fn parses_pitches_and_durations() {
        let score = parse_kern(SONG).unwrap();
        let events = score.flat_events();
        let summary: Vec<(Option<i32>, f64)> = events
            .iter()
            .map(|e| (e.pitches().first().map(Pitch::midi), e.quarter_length))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Some(67), 1.0),
                (Some(69), 0.75),
                (Some(71), 0.25),
                (Some(72), 1.0),
                (None, 1.0),
                (Some(63), 2.0),
            ]
        );
    }

    #[test]
    fn octave_letters() {
        let score = parse_kern("**kern\n4c\n4cc\n4C\n4CC\n4B-\n*-\n").unwrap();
        let midi: Vec<i32> = score
            .flat_events()
            .iter()
            .map(|e| e.pitches()[0].midi())
            .collect();
        assert_eq!(midi, vec![60, 72, 48, 36, 58]);
    }

    #[test]
    fn special_durations() {
        let score = parse_kern("**kern\n0c\n12d\n3%2e\n8qf\n4..g\n*-\n").unwrap();
        let durations: Vec<f64> = score.flat_events().iter().map(|e| e.quarter_length).collect();
        assert_eq!(durations[0], 8.0);
        assert!((durations[1] - 1.0 / 3.0).abs() < 1e-12);
        assert!((durations[2] - 8.0 / 3.0).abs() < 1e-12);
        assert_eq!(durations[3], 0.0);
        assert_eq!(durations[4], 1.75);
    }

    #[test]
    fn chords_and_multiple_spines() {
        let text = "**kern\t**text\t**kern\n4c 4e\tla\t4C\n4r\t.\t4G\n*-\t*-\t*-\n";
        let score = parse_kern(text).unwrap();
        assert_eq!(score.parts.len(), 2);
        let upper: Vec<&Event> = score.parts[0].events().collect();
        assert!(matches!(&upper[0].kind, EventKind::Chord(p) if p.len() == 2));
        assert_eq!(upper[1].kind, EventKind::Rest);
        assert_eq!(score.parts[1].events().count(), 2);
    }

    #[test]
    fn global_comments_between_multi_spine_records() {
        let text = "**kern\t**kern\n!! second verse\n4c\t4e\n!!!OTL: Lied\n4d\t4f\n*-\t*-\n";
        let score = parse_kern(text).unwrap();
        assert_eq!(score.parts.len(), 2);
        assert_eq!(score.parts[0].events().count(), 2);
        assert_eq!(score.parts[1].events().count(), 2);
        assert_eq!(score.title(), Some("Lied"));
    }

    #[test]
    fn null_tokens_are_skipped() {
        let text = "**kern\t**kern\n2c\t4e\n.\t4f\n*-\t*-\n";
        let score = parse_kern(text).unwrap();
        assert_eq!(score.parts[0].events().count(), 1);
        assert_eq!(score.parts[1].events().count(), 2);
    }

    #[test]
    fn unknown_key_is_ignored() {
        let score = parse_kern("**kern\n*?:\n4c\n*-\n").unwrap();
        assert_eq!(score.annotated_key(), None);
    }

    #[test]
    fn rejects_malformed_input() {
        let missing_spine = parse_kern("**text\nla\n*-\n").unwrap_err();
        assert_eq!(missing_spine.code, ErrorCode::ParseFailed);

        let no_header = parse_kern("4c\n").unwrap_err();
        assert!(no_header.message.contains("line 1"));

        let no_duration = parse_kern("**kern\nc\n*-\n").unwrap_err();
        assert!(no_duration.message.contains("missing duration"));

        let columns = parse_kern("**kern\t**kern\n4c\n*-\t*-\n").unwrap_err();
        assert!(columns.message.contains("line 2"));

        let split = parse_kern("**kern\n*^\n*-\n").unwrap_err();
        assert!(split.message.contains("spine manipulator"));

        let garbage = parse_kern("**kern\n4x\n*-\n").unwrap_err();
        assert!(garbage.message.contains("no pitch or rest"));
    }
}
