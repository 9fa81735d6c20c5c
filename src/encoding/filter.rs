//! Duration filter.
//!
//! Songs containing any note or rest whose quarter length is not in the
//! acceptable set are dropped wholesale.

use crate::types::Score;

/// Default set of acceptable quarter-length durations.
pub const ACCEPTABLE_DURATIONS: &[f64] = &[0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 4.0];

/// Tolerance for comparing parsed durations against the acceptable set.
const DURATION_EPSILON: f64 = 1e-9;

/// Returns the first note/rest duration (in temporal order) outside `acceptable`.
pub fn first_unacceptable_duration(score: &Score, acceptable: &[f64]) -> Option<f64> {
    score
        .flat_events()
        .into_iter()
        .map(|event| event.quarter_length)
        .find(|&ql| !acceptable.iter().any(|a| (a - ql).abs() < DURATION_EPSILON))
}

/// Returns false iff at least one note/rest duration is outside `acceptable`.
pub fn has_acceptable_durations(score: &Score, acceptable: &[f64]) -> bool {
    first_unacceptable_duration(score, acceptable).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kern::parse_kern;

    #[test]
    fn accepts_common_durations() {
        let score = parse_kern("**kern\n16c\n8d\n8.e\n4f\n4.g\n2a\n2.b\n1cc\n*-\n").unwrap();
        assert!(has_acceptable_durations(&score, ACCEPTABLE_DURATIONS));
    }

    #[test]
    fn rejects_triplets() {
        let score = parse_kern("**kern\n4c\n12d\n12e\n12f\n*-\n").unwrap();
        assert!(!has_acceptable_durations(&score, ACCEPTABLE_DURATIONS));
        let found = first_unacceptable_duration(&score, ACCEPTABLE_DURATIONS).unwrap();
        assert!((found - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn rests_are_checked_too() {
        let score = parse_kern("**kern\n4c\n32r\n*-\n").unwrap();
        assert_eq!(
            first_unacceptable_duration(&score, ACCEPTABLE_DURATIONS),
            Some(0.125)
        );
    }

    #[test]
    fn grace_notes_are_rejected() {
        let score = parse_kern("**kern\n8qc\n4d\n*-\n").unwrap();
        assert!(!has_acceptable_durations(&score, ACCEPTABLE_DURATIONS));
    }

    #[test]
    fn custom_set() {
        let score = parse_kern("**kern\n4c\n4d\n*-\n").unwrap();
        assert!(has_acceptable_durations(&score, &[1.0]));
        assert!(!has_acceptable_durations(&score, &[0.5, 2.0]));
    }
}
