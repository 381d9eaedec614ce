//! Free-text answer evaluation.

use crate::model::Outcome;

/// Absolute tolerance when comparing an answer to the expected value.
///
/// Wide enough to accept the 4-digit rounded quotient stored for
/// non-integer division.
pub const TOLERANCE: f64 = 1e-4;

/// Parse a typed answer, accepting a decimal comma in place of a point.
///
/// Returns `None` for blank or non-numeric input.
pub fn parse_answer(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Classify `raw` against `expected`.
///
/// Blank input stays [`Outcome::Unset`]; unparseable input is
/// [`Outcome::Incorrect`] rather than an error.
pub fn evaluate(raw: &str, expected: f64) -> Outcome {
    if raw.trim().is_empty() {
        return Outcome::Unset;
    }
    match parse_answer(raw) {
        Some(value) if (value - expected).abs() < TOLERANCE => Outcome::Correct,
        _ => Outcome::Incorrect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_integer_is_correct() {
        assert_eq!(evaluate("4", 4.0), Outcome::Correct);
        assert_eq!(evaluate(" 4 ", 4.0), Outcome::Correct);
        assert_eq!(evaluate("-6", -6.0), Outcome::Correct);
    }

    #[test]
    fn within_tolerance_is_correct() {
        assert_eq!(evaluate("4.0001", 4.0), Outcome::Correct);
        assert_eq!(evaluate("0.3333", 0.3333), Outcome::Correct);
    }

    #[test]
    fn outside_tolerance_is_incorrect() {
        assert_eq!(evaluate("4.01", 4.0), Outcome::Incorrect);
        assert_eq!(evaluate("5", 4.0), Outcome::Incorrect);
    }

    #[test]
    fn blank_is_unset() {
        assert_eq!(evaluate("", 3.0), Outcome::Unset);
        assert_eq!(evaluate("   ", 3.0), Outcome::Unset);
    }

    #[test]
    fn garbage_is_incorrect() {
        assert_eq!(evaluate("abc", 3.0), Outcome::Incorrect);
        assert_eq!(evaluate("1,2,3", 1.2), Outcome::Incorrect);
        assert_eq!(evaluate("inf", 3.0), Outcome::Incorrect);
        assert_eq!(evaluate("NaN", 3.0), Outcome::Incorrect);
    }

    #[test]
    fn decimal_comma_is_accepted() {
        assert_eq!(evaluate("3,5", 3.5), Outcome::Correct);
        assert_eq!(parse_answer("0,25"), Some(0.25));
    }
}
