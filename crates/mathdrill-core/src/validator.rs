//! Range and selection normalization.
//!
//! Turns loosely-typed user input into well-formed generation constraints.
//! Malformed numbers fall back silently to 0; callers that need strict input
//! must validate before calling in here.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{
    OperandRange, DEFAULT_CEILING, MAX_OPERAND, MAX_TABLE_BASE, MAX_TABLE_MULT, MAX_TASKS,
    MIN_TASKS,
};

/// Parse an operand bound, defaulting to 0 when the text is not a number.
///
/// Fractional input is truncated toward zero and the result is clamped to
/// `±MAX_OPERAND`.
pub fn parse_operand(raw: &str) -> i64 {
    let trimmed = raw.trim();
    let value = match trimmed.parse::<i64>() {
        Ok(v) => v,
        Err(_) => match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => v.trunc() as i64,
            _ => 0,
        },
    };
    value.clamp(-MAX_OPERAND, MAX_OPERAND)
}

/// Build an operand range from two raw bounds, swapping them if reversed.
pub fn normalize_range(start: &str, end: &str) -> OperandRange {
    OperandRange::new(parse_operand(start), parse_operand(end))
}

/// Clamp a requested task count into the supported batch size.
pub fn clamp_task_count(count: usize) -> usize {
    count.clamp(MIN_TASKS, MAX_TASKS)
}

/// Keep only bases inside `1..=MAX_TABLE_BASE`, ordered ascending.
pub fn normalize_selection(bases: &[u32]) -> BTreeSet<u32> {
    bases
        .iter()
        .copied()
        .filter(|b| (1..=MAX_TABLE_BASE).contains(b))
        .collect()
}

/// Convert the persisted string-keyed ceiling map into integer keys.
///
/// Keys that are not valid bases are dropped; values are clamped into
/// `1..=MAX_TABLE_MULT`.
pub fn normalize_ceilings(raw: &BTreeMap<String, u32>) -> BTreeMap<u32, u32> {
    raw.iter()
        .filter_map(|(k, v)| {
            let base = k.trim().parse::<u32>().ok()?;
            (1..=MAX_TABLE_BASE)
                .contains(&base)
                .then(|| (base, clamp_ceiling(*v)))
        })
        .collect()
}

/// Clamp a single ceiling; 0 is treated as "unset".
pub fn clamp_ceiling(ceiling: u32) -> u32 {
    if ceiling == 0 {
        DEFAULT_CEILING
    } else {
        ceiling.min(MAX_TABLE_MULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_operand_fallbacks() {
        assert_eq!(parse_operand("12"), 12);
        assert_eq!(parse_operand("  -4 "), -4);
        assert_eq!(parse_operand("3.9"), 3);
        assert_eq!(parse_operand("abc"), 0);
        assert_eq!(parse_operand(""), 0);
    }

    #[test]
    fn parse_operand_is_bounded() {
        assert_eq!(parse_operand("-1e30"), -MAX_OPERAND);
        assert_eq!(parse_operand("99999999999999"), MAX_OPERAND);
        assert_eq!(parse_operand("inf"), 0);
    }

    #[test]
    fn normalize_range_swaps() {
        let r = normalize_range("9", "3");
        assert_eq!((r.min, r.max), (3, 9));
        let r = normalize_range("x", "5");
        assert_eq!((r.min, r.max), (0, 5));
    }

    #[test]
    fn task_count_is_clamped() {
        assert_eq!(clamp_task_count(0), MIN_TASKS);
        assert_eq!(clamp_task_count(20), 20);
        assert_eq!(clamp_task_count(500), MAX_TASKS);
    }

    #[test]
    fn selection_drops_out_of_range_bases() {
        let s = normalize_selection(&[7, 0, 3, 16, 7]);
        assert_eq!(s.into_iter().collect::<Vec<_>>(), vec![3, 7]);
    }

    #[test]
    fn ceilings_are_parsed_and_clamped() {
        let raw = BTreeMap::from([
            ("3".to_string(), 5),
            ("7".to_string(), 99),
            ("x".to_string(), 4),
            ("20".to_string(), 4),
            ("2".to_string(), 0),
        ]);
        let c = normalize_ceilings(&raw);
        assert_eq!(c.get(&3), Some(&5));
        assert_eq!(c.get(&7), Some(&MAX_TABLE_MULT));
        assert_eq!(c.get(&2), Some(&DEFAULT_CEILING));
        assert_eq!(c.len(), 3);
    }
}
