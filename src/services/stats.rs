use serde::Serialize;
use std::cmp::Ordering;

/// Five-number summary over a set of observations
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuartileSummary {
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl QuartileSummary {
    pub const ZERO: Self = Self {
        min: 0.0,
        p25: 0.0,
        p50: 0.0,
        p75: 0.0,
        max: 0.0,
    };
}

/// Computes `{min, p25, p50, p75, max}` by sorting ascending and indexing
/// each percentile at `floor((n - 1) * p)`. An empty input yields all
/// zeros.
pub fn quartiles(values: &[f64]) -> QuartileSummary {
    if values.is_empty() {
        return QuartileSummary::ZERO;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let at = |p: f64| sorted[((sorted.len() - 1) as f64 * p).floor() as usize];

    QuartileSummary {
        min: sorted[0],
        p25: at(0.25),
        p50: at(0.5),
        p75: at(0.75),
        max: sorted[sorted.len() - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_all_zeros() {
        assert_eq!(quartiles(&[]), QuartileSummary::ZERO);
    }

    #[test]
    fn test_four_values() {
        let summary = quartiles(&[1.0, 2.0, 3.0, 4.0]);

        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        // floor(3 * 0.25) = 0, floor(3 * 0.5) = 1, floor(3 * 0.75) = 2
        assert_eq!(summary.p25, 1.0);
        assert_eq!(summary.p50, 2.0);
        assert_eq!(summary.p75, 3.0);
    }

    #[test]
    fn test_unsorted_input() {
        let summary = quartiles(&[40.0, 10.0, 30.0, 20.0]);

        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.p50, 20.0);
        assert_eq!(summary.max, 40.0);
    }

    #[test]
    fn test_single_value() {
        let summary = quartiles(&[7.5]);

        assert_eq!(summary.min, 7.5);
        assert_eq!(summary.p25, 7.5);
        assert_eq!(summary.p50, 7.5);
        assert_eq!(summary.p75, 7.5);
        assert_eq!(summary.max, 7.5);
    }
}
