//! Score-history analytics.

use crate::domain::models::{QualityReport, Trend};

/// Rounds to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Summarises a review score history.
///
/// - `average`: mean rounded to one decimal, `0.0` when there are no scores
/// - `trend`: last score compared with the first, `insufficient_data` below two scores
/// - `velocity`: `(last - first) / (len - 1)`, `0.0` below two scores
pub fn analyze(scores: &[u8]) -> QualityReport {
    let average = if scores.is_empty() {
        0.0
    } else {
        let sum: f64 = scores.iter().map(|s| f64::from(*s)).sum();
        round1(sum / scores.len() as f64)
    };

    let (trend, velocity) = match (scores.first(), scores.last()) {
        (Some(first), Some(last)) if scores.len() >= 2 => {
            let trend = match last.cmp(first) {
                std::cmp::Ordering::Greater => Trend::Improving,
                std::cmp::Ordering::Less => Trend::Declining,
                std::cmp::Ordering::Equal => Trend::Stable,
            };
            let delta = f64::from(*last) - f64::from(*first);
            (trend, delta / (scores.len() - 1) as f64)
        }
        _ => (Trend::InsufficientData, 0.0),
    };

    QualityReport {
        average,
        trend,
        velocity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_improving_history() {
        let report = analyze(&[5, 7, 9]);
        assert!((report.average - 7.0).abs() < f64::EPSILON);
        assert_eq!(report.trend, Trend::Improving);
        assert!((report.velocity - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_score() {
        let report = analyze(&[8]);
        assert!((report.average - 8.0).abs() < f64::EPSILON);
        assert_eq!(report.trend, Trend::InsufficientData);
        assert!(report.velocity.abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_history() {
        let report = analyze(&[]);
        assert!(report.average.abs() < f64::EPSILON);
        assert_eq!(report.trend, Trend::InsufficientData);
    }

    #[test]
    fn test_declining_and_stable() {
        let declining = analyze(&[9, 4]);
        assert_eq!(declining.trend, Trend::Declining);
        assert!((declining.velocity + 5.0).abs() < f64::EPSILON);

        // Only the endpoints decide the trend
        let stable = analyze(&[6, 10, 2, 6]);
        assert_eq!(stable.trend, Trend::Stable);
        assert!(stable.velocity.abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        let report = analyze(&[4, 8, 8]);
        assert!((report.average - 6.7).abs() < 1e-9);
    }
}
