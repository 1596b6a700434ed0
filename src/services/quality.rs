/// Inputs to the facility quality composite. The defaults mirror the
/// product's assumptions for facilities with no operational history:
/// slightly imperfect punctuality, a low complaint base rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityInputs {
    /// Average review rating, 0-5
    pub rating_avg: f64,
    /// Number of reviews behind the average
    pub rating_count: f64,
    /// Share of bookings that started on time, 0-1
    pub on_time_rate: f64,
    /// Share of bookings that drew a complaint, 0-1
    pub complaint_rate: f64,
}

impl Default for QualityInputs {
    fn default() -> Self {
        Self {
            rating_avg: 0.0,
            rating_count: 0.0,
            on_time_rate: 0.9,
            complaint_rate: 0.02,
        }
    }
}

/// Weighted quality composite on a 0-100 scale.
///
/// `0.6 * rating_avg * 20 + 0.2 * (log10(1 + rating_count) / 2) * 100
///  + 0.1 * on_time_rate * 100 + 0.1 * (1 - complaint_rate) * 100`,
/// clamped to `[0, 100]` and rounded.
pub fn compute_quality(inputs: QualityInputs) -> f64 {
    let rating_term = 0.6 * inputs.rating_avg * 20.0;
    let volume_term = 0.2 * ((1.0 + inputs.rating_count).log10() / 2.0) * 100.0;
    let punctuality_term = 0.1 * inputs.on_time_rate * 100.0;
    let complaint_term = 0.1 * (1.0 - inputs.complaint_rate) * 100.0;

    (rating_term + volume_term + punctuality_term + complaint_term)
        .clamp(0.0, 100.0)
        .round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_facility_clamps_to_100() {
        let score = compute_quality(QualityInputs {
            rating_avg: 5.0,
            rating_count: 100.0,
            on_time_rate: 1.0,
            complaint_rate: 0.0,
        });

        // 60 + 20.04 + 10 + 10 exceeds the scale before clamping
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_defaults() {
        // 0 + 0 + 0.1*0.9*100 + 0.1*0.98*100 = 18.8 -> 19
        assert_eq!(compute_quality(QualityInputs::default()), 19.0);
    }

    #[test]
    fn test_rating_volume_dampening() {
        let few = compute_quality(QualityInputs {
            rating_avg: 4.0,
            rating_count: 3.0,
            ..QualityInputs::default()
        });
        let many = compute_quality(QualityInputs {
            rating_avg: 4.0,
            rating_count: 300.0,
            ..QualityInputs::default()
        });

        assert!(many > few);
    }

    #[test]
    fn test_never_negative() {
        let score = compute_quality(QualityInputs {
            rating_avg: 0.0,
            rating_count: 0.0,
            on_time_rate: 0.0,
            complaint_rate: 1.0,
        });

        assert_eq!(score, 0.0);
    }
}
