use std::cmp::Ordering;

/// Normalized 0-1 signals behind a venue recommendation. Signals missing
/// for a venue stay at their zero default and simply contribute nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct Signals {
    /// How well the venue matches the query (sport, city)
    pub sim: f64,
    /// Price advantage over the market
    pub price_adv: f64,
    /// Forecast suitability for outdoor play
    pub weather: f64,
    /// Quality composite scaled to 0-1
    pub quality: f64,
    /// Photo/amenity richness
    pub highlight: f64,
    /// Proximity to the caller
    pub distance: f64,
}

/// Weighted recommendation score; the weights sum to 1.0, so a venue
/// maxing every signal scores exactly 1.0.
pub fn score(signals: &Signals) -> f64 {
    0.35 * signals.sim
        + 0.2 * signals.price_adv
        + 0.15 * signals.weather
        + 0.15 * signals.quality
        + 0.1 * signals.highlight
        + 0.05 * signals.distance
}

/// Orders candidates by score descending. Ties keep their input order.
pub fn rank_by_score<T>(candidates: &mut [(T, Signals, f64)]) {
    candidates.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));
}

/// Great-circle distance between two coordinates, in kilometres
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Maps a distance to a 0-1 proximity signal; ~5 km reads as half
pub fn distance_signal(km: f64) -> f64 {
    1.0 / (1.0 + km / 5.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_signals_maxed_scores_one() {
        let signals = Signals {
            sim: 1.0,
            price_adv: 1.0,
            weather: 1.0,
            quality: 1.0,
            highlight: 1.0,
            distance: 1.0,
        };

        assert!((score(&signals) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_default_signals_score_zero() {
        assert_eq!(score(&Signals::default()), 0.0);
    }

    #[test]
    fn test_sim_dominates() {
        let match_only = Signals {
            sim: 1.0,
            ..Signals::default()
        };
        let everything_else = Signals {
            sim: 0.0,
            price_adv: 1.0,
            weather: 1.0,
            ..Signals::default()
        };

        // 0.35 matches the sport; 0.35 is a bargain in good weather
        assert_eq!(score(&match_only), score(&everything_else));
    }

    #[test]
    fn test_ranking_is_descending() {
        let mut candidates = vec![
            ("b", Signals::default(), 0.3),
            ("a", Signals::default(), 0.9),
            ("c", Signals::default(), 0.1),
        ];

        rank_by_score(&mut candidates);

        let order: Vec<&str> = candidates.iter().map(|(name, _, _)| *name).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_haversine_known_distance() {
        // London to Paris is roughly 344 km
        let km = haversine_km(51.5074, -0.1278, 48.8566, 2.3522);

        assert!((km - 344.0).abs() < 5.0);
    }

    #[test]
    fn test_distance_signal_decays() {
        assert_eq!(distance_signal(0.0), 1.0);
        assert!((distance_signal(5.0) - 0.5).abs() < 1e-12);
        assert!(distance_signal(50.0) < 0.1);
    }
}
