use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::middleware::session::AppState;
use crate::error::AppError;
use crate::models::court::Court;
use crate::models::facility::{Facility, FacilityCard, FacilityFilter};
use crate::services::quality::{self, QualityInputs};
use crate::services::recommendation::{self, Signals};

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    pub sport: Option<String>,
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Caller-supplied forecast suitability, 0-1 (no weather API behind
    /// this service)
    pub weather: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendedVenue {
    #[serde(flatten)]
    pub venue: FacilityCard,
    pub signals: Signals,
    pub score: f64,
}

// How many candidates to score before cutting to the requested page
const CANDIDATE_POOL: i64 = 200;

/// Query match: the mean of the requested sport/city matches, neutral
/// when the caller expressed no preference
fn sim_signal(facility: &Facility, sport: Option<&str>, city: Option<&str>) -> f64 {
    let mut parts = Vec::new();

    if let Some(sport) = sport {
        let matched = facility.sports.iter().any(|s| s.eq_ignore_ascii_case(sport));
        parts.push(if matched { 1.0 } else { 0.0 });
    }
    if let Some(city) = city {
        parts.push(if facility.city.eq_ignore_ascii_case(city) {
            1.0
        } else {
            0.0
        });
    }

    if parts.is_empty() {
        0.5
    } else {
        parts.iter().sum::<f64>() / parts.len() as f64
    }
}

/// Where the venue's cheapest court sits in the market price range;
/// 1.0 is the cheapest venue on the platform
fn price_advantage(min_price: Option<Decimal>, market: Option<(Decimal, Decimal)>) -> f64 {
    let (Some(price), Some((market_min, market_max))) = (min_price, market) else {
        return 0.0;
    };

    if market_max <= market_min {
        return 1.0;
    }

    let price = price.to_f64().unwrap_or(0.0);
    let min = market_min.to_f64().unwrap_or(0.0);
    let max = market_max.to_f64().unwrap_or(0.0);

    (1.0 - (price - min) / (max - min)).clamp(0.0, 1.0)
}

/// Photo and amenity richness, saturating at four of each
fn highlight_signal(facility: &Facility) -> f64 {
    let photos = (facility.photos.len() as f64 / 4.0).min(1.0);
    let amenities = (facility.amenities.len() as f64 / 4.0).min(1.0);

    0.5 * photos + 0.5 * amenities
}

fn distance_signal(facility: &Facility, lat: Option<f64>, lng: Option<f64>) -> f64 {
    let (Some(lat), Some(lng), Some(flat), Some(flng)) =
        (lat, lng, facility.latitude, facility.longitude)
    else {
        return 0.0;
    };

    recommendation::distance_signal(recommendation::haversine_km(lat, lng, flat, flng))
}

/// Ranked venue recommendations over the approved facilities
async fn recommend_venues(
    State(state): State<AppState>,
    Query(params): Query<RecommendationsQuery>,
) -> Result<Json<Vec<RecommendedVenue>>, AppError> {
    if let Some(weather) = params.weather {
        if !(0.0..=1.0).contains(&weather) {
            return Err(AppError::Validation(
                "weather must be between 0 and 1".to_string(),
            ));
        }
    }

    let cards =
        Facility::list_approved(&state.pool, &FacilityFilter::default(), CANDIDATE_POOL, 0).await?;

    let market = Court::market_price_range(&state.pool).await?;

    let weather = params.weather.unwrap_or(0.5);
    let limit = params.limit.unwrap_or(10).clamp(1, 50);

    let mut scored: Vec<(FacilityCard, Signals, f64)> = cards
        .into_iter()
        .map(|card| {
            let quality_score = quality::compute_quality(QualityInputs {
                rating_avg: card.rating_avg.unwrap_or(0.0),
                rating_count: card.rating_count as f64,
                ..QualityInputs::default()
            });

            let signals = Signals {
                sim: sim_signal(&card.facility, params.sport.as_deref(), params.city.as_deref()),
                price_adv: price_advantage(card.min_price, market),
                weather,
                quality: quality_score / 100.0,
                highlight: highlight_signal(&card.facility),
                distance: distance_signal(&card.facility, params.lat, params.lng),
            };
            let score = recommendation::score(&signals);

            (card, signals, score)
        })
        .collect();

    recommendation::rank_by_score(&mut scored);
    scored.truncate(limit);

    let venues = scored
        .into_iter()
        .map(|(venue, signals, score)| RecommendedVenue {
            venue,
            signals,
            score,
        })
        .collect();

    Ok(Json(venues))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/venues/recommendations", get(recommend_venues))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::facility::ApprovalStatus;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn facility(sports: &[&str], city: &str, photos: usize, amenities: usize) -> Facility {
        Facility {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Test Arena".to_string(),
            description: None,
            address: "1 Main St".to_string(),
            city: city.to_string(),
            latitude: None,
            longitude: None,
            sports: sports.iter().map(|s| s.to_string()).collect(),
            amenities: vec!["item".to_string(); amenities],
            photos: vec!["p.jpg".to_string(); photos],
            approval_status: ApprovalStatus::Approved,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sim_neutral_without_preferences() {
        let f = facility(&["tennis"], "Berlin", 0, 0);

        assert_eq!(sim_signal(&f, None, None), 0.5);
    }

    #[test]
    fn test_sim_blends_sport_and_city() {
        let f = facility(&["tennis", "padel"], "Berlin", 0, 0);

        assert_eq!(sim_signal(&f, Some("Tennis"), Some("berlin")), 1.0);
        assert_eq!(sim_signal(&f, Some("squash"), Some("berlin")), 0.5);
        assert_eq!(sim_signal(&f, Some("squash"), Some("Hamburg")), 0.0);
    }

    #[test]
    fn test_price_advantage_spans_market() {
        let market = Some((dec!(10), dec!(50)));

        assert_eq!(price_advantage(Some(dec!(10)), market), 1.0);
        assert_eq!(price_advantage(Some(dec!(50)), market), 0.0);
        assert_eq!(price_advantage(Some(dec!(30)), market), 0.5);
        assert_eq!(price_advantage(None, market), 0.0);
    }

    #[test]
    fn test_price_advantage_degenerate_market() {
        // A one-price market makes everyone the cheapest
        assert_eq!(price_advantage(Some(dec!(25)), Some((dec!(25), dec!(25)))), 1.0);
        assert_eq!(price_advantage(Some(dec!(25)), None), 0.0);
    }

    #[test]
    fn test_highlight_saturates() {
        assert_eq!(highlight_signal(&facility(&[], "X", 0, 0)), 0.0);
        assert_eq!(highlight_signal(&facility(&[], "X", 2, 0)), 0.25);
        assert_eq!(highlight_signal(&facility(&[], "X", 8, 8)), 1.0);
    }
}
