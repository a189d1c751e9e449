//! Proximity queries over the camera directory.

use serde::Serialize;

use crate::config::{DEFAULT_RADIUS_KM, EARTH_RADIUS_KM};
use crate::error_handling::QueryError;
use crate::models::{DirectorySnapshot, NearbyCamera};

/// A validated proximity query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NearbyQuery {
    /// Latitude of the query point
    pub lat: f64,
    /// Longitude of the query point
    pub lng: f64,
    /// Search radius in kilometers
    #[serde(skip)]
    pub radius_km: f64,
}

impl NearbyQuery {
    /// Parses raw query parameters.
    ///
    /// `lat` and `lng` are required (blank counts as missing) and must be
    /// finite numbers. `radius` defaults to [`DEFAULT_RADIUS_KM`] and must be
    /// finite and non-negative.
    pub fn parse(
        lat: Option<&str>,
        lng: Option<&str>,
        radius: Option<&str>,
    ) -> Result<Self, QueryError> {
        let lat = parse_number("lat", required("lat", lat)?)?;
        let lng = parse_number("lng", required("lng", lng)?)?;
        let radius_km = match present(radius) {
            Some(raw) => {
                let radius = parse_number("radius", raw)?;
                if radius < 0.0 {
                    return Err(QueryError::InvalidNumber {
                        name: "radius",
                        value: raw.to_string(),
                    });
                }
                radius
            }
            None => DEFAULT_RADIUS_KM,
        };
        Ok(NearbyQuery { lat, lng, radius_km })
    }
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(name: &'static str, raw: Option<&'a str>) -> Result<&'a str, QueryError> {
    present(raw).ok_or(QueryError::MissingParameter(name))
}

fn parse_number(name: &'static str, raw: &str) -> Result<f64, QueryError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| QueryError::InvalidNumber {
            name,
            value: raw.to_string(),
        })
}

/// Great-circle distance between two points in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Cameras within `query.radius_km` of the query point, nearest first.
///
/// Cameras at equal distance keep their directory order.
pub fn nearby(query: &NearbyQuery, snapshot: &DirectorySnapshot) -> Vec<NearbyCamera> {
    let mut matches: Vec<NearbyCamera> = snapshot
        .records
        .iter()
        .filter_map(|record| {
            let distance = haversine_km(query.lat, query.lng, record.lat, record.lng);
            (distance <= query.radius_km).then(|| NearbyCamera {
                record: record.clone(),
                distance,
            })
        })
        .collect();
    // sort_by is stable
    matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    matches
}
