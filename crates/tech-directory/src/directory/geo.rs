//! Great-circle distance between requester and technician positions.

use super::domain::Coordinates;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres between two points, or [`Distance::Unbounded`] when either side has no
/// position. `Unbounded` is never within any radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    Km(f64),
    Unbounded,
}

impl Distance {
    pub fn km(self) -> Option<f64> {
        match self {
            Distance::Km(km) => Some(km),
            Distance::Unbounded => None,
        }
    }

    pub fn is_within(self, max_km: f64) -> bool {
        match self {
            Distance::Km(km) => km <= max_km,
            Distance::Unbounded => false,
        }
    }
}

pub fn distance_between(from: Option<Coordinates>, to: Option<Coordinates>) -> Distance {
    match (from, to) {
        (Some(from), Some(to)) => {
            let km = haversine_km(from, to);
            if km.is_finite() {
                Distance::Km(km)
            } else {
                Distance::Unbounded
            }
        }
        _ => Distance::Unbounded,
    }
}

pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat_delta = (to.lat - from.lat).to_radians();
    let lng_delta = (to.lng - from.lng).to_radians();
    let a = (lat_delta / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (lng_delta / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}
