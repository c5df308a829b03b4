// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Mean radius of Earth, in meters.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_RADIUS: f64 = 6_371_008.8;

/// Mean diameter of Earth, in meters.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_DIAMETER: f64 = EARTH_RADIUS + EARTH_RADIUS;

/// Maximum difference (in degrees, on both axes) between two positions
/// which are considered to be the same point.
pub const COORDINATE_EPSILON: f64 = 1e-6;

/// Calculates the great-circle distance between two lat-lon positions
/// on Earth using the `haversine formula <https://en.wikipedia.org/wiki/Haversine_formula>`_.
/// Returns the result in meters.
pub fn earth_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lon1 = lon1.to_radians();
    let lat2 = lat2.to_radians();
    let lon2 = lon2.to_radians();

    let sin_dlat_half = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon_half = ((lon2 - lon1) * 0.5).sin();

    let h = sin_dlat_half * sin_dlat_half + lat1.cos() * lat2.cos() * sin_dlon_half * sin_dlon_half;

    // Rounding may push h slightly above 1 for antipodal points
    EARTH_DIAMETER * h.sqrt().min(1.0).asin()
}

/// A lat-lon position on Earth, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to another position, in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        earth_distance(self.lat, self.lon, other.lat, other.lon)
    }

    /// Checks whether both axes differ by no more than [COORDINATE_EPSILON].
    pub fn almost_eq(&self, other: &Coordinate) -> bool {
        (self.lat - other.lat).abs() <= COORDINATE_EPSILON
            && (self.lon - other.lon).abs() <= COORDINATE_EPSILON
    }
}

/// Linearly interpolates between two positions, with `t = 0` returning `a`
/// and `t = 1` returning `b`.
///
/// The interpolation is done on raw degrees, which is good enough
/// for the short distances between consecutive vertices of a path.
pub fn interpolate(a: Coordinate, b: Coordinate, t: f64) -> Coordinate {
    Coordinate {
        lat: a.lat + (b.lat - a.lat) * t,
        lon: a.lon + (b.lon - a.lon) * t,
    }
}

/// Total great-circle length of a polyline, in meters.
pub fn polyline_length(points: &[Coordinate]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn earth_distance_known_value() {
        // Warsaw Centralna -> Kraków Główny, roughly 252 km
        let d = earth_distance(52.2288, 21.0034, 50.0678, 19.9477);
        assert_relative_eq!(d, 252_000.0, max_relative = 0.01);
    }

    #[test]
    fn earth_distance_is_symmetric_and_zero_on_itself() {
        let a = earth_distance(46.5, 8.0, 46.51, 8.02);
        let b = earth_distance(46.51, 8.02, 46.5, 8.0);
        assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        assert_eq!(earth_distance(46.5, 8.0, 46.5, 8.0), 0.0);
    }

    #[test]
    fn interpolate_midpoint() {
        let m = interpolate(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 2.0), 0.5);
        assert_abs_diff_eq!(m.lat, 0.5);
        assert_abs_diff_eq!(m.lon, 1.0);
    }

    #[test]
    fn almost_eq_uses_epsilon() {
        let a = Coordinate::new(46.0, 8.0);
        assert!(a.almost_eq(&Coordinate::new(46.0 + 5e-7, 8.0 - 5e-7)));
        assert!(!a.almost_eq(&Coordinate::new(46.0 + 5e-6, 8.0)));
    }

    #[test]
    fn polyline_length_sums_legs() {
        let pts = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 0.001),
            Coordinate::new(0.001, 0.001),
        ];
        let expected = earth_distance(0.0, 0.0, 0.0, 0.001) + earth_distance(0.0, 0.001, 0.001, 0.001);
        assert_abs_diff_eq!(polyline_length(&pts), expected, epsilon = 1e-9);
        assert_eq!(polyline_length(&pts[..1]), 0.0);
    }
}
