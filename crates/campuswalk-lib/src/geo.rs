//! Geodesy helpers shared by the map loader, spatial index, and maneuver
//! extractor.
//!
//! All angles exposed by this module are in degrees and all distances in
//! metres. The formulas assume a spherical Earth, which is well within the
//! tolerance needed for walking directions on a single campus.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns `true` when both components are finite and inside the valid
    /// latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Forward azimuth from `from` to `to`, clockwise from true north, in
/// `[0, 360)`.
///
/// Coincident points have no direction; `atan2(0, 0)` yields `0.0`, so the
/// degenerate case reports north instead of panicking or returning NaN.
pub fn bearing(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    normalize_bearing(y.atan2(x).to_degrees())
}

/// Wrap any angle into `[0, 360)`.
pub fn normalize_bearing(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Great-circle distance between two coordinates using the haversine formula.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Equirectangular projection around a fixed reference latitude.
///
/// Maps coordinates onto a local plane in metres so that planar Euclidean
/// distance approximates ground distance near the reference point. The same
/// projector must be used for indexing and querying.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equirectangular {
    origin: Coordinate,
    cos_lat: f64,
}

impl Equirectangular {
    pub fn new(origin: Coordinate) -> Self {
        Self {
            origin,
            cos_lat: origin.lat.to_radians().cos(),
        }
    }

    /// Centre a projection on the mean position of `points`.
    ///
    /// Falls back to the null island origin when `points` is empty.
    pub fn centred_on<'a>(points: impl IntoIterator<Item = &'a Coordinate>) -> Self {
        let mut count = 0usize;
        let mut lat_sum = 0.0;
        let mut lon_sum = 0.0;
        for point in points {
            count += 1;
            lat_sum += point.lat;
            lon_sum += point.lon;
        }
        if count == 0 {
            return Self::new(Coordinate::new(0.0, 0.0));
        }
        let n = count as f64;
        Self::new(Coordinate::new(lat_sum / n, lon_sum / n))
    }

    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    /// Project a coordinate to `[east, north]` metres from the origin.
    pub fn project(&self, point: Coordinate) -> [f64; 2] {
        let x = (point.lon - self.origin.lon).to_radians() * self.cos_lat * EARTH_RADIUS_M;
        let y = (point.lat - self.origin.lat).to_radians() * EARTH_RADIUS_M;
        [x, y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} ± {tolerance}, got {actual}"
        );
    }

    #[test]
    fn cardinal_bearings() {
        let origin = Coordinate::new(0.0, 0.0);
        assert_close(bearing(origin, Coordinate::new(1.0, 0.0)), 0.0, 1e-9);
        assert_close(bearing(origin, Coordinate::new(0.0, 1.0)), 90.0, 1e-9);
        assert_close(bearing(origin, Coordinate::new(-1.0, 0.0)), 180.0, 1e-9);
        assert_close(bearing(origin, Coordinate::new(0.0, -1.0)), 270.0, 1e-9);
    }

    #[test]
    fn bearing_of_coincident_points_is_zero() {
        let p = Coordinate::new(22.3149, 87.3105);
        let b = bearing(p, p);
        assert!(b.is_finite());
        assert_eq!(b, 0.0);
    }

    #[test]
    fn normalize_bearing_wraps_negative_and_large_angles() {
        assert_close(normalize_bearing(-90.0), 270.0, 1e-12);
        assert_close(normalize_bearing(720.0), 0.0, 1e-12);
        assert_close(normalize_bearing(359.5), 359.5, 1e-12);
        assert!(normalize_bearing(-1e-20) < 360.0);
    }

    #[test]
    fn haversine_matches_known_distance() {
        // One thousandth of a degree of latitude is roughly 111 metres.
        let d = haversine_distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.001, 0.0));
        assert_close(d, 111.19, 0.05);
    }

    #[test]
    fn equirectangular_agrees_with_haversine_at_campus_scale() {
        let origin = Coordinate::new(22.3149, 87.3105);
        let projector = Equirectangular::new(origin);
        let target = Coordinate::new(22.3180, 87.3140);

        let [x, y] = projector.project(target);
        let planar = (x * x + y * y).sqrt();
        let great_circle = haversine_distance(origin, target);

        assert_close(planar, great_circle, great_circle * 0.001);
    }

    #[test]
    fn coordinate_validation() {
        assert!(Coordinate::new(22.3, 87.3).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }
}
