use std::{
    cmp,
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub},
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Distance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Distance {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Distance {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|distance| distance.0).sum())
    }
}

impl Distance {
    pub const fn from_meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance * 1000.0)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0 / 1000.0
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from(value: (f64, f64)) -> Self {
        Self {
            latitude: value.0,
            longitude: value.1,
        }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.latitude, value.longitude)
    }
}

impl Coordinate {
    /// Haversine great-circle distance.
    pub fn distance(&self, coord: &Self) -> Distance {
        const R: f64 = 6371.0;
        let dist_lat = f64::to_radians(coord.latitude - self.latitude);
        let dist_lon = f64::to_radians(coord.longitude - self.longitude);
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(f64::to_radians(self.latitude))
                * f64::cos(f64::to_radians(coord.latitude))
                * f64::sin(dist_lon / 2.0)
                * f64::sin(dist_lon / 2.0);
        let c = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));
        Distance::from_kilometers(R * c)
    }

    /// Initial bearing towards `coord` in degrees, `[0, 360)`.
    pub fn bearing(&self, coord: &Self) -> f64 {
        let lat_a = f64::to_radians(self.latitude);
        let lat_b = f64::to_radians(coord.latitude);
        let dist_lon = f64::to_radians(coord.longitude - self.longitude);

        let y = f64::sin(dist_lon) * f64::cos(lat_b);
        let x = f64::cos(lat_a) * f64::sin(lat_b)
            - f64::sin(lat_a) * f64::cos(lat_b) * f64::cos(dist_lon);
        (f64::atan2(y, x).to_degrees() + 360.0) % 360.0
    }
}

/// Orthogonal projection of `point` onto the segment `start..end`, in a
/// locally linearized lat/lng plane. The projection parameter is clamped to
/// the segment, so the result always lies between the two endpoints. A
/// zero-length segment projects to `start`.
pub fn project_onto_segment(point: &Coordinate, start: &Coordinate, end: &Coordinate) -> Coordinate {
    let dx = end.longitude - start.longitude;
    let dy = end.latitude - start.latitude;

    if dx == 0.0 && dy == 0.0 {
        return *start;
    }

    let t = ((point.longitude - start.longitude) * dx + (point.latitude - start.latitude) * dy)
        / (dx * dx + dy * dy);
    let t = t.clamp(0.0, 1.0);

    Coordinate {
        latitude: start.latitude + t * dy,
        longitude: start.longitude + t * dx,
    }
}

#[test]
fn distance_symmetry_test() {
    let coord_a = Coordinate {
        latitude: 23.8103,
        longitude: 90.4125,
    };
    let coord_b = Coordinate {
        latitude: 23.7806,
        longitude: 90.2794,
    };
    let there = coord_a.distance(&coord_b);
    let back = coord_b.distance(&coord_a);
    assert!((there.as_meters() - back.as_meters()).abs() < 1e-9);
    assert_eq!(coord_a.distance(&coord_a), Distance::from_meters(0.0));
}

#[test]
fn distance_known_value_test() {
    // One degree of longitude at the equator is ~111.19 km.
    let coord_a = Coordinate::from((0.0, 0.0));
    let coord_b = Coordinate::from((0.0, 1.0));
    let d = coord_a.distance(&coord_b);
    assert!((d.as_kilometers() - 111.19).abs() < 0.5);
}

#[test]
fn bearing_cardinal_test() {
    let origin = Coordinate::from((0.0, 0.0));
    let north = Coordinate::from((1.0, 0.0));
    let east = Coordinate::from((0.0, 1.0));
    assert!((origin.bearing(&north) - 0.0).abs() < 1e-9);
    assert!((origin.bearing(&east) - 90.0).abs() < 1e-9);
    let b = north.bearing(&origin);
    assert!((0.0..360.0).contains(&b));
    assert!((b - 180.0).abs() < 1e-9);
}

#[test]
fn projection_clamps_to_segment_test() {
    let start = Coordinate::from((0.0, 0.0));
    let end = Coordinate::from((0.0, 1.0));

    // Past the far end clamps to the far end.
    let past = Coordinate::from((0.0, 2.0));
    assert_eq!(project_onto_segment(&past, &start, &end), end);

    // Before the near end clamps to the near end.
    let before = Coordinate::from((0.0, -1.0));
    assert_eq!(project_onto_segment(&before, &start, &end), start);

    // Off to the side lands on the interior.
    let side = Coordinate::from((0.5, 0.5));
    let projected = project_onto_segment(&side, &start, &end);
    assert_eq!(projected, Coordinate::from((0.0, 0.5)));
}

#[test]
fn projection_degenerate_segment_test() {
    let start = Coordinate::from((1.0, 1.0));
    let point = Coordinate::from((2.0, 2.0));
    assert_eq!(project_onto_segment(&point, &start, &start), start);
}
