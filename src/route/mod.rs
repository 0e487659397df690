use thiserror::Error;

mod loader;
pub use loader::*;

use crate::shared::geo::{Coordinate, Distance, project_onto_segment};

#[derive(Error, Debug)]
pub enum Error {
    #[error("A route polyline needs at least two points, got {0}")]
    TooShort(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// A point expressed relative to a route polyline: the projection onto the
/// nearest segment, that segment's index, and the perpendicular distance
/// from the original point to the projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutePosition {
    pub point: Coordinate,
    pub segment: usize,
    pub distance: Distance,
}

/// The fixed path a bus drives, as an ordered polyline. Built once at
/// startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Route {
    points: Vec<Coordinate>,
}

/// How far along its route a bus has come.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub percentage: f64,
    pub covered: Distance,
    pub remaining: Distance,
}

impl Route {
    pub fn new(points: Vec<Coordinate>) -> Result<Self, self::Error> {
        if points.len() < 2 {
            return Err(self::Error::TooShort(points.len()));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Places an arbitrary coordinate on the route. Scans every segment,
    /// projects onto each, and keeps the first projection with the smallest
    /// Haversine distance. GPS noise routinely puts a bus a few meters off
    /// the polyline, so both buses and stops get snapped this way before any
    /// along-route math.
    pub fn project(&self, point: &Coordinate) -> RoutePosition {
        let projected = project_onto_segment(point, &self.points[0], &self.points[1]);
        let mut best = RoutePosition {
            point: projected,
            segment: 0,
            distance: point.distance(&projected),
        };

        for segment in 1..self.points.len() - 1 {
            let projected =
                project_onto_segment(point, &self.points[segment], &self.points[segment + 1]);
            let distance = point.distance(&projected);
            if distance < best.distance {
                best = RoutePosition {
                    point: projected,
                    segment,
                    distance,
                };
            }
        }

        best
    }

    /// Along-route distance from one projected position to a later one:
    /// projection to the next vertex, every full segment in between, then
    /// the final vertex to the target projection.
    pub fn distance_between(&self, from: &RoutePosition, to: &RoutePosition) -> Distance {
        let mut distance = Distance::default();

        if from.segment < self.points.len() - 1 {
            distance = distance + from.point.distance(&self.points[from.segment + 1]);
        }

        for i in from.segment + 1..to.segment {
            distance = distance + self.points[i].distance(&self.points[i + 1]);
        }

        if to.segment < self.points.len() {
            distance = distance + self.points[to.segment].distance(&to.point);
        }

        distance
    }

    /// Along-route distance from a projected position to the end of the
    /// route.
    pub fn distance_to_end(&self, from: &RoutePosition) -> Distance {
        let mut distance = Distance::default();

        if from.segment < self.points.len() - 1 {
            distance = distance + from.point.distance(&self.points[from.segment + 1]);
        }

        for i in from.segment + 1..self.points.len() - 1 {
            distance = distance + self.points[i].distance(&self.points[i + 1]);
        }

        distance
    }

    pub fn total_length(&self) -> Distance {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum()
    }

    /// Snaps the bus onto the route and reports covered/remaining distance
    /// plus a 0-100 percentage.
    pub fn progress(&self, bus: &Coordinate) -> Progress {
        let position = self.project(bus);

        let mut covered = Distance::default();
        for i in 0..position.segment {
            covered = covered + self.points[i].distance(&self.points[i + 1]);
        }
        covered = covered + self.points[position.segment].distance(&position.point);

        let total = self.total_length();
        let percentage = if total.as_meters() > 0.0 {
            (covered.as_meters() / total.as_meters() * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        Progress {
            percentage,
            covered,
            remaining: total - covered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_route() -> Route {
        Route::new(vec![
            Coordinate::from((0.0, 0.0)),
            Coordinate::from((0.0, 1.0)),
            Coordinate::from((0.0, 2.0)),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_degenerate_polylines() {
        assert!(Route::new(vec![]).is_err());
        assert!(Route::new(vec![Coordinate::from((1.0, 1.0))]).is_err());
        assert!(Route::new(vec![Coordinate::from((1.0, 1.0)); 2]).is_ok());
    }

    #[test]
    fn project_snaps_onto_nearest_segment() {
        let route = straight_route();
        let position = route.project(&Coordinate::from((0.1, 1.5)));
        assert_eq!(position.segment, 1);
        assert_eq!(position.point, Coordinate::from((0.0, 1.5)));
        assert!(position.distance.as_kilometers() > 10.0);
    }

    #[test]
    fn project_segment_index_stays_in_bounds() {
        let route = straight_route();
        // Far past the end of the route still maps to the last segment.
        let position = route.project(&Coordinate::from((0.0, 9.0)));
        assert_eq!(position.segment, route.points().len() - 2);
        assert_eq!(position.point, Coordinate::from((0.0, 2.0)));
    }

    #[test]
    fn project_tie_breaks_on_first_segment() {
        // The shared vertex (0,1) is equidistant from both segments.
        let route = straight_route();
        let position = route.project(&Coordinate::from((0.0, 1.0)));
        assert_eq!(position.segment, 0);
    }

    #[test]
    fn project_handles_single_segment_routes() {
        let route = Route::new(vec![
            Coordinate::from((0.0, 0.0)),
            Coordinate::from((0.0, 1.0)),
        ])
        .unwrap();
        let position = route.project(&Coordinate::from((0.2, 0.5)));
        assert_eq!(position.segment, 0);
    }

    #[test]
    fn distance_between_walks_the_polyline() {
        let route = straight_route();
        let from = route.project(&Coordinate::from((0.0, 0.5)));
        let to = route.project(&Coordinate::from((0.0, 2.0)));

        let along = route.distance_between(&from, &to);
        let direct = Coordinate::from((0.0, 0.5)).distance(&Coordinate::from((0.0, 2.0)));
        // On a straight line the along-route distance matches the direct one.
        assert!((along.as_meters() - direct.as_meters()).abs() < 1.0);
    }

    #[test]
    fn distance_to_end_matches_remaining_segments() {
        let route = straight_route();
        let position = route.project(&Coordinate::from((0.0, 0.5)));
        let remaining = route.distance_to_end(&position);
        let expected = Coordinate::from((0.0, 0.5)).distance(&Coordinate::from((0.0, 1.0)))
            + Coordinate::from((0.0, 1.0)).distance(&Coordinate::from((0.0, 2.0)));
        assert!((remaining.as_meters() - expected.as_meters()).abs() < 1e-6);

        // From the very end there is nothing left.
        let end = route.project(&Coordinate::from((0.0, 2.0)));
        assert_eq!(route.distance_to_end(&end).as_meters(), 0.0);
    }

    #[test]
    fn total_length_sums_segments() {
        let route = straight_route();
        let length = route.total_length();
        assert!((length.as_kilometers() - 222.39).abs() < 1.0);
    }

    #[test]
    fn progress_at_midpoint() {
        let route = straight_route();
        let progress = route.progress(&Coordinate::from((0.0, 1.0)));
        assert!((progress.percentage - 50.0).abs() < 0.5);
        assert!(
            (progress.covered.as_meters() + progress.remaining.as_meters()
                - route.total_length().as_meters())
            .abs()
                < 1e-6
        );
    }
}
