// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Survey Cascade Contributors

//! Length and area figures shown next to geotrace and geoshape answers.

pub mod points;

pub use points::{parse_points, GeoError};

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// A `[lat, lon]` pair in degrees.
pub type LatLon = [f64; 2];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapeMetrics {
    /// Square meters (planar approximation).
    pub area: f64,
    /// Meters along the closed ring.
    pub perimeter: f64,
}

/// Great-circle distance between two points, in meters.
pub fn haversine(a: LatLon, b: LatLon) -> f64 {
    let [lat1, lon1] = a;
    let [lat2, lon2] = b;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Length of a geotrace: the sum of consecutive legs. Zero below two points.
pub fn distance(points: &[LatLon]) -> f64 {
    points.windows(2).map(|leg| haversine(leg[0], leg[1])).sum()
}

/// Perimeter and area of a geoshape. Zero below three points.
///
/// The perimeter closes the ring back to the first point. The area is the
/// shoelace formula over raw degrees, scaled to meters at the ring's mean
/// latitude; it is an approximation, not a geodesic area. A ring passed
/// already closed (last point equal to the first) is measured once.
pub fn area_and_perimeter(points: &[LatLon]) -> ShapeMetrics {
    let ring = match points {
        [first, rest @ .., last] if !rest.is_empty() && first == last => &points[..points.len() - 1],
        _ => points,
    };
    if ring.len() < 3 {
        return ShapeMetrics::default();
    }

    let perimeter = distance(ring) + haversine(ring[ring.len() - 1], ring[0]);

    let twice_area: f64 = (0..ring.len())
        .map(|i| {
            let [lat1, lon1] = ring[i];
            let [lat2, lon2] = ring[(i + 1) % ring.len()];
            lon1 * lat2 - lon2 * lat1
        })
        .sum();
    let square_degrees = twice_area.abs() / 2.0;

    let mean_lat = ring.iter().map(|p| p[0]).sum::<f64>() / ring.len() as f64;
    let lon_scale = METERS_PER_DEGREE * mean_lat.to_radians().cos();
    let area = square_degrees * METERS_PER_DEGREE * lon_scale;

    log::debug!(
        "[Geo] Shape of {} points: area={:.1} m², perimeter={:.1} m",
        ring.len(),
        area,
        perimeter
    );

    ShapeMetrics { area, perimeter }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64, tolerance: f64) -> bool {
        ((actual - expected) / expected).abs() < tolerance
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let d = distance(&[[0.0, 0.0], [0.0, 1.0]]);
        assert!(close(d, 111_319.9, 0.01), "got {}", d);
    }

    #[test]
    fn test_distance_needs_two_points() {
        assert_eq!(distance(&[]), 0.0);
        assert_eq!(distance(&[[1.0, 36.8]]), 0.0);
    }

    #[test]
    fn test_distance_sums_legs() {
        let trace = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let expected = haversine(trace[0], trace[1]) + haversine(trace[1], trace[2]);
        assert!((distance(&trace) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_shape_needs_three_points() {
        assert_eq!(area_and_perimeter(&[]), ShapeMetrics::default());
        assert_eq!(
            area_and_perimeter(&[[0.0, 0.0], [0.0, 1.0]]),
            ShapeMetrics::default()
        );
        // Closed ring of two distinct points is still degenerate.
        assert_eq!(
            area_and_perimeter(&[[0.0, 0.0], [0.0, 1.0], [0.0, 0.0]]),
            ShapeMetrics::default()
        );
    }

    #[test]
    fn test_square_near_equator() {
        let side = 0.01;
        let square = [[0.0, 0.0], [0.0, side], [side, side], [side, 0.0]];
        let metrics = area_and_perimeter(&square);

        let side_m = haversine([0.0, 0.0], [0.0, side]);
        assert!(close(metrics.perimeter, 4.0 * side_m, 0.001));

        let expected_area = (side * METERS_PER_DEGREE).powi(2);
        assert!(metrics.area > 0.0);
        assert!(close(metrics.area, expected_area, 0.001));
    }

    #[test]
    fn test_winding_order_does_not_change_area() {
        let ring = [[-1.28, 36.81], [-1.28, 36.83], [-1.30, 36.83], [-1.30, 36.81]];
        let mut reversed = ring;
        reversed.reverse();
        let a = area_and_perimeter(&ring);
        let b = area_and_perimeter(&reversed);
        assert!(close(a.area, b.area, 1e-9));
        assert!(close(a.perimeter, b.perimeter, 1e-9));
    }

    #[test]
    fn test_closed_ring_counts_once() {
        let open = [[0.0, 0.0], [0.0, 0.01], [0.01, 0.01], [0.01, 0.0]];
        let closed = [[0.0, 0.0], [0.0, 0.01], [0.01, 0.01], [0.01, 0.0], [0.0, 0.0]];
        assert_eq!(area_and_perimeter(&open), area_and_perimeter(&closed));
    }
}
