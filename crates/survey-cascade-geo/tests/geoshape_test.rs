// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Survey Cascade Contributors

use survey_cascade_geo::{area_and_perimeter, distance, parse_points, METERS_PER_DEGREE};

#[test]
fn test_mobile_geoshape_answer() {
    // Roughly 100 m x 100 m plot stored closed, with altitude and accuracy.
    let answer = "0.0 0.0 1200 3; 0.0 0.000898 1200 3; 0.000898 0.000898 1201 4; \
                  0.000898 0.0 1201 4; 0.0 0.0 1200 3";
    let points = parse_points(answer).unwrap();
    assert_eq!(points.len(), 5);

    let metrics = area_and_perimeter(&points);
    let side = 0.000898 * METERS_PER_DEGREE;
    assert!((metrics.area - side * side).abs() / (side * side) < 0.001);
    assert!((metrics.perimeter - 4.0 * 99.85).abs() < 1.0, "{}", metrics.perimeter);
}

#[test]
fn test_geotrace_json_answer() {
    let points = parse_points("[[0, 0], [0, 0.5], [0, 1]]").unwrap();
    let d = distance(&points);
    assert!((d - 111_195.0).abs() < 1.0, "{}", d);
}

#[test]
fn test_trace_order_matters_for_shapes_only() {
    let ring = parse_points("[[0, 0], [0, 0.01], [0.01, 0.01], [0.01, 0]]").unwrap();
    let bowtie = parse_points("[[0, 0], [0.01, 0.01], [0, 0.01], [0.01, 0]]").unwrap();

    assert!(area_and_perimeter(&ring).area > area_and_perimeter(&bowtie).area);
}
