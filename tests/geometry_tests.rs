//! Geometry Tests
//!
//! Tests for:
//! - Cubic bezier arc length and arc-length parameterization
//! - Path primitives (rect, oval, polystar, polygon)
//! - Dashing (offsets, pass-through and degenerate patterns)
//! - Path-measure trimming

use glam::Vec2;

use flicker::geometry::bezier::CubicBez;
use flicker::geometry::dash::Dasher;
use flicker::geometry::measure::PathMeasure;
use flicker::geometry::path::{Path, PathDirection};
use flicker::geometry::rect::Rect;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Bezier
// ============================================================================

#[test]
fn bezier_line_length_matches_chord() {
    let b = CubicBez::from_points(
        Vec2::ZERO,
        Vec2::new(1.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(3.0, 0.0),
    );
    assert!((b.length() - 3.0).abs() < 0.01, "got {}", b.length());
}

#[test]
fn bezier_curve_length_exceeds_chord() {
    let b = CubicBez::from_points(
        Vec2::ZERO,
        Vec2::new(0.0, 10.0),
        Vec2::new(10.0, 10.0),
        Vec2::new(10.0, 0.0),
    );
    let chord = 10.0;
    assert!(b.length() > chord, "curve length {} <= chord", b.length());
}

#[test]
fn bezier_t_at_length_endpoints() {
    let b = CubicBez::from_points(
        Vec2::ZERO,
        Vec2::new(5.0, 1.0),
        Vec2::new(10.0, -1.0),
        Vec2::new(15.0, 0.0),
    );
    assert!(approx(b.t_at_length(0.0), 0.0));
    assert!(approx(b.t_at_length(b.length() + 1.0), 1.0));
}

#[test]
fn bezier_split_at_length_partitions() {
    let b = CubicBez::from_points(
        Vec2::ZERO,
        Vec2::new(0.0, 8.0),
        Vec2::new(8.0, 8.0),
        Vec2::new(8.0, 0.0),
    );
    let total = b.length();
    let (left, right) = b.split_at_length(total * 0.25);
    let sum = left.length() + right.length();
    assert!(
        (sum - total).abs() < 0.05,
        "split lengths {sum} != total {total}"
    );
    assert!((left.length() - total * 0.25).abs() < 0.05);
}

// ============================================================================
// Path primitives
// ============================================================================

#[test]
fn rect_perimeter_length() {
    let mut p = Path::new();
    p.add_rect(Rect::new(0.0, 0.0, 4.0, 3.0), PathDirection::Cw);
    assert!(
        (p.length() - 14.0).abs() < 0.01,
        "perimeter {}",
        p.length()
    );
}

#[test]
fn oval_stays_inside_bounds() {
    let mut p = Path::new();
    p.add_oval(Rect::new(0.0, 0.0, 10.0, 6.0), PathDirection::Cw);
    for pt in p.points() {
        assert!(pt.x >= -0.01 && pt.x <= 10.01, "x out of bounds: {pt:?}");
        assert!(pt.y >= -0.01 && pt.y <= 6.01, "y out of bounds: {pt:?}");
    }
}

#[test]
fn circle_circumference() {
    let mut p = Path::new();
    p.add_circle(0.0, 0.0, 10.0, PathDirection::Cw);
    let expected = 2.0 * std::f32::consts::PI * 10.0;
    assert!(
        (p.length() - expected).abs() / expected < 0.01,
        "circumference {} vs {expected}",
        p.length()
    );
}

#[test]
fn polystar_without_roundness_uses_lines() {
    let mut p = Path::new();
    p.add_polystar(5.0, 2.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, PathDirection::Cw);
    // 1 move + 10 corners + close.
    assert_eq!(p.points().len(), 11, "got {}", p.points().len());
    // Every vertex sits on one of the two radii.
    for pt in p.points() {
        let r = pt.length();
        assert!(
            (r - 2.0).abs() < 0.01 || (r - 5.0).abs() < 0.01,
            "vertex off radius: {pt:?} (r={r})"
        );
    }
}

#[test]
fn polygon_vertex_count() {
    let mut p = Path::new();
    p.add_polygon(6.0, 4.0, 0.0, 0.0, 0.0, 0.0, PathDirection::Cw);
    assert_eq!(p.points().len(), 7);
}

#[test]
fn empty_rect_produces_no_path() {
    let mut p = Path::new();
    p.add_rect(Rect::new(0.0, 0.0, 0.0, 10.0), PathDirection::Cw);
    assert!(p.is_empty());
}

// ============================================================================
// Dashing
// ============================================================================

fn horizontal_line(len: f32) -> Path {
    let mut p = Path::new();
    p.move_to(Vec2::ZERO);
    p.line_to(Vec2::new(len, 0.0));
    p
}

#[test]
fn dash_splits_line_into_segments() {
    let mut dasher = Dasher::new(&[2.0, 2.0]);
    let dashed = dasher.dashed(&horizontal_line(10.0));
    // 10 units of (2 on, 2 off) -> three on segments.
    let moves = dashed
        .elements()
        .iter()
        .filter(|e| matches!(e, flicker::geometry::path::PathElement::MoveTo))
        .count();
    assert_eq!(moves, 3, "expected 3 dash segments");
    assert!((dashed.length() - 6.0).abs() < 0.2, "on-length {}", dashed.length());
}

#[test]
fn dash_all_zero_lengths_is_empty() {
    let mut dasher = Dasher::new(&[0.0, 0.0]);
    assert!(dasher.dashed(&horizontal_line(10.0)).is_empty());
}

#[test]
fn dash_without_gaps_passes_through() {
    let line = horizontal_line(10.0);
    let mut dasher = Dasher::new(&[5.0, 0.0]);
    assert_eq!(dasher.dashed(&line), line);
}

#[test]
fn dash_empty_pattern_passes_through() {
    let line = horizontal_line(10.0);
    let mut dasher = Dasher::new(&[]);
    assert_eq!(dasher.dashed(&line), line);
}

#[test]
fn dash_offset_shifts_pattern() {
    // (4 on, 4 off) with offset 4 starts inside the gap.
    let mut dasher = Dasher::new(&[4.0, 4.0, 4.0]);
    let dashed = dasher.dashed(&horizontal_line(8.0));
    assert!(!dashed.is_empty());
    let first = dashed.points()[0];
    assert!(first.x > 3.9, "expected start after the gap, got {first:?}");
}

// ============================================================================
// Trim
// ============================================================================

#[test]
fn trim_zero_window_is_empty() {
    let mut measure = PathMeasure::new();
    measure.set_range(0.3, 0.3);
    assert!(measure.trim(&horizontal_line(10.0)).is_empty());
}

#[test]
fn trim_full_window_passes_through() {
    let line = horizontal_line(10.0);
    let mut measure = PathMeasure::new();
    measure.set_range(0.0, 1.0);
    assert_eq!(measure.trim(&line), line);
}

#[test]
fn trim_front_half() {
    let mut measure = PathMeasure::new();
    measure.set_range(0.0, 0.5);
    let trimmed = measure.trim(&horizontal_line(10.0));
    assert!((trimmed.length() - 5.0).abs() < 0.2, "got {}", trimmed.length());
    let last = trimmed.points()[trimmed.points().len() - 1];
    assert!(last.x < 5.3, "trim end too far: {last:?}");
}

#[test]
fn trim_middle_window() {
    let mut measure = PathMeasure::new();
    measure.set_range(0.25, 0.75);
    let trimmed = measure.trim(&horizontal_line(10.0));
    assert!((trimmed.length() - 5.0).abs() < 0.2);
    let first = trimmed.points()[0];
    assert!((first.x - 2.5).abs() < 0.2, "trim start: {first:?}");
}

#[test]
fn trim_reversed_range_wraps() {
    // start > end keeps the wrap-around complement.
    let mut measure = PathMeasure::new();
    measure.set_range(0.75, 0.25);
    let trimmed = measure.trim(&horizontal_line(10.0));
    assert!(
        (trimmed.length() - 5.0).abs() < 0.3,
        "wrapped length {}",
        trimmed.length()
    );
}
