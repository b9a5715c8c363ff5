//! Rasterizer Tests
//!
//! Tests for:
//! - Fill coverage exactness on axis-aligned geometry
//! - Clipping against the target rect
//! - Stroke expansion and dashed strokes
//! - RLE boolean algebra used by masks

use glam::Vec2;

use flicker::geometry::path::{Path, PathDirection};
use flicker::geometry::rect::{IntRect, Rect};
use flicker::raster::rle::Rle;
use flicker::raster::{CapStyle, FillRule, JoinStyle, Rasterizer};

fn rect_path(x: f32, y: f32, w: f32, h: f32) -> Path {
    let mut p = Path::new();
    p.add_rect(Rect::new(x, y, w, h), PathDirection::Cw);
    p
}

fn clip(w: i32, h: i32) -> IntRect {
    IntRect::new(0, 0, w, h)
}

fn coverage_at(rle: &Rle, x: i32, y: i32) -> u8 {
    for s in rle.spans() {
        if i32::from(s.y) == y && x >= i32::from(s.x) && x < i32::from(s.x) + i32::from(s.len) {
            return s.coverage;
        }
    }
    0
}

// ============================================================================
// Fills
// ============================================================================

#[test]
fn integer_rect_fill_is_opaque() {
    let mut r = Rasterizer::new();
    r.rasterize_fill(&rect_path(2.0, 2.0, 8.0, 4.0), FillRule::Winding, &clip(16, 16));
    let rle = r.rle();
    assert_eq!(rle.bounds(), IntRect::new(2, 2, 8, 4));
    for s in rle.spans() {
        assert_eq!(s.coverage, 255, "span {s:?}");
    }
}

#[test]
fn empty_path_has_no_spans() {
    let mut r = Rasterizer::new();
    r.rasterize_fill(&Path::new(), FillRule::Winding, &clip(16, 16));
    assert!(r.rle().is_empty());
}

#[test]
fn fill_clips_to_target() {
    let mut r = Rasterizer::new();
    r.rasterize_fill(&rect_path(-10.0, -10.0, 100.0, 100.0), FillRule::Winding, &clip(8, 8));
    let b = r.rle().bounds();
    assert_eq!(b, IntRect::new(0, 0, 8, 8));
}

#[test]
fn even_odd_rule_carves_hole() {
    let mut p = rect_path(0.0, 0.0, 12.0, 12.0);
    p.add_rect(Rect::new(4.0, 4.0, 4.0, 4.0), PathDirection::Cw);
    let mut r = Rasterizer::new();
    r.rasterize_fill(&p, FillRule::EvenOdd, &clip(16, 16));
    assert_eq!(coverage_at(r.rle(), 6, 6), 0, "hole must be empty");
    assert_eq!(coverage_at(r.rle(), 1, 6), 255, "ring must be filled");
}

#[test]
fn winding_rule_keeps_same_direction_overlap() {
    let mut p = rect_path(0.0, 0.0, 12.0, 12.0);
    p.add_rect(Rect::new(4.0, 4.0, 4.0, 4.0), PathDirection::Cw);
    let mut r = Rasterizer::new();
    r.rasterize_fill(&p, FillRule::Winding, &clip(16, 16));
    assert_eq!(coverage_at(r.rle(), 6, 6), 255, "same-winding overlap stays");
}

#[test]
fn circle_fill_has_antialiased_edge() {
    let mut p = Path::new();
    p.add_circle(8.0, 8.0, 6.0, PathDirection::Cw);
    let mut r = Rasterizer::new();
    r.rasterize_fill(&p, FillRule::Winding, &clip(16, 16));
    assert_eq!(coverage_at(r.rle(), 8, 8), 255, "centre opaque");
    let edge = r
        .rle()
        .spans()
        .iter()
        .any(|s| s.coverage > 0 && s.coverage < 255);
    assert!(edge, "expected partial coverage along the circle edge");
}

// ============================================================================
// Strokes
// ============================================================================

#[test]
fn stroke_covers_band_around_line() {
    let mut p = Path::new();
    p.move_to(Vec2::new(2.0, 8.0));
    p.line_to(Vec2::new(14.0, 8.0));
    let mut r = Rasterizer::new();
    r.rasterize_stroke(
        &p,
        CapStyle::Flat,
        JoinStyle::Miter,
        4.0,
        4.0,
        None,
        &clip(16, 16),
    );
    assert_eq!(coverage_at(r.rle(), 8, 7), 255);
    assert_eq!(coverage_at(r.rle(), 8, 9), 255);
    assert_eq!(coverage_at(r.rle(), 8, 3), 0);
}

#[test]
fn zero_width_stroke_is_empty() {
    let mut p = Path::new();
    p.move_to(Vec2::ZERO);
    p.line_to(Vec2::new(10.0, 0.0));
    let mut r = Rasterizer::new();
    r.rasterize_stroke(
        &p,
        CapStyle::Flat,
        JoinStyle::Miter,
        0.0,
        4.0,
        None,
        &clip(16, 16),
    );
    assert!(r.rle().is_empty());
}

#[test]
fn all_zero_dash_produces_empty_stroke() {
    let mut p = Path::new();
    p.move_to(Vec2::new(0.0, 8.0));
    p.line_to(Vec2::new(16.0, 8.0));
    let mut r = Rasterizer::new();
    r.rasterize_stroke(
        &p,
        CapStyle::Flat,
        JoinStyle::Miter,
        2.0,
        4.0,
        Some(&[0.0, 0.0]),
        &clip(16, 16),
    );
    assert!(r.rle().is_empty(), "all-zero dash must erase the stroke");
}

#[test]
fn dashed_stroke_leaves_gaps() {
    let mut p = Path::new();
    p.move_to(Vec2::new(0.0, 8.0));
    p.line_to(Vec2::new(16.0, 8.0));
    let mut r = Rasterizer::new();
    r.rasterize_stroke(
        &p,
        CapStyle::Flat,
        JoinStyle::Miter,
        2.0,
        4.0,
        Some(&[4.0, 4.0]),
        &clip(16, 16),
    );
    assert!(coverage_at(r.rle(), 2, 8) > 0, "on segment missing");
    assert_eq!(coverage_at(r.rle(), 6, 8), 0, "gap should be empty");
}

// ============================================================================
// RLE algebra
// ============================================================================

#[test]
fn rle_union_covers_both() {
    let a = Rle::from_rect(IntRect::new(0, 0, 4, 2));
    let b = Rle::from_rect(IntRect::new(8, 0, 4, 2));
    let u = a.unioned(&b);
    assert_eq!(coverage_at(&u, 1, 0), 255);
    assert_eq!(coverage_at(&u, 9, 0), 255);
    assert_eq!(coverage_at(&u, 6, 0), 0);
}

#[test]
fn rle_intersect_keeps_overlap_only() {
    let a = Rle::from_rect(IntRect::new(0, 0, 8, 4));
    let b = Rle::from_rect(IntRect::new(4, 2, 8, 4));
    let i = a.intersected(&b);
    assert_eq!(i.bounds(), IntRect::new(4, 2, 4, 2));
}

#[test]
fn rle_subtract_and_xor() {
    let a = Rle::from_rect(IntRect::new(0, 0, 8, 1));
    let b = Rle::from_rect(IntRect::new(4, 0, 8, 1));
    let s = a.subtracted(&b);
    assert_eq!(s.bounds(), IntRect::new(0, 0, 4, 1));
    let x = a.xored(&b);
    assert_eq!(coverage_at(&x, 2, 0), 255);
    assert_eq!(coverage_at(&x, 5, 0), 0);
    assert_eq!(coverage_at(&x, 10, 0), 255);
}

#[test]
fn rle_invert_flips_coverage_in_place() {
    let mut r = Rle::from_rect(IntRect::new(0, 0, 4, 1));
    r.mul_alpha(100);
    let before = coverage_at(&r, 0, 0);
    r.invert();
    assert_eq!(coverage_at(&r, 0, 0), 255 - before);
}

#[test]
fn rle_intersect_with_empty_is_empty() {
    let a = Rle::from_rect(IntRect::new(0, 0, 4, 4));
    assert!(a.intersected(&Rle::new()).is_empty());
}
