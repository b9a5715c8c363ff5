//! Animated Property Tests
//!
//! Tests for:
//! - Static property invariance across frames
//! - Keyframe boundary values (first start, last end)
//! - Hold keyframes
//! - Motion-path position keyframes (arc-length sampling, tangent angle)
//! - Interpolator endpoint behavior

use std::sync::Arc;

use glam::Vec2;

use flicker::model::{Interpolator, KeyFrame, Position, PositionKeyFrame, Value};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn linear_interp() -> Arc<Interpolator> {
    Arc::new(Interpolator::new(0.5, 0.5, 0.5, 0.5))
}

fn scalar_track() -> Value<f32> {
    Value::Animated(vec![
        KeyFrame {
            start_frame: 10.0,
            end_frame: 20.0,
            start_value: 0.0,
            end_value: 100.0,
            interpolator: Some(linear_interp()),
        },
        KeyFrame {
            start_frame: 20.0,
            end_frame: 30.0,
            start_value: 100.0,
            end_value: 50.0,
            interpolator: Some(linear_interp()),
        },
    ])
}

// ============================================================================
// Static values
// ============================================================================

#[test]
fn static_value_is_frame_invariant() {
    let v = Value::Static(42.0_f32);
    for frame in [0.0, 1.0, 17.5, 1000.0] {
        assert!(approx(v.eval(frame), 42.0), "frame {frame}");
    }
}

// ============================================================================
// Keyframe boundaries
// ============================================================================

#[test]
fn value_clamps_before_first_keyframe() {
    let v = scalar_track();
    assert!(approx(v.eval(0.0), 0.0));
    assert!(approx(v.eval(10.0), 0.0));
}

#[test]
fn value_clamps_after_last_keyframe() {
    let v = scalar_track();
    assert!(approx(v.eval(30.0), 50.0));
    assert!(approx(v.eval(99.0), 50.0));
}

#[test]
fn value_interpolates_between_keyframes() {
    let v = scalar_track();
    assert!(approx(v.eval(15.0), 50.0), "got {}", v.eval(15.0));
    assert!(approx(v.eval(25.0), 75.0), "got {}", v.eval(25.0));
}

#[test]
fn keyframe_start_and_end_values_are_exact() {
    let v = scalar_track();
    assert!(approx(v.eval(10.0), 0.0), "first start");
    assert!(approx(v.eval(30.0), 50.0), "last end");
    // Interval join: the second keyframe owns its start frame.
    assert!(approx(v.eval(20.0), 100.0));
}

#[test]
fn hold_keyframe_clamps_entire_interval() {
    let v = Value::Animated(vec![
        KeyFrame {
            start_frame: 0.0,
            // Parsing stretches a hold to the next keyframe start with
            // equal start/end values and no interpolator.
            end_frame: 10.0,
            start_value: 7.0_f32,
            end_value: 7.0,
            interpolator: None,
        },
        KeyFrame {
            start_frame: 10.0,
            end_frame: 10.0,
            start_value: 3.0,
            end_value: 3.0,
            interpolator: None,
        },
    ]);
    for frame in [0.0, 2.0, 5.0, 9.9] {
        assert!(approx(v.eval(frame), 7.0), "frame {frame}");
    }
    assert!(approx(v.eval(10.0), 3.0));
}

// ============================================================================
// Position properties
// ============================================================================

#[test]
fn plain_position_lerps() {
    let p = Position::Animated(vec![PositionKeyFrame {
        frame: KeyFrame {
            start_frame: 0.0,
            end_frame: 10.0,
            start_value: Vec2::ZERO,
            end_value: Vec2::new(10.0, 20.0),
            interpolator: Some(linear_interp()),
        },
        in_tangent: Vec2::ZERO,
        out_tangent: Vec2::ZERO,
        path_key_frame: false,
    }]);
    let mid = p.eval(5.0);
    assert!(approx(mid.x, 5.0) && approx(mid.y, 10.0), "got {mid:?}");
    assert!(approx(p.angle(5.0), 0.0), "plain positions carry no angle");
}

#[test]
fn path_position_follows_bezier() {
    // Quarter-circle-ish arc from (0,0) to (10,10).
    let p = Position::Animated(vec![PositionKeyFrame {
        frame: KeyFrame {
            start_frame: 0.0,
            end_frame: 10.0,
            start_value: Vec2::ZERO,
            end_value: Vec2::new(10.0, 10.0),
            interpolator: Some(linear_interp()),
        },
        in_tangent: Vec2::new(0.0, -5.5),
        out_tangent: Vec2::new(5.5, 0.0),
        path_key_frame: true,
    }]);
    let mid = p.eval(5.0);
    // The arc bows away from the straight line.
    assert!(
        mid.x > 5.0 && mid.y < 5.0,
        "expected point off the chord, got {mid:?}"
    );
    // Tangent starts horizontal, ends vertical.
    assert!(p.angle(0.1).abs() < 15.0, "start angle {}", p.angle(0.1));
    assert!(
        (p.angle(9.9) - 90.0).abs() < 15.0,
        "end angle {}",
        p.angle(9.9)
    );
}

#[test]
fn position_boundaries_clamp() {
    let p = Position::Animated(vec![PositionKeyFrame {
        frame: KeyFrame {
            start_frame: 5.0,
            end_frame: 10.0,
            start_value: Vec2::new(1.0, 1.0),
            end_value: Vec2::new(9.0, 9.0),
            interpolator: Some(linear_interp()),
        },
        in_tangent: Vec2::ZERO,
        out_tangent: Vec2::ZERO,
        path_key_frame: false,
    }]);
    assert_eq!(p.eval(0.0), Vec2::new(1.0, 1.0));
    assert_eq!(p.eval(20.0), Vec2::new(9.0, 9.0));
    assert!(approx(p.angle(0.0), 0.0), "angle outside range is zero");
}

// ============================================================================
// Interpolators
// ============================================================================

#[test]
fn interpolator_endpoints() {
    let ease = Interpolator::new(0.42, 0.0, 0.58, 1.0);
    assert!(ease.value(0.0).abs() < 1e-3);
    assert!((ease.value(1.0) - 1.0).abs() < 1e-3);
}

#[test]
fn ease_in_starts_slow() {
    let ease = Interpolator::new(0.9, 0.0, 1.0, 1.0);
    assert!(
        ease.value(0.25) < 0.25,
        "ease-in should lag early: {}",
        ease.value(0.25)
    );
}
