//! Animation Facade Tests
//!
//! Tests for:
//! - Frame/duration queries on loaded documents
//! - frame_at_pos bounds
//! - Model cache sharing
//! - Concurrent render rejection

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use flicker::{Animation, FlickerError, ModelCache, Surface};

const IDENTITY_KS: &str = r#"{"a":{"k":[0,0]},"p":{"k":[0,0]},"s":{"k":[100,100]},"r":{"k":0},"o":{"k":100}}"#;

fn simple_doc(total_frames: u32) -> String {
    format!(
        r##"{{"v":"5.5.2","fr":30,"ip":0,"op":{total_frames},"w":32,"h":32,"layers":[
            {{"ty":1,"ind":1,"ip":0,"op":{total_frames},"st":0,"sw":32,"sh":32,"sc":"#ff8800","ks":{IDENTITY_KS}}}
        ]}}"##
    )
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn totals_match_header() {
    let animation = Animation::from_data(&simple_doc(24), "").unwrap();
    assert_eq!(animation.total_frame(), 24);
    assert_eq!(animation.frame_rate(), 30.0);
    assert!((animation.duration() - 0.8).abs() < 1e-6);
    assert_eq!(animation.size(), (32, 32));
}

#[test]
fn frame_at_pos_stays_in_range() {
    let animation = Animation::from_data(&simple_doc(24), "").unwrap();
    let total = animation.total_frame();
    for i in 0..100 {
        let pos = f64::from(i) / 100.0;
        let frame = animation.frame_at_pos(pos);
        assert!(frame < total, "pos {pos} -> frame {frame}");
    }
    assert_eq!(animation.frame_at_pos(0.0), 0);
    assert_eq!(animation.frame_at_pos(1.0), total - 1);
    // Out-of-range positions clamp.
    assert_eq!(animation.frame_at_pos(-3.0), 0);
    assert_eq!(animation.frame_at_pos(7.0), total - 1);
}

#[test]
fn invalid_documents_report_errors() {
    assert!(matches!(
        Animation::from_data("{}", ""),
        Err(FlickerError::Parse(_))
    ));
    assert!(matches!(
        Animation::from_data("garbage", ""),
        Err(FlickerError::Parse(_))
    ));
    assert!(matches!(
        Animation::from_file("/definitely/not/here.json"),
        Err(FlickerError::Load(_))
    ));
}

// ============================================================================
// Model cache
// ============================================================================

#[test]
fn cache_shares_composition_across_loads() {
    let cache = ModelCache::new();
    let doc = simple_doc(10);
    let a = cache.load_from_data(&doc, "key", "").unwrap();
    let b = cache.load_from_data(&doc, "key", "").unwrap();
    assert!(
        Arc::ptr_eq(a.composition(), b.composition()),
        "second load should reuse the parsed model"
    );
}

#[test]
fn cached_animations_render_independently() {
    let cache = ModelCache::new();
    let doc = simple_doc(10);
    let a = cache.load_from_data(&doc, "key", "").unwrap();
    let b = cache.load_from_data(&doc, "key", "").unwrap();

    let mut buf_a = vec![0u8; 32 * 32 * 4];
    let mut buf_b = vec![0u8; 32 * 32 * 4];
    a.render_sync(0, Surface::new(&mut buf_a, 32, 32, 128), true)
        .unwrap();
    b.render_sync(0, Surface::new(&mut buf_b, 32, 32, 128), true)
        .unwrap();
    assert_eq!(buf_a, buf_b);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn sequential_renders_always_succeed() {
    let animation = Animation::from_data(&simple_doc(10), "").unwrap();
    for frame in 0..10 {
        let mut buffer = vec![0u8; 32 * 32 * 4];
        let surface = Surface::new(&mut buffer, 32, 32, 128);
        assert!(animation.render_sync(frame, surface, true).is_ok());
    }
}

#[test]
fn concurrent_render_rejected_not_corrupted() {
    let animation = Animation::from_data(&simple_doc(10), "").unwrap();
    let successes = Arc::new(AtomicUsize::new(0));
    let rejections = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for t in 0..4 {
        let animation = animation.clone();
        let successes = successes.clone();
        let rejections = rejections.clone();
        handles.push(std::thread::spawn(move || {
            for i in 0..50 {
                let mut buffer = vec![0u8; 32 * 32 * 4];
                let surface = Surface::new(&mut buffer, 32, 32, 128);
                match animation.render_sync((t + i) % 10, surface, true) {
                    Ok(()) => {
                        // A successful render leaves a fully opaque frame.
                        assert!(buffer.chunks_exact(4).all(|px| px[3] == 0xFF));
                        successes.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(FlickerError::ConcurrentRender) => {
                        // Rejected calls must leave the surface alone.
                        assert!(buffer.iter().all(|&b| b == 0));
                        rejections.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(err) => panic!("unexpected error: {err}"),
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert!(
        successes.load(Ordering::Relaxed) > 0,
        "at least some renders must get through"
    );
    // Every call either rendered or was rejected cleanly.
    assert_eq!(
        successes.load(Ordering::Relaxed) + rejections.load(Ordering::Relaxed),
        200
    );
}
