//! Pipeline Tests
//!
//! Tests for:
//! - Player timeline advancement, prerender ring bounds and looping
//! - Promotion order (frame N never before N-1)
//! - Command resolution incl. discard-mid-flight and reserved re-keying
//! - Registry pid stability, idempotence and discard safety
//! - Upload tick publishing texture handles

use std::io::Write;

use rustc_hash::FxHashMap;

use flicker::ModelCache;
use flicker::pipeline::command::{Command, props_hash};
use flicker::pipeline::player::{DEFAULT_PRERENDERED_FRAMES, PlayerEntry};
use flicker::pipeline::queues::ReadyQueue;
use flicker::pipeline::registry::{BAD_PICTURE_ID, LottieRenderer};
use flicker::pipeline::upload::{TextureHandle, TextureUploader};
use flicker::pipeline::worker::resolve_command;

/// Three-frame animation whose fill color identifies the frame:
/// red, green, blue held one frame each.
const COLOR_CYCLE_DOC: &str = r##"{"v":"5.5.2","fr":30,"ip":0,"op":3,"w":32,"h":32,"layers":[
  {"ty":4,"ind":1,"ip":0,"op":3,"st":0,
   "ks":{"a":{"k":[0,0]},"p":{"k":[0,0]},"s":{"k":[100,100]},"r":{"k":0},"o":{"k":100}},
   "shapes":[
     {"ty":"gr","it":[
       {"ty":"rc","p":{"k":[16,16]},"s":{"k":[32,32]},"r":{"k":0}},
       {"ty":"fl","o":{"k":100},"r":1,"c":{"a":1,"k":[
          {"t":0,"s":[1,0,0],"h":1},
          {"t":1,"s":[0,1,0],"h":1},
          {"t":2,"s":[0,0,1],"h":1}
       ]}},
       {"ty":"tr","a":{"k":[0,0]},"p":{"k":[0,0]},"s":{"k":[100,100]},"r":{"k":0},"o":{"k":100}}
     ]}
   ]}
]}"##;

fn write_temp_doc(name: &str, contents: &str) -> String {
    let _ = env_logger::builder().is_test(true).try_init();
    let path = std::env::temp_dir().join(format!("flicker_test_{}_{name}.json", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path.to_string_lossy().into_owned()
}

/// Identifies a promoted frame by its center pixel: 0 red, 1 green,
/// 2 blue.
fn frame_index_of(data: &[u8], width: u32) -> usize {
    let o = ((16 * width + 16) * 4) as usize;
    let (b, g, r) = (data[o], data[o + 1], data[o + 2]);
    match (r > 200, g > 200, b > 200) {
        (true, false, false) => 0,
        (false, true, false) => 1,
        (false, false, true) => 2,
        other => panic!("unrecognized frame color {other:?}"),
    }
}

/// Loads a looping color-cycle player with a 30 ms frame period.
fn color_cycle_player(looped: bool) -> (PlayerEntry, String) {
    let path = write_temp_doc(if looped { "loop" } else { "once" }, COLOR_CYCLE_DOC);
    let cache = ModelCache::new();
    let entry = PlayerEntry::load(
        &cache,
        &path,
        32,
        32,
        looped,
        true,
        DEFAULT_PRERENDERED_FRAMES,
        33,
        77,
    )
    .expect("player should load");
    (entry, path)
}

// ============================================================================
// Player timeline
// ============================================================================

#[test]
fn looping_player_promotes_frames_in_order() {
    let (mut player, path) = color_cycle_player(true);
    assert_eq!(player.frame_total(), 3);

    let mut promoted = Vec::new();
    // Prefill at t=0, then tick one frame period at a time.
    for t in [0u32, 0, 30, 60, 90, 120, 150] {
        player.advance(t);
        assert!(
            player.prerendered_len() <= player.ring_capacity(),
            "ring overflow: {} > {}",
            player.prerendered_len(),
            player.ring_capacity()
        );
        if let Some(frame) = player.grab_current_frame() {
            assert_eq!(frame.pid, 77);
            assert_eq!((frame.width, frame.height), (32, 32));
            promoted.push(frame_index_of(&frame.data, frame.width));
        }
    }

    // Frame N is never promoted before frame N-1; the loop wraps to 0.
    assert_eq!(promoted, vec![0, 1, 2, 0, 1], "promotion order");
    let _ = std::fs::remove_file(path);
}

#[test]
fn non_looping_player_stops_at_end() {
    let (mut player, path) = color_cycle_player(false);
    let mut promoted = Vec::new();
    for t in [0u32, 0, 30, 60, 90, 120, 150, 180, 210] {
        player.advance(t);
        if let Some(frame) = player.grab_current_frame() {
            promoted.push(frame_index_of(&frame.data, frame.width));
        }
    }
    assert_eq!(promoted, vec![0, 1, 2], "must play each frame once");
    let _ = std::fs::remove_file(path);
}

#[test]
fn paused_player_does_not_advance() {
    let (mut player, path) = color_cycle_player(true);
    player.play = false;
    for t in [0u32, 30, 60] {
        assert!(!player.advance(t), "paused player must not render");
    }
    assert!(player.grab_current_frame().is_none());
    let _ = std::fs::remove_file(path);
}

#[test]
fn render_once_produces_a_single_batch() {
    let (mut player, path) = color_cycle_player(true);
    player.play = false;
    player.render_once = true;
    assert!(player.advance(0), "render-once must render a frame");
    assert!(!player.advance(0), "flag must reset after one pass");
    let _ = std::fs::remove_file(path);
}

#[test]
fn empty_path_does_not_load() {
    let cache = ModelCache::new();
    assert!(
        PlayerEntry::load(&cache, "", 32, 32, true, true, 2, 0, 1).is_none(),
        "empty path must not produce a player"
    );
}

// ============================================================================
// Worker command resolution
// ============================================================================

#[test]
fn discard_mid_flight_removes_animation() {
    let path = write_temp_doc("discard", COLOR_CYCLE_DOC);
    let cache = ModelCache::new();
    let mut animations: FxHashMap<u32, PlayerEntry> = FxHashMap::default();
    let pid = props_hash(&path, 32, 32, true, 0);

    resolve_command(
        &mut animations,
        &cache,
        Command::AddConfig {
            path: path.clone(),
            width: 32,
            height: 32,
            looped: true,
            rate: 0,
            pid,
        },
    );
    assert_eq!(animations.len(), 1);

    resolve_command(&mut animations, &cache, Command::DiscardPid(pid));
    assert!(animations.is_empty(), "discard must drop the animation");

    // Commands for a discarded pid resolve as no-ops.
    resolve_command(&mut animations, &cache, Command::SetupRender(pid));
    resolve_command(
        &mut animations,
        &cache,
        Command::SetupPlay { pid, play: true },
    );
    assert!(animations.is_empty());
    let _ = std::fs::remove_file(path);
}

#[test]
fn setup_play_is_idempotent() {
    let path = write_temp_doc("play", COLOR_CYCLE_DOC);
    let cache = ModelCache::new();
    let mut animations: FxHashMap<u32, PlayerEntry> = FxHashMap::default();
    let pid = props_hash(&path, 32, 32, true, 0);
    resolve_command(
        &mut animations,
        &cache,
        Command::AddConfig {
            path: path.clone(),
            width: 32,
            height: 32,
            looped: true,
            rate: 0,
            pid,
        },
    );

    resolve_command(
        &mut animations,
        &cache,
        Command::SetupPlay { pid, play: false },
    );
    let state_once = animations.values().next().unwrap().play;
    resolve_command(
        &mut animations,
        &cache,
        Command::SetupPlay { pid, play: false },
    );
    let state_twice = animations.values().next().unwrap().play;
    assert_eq!(state_once, state_twice);
    assert!(!state_twice);
    let _ = std::fs::remove_file(path);
}

#[test]
fn setup_pid_rekeys_reserved_entry() {
    let path = write_temp_doc("rekey", COLOR_CYCLE_DOC);
    let cache = ModelCache::new();
    let mut animations: FxHashMap<u32, PlayerEntry> = FxHashMap::default();
    let hash = props_hash(&path, 32, 32, true, 0);
    resolve_command(
        &mut animations,
        &cache,
        Command::AddConfig {
            path: path.clone(),
            width: 32,
            height: 32,
            looped: true,
            rate: 0,
            pid: hash,
        },
    );
    resolve_command(
        &mut animations,
        &cache,
        Command::SetupPid {
            props_hash: hash,
            pid: 4242,
        },
    );
    assert!(animations.contains_key(&4242));
    assert_eq!(animations[&4242].pid, 4242);
    let _ = std::fs::remove_file(path);
}

#[test]
fn bad_config_load_is_ignored() {
    let cache = ModelCache::new();
    let mut animations: FxHashMap<u32, PlayerEntry> = FxHashMap::default();
    resolve_command(
        &mut animations,
        &cache,
        Command::AddConfig {
            path: "/missing/animation.json".into(),
            width: 32,
            height: 32,
            looped: true,
            rate: 0,
            pid: 1,
        },
    );
    assert!(animations.is_empty());
}

// ============================================================================
// Ready queue invariants
// ============================================================================

#[test]
fn ready_queue_never_exceeds_live_budget() {
    let q = ReadyQueue::default();
    let live = 3;
    for i in 0..50u32 {
        q.push(
            flicker::pipeline::player::ReadyFrame {
                pid: i,
                data: Vec::new(),
                width: 1,
                height: 1,
            },
            live * 2,
        );
        assert!(q.len() <= live * 2, "ready queue exceeded budget");
    }
    assert_eq!(q.dropped(), 50 - live * 2);
}

// ============================================================================
// Frontend registry
// ============================================================================

#[test]
fn match_twice_returns_same_pid() {
    let renderer = LottieRenderer::new();
    let a = renderer.match_animation("anim.json", 64, 64, true, 0);
    let b = renderer.match_animation("anim.json", 64, 64, true, 0);
    assert_ne!(a, BAD_PICTURE_ID);
    assert_eq!(a, b, "pid must be stable across match calls");
    assert_eq!(renderer.descriptor(a).unwrap().pid, a);
}

#[test]
fn match_empty_path_returns_sentinel() {
    let renderer = LottieRenderer::new();
    assert_eq!(renderer.match_animation("", 64, 64, true, 0), BAD_PICTURE_ID);
}

#[test]
fn different_configs_get_different_pids() {
    let renderer = LottieRenderer::new();
    let a = renderer.match_animation("anim.json", 64, 64, true, 0);
    let b = renderer.match_animation("anim.json", 48, 48, true, 0);
    assert_ne!(a, b);
}

#[test]
fn discard_forgets_descriptor_and_render_is_safe() {
    let renderer = LottieRenderer::new();
    let pid = renderer.match_animation("anim.json", 64, 64, true, 0);
    assert!(renderer.descriptor(pid).is_some());

    renderer.discard(pid);
    assert!(renderer.descriptor(pid).is_none());
    assert!(renderer.image(pid).is_none());

    // Render/play after discard are silent no-ops.
    renderer.render(pid);
    renderer.play(pid, true);
}

#[test]
fn canvas_size_has_a_floor() {
    let renderer = LottieRenderer::new();
    let pid = renderer.match_animation("anim.json", 2, 3, false, 0);
    let desc = renderer.descriptor(pid).unwrap();
    assert_eq!((desc.width, desc.height), (32, 32));
}

// ============================================================================
// Upload tick
// ============================================================================

#[derive(Default)]
struct RecordingUploader {
    created: Vec<(u32, u32, u32)>,
    updated: Vec<TextureHandle>,
    next_handle: TextureHandle,
}

impl TextureUploader for RecordingUploader {
    fn create(&mut self, pid: u32, width: u32, height: u32, _data: &[u8]) -> TextureHandle {
        self.created.push((pid, width, height));
        self.next_handle += 1;
        self.next_handle
    }

    fn update(&mut self, handle: TextureHandle, _width: u32, _height: u32, _data: &[u8]) {
        self.updated.push(handle);
    }
}

#[test]
fn upload_publishes_texture_into_descriptor() {
    let path = write_temp_doc("upload", COLOR_CYCLE_DOC);
    let renderer = LottieRenderer::new();
    let pid = renderer.match_animation(&path, 32, 32, true, 33);
    assert_ne!(pid, BAD_PICTURE_ID);

    let mut uploader = RecordingUploader::default();
    // Drive the foreground clock until the worker promotes a frame.
    let mut published = None;
    for tick in 0..200u32 {
        renderer.upload_ready_frames(&mut uploader, tick * 30);
        if let Some(handle) = renderer.image(pid) {
            published = Some(handle);
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    let handle = published.expect("worker should publish a frame");
    assert_eq!(renderer.descriptor(pid).unwrap().texture, Some(handle));
    assert!(!uploader.created.is_empty());
    assert_eq!(uploader.created[0].0, pid);
    let _ = std::fs::remove_file(path);
}

#[test]
fn renderer_shuts_down_cleanly() {
    // Drop joins the worker; this must not hang or panic.
    let renderer = LottieRenderer::new();
    let _ = renderer.match_animation("no_such_file.json", 32, 32, true, 0);
    drop(renderer);
}
