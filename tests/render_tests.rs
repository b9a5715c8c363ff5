//! End-to-end Render Tests
//!
//! Full-document scenarios rendered into premultiplied BGRA buffers:
//! - Solid layer fills the whole canvas
//! - Alpha matte clips the consumer to the matte's coverage
//! - Linear gradient ramps across the canvas
//! - Shape fills, strokes and transforms land where expected

use flicker::{Animation, Surface};

const IDENTITY_KS: &str = r#"{"a":{"k":[0,0]},"p":{"k":[0,0]},"s":{"k":[100,100]},"r":{"k":0},"o":{"k":100}}"#;

fn render_frame(doc: &str, frame: usize, w: u32, h: u32) -> Vec<u8> {
    let _ = env_logger::builder().is_test(true).try_init();
    let animation = Animation::from_data(doc, "").expect("document should load");
    let mut buffer = vec![0u8; (w * h * 4) as usize];
    let surface = Surface::new(&mut buffer, w, h, (w * 4) as usize);
    animation
        .render_sync(frame, surface, true)
        .expect("render should succeed");
    buffer
}

/// Pixel bytes in memory order B, G, R, A.
fn pixel(buffer: &[u8], w: u32, x: u32, y: u32) -> [u8; 4] {
    let o = ((y * w + x) * 4) as usize;
    [buffer[o], buffer[o + 1], buffer[o + 2], buffer[o + 3]]
}

// ============================================================================
// Solid layers
// ============================================================================

#[test]
fn solid_red_layer_fills_canvas() {
    let doc = format!(
        r##"{{"v":"5.5.2","fr":30,"ip":0,"op":2,"w":32,"h":32,"layers":[
            {{"ty":1,"ind":1,"ip":0,"op":2,"st":0,"sw":32,"sh":32,"sc":"#ff0000","ks":{IDENTITY_KS}}}
        ]}}"##
    );
    let buffer = render_frame(&doc, 0, 32, 32);
    for y in 0..32 {
        for x in 0..32 {
            assert_eq!(
                pixel(&buffer, 32, x, y),
                [0x00, 0x00, 0xFF, 0xFF],
                "pixel ({x},{y})"
            );
        }
    }
}

#[test]
fn layer_outside_frame_range_renders_nothing() {
    let doc = format!(
        r##"{{"v":"5.5.2","fr":30,"ip":0,"op":10,"w":16,"h":16,"layers":[
            {{"ty":1,"ind":1,"ip":5,"op":10,"st":0,"sw":16,"sh":16,"sc":"#ff0000","ks":{IDENTITY_KS}}}
        ]}}"##
    );
    let buffer = render_frame(&doc, 0, 16, 16);
    assert!(
        buffer.iter().all(|&b| b == 0),
        "layer with in-frame 5 must be invisible at frame 0"
    );
}

#[test]
fn zero_opacity_layer_renders_nothing() {
    let doc = r##"{"v":"5.5.2","fr":30,"ip":0,"op":2,"w":16,"h":16,"layers":[
        {"ty":1,"ind":1,"ip":0,"op":2,"st":0,"sw":16,"sh":16,"sc":"#ff0000",
         "ks":{"a":{"k":[0,0]},"p":{"k":[0,0]},"s":{"k":[100,100]},"r":{"k":0},"o":{"k":0}}}
    ]}"##;
    let buffer = render_frame(doc, 0, 16, 16);
    assert!(buffer.iter().all(|&b| b == 0));
}

// ============================================================================
// Mattes
// ============================================================================

#[test]
fn alpha_matte_clips_consumer() {
    // White 10x10 matte source above a full-canvas green consumer.
    let doc = format!(
        r##"{{"v":"5.5.2","fr":30,"ip":0,"op":2,"w":20,"h":20,"layers":[
            {{"ty":1,"ind":1,"ip":0,"op":2,"st":0,"sw":10,"sh":10,"sc":"#ffffff","ks":{IDENTITY_KS}}},
            {{"ty":1,"ind":2,"tt":1,"ip":0,"op":2,"st":0,"sw":20,"sh":20,"sc":"#00ff00","ks":{IDENTITY_KS}}}
        ]}}"##
    );
    let buffer = render_frame(&doc, 0, 20, 20);
    assert_eq!(
        pixel(&buffer, 20, 4, 4),
        [0x00, 0xFF, 0x00, 0xFF],
        "inside the matte: green"
    );
    assert_eq!(
        pixel(&buffer, 20, 15, 15),
        [0x00, 0x00, 0x00, 0x00],
        "outside the matte: transparent"
    );
    assert_eq!(
        pixel(&buffer, 20, 15, 4),
        [0x00, 0x00, 0x00, 0x00],
        "right of the matte: transparent"
    );
}

#[test]
fn inverted_alpha_matte_keeps_outside() {
    let doc = format!(
        r##"{{"v":"5.5.2","fr":30,"ip":0,"op":2,"w":20,"h":20,"layers":[
            {{"ty":1,"ind":1,"ip":0,"op":2,"st":0,"sw":10,"sh":10,"sc":"#ffffff","ks":{IDENTITY_KS}}},
            {{"ty":1,"ind":2,"tt":2,"ip":0,"op":2,"st":0,"sw":20,"sh":20,"sc":"#00ff00","ks":{IDENTITY_KS}}}
        ]}}"##
    );
    let buffer = render_frame(&doc, 0, 20, 20);
    assert_eq!(pixel(&buffer, 20, 4, 4), [0, 0, 0, 0], "inside matte erased");
    assert_eq!(
        pixel(&buffer, 20, 15, 15),
        [0x00, 0xFF, 0x00, 0xFF],
        "outside matte survives"
    );
}

// ============================================================================
// Gradients
// ============================================================================

#[test]
fn horizontal_linear_gradient_ramps() {
    let doc = format!(
        r##"{{"v":"5.5.2","fr":30,"ip":0,"op":2,"w":10,"h":10,"layers":[
            {{"ty":4,"ind":1,"ip":0,"op":2,"st":0,"ks":{IDENTITY_KS},"shapes":[
              {{"ty":"gr","it":[
                {{"ty":"rc","p":{{"k":[5,5]}},"s":{{"k":[10,10]}},"r":{{"k":0}}}},
                {{"ty":"gf","t":1,"s":{{"k":[0,5]}},"e":{{"k":[10,5]}},"o":{{"k":100}},"r":1,
                  "g":{{"p":2,"k":{{"k":[0,0,0,0,1,1,1,1]}}}}}},
                {{"ty":"tr","a":{{"k":[0,0]}},"p":{{"k":[0,0]}},"s":{{"k":[100,100]}},"r":{{"k":0}},"o":{{"k":100}}}}
              ]}}
            ]}}
        ]}}"##
    );
    let buffer = render_frame(&doc, 0, 10, 10);

    let left = pixel(&buffer, 10, 0, 5);
    let mid = pixel(&buffer, 10, 5, 5);
    let right = pixel(&buffer, 10, 9, 5);

    assert_eq!(left[3], 0xFF);
    assert!(left[2] < 0x14, "left should be near black: {left:?}");
    assert!(right[2] > 0xEB, "right should be near white: {right:?}");
    assert!(
        (i32::from(mid[2]) - 0x80).abs() <= 0x10,
        "mid should be near gray: {mid:?}"
    );
    // Channels agree on a gray ramp.
    assert_eq!(mid[0], mid[1]);
    assert_eq!(mid[1], mid[2]);

    // Monotone left-to-right.
    let mut last = 0;
    for x in 0..10 {
        let p = pixel(&buffer, 10, x, 5);
        assert!(p[2] >= last, "ramp not monotone at {x}");
        last = p[2];
    }
}

// ============================================================================
// Shape fills
// ============================================================================

#[test]
fn rect_fill_lands_where_placed() {
    let doc = format!(
        r##"{{"v":"5.5.2","fr":30,"ip":0,"op":2,"w":16,"h":16,"layers":[
            {{"ty":4,"ind":1,"ip":0,"op":2,"st":0,"ks":{IDENTITY_KS},"shapes":[
              {{"ty":"gr","it":[
                {{"ty":"rc","p":{{"k":[8,8]}},"s":{{"k":[8,8]}},"r":{{"k":0}}}},
                {{"ty":"fl","c":{{"k":[0,0,1]}},"o":{{"k":100}},"r":1}},
                {{"ty":"tr","a":{{"k":[0,0]}},"p":{{"k":[0,0]}},"s":{{"k":[100,100]}},"r":{{"k":0}},"o":{{"k":100}}}}
              ]}}
            ]}}
        ]}}"##
    );
    let buffer = render_frame(&doc, 0, 16, 16);
    // Rect centred at (8,8), 8x8 -> covers [4,12).
    assert_eq!(pixel(&buffer, 16, 8, 8), [0xFF, 0x00, 0x00, 0xFF], "blue center");
    assert_eq!(pixel(&buffer, 16, 2, 8), [0, 0, 0, 0], "left of rect");
    assert_eq!(pixel(&buffer, 16, 13, 8), [0, 0, 0, 0], "right of rect");
}

#[test]
fn fill_opacity_premultiplies() {
    let doc = r##"{"v":"5.5.2","fr":30,"ip":0,"op":2,"w":8,"h":8,"layers":[
        {"ty":4,"ind":1,"ip":0,"op":2,"st":0,
         "ks":{"a":{"k":[0,0]},"p":{"k":[0,0]},"s":{"k":[100,100]},"r":{"k":0},"o":{"k":100}},
         "shapes":[
           {"ty":"gr","it":[
             {"ty":"rc","p":{"k":[4,4]},"s":{"k":[8,8]},"r":{"k":0}},
             {"ty":"fl","c":{"k":[1,1,1]},"o":{"k":50},"r":1},
             {"ty":"tr","a":{"k":[0,0]},"p":{"k":[0,0]},"s":{"k":[100,100]},"r":{"k":0},"o":{"k":100}}
           ]}
         ]}
    ]}"##;
    let buffer = render_frame(doc, 0, 8, 8);
    let p = pixel(&buffer, 8, 4, 4);
    assert!((i32::from(p[3]) - 128).abs() <= 1, "alpha {p:?}");
    assert_eq!(p[0], p[3], "premultiplied white: color == alpha");
}

#[test]
fn layer_transform_translates_content() {
    let doc = r##"{"v":"5.5.2","fr":30,"ip":0,"op":2,"w":16,"h":16,"layers":[
        {"ty":4,"ind":1,"ip":0,"op":2,"st":0,
         "ks":{"a":{"k":[0,0]},"p":{"k":[6,0]},"s":{"k":[100,100]},"r":{"k":0},"o":{"k":100}},
         "shapes":[
           {"ty":"gr","it":[
             {"ty":"rc","p":{"k":[2,8]},"s":{"k":[4,4]},"r":{"k":0}},
             {"ty":"fl","c":{"k":[1,0,0]},"o":{"k":100},"r":1},
             {"ty":"tr","a":{"k":[0,0]},"p":{"k":[0,0]},"s":{"k":[100,100]},"r":{"k":0},"o":{"k":100}}
           ]}
         ]}
    ]}"##;
    let buffer = render_frame(doc, 0, 16, 16);
    // Rect [0,4) shifted +6 -> [6,10).
    assert_eq!(pixel(&buffer, 16, 8, 8), [0x00, 0x00, 0xFF, 0xFF]);
    assert_eq!(pixel(&buffer, 16, 2, 8), [0, 0, 0, 0]);
}

// ============================================================================
// Buffer discipline
// ============================================================================

#[test]
fn render_writes_exactly_the_surface() {
    let doc = format!(
        r##"{{"v":"5.5.2","fr":30,"ip":0,"op":2,"w":8,"h":8,"layers":[
            {{"ty":1,"ind":1,"ip":0,"op":2,"st":0,"sw":8,"sh":8,"sc":"#ffffff","ks":{IDENTITY_KS}}}
        ]}}"##
    );
    let animation = Animation::from_data(&doc, "").unwrap();
    // Guard bytes after the surface region must stay untouched.
    let mut buffer = vec![0xAB_u8; 8 * 8 * 4 + 64];
    let surface = Surface::new(&mut buffer[..8 * 8 * 4], 8, 8, 32);
    animation.render_sync(0, surface, true).unwrap();
    assert!(buffer[..8 * 8 * 4].iter().all(|&b| b == 0xFF));
    assert!(buffer[8 * 8 * 4..].iter().all(|&b| b == 0xAB));
}

#[test]
fn frame_boundaries_render_without_panic() {
    let doc = format!(
        r##"{{"v":"5.5.2","fr":30,"ip":0,"op":5,"w":8,"h":8,"layers":[
            {{"ty":1,"ind":1,"ip":0,"op":5,"st":0,"sw":8,"sh":8,"sc":"#336699","ks":{IDENTITY_KS}}}
        ]}}"##
    );
    let animation = Animation::from_data(&doc, "").unwrap();
    let total = animation.total_frame();
    for frame in [0, total - 1, total, total + 10] {
        let mut buffer = vec![0u8; 8 * 8 * 4];
        let surface = Surface::new(&mut buffer, 8, 8, 32);
        animation.render_sync(frame, surface, true).unwrap();
    }
}
