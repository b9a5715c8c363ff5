//! Commands crossing from the frontend to the render worker.

use xxhash_rust::xxh32::xxh32;

const PROPS_HASH_SEED: u32 = 0xc001_f00d;

/// One frontend request. Commands apply in enqueue order.
#[derive(Debug, Clone)]
pub enum Command {
    /// Load an animation and start tracking it under `pid`.
    AddConfig {
        path: String,
        width: u32,
        height: u32,
        looped: bool,
        rate: u32,
        pid: u32,
    },
    /// Stop tracking the animation.
    DiscardPid(u32),
    /// Re-key a tracked animation from its props hash to an externally
    /// assigned pid. Reserved: the frontend never issues it.
    SetupPid { props_hash: u32, pid: u32 },
    /// Flip continuous playback.
    SetupPlay { pid: u32, play: bool },
    /// Request at least one more frame.
    SetupRender(u32),
}

/// Stable fingerprint of an animation configuration; doubles as the
/// picture id.
#[must_use]
pub fn props_hash(path: &str, width: u32, height: u32, looped: bool, rate: u32) -> u32 {
    let fingerprint = format!(
        "lottie:{path}|canvasHeight:{height}|canvasWidth:{width}|loop:{}|rate:{rate}",
        u32::from(looped)
    );
    xxh32(fingerprint.as_bytes(), PROPS_HASH_SEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable() {
        let a = props_hash("anim.json", 64, 64, true, 0);
        let b = props_hash("anim.json", 64, 64, true, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn hash_differs_per_config() {
        let base = props_hash("anim.json", 64, 64, true, 0);
        assert_ne!(base, props_hash("anim.json", 64, 64, false, 0));
        assert_ne!(base, props_hash("anim.json", 32, 64, true, 0));
        assert_ne!(base, props_hash("anim.json", 64, 64, true, 30));
        assert_ne!(base, props_hash("other.json", 64, 64, true, 0));
    }
}
