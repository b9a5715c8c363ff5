pub mod small_str;

pub use small_str::Tag;

/// Float comparison with the tolerance the renderer uses throughout.
#[inline]
#[must_use]
pub fn fuzzy_compare(a: f32, b: f32) -> bool {
    (a - b).abs() * 100_000.0 <= a.abs().min(b.abs())
}

/// `true` when the value is close enough to zero to be treated as zero.
#[inline]
#[must_use]
pub fn fuzzy_is_zero(v: f32) -> bool {
    v.abs() <= 0.000_000_000_01
}
