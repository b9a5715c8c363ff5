//! Gradient stop handling and color-table generation.
//!
//! Stops come out of the model as (position, color, opacity); the
//! compositor samples a 1024-entry premultiplied table built by linear
//! interpolation between adjacent stops.

use glam::Vec2;

use crate::geometry::color::{Color, interpolate_pixel};

pub const COLOR_TABLE_SIZE: usize = 1024;

/// One resolved gradient stop: position in [0,1] plus premultiplied
/// color at full gradient opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub pos: f32,
    pub color: Color,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    Linear {
        start: Vec2,
        end: Vec2,
    },
    Radial {
        center: Vec2,
        center_radius: f32,
        focal: Vec2,
        focal_radius: f32,
    },
}

/// A fully evaluated gradient ready for span filling.
#[derive(Debug, Clone)]
pub struct Gradient {
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
    /// Paint alpha multiplied in when the table is built.
    pub alpha: f32,
}

impl Gradient {
    /// Builds the 1024-entry premultiplied lookup table.
    #[must_use]
    pub fn build_color_table(&self) -> Vec<u32> {
        let mut table = vec![0u32; COLOR_TABLE_SIZE];
        if self.stops.is_empty() {
            return table;
        }

        let premul = |s: &GradientStop| s.color.premultiplied(s.opacity * self.alpha);

        let mut pos = 0usize;
        let incr = 1.0 / COLOR_TABLE_SIZE as f32;
        let mut fpos = 1.5 * incr;
        let mut cur_color = premul(&self.stops[0]);

        table[pos] = cur_color;
        pos += 1;
        while fpos <= self.stops[0].pos && pos < COLOR_TABLE_SIZE {
            table[pos] = table[pos - 1];
            pos += 1;
            fpos += incr;
        }

        for w in self.stops.windows(2) {
            let (curr, next) = (&w[0], &w[1]);
            let delta = 1.0 / (next.pos - curr.pos).max(f32::EPSILON);
            let next_color = premul(next);
            while fpos < next.pos && pos < COLOR_TABLE_SIZE {
                let t = (fpos - curr.pos) * delta;
                let dist = (255.0 * t) as u32;
                let idist = 255 - dist;
                table[pos] = interpolate_pixel(cur_color, idist, next_color, dist);
                pos += 1;
                fpos += incr;
            }
            cur_color = next_color;
        }

        while pos < COLOR_TABLE_SIZE {
            table[pos] = cur_color;
            pos += 1;
        }
        table[COLOR_TABLE_SIZE - 1] = cur_color;
        table
    }
}

/// Table lookup with pad spread, `pos` in [0,1].
#[inline]
#[must_use]
pub fn table_pixel(table: &[u32], pos: f32) -> u32 {
    let i = (pos * (COLOR_TABLE_SIZE - 1) as f32 + 0.5) as i64;
    table[i.clamp(0, COLOR_TABLE_SIZE as i64 - 1) as usize]
}

/// Table lookup from an 8.8 fixed-point position.
#[inline]
#[must_use]
pub fn table_pixel_fixed(table: &[u32], fixed_pos: i32) -> u32 {
    let i = (fixed_pos + 128) >> 8;
    table[i.clamp(0, COLOR_TABLE_SIZE as i32 - 1) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_to_white() -> Gradient {
        Gradient {
            kind: GradientKind::Linear {
                start: Vec2::ZERO,
                end: Vec2::new(1.0, 0.0),
            },
            stops: vec![
                GradientStop {
                    pos: 0.0,
                    color: Color::new(0.0, 0.0, 0.0),
                    opacity: 1.0,
                },
                GradientStop {
                    pos: 1.0,
                    color: Color::new(1.0, 1.0, 1.0),
                    opacity: 1.0,
                },
            ],
            alpha: 1.0,
        }
    }

    #[test]
    fn endpoints_match_stops() {
        let t = black_to_white().build_color_table();
        assert_eq!(t[0], 0xFF00_0000);
        assert_eq!(t[COLOR_TABLE_SIZE - 1], 0xFFFF_FFFF);
    }

    #[test]
    fn midpoint_is_gray() {
        let t = black_to_white().build_color_table();
        let mid = t[COLOR_TABLE_SIZE / 2];
        let r = (mid >> 16) & 0xff;
        assert!((i64::from(r) - 128).abs() <= 2, "mid {r}");
        // The 255-weight blend loses at most one bit of alpha.
        assert!(mid >> 24 >= 254);
    }

    #[test]
    fn alpha_premultiplies_table() {
        let mut g = black_to_white();
        g.alpha = 0.5;
        let t = g.build_color_table();
        let last = t[COLOR_TABLE_SIZE - 1];
        assert_eq!(last >> 24, 128);
        assert_eq!((last >> 16) & 0xff, 128);
    }
}
