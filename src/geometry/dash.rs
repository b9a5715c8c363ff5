//! Path dashing.
//!
//! Consumes a path and a pattern of (length, gap) pairs plus an optional
//! trailing offset, emitting a new path containing only the "on"
//! segments. A pattern with no gaps passes the input through; a pattern
//! with no dash lengths yields an empty path.

use glam::Vec2;
use smallvec::SmallVec;

use crate::geometry::bezier::CubicBez;
use crate::geometry::path::{Path, Segment};
use crate::utils::{fuzzy_compare, fuzzy_is_zero};

const TOLERANCE: f32 = 0.1;

#[derive(Debug, Clone, Copy)]
struct DashPair {
    length: f32,
    gap: f32,
}

pub struct Dasher {
    pattern: SmallVec<[DashPair; 4]>,
    offset: f32,
    no_length: bool,
    no_gap: bool,

    // Walk state
    index: usize,
    current_length: f32,
    discard: bool,
    start_new_segment: bool,
    current: Vec2,
}

impl Dasher {
    /// `array` holds alternating dash/gap values; an odd trailing value
    /// is the dash offset.
    #[must_use]
    pub fn new(array: &[f32]) -> Self {
        let pairs = array.len() / 2;
        let offset = if array.len() % 2 == 1 {
            array[array.len() - 1]
        } else {
            0.0
        };
        let mut pattern = SmallVec::new();
        let mut no_length = true;
        let mut no_gap = true;
        for i in 0..pairs {
            let length = array[2 * i];
            let gap = array[2 * i + 1];
            if !fuzzy_compare(length, 0.0) {
                no_length = false;
            }
            if !fuzzy_compare(gap, 0.0) {
                no_gap = false;
            }
            pattern.push(DashPair { length, gap });
        }
        Self {
            pattern,
            offset,
            no_length,
            no_gap,
            index: 0,
            current_length: 0.0,
            discard: false,
            start_new_segment: true,
            current: Vec2::ZERO,
        }
    }

    /// Applies the pattern. All-zero dash lengths produce an empty
    /// path; a gap-free pattern passes the input through.
    #[must_use]
    pub fn dashed(&mut self, path: &Path) -> Path {
        if self.pattern.is_empty() {
            return path.clone();
        }
        if path.is_empty() || self.no_length {
            return Path::new();
        }
        if self.no_gap {
            return path.clone();
        }

        let mut result = Path::new();
        result.reserve(path.points().len(), path.elements().len());
        for seg in path.segments() {
            match seg {
                Segment::MoveTo(p) => self.move_to(p),
                Segment::Line { to, .. } => self.line_to(to, &mut result),
                Segment::Cubic(b) => self.cubic_to(b, &mut result),
                Segment::Close { from, to } => {
                    if from != to {
                        self.line_to(to, &mut result);
                    }
                }
            }
        }
        result
    }

    fn move_to(&mut self, p: Vec2) {
        self.discard = false;
        self.start_new_segment = true;
        self.current = p;
        self.index = 0;

        if fuzzy_compare(self.offset, 0.0) {
            self.current_length = self.pattern[0].length;
        } else {
            let total: f32 = self.pattern.iter().map(|d| d.length + d.gap).sum();
            let mut normalized = self.offset % total;
            if normalized < 0.0 {
                normalized += total;
            }
            for (i, dash) in self.pattern.iter().enumerate() {
                if normalized < dash.length {
                    self.index = i;
                    self.current_length = dash.length - normalized;
                    self.discard = false;
                    break;
                }
                normalized -= dash.length;
                if normalized < dash.gap {
                    self.index = i;
                    self.current_length = dash.gap - normalized;
                    self.discard = true;
                    break;
                }
                normalized -= dash.gap;
            }
        }
        if fuzzy_is_zero(self.current_length) {
            self.next_segment();
        }
    }

    fn line_to(&mut self, p: Vec2, out: &mut Path) {
        let mut from = self.current;
        let mut length = (p - from).length();

        if length <= self.current_length {
            self.current_length -= length;
            self.add_line(p, out);
        } else {
            while length > self.current_length {
                length -= self.current_length;
                let t = self.current_length / (p - from).length();
                let cut = from + (p - from) * t;
                self.add_line(cut, out);
                self.next_segment();
                from = cut;
                self.current = from;
            }
            if length > TOLERANCE {
                self.current_length -= length;
                self.add_line(p, out);
            }
        }
        if self.current_length < TOLERANCE {
            self.next_segment();
        }
        self.current = p;
    }

    fn cubic_to(&mut self, bez: CubicBez, out: &mut Path) {
        let mut b = bez;
        let mut length = b.length();

        if length <= self.current_length {
            self.current_length -= length;
            self.add_cubic(b, out);
        } else {
            while length > self.current_length {
                length -= self.current_length;
                let (left, right) = b.split_at_length(self.current_length);
                self.add_cubic(left, out);
                self.next_segment();
                b = right;
                self.current = b.p0;
            }
            if length > TOLERANCE {
                self.current_length -= length;
                self.add_cubic(b, out);
            }
        }
        if self.current_length < TOLERANCE {
            self.next_segment();
        }
        self.current = bez.p3;
    }

    fn add_line(&mut self, p: Vec2, out: &mut Path) {
        if self.discard {
            return;
        }
        if self.start_new_segment {
            out.move_to(self.current);
            self.start_new_segment = false;
        }
        out.line_to(p);
    }

    fn add_cubic(&mut self, b: CubicBez, out: &mut Path) {
        if self.discard {
            return;
        }
        if self.start_new_segment {
            out.move_to(self.current);
            self.start_new_segment = false;
        }
        out.cubic_to(b.p1, b.p2, b.p3);
    }

    fn next_segment(&mut self) {
        self.start_new_segment = true;
        if self.discard {
            self.discard = false;
            self.index = (self.index + 1) % self.pattern.len();
            self.current_length = self.pattern[self.index].length;
        } else {
            self.discard = true;
            self.current_length = self.pattern[self.index].gap;
        }
        if fuzzy_is_zero(self.current_length) {
            self.next_segment();
        }
    }
}
