//! Path trimming by arc-length range, built on top of the dasher: a trim
//! is a dash pattern with one "on" window positioned by an offset.

use crate::geometry::dash::Dasher;
use crate::geometry::path::Path;
use crate::utils::fuzzy_compare;

#[derive(Debug, Clone, Copy, Default)]
pub struct PathMeasure {
    start: f32,
    end: f32,
}

impl PathMeasure {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: 0.0,
            end: 1.0,
        }
    }

    pub fn set_range(&mut self, start: f32, end: f32) {
        self.start = start;
        self.end = end;
    }

    /// Keeps the `[start, end]` arc-length fraction of the path. A
    /// reversed range keeps the wrapped-around complement starting at
    /// `end`.
    #[must_use]
    pub fn trim(&self, path: &Path) -> Path {
        if fuzzy_compare(self.start, self.end) {
            return Path::new();
        }
        if (fuzzy_compare(self.start, 0.0) && fuzzy_compare(self.end, 1.0))
            || (fuzzy_compare(self.start, 1.0) && fuzzy_compare(self.end, 0.0))
        {
            return path.clone();
        }

        let length = path.length();
        if self.start < self.end {
            let array = [
                0.0,
                length * self.start,
                (self.end - self.start) * length,
                f32::MAX,
            ];
            Dasher::new(&array).dashed(path)
        } else {
            let array = [
                length * self.end,
                (self.start - self.end) * length,
                (1.0 - self.start) * length,
                f32::MAX,
            ];
            Dasher::new(&array).dashed(path)
        }
    }
}
