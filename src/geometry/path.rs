//! Path building.
//!
//! A path is stored as parallel element/point arrays: `MoveTo` and
//! `LineTo` consume one point, `CubicTo` three, `Close` none. High-level
//! primitives (rect, round-rect, oval, polystar, polygon, arc) are built
//! from these four verbs.

use glam::{Affine2, Vec2};

use crate::geometry::bezier::CubicBez;
use crate::geometry::rect::Rect;
use crate::utils::{fuzzy_compare, fuzzy_is_zero};

/// Circle-from-cubics approximation constant.
pub const PATH_KAPPA: f32 = 0.552_284_75;

const K_PI: f32 = std::f32::consts::PI;

/// Winding direction for generated primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathDirection {
    #[default]
    Cw,
    Ccw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathElement {
    MoveTo,
    LineTo,
    CubicTo,
    Close,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    elements: Vec<PathElement>,
    points: Vec<Vec2>,
}

impl Path {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn reset(&mut self) {
        self.elements.clear();
        self.points.clear();
    }

    pub fn reserve(&mut self, points: usize, elements: usize) {
        self.points.reserve(points);
        self.elements.reserve(elements);
    }

    pub fn move_to(&mut self, p: Vec2) {
        self.elements.push(PathElement::MoveTo);
        self.points.push(p);
    }

    pub fn line_to(&mut self, p: Vec2) {
        self.elements.push(PathElement::LineTo);
        self.points.push(p);
    }

    pub fn cubic_to(&mut self, c1: Vec2, c2: Vec2, e: Vec2) {
        self.elements.push(PathElement::CubicTo);
        self.points.push(c1);
        self.points.push(c2);
        self.points.push(e);
    }

    pub fn close(&mut self) {
        if self.elements.last() != Some(&PathElement::Close) {
            self.elements.push(PathElement::Close);
        }
    }

    /// Appends `other`, optionally transforming its points.
    pub fn add_path(&mut self, other: &Path, m: Option<&Affine2>) {
        self.points.reserve(other.points.len());
        self.elements.reserve(other.elements.len());
        match m {
            Some(m) => {
                for p in &other.points {
                    self.points.push(m.transform_point2(*p));
                }
            }
            None => self.points.extend_from_slice(&other.points),
        }
        self.elements.extend_from_slice(&other.elements);
    }

    pub fn transform(&mut self, m: &Affine2) {
        for p in &mut self.points {
            *p = m.transform_point2(*p);
        }
    }

    /// Total arc length, closing segments included.
    #[must_use]
    pub fn length(&self) -> f32 {
        let mut total = 0.0;
        for seg in self.segments() {
            total += seg.length();
        }
        total
    }

    #[must_use]
    pub fn segments(&self) -> PathSegments<'_> {
        PathSegments {
            path: self,
            element: 0,
            point: 0,
            current: Vec2::ZERO,
            subpath_start: Vec2::ZERO,
        }
    }

    // ------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------

    pub fn add_rect(&mut self, rect: Rect, dir: PathDirection) {
        if rect.is_empty() {
            return;
        }
        let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);
        self.reserve(5, 6);
        if dir == PathDirection::Cw {
            self.move_to(Vec2::new(x + w, y));
            self.line_to(Vec2::new(x + w, y + h));
            self.line_to(Vec2::new(x, y + h));
            self.line_to(Vec2::new(x, y));
        } else {
            self.move_to(Vec2::new(x + w, y));
            self.line_to(Vec2::new(x, y));
            self.line_to(Vec2::new(x, y + h));
            self.line_to(Vec2::new(x + w, y + h));
        }
        self.close();
    }

    pub fn add_round_rect(&mut self, rect: Rect, roundness: f32, dir: PathDirection) {
        if fuzzy_is_zero(roundness) {
            self.add_rect(rect, dir);
            return;
        }
        let mut r = roundness;
        if 2.0 * r > rect.width {
            r = rect.width / 2.0;
        }
        if 2.0 * r > rect.height {
            r = rect.height / 2.0;
        }
        let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);
        // Corner oval bounding boxes are 2r squares.
        let d = 2.0 * r;
        self.reserve(17, 10);
        if dir == PathDirection::Cw {
            self.move_to(Vec2::new(x + w, y + d / 2.0));
            self.arc_to(Rect::new(x + w - d, y + h - d, d, d), 0.0, -90.0, false);
            self.arc_to(Rect::new(x, y + h - d, d, d), -90.0, -90.0, false);
            self.arc_to(Rect::new(x, y, d, d), -180.0, -90.0, false);
            self.arc_to(Rect::new(x + w - d, y, d, d), -270.0, -90.0, false);
        } else {
            self.move_to(Vec2::new(x + w, y + d / 2.0));
            self.arc_to(Rect::new(x + w - d, y, d, d), 0.0, 90.0, false);
            self.arc_to(Rect::new(x, y, d, d), 90.0, 90.0, false);
            self.arc_to(Rect::new(x, y + h - d, d, d), 180.0, 90.0, false);
            self.arc_to(Rect::new(x + w - d, y + h - d, d, d), 270.0, 90.0, false);
        }
        self.close();
    }

    pub fn add_oval(&mut self, rect: Rect, dir: PathDirection) {
        if rect.is_empty() {
            return;
        }
        let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);
        let w2 = w / 2.0;
        let h2 = h / 2.0;
        let w2k = w2 * PATH_KAPPA;
        let h2k = h2 * PATH_KAPPA;
        self.reserve(13, 6);
        // 12 o'clock start, one cubic per quadrant.
        self.move_to(Vec2::new(x + w2, y));
        if dir == PathDirection::Cw {
            self.cubic_to(
                Vec2::new(x + w2 + w2k, y),
                Vec2::new(x + w, y + h2 - h2k),
                Vec2::new(x + w, y + h2),
            );
            self.cubic_to(
                Vec2::new(x + w, y + h2 + h2k),
                Vec2::new(x + w2 + w2k, y + h),
                Vec2::new(x + w2, y + h),
            );
            self.cubic_to(
                Vec2::new(x + w2 - w2k, y + h),
                Vec2::new(x, y + h2 + h2k),
                Vec2::new(x, y + h2),
            );
            self.cubic_to(
                Vec2::new(x, y + h2 - h2k),
                Vec2::new(x + w2 - w2k, y),
                Vec2::new(x + w2, y),
            );
        } else {
            self.cubic_to(
                Vec2::new(x + w2 - w2k, y),
                Vec2::new(x, y + h2 - h2k),
                Vec2::new(x, y + h2),
            );
            self.cubic_to(
                Vec2::new(x, y + h2 + h2k),
                Vec2::new(x + w2 - w2k, y + h),
                Vec2::new(x + w2, y + h),
            );
            self.cubic_to(
                Vec2::new(x + w2 + w2k, y + h),
                Vec2::new(x + w, y + h2 + h2k),
                Vec2::new(x + w, y + h2),
            );
            self.cubic_to(
                Vec2::new(x + w, y + h2 - h2k),
                Vec2::new(x + w2 + w2k, y),
                Vec2::new(x + w2, y),
            );
        }
        self.close();
    }

    pub fn add_circle(&mut self, cx: f32, cy: f32, radius: f32, dir: PathDirection) {
        self.add_oval(
            Rect::new(cx - radius, cy - radius, 2.0 * radius, 2.0 * radius),
            dir,
        );
    }

    /// Elliptical arc on `rect` starting at `start_angle` degrees sweeping
    /// `sweep` degrees. Positive angles run counter-clockwise in a y-up
    /// frame (visually counter-clockwise with the y-down raster frame
    /// mirrored), matching After Effects conventions.
    pub fn arc_to(&mut self, rect: Rect, start_angle: f32, sweep: f32, force_move: bool) {
        if rect.is_empty() {
            return;
        }
        let sweep = sweep.clamp(-360.0, 360.0);
        let center = rect.center();
        let rx = rect.width / 2.0;
        let ry = rect.height / 2.0;
        let point_at = |deg: f32| -> Vec2 {
            let rad = deg.to_radians();
            Vec2::new(center.x + rx * rad.cos(), center.y - ry * rad.sin())
        };

        let start = point_at(start_angle);
        if self.is_empty() || force_move {
            self.move_to(start);
        } else {
            self.line_to(start);
        }

        // Split the sweep into quarter-turn cubics.
        let segments = (sweep.abs() / 90.0).ceil().max(1.0) as usize;
        let step = sweep / segments as f32;
        let mut a0 = start_angle;
        for _ in 0..segments {
            let a1 = a0 + step;
            let r0 = a0.to_radians();
            let r1 = a1.to_radians();
            // Tangent-length factor for a cubic arc segment.
            let k = 4.0 / 3.0 * ((r1 - r0) / 4.0).tan();
            let p0 = point_at(a0);
            let p3 = point_at(a1);
            let d0 = Vec2::new(-rx * r0.sin(), -ry * r0.cos());
            let d1 = Vec2::new(-rx * r1.sin(), -ry * r1.cos());
            self.cubic_to(p0 + d0 * k, p3 - d1 * k, p3);
            a0 = a1;
        }
    }

    /// Parametric star with inner/outer radii and corner roundness,
    /// centered at `(cx, cy)`, first point at `start_angle - 90` degrees.
    pub fn add_polystar(
        &mut self,
        points: f32,
        inner_radius: f32,
        outer_radius: f32,
        inner_roundness: f32,
        outer_roundness: f32,
        start_angle: f32,
        cx: f32,
        cy: f32,
        dir: PathDirection,
    ) {
        const POLYSTAR_MAGIC: f32 = 0.478_29 / 0.28;
        if points < 1.0 {
            return;
        }
        let mut current_angle = (start_angle - 90.0) * K_PI / 180.0;
        let angle_per_point = 2.0 * K_PI / points;
        let half_angle_per_point = angle_per_point / 2.0;
        let partial_point_amount = points - points.floor();
        let num_points = (points.ceil() * 2.0) as usize;
        let angle_dir = if dir == PathDirection::Cw { 1.0 } else { -1.0 };
        let inner_roundness = inner_roundness / 100.0;
        let outer_roundness = outer_roundness / 100.0;
        let has_roundness = !fuzzy_is_zero(inner_roundness) || !fuzzy_is_zero(outer_roundness);

        let mut partial_point_radius = 0.0;
        let (mut x, mut y);
        if fuzzy_compare(partial_point_amount, 0.0) {
            x = outer_radius * current_angle.cos();
            y = outer_radius * current_angle.sin();
            current_angle += half_angle_per_point * angle_dir;
        } else {
            current_angle += half_angle_per_point * (1.0 - partial_point_amount) * angle_dir;
            partial_point_radius = inner_radius + partial_point_amount * (outer_radius - inner_radius);
            x = partial_point_radius * current_angle.cos();
            y = partial_point_radius * current_angle.sin();
            current_angle += angle_per_point * partial_point_amount / 2.0 * angle_dir;
        }

        if has_roundness {
            self.reserve(num_points * 3 + 2, num_points + 3);
        } else {
            self.reserve(num_points + 2, num_points + 3);
        }

        self.move_to(Vec2::new(x + cx, y + cy));
        let mut long_segment = false;
        for i in 0..num_points {
            let mut radius = if long_segment {
                outer_radius
            } else {
                inner_radius
            };
            let mut d_theta = half_angle_per_point;
            if !fuzzy_is_zero(partial_point_radius) && i == num_points - 2 {
                d_theta = angle_per_point * partial_point_amount / 2.0;
            }
            if !fuzzy_is_zero(partial_point_radius) && i == num_points - 1 {
                radius = partial_point_radius;
            }
            let prev_x = x;
            let prev_y = y;
            x = radius * current_angle.cos();
            y = radius * current_angle.sin();
            if has_roundness {
                let cp1_theta = prev_y.atan2(prev_x) - K_PI / 2.0 * angle_dir;
                let cp2_theta = y.atan2(x) - K_PI / 2.0 * angle_dir;
                let cp1_roundness = if long_segment {
                    inner_roundness
                } else {
                    outer_roundness
                };
                let cp2_roundness = if long_segment {
                    outer_roundness
                } else {
                    inner_roundness
                };
                let cp1_radius = if long_segment {
                    inner_radius
                } else {
                    outer_radius
                };
                let cp2_radius = if long_segment {
                    outer_radius
                } else {
                    inner_radius
                };
                let mut cp1 = Vec2::new(cp1_theta.cos(), cp1_theta.sin())
                    * (cp1_radius * cp1_roundness * POLYSTAR_MAGIC / points);
                let mut cp2 = Vec2::new(cp2_theta.cos(), cp2_theta.sin())
                    * (cp2_radius * cp2_roundness * POLYSTAR_MAGIC / points);
                if !fuzzy_is_zero(partial_point_amount) && (i == 0 || i == num_points - 1) {
                    cp1 *= partial_point_amount;
                    cp2 *= partial_point_amount;
                }
                self.cubic_to(
                    Vec2::new(prev_x - cp1.x + cx, prev_y - cp1.y + cy),
                    Vec2::new(x + cp2.x + cx, y + cp2.y + cy),
                    Vec2::new(x + cx, y + cy),
                );
            } else {
                self.line_to(Vec2::new(x + cx, y + cy));
            }
            current_angle += d_theta * angle_dir;
            long_segment = !long_segment;
        }
        self.close();
    }

    /// Regular polygon with optional corner roundness.
    pub fn add_polygon(
        &mut self,
        points: f32,
        radius: f32,
        roundness: f32,
        start_angle: f32,
        cx: f32,
        cy: f32,
        dir: PathDirection,
    ) {
        const POLYGON_MAGIC: f32 = 0.25;
        let num_points = points.floor() as usize;
        if num_points < 3 {
            return;
        }
        let mut current_angle = (start_angle - 90.0) * K_PI / 180.0;
        let angle_per_point = 2.0 * K_PI / num_points as f32;
        let angle_dir = if dir == PathDirection::Cw { 1.0 } else { -1.0 };
        let roundness = roundness / 100.0;
        let has_roundness = !fuzzy_is_zero(roundness);

        let mut x = radius * current_angle.cos();
        let mut y = radius * current_angle.sin();
        current_angle += angle_per_point * angle_dir;

        if has_roundness {
            self.reserve(num_points * 3 + 2, num_points + 3);
        } else {
            self.reserve(num_points + 2, num_points + 3);
        }
        self.move_to(Vec2::new(x + cx, y + cy));
        for _ in 0..num_points {
            let prev_x = x;
            let prev_y = y;
            x = radius * current_angle.cos();
            y = radius * current_angle.sin();
            if has_roundness {
                let cp1_theta = prev_y.atan2(prev_x) - K_PI / 2.0 * angle_dir;
                let cp2_theta = y.atan2(x) - K_PI / 2.0 * angle_dir;
                let cp1 = Vec2::new(cp1_theta.cos(), cp1_theta.sin())
                    * (radius * roundness * POLYGON_MAGIC);
                let cp2 = Vec2::new(cp2_theta.cos(), cp2_theta.sin())
                    * (radius * roundness * POLYGON_MAGIC);
                self.cubic_to(
                    Vec2::new(prev_x - cp1.x + cx, prev_y - cp1.y + cy),
                    Vec2::new(x + cp2.x + cx, y + cp2.y + cy),
                    Vec2::new(x + cx, y + cy),
                );
            } else {
                self.line_to(Vec2::new(x + cx, y + cy));
            }
            current_angle += angle_per_point * angle_dir;
        }
        self.close();
    }
}

/// One resolved segment of a path walk.
#[derive(Debug, Clone, Copy)]
pub enum Segment {
    MoveTo(Vec2),
    Line { from: Vec2, to: Vec2 },
    Cubic(CubicBez),
    /// Closing line back to the subpath start (zero-length when the
    /// contour already ends there).
    Close { from: Vec2, to: Vec2 },
}

impl Segment {
    #[must_use]
    pub fn length(&self) -> f32 {
        match self {
            Segment::MoveTo(_) => 0.0,
            Segment::Line { from, to } | Segment::Close { from, to } => (*to - *from).length(),
            Segment::Cubic(b) => b.length(),
        }
    }
}

/// Iterator resolving the element/point arrays into typed segments,
/// tracking the current point and subpath start.
pub struct PathSegments<'a> {
    path: &'a Path,
    element: usize,
    point: usize,
    current: Vec2,
    subpath_start: Vec2,
}

impl Iterator for PathSegments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let elm = self.path.elements.get(self.element)?;
        self.element += 1;
        match elm {
            PathElement::MoveTo => {
                let p = self.path.points[self.point];
                self.point += 1;
                self.current = p;
                self.subpath_start = p;
                Some(Segment::MoveTo(p))
            }
            PathElement::LineTo => {
                let p = self.path.points[self.point];
                self.point += 1;
                let seg = Segment::Line {
                    from: self.current,
                    to: p,
                };
                self.current = p;
                Some(seg)
            }
            PathElement::CubicTo => {
                let c1 = self.path.points[self.point];
                let c2 = self.path.points[self.point + 1];
                let e = self.path.points[self.point + 2];
                self.point += 3;
                let seg = Segment::Cubic(CubicBez::from_points(self.current, c1, c2, e));
                self.current = e;
                Some(seg)
            }
            PathElement::Close => {
                let seg = Segment::Close {
                    from: self.current,
                    to: self.subpath_start,
                };
                self.current = self.subpath_start;
                Some(seg)
            }
        }
    }
}
