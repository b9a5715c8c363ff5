//! Shape-layer content tree.
//!
//! Contents live in a flat item arena; groups (and repeater copies)
//! reference children by index. The tree is built back-to-front from the
//! model's front-to-back order. Paint operators collect the path items
//! that textually precede them; trim operators do the same and rewrite
//! those paths in place.

use glam::Affine2;

use crate::geometry::matrix_scale;
use crate::geometry::measure::PathMeasure;
use crate::geometry::path::Path;
use crate::geometry::rect::{IntRect, Rect};
use crate::model::Composition;
use crate::model::shape::{PolystarKind, ShapeId, ShapeNode, TrimKind, TrimSegment};
use crate::paint::gradient::Gradient;
use crate::paint::{Brush, Painter};
use crate::render::layer::DirtyFlags;
use crate::raster::rle::Rle;
use crate::render::drawable::Drawable;
use crate::utils::{fuzzy_compare, fuzzy_is_zero};
use std::sync::Arc;

pub enum ContentItem {
    Group(GroupItem),
    Path(PathItem),
    Paint(PaintItem),
    Trim(TrimItem),
    Repeater(RepeaterItem),
}

pub struct ContentTree {
    items: Vec<ContentItem>,
    root: usize,
    has_path_operator: bool,
}

impl ContentTree {
    #[must_use]
    pub fn new(comp: &Composition, shapes: &[ShapeId]) -> Self {
        let mut items = Vec::new();
        let mut children = Vec::with_capacity(shapes.len());
        // Model order is front-to-back; keep items back-to-front.
        for id in shapes.iter().rev() {
            if let Some(idx) = build_item(comp, *id, &mut items) {
                children.push(idx);
            }
        }
        let root = items.len();
        items.push(ContentItem::Group(GroupItem {
            shape: None,
            children,
            matrix: Affine2::IDENTITY,
        }));

        let mut tree = Self {
            items,
            root,
            has_path_operator: false,
        };
        let mut paths = Vec::new();
        process_paint_items(&mut tree.items, tree.root, &mut paths);
        tree.has_path_operator = tree
            .items
            .iter()
            .any(|item| matches!(item, ContentItem::Trim(_)));
        if tree.has_path_operator {
            paths.clear();
            process_trim_items(&mut tree.items, tree.root, &mut paths);
        }
        tree
    }

    pub fn update(
        &mut self,
        comp: &Composition,
        frame_no: f32,
        parent_matrix: &Affine2,
        parent_alpha: f32,
        flag: DirtyFlags,
    ) {
        update_item(
            &mut self.items,
            self.root,
            comp,
            frame_no,
            parent_matrix,
            parent_alpha,
            flag,
        );
        if self.has_path_operator {
            apply_trim_tree(&mut self.items, self.root);
        }
    }

    pub fn preprocess(&mut self, clip: &IntRect) {
        let list = self.render_list();
        for idx in list {
            if let ContentItem::Paint(p) = &mut self.items[idx] {
                p.drawable.preprocess(clip);
            }
        }
    }

    /// Paint items with content this frame, paint order.
    #[must_use]
    pub fn render_list(&mut self) -> Vec<usize> {
        let mut out = Vec::new();
        collect_render_list(&mut self.items, self.root, &mut out);
        out
    }

    pub fn draw(&mut self, painter: &mut Painter<'_>, mask: Option<&Rle>, matte: Option<&Rle>) {
        let list = self.render_list();
        for idx in list {
            if let ContentItem::Paint(p) = &mut self.items[idx] {
                draw_drawable(&mut p.drawable, painter, mask, matte);
            }
        }
    }

    /// Inverse-matte variant: coverage outside the matte survives.
    pub fn draw_one_inverse(
        &mut self,
        idx: usize,
        painter: &mut Painter<'_>,
        mask: Option<&Rle>,
        matte: &Rle,
    ) {
        if let ContentItem::Paint(p) = &mut self.items[idx] {
            painter.set_brush(&p.drawable.brush);
            let mut rle = p.drawable.rle().clone();
            if let Some(m) = mask {
                rle = rle.intersected(m);
            }
            if rle.is_empty() {
                return;
            }
            let rle = rle.subtracted(matte);
            painter.draw_rle(&rle, None);
        }
    }
}

/// Shared drawable paint step handling mask and matte clips.
pub fn draw_drawable(
    drawable: &mut Drawable,
    painter: &mut Painter<'_>,
    mask: Option<&Rle>,
    matte: Option<&Rle>,
) {
    painter.set_brush(&drawable.brush);
    match (mask, matte) {
        (None, None) => painter.draw_rle(drawable.rle(), None),
        (Some(m), None) => painter.draw_rle(drawable.rle(), Some(m)),
        (None, Some(mt)) => painter.draw_rle(drawable.rle(), Some(mt)),
        (Some(m), Some(mt)) => {
            let clipped = drawable.rle().intersected(m);
            if clipped.is_empty() {
                return;
            }
            painter.draw_rle(&clipped, Some(mt));
        }
    }
}

// ======================================================================
// Build
// ======================================================================

fn build_item(comp: &Composition, id: ShapeId, items: &mut Vec<ContentItem>) -> Option<usize> {
    let idx = match comp.shape(id) {
        ShapeNode::Group(group) => {
            let mut children = Vec::with_capacity(group.children.len());
            for child in group.children.iter().rev() {
                if let Some(cidx) = build_item(comp, *child, items) {
                    children.push(cidx);
                }
            }
            items.push(ContentItem::Group(GroupItem {
                shape: Some(id),
                children,
                matrix: Affine2::IDENTITY,
            }));
            items.len() - 1
        }
        ShapeNode::Rect(_) | ShapeNode::Ellipse(_) | ShapeNode::Path(_)
        | ShapeNode::Polystar(_) => {
            items.push(ContentItem::Path(PathItem::new(id, comp)));
            items.len() - 1
        }
        ShapeNode::Fill(_) | ShapeNode::GradientFill(_) | ShapeNode::Stroke(_)
        | ShapeNode::GradientStroke(_) => {
            items.push(ContentItem::Paint(PaintItem::new(id, comp)));
            items.len() - 1
        }
        ShapeNode::Trim(_) => {
            items.push(ContentItem::Trim(TrimItem::new(id)));
            items.len() - 1
        }
        ShapeNode::Repeater(repeater) => {
            let max_copies = repeater.max_copies.ceil().max(0.0) as usize;
            let content = repeater.content;
            let mut copies = Vec::with_capacity(max_copies);
            for _ in 0..max_copies {
                if let Some(group_idx) = build_item(comp, content, items) {
                    copies.push(group_idx);
                }
            }
            items.push(ContentItem::Repeater(RepeaterItem {
                shape: id,
                copies,
                hidden: false,
            }));
            items.len() - 1
        }
    };
    Some(idx)
}

fn container_children(items: &[ContentItem], idx: usize) -> Option<Vec<usize>> {
    match &items[idx] {
        ContentItem::Group(g) => Some(g.children.clone()),
        ContentItem::Repeater(r) => Some(r.copies.clone()),
        _ => None,
    }
}

/// Paint items adopt every path item produced since their group opened.
fn process_paint_items(items: &mut Vec<ContentItem>, group_idx: usize, list: &mut Vec<usize>) {
    let Some(children) = container_children(items, group_idx) else {
        return;
    };
    let group_start = list.len();
    // Children are stored back-to-front; walk them in model order.
    for child in children.iter().rev() {
        let is_container = matches!(
            &items[*child],
            ContentItem::Group(_) | ContentItem::Repeater(_)
        );
        if is_container {
            process_paint_items(items, *child, list);
            continue;
        }
        match &mut items[*child] {
            ContentItem::Path(_) => list.push(*child),
            ContentItem::Paint(p) => {
                p.path_items = list[group_start..].to_vec();
            }
            _ => {}
        }
    }
}

/// Trim items adopt the path items that precede them the same way.
fn process_trim_items(items: &mut Vec<ContentItem>, group_idx: usize, list: &mut Vec<usize>) {
    let Some(children) = container_children(items, group_idx) else {
        return;
    };
    let group_start = list.len();
    for child in children.iter().rev() {
        let is_container = matches!(
            &items[*child],
            ContentItem::Group(_) | ContentItem::Repeater(_)
        );
        if is_container {
            process_trim_items(items, *child, list);
            continue;
        }
        match &mut items[*child] {
            ContentItem::Path(_) => list.push(*child),
            ContentItem::Trim(t) => {
                t.path_items = list[group_start..].to_vec();
            }
            _ => {}
        }
    }
}

// ======================================================================
// Update
// ======================================================================

fn update_item(
    items: &mut Vec<ContentItem>,
    idx: usize,
    comp: &Composition,
    frame_no: f32,
    parent_matrix: &Affine2,
    parent_alpha: f32,
    flag: DirtyFlags,
) {
    // Containers recurse, so their arena borrow must end first.
    match &items[idx] {
        ContentItem::Group(_) => {
            update_group(items, idx, comp, frame_no, parent_matrix, parent_alpha, flag);
            return;
        }
        ContentItem::Repeater(_) => {
            update_repeater(items, idx, comp, frame_no, parent_matrix, parent_alpha, flag);
            return;
        }
        _ => {}
    }
    match &mut items[idx] {
        ContentItem::Path(path) => path.update(comp, frame_no, &flag, parent_matrix),
        ContentItem::Paint(paint) => {
            paint.update(comp, frame_no, parent_matrix, parent_alpha);
        }
        ContentItem::Trim(trim) => trim.update_frame(comp, frame_no),
        _ => {}
    }
}

fn update_group(
    items: &mut Vec<ContentItem>,
    idx: usize,
    comp: &Composition,
    frame_no: f32,
    parent_matrix: &Affine2,
    parent_alpha: f32,
    flag: DirtyFlags,
) {
    let (shape, old_matrix, children) = match &items[idx] {
        ContentItem::Group(g) => (g.shape, g.matrix, g.children.clone()),
        _ => return,
    };

    let mut new_flag = flag;
    let mut alpha = parent_alpha;
    let mut matrix = *parent_matrix;
    if let Some(shape_id) = shape
        && let ShapeNode::Group(data) = comp.shape(shape_id)
        && let Some(transform) = &data.transform
    {
        let m = *parent_matrix * transform.matrix(frame_no, false);
        if !flag.contains(DirtyFlags::MATRIX) && !transform.is_static() && m != old_matrix {
            new_flag |= DirtyFlags::MATRIX;
        }
        matrix = m;
        alpha = parent_alpha * transform.opacity(frame_no);
        if !fuzzy_compare(alpha, parent_alpha) {
            new_flag |= DirtyFlags::ALPHA;
        }
    }
    if let ContentItem::Group(g) = &mut items[idx] {
        g.matrix = matrix;
    }
    for child in children {
        update_item(items, child, comp, frame_no, &matrix, alpha, new_flag);
    }
}

fn update_repeater(
    items: &mut Vec<ContentItem>,
    idx: usize,
    comp: &Composition,
    frame_no: f32,
    parent_matrix: &Affine2,
    parent_alpha: f32,
    flag: DirtyFlags,
) {
    let (shape_id, copies_idx) = match &items[idx] {
        ContentItem::Repeater(r) => (r.shape, r.copies.clone()),
        _ => return,
    };
    let ShapeNode::Repeater(data) = comp.shape(shape_id) else {
        return;
    };

    let copies = data.copies.eval(frame_no);
    let visible = copies as i32;
    if visible == 0 {
        if let ContentItem::Repeater(r) = &mut items[idx] {
            r.hidden = true;
        }
        return;
    }
    if let ContentItem::Repeater(r) = &mut items[idx] {
        r.hidden = false;
    }

    let mut new_flag = flag;
    if !data.statik {
        new_flag |= DirtyFlags::MATRIX;
    }
    new_flag |= DirtyFlags::ALPHA;

    let offset = data.offset.eval(frame_no);
    let start_opacity = data.transform.start_opacity(frame_no);
    let end_opacity = data.transform.end_opacity(frame_no);

    for (i, group_idx) in copies_idx.iter().enumerate() {
        let t = i as f32 / copies;
        let mut alpha = parent_alpha * (start_opacity + (end_opacity - start_opacity) * t);
        if i as i32 >= visible {
            alpha = 0.0;
        }
        let matrix = *parent_matrix * data.transform.matrix(frame_no, i as f32 + offset);
        update_item(items, *group_idx, comp, frame_no, &matrix, alpha, new_flag);
    }
}

fn collect_render_list(items: &mut Vec<ContentItem>, idx: usize, out: &mut Vec<usize>) {
    if let ContentItem::Repeater(r) = &items[idx]
        && r.hidden
    {
        return;
    }
    if let Some(children) = container_children(items, idx) {
        for child in children {
            collect_render_list(items, child, out);
        }
        return;
    }
    if matches!(&items[idx], ContentItem::Paint(_)) {
        update_render_node(items, idx);
        if let ContentItem::Paint(p) = &items[idx]
            && p.content_to_render
        {
            out.push(idx);
        }
    }
}

/// Rebuilds a paint item's merged path when any source path changed.
fn update_render_node(items: &mut Vec<ContentItem>, paint_idx: usize) {
    let (path_items, pending) = match &items[paint_idx] {
        ContentItem::Paint(p) => (p.path_items.clone(), p.render_node_update),
        _ => return,
    };
    if !pending {
        return;
    }
    let dirty = path_items.iter().any(|i| match &items[*i] {
        ContentItem::Path(p) => p.dirty,
        _ => false,
    });
    if dirty {
        let mut merged = Path::new();
        for i in &path_items {
            if let ContentItem::Path(p) = &items[*i] {
                merged.add_path(&p.temp, Some(&p.matrix));
            }
        }
        if let ContentItem::Paint(p) = &mut items[paint_idx] {
            p.drawable.set_path(merged);
        }
    }
    if let ContentItem::Paint(p) = &mut items[paint_idx] {
        p.render_node_update = false;
    }
}

fn apply_trim_tree(items: &mut Vec<ContentItem>, idx: usize) {
    // Model order: walk stored children in reverse.
    let Some(children) = container_children(items, idx) else {
        return;
    };
    for child in children.iter().rev() {
        if matches!(&items[*child], ContentItem::Trim(_)) {
            apply_trim(items, *child);
        } else if matches!(
            &items[*child],
            ContentItem::Group(_) | ContentItem::Repeater(_)
        ) {
            apply_trim_tree(items, *child);
        }
    }
}

fn apply_trim(items: &mut Vec<ContentItem>, trim_idx: usize) {
    let (path_items, segment, trim_dirty, kind) = match &items[trim_idx] {
        ContentItem::Trim(t) => (
            t.path_items.clone(),
            t.segment,
            t.dirty,
            t.kind,
        ),
        _ => return,
    };
    let path_dirty = path_items.iter().any(|i| match &items[*i] {
        ContentItem::Path(p) => p.dirty,
        _ => false,
    });
    if !(trim_dirty || path_dirty) {
        return;
    }

    if fuzzy_compare(segment.start, segment.end) {
        for i in &path_items {
            if let ContentItem::Path(p) = &mut items[*i] {
                p.temp = Path::new();
                p.dirty = true;
            }
        }
        return;
    }
    if fuzzy_compare((segment.start - segment.end).abs(), 1.0) {
        for i in &path_items {
            if let ContentItem::Path(p) = &mut items[*i] {
                p.temp = p.local_path.clone();
                p.dirty = true;
            }
        }
        return;
    }

    let mut measure = PathMeasure::new();
    match kind {
        TrimKind::Simultaneously => {
            measure.set_range(segment.start, segment.end);
            for i in &path_items {
                if let ContentItem::Path(p) = &mut items[*i] {
                    p.temp = measure.trim(&p.local_path);
                    p.dirty = true;
                }
            }
        }
        TrimKind::Individually => {
            let mut total_length = 0.0;
            for i in &path_items {
                if let ContentItem::Path(p) = &items[*i] {
                    total_length += p.local_path.length();
                }
            }
            let start = total_length * segment.start;
            let end = total_length * segment.end;
            if start < end {
                let mut cur_len = 0.0;
                for i in &path_items {
                    let ContentItem::Path(p) = &mut items[*i] else {
                        continue;
                    };
                    if cur_len > end {
                        p.temp = Path::new();
                        p.dirty = true;
                        continue;
                    }
                    let len = p.local_path.length();
                    if cur_len < start && cur_len + len < start {
                        cur_len += len;
                        p.temp = Path::new();
                        p.dirty = true;
                        continue;
                    }
                    if start <= cur_len && end >= cur_len + len {
                        // Entirely inside the window.
                        cur_len += len;
                        continue;
                    }
                    let local_start = if start > cur_len {
                        (start - cur_len) / len
                    } else {
                        0.0
                    };
                    let local_end = if cur_len + len < end {
                        1.0
                    } else {
                        (end - cur_len) / len
                    };
                    measure.set_range(local_start, local_end);
                    p.temp = measure.trim(&p.local_path);
                    p.dirty = true;
                    cur_len += len;
                }
            }
        }
    }
}

// ======================================================================
// Items
// ======================================================================

pub struct GroupItem {
    shape: Option<ShapeId>,
    children: Vec<usize>,
    matrix: Affine2,
}

pub struct PathItem {
    shape: ShapeId,
    statik: bool,
    /// Local path before trims and transforms.
    local_path: Path,
    /// Post-trim path the paint items merge.
    temp: Path,
    /// Owning group matrix at the last update.
    matrix: Affine2,
    dirty: bool,
    built: bool,
}

impl PathItem {
    fn new(shape: ShapeId, comp: &Composition) -> Self {
        Self {
            shape,
            statik: comp.shape(shape).is_static(),
            local_path: Path::new(),
            temp: Path::new(),
            matrix: Affine2::IDENTITY,
            dirty: false,
            built: false,
        }
    }

    fn update(&mut self, comp: &Composition, frame_no: f32, flag: &DirtyFlags, matrix: &Affine2) {
        self.dirty = false;
        if !self.statik || !self.built {
            self.local_path.reset();
            self.build_path(comp, frame_no);
            self.built = true;
            self.dirty = true;
        }
        // Trims may replace the temp path below; keep the base copy.
        self.temp = self.local_path.clone();
        if flag.contains(DirtyFlags::MATRIX) {
            self.dirty = true;
        }
        self.matrix = *matrix;
    }

    fn build_path(&mut self, comp: &Composition, frame_no: f32) {
        match comp.shape(self.shape) {
            ShapeNode::Rect(data) => {
                let pos = data.pos.eval(frame_no);
                let size = data.size.eval(frame_no);
                let roundness = data.round.eval(frame_no);
                let rect = Rect::new(pos.x - size.x / 2.0, pos.y - size.y / 2.0, size.x, size.y);
                self.local_path.add_round_rect(rect, roundness, data.direction);
            }
            ShapeNode::Ellipse(data) => {
                let pos = data.pos.eval(frame_no);
                let size = data.size.eval(frame_no);
                let rect = Rect::new(pos.x - size.x / 2.0, pos.y - size.y / 2.0, size.x, size.y);
                self.local_path.add_oval(rect, data.direction);
            }
            ShapeNode::Path(data) => {
                let shape = data.shape.eval(frame_no);
                shape.to_path(&mut self.local_path);
            }
            ShapeNode::Polystar(data) => {
                let pos = data.pos.eval(frame_no);
                let points = data.point_count.eval(frame_no);
                let inner_radius = data.inner_radius.eval(frame_no);
                let outer_radius = data.outer_radius.eval(frame_no);
                let inner_roundness = data.inner_roundness.eval(frame_no);
                let outer_roundness = data.outer_roundness.eval(frame_no);
                let rotation = data.rotation.eval(frame_no);
                if data.kind == PolystarKind::Star {
                    self.local_path.add_polystar(
                        points,
                        inner_radius,
                        outer_radius,
                        inner_roundness,
                        outer_roundness,
                        0.0,
                        0.0,
                        0.0,
                        data.direction,
                    );
                } else {
                    self.local_path.add_polygon(
                        points,
                        outer_radius,
                        outer_roundness,
                        0.0,
                        0.0,
                        0.0,
                        data.direction,
                    );
                }
                let m = Affine2::from_translation(pos)
                    * Affine2::from_angle(rotation.to_radians());
                self.local_path.transform(&m);
            }
            _ => {}
        }
    }
}

pub struct PaintItem {
    shape: ShapeId,
    path_items: Vec<usize>,
    pub drawable: Drawable,
    content_to_render: bool,
    render_node_update: bool,
    /// Cached gradient table; rebuilt when the stops animate.
    gradient_cache: Option<(Arc<Gradient>, Arc<Vec<u32>>)>,
}

impl PaintItem {
    fn new(shape: ShapeId, comp: &Composition) -> Self {
        let drawable = match comp.shape(shape) {
            ShapeNode::Fill(data) => Drawable::fill(data.fill_rule),
            ShapeNode::GradientFill(data) => Drawable::fill(data.fill_rule),
            ShapeNode::Stroke(_) | ShapeNode::GradientStroke(_) => Drawable::stroke(),
            _ => Drawable::fill(crate::raster::FillRule::Winding),
        };
        Self {
            shape,
            path_items: Vec::new(),
            drawable,
            content_to_render: true,
            render_node_update: true,
            gradient_cache: None,
        }
    }

    fn update(
        &mut self,
        comp: &Composition,
        frame_no: f32,
        parent_matrix: &Affine2,
        parent_alpha: f32,
    ) {
        self.render_node_update = true;
        self.content_to_render = match comp.shape(self.shape) {
            ShapeNode::Fill(data) => {
                let alpha = parent_alpha * data.opacity.eval(frame_no) / 100.0;
                let color = data.color.eval(frame_no);
                self.drawable.set_brush(Brush::Solid(color.premultiplied(alpha)));
                self.drawable.set_fill_rule(data.fill_rule);
                data.enabled && alpha > 0.0
            }
            ShapeNode::GradientFill(data) => {
                let alpha = parent_alpha * data.gradient.opacity.eval(frame_no) / 100.0;
                self.update_gradient(&data.gradient, frame_no, alpha, parent_matrix);
                self.drawable.set_fill_rule(data.fill_rule);
                !fuzzy_is_zero(alpha)
            }
            ShapeNode::Stroke(data) => {
                let alpha = parent_alpha * data.opacity.eval(frame_no) / 100.0;
                let color = data.color.eval(frame_no);
                self.drawable.set_brush(Brush::Solid(color.premultiplied(alpha)));
                let scale = matrix_scale(parent_matrix);
                self.drawable.set_stroke_info(
                    data.cap,
                    data.join,
                    data.miter_limit,
                    data.width.eval(frame_no) * scale,
                );
                if !data.dash.is_empty() {
                    let mut pattern = data.dash.eval(frame_no);
                    for v in &mut pattern {
                        *v *= scale;
                    }
                    self.drawable.set_dash(&pattern);
                }
                data.enabled && alpha > 0.0
            }
            ShapeNode::GradientStroke(data) => {
                let alpha = parent_alpha * data.gradient.opacity.eval(frame_no) / 100.0;
                self.update_gradient(&data.gradient, frame_no, alpha, parent_matrix);
                let scale = matrix_scale(parent_matrix);
                self.drawable.set_stroke_info(
                    data.cap,
                    data.join,
                    data.miter_limit,
                    data.width.eval(frame_no) * scale,
                );
                if !data.dash.is_empty() {
                    let mut pattern = data.dash.eval(frame_no);
                    for v in &mut pattern {
                        *v *= scale;
                    }
                    self.drawable.set_dash(&pattern);
                }
                !fuzzy_is_zero(alpha)
            }
            _ => false,
        };
    }

    fn update_gradient(
        &mut self,
        data: &crate::model::shape::GradientData,
        frame_no: f32,
        alpha: f32,
        matrix: &Affine2,
    ) {
        let rebuild = self.gradient_cache.is_none() || !data.statik;
        if rebuild {
            let gradient = Arc::new(data.evaluate(frame_no, alpha));
            let table = Arc::new(gradient.build_color_table());
            self.gradient_cache = Some((gradient, table));
        } else if let Some((gradient, table)) = &mut self.gradient_cache
            && !fuzzy_compare(gradient.alpha, alpha)
        {
            let mut g = (**gradient).clone();
            g.alpha = alpha;
            let rebuilt = Arc::new(g);
            *table = Arc::new(rebuilt.build_color_table());
            *gradient = rebuilt;
        }
        let (gradient, table) = self.gradient_cache.as_ref().unwrap();
        self.drawable.set_brush(Brush::Gradient {
            gradient: gradient.clone(),
            table: table.clone(),
            matrix: *matrix,
        });
    }
}

pub struct TrimItem {
    shape: ShapeId,
    path_items: Vec<usize>,
    segment: TrimSegment,
    cache_frame: Option<f32>,
    dirty: bool,
    kind: TrimKind,
}

impl TrimItem {
    fn new(shape: ShapeId) -> Self {
        Self {
            shape,
            path_items: Vec::new(),
            segment: TrimSegment {
                start: 0.0,
                end: 0.0,
            },
            cache_frame: None,
            dirty: false,
            kind: TrimKind::Simultaneously,
        }
    }

    fn update_frame(&mut self, comp: &Composition, frame_no: f32) {
        self.dirty = false;
        if self.cache_frame == Some(frame_no) {
            return;
        }
        let ShapeNode::Trim(data) = comp.shape(self.shape) else {
            return;
        };
        self.kind = data.kind;
        let segment = data.segment(frame_no);
        if !(fuzzy_compare(self.segment.start, segment.start)
            && fuzzy_compare(self.segment.end, segment.end))
            || self.cache_frame.is_none()
        {
            self.dirty = true;
            self.segment = segment;
        }
        self.cache_frame = Some(frame_no);
    }
}

pub struct RepeaterItem {
    shape: ShapeId,
    copies: Vec<usize>,
    hidden: bool,
}
