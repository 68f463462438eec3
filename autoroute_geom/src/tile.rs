// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Convex tiles.

use core::f64::consts::PI;

use kurbo::{Line, Point, Rect, Vec2};

use crate::half_plane::HalfPlane;
use crate::octagon::Octagon;
use crate::EPSILON;

/// Dimension of a [`Tile`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    /// No points at all.
    Empty,
    /// A single point.
    Point,
    /// A segment of positive length.
    Line,
    /// A polygon with positive area.
    Area,
}

/// A closed convex polygon, possibly degenerate.
///
/// Vertices are kept in counter-clockwise order without duplicates or
/// collinear middle points. One vertex is a point tile, two are a segment.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    vertices: Vec<Point>,
}

impl Default for Tile {
    fn default() -> Self {
        Self::EMPTY
    }
}

fn orient(o: Point, a: Point, b: Point) -> f64 {
    (a - o).cross(b - o)
}

/// Nearest point to `p` on the segment `a`–`b`, with its parameter in `[0, 1]`.
pub fn nearest_on_segment(p: Point, a: Point, b: Point) -> (f64, Point) {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq <= EPSILON * EPSILON {
        return (0.0, a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (t, a + ab * t)
}

impl Tile {
    /// The tile without points.
    pub const EMPTY: Self = Self {
        vertices: Vec::new(),
    };

    /// Convex hull of `points`.
    ///
    /// Non-finite coordinates make the whole input malformed and produce
    /// [`Tile::EMPTY`].
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        let mut pts: Vec<Point> = points.into_iter().collect();
        if pts.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Self::EMPTY;
        }
        pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        pts.dedup_by(|a, b| a.distance(*b) <= EPSILON);
        if pts.len() <= 2 {
            return Self { vertices: pts };
        }
        let mut lower: Vec<Point> = Vec::with_capacity(pts.len());
        for &p in &pts {
            while lower.len() >= 2
                && orient(lower[lower.len() - 2], lower[lower.len() - 1], p) <= EPSILON
            {
                lower.pop();
            }
            lower.push(p);
        }
        let mut upper: Vec<Point> = Vec::with_capacity(pts.len());
        for &p in pts.iter().rev() {
            while upper.len() >= 2
                && orient(upper[upper.len() - 2], upper[upper.len() - 1], p) <= EPSILON
            {
                upper.pop();
            }
            upper.push(p);
        }
        lower.pop();
        upper.pop();
        lower.extend(upper);
        Self { vertices: lower }
    }

    /// A single point.
    pub fn point(p: Point) -> Self {
        Self::from_points([p])
    }

    /// The segment from `a` to `b`.
    pub fn segment(a: Point, b: Point) -> Self {
        Self::from_points([a, b])
    }

    /// An axis-aligned rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        let r = rect.abs();
        Self::from_points([
            Point::new(r.x0, r.y0),
            Point::new(r.x1, r.y0),
            Point::new(r.x1, r.y1),
            Point::new(r.x0, r.y1),
        ])
    }

    /// The region of an octagon.
    pub fn from_octagon(octagon: &Octagon) -> Self {
        if octagon.is_empty() {
            Self::EMPTY
        } else {
            Self::from_points(octagon.vertices())
        }
    }

    /// Regular octagon with the given inradius around `center`.
    pub fn octagon_around(center: Point, inradius: f64) -> Self {
        Self::point(center).offset(inradius)
    }

    /// Vertices in counter-clockwise order.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// True if the tile has no points.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Point, line or area.
    pub fn dimension(&self) -> Dimension {
        match self.vertices.len() {
            0 => Dimension::Empty,
            1 => Dimension::Point,
            2 => Dimension::Line,
            _ => Dimension::Area,
        }
    }

    /// Border edges. A segment has one edge, a point one zero-length edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        let count = if n <= 2 { n.min(1) } else { n };
        (0..count).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Enclosed area; zero for degenerate tiles.
    pub fn area(&self) -> f64 {
        if self.dimension() != Dimension::Area {
            return 0.0;
        }
        0.5 * self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>()
    }

    /// Center of gravity; `None` for the empty tile.
    pub fn centroid(&self) -> Option<Point> {
        match self.dimension() {
            Dimension::Empty => None,
            Dimension::Point => Some(self.vertices[0]),
            Dimension::Line => Some(self.vertices[0].midpoint(self.vertices[1])),
            Dimension::Area => {
                let area = self.area();
                if area <= EPSILON {
                    let n = self.vertices.len() as f64;
                    let sum = self.vertices.iter().fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
                    return Some((sum / n).to_point());
                }
                let mut c = Vec2::ZERO;
                for (a, b) in self.edges() {
                    let w = a.x * b.y - b.x * a.y;
                    c += (a.to_vec2() + b.to_vec2()) * w;
                }
                Some((c / (6.0 * area)).to_point())
            }
        }
    }

    /// Smallest octagon containing the tile.
    pub fn bounding_octagon(&self) -> Octagon {
        Octagon::from_points(self.vertices.iter().copied())
    }

    /// Axis-aligned bounding box; [`Rect::ZERO`] when empty.
    pub fn bounding_rect(&self) -> Rect {
        self.bounding_octagon().to_rect()
    }

    /// True if every edge is horizontal, vertical or diagonal, so the tile
    /// equals its bounding octagon.
    pub fn is_octagon(&self) -> bool {
        self.edges().all(|(a, b)| {
            let dx = (b.x - a.x).abs();
            let dy = (b.y - a.y).abs();
            let tol = 1e-9 * (dx + dy).max(1.0);
            dx <= tol || dy <= tol || (dx - dy).abs() <= tol
        })
    }

    /// Half-planes whose intersection is exactly this tile.
    pub fn border_half_planes(&self) -> Vec<HalfPlane> {
        match self.dimension() {
            Dimension::Empty => Vec::new(),
            Dimension::Point => {
                let p = self.vertices[0];
                [
                    Vec2::new(1.0, 0.0),
                    Vec2::new(0.0, 1.0),
                    Vec2::new(-1.0, 0.0),
                    Vec2::new(0.0, -1.0),
                ]
                .into_iter()
                .filter_map(|d| HalfPlane::new(p, d))
                .collect()
            }
            Dimension::Line => {
                let (a, b) = (self.vertices[0], self.vertices[1]);
                let d = b - a;
                [
                    HalfPlane::new(a, d),
                    HalfPlane::new(b, -d),
                    HalfPlane::new(a, Vec2::new(d.y, -d.x)),
                    HalfPlane::new(b, Vec2::new(-d.y, d.x)),
                ]
                .into_iter()
                .flatten()
                .collect()
            }
            Dimension::Area => self
                .edges()
                .filter_map(|(a, b)| HalfPlane::through(a, b))
                .collect(),
        }
    }

    /// True if `p` lies in the closed tile (within [`EPSILON`]).
    pub fn contains_point(&self, p: Point) -> bool {
        match self.dimension() {
            Dimension::Empty => false,
            Dimension::Point => self.vertices[0].distance(p) <= EPSILON,
            Dimension::Line => {
                let (_, q) = nearest_on_segment(p, self.vertices[0], self.vertices[1]);
                q.distance(p) <= EPSILON
            }
            Dimension::Area => self
                .edges()
                .all(|(a, b)| HalfPlane::through(a, b).is_none_or(|h| h.contains(p))),
        }
    }

    /// True if every point of `other` lies in this tile.
    pub fn contains(&self, other: &Self) -> bool {
        !other.is_empty() && other.vertices.iter().all(|&p| self.contains_point(p))
    }

    fn separating_axes(&self) -> Vec<Vec2> {
        match self.dimension() {
            Dimension::Empty | Dimension::Point => Vec::new(),
            Dimension::Line => {
                let d = self.vertices[1] - self.vertices[0];
                let u = d / d.hypot();
                vec![u, Vec2::new(-u.y, u.x)]
            }
            Dimension::Area => self
                .edges()
                .filter_map(|(a, b)| HalfPlane::through(a, b).map(|h| h.inward_normal()))
                .collect(),
        }
    }

    fn projection(&self, axis: Vec2) -> (f64, f64) {
        self.vertices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            let t = axis.dot(p.to_vec2());
            (lo.min(t), hi.max(t))
        })
    }

    fn separated_along_own_axes(&self, other: &Self) -> bool {
        self.separating_axes().into_iter().any(|axis| {
            let (a0, a1) = self.projection(axis);
            let (b0, b1) = other.projection(axis);
            a1 < b0 - EPSILON || b1 < a0 - EPSILON
        })
    }

    /// True if the closed tiles share a point (touching counts).
    pub fn intersects(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        if self.dimension() == Dimension::Point && other.dimension() == Dimension::Point {
            return self.vertices[0].distance(other.vertices[0]) <= EPSILON;
        }
        !self.separated_along_own_axes(other) && !other.separated_along_own_axes(self)
    }

    /// Part of the tile inside `half_plane`.
    #[must_use]
    pub fn intersection_with_half_plane(&self, half_plane: &HalfPlane) -> Self {
        let n = self.vertices.len();
        match n {
            0 => Self::EMPTY,
            1 => {
                if half_plane.contains(self.vertices[0]) {
                    self.clone()
                } else {
                    Self::EMPTY
                }
            }
            _ => {
                let mut out = Vec::with_capacity(n + 2);
                for i in 0..n {
                    let a = self.vertices[i];
                    let b = self.vertices[(i + 1) % n];
                    let da = half_plane.signed_distance(a);
                    let db = half_plane.signed_distance(b);
                    if da >= -EPSILON {
                        out.push(a);
                    }
                    if (da < -EPSILON && db > EPSILON) || (da > EPSILON && db < -EPSILON) {
                        out.push(half_plane.crossing(a, b));
                    }
                }
                Self::from_points(out)
            }
        }
    }

    /// Common part of two tiles.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::EMPTY;
        }
        let clip_self = other.dimension() == Dimension::Area || self.dimension() != Dimension::Area;
        let (clipped, by) = if clip_self {
            (self, other)
        } else {
            (other, self)
        };
        let mut result = clipped.clone();
        for h in by.border_half_planes() {
            result = result.intersection_with_half_plane(&h);
            if result.is_empty() {
                break;
            }
        }
        result
    }

    /// Minkowski sum with a regular octagon of inradius `distance`.
    ///
    /// Horizontal, vertical and diagonal borders move out by exactly
    /// `distance`, so octagon tiles stay octagons. Non-positive distances
    /// return the tile unchanged.
    #[must_use]
    pub fn offset(&self, distance: f64) -> Self {
        if distance.is_nan() || distance <= 0.0 || self.is_empty() {
            return self.clone();
        }
        if self.is_octagon() {
            return Self::from_octagon(&self.bounding_octagon().enlarge(distance));
        }
        let circumradius = distance / (PI / 8.0).cos();
        let corners: Vec<Vec2> = (0..8)
            .map(|k| {
                let angle = PI / 8.0 + f64::from(k) * PI / 4.0;
                Vec2::new(angle.cos(), angle.sin()) * circumradius
            })
            .collect();
        Self::from_points(
            self.vertices
                .iter()
                .flat_map(|&v| corners.iter().map(move |&c| v + c)),
        )
    }

    /// Distance between the closed tiles; zero when they intersect.
    pub fn distance(&self, other: &Self) -> f64 {
        if self.is_empty() || other.is_empty() {
            return f64::INFINITY;
        }
        if self.intersects(other) {
            return 0.0;
        }
        let a = self
            .vertices
            .iter()
            .map(|&p| other.border_distance(p))
            .fold(f64::INFINITY, f64::min);
        let b = other
            .vertices
            .iter()
            .map(|&p| self.border_distance(p))
            .fold(f64::INFINITY, f64::min);
        a.min(b)
    }

    fn border_distance(&self, p: Point) -> f64 {
        self.edges()
            .map(|(a, b)| nearest_on_segment(p, a, b).1.distance(p))
            .fold(f64::INFINITY, f64::min)
    }

    /// Distance from `p` to the closed tile.
    pub fn distance_to_point(&self, p: Point) -> f64 {
        if self.contains_point(p) {
            0.0
        } else {
            self.border_distance(p)
        }
    }

    /// Point of the tile nearest to `p`; `None` for the empty tile.
    pub fn nearest_point(&self, p: Point) -> Option<Point> {
        if self.is_empty() {
            return None;
        }
        if self.contains_point(p) {
            return Some(p);
        }
        self.edges()
            .map(|(a, b)| nearest_on_segment(p, a, b).1)
            .min_by(|x, y| x.distance(p).total_cmp(&y.distance(p)))
    }

    /// Nearest point on each border edge, closest first, at most `count`.
    ///
    /// Points come from distinct edges, so the second entry tells how far the
    /// next border line is.
    pub fn nearest_border_points(&self, p: Point, count: usize) -> Vec<Point> {
        let mut points: Vec<Point> = self
            .edges()
            .map(|(a, b)| nearest_on_segment(p, a, b).1)
            .collect();
        points.sort_by(|x, y| x.distance(p).total_cmp(&y.distance(p)));
        points.truncate(count);
        points
    }

    /// Smallest distance between two parallel lines enclosing the tile.
    pub fn min_width(&self) -> f64 {
        if self.dimension() != Dimension::Area {
            return 0.0;
        }
        self.edges()
            .filter_map(|(a, b)| HalfPlane::through(a, b))
            .map(|h| {
                self.vertices
                    .iter()
                    .map(|&v| h.signed_distance(v))
                    .fold(0.0, f64::max)
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// The longest segment between two vertices.
    pub fn longest_span(&self) -> Option<Line> {
        let mut best: Option<(f64, Line)> = None;
        for (i, &a) in self.vertices.iter().enumerate() {
            for &b in &self.vertices[i..] {
                let d = a.distance(b);
                if best.as_ref().is_none_or(|(bd, _)| d > *bd) {
                    best = Some((d, Line::new(a, b)));
                }
            }
        }
        best.map(|(_, line)| line)
    }

    /// Length of [`Tile::longest_span`]; zero for points and the empty tile.
    pub fn diameter(&self) -> f64 {
        self.longest_span().map_or(0.0, |l| l.p0.distance(l.p1))
    }
}
