// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Directed border lines.

use kurbo::{Point, Vec2};

use crate::EPSILON;

/// A closed half-plane: the points on or to the left of a directed line.
///
/// The border of a counter-clockwise [`Tile`](crate::Tile) is a sequence of
/// half-planes whose intersection is the tile.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HalfPlane {
    /// A point on the border line.
    pub origin: Point,
    /// Unit direction of the border line; the inside is on its left.
    pub dir: Vec2,
}

impl HalfPlane {
    /// Half-plane left of the line through `origin` with direction `dir`.
    ///
    /// Returns `None` when `dir` has no usable length.
    pub fn new(origin: Point, dir: Vec2) -> Option<Self> {
        let len = dir.hypot();
        if !len.is_finite() || len <= EPSILON {
            return None;
        }
        Some(Self {
            origin,
            dir: dir / len,
        })
    }

    /// Half-plane left of the directed line from `a` to `b`.
    pub fn through(a: Point, b: Point) -> Option<Self> {
        Self::new(a, b - a)
    }

    /// Distance of `p` from the border; positive inside, negative outside.
    pub fn signed_distance(&self, p: Point) -> f64 {
        self.dir.cross(p - self.origin)
    }

    /// True if `p` is inside or on the border (within [`EPSILON`]).
    pub fn contains(&self, p: Point) -> bool {
        self.signed_distance(p) >= -EPSILON
    }

    /// The complementary closed half-plane sharing the same border.
    #[must_use]
    pub fn opposite(&self) -> Self {
        Self {
            origin: self.origin,
            dir: -self.dir,
        }
    }

    /// Unit normal pointing into the half-plane.
    pub fn inward_normal(&self) -> Vec2 {
        Vec2::new(-self.dir.y, self.dir.x)
    }

    /// Orthogonal projection of `p` onto the border line.
    pub fn project(&self, p: Point) -> Point {
        self.origin + self.dir * self.dir.dot(p - self.origin)
    }

    /// Point where segment `a`–`b` crosses the border.
    ///
    /// Callers guarantee that `a` and `b` lie on different sides.
    pub(crate) fn crossing(&self, a: Point, b: Point) -> Point {
        let da = self.signed_distance(a);
        let db = self.signed_distance(b);
        let t = da / (da - db);
        a.lerp(b, t)
    }
}
