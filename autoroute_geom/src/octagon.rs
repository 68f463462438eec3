// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Octagon bounding approximation.
//!
//! An [`Octagon`] is the region cut out by eight half-planes whose borders are
//! horizontal, vertical or diagonal. It is the bounding shape of the search
//! tree: unions and intersections are component-wise, and growing it by a
//! clearance keeps it an octagon.

use core::f64::consts::SQRT_2;

use kurbo::{Point, Rect};

use crate::EPSILON;

/// Closed octagonal region
/// `lx ≤ x ≤ rx`, `ly ≤ y ≤ uy`, `ulx ≤ x−y ≤ lrx`, `llx ≤ x+y ≤ urx`.
///
/// Values produced by the constructors and set operations are normalized:
/// every bound touches the region.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Octagon {
    /// Minimum `x`.
    pub lx: f64,
    /// Minimum `y`.
    pub ly: f64,
    /// Maximum `x`.
    pub rx: f64,
    /// Maximum `y`.
    pub uy: f64,
    /// Minimum of `x - y` (upper-left diagonal).
    pub ulx: f64,
    /// Maximum of `x - y` (lower-right diagonal).
    pub lrx: f64,
    /// Minimum of `x + y` (lower-left diagonal).
    pub llx: f64,
    /// Maximum of `x + y` (upper-right diagonal).
    pub urx: f64,
}

impl Octagon {
    /// The empty octagon. Identity for [`Octagon::union`].
    pub const EMPTY: Self = Self {
        lx: f64::INFINITY,
        ly: f64::INFINITY,
        rx: f64::NEG_INFINITY,
        uy: f64::NEG_INFINITY,
        ulx: f64::INFINITY,
        lrx: f64::NEG_INFINITY,
        llx: f64::INFINITY,
        urx: f64::NEG_INFINITY,
    };

    /// Build an octagon from raw bounds and normalize it.
    pub fn new(lx: f64, ly: f64, rx: f64, uy: f64, ulx: f64, lrx: f64, llx: f64, urx: f64) -> Self {
        Self {
            lx,
            ly,
            rx,
            uy,
            ulx,
            lrx,
            llx,
            urx,
        }
        .normalize()
    }

    /// Degenerate octagon covering a single point.
    pub fn from_point(p: Point) -> Self {
        Self {
            lx: p.x,
            ly: p.y,
            rx: p.x,
            uy: p.y,
            ulx: p.x - p.y,
            lrx: p.x - p.y,
            llx: p.x + p.y,
            urx: p.x + p.y,
        }
    }

    /// Smallest octagon containing `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        let r = rect.abs();
        Self {
            lx: r.x0,
            ly: r.y0,
            rx: r.x1,
            uy: r.y1,
            ulx: r.x0 - r.y1,
            lrx: r.x1 - r.y0,
            llx: r.x0 + r.y0,
            urx: r.x1 + r.y1,
        }
    }

    /// Smallest octagon containing all `points`; empty if there are none.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        let mut acc = Self::EMPTY;
        for p in points {
            acc.include_point(p);
        }
        acc
    }

    fn include_point(&mut self, p: Point) {
        self.lx = self.lx.min(p.x);
        self.ly = self.ly.min(p.y);
        self.rx = self.rx.max(p.x);
        self.uy = self.uy.max(p.y);
        self.ulx = self.ulx.min(p.x - p.y);
        self.lrx = self.lrx.max(p.x - p.y);
        self.llx = self.llx.min(p.x + p.y);
        self.urx = self.urx.max(p.x + p.y);
    }

    /// True if no point satisfies all eight bounds.
    ///
    /// Only reliable on normalized octagons; all public constructors except
    /// a bare struct literal normalize.
    pub fn is_empty(&self) -> bool {
        self.lx > self.rx + EPSILON
            || self.ly > self.uy + EPSILON
            || self.ulx > self.lrx + EPSILON
            || self.llx > self.urx + EPSILON
    }

    /// Tighten every bound so that it touches the region.
    #[must_use]
    pub fn normalize(self) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }
        let mut o = self;
        // Two rounds reach the fixpoint for the two-variable octagon domain.
        for _ in 0..2 {
            o.lx = o.lx.max(o.ulx + o.ly).max(o.llx - o.uy).max(0.5 * (o.llx + o.ulx));
            o.rx = o.rx.min(o.lrx + o.uy).min(o.urx - o.ly).min(0.5 * (o.urx + o.lrx));
            o.ly = o.ly.max(o.lx - o.lrx).max(o.llx - o.rx).max(0.5 * (o.llx - o.lrx));
            o.uy = o.uy.min(o.rx - o.ulx).min(o.urx - o.lx).min(0.5 * (o.urx - o.ulx));
            o.ulx = o.ulx.max(o.lx - o.uy);
            o.lrx = o.lrx.min(o.rx - o.ly);
            o.llx = o.llx.max(o.lx + o.ly);
            o.urx = o.urx.min(o.rx + o.uy);
        }
        if o.is_empty() { Self::EMPTY } else { o }
    }

    /// Smallest octagon containing both operands.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            lx: self.lx.min(other.lx),
            ly: self.ly.min(other.ly),
            rx: self.rx.max(other.rx),
            uy: self.uy.max(other.uy),
            ulx: self.ulx.min(other.ulx),
            lrx: self.lrx.max(other.lrx),
            llx: self.llx.min(other.llx),
            urx: self.urx.max(other.urx),
        }
    }

    /// Common region of both operands.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            lx: self.lx.max(other.lx),
            ly: self.ly.max(other.ly),
            rx: self.rx.min(other.rx),
            uy: self.uy.min(other.uy),
            ulx: self.ulx.max(other.ulx),
            lrx: self.lrx.min(other.lrx),
            llx: self.llx.max(other.llx),
            urx: self.urx.min(other.urx),
        }
        .normalize()
    }

    /// True if the closed regions share at least one point.
    pub fn intersects(&self, other: &Self) -> bool {
        !self.intersection(other).is_empty()
    }

    /// True if `other` lies inside `self` (within [`EPSILON`]).
    pub fn contains(&self, other: &Self) -> bool {
        if other.is_empty() {
            return true;
        }
        if self.is_empty() {
            return false;
        }
        self.lx <= other.lx + EPSILON
            && self.ly <= other.ly + EPSILON
            && self.rx >= other.rx - EPSILON
            && self.uy >= other.uy - EPSILON
            && self.ulx <= other.ulx + EPSILON
            && self.lrx >= other.lrx - EPSILON
            && self.llx <= other.llx + EPSILON
            && self.urx >= other.urx - EPSILON
    }

    /// True if `p` lies inside the closed region.
    pub fn contains_point(&self, p: Point) -> bool {
        let d = p.x - p.y;
        let s = p.x + p.y;
        p.x >= self.lx - EPSILON
            && p.x <= self.rx + EPSILON
            && p.y >= self.ly - EPSILON
            && p.y <= self.uy + EPSILON
            && d >= self.ulx - EPSILON
            && d <= self.lrx + EPSILON
            && s >= self.llx - EPSILON
            && s <= self.urx + EPSILON
    }

    /// Move every border outward by `distance`.
    ///
    /// This is the Minkowski sum with a regular octagon of inradius `distance`,
    /// so diagonal bounds move by `distance · √2` in their `x ± y` coordinate.
    #[must_use]
    pub fn enlarge(&self, distance: f64) -> Self {
        if self.is_empty() || distance == 0.0 {
            return *self;
        }
        let diag = distance * SQRT_2;
        let grown = Self {
            lx: self.lx - distance,
            ly: self.ly - distance,
            rx: self.rx + distance,
            uy: self.uy + distance,
            ulx: self.ulx - diag,
            lrx: self.lrx + diag,
            llx: self.llx - diag,
            urx: self.urx + diag,
        };
        if distance < 0.0 { grown.normalize() } else { grown }
    }

    /// Corners in counter-clockwise order, starting at the left end of the
    /// bottom edge. Adjacent corners coincide where an edge has zero length.
    pub fn vertices(&self) -> [Point; 8] {
        [
            Point::new(self.llx - self.ly, self.ly),
            Point::new(self.lrx + self.ly, self.ly),
            Point::new(self.rx, self.rx - self.lrx),
            Point::new(self.rx, self.urx - self.rx),
            Point::new(self.urx - self.uy, self.uy),
            Point::new(self.ulx + self.uy, self.uy),
            Point::new(self.lx, self.lx - self.ulx),
            Point::new(self.lx, self.llx - self.lx),
        ]
    }

    /// Enclosed area.
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let v = self.vertices();
        let mut twice = 0.0;
        for i in 0..v.len() {
            let a = v[i];
            let b = v[(i + 1) % v.len()];
            twice += a.x * b.y - b.x * a.y;
        }
        (0.5 * twice).max(0.0)
    }

    /// Axis-aligned box of the region; [`Rect::ZERO`] when empty.
    pub fn to_rect(&self) -> Rect {
        if self.is_empty() {
            Rect::ZERO
        } else {
            Rect::new(self.lx, self.ly, self.rx, self.uy)
        }
    }

    /// Width of the axis-aligned box.
    pub fn width(&self) -> f64 {
        (self.rx - self.lx).max(0.0)
    }

    /// Height of the axis-aligned box.
    pub fn height(&self) -> f64 {
        (self.uy - self.ly).max(0.0)
    }
}
