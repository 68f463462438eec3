// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Autoroute Geom: convex tiles and octagon bounds for board routing.
//!
//! Board items are approximated by convex [`Tile`]s: polygons that may
//! degenerate to a segment or a point. Each tile has an [`Octagon`] bound
//! with horizontal, vertical and diagonal borders, which is cheap to unite,
//! intersect and grow by a clearance.
//!
//! - Tiles support containment, intersection, half-plane clipping, offsetting
//!   by a clearance, distances and nearest-point queries.
//! - Offsetting uses a regular octagon as the pen, so a trace along a
//!   horizontal, vertical or diagonal line stays octagon-compatible.
//! - All comparisons treat the shapes as closed sets within [`EPSILON`].
//!
//! # Example
//!
//! ```rust
//! use autoroute_geom::{Dimension, Tile};
//! use kurbo::Point;
//!
//! // A trace segment of half width 2.
//! let trace = Tile::segment(Point::new(0.0, 0.0), Point::new(10.0, 0.0)).offset(2.0);
//! assert_eq!(trace.dimension(), Dimension::Area);
//! assert!(trace.is_octagon());
//!
//! // A pad just touching the trace border.
//! let pad = Tile::octagon_around(Point::new(5.0, 5.0), 3.0);
//! assert!(pad.intersects(&trace));
//! assert!(pad.distance(&trace) == 0.0);
//! ```

pub mod half_plane;
pub mod octagon;
pub mod tile;

pub use half_plane::HalfPlane;
pub use octagon::Octagon;
pub use tile::{Dimension, Tile, nearest_on_segment};

/// Tolerance for closed-set comparisons in board units.
pub const EPSILON: f64 = 1e-7;
