// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shoving a trace aside instead of ripping it.
//!
//! The new trace enters the obstacle room of a trace segment through a door
//! running along the segment, then follows the segment toward one of its
//! corners while the old trace is pushed away. Every other door of the room
//! on the entry side within the distance the board allows becomes reachable.

use autoroute_geom::{Dimension, EPSILON, HalfPlane};
use kurbo::{Point, Vec2};

use crate::board::{BoardGeometry, FixedState, RouteItem, ShoveRequest};
use crate::control::RouteControl;
use crate::frontier::Adjustment;
use crate::graph::{DoorId, RoomId, RoomKind, RouteGraph};

/// A door reached along a shoved trace.
#[derive(Clone, Debug, PartialEq)]
pub struct ShovedDoor {
    /// The reached door.
    pub door: DoorId,
    /// Shove side to record on the move; none for overlap doors.
    pub adjustment: Adjustment,
    /// Where the new trace leaves the shoved trace toward the door.
    pub along: Point,
}

/// Opposite shove side.
pub fn opposite(adjustment: Adjustment) -> Adjustment {
    match adjustment {
        Adjustment::Left => Adjustment::Right,
        Adjustment::Right => Adjustment::Left,
        Adjustment::None => Adjustment::None,
    }
}

/// Doors reached by entering `room` through `entry` and shoving its trace
/// to the `side` of the entry direction.
///
/// Returns `None` when the room is not a shovable trace segment, the entry
/// door does not run along it, or the board cannot move the trace at all.
pub fn shove_targets<B: BoardGeometry + ?Sized>(
    graph: &RouteGraph,
    board: &B,
    ctrl: &RouteControl,
    room: RoomId,
    entry: DoorId,
    side: Adjustment,
) -> Option<Vec<ShovedDoor>> {
    if side == Adjustment::None || ctrl.max_shove_trace_recursion_depth == 0 {
        return None;
    }
    let r = graph.room(room);
    let RoomKind::Obstacle { item, shape_index } = r.kind else {
        return None;
    };
    let Some(RouteItem::Trace(trace)) = board.item(item) else {
        return None;
    };
    if trace.fixed != FixedState::Unfixed {
        return None;
    }
    let a = *trace.corners.get(shape_index)?;
    let b = *trace.corners.get(shape_index + 1)?;
    let axis = HalfPlane::through(a, b)?;

    let door = graph.door(entry);
    if door.dimension() != Dimension::Line {
        return None;
    }
    let span = door.shape.longest_span()?;
    let door_dir = span.p1 - span.p0;
    if axis.dir.cross(door_dir).abs() > EPSILON * door_dir.hypot().max(1.0) {
        log::trace!("door {entry:?} does not run along trace {item:?}");
        return None;
    }
    let center = span.p0.midpoint(span.p1);
    let door_side = axis.signed_distance(center);
    // Entry direction points from the door toward the trace.
    let entering: Vec2 = if door_side >= 0.0 {
        -axis.inward_normal()
    } else {
        axis.inward_normal()
    };
    // Run toward the corner that lies on `side` of the entry direction.
    let toward_b = (entering.cross(axis.dir) > 0.0) == (side == Adjustment::Left);
    let (run, corner) = if toward_b { (axis.dir, b) } else { (-axis.dir, a) };
    let start = axis.project(center);

    let request = ShoveRequest {
        item,
        layer: r.layer,
        from: start,
        to: corner,
        half_width: ctrl.half_width(r.layer),
        nets: vec![ctrl.net],
        clearance_class: ctrl.trace_clearance_class,
        recursion_depth: ctrl.max_shove_trace_recursion_depth,
    };
    let reach = board.shove_trace_distance(&request);
    if reach <= 0.0 {
        log::trace!("trace {item:?} cannot be shoved {side:?}");
        return None;
    }

    let mut out = Vec::new();
    for &d in &r.doors {
        if d == entry {
            continue;
        }
        let other = graph.door(d);
        let Some(other_span) = other.shape.longest_span() else {
            continue;
        };
        let q = other_span.p0.midpoint(other_span.p1);
        let q_side = axis.signed_distance(q);
        if q_side * door_side < -EPSILON {
            continue;
        }
        let t = run.dot(q - start);
        if t <= 0.0 || t > reach {
            continue;
        }
        let adjustment = if other.dimension() == Dimension::Area {
            Adjustment::None
        } else {
            side
        };
        out.push(ShovedDoor {
            door: d,
            adjustment,
            along: start + run * t,
        });
    }
    Some(out)
}
