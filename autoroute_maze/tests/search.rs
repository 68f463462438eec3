// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end searches over small hand-built room graphs.

use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;

use autoroute_geom::Tile;
use autoroute_index::{ClearanceMatrix, ItemId};
use autoroute_maze::{
    Adjustment, DoorId, DrillId, Expandable, FixedState, IndexedBoard, NeverStop, PathSearch,
    PinItem, RoomKind, RouteControl, RouteGraph, RouteItem, SearchError, SearchFailure, TraceItem,
    ViaItem, ViaMask,
};
use kurbo::{Point, Rect};

const START: ItemId = ItemId(0);
const DEST: ItemId = ItemId(1);
const BLOCKER: ItemId = ItemId(2);

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Tile {
    Tile::from_rect(Rect::new(x0, y0, x1, y1))
}

fn pad(layer: usize, shape: Tile) -> RouteItem {
    RouteItem::Pin(PinItem {
        nets: vec![1],
        clearance_class: 1,
        first_layer: layer,
        last_layer: layer,
        shape,
    })
}

fn ids(items: &[ItemId]) -> BTreeSet<ItemId> {
    items.iter().copied().collect()
}

fn horizontal(x0: f64, x1: f64, y: f64) -> Tile {
    Tile::segment(Point::new(x0, y), Point::new(x1, y))
}

fn vertical(x: f64, y0: f64, y1: f64) -> Tile {
    Tile::segment(Point::new(x, y0), Point::new(x, y1))
}

/// A foreign trace along y = 50 splits the board into a lower room holding
/// the start pad and an upper room holding the destination pad.
fn walled_board() -> (IndexedBoard, RouteGraph) {
    let mut board = IndexedBoard::new(1, ClearanceMatrix::new(2, 1));
    board.insert(START, pad(0, rect(48.0, 10.0, 52.0, 14.0))).unwrap();
    board.insert(DEST, pad(0, rect(48.0, 86.0, 52.0, 90.0))).unwrap();
    let wall = TraceItem {
        nets: vec![2],
        clearance_class: 1,
        layer: 0,
        half_width: 2.0,
        corners: vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)],
        fixed: FixedState::Unfixed,
        start_contacts: Vec::new(),
        end_contacts: Vec::new(),
        detour: 1.0,
    };
    board.insert(BLOCKER, RouteItem::Trace(wall)).unwrap();

    let mut g = RouteGraph::new(1.0, 2.0);
    let below = g.add_room(0, rect(0.0, 0.0, 100.0, 48.0), RoomKind::FreeSpace);
    let wall_room = g.add_room(
        0,
        rect(0.0, 48.0, 100.0, 52.0),
        RoomKind::Obstacle {
            item: BLOCKER,
            shape_index: 0,
        },
    );
    let above = g.add_room(0, rect(0.0, 52.0, 100.0, 100.0), RoomKind::FreeSpace);
    g.add_door(below, wall_room, Tile::segment(Point::new(0.0, 48.0), Point::new(100.0, 48.0)));
    g.add_door(wall_room, above, Tile::segment(Point::new(0.0, 52.0), Point::new(100.0, 52.0)));
    g.add_target_door(below, START, 0, rect(48.0, 10.0, 52.0, 14.0));
    g.add_target_door(above, DEST, 0, rect(48.0, 86.0, 52.0, 90.0));
    (board, g)
}

/// A session from the start pad to the destination pad on the raw tree.
fn session<'a>(
    g: &'a RouteGraph,
    board: &'a IndexedBoard,
    ctrl: &'a RouteControl,
) -> PathSearch<'a, IndexedBoard> {
    let tree = board.index().default_tree();
    PathSearch::new(g, board, tree, ctrl, &ids(&[START]), &ids(&[DEST])).unwrap()
}

fn ripping() -> RouteControl {
    RouteControl {
        ripup_allowed: true,
        ripup_costs: 100.0,
        ..RouteControl::new(1)
    }
}

#[test]
fn straight_connection_in_one_room() {
    let mut board = IndexedBoard::new(1, ClearanceMatrix::new(2, 1));
    board.insert(START, pad(0, rect(0.0, 0.0, 4.0, 4.0))).unwrap();
    board.insert(DEST, pad(0, rect(90.0, 0.0, 94.0, 4.0))).unwrap();
    let mut g = RouteGraph::new(1.0, 0.0);
    let room = g.add_room(0, rect(0.0, 0.0, 100.0, 10.0), RoomKind::FreeSpace);
    let start_door = g.add_target_door(room, START, 0, rect(0.0, 0.0, 4.0, 4.0));
    let dest_door = g.add_target_door(room, DEST, 0, rect(90.0, 0.0, 94.0, 4.0));

    let ctrl = RouteControl::new(1);
    let mut search = session(&g, &board, &ctrl);
    let route = search.find_connection(&NeverStop).unwrap();

    assert_eq!(route.destination, (Expandable::Target(dest_door), 0));
    let path: Vec<_> = route.steps.iter().map(|s| s.target).collect();
    assert_eq!(
        path,
        vec![Expandable::Target(dest_door), Expandable::Target(start_door)],
        "destination first, start last"
    );
    assert!(
        (route.cost - 88.0).abs() < 1e-9,
        "from the pad center to the nearest pad point: {}",
        route.cost
    );
    assert_eq!(route.ripup_cost, 0.0);
    assert_eq!(search.stats().pops, 1, "the destination is the only queued move");
}

#[test]
fn wall_without_ripup_is_impassable() {
    let (board, g) = walled_board();
    let ctrl = RouteControl::new(1);
    let mut search = session(&g, &board, &ctrl);
    assert_eq!(search.find_connection(&NeverStop), Err(SearchFailure::Exhausted));
    assert_eq!(search.stats().stale, 0);
}

#[test]
fn ripping_the_wall_is_paid_for() {
    let (board, g) = walled_board();
    let ctrl = ripping();
    let mut search = session(&g, &board, &ctrl);
    let route = search.find_connection(&NeverStop).unwrap();
    // Half width 2 times the base cost.
    assert!((route.ripup_cost - 200.0).abs() < 1e-9, "got {}", route.ripup_cost);
    assert!(route.cost > route.ripup_cost);
    assert!(route.steps.iter().any(|s| s.room_ripped), "the wall room is marked ripped");
}

#[test]
fn jittered_sessions_repeat() {
    let (board, g) = walled_board();
    let ctrl = RouteControl {
        ripup_pass_no: 9,
        ..ripping()
    };
    let run = || session(&g, &board, &ctrl).find_connection(&NeverStop).unwrap();
    let first = run();
    assert_eq!(first, run(), "same parameters, same route");
    assert!(first.ripup_cost >= 100.0 && first.ripup_cost < 300.0, "jitter stays within bounds");
}

/// A wall trace along y = 50 with an entry door from the start room and,
/// further right on the same side, an exit door into a separate room holding
/// the destination. Returns the entry and exit doors.
fn shove_board(section_tolerance: f64) -> (IndexedBoard, RouteGraph, DoorId, DoorId) {
    let mut board = IndexedBoard::new(1, ClearanceMatrix::new(2, 1));
    board.insert(START, pad(0, rect(2.0, 2.0, 6.0, 6.0))).unwrap();
    board.insert(DEST, pad(0, rect(60.0, 10.0, 64.0, 14.0))).unwrap();
    let wall = TraceItem {
        nets: vec![2],
        clearance_class: 1,
        layer: 0,
        half_width: 2.0,
        corners: vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)],
        fixed: FixedState::Unfixed,
        start_contacts: Vec::new(),
        end_contacts: Vec::new(),
        detour: 1.0,
    };
    board.insert(BLOCKER, RouteItem::Trace(wall)).unwrap();

    let mut g = RouteGraph::new(1.0, section_tolerance);
    let left = g.add_room(0, rect(0.0, 0.0, 25.0, 48.0), RoomKind::FreeSpace);
    let right = g.add_room(0, rect(28.0, 0.0, 100.0, 48.0), RoomKind::FreeSpace);
    let wall_room = g.add_room(
        0,
        rect(0.0, 48.0, 100.0, 52.0),
        RoomKind::Obstacle {
            item: BLOCKER,
            shape_index: 0,
        },
    );
    let entry = g.add_door(left, wall_room, horizontal(10.0, 20.0, 48.0));
    let exit = g.add_door(wall_room, right, horizontal(30.0, 40.0, 48.0));
    g.add_target_door(left, START, 0, rect(2.0, 2.0, 6.0, 6.0));
    g.add_target_door(right, DEST, 0, rect(60.0, 10.0, 64.0, 14.0));
    (board, g, entry, exit)
}

fn shoving() -> RouteControl {
    RouteControl {
        max_shove_trace_recursion_depth: 3,
        ..ripping()
    }
}

#[test]
fn shoving_avoids_the_ripup() {
    let (board, g, _, exit) = shove_board(0.0);
    let ctrl = shoving();
    let mut search = session(&g, &board, &ctrl);
    let route = search.find_connection(&NeverStop).unwrap();
    assert_eq!(route.ripup_cost, 0.0, "the wall was shoved, not ripped");
    let exit_step = route
        .steps
        .iter()
        .find(|s| s.target == Expandable::Door(exit))
        .expect("route leaves through the exit door");
    assert_eq!(exit_step.adjustment, Adjustment::Right, "shoved toward x = 100");
}

#[test]
fn one_sided_shove_leaves_the_entry_open() {
    // One section per door. Shoving right reaches the exit, shoving left
    // reaches nothing, so the entry section is not settled.
    let (board, g, entry, exit) = shove_board(1.0);
    assert_eq!(g.door(entry).section_count(), 1);
    assert_eq!(g.door(exit).section_count(), 1);
    let ctrl = shoving();
    let mut search = session(&g, &board, &ctrl);
    let route = search.find_connection(&NeverStop).unwrap();
    let path: Vec<_> = route.steps.iter().map(|s| s.target).collect();
    assert_eq!(path.len(), 4, "destination, exit, entry, start: {path:?}");
    assert_eq!(path[1], Expandable::Door(exit));
    assert_eq!(path[2], Expandable::Door(entry));
    assert_eq!(route.ripup_cost, 0.0);
    let stats = search.stats();
    assert_eq!(stats.pops, 3, "entry, exit, destination");
    assert_eq!(stats.expanded, 3, "start, exit and destination settle; the entry does not");
}

#[test]
fn wall_split_into_rooms_is_ripped_once() {
    let mut board = IndexedBoard::new(1, ClearanceMatrix::new(2, 1));
    board.insert(START, pad(0, rect(10.0, 10.0, 14.0, 14.0))).unwrap();
    board.insert(DEST, pad(0, rect(86.0, 86.0, 90.0, 90.0))).unwrap();
    let wall = TraceItem {
        nets: vec![2],
        clearance_class: 1,
        layer: 0,
        half_width: 2.0,
        corners: vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)],
        fixed: FixedState::Unfixed,
        start_contacts: Vec::new(),
        end_contacts: Vec::new(),
        detour: 1.0,
    };
    board.insert(BLOCKER, RouteItem::Trace(wall)).unwrap();

    // Below opens onto the left half of the wall, above onto the right half.
    let mut g = RouteGraph::new(1.0, 2.0);
    let below = g.add_room(0, rect(0.0, 0.0, 100.0, 48.0), RoomKind::FreeSpace);
    let obstacle = RoomKind::Obstacle {
        item: BLOCKER,
        shape_index: 0,
    };
    let wall_left = g.add_room(0, rect(0.0, 48.0, 50.0, 52.0), obstacle);
    let wall_right = g.add_room(0, rect(50.0, 48.0, 100.0, 52.0), obstacle);
    let above = g.add_room(0, rect(0.0, 52.0, 100.0, 100.0), RoomKind::FreeSpace);
    g.add_door(below, wall_left, Tile::segment(Point::new(0.0, 48.0), Point::new(50.0, 48.0)));
    g.add_door(wall_left, wall_right, vertical(50.0, 48.0, 52.0));
    g.add_door(wall_right, above, Tile::segment(Point::new(50.0, 52.0), Point::new(100.0, 52.0)));
    g.add_target_door(below, START, 0, rect(10.0, 10.0, 14.0, 14.0));
    g.add_target_door(above, DEST, 0, rect(86.0, 86.0, 90.0, 90.0));

    let ctrl = ripping();
    let mut search = session(&g, &board, &ctrl);
    let route = search.find_connection(&NeverStop).unwrap();
    // 200 for the first wall room, the already-ripped constant for the second.
    assert!((route.ripup_cost - 201.0).abs() < 1e-9, "got {}", route.ripup_cost);
    let ripped: Vec<_> = route
        .steps
        .iter()
        .filter(|s| s.room_ripped)
        .filter_map(|s| s.room)
        .collect();
    assert_eq!(ripped, vec![wall_right, wall_left]);
}

/// A foreign via at (50, 25) spanning layers 0 and 1 of a three-layer board.
/// Its drill slot spans all three layers. The start pad is on layer 0; the
/// destination pad is on `dest_layer` and only reachable through the drill.
fn via_board(dest_layer: usize) -> (IndexedBoard, RouteGraph, DrillId) {
    let mut board = IndexedBoard::new(3, ClearanceMatrix::new(2, 3));
    board.insert(START, pad(0, rect(2.0, 23.0, 6.0, 27.0))).unwrap();
    board.insert(DEST, pad(dest_layer, rect(90.0, 23.0, 94.0, 27.0))).unwrap();
    let via = ViaItem {
        nets: vec![2],
        clearance_class: 1,
        location: Point::new(50.0, 25.0),
        first_layer: 0,
        last_layer: 1,
        radius: 3.0,
        fixed: FixedState::Unfixed,
        contacts: Vec::new(),
    };
    board.insert(BLOCKER, RouteItem::Via(via)).unwrap();

    let mut g = RouteGraph::new(1.0, 0.0);
    let obstacle = RoomKind::Obstacle {
        item: BLOCKER,
        shape_index: 0,
    };
    let a = g.add_room(0, rect(0.0, 0.0, 47.0, 50.0), RoomKind::FreeSpace);
    let via_top = g.add_room(0, rect(47.0, 22.0, 53.0, 28.0), obstacle);
    let via_inner = g.add_room(1, rect(47.0, 22.0, 53.0, 28.0), obstacle);
    let b = g.add_room(1, rect(53.0, 0.0, 100.0, 50.0), RoomKind::FreeSpace);
    let c = g.add_room(2, rect(0.0, 0.0, 100.0, 50.0), RoomKind::FreeSpace);
    g.add_door(a, via_top, Tile::segment(Point::new(47.0, 22.0), Point::new(47.0, 28.0)));
    g.add_door(via_inner, b, Tile::segment(Point::new(53.0, 22.0), Point::new(53.0, 28.0)));
    g.add_target_door(a, START, 0, rect(2.0, 23.0, 6.0, 27.0));
    let dest_room = if dest_layer == 1 { b } else { c };
    g.add_target_door(dest_room, DEST, 0, rect(90.0, 23.0, 94.0, 27.0));
    let drill = g.add_drill(Point::new(50.0, 25.0), 0, 2, Some(BLOCKER));
    g.set_drill_room(drill, via_top);
    g.set_drill_room(drill, via_inner);
    g.set_drill_room(drill, c);
    (board, g, drill)
}

fn via_ripping() -> RouteControl {
    RouteControl {
        vias_allowed: true,
        ripup_allowed: true,
        ripup_costs: 100.0,
        via_masks: vec![ViaMask {
            first_layer: 0,
            last_layer: 2,
            attach_smd_allowed: false,
        }],
        ..RouteControl::new(3)
    }
}

#[test]
fn foreign_via_is_ripped_once() {
    let (board, g, drill) = via_board(1);
    let ctrl = via_ripping();
    let mut search = session(&g, &board, &ctrl);
    let route = search.find_connection(&NeverStop).unwrap();
    // Unit half width times 100 for the via, then the already-ripped constant
    // for stepping onto its drill inside the same room.
    assert!((route.ripup_cost - 101.0).abs() < 1e-9, "got {}", route.ripup_cost);
    let drill_steps: Vec<_> = route
        .steps
        .iter()
        .filter(|s| s.target == Expandable::Drill(drill))
        .map(|s| (s.section, s.room_ripped))
        .collect();
    assert_eq!(drill_steps, vec![(1, true), (0, true)], "down the ripped via once");
}

#[test]
fn foreign_via_keeps_its_own_layer_span() {
    // The drill slot reaches layer 2 but the via on it stops at layer 1.
    let (board, g, _) = via_board(2);
    let ctrl = via_ripping();
    let mut search = session(&g, &board, &ctrl);
    assert_eq!(search.find_connection(&NeverStop), Err(SearchFailure::Exhausted));
}

#[test]
fn fanout_stops_on_the_far_layer_of_a_drill() {
    let mut board = IndexedBoard::new(2, ClearanceMatrix::new(2, 2));
    board.insert(START, pad(0, rect(0.0, 0.0, 4.0, 4.0))).unwrap();
    let mut g = RouteGraph::new(1.0, 0.0);
    let top = g.add_room(0, rect(0.0, 0.0, 50.0, 50.0), RoomKind::FreeSpace);
    let bottom = g.add_room(1, rect(0.0, 0.0, 50.0, 50.0), RoomKind::FreeSpace);
    g.add_target_door(top, START, 0, rect(0.0, 0.0, 4.0, 4.0));
    let drill = g.add_drill(Point::new(25.0, 25.0), 0, 1, None);
    g.set_drill_room(drill, top);
    g.set_drill_room(drill, bottom);
    g.add_drill_page(rect(0.0, 0.0, 50.0, 50.0), vec![drill]);

    let ctrl = RouteControl {
        vias_allowed: true,
        is_fanout: true,
        via_masks: vec![ViaMask {
            first_layer: 0,
            last_layer: 1,
            attach_smd_allowed: false,
        }],
        ..RouteControl::new(2)
    };
    let tree = board.index().default_tree();
    let mut search =
        PathSearch::new(&g, &board, tree, &ctrl, &ids(&[START]), &BTreeSet::new()).unwrap();
    let route = search.find_connection(&NeverStop).unwrap();
    assert_eq!(route.destination, (Expandable::Drill(drill), 1), "settled on layer 1");
    assert_eq!(route.steps[1].target, Expandable::Drill(drill), "came up the drill");
    assert_eq!(route.steps[1].section, 0);
}

#[test]
fn vias_need_a_fitting_mask() {
    let mut board = IndexedBoard::new(2, ClearanceMatrix::new(2, 2));
    board.insert(START, pad(0, rect(0.0, 0.0, 4.0, 4.0))).unwrap();
    board.insert(DEST, pad(1, rect(40.0, 40.0, 44.0, 44.0))).unwrap();
    let mut g = RouteGraph::new(1.0, 0.0);
    let top = g.add_room(0, rect(0.0, 0.0, 50.0, 50.0), RoomKind::FreeSpace);
    let bottom = g.add_room(1, rect(0.0, 0.0, 50.0, 50.0), RoomKind::FreeSpace);
    g.add_target_door(top, START, 0, rect(0.0, 0.0, 4.0, 4.0));
    g.add_target_door(bottom, DEST, 0, rect(40.0, 40.0, 44.0, 44.0));
    let drill = g.add_drill(Point::new(25.0, 25.0), 0, 1, None);
    g.set_drill_room(drill, top);
    g.set_drill_room(drill, bottom);
    g.add_drill_page(rect(0.0, 0.0, 50.0, 50.0), vec![drill]);

    let no_masks = RouteControl {
        vias_allowed: true,
        ..RouteControl::new(2)
    };
    let mut search = session(&g, &board, &no_masks);
    assert_eq!(search.find_connection(&NeverStop), Err(SearchFailure::Exhausted));

    let with_mask = RouteControl {
        via_masks: vec![ViaMask {
            first_layer: 0,
            last_layer: 1,
            attach_smd_allowed: false,
        }],
        ..no_masks.clone()
    };
    let mut search = session(&g, &board, &with_mask);
    let route = search.find_connection(&NeverStop).unwrap();
    assert!(
        route.steps.iter().any(|s| s.target == Expandable::Drill(drill) && s.section == 1),
        "the route changes layer at the drill"
    );
}

#[test]
fn stop_request_cancels() {
    let (board, g) = walled_board();
    let ctrl = ripping();
    let mut search = session(&g, &board, &ctrl);
    let stop = AtomicBool::new(true);
    assert_eq!(search.find_connection(&stop), Err(SearchFailure::Cancelled));
    assert_eq!(search.stats().pops, 0);
}

#[test]
fn sessions_refuse_bad_input() {
    let (board, g) = walled_board();
    let tree = board.index().default_tree();
    let ctrl = RouteControl::new(1);
    let err = PathSearch::new(&g, &board, tree, &ctrl, &ids(&[ItemId(9)]), &ids(&[DEST]))
        .unwrap_err();
    assert_eq!(err, SearchError::NoStartDoors);
    let two_layers = RouteControl::new(2);
    let err = PathSearch::new(&g, &board, tree, &two_layers, &ids(&[START]), &ids(&[DEST]))
        .unwrap_err();
    assert_eq!(err, SearchError::LayerCountMismatch { control: 2, board: 1 });
}
