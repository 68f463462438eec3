// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Autoroute Maze: a best-first search for one connection across a board.
//!
//! The board's free space is cut into convex rooms on each layer; rooms meet
//! at doors, and doors are split into sections wide enough for one trace.
//! [`PathSearch`] settles sections in order of cost plus an admissible
//! estimate to the destination until it reaches a destination item.
//!
//! - [`RouteGraph`] holds rooms, doors, target doors into start and
//!   destination items, and drills for layer changes.
//! - [`BoardGeometry`] is what the search asks of the board: item lookup,
//!   trace and via fit checks, and how far a trace can be shoved.
//!   [`IndexedBoard`] implements it over an
//!   [`IndexManager`](autoroute_index::IndexManager).
//! - [`RouteControl`] carries the parameters of one session.
//!
//! Obstacle rooms can be entered when ripup is allowed. The first time a
//! search meets an obstacle it prices the rip and requeues the move; traces
//! that can be shoved aside are tried first. Ripup costs are jittered in late
//! passes with a generator seeded from the parameters, so a session is
//! reproducible.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeSet;
//!
//! use autoroute_geom::Tile;
//! use autoroute_index::{ClearanceMatrix, ItemId};
//! use autoroute_maze::{
//!     IndexedBoard, NeverStop, PathSearch, PinItem, RoomKind, RouteControl, RouteGraph, RouteItem,
//! };
//! use kurbo::Rect;
//!
//! let pad = |x: f64| Tile::from_rect(Rect::new(x, 0.0, x + 4.0, 4.0));
//! let mut board = IndexedBoard::new(1, ClearanceMatrix::new(2, 1));
//! for (id, x) in [(0, 0.0), (1, 90.0)] {
//!     let pin = PinItem {
//!         nets: vec![1],
//!         clearance_class: 1,
//!         first_layer: 0,
//!         last_layer: 0,
//!         shape: pad(x),
//!     };
//!     board.insert(ItemId(id), RouteItem::Pin(pin)).unwrap();
//! }
//!
//! // One free room holding both pads.
//! let mut graph = RouteGraph::new(1.0, 0.0);
//! let room_shape = Tile::from_rect(Rect::new(0.0, 0.0, 100.0, 10.0));
//! let room = graph.add_room(0, room_shape, RoomKind::FreeSpace);
//! graph.add_target_door(room, ItemId(0), 0, pad(0.0));
//! graph.add_target_door(room, ItemId(1), 0, pad(90.0));
//!
//! let ctrl = RouteControl::new(1);
//! let start = BTreeSet::from([ItemId(0)]);
//! let destination = BTreeSet::from([ItemId(1)]);
//! let tree = board.index().default_tree();
//! let mut search = PathSearch::new(&graph, &board, tree, &ctrl, &start, &destination).unwrap();
//! let route = search.find_connection(&NeverStop).unwrap();
//! assert_eq!(route.steps.len(), 2);
//! assert!((route.cost - 88.0).abs() < 1e-9);
//! ```

pub mod board;
pub mod control;
pub mod distance;
pub mod frontier;
pub mod graph;
pub mod ripup;
pub mod search;
pub mod sections;
pub mod shove;

pub use board::{
    AreaItem, BoardGeometry, FixedState, IndexedBoard, NeverStop, PinItem, RouteItem, ShoveRequest,
    StopRequest, TraceItem, ViaItem, ViaLayerCheck,
};
pub use control::{RouteControl, TraceCost, ViaMask};
pub use distance::DestinationDistance;
pub use frontier::{Adjustment, Expandable, Frontier, FrontierElement};
pub use graph::{
    Door, DoorId, Drill, DrillId, DrillPage, DrillPageId, Room, RoomId, RoomKind, RouteGraph,
    TargetDoor, TargetDoorId,
};
pub use ripup::{RipupCheck, RipupCostModel};
pub use search::{PathSearch, Route, RouteStep, SearchError, SearchFailure, SearchStats};
pub use sections::{SectionRecord, SectionStates};
pub use shove::ShovedDoor;
