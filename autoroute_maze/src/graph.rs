// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The room and door graph the search runs on.
//!
//! Rooms are convex regions on one layer, either free space or the shape of
//! one obstacle item. Doors join two rooms; target doors join a room to a
//! destination or start item. Drills connect the rooms stacked above one via
//! location, and drill pages bucket drills spatially so a large free room does
//! not enumerate every drill on the board.
//!
//! Ids are only meaningful for the graph that issued them; lookups with a
//! foreign id panic like slice indexing does.

use autoroute_geom::{Dimension, Tile};
use autoroute_index::ItemId;
use kurbo::{Line, Point};

macro_rules! graph_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Graphs beyond u32::MAX elements are not supported."
            )]
            const fn new(idx: usize) -> Self {
                Self(idx as u32)
            }

            /// Position in the owning arena.
            pub const fn idx(self) -> usize {
                self.0 as usize
            }
        }
    };
}

graph_id!(
    /// Handle of a [`Room`].
    RoomId
);
graph_id!(
    /// Handle of a [`Door`].
    DoorId
);
graph_id!(
    /// Handle of a [`TargetDoor`].
    TargetDoorId
);
graph_id!(
    /// Handle of a [`Drill`].
    DrillId
);
graph_id!(
    /// Handle of a [`DrillPage`].
    DrillPageId
);

/// What fills a room.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoomKind {
    /// Free space.
    FreeSpace,
    /// The shape of an obstacle item.
    Obstacle {
        /// Obstacle item.
        item: ItemId,
        /// Which of the item's shapes the room is.
        shape_index: usize,
    },
}

/// A convex region on one layer.
#[derive(Clone, Debug)]
pub struct Room {
    /// Board layer.
    pub layer: usize,
    /// Outline.
    pub shape: Tile,
    /// Free space or obstacle.
    pub kind: RoomKind,
    /// Doors to neighboring rooms.
    pub doors: Vec<DoorId>,
    /// Doors to start or destination items touching the room.
    pub target_doors: Vec<TargetDoorId>,
}

/// Boundary between two rooms.
#[derive(Clone, Debug)]
pub struct Door {
    /// The joined rooms.
    pub rooms: [RoomId; 2],
    /// Common boundary: a point, a segment, or an overlap area.
    pub shape: Tile,
    section_count: usize,
}

impl Door {
    /// Number of sections a door of `shape` is split into for a trace of
    /// half width `half_width`.
    ///
    /// Line doors get one section per ten trace widths of length; points and
    /// areas get one.
    pub fn section_count_for(shape: &Tile, half_width: f64, tolerance: f64) -> usize {
        if shape.dimension() != Dimension::Line {
            return 1;
        }
        let width = half_width + tolerance;
        if width <= 0.0 {
            return 1;
        }
        let count = (shape.diameter() / (10.0 * width)).floor();
        if count.is_finite() && count >= 0.0 {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Checked finite and non-negative above."
            )]
            let count = count as usize;
            count + 1
        } else {
            1
        }
    }

    /// Number of discrete sections.
    pub fn section_count(&self) -> usize {
        self.section_count
    }

    /// Point, line or area door.
    pub fn dimension(&self) -> Dimension {
        self.shape.dimension()
    }

    /// The room on the other side of `room`, if `room` is one of the two.
    pub fn other_room(&self, room: RoomId) -> Option<RoomId> {
        match self.rooms {
            [a, b] if a == room => Some(b),
            [a, b] if b == room => Some(a),
            _ => None,
        }
    }

    /// The door's crossing line split into its sections.
    ///
    /// Both ends are pulled in by `half_width + tolerance` so a trace crossing
    /// any section stays inside the door. Doors too short for that collapse to
    /// their midpoint.
    pub fn section_segments(&self, half_width: f64, tolerance: f64) -> Vec<Line> {
        let Some(span) = self.shape.longest_span() else {
            return Vec::new();
        };
        let inset = (half_width + tolerance).max(0.0);
        let length = span.p0.distance(span.p1);
        let (start, end) = if length <= 2.0 * inset {
            let mid = span.p0.midpoint(span.p1);
            (mid, mid)
        } else {
            let t = inset / length;
            (span.p0.lerp(span.p1, t), span.p1.lerp(span.p0, t))
        };
        let n = self.section_count.max(1);
        let step = 1.0 / n as f64;
        (0..n)
            .map(|i| {
                let t = i as f64 * step;
                Line::new(start.lerp(end, t), start.lerp(end, t + step))
            })
            .collect()
    }
}

/// Door from a room into one shape of a start or destination item.
#[derive(Clone, Debug)]
pub struct TargetDoor {
    /// The room the item shape touches.
    pub room: RoomId,
    /// Start or destination item.
    pub item: ItemId,
    /// Which of the item's shapes.
    pub shape_index: usize,
    /// Overlap of the item shape and the room.
    pub shape: Tile,
}

/// A via location spanning a range of layers.
#[derive(Clone, Debug)]
pub struct Drill {
    /// Via center.
    pub location: Point,
    /// Lowest layer the drill reaches.
    pub first_layer: usize,
    /// Highest layer the drill reaches.
    pub last_layer: usize,
    /// Room containing the location on each layer, indexed from `first_layer`.
    pub rooms: Vec<Option<RoomId>>,
    /// Via already sitting at the location.
    pub via: Option<ItemId>,
}

impl Drill {
    /// One section per layer.
    pub fn section_count(&self) -> usize {
        self.last_layer + 1 - self.first_layer
    }

    /// True if the drill reaches `layer`.
    pub fn spans(&self, layer: usize) -> bool {
        (self.first_layer..=self.last_layer).contains(&layer)
    }

    /// Section number of `layer`.
    pub fn section_of(&self, layer: usize) -> Option<usize> {
        self.spans(layer).then(|| layer - self.first_layer)
    }

    /// Room containing the drill on `layer`.
    pub fn room_on(&self, layer: usize) -> Option<RoomId> {
        self.section_of(layer)
            .and_then(|s| self.rooms.get(s).copied().flatten())
    }
}

/// A spatial bucket of drills.
#[derive(Clone, Debug)]
pub struct DrillPage {
    /// Area the page covers.
    pub shape: Tile,
    /// Drills located in the area.
    pub drills: Vec<DrillId>,
}

/// Arena of rooms, doors, target doors, drills and drill pages.
#[derive(Clone, Debug, Default)]
pub struct RouteGraph {
    rooms: Vec<Room>,
    doors: Vec<Door>,
    target_doors: Vec<TargetDoor>,
    drills: Vec<Drill>,
    drill_pages: Vec<DrillPage>,
    section_half_width: f64,
    section_tolerance: f64,
}

impl RouteGraph {
    /// Empty graph whose doors are sectioned for a trace of `half_width`
    /// plus `tolerance`.
    pub fn new(half_width: f64, tolerance: f64) -> Self {
        Self {
            section_half_width: half_width,
            section_tolerance: tolerance,
            ..Self::default()
        }
    }

    /// Add a room.
    pub fn add_room(&mut self, layer: usize, shape: Tile, kind: RoomKind) -> RoomId {
        let id = RoomId::new(self.rooms.len());
        self.rooms.push(Room {
            layer,
            shape,
            kind,
            doors: Vec::new(),
            target_doors: Vec::new(),
        });
        id
    }

    /// Join two rooms with a door of `shape`.
    pub fn add_door(&mut self, a: RoomId, b: RoomId, shape: Tile) -> DoorId {
        let id = DoorId::new(self.doors.len());
        let section_count =
            Door::section_count_for(&shape, self.section_half_width, self.section_tolerance);
        self.doors.push(Door {
            rooms: [a, b],
            shape,
            section_count,
        });
        self.rooms[a.idx()].doors.push(id);
        if b != a {
            self.rooms[b.idx()].doors.push(id);
        }
        id
    }

    /// Attach a door into shape `shape_index` of `item` to `room`.
    pub fn add_target_door(
        &mut self,
        room: RoomId,
        item: ItemId,
        shape_index: usize,
        shape: Tile,
    ) -> TargetDoorId {
        let id = TargetDoorId::new(self.target_doors.len());
        self.target_doors.push(TargetDoor {
            room,
            item,
            shape_index,
            shape,
        });
        self.rooms[room.idx()].target_doors.push(id);
        id
    }

    /// Add a drill with no rooms assigned yet.
    pub fn add_drill(
        &mut self,
        location: Point,
        first_layer: usize,
        last_layer: usize,
        via: Option<ItemId>,
    ) -> DrillId {
        let id = DrillId::new(self.drills.len());
        let (first_layer, last_layer) = (first_layer.min(last_layer), first_layer.max(last_layer));
        self.drills.push(Drill {
            location,
            first_layer,
            last_layer,
            rooms: vec![None; last_layer + 1 - first_layer],
            via,
        });
        id
    }

    /// Record that `drill` lies in `room` on the room's layer.
    ///
    /// Ignored when the drill does not reach that layer.
    pub fn set_drill_room(&mut self, drill: DrillId, room: RoomId) {
        let layer = self.rooms[room.idx()].layer;
        let d = &mut self.drills[drill.idx()];
        match d.section_of(layer) {
            Some(s) => d.rooms[s] = Some(room),
            None => log::warn!("drill {drill:?} does not reach layer {layer}"),
        }
    }

    /// Add a drill page holding `drills`.
    pub fn add_drill_page(&mut self, shape: Tile, drills: Vec<DrillId>) -> DrillPageId {
        let id = DrillPageId::new(self.drill_pages.len());
        self.drill_pages.push(DrillPage { shape, drills });
        id
    }

    /// Room lookup.
    pub fn room(&self, id: RoomId) -> &Room {
        &self.rooms[id.idx()]
    }

    /// Door lookup.
    pub fn door(&self, id: DoorId) -> &Door {
        &self.doors[id.idx()]
    }

    /// Target door lookup.
    pub fn target_door(&self, id: TargetDoorId) -> &TargetDoor {
        &self.target_doors[id.idx()]
    }

    /// Drill lookup.
    pub fn drill(&self, id: DrillId) -> &Drill {
        &self.drills[id.idx()]
    }

    /// Drill page lookup.
    pub fn drill_page(&self, id: DrillPageId) -> &DrillPage {
        &self.drill_pages[id.idx()]
    }

    /// Number of rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of doors.
    pub fn door_count(&self) -> usize {
        self.doors.len()
    }

    /// Number of target doors.
    pub fn target_door_count(&self) -> usize {
        self.target_doors.len()
    }

    /// Number of drills.
    pub fn drill_count(&self) -> usize {
        self.drills.len()
    }

    /// Every door, with its id.
    pub fn doors(&self) -> impl Iterator<Item = (DoorId, &Door)> + '_ {
        self.doors.iter().enumerate().map(|(i, d)| (DoorId::new(i), d))
    }

    /// Every drill, with its id.
    pub fn drills(&self) -> impl Iterator<Item = (DrillId, &Drill)> + '_ {
        self.drills.iter().enumerate().map(|(i, d)| (DrillId::new(i), d))
    }

    /// Every target door, with its id.
    pub fn target_doors(&self) -> impl Iterator<Item = (TargetDoorId, &TargetDoor)> + '_ {
        self.target_doors
            .iter()
            .enumerate()
            .map(|(i, t)| (TargetDoorId::new(i), t))
    }

    /// Drill pages whose area meets `shape`.
    pub fn drill_pages_overlapping(&self, shape: &Tile) -> Vec<DrillPageId> {
        self.drill_pages
            .iter()
            .enumerate()
            .filter(|(_, p)| p.shape.intersects(shape))
            .map(|(i, _)| DrillPageId::new(i))
            .collect()
    }

    /// The drill of an existing via.
    pub fn drill_for_via(&self, via: ItemId) -> Option<DrillId> {
        self.drills
            .iter()
            .position(|d| d.via == Some(via))
            .map(DrillId::new)
    }
}
