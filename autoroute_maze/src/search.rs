// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The best-first maze search.
//!
//! The search settles door and drill sections in order of accumulated cost
//! plus a lower bound to the destination. Settling a section expands the room
//! behind it: into destination doors, into the room's other doors, and onto
//! drills for a layer change. Entering an obstacle room either shoves the
//! obstacle trace aside or pays for ripping it.

use std::collections::BTreeSet;

use autoroute_geom::{Dimension, Tile, nearest_on_segment};
use autoroute_index::{ItemFlags, ItemId, ShapeSearchTree, TreeEntry};
use kurbo::{Line, Point};
use thiserror::Error;

use crate::board::{BoardGeometry, RouteItem, StopRequest, ViaLayerCheck};
use crate::control::RouteControl;
use crate::distance::DestinationDistance;
use crate::frontier::{Adjustment, Expandable, Frontier, FrontierElement};
use crate::graph::{DrillId, DrillPageId, RoomId, RoomKind, RouteGraph};
use crate::ripup::{RipupCheck, RipupCostModel};
use crate::sections::SectionStates;
use crate::shove::{opposite, shove_targets};

/// Reasons a search cannot start.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SearchError {
    /// None of the start items touches a room.
    #[error("no start door found for the start items")]
    NoStartDoors,
    /// The parameters and the board disagree on the number of layers.
    #[error("control describes {control} layers but the board has {board}")]
    LayerCountMismatch {
        /// Layers in the parameters.
        control: usize,
        /// Layers on the board.
        board: usize,
    },
}

/// Why a search found no route.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum SearchFailure {
    /// Every reachable section was settled without meeting a destination.
    #[error("no route to the destination")]
    Exhausted,
    /// The stop request fired.
    #[error("search was cancelled")]
    Cancelled,
}

/// One settled section on the way back from the destination.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteStep {
    /// Door, target door or drill.
    pub target: Expandable,
    /// Section of the target.
    pub section: usize,
    /// Room entered through the section.
    pub room: Option<RoomId>,
    /// Where the route crosses the section.
    pub entry: Option<Line>,
    /// The entered room was ripped.
    pub room_ripped: bool,
    /// Shove side taken into the section.
    pub adjustment: Adjustment,
}

/// A found connection.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// The section that ended the search.
    pub destination: (Expandable, usize),
    /// Accumulated cost.
    pub cost: f64,
    /// Part of `cost` spent on ripping obstacles.
    pub ripup_cost: f64,
    /// Settled sections from the destination back to the start.
    pub steps: Vec<RouteStep>,
}

/// Counters of one session.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Frontier elements taken.
    pub pops: usize,
    /// Elements dropped because their section was already settled.
    pub stale: usize,
    /// Sections settled.
    pub expanded: usize,
}

/// Where a move lands.
#[derive(Copy, Clone, Debug)]
struct Crossing {
    target: Expandable,
    section: usize,
    entry: Line,
    next_room: Option<RoomId>,
    layer: usize,
}

/// One search session from a set of start items to a set of destination
/// items.
pub struct PathSearch<'a, B: BoardGeometry + ?Sized> {
    graph: &'a RouteGraph,
    board: &'a B,
    tree: &'a ShapeSearchTree,
    ctrl: &'a RouteControl,
    destination: BTreeSet<ItemId>,
    sections: SectionStates,
    frontier: Frontier,
    distance: DestinationDistance,
    ripup: RipupCostModel,
    stats: SearchStats,
}

impl<B: BoardGeometry + ?Sized> core::fmt::Debug for PathSearch<'_, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PathSearch")
            .field("destination", &self.destination)
            .field("pending", &self.frontier.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<'a, B: BoardGeometry + ?Sized> PathSearch<'a, B> {
    /// Prepare a session.
    ///
    /// The target doors of `start` are settled and their rooms expanded, so
    /// the frontier holds everything reachable in one step from the start.
    /// `tree` is the search tree compensated for the trace's clearance class.
    pub fn new(
        graph: &'a RouteGraph,
        board: &'a B,
        tree: &'a ShapeSearchTree,
        ctrl: &'a RouteControl,
        start: &BTreeSet<ItemId>,
        destination: &BTreeSet<ItemId>,
    ) -> Result<Self, SearchError> {
        if ctrl.layer_count() != board.layer_count() {
            return Err(SearchError::LayerCountMismatch {
                control: ctrl.layer_count(),
                board: board.layer_count(),
            });
        }
        let mut distance = DestinationDistance::new(ctrl);
        let mut start_doors = Vec::new();
        for (id, door) in graph.target_doors() {
            if destination.contains(&door.item) {
                distance.join(&door.shape, graph.room(door.room).layer);
            } else if start.contains(&door.item) {
                start_doors.push(id);
            }
        }
        if start_doors.is_empty() {
            return Err(SearchError::NoStartDoors);
        }
        let mut search = Self {
            graph,
            board,
            tree,
            ctrl,
            destination: destination.clone(),
            sections: SectionStates::new(graph),
            frontier: Frontier::new(),
            distance,
            ripup: RipupCostModel::new(ctrl),
            stats: SearchStats::default(),
        };
        for id in start_doors {
            let door = graph.target_door(id);
            let p = door
                .shape
                .centroid()
                .or_else(|| door.shape.vertices().first().copied())
                .unwrap_or(Point::ZERO);
            let seed = FrontierElement {
                target: Expandable::Target(id),
                section: 0,
                backtrack: None,
                cost: 0.0,
                sort_key: 0.0,
                next_room: Some(door.room),
                entry: Line::new(p, p),
                room_ripped: false,
                adjustment: Adjustment::None,
                already_checked: false,
                ripup_cost: 0.0,
            };
            search.commit(&seed);
            search.occupy(&seed);
            search.expand_to_room_doors(&seed);
        }
        log::debug!(
            "search seeded from {} start items with {} pending moves",
            start.len(),
            search.frontier.len()
        );
        Ok(search)
    }

    /// Counters so far.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Run until a destination section is settled.
    ///
    /// `stop` is polled once per frontier pop. On failure the settled
    /// sections stay as they are.
    pub fn find_connection(&mut self, stop: &dyn StopRequest) -> Result<Route, SearchFailure> {
        loop {
            if stop.is_stop_requested() {
                log::debug!("search cancelled after {} pops", self.stats.pops);
                return Err(SearchFailure::Cancelled);
            }
            let Some(element) = self.frontier.pop() else {
                log::debug!("frontier exhausted after {} pops", self.stats.pops);
                return Err(SearchFailure::Exhausted);
            };
            self.stats.pops += 1;
            if let Some(route) = self.occupy_next_element(element) {
                log::debug!(
                    "route found after {} pops, cost {:.3}, ripup {:.3}",
                    self.stats.pops,
                    route.cost,
                    route.ripup_cost
                );
                return Ok(route);
            }
        }
    }

    fn occupy_next_element(&mut self, element: FrontierElement) -> Option<Route> {
        if let Expandable::DrillPage(page) = element.target {
            self.expand_drill_page(&element, page);
            return None;
        }
        if self.sections.is_occupied(element.target, element.section) {
            self.stats.stale += 1;
            return None;
        }
        log::trace!("pop {:?}/{} key {:.3}", element.target, element.section, element.sort_key);
        self.commit(&element);
        match element.target {
            Expandable::Target(t) => {
                if self.destination.contains(&self.graph.target_door(t).item) {
                    self.occupy(&element);
                    return Some(self.build_route(&element));
                }
            }
            Expandable::Drill(d) => {
                let from_drill = matches!(element.backtrack, Some((Expandable::Drill(_), _)));
                if from_drill && self.ctrl.is_fanout {
                    self.occupy(&element);
                    return Some(self.build_route(&element));
                }
                if !from_drill && self.ctrl.vias_allowed {
                    self.expand_to_other_layers(&element, d);
                }
            }
            Expandable::Door(_) | Expandable::DrillPage(_) => {}
        }
        if self.expand_to_room_doors(&element) {
            self.occupy(&element);
        }
        None
    }

    fn commit(&mut self, element: &FrontierElement) {
        if let Some(record) = self.sections.get_mut(element.target, element.section) {
            record.backtrack = element.backtrack;
            record.room_ripped = element.room_ripped;
            record.adjustment = element.adjustment;
            record.entry = Some(element.entry);
            record.room = element.next_room;
        }
    }

    fn occupy(&mut self, element: &FrontierElement) {
        if let Some(record) = self.sections.get_mut(element.target, element.section) {
            record.occupied = true;
            self.stats.expanded += 1;
        }
    }

    fn build_route(&self, element: &FrontierElement) -> Route {
        let mut steps = Vec::new();
        let mut cur = Some((element.target, element.section));
        while let Some((target, section)) = cur {
            let Some(record) = self.sections.get(target, section) else {
                break;
            };
            steps.push(RouteStep {
                target,
                section,
                room: record.room,
                entry: record.entry,
                room_ripped: record.room_ripped,
                adjustment: record.adjustment,
            });
            if steps.len() > self.sections.len() {
                log::error!("backtrack chain from {target:?} does not end");
                break;
            }
            cur = record.backtrack;
        }
        Route {
            destination: (element.target, element.section),
            cost: element.cost,
            ripup_cost: element.ripup_cost,
            steps,
        }
    }

    /// Expand the room entered by `element`. Returns false when the section
    /// must stay unsettled for now.
    fn expand_to_room_doors(&mut self, element: &FrontierElement) -> bool {
        let Some(room_id) = element.next_room else {
            return true;
        };
        let graph = self.graph;
        let room = graph.room(room_id);
        let layer = room.layer;
        if !self.ctrl.is_layer_active(layer) {
            return true;
        }
        let chw = self.ctrl.compensated_half_width(layer);
        let entry_point = element.entry.midpoint();

        if let Expandable::Door(d) = element.target {
            let door = graph.door(d);
            let between_free_rooms = door
                .rooms
                .iter()
                .all(|r| graph.room(*r).kind == RoomKind::FreeSpace);
            if between_free_rooms
                && door.shape.diameter() < 2.0 * chw
                && !self.enter_through_small_door(&door.shape, layer)
            {
                return true;
            }
        }

        let thick = match room.kind {
            RoomKind::FreeSpace => {
                room.shape.min_width() > 2.0 * chw
                    || room
                        .shape
                        .nearest_border_points(entry_point, 2)
                        .get(1)
                        .is_some_and(|p| {
                            p.distance(entry_point) > chw + self.ctrl.trace_width_tolerance
                        })
            }
            RoomKind::Obstacle { item, shape_index } => match self.board.item(item) {
                Some(obstacle) => {
                    self.obstacle_half_width(obstacle, item, shape_index, layer) >= chw
                }
                None => {
                    log::warn!("obstacle room {room_id:?} refers to unknown item {item:?}");
                    return true;
                }
            },
        };

        if let RoomKind::Obstacle { item, .. } = room.kind {
            if !element.already_checked {
                let check = self.ripup_check(element, item);
                let cost = match check {
                    RipupCheck::Blocked => return true,
                    RipupCheck::AlreadyRipped(c) => c,
                    RipupCheck::Cost(c) => match self.try_shove(element, room_id) {
                        Some(settled) => return settled,
                        None => c,
                    },
                };
                self.frontier.push(FrontierElement {
                    cost: element.cost + cost,
                    sort_key: element.sort_key + cost,
                    ripup_cost: element.ripup_cost + cost,
                    room_ripped: true,
                    already_checked: true,
                    ..element.clone()
                });
                return false;
            }
        }

        let half_width = self.ctrl.half_width(layer);
        for &t in &room.target_doors {
            let target = graph.target_door(t);
            if !self.destination.contains(&target.item)
                || self.sections.is_occupied(Expandable::Target(t), 0)
            {
                continue;
            }
            let Some(p) = target.shape.nearest_point(entry_point) else {
                continue;
            };
            if !thick
                && !self.board.check_trace_segment(
                    entry_point,
                    p,
                    layer,
                    &[self.ctrl.net],
                    half_width,
                    self.ctrl.trace_clearance_class,
                )
            {
                continue;
            }
            let to = Crossing {
                target: Expandable::Target(t),
                section: 0,
                entry: Line::new(p, p),
                next_room: None,
                layer,
            };
            self.expand_to_door_section(element, to);
        }

        for &d in &room.doors {
            if element.target == Expandable::Door(d) {
                continue;
            }
            let door = graph.door(d);
            let Some(next) = door.other_room(room_id) else {
                continue;
            };
            let segments = door.section_segments(half_width, self.ctrl.trace_width_tolerance);
            if thick {
                for (section, seg) in segments.into_iter().enumerate() {
                    let to = Crossing {
                        target: Expandable::Door(d),
                        section,
                        entry: seg,
                        next_room: Some(next),
                        layer,
                    };
                    self.expand_to_door_section(element, to);
                }
                continue;
            }
            // Thin room: cross straight over to the nearest point of the door.
            let nearest = segments
                .iter()
                .enumerate()
                .map(|(i, seg)| (i, nearest_on_segment(entry_point, seg.p0, seg.p1).1))
                .min_by(|a, b| a.1.distance(entry_point).total_cmp(&b.1.distance(entry_point)));
            let Some((section, p)) = nearest else {
                continue;
            };
            if !self.board.check_trace_segment(
                entry_point,
                p,
                layer,
                &[self.ctrl.net],
                half_width,
                self.ctrl.trace_clearance_class,
            ) {
                continue;
            }
            let to = Crossing {
                target: Expandable::Door(d),
                section,
                entry: Line::new(p, p),
                next_room: Some(next),
                layer,
            };
            self.expand_to_door_section(element, to);
        }

        if self.ctrl.vias_allowed {
            match room.kind {
                RoomKind::FreeSpace => {
                    for page in graph.drill_pages_overlapping(&room.shape) {
                        self.frontier.push(FrontierElement {
                            target: Expandable::DrillPage(page),
                            section: 0,
                            backtrack: Some((element.target, element.section)),
                            next_room: Some(room_id),
                            room_ripped: false,
                            adjustment: Adjustment::None,
                            already_checked: false,
                            ..element.clone()
                        });
                    }
                }
                RoomKind::Obstacle { item, .. } => {
                    let via_drill = graph
                        .drill_for_via(item)
                        .filter(|&drill| element.target != Expandable::Drill(drill));
                    if let Some(drill) = via_drill {
                        let d = graph.drill(drill);
                        if let Some(section) = d.section_of(layer) {
                            let to = Crossing {
                                target: Expandable::Drill(drill),
                                section,
                                entry: Line::new(d.location, d.location),
                                next_room: Some(room_id),
                                layer,
                            };
                            self.expand_to_door_section(element, to);
                        }
                    }
                }
            }
        }
        true
    }

    fn expand_drill_page(&mut self, element: &FrontierElement, page: DrillPageId) {
        let Some(room_id) = element.next_room else {
            return;
        };
        let graph = self.graph;
        let layer = graph.room(room_id).layer;
        for &drill in &graph.drill_page(page).drills {
            let d = graph.drill(drill);
            if d.room_on(layer) != Some(room_id) {
                continue;
            }
            let Some(section) = d.section_of(layer) else {
                continue;
            };
            let to = Crossing {
                target: Expandable::Drill(drill),
                section,
                entry: Line::new(d.location, d.location),
                next_room: Some(room_id),
                layer,
            };
            self.expand_to_door_section(element, to);
        }
    }

    fn expand_to_door_section(&mut self, from: &FrontierElement, to: Crossing) {
        self.push_move(from, to, 0.0, 0.0, Adjustment::None, false);
    }

    /// Queue a move from `from` across `to`, adding `add_cost` on top of the
    /// length cost. `add_ripup` is the part of `add_cost` spent on ripping.
    ///
    /// A `ripped` move enters a room whose obstacle is already paid for, so
    /// the room is not priced again.
    fn push_move(
        &mut self,
        from: &FrontierElement,
        to: Crossing,
        add_cost: f64,
        add_ripup: f64,
        adjustment: Adjustment,
        ripped: bool,
    ) {
        let Crossing {
            target,
            section,
            entry,
            next_room,
            layer,
        } = to;
        if self.sections.is_occupied(target, section) {
            return;
        }
        let from_point = from.entry.midpoint();
        let to_point = entry.midpoint();
        let run = self.ctrl.trace_cost(layer).weighted_distance(from_point, to_point);
        let cost = from.cost + run + add_cost;
        let heuristic_layer = next_room.map_or(layer, |r| self.graph.room(r).layer);
        let sort_key = cost + self.distance.calculate(to_point, heuristic_layer);
        let backtrack = match from.target {
            Expandable::DrillPage(_) => from.backtrack,
            _ => Some((from.target, from.section)),
        };
        self.frontier.push(FrontierElement {
            target,
            section,
            backtrack,
            cost,
            sort_key,
            next_room,
            entry,
            room_ripped: ripped,
            adjustment,
            already_checked: ripped,
            ripup_cost: from.ripup_cost + add_ripup,
        });
    }

    fn expand_to_other_layers(&mut self, element: &FrontierElement, drill: DrillId) {
        let graph = self.graph;
        let d = graph.drill(drill);
        let layer = d.first_layer + element.section;
        let nets = [self.ctrl.net];
        let via_class = self.ctrl.via_clearance_class;

        let in_via_room = d.via.is_some_and(|via_id| {
            element.next_room.is_some_and(|r| {
                matches!(graph.room(r).kind, RoomKind::Obstacle { item, .. } if item == via_id)
            })
        });
        // Layers change once per drill: in its via's room after the via is paid
        // for, anywhere else on the first arrival.
        if in_via_room != element.already_checked {
            return;
        }

        let mut via_ripup = 0.0;
        let mut ripped = false;
        let mut smd_attach = vec![false; d.section_count()];
        let (lo, hi) = match d.via.and_then(|v| self.board.item(v).map(|item| (v, item))) {
            Some((via_id, RouteItem::Via(via))) => {
                if !via.nets.contains(&self.ctrl.net) {
                    if !in_via_room {
                        match self.ripup.cost(self.board, via_id, self.ctrl) {
                            Some(c) => via_ripup = c,
                            None => return,
                        }
                    }
                    ripped = true;
                }
                (via.first_layer.max(d.first_layer), via.last_layer.min(d.last_layer))
            }
            _ => {
                let mut query = |l: usize| {
                    let radius = self.ctrl.via_radius.get(l).copied().unwrap_or(0.0);
                    match self.board.check_via_layer(d.location, radius, l, &nets, via_class) {
                        ViaLayerCheck::NotDrillable => false,
                        ViaLayerCheck::Drillable => true,
                        ViaLayerCheck::DrillableWithAttachSmd => {
                            smd_attach[l - d.first_layer] = true;
                            true
                        }
                    }
                };
                if !query(layer) {
                    return;
                }
                let mut lo = layer;
                while lo > d.first_layer && query(lo - 1) {
                    lo -= 1;
                }
                let mut hi = layer;
                while hi < d.last_layer && query(hi + 1) {
                    hi += 1;
                }
                (lo, hi)
            }
        };
        if lo > hi {
            return;
        }

        let location = d.location;
        for to in lo..=hi {
            if to == layer || !self.ctrl.is_layer_active(to) {
                continue;
            }
            let Some(room) = d.room_on(to) else {
                continue;
            };
            let (min, max) = (layer.min(to), layer.max(to));
            let needs_smd = smd_attach
                .get(min - d.first_layer..=max - d.first_layer)
                .is_some_and(|span| span.contains(&true));
            let mask_fits = self
                .ctrl
                .via_masks
                .iter()
                .any(|m| {
                    m.first_layer <= min
                        && max <= m.last_layer
                        && (m.attach_smd_allowed || !needs_smd)
                });
            if !mask_fits {
                continue;
            }
            let Some(section) = d.section_of(to) else {
                continue;
            };
            let add = self.ctrl.via_cost(layer, to) + via_ripup;
            let crossing = Crossing {
                target: Expandable::Drill(drill),
                section,
                entry: Line::new(location, location),
                next_room: Some(room),
                layer: to,
            };
            self.push_move(element, crossing, add, via_ripup, Adjustment::None, ripped);
        }
    }

    fn ripup_check(&mut self, element: &FrontierElement, item: ItemId) -> RipupCheck {
        if !self.ctrl.ripup_allowed {
            return RipupCheck::Blocked;
        }
        if element.adjustment == Adjustment::None {
            let previous = element
                .backtrack
                .and_then(|(target, section)| self.sections.get(target, section))
                .filter(|record| record.room_ripped)
                .and_then(|record| record.room);
            if let Some(prev) = previous {
                if let RoomKind::Obstacle { item: prev_item, .. } = self.graph.room(prev).kind {
                    if prev_item == item {
                        return RipupCheck::AlreadyRipped(self.ctrl.already_ripped_cost);
                    }
                }
            }
        }
        match self.ripup.cost(self.board, item, self.ctrl) {
            Some(c) => RipupCheck::Cost(c),
            None => RipupCheck::Blocked,
        }
    }

    /// Shove the trace of `room` aside in each allowed direction and expand
    /// the doors reached that way.
    ///
    /// `None` when no direction reaches a door, leaving ripup as the fallback.
    /// Otherwise tells whether every tried direction reached one; after a
    /// partial shove the entry section stays unsettled so a sibling section
    /// can shove on its own.
    fn try_shove(&mut self, element: &FrontierElement, room: RoomId) -> Option<bool> {
        let Expandable::Door(entry) = element.target else {
            return None;
        };
        if self.ctrl.max_shove_trace_recursion_depth == 0 {
            return None;
        }
        let graph = self.graph;
        let layer = graph.room(room).layer;
        let mut any = false;
        let mut all = true;
        for side in [Adjustment::Left, Adjustment::Right] {
            if element.adjustment == opposite(side) {
                continue;
            }
            match shove_targets(graph, self.board, self.ctrl, room, entry, side) {
                Some(doors) if !doors.is_empty() => {
                    any = true;
                    for shoved in doors {
                        let door = graph.door(shoved.door);
                        let Some(next) = door.other_room(room) else {
                            continue;
                        };
                        let run = self
                            .ctrl
                            .trace_cost(layer)
                            .weighted_distance(element.entry.midpoint(), shoved.along);
                        let via_along = FrontierElement {
                            entry: Line::new(shoved.along, shoved.along),
                            cost: element.cost + run,
                            ..element.clone()
                        };
                        let segments = door.section_segments(
                            self.ctrl.half_width(layer),
                            self.ctrl.trace_width_tolerance,
                        );
                        for (section, seg) in segments.into_iter().enumerate() {
                            let to = Crossing {
                                target: Expandable::Door(shoved.door),
                                section,
                                entry: seg,
                                next_room: Some(next),
                                layer,
                            };
                            self.push_move(&via_along, to, 0.0, 0.0, shoved.adjustment, false);
                        }
                    }
                }
                _ => all = false,
            }
        }
        any.then_some(all)
    }

    fn enter_through_small_door(&self, door: &Tile, layer: usize) -> bool {
        let Some(span) = door.longest_span() else {
            return true;
        };
        let center = span.p0.midpoint(span.p1);
        let dir = span.p1 - span.p0;
        let len = dir.hypot();
        let normal = if len > autoroute_geom::EPSILON {
            kurbo::Vec2::new(-dir.y, dir.x) / len
        } else {
            kurbo::Vec2::new(0.0, 1.0)
        };
        let chw = self.ctrl.compensated_half_width(layer);
        let across = Tile::segment(center - normal * chw, center + normal * chw).offset(chw);
        !self
            .tree
            .find_overlap_objects(&across, Some(layer), &[self.ctrl.net])
            .into_iter()
            .any(|id| {
                self.tree
                    .item_info(id)
                    .is_some_and(|(_, _, flags)| flags.contains(ItemFlags::TRACE_OBSTACLE))
            })
    }

    fn obstacle_half_width(
        &self,
        obstacle: &RouteItem,
        item: ItemId,
        shape_index: usize,
        layer: usize,
    ) -> f64 {
        let compensation = self
            .tree
            .clearance_compensation_value(obstacle.clearance_class(), layer);
        match obstacle {
            RouteItem::Trace(t) => t.half_width + compensation,
            RouteItem::Via(v) => v.radius + compensation,
            RouteItem::Pin(_) | RouteItem::Area(_) => {
                let stored = self.tree.tree_shape(TreeEntry { item, shape_index });
                match stored {
                    Some(tile) if tile.dimension() == Dimension::Area => 0.5 * tile.min_width(),
                    _ => 0.0,
                }
            }
        }
    }
}
