// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Board items and the geometry checks the search asks of the board.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use autoroute_geom::Tile;
use autoroute_index::{
    ClearanceMatrix, IndexError, IndexManager, ItemFlags, ItemId, LayerShape, NetNo, TreeItem,
};
use kurbo::Point;

/// How firmly an item is held in place.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FixedState {
    /// Free to move or remove.
    #[default]
    Unfixed,
    /// May not be shoved, but may be ripped.
    ShoveFixed,
    /// Fixed by the user.
    UserFixed,
    /// Fixed by the system, for example a fanout stub under construction.
    SystemFixed,
}

/// A routed trace.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceItem {
    /// Nets of the trace.
    pub nets: Vec<NetNo>,
    /// Clearance class.
    pub clearance_class: usize,
    /// Layer.
    pub layer: usize,
    /// Half width.
    pub half_width: f64,
    /// Polyline corners; segment `i` runs from corner `i` to corner `i + 1`.
    pub corners: Vec<Point>,
    /// Fix state.
    pub fixed: FixedState,
    /// Items connected at the first corner.
    pub start_contacts: Vec<ItemId>,
    /// Items connected at the last corner.
    pub end_contacts: Vec<ItemId>,
    /// Ratio of the connection's length to the direct distance of its ends.
    /// At least one.
    pub detour: f64,
}

impl TraceItem {
    /// Total polyline length.
    pub fn length(&self) -> f64 {
        self.corners.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// A placed via.
#[derive(Clone, Debug, PartialEq)]
pub struct ViaItem {
    /// Nets of the via.
    pub nets: Vec<NetNo>,
    /// Clearance class.
    pub clearance_class: usize,
    /// Center.
    pub location: Point,
    /// Lowest layer.
    pub first_layer: usize,
    /// Highest layer.
    pub last_layer: usize,
    /// Pad radius.
    pub radius: f64,
    /// Fix state.
    pub fixed: FixedState,
    /// Connected items.
    pub contacts: Vec<ItemId>,
}

/// A component pin.
#[derive(Clone, Debug, PartialEq)]
pub struct PinItem {
    /// Nets of the pin.
    pub nets: Vec<NetNo>,
    /// Clearance class.
    pub clearance_class: usize,
    /// Lowest layer of the pad stack.
    pub first_layer: usize,
    /// Highest layer of the pad stack.
    pub last_layer: usize,
    /// Pad outline, the same on every layer.
    pub shape: Tile,
}

impl PinItem {
    /// True for surface-mount pads.
    pub fn is_single_layer(&self) -> bool {
        self.first_layer == self.last_layer
    }
}

/// A keepout or copper area.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaItem {
    /// Nets of a copper area; empty for keepouts.
    pub nets: Vec<NetNo>,
    /// Clearance class.
    pub clearance_class: usize,
    /// Layer.
    pub layer: usize,
    /// Outline.
    pub shape: Tile,
    /// Copper rather than keepout.
    pub conduction: bool,
}

/// Everything that can sit on the board.
#[derive(Clone, Debug, PartialEq)]
pub enum RouteItem {
    /// A trace.
    Trace(TraceItem),
    /// A via.
    Via(ViaItem),
    /// A pin.
    Pin(PinItem),
    /// An area.
    Area(AreaItem),
}

impl RouteItem {
    /// Nets of the item.
    pub fn nets(&self) -> &[NetNo] {
        match self {
            Self::Trace(t) => &t.nets,
            Self::Via(v) => &v.nets,
            Self::Pin(p) => &p.nets,
            Self::Area(a) => &a.nets,
        }
    }

    /// Clearance class.
    pub fn clearance_class(&self) -> usize {
        match self {
            Self::Trace(t) => t.clearance_class,
            Self::Via(v) => v.clearance_class,
            Self::Pin(p) => p.clearance_class,
            Self::Area(a) => a.clearance_class,
        }
    }

    /// Fix state; pins and areas never move.
    pub fn fixed(&self) -> FixedState {
        match self {
            Self::Trace(t) => t.fixed,
            Self::Via(v) => v.fixed,
            Self::Pin(_) | Self::Area(_) => FixedState::SystemFixed,
        }
    }

    /// True if the router may move or remove the item.
    pub fn is_routable(&self) -> bool {
        matches!(self, Self::Trace(_) | Self::Via(_))
            && matches!(self.fixed(), FixedState::Unfixed | FixedState::ShoveFixed)
            && !self.nets().is_empty()
    }

    /// The indexable view of the item.
    pub fn tree_item(&self, id: ItemId) -> TreeItem {
        let mut flags = ItemFlags::default();
        if self.is_routable() {
            flags |= ItemFlags::ROUTABLE;
        }
        let shapes = match self {
            Self::Trace(t) => {
                flags |= ItemFlags::CONDUCTION;
                t.corners
                    .windows(2)
                    .map(|w| LayerShape {
                        layer: t.layer,
                        tile: Tile::segment(w[0], w[1]).offset(t.half_width),
                    })
                    .collect()
            }
            Self::Via(v) => {
                flags |= ItemFlags::CONDUCTION;
                (v.first_layer..=v.last_layer)
                    .map(|layer| LayerShape {
                        layer,
                        tile: Tile::octagon_around(v.location, v.radius),
                    })
                    .collect()
            }
            Self::Pin(p) => {
                flags |= ItemFlags::CONDUCTION;
                (p.first_layer..=p.last_layer)
                    .map(|layer| LayerShape {
                        layer,
                        tile: p.shape.clone(),
                    })
                    .collect()
            }
            Self::Area(a) => {
                if a.conduction {
                    flags |= ItemFlags::CONDUCTION;
                }
                vec![LayerShape {
                    layer: a.layer,
                    tile: a.shape.clone(),
                }]
            }
        };
        TreeItem {
            id,
            nets: self.nets().to_vec(),
            clearance_class: self.clearance_class(),
            flags,
            shapes,
        }
    }
}

/// Result of asking whether a via fits on one layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ViaLayerCheck {
    /// Something of a foreign net is in the way.
    NotDrillable,
    /// The via fits.
    Drillable,
    /// The via fits but lands on an SMD pad of its own net.
    DrillableWithAttachSmd,
}

/// A trial move of a trace aside.
#[derive(Clone, Debug, PartialEq)]
pub struct ShoveRequest {
    /// Trace to be shoved.
    pub item: ItemId,
    /// Layer of the trace.
    pub layer: usize,
    /// Where the new trace would start along the shoved trace.
    pub from: Point,
    /// The corner the new trace runs toward.
    pub to: Point,
    /// Half width of the new trace.
    pub half_width: f64,
    /// Nets of the new trace.
    pub nets: Vec<NetNo>,
    /// Clearance class of the new trace.
    pub clearance_class: usize,
    /// Remaining shove recursion depth.
    pub recursion_depth: u32,
}

/// The board services the search relies on.
pub trait BoardGeometry {
    /// Number of layers.
    fn layer_count(&self) -> usize;

    /// Look up a board item.
    fn item(&self, id: ItemId) -> Option<&RouteItem>;

    /// True if a trace segment can be inserted without a clearance violation.
    fn check_trace_segment(
        &self,
        from: Point,
        to: Point,
        layer: usize,
        nets: &[NetNo],
        half_width: f64,
        clearance_class: usize,
    ) -> bool;

    /// Length along `request.from -> request.to` the new trace can run once
    /// the shoved trace has been moved aside. Zero or less means the trace
    /// cannot be shoved.
    fn shove_trace_distance(&self, request: &ShoveRequest) -> f64;

    /// Whether a via of `radius` fits at `location` on `layer`.
    fn check_via_layer(
        &self,
        location: Point,
        radius: f64,
        layer: usize,
        nets: &[NetNo],
        clearance_class: usize,
    ) -> ViaLayerCheck;
}

/// External cancellation flag, polled once per frontier pop.
pub trait StopRequest {
    /// True once the search should give up.
    fn is_stop_requested(&self) -> bool;
}

/// A stop request that never fires.
#[derive(Copy, Clone, Debug, Default)]
pub struct NeverStop;

impl StopRequest for NeverStop {
    fn is_stop_requested(&self) -> bool {
        false
    }
}

impl StopRequest for AtomicBool {
    fn is_stop_requested(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Steps of the bisection in [`IndexedBoard::shove_trace_distance`].
const SHOVE_BISECTION_STEPS: u32 = 24;

/// A [`BoardGeometry`] over an [`IndexManager`] and an item table.
#[derive(Clone, Debug)]
pub struct IndexedBoard {
    layer_count: usize,
    index: IndexManager,
    items: BTreeMap<ItemId, RouteItem>,
}

impl IndexedBoard {
    /// Empty board with `layer_count` layers.
    pub fn new(layer_count: usize, clearance: ClearanceMatrix) -> Self {
        Self {
            layer_count,
            index: IndexManager::new(clearance),
            items: BTreeMap::new(),
        }
    }

    /// Place an item.
    pub fn insert(&mut self, id: ItemId, item: RouteItem) -> Result<(), IndexError> {
        self.index.insert(item.tree_item(id))?;
        self.items.insert(id, item);
        Ok(())
    }

    /// Take an item off the board.
    pub fn remove(&mut self, id: ItemId) -> Option<RouteItem> {
        self.index.remove(id);
        self.items.remove(&id)
    }

    /// The index over the board's items.
    pub fn index(&self) -> &IndexManager {
        &self.index
    }

    /// Mutable access to the index, for building autoroute trees.
    pub fn index_mut(&mut self) -> &mut IndexManager {
        &mut self.index
    }

    fn segment_clear(
        &self,
        from: Point,
        to: Point,
        layer: usize,
        nets: &[NetNo],
        half_width: f64,
        clearance_class: usize,
        ignore: Option<ItemId>,
    ) -> bool {
        let tree = self.index.default_tree();
        let grow = half_width + tree.clearance_compensation_value(clearance_class, layer);
        let shape = Tile::segment(from, to).offset(grow);
        tree.find_overlap_objects_with_clearance(&shape, Some(layer), nets, clearance_class)
            .into_iter()
            .filter(|&id| Some(id) != ignore)
            .all(|id| {
                !tree
                    .item_info(id)
                    .is_some_and(|(_, _, flags)| flags.contains(ItemFlags::TRACE_OBSTACLE))
            })
    }
}

impl BoardGeometry for IndexedBoard {
    fn layer_count(&self) -> usize {
        self.layer_count
    }

    fn item(&self, id: ItemId) -> Option<&RouteItem> {
        self.items.get(&id)
    }

    fn check_trace_segment(
        &self,
        from: Point,
        to: Point,
        layer: usize,
        nets: &[NetNo],
        half_width: f64,
        clearance_class: usize,
    ) -> bool {
        self.segment_clear(from, to, layer, nets, half_width, clearance_class, None)
    }

    fn shove_trace_distance(&self, request: &ShoveRequest) -> f64 {
        let Some(RouteItem::Trace(trace)) = self.item(request.item) else {
            return 0.0;
        };
        if trace.fixed != FixedState::Unfixed || request.recursion_depth == 0 {
            return 0.0;
        }
        let length = request.from.distance(request.to);
        let clear = |t: f64| {
            let end = request.from.lerp(request.to, t);
            self.segment_clear(
                request.from,
                end,
                request.layer,
                &request.nets,
                request.half_width,
                request.clearance_class,
                Some(request.item),
            )
        };
        if clear(1.0) {
            return length;
        }
        if !clear(0.0) {
            return 0.0;
        }
        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..SHOVE_BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if clear(mid) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo * length
    }

    fn check_via_layer(
        &self,
        location: Point,
        radius: f64,
        layer: usize,
        nets: &[NetNo],
        clearance_class: usize,
    ) -> ViaLayerCheck {
        let tree = self.index.default_tree();
        let compensation = tree.clearance_compensation_value(clearance_class, layer);
        let shape = Tile::octagon_around(location, radius + compensation);
        let blocked = tree
            .find_overlap_objects_with_clearance(&shape, Some(layer), nets, clearance_class)
            .into_iter()
            .any(|id| {
                tree.item_info(id)
                    .is_some_and(|(_, _, flags)| flags.contains(ItemFlags::VIA_OBSTACLE))
            });
        if blocked {
            return ViaLayerCheck::NotDrillable;
        }
        let on_own_smd = tree
            .find_overlap_objects(&shape, Some(layer), &[])
            .into_iter()
            .filter_map(|id| self.items.get(&id))
            .any(|item| match item {
                RouteItem::Pin(pin) => {
                    pin.is_single_layer() && pin.nets.iter().any(|n| nets.contains(n))
                }
                _ => false,
            });
        if on_own_smd {
            ViaLayerCheck::DrillableWithAttachSmd
        } else {
            ViaLayerCheck::Drillable
        }
    }
}
