// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indexable view of board items.

use autoroute_geom::Tile;

/// Identifier of a board item.
///
/// Identifiers index the per-item mirror arrays of the search trees, so the
/// board should hand them out densely.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub u32);

impl ItemId {
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Net number. Items sharing a net are connectable and never obstacles for
/// each other.
pub type NetNo = u32;

bitflags::bitflags! {
    /// What an item is in the way of.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u8 {
        /// Traces of foreign nets must keep clear of the item.
        const TRACE_OBSTACLE = 0b0000_0001;
        /// Vias of foreign nets must keep clear of the item.
        const VIA_OBSTACLE   = 0b0000_0010;
        /// The item is a trace or via the router may move or remove.
        const ROUTABLE       = 0b0000_0100;
        /// The item conducts (a copper area rather than a keepout).
        const CONDUCTION     = 0b0000_1000;
    }
}

impl Default for ItemFlags {
    fn default() -> Self {
        Self::TRACE_OBSTACLE | Self::VIA_OBSTACLE
    }
}

/// A tile on one layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerShape {
    /// Board layer.
    pub layer: usize,
    /// Convex outline on that layer.
    pub tile: Tile,
}

/// Everything the index needs to know about a board item.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeItem {
    /// Identity.
    pub id: ItemId,
    /// Nets the item belongs to; empty for net-less items such as keepouts.
    pub nets: Vec<NetNo>,
    /// Row of the clearance matrix.
    pub clearance_class: usize,
    /// Obstacle behavior.
    pub flags: ItemFlags,
    /// One tile per indexed shape. Positions are the shape indices.
    pub shapes: Vec<LayerShape>,
}

impl TreeItem {
    /// True if the item shares a net with `nets`.
    pub fn shares_net(&self, nets: &[NetNo]) -> bool {
        shares_net(&self.nets, nets)
    }
}

pub(crate) fn shares_net(a: &[NetNo], b: &[NetNo]) -> bool {
    a.iter().any(|n| b.contains(n))
}

/// One stored shape: an item and the position of the shape within it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreeEntry {
    /// Owning item.
    pub item: ItemId,
    /// Position within [`TreeItem::shapes`].
    pub shape_index: usize,
}
