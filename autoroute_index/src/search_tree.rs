// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shape search tree: board item tiles in a [`BoundTree`].

use std::collections::BTreeSet;

use autoroute_geom::{Octagon, Tile};

use crate::clearance::ClearanceMatrix;
use crate::error::IndexError;
use crate::item::{ItemFlags, ItemId, NetNo, TreeEntry, TreeItem, shares_net};
use crate::tree::{BoundTree, LeafId};

#[derive(Clone, Debug)]
pub(crate) struct StoredShape {
    pub(crate) layer: usize,
    pub(crate) tile: Tile,
    pub(crate) is_octagon: bool,
    leaf: LeafId,
}

#[derive(Clone, Debug)]
pub(crate) struct ObjectEntry {
    pub(crate) nets: Vec<NetNo>,
    pub(crate) class: usize,
    pub(crate) flags: ItemFlags,
    pub(crate) shapes: Vec<StoredShape>,
}

/// Spatial index over the tiles of board items.
///
/// A tree is created for one compensation class. Class `0` stores the raw
/// item tiles. A positive class stores every tile grown by
/// [`ShapeSearchTree::clearance_compensation_value`], so a caller whose own
/// query shape is grown by the same function for its class only needs a plain
/// intersection test to detect a clearance violation.
#[derive(Clone, Debug)]
pub struct ShapeSearchTree {
    compensation_class: usize,
    clearance: ClearanceMatrix,
    tree: BoundTree<TreeEntry>,
    objects: Vec<Option<ObjectEntry>>,
    object_count: usize,
}

impl ShapeSearchTree {
    /// Create an empty tree for `compensation_class`.
    pub fn new(compensation_class: usize, clearance: ClearanceMatrix) -> Self {
        Self {
            compensation_class,
            clearance,
            tree: BoundTree::new(),
            objects: Vec::new(),
            object_count: 0,
        }
    }

    /// Clearance class the stored shapes are grown for; `0` means raw shapes.
    pub fn compensation_class(&self) -> usize {
        self.compensation_class
    }

    /// True if stored shapes are grown by a clearance.
    pub fn is_compensated(&self) -> bool {
        self.compensation_class > 0
    }

    /// The clearance rules the stored shapes were computed with.
    pub fn clearance_matrix(&self) -> &ClearanceMatrix {
        &self.clearance
    }

    /// Amount by which a tile of `class` on `layer` is grown in this tree.
    ///
    /// Half the clearance between `class` and the tree's class; zero for a raw
    /// tree.
    pub fn clearance_compensation_value(&self, class: usize, layer: usize) -> f64 {
        if self.compensation_class == 0 {
            0.0
        } else {
            0.5 * self.clearance.value(class, self.compensation_class, layer)
        }
    }

    /// Number of stored items.
    pub fn item_count(&self) -> usize {
        self.object_count
    }

    /// Number of stored tiles (tree leaves).
    pub fn leaf_count(&self) -> usize {
        self.tree.len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// True if `item` is stored.
    pub fn contains(&self, item: ItemId) -> bool {
        self.object(item).is_some()
    }

    pub(crate) fn object(&self, item: ItemId) -> Option<&ObjectEntry> {
        self.objects.get(item.idx())?.as_ref()
    }

    /// Stored (possibly grown) tile of one item shape.
    pub fn tree_shape(&self, entry: TreeEntry) -> Option<&Tile> {
        self.object(entry.item)?
            .shapes
            .get(entry.shape_index)
            .map(|s| &s.tile)
    }

    /// Layer of one item shape.
    pub fn shape_layer(&self, entry: TreeEntry) -> Option<usize> {
        self.object(entry.item)?
            .shapes
            .get(entry.shape_index)
            .map(|s| s.layer)
    }

    /// Bound of everything stored.
    pub fn bounds(&self) -> Octagon {
        self.tree.root_bounds()
    }

    fn validate(&self, item: &TreeItem) -> Result<(), IndexError> {
        if self.contains(item.id) {
            return Err(IndexError::DuplicateItem(item.id));
        }
        if item.shapes.is_empty() {
            return Err(IndexError::EmptyItem(item.id));
        }
        let class_count = self.clearance.class_count();
        if item.clearance_class >= class_count {
            return Err(IndexError::ClassOutOfRange {
                class: item.clearance_class,
                class_count,
            });
        }
        let layer_count = self.clearance.layer_count();
        for (shape_index, shape) in item.shapes.iter().enumerate() {
            if shape.layer >= layer_count {
                return Err(IndexError::LayerOutOfRange {
                    layer: shape.layer,
                    layer_count,
                });
            }
            if shape.tile.is_empty() {
                return Err(IndexError::MalformedShape {
                    item: item.id,
                    shape_index,
                });
            }
        }
        Ok(())
    }

    /// Store every shape of `item`.
    ///
    /// Malformed items are logged and leave the tree unchanged.
    pub fn insert(&mut self, item: &TreeItem) -> Result<(), IndexError> {
        if let Err(e) = self.validate(item) {
            log::warn!("refusing to index item: {e}");
            return Err(e);
        }
        let mut shapes = Vec::with_capacity(item.shapes.len());
        for (shape_index, shape) in item.shapes.iter().enumerate() {
            let offset = self.clearance_compensation_value(item.clearance_class, shape.layer);
            let tile = shape.tile.offset(offset);
            let leaf = self.tree.insert(
                tile.bounding_octagon(),
                TreeEntry {
                    item: item.id,
                    shape_index,
                },
            );
            shapes.push(StoredShape {
                layer: shape.layer,
                is_octagon: tile.is_octagon(),
                tile,
                leaf,
            });
        }
        let slot = item.id.idx();
        if self.objects.len() <= slot {
            self.objects.resize_with(slot + 1, || None);
        }
        self.objects[slot] = Some(ObjectEntry {
            nets: item.nets.clone(),
            class: item.clearance_class,
            flags: item.flags,
            shapes,
        });
        self.object_count += 1;
        Ok(())
    }

    /// Remove every shape of `item`. Returns false if it was not stored.
    pub fn remove(&mut self, item: ItemId) -> bool {
        let Some(entry) = self.objects.get_mut(item.idx()).and_then(Option::take) else {
            return false;
        };
        for shape in &entry.shapes {
            if self.tree.remove(shape.leaf).is_none() {
                log::error!("leaf of {item:?} was missing from the tree");
            }
        }
        self.object_count -= 1;
        true
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.objects.clear();
        self.object_count = 0;
    }

    fn candidates(
        &self,
        region: &Octagon,
        layer: Option<usize>,
        ignore_nets: &[NetNo],
    ) -> Vec<(TreeEntry, &ObjectEntry, &StoredShape)> {
        self.tree
            .overlapping(region)
            .into_iter()
            .filter_map(|(_, entry)| {
                let object = self.object(entry.item)?;
                let shape = object.shapes.get(entry.shape_index)?;
                let off_layer = layer.is_some_and(|l| l != shape.layer);
                if off_layer || shares_net(&object.nets, ignore_nets) {
                    return None;
                }
                Some((entry, object, shape))
            })
            .collect()
    }

    /// Stored shapes intersecting `shape`, skipping items on `ignore_nets`.
    ///
    /// `layer` of `None` searches all layers. The exact tile test is skipped
    /// when both tiles are octagons, because the bound test was already exact.
    pub fn find_overlap_tree_entries(
        &self,
        shape: &Tile,
        layer: Option<usize>,
        ignore_nets: &[NetNo],
    ) -> Vec<TreeEntry> {
        if shape.is_empty() {
            return Vec::new();
        }
        let query_is_octagon = shape.is_octagon();
        let mut out: Vec<TreeEntry> = self
            .candidates(&shape.bounding_octagon(), layer, ignore_nets)
            .into_iter()
            .filter(|(_, _, stored)| {
                (query_is_octagon && stored.is_octagon) || stored.tile.intersects(shape)
            })
            .map(|(entry, _, _)| entry)
            .collect();
        out.sort_unstable();
        out
    }

    /// Items with a stored shape intersecting `shape`.
    pub fn find_overlap_objects(
        &self,
        shape: &Tile,
        layer: Option<usize>,
        ignore_nets: &[NetNo],
    ) -> BTreeSet<ItemId> {
        self.find_overlap_tree_entries(shape, layer, ignore_nets)
            .into_iter()
            .map(|e| e.item)
            .collect()
    }

    /// Stored shapes closer to `shape` than the clearance `class` requires.
    ///
    /// In a compensated tree `shape` must already be grown by
    /// [`ShapeSearchTree::clearance_compensation_value`] for its class and the
    /// query is a plain intersection test. In a raw tree the candidates of the
    /// region grown by the class's worst clearance are sorted by their actual
    /// clearance and swept in buckets, growing `shape` once per bucket.
    pub fn find_overlap_tree_entries_with_clearance(
        &self,
        shape: &Tile,
        layer: Option<usize>,
        ignore_nets: &[NetNo],
        class: usize,
    ) -> Vec<TreeEntry> {
        if shape.is_empty() {
            return Vec::new();
        }
        if self.is_compensated() {
            return self.find_overlap_tree_entries(shape, layer, ignore_nets);
        }
        let worst = match layer {
            Some(l) => self.clearance.max_value(class, l),
            None => (0..self.clearance.layer_count())
                .map(|l| self.clearance.max_value(class, l))
                .fold(0.0, f64::max),
        };
        let region = shape.bounding_octagon().enlarge(worst);
        let mut candidates: Vec<(f64, TreeEntry, &StoredShape)> = self
            .candidates(&region, layer, ignore_nets)
            .into_iter()
            .map(|(entry, object, stored)| {
                (self.clearance.value(class, object.class, stored.layer), entry, stored)
            })
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut out = Vec::new();
        let mut bucket_clearance = f64::NEG_INFINITY;
        let mut grown = shape.clone();
        let mut grown_bounds = shape.bounding_octagon();
        for (clearance, entry, stored) in candidates {
            if clearance > bucket_clearance {
                bucket_clearance = clearance;
                grown = shape.offset(clearance);
                grown_bounds = grown.bounding_octagon();
            }
            let stored_bounds = stored.tile.bounding_octagon();
            if !grown_bounds.intersects(&stored_bounds) {
                continue;
            }
            if (stored.is_octagon && grown.is_octagon()) || stored.tile.intersects(&grown) {
                out.push(entry);
            }
        }
        out.sort_unstable();
        out
    }

    /// Items violating the clearance of `class` around `shape`.
    pub fn find_overlap_objects_with_clearance(
        &self,
        shape: &Tile,
        layer: Option<usize>,
        ignore_nets: &[NetNo],
        class: usize,
    ) -> BTreeSet<ItemId> {
        self.find_overlap_tree_entries_with_clearance(shape, layer, ignore_nets, class)
            .into_iter()
            .map(|e| e.item)
            .collect()
    }

    /// Nets, clearance class and flags of a stored item.
    pub fn item_info(&self, item: ItemId) -> Option<(&[NetNo], usize, ItemFlags)> {
        self.object(item)
            .map(|o| (o.nets.as_slice(), o.class, o.flags))
    }

    /// Verify the underlying tree and the mirror array against it.
    pub fn check_invariants(&self) -> Result<(), IndexError> {
        self.tree.check_invariants()?;
        let mut leaves = 0;
        for (slot, object) in self.objects.iter().enumerate() {
            let Some(object) = object else { continue };
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Slots were created from 32-bit item ids."
            )]
            let item = ItemId(slot as u32);
            for (shape_index, shape) in object.shapes.iter().enumerate() {
                leaves += 1;
                let expected = TreeEntry { item, shape_index };
                if self.tree.payload(shape.leaf) != Some(expected) {
                    return Err(IndexError::InconsistentNode {
                        node: slot,
                        reason: "mirror leaf does not point back at its shape",
                    });
                }
            }
        }
        if leaves != self.tree.len() {
            return Err(IndexError::LeafCountMismatch {
                stored: self.tree.len(),
                reachable: leaves,
            });
        }
        Ok(())
    }
}
