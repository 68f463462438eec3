// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One search tree per clearance-compensation class.

use std::collections::BTreeMap;

use crate::clearance::ClearanceMatrix;
use crate::error::IndexError;
use crate::item::{ItemId, TreeItem};
use crate::search_tree::ShapeSearchTree;

/// The board's item table together with the search trees built over it.
///
/// The default tree always exists and is kept in step with every edit.
/// Autoroute trees are built on first request for a clearance class and are
/// then kept in step as well, until dropped with
/// [`IndexManager::clear_autoroute_trees`].
#[derive(Clone, Debug)]
pub struct IndexManager {
    clearance: ClearanceMatrix,
    items: BTreeMap<ItemId, TreeItem>,
    default_tree: ShapeSearchTree,
    autoroute_trees: BTreeMap<usize, ShapeSearchTree>,
}

impl IndexManager {
    /// Empty manager with a raw default tree.
    pub fn new(clearance: ClearanceMatrix) -> Self {
        Self {
            default_tree: ShapeSearchTree::new(0, clearance.clone()),
            clearance,
            items: BTreeMap::new(),
            autoroute_trees: BTreeMap::new(),
        }
    }

    /// The clearance rules in force.
    pub fn clearance_matrix(&self) -> &ClearanceMatrix {
        &self.clearance
    }

    /// Add `item` to the table and to every tree.
    ///
    /// On error nothing changes.
    pub fn insert(&mut self, item: TreeItem) -> Result<(), IndexError> {
        if self.items.contains_key(&item.id) {
            log::warn!("refusing to index item: {}", IndexError::DuplicateItem(item.id));
            return Err(IndexError::DuplicateItem(item.id));
        }
        self.default_tree.insert(&item)?;
        for tree in self.autoroute_trees.values_mut() {
            // The default tree accepted the item, so the others accept it too.
            if let Err(e) = tree.insert(&item) {
                log::error!(
                    "autoroute tree {} disagrees with the default tree: {e}",
                    tree.compensation_class()
                );
            }
        }
        self.items.insert(item.id, item);
        Ok(())
    }

    /// Remove an item from the table and from every tree.
    pub fn remove(&mut self, id: ItemId) -> Option<TreeItem> {
        let item = self.items.remove(&id)?;
        self.default_tree.remove(id);
        for tree in self.autoroute_trees.values_mut() {
            tree.remove(id);
        }
        Some(item)
    }

    /// Replace a stored item with a new version carrying the same id.
    ///
    /// If the new version is refused, the old one is put back.
    pub fn update(&mut self, item: TreeItem) -> Result<(), IndexError> {
        let previous = self.remove(item.id);
        match self.insert(item) {
            Ok(()) => Ok(()),
            Err(e) => {
                if let Some(previous) = previous {
                    self.insert(previous)?;
                }
                Err(e)
            }
        }
    }

    /// Look up a stored item.
    pub fn item(&self, id: ItemId) -> Option<&TreeItem> {
        self.items.get(&id)
    }

    /// All stored items in id order.
    pub fn items(&self) -> impl Iterator<Item = &TreeItem> + '_ {
        self.items.values()
    }

    /// The tree used for interactive editing checks.
    pub fn default_tree(&self) -> &ShapeSearchTree {
        &self.default_tree
    }

    /// Tree whose shapes are compensated for `class`, built on first use.
    ///
    /// When `class` is the default tree's class, the default tree is returned.
    pub fn autoroute_tree(&mut self, class: usize) -> &ShapeSearchTree {
        if class == self.default_tree.compensation_class() {
            return &self.default_tree;
        }
        let Self {
            clearance,
            items,
            autoroute_trees,
            ..
        } = self;
        autoroute_trees.entry(class).or_insert_with(|| {
            log::debug!("building autoroute tree for class {class} over {} items", items.len());
            build_tree(class, clearance, items)
        })
    }

    /// Tree for `class` if it exists already.
    pub fn autoroute_tree_if_built(&self, class: usize) -> Option<&ShapeSearchTree> {
        if class == self.default_tree.compensation_class() {
            return Some(&self.default_tree);
        }
        self.autoroute_trees.get(&class)
    }

    /// Number of autoroute trees currently kept.
    pub fn autoroute_tree_count(&self) -> usize {
        self.autoroute_trees.len()
    }

    /// Install new clearance rules and rebuild every tree.
    ///
    /// Refused, with nothing changed, when a stored item names a class or a
    /// layer the new rules do not know.
    pub fn set_clearance_matrix(&mut self, clearance: ClearanceMatrix) -> Result<(), IndexError> {
        if let Err(e) = fits(&clearance, &self.items) {
            log::warn!("keeping the previous clearance rules: {e}");
            return Err(e);
        }
        self.clearance = clearance;
        let default_class = self.default_tree.compensation_class();
        self.default_tree = build_tree(default_class, &self.clearance, &self.items);
        for (class, tree) in &mut self.autoroute_trees {
            *tree = build_tree(*class, &self.clearance, &self.items);
        }
        Ok(())
    }

    /// Switch the default tree between raw shapes (`None`) and shapes
    /// compensated for `class`, rebuilding it.
    pub fn set_clearance_compensation(&mut self, class: Option<usize>) {
        let class = class.unwrap_or(0);
        if class == self.default_tree.compensation_class() {
            return;
        }
        self.default_tree = build_tree(class, &self.clearance, &self.items);
        self.autoroute_trees.remove(&class);
    }

    /// Drop every autoroute tree, typically when an autoroute pass ends.
    pub fn clear_autoroute_trees(&mut self) {
        self.autoroute_trees.clear();
    }
}

/// Check that every stored item stays within the classes and layers of
/// `clearance`.
fn fits(clearance: &ClearanceMatrix, items: &BTreeMap<ItemId, TreeItem>) -> Result<(), IndexError> {
    let (class_count, layer_count) = (clearance.class_count(), clearance.layer_count());
    for item in items.values() {
        if item.clearance_class >= class_count {
            return Err(IndexError::ClassOutOfRange {
                class: item.clearance_class,
                class_count,
            });
        }
        if let Some(shape) = item.shapes.iter().find(|s| s.layer >= layer_count) {
            return Err(IndexError::LayerOutOfRange {
                layer: shape.layer,
                layer_count,
            });
        }
    }
    Ok(())
}

fn build_tree(
    class: usize,
    clearance: &ClearanceMatrix,
    items: &BTreeMap<ItemId, TreeItem>,
) -> ShapeSearchTree {
    let mut tree = ShapeSearchTree::new(class, clearance.clone());
    for item in items.values() {
        if let Err(e) = tree.insert(item) {
            log::warn!("item {:?} dropped from tree of class {class}: {e}", item.id);
        }
    }
    tree
}
