// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index error type.

use thiserror::Error;

use crate::item::ItemId;

/// Reasons an index operation was refused or an invariant check failed.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum IndexError {
    /// The item carries no shapes.
    #[error("item {0:?} has no shapes")]
    EmptyItem(ItemId),
    /// A shape is empty (which includes non-finite input).
    #[error("item {item:?} shape {shape_index} is empty or unbounded")]
    MalformedShape {
        /// Offending item.
        item: ItemId,
        /// Position of the shape within the item.
        shape_index: usize,
    },
    /// The item is already stored.
    #[error("item {0:?} is already indexed")]
    DuplicateItem(ItemId),
    /// A shape names a layer the clearance matrix does not know.
    #[error("layer {layer} is out of range for {layer_count} layers")]
    LayerOutOfRange {
        /// Requested layer.
        layer: usize,
        /// Layers known to the clearance matrix.
        layer_count: usize,
    },
    /// A clearance class the matrix does not know.
    #[error("clearance class {class} is out of range for {class_count} classes")]
    ClassOutOfRange {
        /// Requested class.
        class: usize,
        /// Classes known to the clearance matrix.
        class_count: usize,
    },
    /// A tree node disagrees with its parent or children.
    #[error("tree node {node} is inconsistent: {reason}")]
    InconsistentNode {
        /// Arena slot of the node.
        node: usize,
        /// What was wrong.
        reason: &'static str,
    },
    /// The stored leaf count differs from the leaves reachable from the root.
    #[error("leaf count {stored} does not match {reachable} reachable leaves")]
    LeafCountMismatch {
        /// Counter value.
        stored: usize,
        /// Leaves found by walking the tree.
        reachable: usize,
    },
}
