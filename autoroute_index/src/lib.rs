// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Autoroute Index: a min-area bounding tree over board item shapes.
//!
//! The index answers "which items does this shape touch" and "which items
//! does this shape come too close to" for the router and the board editor.
//!
//! - [`BoundTree`] is the tree itself: an arena of forks and leaves bounded by
//!   [`Octagon`](autoroute_geom::Octagon)s. Inserts descend toward the child
//!   whose bound grows least; removals shrink ancestors only as far as needed.
//! - [`ShapeSearchTree`] stores the [`Tile`](autoroute_geom::Tile)s of
//!   [`TreeItem`]s, optionally grown by half the clearance of one class so
//!   clearance queries become plain intersection tests.
//! - [`ShapeSearchTree::complete_shape`] carves obstacle-free rooms out of
//!   free space for the maze search.
//! - [`IndexManager`] owns the item table and one tree per compensation
//!   class, built lazily.
//!
//! # Example
//!
//! ```rust
//! use autoroute_geom::Tile;
//! use autoroute_index::{ClearanceMatrix, IndexManager, ItemFlags, ItemId, LayerShape, TreeItem};
//! use kurbo::{Point, Rect};
//!
//! // One clearance class besides the null class, 0.5 apart on one layer.
//! let mut manager = IndexManager::new(ClearanceMatrix::uniform(2, 1, 0.5));
//! manager
//!     .insert(TreeItem {
//!         id: ItemId(0),
//!         nets: vec![7],
//!         clearance_class: 1,
//!         flags: ItemFlags::default(),
//!         shapes: vec![LayerShape {
//!             layer: 0,
//!             tile: Tile::from_rect(Rect::new(0.0, 0.0, 10.0, 1.0)),
//!         }],
//!     })
//!     .unwrap();
//!
//! // A trace end 0.9 units above the item, half width 0.5, is too close.
//! let tree = manager.autoroute_tree(1);
//! let grow = 0.5 + tree.clearance_compensation_value(1, 0);
//! let query = Tile::point(Point::new(5.0, 1.9)).offset(grow);
//! let hits = tree.find_overlap_objects_with_clearance(&query, Some(0), &[], 1);
//! assert!(hits.contains(&ItemId(0)));
//!
//! // Items on the query's own net never count.
//! assert!(tree.find_overlap_objects_with_clearance(&query, Some(0), &[7], 1).is_empty());
//! ```

pub mod carve;
pub mod clearance;
pub mod error;
pub mod item;
pub mod manager;
pub mod search_tree;
pub mod tree;

pub use carve::{CarveSettings, CarvedRoom};
pub use clearance::ClearanceMatrix;
pub use error::IndexError;
pub use item::{ItemFlags, ItemId, LayerShape, NetNo, TreeEntry, TreeItem};
pub use manager::IndexManager;
pub use search_tree::ShapeSearchTree;
pub use tree::{BoundTree, LeafId};
