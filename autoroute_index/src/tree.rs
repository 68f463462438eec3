// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena-backed binary bounding tree with area-minimizing insertion.
//!
//! Forks cache the union of their children's [`Octagon`] bounds. Insertion
//! descends toward the child whose bound grows least and widens every fork
//! on the way down. Removal splices the sibling into the parent's place and
//! shrinks ancestors only while their bound actually changes.

use core::fmt::Debug;

use autoroute_geom::Octagon;

use crate::error::IndexError;

/// Stable handle of a leaf. Stays valid until the leaf is removed.
///
/// Handles carry the generation of their arena slot, so a handle kept past
/// removal never resolves to a later leaf that reuses the slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeafId {
    idx: u32,
    generation: u32,
}

impl LeafId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Leaf handles are 32-bit; trees beyond u32::MAX nodes are not supported."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self {
            idx: idx as u32,
            generation,
        }
    }

    const fn idx(self) -> usize {
        self.idx as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct NodeIdx(usize);

impl NodeIdx {
    const fn get(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug)]
enum Kind<P: Copy> {
    Leaf(P),
    Fork { first: NodeIdx, second: NodeIdx },
    Free,
}

#[derive(Copy, Clone, Debug)]
struct Node<P: Copy> {
    bounds: Octagon,
    parent: Option<NodeIdx>,
    kind: Kind<P>,
    /// Bumped each time the slot is reused.
    generation: u32,
}

/// Dynamic bounding tree over payloads of type `P`.
#[derive(Clone)]
pub struct BoundTree<P: Copy + Debug> {
    root: Option<NodeIdx>,
    arena: Vec<Node<P>>,
    free_list: Vec<usize>,
    leaf_count: usize,
}

impl<P: Copy + Debug> Default for BoundTree<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Copy + Debug> Debug for BoundTree<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoundTree")
            .field("leaf_count", &self.leaf_count)
            .field("nodes_total", &self.arena.len())
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

fn growth(bounds: &Octagon, added: &Octagon) -> f64 {
    bounds.union(added).area() - bounds.area()
}

impl<P: Copy + Debug> BoundTree<P> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            root: None,
            arena: Vec::new(),
            free_list: Vec::new(),
            leaf_count: 0,
        }
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    /// True if the tree holds no leaves.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Bound of the whole tree; [`Octagon::EMPTY`] when empty.
    pub fn root_bounds(&self) -> Octagon {
        self.root
            .map_or(Octagon::EMPTY, |r| self.arena[r.get()].bounds)
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.root = None;
        self.arena.clear();
        self.free_list.clear();
        self.leaf_count = 0;
    }

    fn alloc(&mut self, mut node: Node<P>) -> NodeIdx {
        if let Some(i) = self.free_list.pop() {
            node.generation = self.arena[i].generation.wrapping_add(1);
            self.arena[i] = node;
            NodeIdx(i)
        } else {
            self.arena.push(node);
            NodeIdx(self.arena.len() - 1)
        }
    }

    fn release(&mut self, idx: NodeIdx) {
        let generation = self.arena[idx.get()].generation;
        self.arena[idx.get()] = Node {
            bounds: Octagon::EMPTY,
            parent: None,
            kind: Kind::Free,
            generation,
        };
        self.free_list.push(idx.get());
    }

    fn handle(&self, idx: NodeIdx) -> LeafId {
        LeafId::new(idx.get(), self.arena[idx.get()].generation)
    }

    /// The live leaf node behind `leaf`.
    fn leaf_node(&self, leaf: LeafId) -> Option<&Node<P>> {
        self.arena
            .get(leaf.idx())
            .filter(|n| n.generation == leaf.generation && matches!(n.kind, Kind::Leaf(_)))
    }

    /// Point `parent`'s slot holding `old` (or the root) at `new`.
    fn replace_child(&mut self, parent: Option<NodeIdx>, old: NodeIdx, new: NodeIdx) {
        let Some(p) = parent else {
            self.root = Some(new);
            return;
        };
        match &mut self.arena[p.get()].kind {
            Kind::Fork { first, .. } if *first == old => *first = new,
            Kind::Fork { second, .. } if *second == old => *second = new,
            _ => log::error!("node {} is not a child of {}", old.get(), p.get()),
        }
    }

    /// Insert a leaf with `bounds` and return its handle.
    pub fn insert(&mut self, bounds: Octagon, payload: P) -> LeafId {
        let leaf = self.alloc(Node {
            bounds,
            parent: None,
            kind: Kind::Leaf(payload),
            generation: 0,
        });
        self.leaf_count += 1;
        let Some(mut cur) = self.root else {
            self.root = Some(leaf);
            return self.handle(leaf);
        };
        loop {
            match self.arena[cur.get()].kind {
                Kind::Fork { first, second } => {
                    let widened = self.arena[cur.get()].bounds.union(&bounds);
                    self.arena[cur.get()].bounds = widened;
                    let g1 = growth(&self.arena[first.get()].bounds, &bounds);
                    let g2 = growth(&self.arena[second.get()].bounds, &bounds);
                    cur = if g1 <= g2 { first } else { second };
                }
                Kind::Leaf(_) => {
                    self.split_leaf(cur, leaf);
                    return self.handle(leaf);
                }
                Kind::Free => {
                    log::error!(
                        "insert descended into freed node {}; attaching at the root",
                        cur.get()
                    );
                    if let Some(root) = self.root {
                        self.split_leaf(root, leaf);
                    }
                    return self.handle(leaf);
                }
            }
        }
    }

    /// Replace `at` by a fork holding `at` and `leaf`.
    fn split_leaf(&mut self, at: NodeIdx, leaf: NodeIdx) {
        let parent = self.arena[at.get()].parent;
        let bounds = self.arena[at.get()]
            .bounds
            .union(&self.arena[leaf.get()].bounds);
        let fork = self.alloc(Node {
            bounds,
            parent,
            kind: Kind::Fork {
                first: at,
                second: leaf,
            },
            generation: 0,
        });
        self.arena[at.get()].parent = Some(fork);
        self.arena[leaf.get()].parent = Some(fork);
        self.replace_child(parent, at, fork);
    }

    /// Remove a leaf and return its payload.
    ///
    /// Returns `None` for unknown or stale handles and for leaves whose
    /// parent does not list them; the latter is logged as an invariant
    /// violation.
    pub fn remove(&mut self, leaf: LeafId) -> Option<P> {
        let idx = NodeIdx(leaf.idx());
        let node = *self.leaf_node(leaf)?;
        let Kind::Leaf(payload) = node.kind else {
            return None;
        };
        match node.parent {
            None => {
                if self.root != Some(idx) {
                    log::error!("detached leaf {} is not the root", idx.get());
                    return None;
                }
                self.root = None;
            }
            Some(parent) => {
                let Kind::Fork { first, second } = self.arena[parent.get()].kind else {
                    log::error!("parent {} of leaf {} is not a fork", parent.get(), idx.get());
                    return None;
                };
                let sibling = if first == idx {
                    second
                } else if second == idx {
                    first
                } else {
                    log::error!("leaf {} is missing from its parent's child slots", idx.get());
                    return None;
                };
                let grand = self.arena[parent.get()].parent;
                self.arena[sibling.get()].parent = grand;
                self.replace_child(grand, parent, sibling);
                self.release(parent);
                self.shrink_ancestors(grand);
            }
        }
        self.release(idx);
        self.leaf_count -= 1;
        Some(payload)
    }

    /// Recompute fork bounds upward, stopping at the first unchanged bound.
    fn shrink_ancestors(&mut self, mut cur: Option<NodeIdx>) {
        while let Some(c) = cur {
            let Kind::Fork { first, second } = self.arena[c.get()].kind else {
                log::error!("ancestor {} is not a fork", c.get());
                return;
            };
            let recalculated = self.arena[first.get()]
                .bounds
                .union(&self.arena[second.get()].bounds);
            let previous = self.arena[c.get()].bounds;
            self.arena[c.get()].bounds = recalculated;
            if recalculated.contains(&previous) {
                return;
            }
            cur = self.arena[c.get()].parent;
        }
    }

    /// Payload stored at `leaf`.
    pub fn payload(&self, leaf: LeafId) -> Option<P> {
        match self.leaf_node(leaf)?.kind {
            Kind::Leaf(p) => Some(p),
            _ => None,
        }
    }

    /// Bound stored at `leaf`.
    pub fn bounds(&self, leaf: LeafId) -> Option<Octagon> {
        self.leaf_node(leaf).map(|node| node.bounds)
    }

    /// Leaves whose bound intersects `region`, with their payloads.
    pub fn overlapping(&self, region: &Octagon) -> Vec<(LeafId, P)> {
        let mut out = Vec::new();
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            let node = &self.arena[n.get()];
            if !node.bounds.intersects(region) {
                continue;
            }
            match node.kind {
                Kind::Leaf(p) => out.push((LeafId::new(n.get(), node.generation), p)),
                Kind::Fork { first, second } => {
                    stack.push(second);
                    stack.push(first);
                }
                Kind::Free => log::error!("query reached freed node {}", n.get()),
            }
        }
        out
    }

    /// Length of the longest root-to-leaf path; zero when empty.
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut deepest = 0;
        let mut stack = vec![(root, 1_usize)];
        while let Some((n, d)) = stack.pop() {
            deepest = deepest.max(d);
            if let Kind::Fork { first, second } = self.arena[n.get()].kind {
                stack.push((first, d + 1));
                stack.push((second, d + 1));
            }
        }
        deepest
    }

    /// Verify parent links, fork bound containment and the leaf count.
    pub fn check_invariants(&self) -> Result<(), IndexError> {
        let Some(root) = self.root else {
            return if self.leaf_count == 0 {
                Ok(())
            } else {
                Err(IndexError::LeafCountMismatch {
                    stored: self.leaf_count,
                    reachable: 0,
                })
            };
        };
        if self.arena[root.get()].parent.is_some() {
            return Err(IndexError::InconsistentNode {
                node: root.get(),
                reason: "root has a parent",
            });
        }
        let mut leaves = 0;
        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            let node = &self.arena[n.get()];
            match node.kind {
                Kind::Leaf(_) => leaves += 1,
                Kind::Free => {
                    return Err(IndexError::InconsistentNode {
                        node: n.get(),
                        reason: "freed node is reachable",
                    });
                }
                Kind::Fork { first, second } => {
                    for child in [first, second] {
                        if self.arena[child.get()].parent != Some(n) {
                            return Err(IndexError::InconsistentNode {
                                node: child.get(),
                                reason: "parent link does not match",
                            });
                        }
                    }
                    let children = self.arena[first.get()]
                        .bounds
                        .union(&self.arena[second.get()].bounds);
                    if !node.bounds.contains(&children) {
                        return Err(IndexError::InconsistentNode {
                            node: n.get(),
                            reason: "fork bound does not contain its children",
                        });
                    }
                    stack.push(first);
                    stack.push(second);
                }
            }
        }
        if leaves == self.leaf_count {
            Ok(())
        } else {
            Err(IndexError::LeafCountMismatch {
                stored: self.leaf_count,
                reachable: leaves,
            })
        }
    }
}
