// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The priority frontier of proposed moves.

use core::cmp::Ordering;
use std::collections::BinaryHeap;

use kurbo::Line;

use crate::graph::{DoorId, DrillId, DrillPageId, RoomId, TargetDoorId};

/// Something a move can cross into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expandable {
    /// A door into a start or destination item.
    Target(TargetDoorId),
    /// A door between two rooms.
    Door(DoorId),
    /// A via location; sections are layers.
    Drill(DrillId),
    /// A bucket of drills, expanded lazily and never occupied.
    DrillPage(DrillPageId),
}

/// Side a trace was shoved to on the way into a section.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Adjustment {
    /// No shove.
    #[default]
    None,
    /// Shoved to the left of the entry direction.
    Left,
    /// Shoved to the right of the entry direction.
    Right,
}

/// A proposed move into one section.
#[derive(Clone, Debug, PartialEq)]
pub struct FrontierElement {
    /// What the move crosses.
    pub target: Expandable,
    /// Section of the target.
    pub section: usize,
    /// The section the move comes from.
    pub backtrack: Option<(Expandable, usize)>,
    /// Accumulated cost.
    pub cost: f64,
    /// `cost` plus the lower bound to the nearest destination.
    pub sort_key: f64,
    /// Room entered by the move.
    pub next_room: Option<RoomId>,
    /// Where the move crosses the target.
    pub entry: Line,
    /// The move pays for ripping the room it leaves.
    pub room_ripped: bool,
    /// Shove side taken by the move.
    pub adjustment: Adjustment,
    /// Entry into an obstacle room was already priced.
    pub already_checked: bool,
    /// Accumulated ripup cost, a part of `cost`.
    pub ripup_cost: f64,
}

#[derive(Debug)]
struct Queued {
    element: FrontierElement,
    seq: u64,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: the heap pops the smallest key, older first on ties.
        other
            .element
            .sort_key
            .total_cmp(&self.element.sort_key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-priority queue of [`FrontierElement`]s.
///
/// Elements with equal keys are all kept and come out in insertion order.
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<Queued>,
    next_seq: u64,
}

impl Frontier {
    /// Empty frontier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a proposal.
    pub fn push(&mut self, element: FrontierElement) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Queued { element, seq });
    }

    /// Take the cheapest proposal.
    pub fn pop(&mut self) -> Option<FrontierElement> {
        self.heap.pop().map(|q| q.element)
    }

    /// Pending proposals.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
