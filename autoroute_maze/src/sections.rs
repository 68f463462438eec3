// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visited state of every door and drill section.

use kurbo::Line;

use crate::frontier::{Adjustment, Expandable};
use crate::graph::{RoomId, RouteGraph};

/// What the search settled for one section.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SectionRecord {
    /// The section has been settled.
    pub occupied: bool,
    /// Section the winning move came from.
    pub backtrack: Option<(Expandable, usize)>,
    /// The winning move paid for ripping the room it left.
    pub room_ripped: bool,
    /// Shove side of the winning move.
    pub adjustment: Adjustment,
    /// Crossing of the winning move.
    pub entry: Option<Line>,
    /// Room the winning move entered.
    pub room: Option<RoomId>,
}

/// One record per section, addressed by `(target, section)`.
#[derive(Clone, Debug)]
pub struct SectionStates {
    door_offsets: Vec<usize>,
    target_offset: usize,
    target_count: usize,
    drill_offsets: Vec<usize>,
    records: Vec<SectionRecord>,
}

impl SectionStates {
    /// Unoccupied records for every section of `graph`.
    pub fn new(graph: &RouteGraph) -> Self {
        let mut next = 0;
        let mut door_offsets = Vec::with_capacity(graph.door_count() + 1);
        for (_, door) in graph.doors() {
            door_offsets.push(next);
            next += door.section_count();
        }
        door_offsets.push(next);
        let target_offset = next;
        next += graph.target_door_count();
        let mut drill_offsets = Vec::with_capacity(graph.drill_count() + 1);
        for (_, drill) in graph.drills() {
            drill_offsets.push(next);
            next += drill.section_count();
        }
        drill_offsets.push(next);
        Self {
            door_offsets,
            target_offset,
            target_count: graph.target_door_count(),
            drill_offsets,
            records: vec![SectionRecord::default(); next],
        }
    }

    fn slot(&self, target: Expandable, section: usize) -> Option<usize> {
        let (start, end) = match target {
            Expandable::Door(d) => (
                *self.door_offsets.get(d.idx())?,
                *self.door_offsets.get(d.idx() + 1)?,
            ),
            Expandable::Drill(d) => (
                *self.drill_offsets.get(d.idx())?,
                *self.drill_offsets.get(d.idx() + 1)?,
            ),
            Expandable::Target(t) => {
                if t.idx() >= self.target_count {
                    return None;
                }
                let start = self.target_offset + t.idx();
                (start, start + 1)
            }
            Expandable::DrillPage(_) => return None,
        };
        let slot = start + section;
        (slot < end && slot < self.records.len()).then_some(slot)
    }

    /// Record of a section; `None` for drill pages and out-of-range sections.
    pub fn get(&self, target: Expandable, section: usize) -> Option<&SectionRecord> {
        self.records.get(self.slot(target, section)?)
    }

    /// Mutable record of a section.
    pub fn get_mut(&mut self, target: Expandable, section: usize) -> Option<&mut SectionRecord> {
        let slot = self.slot(target, section)?;
        self.records.get_mut(slot)
    }

    /// True if the section is settled.
    pub fn is_occupied(&self, target: Expandable, section: usize) -> bool {
        self.get(target, section).is_some_and(|r| r.occupied)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the graph has no sections.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
