// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-session search parameters.

use core::f64::consts::SQRT_2;

use autoroute_index::NetNo;
use kurbo::Point;

/// Cost per unit of trace length on one layer, by direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TraceCost {
    /// Horizontal runs.
    pub horizontal: f64,
    /// Vertical runs.
    pub vertical: f64,
    /// 45 degree runs, per unit of diagonal length.
    pub diagonal: f64,
}

impl Default for TraceCost {
    fn default() -> Self {
        Self {
            horizontal: 1.0,
            vertical: 1.0,
            diagonal: 1.0,
        }
    }
}

impl TraceCost {
    /// Smallest of the three weights.
    pub fn min_factor(&self) -> f64 {
        self.horizontal.min(self.vertical).min(self.diagonal)
    }

    /// Cost of running from `from` to `to`.
    ///
    /// The move is decomposed into a diagonal part and an axis-parallel rest.
    pub fn weighted_distance(&self, from: Point, to: Point) -> f64 {
        let dx = (to.x - from.x).abs();
        let dy = (to.y - from.y).abs();
        let diag = dx.min(dy);
        self.horizontal * (dx - diag) + self.vertical * (dy - diag) + self.diagonal * SQRT_2 * diag
    }
}

/// A via definition the router may place.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ViaMask {
    /// Lowest layer of the via.
    pub first_layer: usize,
    /// Highest layer of the via.
    pub last_layer: usize,
    /// The via may be placed on top of an SMD pad.
    pub attach_smd_allowed: bool,
}

/// Read-only parameters of one search session.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteControl {
    /// Net being routed.
    pub net: NetNo,
    /// Layers the router may use.
    pub layer_active: Vec<bool>,
    /// Half width of the new trace per layer.
    pub trace_half_width: Vec<f64>,
    /// Half width plus the compensation of the trace's clearance class, per
    /// layer. Used against compensated trees.
    pub compensated_trace_half_width: Vec<f64>,
    /// Length costs per layer.
    pub trace_costs: Vec<TraceCost>,
    /// Clearance class of the new trace.
    pub trace_clearance_class: usize,
    /// Whether layer changes are allowed.
    pub vias_allowed: bool,
    /// Clearance class of new vias.
    pub via_clearance_class: usize,
    /// Radius of a new via's pad per layer.
    pub via_radius: Vec<f64>,
    /// Vias the router may place.
    pub via_masks: Vec<ViaMask>,
    /// Extra cost of a via from layer `i` to layer `j`, at `[i][j]`.
    pub add_via_costs: Vec<Vec<f64>>,
    /// Whether obstacles may be ripped up.
    pub ripup_allowed: bool,
    /// Base ripup cost.
    pub ripup_costs: f64,
    /// Current pass of the batch router.
    pub ripup_pass_no: u32,
    /// From this pass on, ripup costs are jittered.
    pub jitter_after_pass: u32,
    /// The search connects a pin to a fanout via and stops.
    pub is_fanout: bool,
    /// Recursion depth for shoving traces aside. Zero disables shoving.
    pub max_shove_trace_recursion_depth: u32,
    /// Penalty factor for ripping short fanout stubs.
    pub fanout_cost_constant: f64,
    /// Ripup cost of continuing through an obstacle already ripped.
    pub already_ripped_cost: f64,
    /// Factor applied to the ripup cost of vias with several contacts.
    pub via_multi_contact_discount: f64,
    /// Slack added to trace widths when sectioning doors and checking fit.
    pub trace_width_tolerance: f64,
}

impl Default for RouteControl {
    fn default() -> Self {
        Self::new(2)
    }
}

impl RouteControl {
    /// Parameters for a board of `layer_count` layers with unit trace width,
    /// no vias and no ripup.
    pub fn new(layer_count: usize) -> Self {
        Self {
            net: 1,
            layer_active: vec![true; layer_count],
            trace_half_width: vec![1.0; layer_count],
            compensated_trace_half_width: vec![1.0; layer_count],
            trace_costs: vec![TraceCost::default(); layer_count],
            trace_clearance_class: 1,
            vias_allowed: false,
            via_clearance_class: 1,
            via_radius: vec![2.0; layer_count],
            via_masks: Vec::new(),
            add_via_costs: vec![vec![0.0; layer_count]; layer_count],
            ripup_allowed: false,
            ripup_costs: 0.0,
            ripup_pass_no: 0,
            jitter_after_pass: 4,
            is_fanout: false,
            max_shove_trace_recursion_depth: 0,
            fanout_cost_constant: 20_000.0,
            already_ripped_cost: 1.0,
            via_multi_contact_discount: 0.5,
            trace_width_tolerance: 2.0,
        }
    }

    /// Number of layers the parameters describe.
    pub fn layer_count(&self) -> usize {
        self.layer_active.len()
    }

    /// True if `layer` exists and may be used.
    pub fn is_layer_active(&self, layer: usize) -> bool {
        self.layer_active.get(layer).copied().unwrap_or(false)
    }

    /// Trace half width on `layer`; zero for unknown layers.
    pub fn half_width(&self, layer: usize) -> f64 {
        self.trace_half_width.get(layer).copied().unwrap_or(0.0)
    }

    /// Compensated trace half width on `layer`; zero for unknown layers.
    pub fn compensated_half_width(&self, layer: usize) -> f64 {
        self.compensated_trace_half_width.get(layer).copied().unwrap_or(0.0)
    }

    /// Length costs on `layer`.
    pub fn trace_cost(&self, layer: usize) -> TraceCost {
        self.trace_costs.get(layer).copied().unwrap_or_default()
    }

    /// Via cost from `from` to `to`.
    pub fn via_cost(&self, from: usize, to: usize) -> f64 {
        self.add_via_costs
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(0.0)
    }

    /// Cheapest via cost between any two distinct active layers.
    pub fn min_normal_via_cost(&self) -> f64 {
        let n = self.layer_count();
        let mut min = f64::INFINITY;
        for i in 0..n {
            for j in 0..n {
                if i != j && self.is_layer_active(i) && self.is_layer_active(j) {
                    min = min.min(self.via_cost(i, j));
                }
            }
        }
        if min.is_finite() { min } else { 0.0 }
    }

    /// Smallest length weight over all active layers.
    pub fn min_trace_factor(&self) -> f64 {
        let min = (0..self.layer_count())
            .filter(|&l| self.is_layer_active(l))
            .map(|l| self.trace_cost(l).min_factor())
            .fold(f64::INFINITY, f64::min);
        if min.is_finite() { min } else { 1.0 }
    }
}
