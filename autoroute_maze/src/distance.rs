// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lower bound of the remaining cost to the nearest destination.

use autoroute_geom::Tile;
use kurbo::{Point, Rect};

use crate::control::RouteControl;

fn rect_distance(rect: &Rect, p: Point) -> f64 {
    let dx = (rect.x0 - p.x).max(p.x - rect.x1).max(0.0);
    let dy = (rect.y0 - p.y).max(p.y - rect.y1).max(0.0);
    dx.hypot(dy)
}

/// Admissible estimate of the cost from a point to the destination.
///
/// Destination shapes are summarized by one box per layer. On a layer with
/// a destination the bound is the distance to that box times the layer's
/// cheapest length weight; reaching another layer's box adds the cheapest
/// via.
#[derive(Clone, Debug)]
pub struct DestinationDistance {
    boxes: Vec<Option<Rect>>,
    all: Option<Rect>,
    layer_factor: Vec<f64>,
    min_factor: f64,
    min_via_cost: f64,
}

impl DestinationDistance {
    /// Estimator with no destinations yet.
    pub fn new(ctrl: &RouteControl) -> Self {
        let layer_count = ctrl.layer_count();
        Self {
            boxes: vec![None; layer_count],
            all: None,
            layer_factor: (0..layer_count).map(|l| ctrl.trace_cost(l).min_factor()).collect(),
            min_factor: ctrl.min_trace_factor(),
            min_via_cost: ctrl.min_normal_via_cost(),
        }
    }

    /// Add a destination shape on `layer`.
    pub fn join(&mut self, shape: &Tile, layer: usize) {
        if shape.is_empty() {
            return;
        }
        let r = shape.bounding_rect();
        if let Some(slot) = self.boxes.get_mut(layer) {
            *slot = Some(slot.map_or(r, |b| b.union(r)));
        }
        self.all = Some(self.all.map_or(r, |b| b.union(r)));
    }

    /// Lower bound of the cost from `p` on `layer`; zero without destinations.
    pub fn calculate(&self, p: Point, layer: usize) -> f64 {
        let Some(all) = self.all else {
            return 0.0;
        };
        let other_layers = rect_distance(&all, p) * self.min_factor + self.min_via_cost;
        match self.boxes.get(layer).copied().flatten() {
            Some(same) => {
                let factor = self.layer_factor.get(layer).copied().unwrap_or(self.min_factor);
                (rect_distance(&same, p) * factor).min(other_layers)
            }
            None => other_layers,
        }
    }
}
