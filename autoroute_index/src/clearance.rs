// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clearance rules between classes of items.

/// Required spacing between two clearance classes on each layer.
///
/// The matrix is symmetric. Class `0` is the null class: its row stays zero,
/// which is also why a search tree with compensation class `0` stores raw
/// shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct ClearanceMatrix {
    class_count: usize,
    layer_count: usize,
    values: Vec<f64>,
}

impl ClearanceMatrix {
    /// All-zero matrix.
    pub fn new(class_count: usize, layer_count: usize) -> Self {
        Self {
            class_count,
            layer_count,
            values: vec![0.0; class_count * class_count * layer_count],
        }
    }

    /// Matrix with `value` between every pair of non-null classes on every layer.
    pub fn uniform(class_count: usize, layer_count: usize, value: f64) -> Self {
        let mut m = Self::new(class_count, layer_count);
        for a in 1..class_count {
            for b in 1..class_count {
                m.set_value_all_layers(a, b, value);
            }
        }
        m
    }

    /// Number of clearance classes, including the null class.
    pub fn class_count(&self) -> usize {
        self.class_count
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    fn slot(&self, a: usize, b: usize, layer: usize) -> Option<usize> {
        (a < self.class_count && b < self.class_count && layer < self.layer_count)
            .then_some((layer * self.class_count + a) * self.class_count + b)
    }

    /// Required spacing between `a` and `b` on `layer`; zero when out of range.
    pub fn value(&self, a: usize, b: usize, layer: usize) -> f64 {
        self.slot(a, b, layer).map_or(0.0, |i| self.values[i])
    }

    /// Set the spacing for both orderings of the pair. The null class stays zero.
    pub fn set_value(&mut self, a: usize, b: usize, layer: usize, value: f64) {
        if a == 0 || b == 0 {
            return;
        }
        if let (Some(i), Some(j)) = (self.slot(a, b, layer), self.slot(b, a, layer)) {
            self.values[i] = value;
            self.values[j] = value;
        }
    }

    /// [`ClearanceMatrix::set_value`] on every layer.
    pub fn set_value_all_layers(&mut self, a: usize, b: usize, value: f64) {
        for layer in 0..self.layer_count {
            self.set_value(a, b, layer, value);
        }
    }

    /// Largest spacing `class` requires to any class on `layer`.
    pub fn max_value(&self, class: usize, layer: usize) -> f64 {
        (0..self.class_count)
            .map(|other| self.value(class, other, layer))
            .fold(0.0, f64::max)
    }
}
