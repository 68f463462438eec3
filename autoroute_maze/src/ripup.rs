// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What it costs to rip an obstacle out of the way.

use autoroute_index::ItemId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::{BoardGeometry, FixedState, RouteItem, TraceItem};
use crate::control::RouteControl;

/// Verdict on entering an obstacle room.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RipupCheck {
    /// The obstacle cannot be ripped.
    Blocked,
    /// The route already paid for this obstacle one room earlier.
    AlreadyRipped(f64),
    /// Ripping costs this much.
    Cost(f64),
}

/// Ripup pricing for one search session.
///
/// The jitter generator is seeded from the base ripup cost, so repeating a
/// session repeats its costs.
#[derive(Clone, Debug)]
pub struct RipupCostModel {
    rng: StdRng,
    jitter: bool,
}

impl RipupCostModel {
    /// Model for the parameters of one session.
    pub fn new(ctrl: &RouteControl) -> Self {
        Self {
            rng: StdRng::seed_from_u64(ctrl.ripup_costs.to_bits()),
            jitter: ctrl.ripup_pass_no >= ctrl.jitter_after_pass,
        }
    }

    /// Cost of ripping `item`, or `None` if it may not be ripped.
    pub fn cost<B: BoardGeometry + ?Sized>(
        &mut self,
        board: &B,
        item: ItemId,
        ctrl: &RouteControl,
    ) -> Option<f64> {
        if !ctrl.ripup_allowed {
            return None;
        }
        let obstacle = board.item(item)?;
        if !obstacle.is_routable() || obstacle.nets().contains(&ctrl.net) {
            return None;
        }
        let mut cost = match obstacle {
            RouteItem::Trace(trace) => {
                let detour = trace.detour.max(1.0);
                trace.half_width * ctrl.ripup_costs / detour * fanout_factor(board, trace, ctrl)
            }
            RouteItem::Via(via) => {
                let half_width = via
                    .contacts
                    .iter()
                    .filter_map(|c| match board.item(*c) {
                        Some(RouteItem::Trace(t)) => Some(t.half_width),
                        _ => None,
                    })
                    .reduce(f64::max)
                    .unwrap_or_else(|| ctrl.half_width(via.first_layer));
                let mut cost = half_width * ctrl.ripup_costs;
                if via.contacts.len() > 1 {
                    cost *= ctrl.via_multi_contact_discount;
                }
                cost
            }
            RouteItem::Pin(_) | RouteItem::Area(_) => return None,
        };
        if self.jitter {
            let r: f64 = self.rng.gen_range(0.0..1.0);
            cost *= 0.5 + r * r;
        }
        Some(cost.max(ctrl.already_ripped_cost))
    }
}

/// Penalty for ripping a short stub whose end hangs on a single SMD pin or
/// on a fixed exit trace.
fn fanout_factor<B: BoardGeometry + ?Sized>(
    board: &B,
    trace: &TraceItem,
    ctrl: &RouteControl,
) -> f64 {
    let is_stub_end = |contacts: &[ItemId]| match contacts {
        [only] => match board.item(*only) {
            Some(RouteItem::Pin(pin)) => pin.is_single_layer(),
            Some(RouteItem::Trace(t)) => t.fixed == FixedState::ShoveFixed && t.corners.len() == 2,
            _ => false,
        },
        _ => false,
    };
    if !is_stub_end(&trace.start_contacts) && !is_stub_end(&trace.end_contacts) {
        return 1.0;
    }
    let length = trace.length();
    if length <= autoroute_geom::EPSILON {
        return ctrl.fanout_cost_constant.max(1.0);
    }
    let ratio = trace.half_width / length;
    (ctrl.fanout_cost_constant * ratio * ratio).max(1.0)
}
