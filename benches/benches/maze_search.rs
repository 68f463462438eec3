// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::BTreeSet;

use autoroute_geom::Tile;
use autoroute_index::{ClearanceMatrix, ItemId};
use autoroute_maze::{
    FixedState, IndexedBoard, NeverStop, PathSearch, PinItem, RoomId, RoomKind, RouteControl,
    RouteGraph, RouteItem, TraceItem,
};
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};

const CELL: f64 = 20.0;

fn pad_at(x: f64, y: f64) -> Tile {
    Tile::from_rect(Rect::new(x + 8.0, y + 8.0, x + 12.0, y + 12.0))
}

/// An `n` by `n` grid of free rooms with doors between neighbors and pads in
/// two opposite corners. Every third column boundary below the top row is a
/// foreign trace, so `walls` adds obstacle rooms the search may rip.
fn grid(n: usize, walls: bool) -> (IndexedBoard, RouteGraph) {
    let mut board = IndexedBoard::new(1, ClearanceMatrix::new(2, 1));
    let far = (n - 1) as f64 * CELL;
    let pin = |shape| {
        RouteItem::Pin(PinItem {
            nets: vec![1],
            clearance_class: 1,
            first_layer: 0,
            last_layer: 0,
            shape,
        })
    };
    let _ = board.insert(ItemId(0), pin(pad_at(0.0, 0.0)));
    let _ = board.insert(ItemId(1), pin(pad_at(far, far)));

    let mut g = RouteGraph::new(1.0, 2.0);
    let mut rooms: Vec<RoomId> = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let (x0, y0) = (x as f64 * CELL, y as f64 * CELL);
            let cell = Tile::from_rect(Rect::new(x0, y0, x0 + CELL, y0 + CELL));
            rooms.push(g.add_room(0, cell, RoomKind::FreeSpace));
        }
    }
    let mut next_item = 2;
    for y in 0..n {
        for x in 0..n {
            let here = rooms[y * n + x];
            let (x1, y0) = ((x + 1) as f64 * CELL, y as f64 * CELL);
            if x + 1 < n {
                let there = rooms[y * n + x + 1];
                let door = |x: f64| Tile::segment(Point::new(x, y0), Point::new(x, y0 + CELL));
                if walls && x % 3 == 2 && y + 1 < n {
                    let id = ItemId(next_item);
                    next_item += 1;
                    let trace = TraceItem {
                        nets: vec![2],
                        clearance_class: 1,
                        layer: 0,
                        half_width: 1.5,
                        corners: vec![Point::new(x1, y0), Point::new(x1, y0 + CELL)],
                        fixed: FixedState::Unfixed,
                        start_contacts: Vec::new(),
                        end_contacts: Vec::new(),
                        detour: 1.0,
                    };
                    let _ = board.insert(id, RouteItem::Trace(trace));
                    let wall = g.add_room(
                        0,
                        Tile::from_rect(Rect::new(x1 - 1.5, y0, x1 + 1.5, y0 + CELL)),
                        RoomKind::Obstacle {
                            item: id,
                            shape_index: 0,
                        },
                    );
                    g.add_door(here, wall, door(x1 - 1.5));
                    g.add_door(wall, there, door(x1 + 1.5));
                } else {
                    g.add_door(here, there, door(x1));
                }
            }
            if y + 1 < n {
                let there = rooms[(y + 1) * n + x];
                let (x0, y1) = (x as f64 * CELL, (y + 1) as f64 * CELL);
                let door = Tile::segment(Point::new(x0, y1), Point::new(x0 + CELL, y1));
                g.add_door(here, there, door);
            }
        }
    }
    g.add_target_door(rooms[0], ItemId(0), 0, pad_at(0.0, 0.0));
    g.add_target_door(rooms[n * n - 1], ItemId(1), 0, pad_at(far, far));
    (board, g)
}

fn bench_open_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("maze_open_grid");
    let start = BTreeSet::from([ItemId(0)]);
    let destination = BTreeSet::from([ItemId(1)]);
    let ctrl = RouteControl::new(1);
    for &n in &[8usize, 16, 32] {
        let (board, g) = grid(n, false);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("corner_to_corner_n{n}"), |b| {
            b.iter(|| {
                let tree = board.index().default_tree();
                let mut search = PathSearch::new(&g, &board, tree, &ctrl, &start, &destination)
                    .expect("grid has start doors");
                black_box(search.find_connection(&NeverStop).map(|r| r.cost))
            })
        });
    }
    group.finish();
}

fn bench_ripup_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("maze_ripup_grid");
    let start = BTreeSet::from([ItemId(0)]);
    let destination = BTreeSet::from([ItemId(1)]);
    let ctrl = RouteControl {
        ripup_allowed: true,
        ripup_costs: 50.0,
        ripup_pass_no: 6,
        ..RouteControl::new(1)
    };
    for &n in &[8usize, 16, 32] {
        let (board, g) = grid(n, true);
        group.bench_function(format!("corner_to_corner_walls_n{n}"), |b| {
            b.iter(|| {
                let tree = board.index().default_tree();
                let mut search = PathSearch::new(&g, &board, tree, &ctrl, &start, &destination)
                    .expect("grid has start doors");
                black_box(search.find_connection(&NeverStop).map(|r| r.ripup_cost))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_open_grid, bench_ripup_grid);
criterion_main!(benches);
