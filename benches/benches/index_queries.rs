// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use autoroute_geom::{Octagon, Tile};
use autoroute_index::{
    BoundTree, CarveSettings, ClearanceMatrix, ItemFlags, ItemId, LayerShape, ShapeSearchTree,
    TreeItem,
};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Rect> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Rect::new(x0, y0, x0 + 0.8 * cell, y0 + 0.8 * cell));
        }
    }
    out
}

fn gen_random_rects(count: usize, extent: f64, size: f64, seed: u64) -> Vec<Rect> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let x0 = rng.gen_range(0.0..extent - size);
            let y0 = rng.gen_range(0.0..extent - size);
            Rect::new(x0, y0, x0 + size, y0 + size)
        })
        .collect()
}

fn pads(rects: &[Rect], classes: usize) -> Vec<TreeItem> {
    rects
        .iter()
        .enumerate()
        .map(|(i, r)| TreeItem {
            id: ItemId(i as u32),
            nets: vec![(i % 97) as u32 + 1],
            clearance_class: 1 + i % (classes - 1),
            flags: ItemFlags::default(),
            shapes: vec![LayerShape {
                layer: i % 2,
                tile: Tile::from_rect(*r),
            }],
        })
        .collect()
}

fn clearance(classes: usize) -> ClearanceMatrix {
    let mut m = ClearanceMatrix::new(classes, 2);
    for i in 1..classes {
        for j in 1..classes {
            m.set_value_all_layers(i, j, 0.5 + 0.25 * (i + j) as f64);
        }
    }
    m
}

fn bench_bound_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("bound_tree");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        let query = Octagon::from_rect(Rect::new(100.0, 100.0, 500.0, 500.0));
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("insert_query_grid_n{n}"), |b| {
            b.iter_batched(
                BoundTree::<u32>::new,
                |mut tree| {
                    for (i, r) in rects.iter().enumerate() {
                        tree.insert(Octagon::from_rect(*r), i as u32);
                    }
                    black_box(tree.overlapping(&query).len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    let rects = gen_random_rects(4096, 2000.0, 12.0, 0xCAFE_F00D);
    group.bench_function("insert_remove_random", |b| {
        b.iter_batched(
            || {
                let mut tree = BoundTree::<u32>::new();
                let leaves: Vec<_> = rects
                    .iter()
                    .enumerate()
                    .map(|(i, r)| tree.insert(Octagon::from_rect(*r), i as u32))
                    .collect();
                (tree, leaves)
            },
            |(mut tree, leaves)| {
                for leaf in leaves.into_iter().step_by(2) {
                    black_box(tree.remove(leaf));
                }
                black_box(tree.depth());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_clearance_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("shape_search_tree");
    let classes = 4;
    let items = pads(&gen_random_rects(4096, 2000.0, 12.0, 0xBADC_0FFE), classes);
    let queries: Vec<Tile> = gen_random_rects(256, 2000.0, 4.0, 0x5EED)
        .into_iter()
        .map(|r| Tile::segment(Point::new(r.x0, r.y0), Point::new(r.x1 + 40.0, r.y1)).offset(1.0))
        .collect();
    let build = |class: usize| {
        let mut tree = ShapeSearchTree::new(class, clearance(classes));
        for item in &items {
            let _ = tree.insert(item);
        }
        tree
    };

    let plain = build(0);
    group.bench_function("raw_clearance_queries", |b| {
        b.iter(|| {
            let hits: usize = queries
                .iter()
                .map(|p| {
                    plain
                        .find_overlap_objects_with_clearance(p, Some(0), &[1], 2)
                        .len()
                })
                .sum();
            black_box(hits)
        })
    });

    let compensated = build(2);
    group.bench_function("compensated_queries", |b| {
        b.iter(|| {
            let grow = compensated.clearance_compensation_value(2, 0);
            let hits: usize = queries
                .iter()
                .map(|p| {
                    compensated
                        .find_overlap_objects(&p.offset(grow), Some(0), &[1])
                        .len()
                })
                .sum();
            black_box(hits)
        })
    });
    group.finish();
}

fn bench_carving(c: &mut Criterion) {
    let mut group = c.benchmark_group("carve");
    let items = pads(&gen_random_rects(512, 1000.0, 20.0, 0xC1A5_7E55), 3);
    let mut tree = ShapeSearchTree::new(0, clearance(3));
    for item in &items {
        let _ = tree.insert(item);
    }
    let settings = CarveSettings::default();
    let seeds: Vec<Point> = gen_random_rects(64, 1000.0, 1.0, 0xFEED)
        .into_iter()
        .map(|r| r.center())
        .collect();
    let region = Tile::from_rect(Rect::new(0.0, 0.0, 1000.0, 1000.0));
    group.bench_function("complete_shape_random_seeds", |b| {
        b.iter(|| {
            let rooms: usize = seeds
                .iter()
                .map(|p| {
                    tree.complete_shape(&region, 0, &[], &Tile::point(*p), &settings)
                        .len()
                })
                .sum();
            black_box(rooms)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_bound_tree, bench_clearance_queries, bench_carving);
criterion_main!(benches);
