// Copyright 2025 the Autoroute Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Carving obstacle-free rooms out of free space.

use autoroute_geom::{Dimension, HalfPlane, Tile};
use kurbo::{Point, Vec2};

use crate::item::{ItemFlags, NetNo, shares_net};
use crate::search_tree::ShapeSearchTree;

/// Smallest overlap area that counts as an obstacle reaching into a room.
const MIN_OVERLAP_AREA: f64 = 1e-6;

/// Limits for [`ShapeSearchTree::complete_shape`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CarveSettings {
    /// Split depth after which a piece is abandoned.
    pub max_depth: usize,
    /// Rooms wider or taller than this are cut in half until they fit.
    /// `None` keeps rooms whole.
    pub max_room_extent: Option<f64>,
}

impl Default for CarveSettings {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_room_extent: None,
        }
    }
}

/// An obstacle-free convex room.
#[derive(Clone, Debug, PartialEq)]
pub struct CarvedRoom {
    /// Room outline.
    pub shape: Tile,
    /// Part of the must-contain shape this room covers. Pieces produced only
    /// by cutting an oversized room have none.
    pub contained: Option<Tile>,
}

fn overlaps_interior(shape: &Tile, obstacle: &Tile) -> bool {
    shape.intersects(obstacle) && shape.intersection(obstacle).area() > MIN_OVERLAP_AREA
}

/// Smallest signed distance of the vertices of `tile` into `half_plane`.
fn min_inside(tile: &Tile, half_plane: &HalfPlane) -> f64 {
    tile.vertices()
        .iter()
        .map(|&v| half_plane.signed_distance(v))
        .fold(f64::INFINITY, f64::min)
}

/// Largest signed distance of the vertices of `tile` into `half_plane`.
fn max_inside(tile: &Tile, half_plane: &HalfPlane) -> f64 {
    tile.vertices()
        .iter()
        .map(|&v| half_plane.signed_distance(v))
        .fold(f64::NEG_INFINITY, f64::max)
}

impl ShapeSearchTree {
    /// Rooms inside `region` on `layer` that avoid every trace obstacle of a
    /// foreign net and together cover `contained`.
    ///
    /// Each obstacle reaching into the room is cut off along one of its
    /// border lines. Among the lines that keep all of `contained` on the room
    /// side, the one farthest from `contained` wins. When no line does, the
    /// room is split in two along the line keeping the most of `contained`
    /// outside the obstacle, and each piece is carved on its own.
    pub fn complete_shape(
        &self,
        region: &Tile,
        layer: usize,
        nets: &[NetNo],
        contained: &Tile,
        settings: &CarveSettings,
    ) -> Vec<CarvedRoom> {
        if region.dimension() != Dimension::Area {
            log::warn!("cannot carve a room out of a degenerate region");
            return Vec::new();
        }
        let contained = contained.intersection(region);
        if contained.is_empty() {
            log::warn!("must-contain shape lies outside the carving region");
            return Vec::new();
        }
        let obstacles: Vec<&Tile> = self
            .find_overlap_tree_entries(region, Some(layer), nets)
            .into_iter()
            .filter(|entry| {
                self.item_info(entry.item).is_some_and(|(item_nets, _, flags)| {
                    flags.contains(ItemFlags::TRACE_OBSTACLE) && !shares_net(item_nets, nets)
                })
            })
            .filter_map(|entry| self.tree_shape(entry))
            .collect();

        let mut rooms = Vec::new();
        restrain_shape(region.clone(), contained, &obstacles, 0, settings.max_depth, &mut rooms);

        match settings.max_room_extent {
            Some(extent) if extent > 0.0 => {
                let mut divided = Vec::with_capacity(rooms.len());
                for room in rooms {
                    divide_large_room(room, extent, &mut divided);
                }
                divided
            }
            _ => rooms,
        }
    }
}

fn restrain_shape(
    mut shape: Tile,
    contained: Tile,
    obstacles: &[&Tile],
    depth: usize,
    max_depth: usize,
    out: &mut Vec<CarvedRoom>,
) {
    if depth > max_depth {
        log::debug!("carving gave up on a piece after {max_depth} splits");
        return;
    }
    loop {
        let Some(obstacle) = obstacles.iter().find(|o| overlaps_interior(&shape, o)) else {
            out.push(CarvedRoom {
                shape,
                contained: Some(contained),
            });
            return;
        };
        let cuts: Vec<HalfPlane> = obstacle
            .border_half_planes()
            .iter()
            .map(HalfPlane::opposite)
            .collect();

        let keeping_all = cuts
            .iter()
            .map(|cut| (min_inside(&contained, cut), cut))
            .filter(|(d, _)| *d >= -autoroute_geom::EPSILON)
            .max_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((_, cut)) = keeping_all {
            shape = shape.intersection_with_half_plane(cut);
            if shape.dimension() != Dimension::Area {
                log::debug!("carved room collapsed onto its must-contain shape");
                return;
            }
            continue;
        }

        let Some((outside, cut)) = cuts
            .iter()
            .map(|cut| (max_inside(&contained, cut), cut))
            .max_by(|a, b| a.0.total_cmp(&b.0))
        else {
            return;
        };
        if outside <= autoroute_geom::EPSILON {
            log::debug!("must-contain shape lies inside an obstacle");
            return;
        }
        let back = cut.opposite();
        for side in [cut, &back] {
            let piece = shape.intersection_with_half_plane(side);
            let part = contained.intersection_with_half_plane(side);
            if piece.dimension() == Dimension::Area && !part.is_empty() {
                restrain_shape(piece, part, obstacles, depth + 1, max_depth, out);
            }
        }
        return;
    }
}

/// Cut `room` in halves across its longer side until both sides fit `extent`.
fn divide_large_room(room: CarvedRoom, extent: f64, out: &mut Vec<CarvedRoom>) {
    let bounds = room.shape.bounding_rect();
    let (width, height) = (bounds.width(), bounds.height());
    if width <= extent && height <= extent {
        out.push(room);
        return;
    }
    let center = bounds.center();
    let dir = if width >= height {
        Vec2::new(0.0, 1.0)
    } else {
        Vec2::new(1.0, 0.0)
    };
    let Some(cut) = HalfPlane::new(Point::new(center.x, center.y), dir) else {
        out.push(room);
        return;
    };
    for side in [cut, cut.opposite()] {
        let shape = room.shape.intersection_with_half_plane(&side);
        if shape.dimension() != Dimension::Area {
            continue;
        }
        let contained = room
            .contained
            .as_ref()
            .map(|c| c.intersection_with_half_plane(&side))
            .filter(|c| !c.is_empty());
        divide_large_room(CarvedRoom { shape, contained }, extent, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clearance::ClearanceMatrix;
    use crate::item::{ItemId, LayerShape, TreeItem};
    use kurbo::Rect;

    fn obstacle(id: u32, net: NetNo, rect: Rect) -> TreeItem {
        TreeItem {
            id: ItemId(id),
            nets: vec![net],
            clearance_class: 1,
            flags: ItemFlags::default(),
            shapes: vec![LayerShape {
                layer: 0,
                tile: Tile::from_rect(rect),
            }],
        }
    }

    fn board() -> Tile {
        Tile::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0))
    }

    #[test]
    fn empty_board_yields_whole_region() {
        let t = ShapeSearchTree::new(0, ClearanceMatrix::new(2, 1));
        let seed = Tile::point(Point::new(50.0, 50.0));
        let rooms = t.complete_shape(&board(), 0, &[1], &seed, &CarveSettings::default());
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].shape, board());
    }

    #[test]
    fn obstacle_is_cut_off_keeping_the_seed() {
        let mut t = ShapeSearchTree::new(0, ClearanceMatrix::new(2, 1));
        t.insert(&obstacle(0, 2, Rect::new(60.0, 40.0, 70.0, 60.0))).unwrap();
        let seed = Tile::point(Point::new(20.0, 50.0));
        let rooms = t.complete_shape(&board(), 0, &[1], &seed, &CarveSettings::default());
        assert_eq!(rooms.len(), 1, "a single cut suffices");
        let room = &rooms[0].shape;
        assert!(room.contains_point(Point::new(20.0, 50.0)), "seed kept");
        assert!(!room.contains_point(Point::new(65.0, 50.0)), "obstacle removed");
        // The left border of the obstacle is the farthest valid cut.
        assert!((room.area() - 6000.0).abs() < 1e-6, "area {}", room.area());
    }

    #[test]
    fn own_net_items_are_not_obstacles() {
        let mut t = ShapeSearchTree::new(0, ClearanceMatrix::new(2, 1));
        t.insert(&obstacle(0, 1, Rect::new(60.0, 40.0, 70.0, 60.0))).unwrap();
        let seed = Tile::point(Point::new(20.0, 50.0));
        let rooms = t.complete_shape(&board(), 0, &[1], &seed, &CarveSettings::default());
        assert_eq!(rooms[0].shape, board());
    }

    #[test]
    fn straddling_seed_splits_the_room() {
        let mut t = ShapeSearchTree::new(0, ClearanceMatrix::new(2, 1));
        t.insert(&obstacle(0, 2, Rect::new(40.0, 40.0, 60.0, 60.0))).unwrap();
        // A seed segment passing below and to the right of the obstacle.
        let seed = Tile::from_points([
            Point::new(10.0, 20.0),
            Point::new(80.0, 20.0),
            Point::new(80.0, 90.0),
        ]);
        let rooms = t.complete_shape(&board(), 0, &[1], &seed, &CarveSettings::default());
        assert!(rooms.len() >= 2, "seed cannot stay in one room, got {}", rooms.len());
        let obstacle_center = Point::new(50.0, 50.0);
        for room in &rooms {
            assert!(!room.shape.contains_point(obstacle_center), "room overlaps the obstacle");
            assert!(room.contained.is_some(), "every piece covers part of the seed");
        }
    }

    #[test]
    fn seed_inside_obstacle_stops() {
        let mut t = ShapeSearchTree::new(0, ClearanceMatrix::new(2, 1));
        t.insert(&obstacle(0, 2, Rect::new(40.0, 40.0, 60.0, 60.0))).unwrap();
        let seed = Tile::point(Point::new(50.0, 50.0));
        let rooms = t.complete_shape(&board(), 0, &[1], &seed, &CarveSettings::default());
        assert!(rooms.is_empty(), "no room can cover a point inside an obstacle");
    }

    #[test]
    fn oversized_rooms_are_divided() {
        let t = ShapeSearchTree::new(0, ClearanceMatrix::new(2, 1));
        let seed = Tile::point(Point::new(10.0, 10.0));
        let settings = CarveSettings {
            max_room_extent: Some(30.0),
            ..CarveSettings::default()
        };
        let rooms = t.complete_shape(&board(), 0, &[1], &seed, &settings);
        assert_eq!(rooms.len(), 16, "100 x 100 halves down to 25 x 25");
        assert_eq!(
            rooms.iter().filter(|r| r.contained.is_some()).count(),
            1,
            "only one piece holds the seed"
        );
        let total: f64 = rooms.iter().map(|r| r.shape.area()).sum();
        assert!((total - 10_000.0).abs() < 1e-6, "pieces tile the board");
    }
}
