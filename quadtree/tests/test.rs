use std::collections::HashSet;

use common::ids::EntityId;
use common::shapes::{EntityShape, Square};
use quadtree::{Config, QuadTree, QuadtreeError};

use rand::Rng;

fn shape_at(x: i32, y: i32) -> EntityShape {
    EntityShape::new(x, y, 10, 10)
}

fn overlaps(a: &EntityShape, b: &EntityShape) -> bool {
    !(a.x > b.x + b.w) && !(a.x + a.w < b.x) && !(a.y > b.y + b.h) && !(a.y + a.h < b.y)
}

#[test]
fn test_invalid_bounds_rejected() {
    let result = QuadTree::new(Square::new(0, 0, 0, 100));
    assert_eq!(
        result.err(),
        Some(QuadtreeError::InvalidBounds {
            width: 0,
            height: 100
        })
    );
    assert!(QuadTree::new(Square::new(0, 0, 100, -1)).is_err());
}

#[test]
fn test_split_one_level() {
    let mut tree = QuadTree::new(Square::new(0, 0, 400, 400)).unwrap();
    assert_eq!(tree.depth(), 0);

    let mut next = 1;
    for _ in 0..5 {
        tree.insert(EntityId(next), shape_at(10, 10));
        next += 1;
    }
    for _ in 0..5 {
        tree.insert(EntityId(next), shape_at(210, 10));
        next += 1;
    }
    for _ in 0..5 {
        tree.insert(EntityId(next), shape_at(10, 210));
        next += 1;
    }

    assert_eq!(tree.depth(), 1);
    assert_eq!(tree.count(), 15);

    tree.clear();
    assert_eq!(tree.depth(), 0);
    assert_eq!(tree.count(), 0);
}

#[test]
fn test_split_two_levels() {
    let mut tree = QuadTree::new(Square::new(0, 0, 400, 400)).unwrap();

    let mut next = 1;
    for _ in 0..5 {
        tree.insert(EntityId(next), shape_at(10, 10));
        next += 1;
    }
    for _ in 0..5 {
        tree.insert(EntityId(next), shape_at(110, 10));
        next += 1;
    }
    for _ in 0..5 {
        tree.insert(EntityId(next), shape_at(10, 110));
        next += 1;
    }

    assert_eq!(tree.depth(), 2);

    tree.clear();
    assert_eq!(tree.depth(), 0);
}

#[test]
fn test_retrieval() {
    let mut tree = QuadTree::new(Square::new(0, 0, 400, 400)).unwrap();

    let mut next = 1;
    for group in [(10, 10), (210, 10), (10, 210), (10, 195)] {
        for _ in 0..5 {
            tree.insert(EntityId(next), shape_at(group.0, group.1));
            next += 1;
        }
    }

    assert_eq!(tree.depth(), 1);

    // The query sits in the top-left quadrant along with the (10, 10)
    // group and the boundary-straddling (10, 195) group.
    let mut found = Vec::new();
    tree.retrieve(&mut found, &shape_at(10, 10));
    assert_eq!(found.len(), 10);
}

#[test]
fn test_straddling_entity_lands_in_all_quadrants() {
    let mut tree = QuadTree::new(Square::new(0, 0, 400, 400)).unwrap();

    for i in 0..11 {
        tree.insert(EntityId(i + 1), shape_at(10, 10));
    }
    // Covers the midpoint on both axes, so the split distributes it to
    // every child.
    tree.insert(EntityId(100), shape_at(195, 195));

    assert!(tree.depth() >= 1);
    assert_eq!(tree.count(), 11 + 4);

    let mut found = Vec::new();
    tree.retrieve(&mut found, &shape_at(310, 310));
    assert!(found.contains(&EntityId(100)));
}

#[test]
fn test_purge_dedupes_straddlers() {
    let mut tree = QuadTree::new(Square::new(0, 0, 400, 400)).unwrap();

    for i in 0..11 {
        tree.insert(EntityId(i + 1), shape_at(10, 10));
    }
    tree.insert(EntityId(100), shape_at(195, 195));

    let mut purged = Vec::new();
    tree.purge(&mut purged, |id| id == EntityId(100));

    assert_eq!(purged, vec![EntityId(100)]);
    assert_eq!(tree.count(), 11);
}

#[test]
fn test_purge_and_unsplit() {
    let mut tree = QuadTree::new(Square::new(0, 0, 400, 400)).unwrap();

    let mut next = 1;
    for group in [(10, 10), (210, 10), (10, 210)] {
        for _ in 0..5 {
            tree.insert(EntityId(next), shape_at(group.0, group.1));
            next += 1;
        }
    }
    assert_eq!(tree.depth(), 1);

    // Purge one group; the remaining population fits a single node again.
    let mut purged = Vec::new();
    tree.purge(&mut purged, |id| id.0 <= 5);

    assert_eq!(purged.len(), 5);
    assert_eq!(tree.count(), 10);
    assert_eq!(tree.depth(), 0);

    // Reinsert the purged entities at their new location, as the registry
    // would after a movement pass.
    for id in purged {
        tree.insert(id, shape_at(300, 300));
    }
    assert_eq!(tree.count(), 15);
}

#[test]
fn test_purge_without_movement_is_noop() {
    let mut tree = QuadTree::new(Square::new(0, 0, 400, 400)).unwrap();
    for i in 0..15 {
        tree.insert(EntityId(i + 1), shape_at(10 + (i as i32) * 20, 10));
    }

    let count = tree.count();
    let mut purged = Vec::new();
    tree.purge(&mut purged, |_| false);

    assert!(purged.is_empty());
    assert_eq!(tree.count(), count);
}

#[test]
fn test_depth_capped_under_coincident_flooding() {
    let mut tree = QuadTree::new(Square::new(0, 0, 400, 400)).unwrap();
    for i in 0..200 {
        tree.insert(EntityId(i + 1), shape_at(200, 200));
    }

    // Subdivision stops at the minimum node size long before the hard
    // depth ceiling; the tree must terminate either way. Every entity
    // straddles the root midpoint, so leaf counts multiply.
    assert!(tree.depth() <= 100);
    assert!(tree.count() >= 200);

    let mut found = Vec::new();
    tree.retrieve(&mut found, &shape_at(200, 200));
    let found: HashSet<EntityId> = found.into_iter().collect();
    assert_eq!(found.len(), 200);
}

#[test]
fn test_small_nodes_never_split() {
    let config = Config {
        node_capacity: 2,
        ..Config::default()
    };
    let mut tree = QuadTree::with_config(Square::new(0, 0, 8, 8), config).unwrap();
    for i in 0..20 {
        tree.insert(EntityId(i + 1), EntityShape::new(1, 1, 2, 2));
    }

    assert_eq!(tree.depth(), 0);
    assert_eq!(tree.count(), 20);
}

#[test]
fn test_shape_outside_root_is_best_effort() {
    let mut tree = QuadTree::new(Square::new(0, 0, 400, 400)).unwrap();
    tree.insert(EntityId(1), shape_at(-500, -500));

    assert_eq!(tree.count(), 1);

    let mut found = Vec::new();
    tree.retrieve(&mut found, &shape_at(-500, -500));
    assert_eq!(found, vec![EntityId(1)]);
}

#[test]
fn test_randomized_retrieval_never_misses() {
    let mut rng = rand::thread_rng();
    let mut tree = QuadTree::new(Square::new(0, 0, 1000, 1000)).unwrap();

    let mut shapes = Vec::new();
    for i in 0..200u64 {
        let shape = EntityShape::new(
            rng.gen_range(0..950),
            rng.gen_range(0..950),
            rng.gen_range(1..50),
            rng.gen_range(1..50),
        );
        shapes.push((EntityId(i + 1), shape));
        tree.insert(EntityId(i + 1), shape);
    }

    for _ in 0..50 {
        let query = EntityShape::new(
            rng.gen_range(0..950),
            rng.gen_range(0..950),
            rng.gen_range(1..100),
            rng.gen_range(1..100),
        );

        let mut found = Vec::new();
        tree.retrieve(&mut found, &query);
        let found: HashSet<EntityId> = found.into_iter().collect();

        for (id, shape) in &shapes {
            if overlaps(shape, &query) {
                assert!(found.contains(id), "tree missed {} for {:?}", id, query);
            }
        }
    }
}

#[test]
fn test_node_bounds_cover_children() {
    let mut tree = QuadTree::new(Square::new(0, 0, 400, 400)).unwrap();
    for group in [(10, 10), (210, 10), (10, 210)] {
        for i in 0..5u64 {
            tree.insert(
                EntityId(group.0 as u64 * 100 + group.1 as u64 + i),
                shape_at(group.0, group.1),
            );
        }
    }

    let mut bounds = Vec::new();
    tree.node_bounds(&mut bounds);

    // Root plus four children after one split.
    assert_eq!(bounds.len(), 5);
    assert_eq!(bounds[0], Square::new(0, 0, 400, 400));
    assert!(bounds.contains(&Square::new(200, 200, 200, 200)));
}
