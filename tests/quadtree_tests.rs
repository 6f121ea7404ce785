//! Integration tests for the quadtree spatial index.

use rand::{rngs::StdRng, Rng, SeedableRng};
use warren::{Area, QuadTree, SubdivisionPolicy, Visit};

fn random_hitbox(rng: &mut StdRng) -> Area {
    let w = rng.gen_range(1..8);
    let h = rng.gen_range(1..8);
    let x = rng.gen_range(0..(100 - w));
    let y = rng.gen_range(0..(100 - h));
    Area::new(x, y, w, h)
}

#[test]
fn test_42_random_elements_then_clear() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut tree = QuadTree::new(Area::new(0, 0, 100, 100), 10, 2, SubdivisionPolicy::Lazy);

    for i in 0..42u32 {
        tree.insert(random_hitbox(&mut rng), i);
    }
    assert_eq!(tree.len(), 42);
    assert!(!tree.is_empty());

    tree.clear();
    assert_eq!(tree.len(), 0);
    assert!(tree.is_empty());
}

#[test]
fn test_policies_agree_on_queries() {
    let mut rng = StdRng::seed_from_u64(7);
    let hitboxes: Vec<Area> = (0..60).map(|_| random_hitbox(&mut rng)).collect();
    let regions: Vec<Area> = (0..20).map(|_| random_hitbox(&mut rng)).collect();

    let build = |policy| {
        let mut tree = QuadTree::new(Area::new(0, 0, 100, 100), 6, 3, policy);
        for (i, hitbox) in hitboxes.iter().enumerate() {
            tree.insert(*hitbox, i);
        }
        tree
    };
    let static_tree = build(SubdivisionPolicy::Static);
    let lazy_tree = build(SubdivisionPolicy::Lazy);
    let dynamic_tree = build(SubdivisionPolicy::Dynamic);

    for region in &regions {
        let expected = hitboxes.iter().any(|h| h.intersects(region));
        assert_eq!(static_tree.has_collision(region), expected);
        assert_eq!(lazy_tree.has_collision(region), expected);
        assert_eq!(dynamic_tree.has_collision(region), expected);
    }
}

#[test]
fn test_visit_sees_exactly_intersecting_elements() {
    let mut tree = QuadTree::new(Area::new(0, 0, 100, 100), 6, 2, SubdivisionPolicy::Lazy);
    let mut rng = StdRng::seed_from_u64(11);
    let hitboxes: Vec<Area> = (0..40).map(|_| random_hitbox(&mut rng)).collect();
    for (i, hitbox) in hitboxes.iter().enumerate() {
        tree.insert(*hitbox, i);
    }

    let region = Area::new(25, 25, 30, 30);
    let mut visited = Vec::new();
    tree.visit(&region, |_, &i| {
        visited.push(i);
        Visit::Continue
    });
    visited.sort_unstable();

    let mut expected: Vec<usize> = hitboxes
        .iter()
        .enumerate()
        .filter(|(_, h)| h.intersects(&region))
        .map(|(i, _)| i)
        .collect();
    expected.sort_unstable();
    assert_eq!(visited, expected);
}

#[test]
fn test_visit_removal_commits_after_traversal() {
    let mut tree = QuadTree::new(Area::new(0, 0, 100, 100), 6, 2, SubdivisionPolicy::Dynamic);
    let mut rng = StdRng::seed_from_u64(13);
    for i in 0..30u32 {
        tree.insert(random_hitbox(&mut rng), i);
    }

    let everything = Area::new(0, 0, 100, 100);
    tree.visit(&everything, |_, &v| {
        if v < 10 {
            Visit::Remove
        } else {
            Visit::Continue
        }
    });
    assert_eq!(tree.len(), 20);
    tree.visit(&everything, |_, &v| {
        assert!(v >= 10);
        Visit::Continue
    });
}

#[test]
fn test_move_and_erase_under_load() {
    let mut tree = QuadTree::new(Area::new(0, 0, 100, 100), 8, 2, SubdivisionPolicy::Dynamic);
    let mut rng = StdRng::seed_from_u64(17);
    let mut ids = Vec::new();
    for i in 0..50u32 {
        ids.push(tree.insert(random_hitbox(&mut rng), i));
    }

    // Shuffle everything to new positions
    for id in &ids {
        assert!(tree.update_pos(*id, random_hitbox(&mut rng)));
    }
    assert_eq!(tree.len(), 50);
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(tree.get(*id), Some(&(i as u32)));
    }

    // Erase half and verify the rest survives
    for id in ids.drain(..25) {
        assert!(tree.remove(id).is_some());
    }
    assert_eq!(tree.len(), 25);
    for id in &ids {
        assert!(tree.hitbox(*id).is_some());
    }
}

#[test]
fn test_find_by_value() {
    let mut tree = QuadTree::new(Area::new(0, 0, 100, 100), 4, 2, SubdivisionPolicy::Static);
    for i in 0..10u32 {
        tree.insert(Area::new(i as i32 * 9, 5, 3, 3), i * 100);
    }
    let id = tree.find(|v| *v == 700).expect("element present");
    assert_eq!(tree.get(id), Some(&700));
    assert_eq!(tree.find(|v| *v == 123), None);
}
