#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use impulse2d::{Aabb, AabbTree, Vec2};

#[derive(Debug, Arbitrary)]
enum Op {
    Insert { x: i8, y: i8, w: u8, h: u8 },
    Remove { slot: u8 },
    Query { x: i8, y: i8 },
    Pairs,
}

// Drive the tree through arbitrary insert/remove/query sequences. The
// structural invariants must hold after every operation.
fuzz_target!(|ops: Vec<Op>| {
    let mut tree = AabbTree::new();
    let mut live: Vec<u32> = Vec::new();
    let mut next_body = 0u32;

    for op in ops.into_iter().take(256) {
        match op {
            Op::Insert { x, y, w, h } => {
                let min = Vec2::new(f64::from(x), f64::from(y));
                let max = min + Vec2::new(1.0 + f64::from(w) / 16.0, 1.0 + f64::from(h) / 16.0);
                live.push(tree.insert(Aabb::new(min, max), next_body));
                next_body += 1;
            }
            Op::Remove { slot } => {
                if !live.is_empty() {
                    let idx = slot as usize % live.len();
                    tree.remove(live.swap_remove(idx));
                }
            }
            Op::Query { x, y } => {
                let _ = tree.query_point(Vec2::new(f64::from(x), f64::from(y)));
            }
            Op::Pairs => {
                let pairs = tree.collision_pairs();
                // No pair may appear twice (in either order)
                let mut seen: Vec<(u32, u32)> = pairs
                    .iter()
                    .map(|&(a, b)| (a.min(b), a.max(b)))
                    .collect();
                seen.sort_unstable();
                let before = seen.len();
                seen.dedup();
                assert_eq!(before, seen.len(), "duplicate pair emitted");
            }
        }
        assert!(tree.validate(), "tree invariants broken");
        assert_eq!(tree.leaf_count(), live.len());
    }
});
