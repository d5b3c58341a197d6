#![feature(test)]

extern crate test;

#[cfg(test)]
mod bench_tests {
    use canopy::{RBNode, RBTree};
    use rand::{self, Rng};
    use std::collections::BTreeMap;
    use test::Bencher;

    #[repr(C)]
    #[derive(Default)]
    struct Entry {
        node: RBNode,
        key: u128,
        value: u128,
    }

    fn key_of(n: *const RBNode) -> u128 {
        unsafe { (*(n as *const Entry)).key }
    }

    fn make_entries(n: usize) -> Vec<Box<Entry>> {
        let mut rng = rand::thread_rng();
        (0..n)
            .map(|i| {
                Box::new(Entry {
                    node: RBNode::new(),
                    key: i as u128,
                    value: rng.gen::<u128>(),
                })
            })
            .collect()
    }

    unsafe fn insert_all(tree: &RBTree, entries: &[Box<Entry>]) {
        for e in entries.iter() {
            let slot = tree.find_slot(|n| e.key.cmp(&key_of(n))).unwrap();
            tree.add(slot.parent, slot.link, &e.node as *const RBNode as *mut RBNode);
        }
    }

    #[bench]
    fn bench_std_btree_map_insert_1000_u128(b: &mut Bencher) {
        let mut rng = rand::thread_rng();
        let mut m = BTreeMap::new();
        b.iter(|| {
            for v in 0..1000 {
                m.insert(v as u128, rng.gen::<u128>());
            }
        })
    }

    #[bench]
    fn bench_canopy_insert_1000_u128(b: &mut Bencher) {
        let entries = make_entries(1000);
        b.iter(|| {
            let tree = RBTree::new();
            unsafe { insert_all(&tree, &entries) };
            tree
        })
    }

    #[bench]
    fn bench_std_btree_map_lookup_1000_u128(b: &mut Bencher) {
        let mut rng = rand::thread_rng();
        let mut m = BTreeMap::new();
        for v in 0..1000 {
            m.insert(v as u128, rng.gen::<u128>());
        }
        b.iter(|| {
            for v in 0..1000 {
                test::black_box(m.get(&(v as u128)));
            }
        })
    }

    #[bench]
    fn bench_canopy_lookup_1000_u128(b: &mut Bencher) {
        let entries = make_entries(1000);
        let tree = RBTree::new();
        unsafe { insert_all(&tree, &entries) };
        b.iter(|| {
            for v in 0..1000u128 {
                let found = tree.find(|n| v.cmp(&key_of(n)));
                test::black_box(unsafe { (*(found as *const Entry)).value });
            }
        })
    }

    #[bench]
    fn bench_std_btree_map_iterate_1000_u128(b: &mut Bencher) {
        let mut rng = rand::thread_rng();
        let mut m = BTreeMap::new();
        for v in 0..1000 {
            m.insert(v as u128, rng.gen::<u128>());
        }
        b.iter(|| {
            let mut sum = 0u128;
            for (k, _) in m.iter() {
                sum = sum.wrapping_add(*k);
            }
            sum
        })
    }

    #[bench]
    fn bench_canopy_iterate_1000_u128(b: &mut Bencher) {
        let entries = make_entries(1000);
        let tree = RBTree::new();
        unsafe { insert_all(&tree, &entries) };
        b.iter(|| {
            let mut sum = 0u128;
            let mut n = tree.first();
            while !n.is_null() {
                sum = sum.wrapping_add(key_of(n));
                n = unsafe { RBNode::next(n) };
            }
            sum
        })
    }
}
