use canopy::{RBNode, RBTree, TreeError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

#[repr(C)]
#[derive(Default)]
struct Entry {
    node: RBNode,
    key: u64,
    value: u64,
}

impl Entry {
    fn new(key: u64) -> Box<Self> {
        Box::new(Entry {
            node: RBNode::new(),
            key,
            value: 0,
        })
    }
}

fn node_ptr(e: &Entry) -> *mut RBNode {
    &e.node as *const RBNode as *mut RBNode
}

fn key_of(n: *const RBNode) -> u64 {
    unsafe { (*(n as *const Entry)).key }
}

fn find_key(tree: &RBTree, key: u64) -> *mut RBNode {
    tree.find(|n| key.cmp(&key_of(n)))
}

unsafe fn insert_entry(tree: &RBTree, e: &Entry) {
    let slot = tree.find_slot(|n| e.key.cmp(&key_of(n))).unwrap();
    tree.add(slot.parent, slot.link, node_ptr(e));
}

unsafe fn inorder_keys(tree: &RBTree) -> Vec<u64> {
    let mut keys = vec![];
    let mut n = tree.first();
    while !n.is_null() {
        keys.push(key_of(n));
        n = RBNode::next(n);
    }
    keys
}

unsafe fn height(n: *mut RBNode) -> usize {
    if n.is_null() {
        0
    } else {
        1 + height((*n).left()).max(height((*n).right()))
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_map_shuffled_2048() {
    const N: u64 = 2048;

    unsafe {
        let mut rng = StdRng::seed_from_u64(0xdead_beef);
        let tree = RBTree::new();
        let entries: Vec<Box<Entry>> = (0..N).map(Entry::new).collect();
        for e in entries.iter() {
            e.node.init();
        }

        let mut order: Vec<usize> = (0..N as usize).collect();
        order.shuffle(&mut rng);

        for &i in order.iter() {
            let e = &entries[i];
            assert!(!RBNode::is_linked(&e.node));
            assert!(find_key(&tree, e.key).is_null());

            insert_entry(&tree, e);

            assert!(RBNode::is_linked(&e.node));
            assert_eq!(find_key(&tree, e.key), node_ptr(e));
        }

        assert!(tree.is_valid_red_black_tree());
        assert_eq!(inorder_keys(&tree), (0..N).collect::<Vec<_>>());
        // Height bound for a red-black tree of 2048 nodes.
        assert!(height(tree.root()) <= 22);

        // Forward and backward traversals are mutually inverse.
        let mut n = tree.first();
        while !n.is_null() {
            let next = RBNode::next(n);
            if !next.is_null() {
                assert_eq!(RBNode::prev(next), n);
            }
            n = next;
        }
        let mut n = tree.last();
        let mut reversed = vec![];
        while !n.is_null() {
            reversed.push(key_of(n));
            n = RBNode::prev(n);
        }
        reversed.reverse();
        assert_eq!(reversed, (0..N).collect::<Vec<_>>());

        order.shuffle(&mut rng);
        for &i in order.iter() {
            let e = &entries[i];
            assert!(RBNode::is_linked(&e.node));
            assert_eq!(find_key(&tree, e.key), node_ptr(e));

            tree.remove_init(node_ptr(e));

            assert!(!RBNode::is_linked(&e.node));
            assert!(find_key(&tree, e.key).is_null());
            assert!(tree.is_valid_red_black_tree());
        }

        assert!(tree.is_empty());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_postorder_traversal_marks_every_node_once() {
    const N: u64 = 1024;

    unsafe {
        let mut rng = StdRng::seed_from_u64(0xcafe);
        let tree = RBTree::new();
        let entries: Vec<Box<Entry>> = (0..N).map(Entry::new).collect();

        let mut order: Vec<usize> = (0..N as usize).collect();
        order.shuffle(&mut rng);
        for &i in order.iter() {
            insert_entry(&tree, &entries[i]);
        }

        // Left-to-right post-order: both children of a node are visited
        // before the node itself.
        let mut marked = HashSet::new();
        let mut n = tree.first_postorder();
        while !n.is_null() {
            for child in [(*n).left(), (*n).right()] {
                if !child.is_null() {
                    assert!(marked.contains(&(child as usize)));
                }
            }
            assert!(marked.insert(n as usize));
            n = RBNode::next_postorder(n);
        }
        assert_eq!(marked.len(), N as usize);

        // The reverse traversal unmarks every node exactly once, and the
        // two traversals are mutually inverse.
        let mut n = tree.last_postorder();
        assert_eq!(n, tree.root());
        while !n.is_null() {
            assert!(marked.remove(&(n as usize)));
            let prev = RBNode::prev_postorder(n);
            if !prev.is_null() {
                assert_eq!(RBNode::next_postorder(prev), n);
            }
            n = prev;
        }
        assert!(marked.is_empty());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_simulate_against_btree_map() {
    const KEY_SPACE: u64 = 4096;

    unsafe {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let tree = RBTree::new();
        let mut live: HashMap<u64, Box<Entry>> = HashMap::new();
        let mut map: BTreeMap<u64, u64> = BTreeMap::new();
        let mut keys: Vec<u64> = vec![];

        for round in 0..10000 {
            let sample = rng.gen::<f64>();
            if sample < 0.4 {
                let key = rng.gen_range(0, KEY_SPACE);
                let mut e = Entry::new(key);
                e.value = rng.gen::<u64>();
                let result = tree.insert_unique(|n| key.cmp(&key_of(n)), node_ptr(&e));
                if live.contains_key(&key) {
                    assert_eq!(result, Err(TreeError::Occupied));
                } else {
                    assert_eq!(result, Ok(()));
                    map.insert(key, e.value);
                    live.insert(key, e);
                    keys.push(key);
                }
            } else if sample < 0.7 {
                if keys.is_empty() {
                    continue;
                }
                let j = rng.gen_range(0, keys.len());
                let key = keys.swap_remove(j);
                let e = live.remove(&key).unwrap();
                tree.remove_init(node_ptr(&e));
                map.remove(&key);
                assert!(find_key(&tree, key).is_null());
            } else {
                let key = rng.gen_range(0, KEY_SPACE);
                let found = find_key(&tree, key);
                match live.get(&key) {
                    Some(e) => {
                        assert_eq!(found, node_ptr(e));
                        assert_eq!((*(found as *const Entry)).value, map[&key]);
                    }
                    None => assert!(found.is_null()),
                }
            }

            if round % 64 == 0 {
                assert!(tree.is_valid_red_black_tree());
            }
        }

        assert!(tree.is_valid_red_black_tree());
        itertools::assert_equal(inorder_keys(&tree), map.keys().copied());
    }
}

struct Shared {
    tree: RBTree,
    entries: Vec<Box<Entry>>,
}

const RUN: usize = 0;
const QUIESCE: usize = 1;
const DONE: usize = 2;

// Full pre-order traversal of a quiescent tree using only the child
// pointers, asserting loop-freedom.
fn traverse_quiescent(shared: &Shared) {
    let mut seen = HashSet::new();
    let mut stack = vec![];
    let root = shared.tree.root();
    if !root.is_null() {
        stack.push(root);
    }
    while let Some(n) = stack.pop() {
        assert!(seen.insert(n as usize), "cycle in child pointers");
        unsafe {
            for child in [(*n).left(), (*n).right()] {
                if !child.is_null() {
                    stack.push(child);
                }
            }
        }
    }
    assert!(seen.len() <= shared.entries.len());
}

#[test]
fn test_parallel_lockless_read() {
    const N_NODES: usize = 32;
    const ROUNDS: usize = 256;

    let shared = Arc::new(Shared {
        tree: RBTree::new(),
        entries: (0..N_NODES as u64).map(Entry::new).collect(),
    });
    for e in shared.entries.iter() {
        e.node.init();
    }

    let state = Arc::new(AtomicUsize::new(RUN));
    let barrier = Arc::new(Barrier::new(2));

    let reader = {
        let shared = Arc::clone(&shared);
        let state = Arc::clone(&state);
        let barrier = Arc::clone(&barrier);
        std::thread::spawn(move || {
            let mut rng = StdRng::seed_from_u64(0x0f0f);
            let arena: HashSet<usize> = shared
                .entries
                .iter()
                .map(|e| node_ptr(e) as usize)
                .collect();

            loop {
                match state.load(Ordering::Acquire) {
                    RUN => {
                        // One lockless descent. The topology may shift under
                        // us, but each walk must stay inside the arena and
                        // terminate within the step budget.
                        let mut n = shared.tree.root();
                        let mut steps = 0;
                        while !n.is_null() {
                            steps += 1;
                            assert!(steps <= 64, "reader walk did not terminate");
                            assert!(arena.contains(&(n as usize)));
                            let (first, second) = unsafe {
                                if rng.gen::<bool>() {
                                    ((*n).left(), (*n).right())
                                } else {
                                    ((*n).right(), (*n).left())
                                }
                            };
                            n = if !first.is_null() { first } else { second };
                        }
                    }
                    QUIESCE => {
                        traverse_quiescent(&shared);
                        barrier.wait();
                        barrier.wait();
                    }
                    _ => break,
                }
            }
        })
    };

    // Single writer: insert all nodes, remove all nodes, repeatedly. At
    // regular intervals the reader is handed a quiescent tree to check for
    // cycle-freedom node by node.
    let quiesce = |expect_linked: bool| {
        for e in shared.entries.iter() {
            assert_eq!(unsafe { RBNode::is_linked(&e.node) }, expect_linked);
        }
        state.store(QUIESCE, Ordering::Release);
        barrier.wait();
        state.store(RUN, Ordering::Release);
        barrier.wait();
    };

    let mut rng = StdRng::seed_from_u64(0xf00d);
    let mut order: Vec<usize> = (0..N_NODES).collect();
    for round in 0..ROUNDS {
        order.shuffle(&mut rng);
        for &i in order.iter() {
            unsafe { insert_entry(&shared.tree, &shared.entries[i]) };
        }
        if round % 64 == 0 {
            quiesce(true);
        }

        order.shuffle(&mut rng);
        for &i in order.iter() {
            unsafe { shared.tree.remove_init(node_ptr(&shared.entries[i])) };
        }
        if round % 64 == 32 {
            quiesce(false);
        }
    }

    state.store(DONE, Ordering::Release);
    reader.join().unwrap();
    assert!(shared.tree.is_empty());
}
