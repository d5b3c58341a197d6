use arbitrary::Arbitrary;
use canopy::{RBNode, RBTree, TreeError};
use rand::thread_rng;
use rand::Rng;
use std::collections::HashMap;

#[repr(C)]
struct Entry {
    node: RBNode,
    key: u64,
}

fn key_of(n: *const RBNode) -> u64 {
    unsafe { (*(n as *const Entry)).key }
}

/// Owning harness around the intrusive tree so fuzz actions can allocate
/// and free payloads by key.
#[derive(Default)]
pub struct FuzzTree {
    tree: RBTree,
    live: HashMap<u64, Box<Entry>>,
}

impl FuzzTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &RBTree {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn insert(&mut self, key: u64) -> bool {
        let e = Box::new(Entry {
            node: RBNode::new(),
            key,
        });
        let n = &e.node as *const RBNode as *mut RBNode;
        match unsafe { self.tree.insert_unique(|c| key.cmp(&key_of(c)), n) } {
            Ok(()) => {
                assert!(self.live.insert(key, e).is_none());
                true
            }
            Err(TreeError::Occupied) => {
                assert!(self.live.contains_key(&key));
                false
            }
        }
    }

    pub fn remove(&mut self, key: u64) -> bool {
        match self.live.remove(&key) {
            Some(e) => {
                unsafe {
                    self.tree
                        .remove_init(&e.node as *const RBNode as *mut RBNode)
                };
                true
            }
            None => false,
        }
    }

    pub fn find(&self, key: u64) -> bool {
        let found = self.tree.find(|c| key.cmp(&key_of(c)));
        assert_eq!(found.is_null(), !self.live.contains_key(&key));
        !found.is_null()
    }
}

#[derive(Debug, Arbitrary, Clone, Copy)]
pub enum TreeAction {
    Insert { key: u64 },
    Remove,
    RemoveMissing { key: u64 },
    Find { key: u64 },
    Iter,
    IterRev,
    WalkPostorder,
}

pub fn perform_action(t: &mut FuzzTree, keys: &mut Vec<u64>, action: TreeAction) {
    let mut rng = thread_rng();
    match action {
        TreeAction::Insert { key } => {
            if t.insert(key) {
                keys.push(key);
            }
            assert!(t.find(key));
        }
        TreeAction::Remove => {
            if keys.is_empty() {
                return;
            }
            let j = rng.gen_range(0, keys.len());
            let key = keys.swap_remove(j);
            assert!(t.remove(key));
            assert!(!t.find(key));
        }
        TreeAction::RemoveMissing { key } => {
            if keys.contains(&key) {
                return;
            }
            assert!(!t.remove(key));
        }
        TreeAction::Find { key } => {
            assert_eq!(t.find(key), keys.contains(&key));
        }
        TreeAction::Iter => {
            let mut count = 0;
            let mut n = t.tree().first();
            let mut last = None;
            while !n.is_null() {
                let key = key_of(n);
                assert!(last < Some(key));
                last = Some(key);
                count += 1;
                n = unsafe { RBNode::next(n) };
            }
            assert_eq!(count, t.len());
        }
        TreeAction::IterRev => {
            let mut count = 0;
            let mut n = t.tree().last();
            let mut last = None;
            while !n.is_null() {
                let key = key_of(n);
                if let Some(prev) = last {
                    assert!(key < prev);
                }
                last = Some(key);
                count += 1;
                n = unsafe { RBNode::prev(n) };
            }
            assert_eq!(count, t.len());
        }
        TreeAction::WalkPostorder => {
            let mut count = 0;
            let mut n = t.tree().first_postorder();
            while !n.is_null() {
                count += 1;
                n = unsafe { RBNode::next_postorder(n) };
            }
            assert_eq!(count, t.len());
        }
    }
}
