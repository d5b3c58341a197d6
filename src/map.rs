use std::cmp::Ordering;
use std::sync::atomic::{self, AtomicPtr};
use thiserror::Error;

use crate::node::RBNode;
use crate::tree::RBTree;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("a node with an equal key is already linked")]
    Occupied,
}

/// Insertion point returned by [`RBTree::find_slot`], to be passed on to
/// [`RBTree::add`] unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Slot {
    pub parent: *mut RBNode,
    pub link: *const AtomicPtr<RBNode>,
}

/// Keyed lookup helpers.
///
/// The tree core never compares nodes; these helpers drive the descent with
/// a caller-supplied comparator instead. The comparator receives a linked
/// node and returns the ordering of the search key relative to that node,
/// `Less` to descend left and `Greater` to descend right. It must implement
/// a total order consistent across all nodes of the tree.
impl RBTree {
    /// Walks the tree with `compare` and returns the matching node, or null
    /// if no node compares equal.
    pub fn find<F>(&self, mut compare: F) -> *mut RBNode
    where
        F: FnMut(*const RBNode) -> Ordering,
    {
        let mut i = self.root();
        unsafe {
            while !i.is_null() {
                match compare(i) {
                    Ordering::Less => i = (*i).left(),
                    Ordering::Greater => i = (*i).right(),
                    Ordering::Equal => break,
                }
            }
        }
        i
    }

    /// Walks the tree with `compare` and returns the slot a node with the
    /// searched key would have to be linked at, together with the future
    /// parent. If a node compares equal it is returned as the error instead
    /// and nothing may be linked.
    pub fn find_slot<F>(&self, mut compare: F) -> Result<Slot, *mut RBNode>
    where
        F: FnMut(*const RBNode) -> Ordering,
    {
        let mut parent = std::ptr::null_mut();
        let mut link = self.root_slot();
        unsafe {
            let mut i = (*link).load(atomic::Ordering::Acquire);
            while !i.is_null() {
                match compare(i) {
                    Ordering::Equal => return Err(i),
                    Ordering::Less => {
                        parent = i;
                        link = (*i).left_slot();
                    }
                    Ordering::Greater => {
                        parent = i;
                        link = (*i).right_slot();
                    }
                }
                i = (*link).load(atomic::Ordering::Acquire);
            }
        }
        Ok(Slot { parent, link })
    }

    /// Links `n` at the slot `compare` leads to, or reports
    /// [`TreeError::Occupied`] without touching the tree when an equal node
    /// is already linked.
    ///
    /// # Safety
    /// Same contract as [`RBTree::add`].
    pub unsafe fn insert_unique<F>(&self, compare: F, n: *mut RBNode) -> Result<(), TreeError>
    where
        F: FnMut(*const RBNode) -> Ordering,
    {
        match self.find_slot(compare) {
            Ok(slot) => {
                self.add(slot.parent, slot.link, n);
                Ok(())
            }
            Err(_) => Err(TreeError::Occupied),
        }
    }
}

#[cfg(test)]
#[repr(C)]
struct TestEntry {
    node: RBNode,
    key: u64,
}

#[cfg(test)]
fn key_of(n: *const RBNode) -> u64 {
    unsafe { (*(n as *const TestEntry)).key }
}

#[test]
fn test_find_and_find_slot() {
    unsafe {
        let tree = RBTree::new();
        let entries: Vec<Box<TestEntry>> = (0..64u64)
            .map(|key| {
                Box::new(TestEntry {
                    node: RBNode::new(),
                    key,
                })
            })
            .collect();

        for e in entries.iter() {
            assert!(tree.find(|n| e.key.cmp(&key_of(n))).is_null());
            tree.insert_unique(|n| e.key.cmp(&key_of(n)), &e.node as *const RBNode as *mut RBNode)
                .unwrap();
        }
        assert!(tree.is_valid_red_black_tree());

        for e in entries.iter() {
            let found = tree.find(|n| e.key.cmp(&key_of(n)));
            assert_eq!(found, &e.node as *const RBNode as *mut RBNode);
            // An occupied key yields the linked node, not a slot.
            assert_eq!(tree.find_slot(|n| e.key.cmp(&key_of(n))), Err(found));
        }
        assert!(tree.find(|n| 64u64.cmp(&key_of(n))).is_null());
    }
}

#[test]
fn test_insert_unique_rejects_duplicates() {
    unsafe {
        let tree = RBTree::new();
        let first = Box::new(TestEntry {
            node: RBNode::new(),
            key: 17,
        });
        let second = Box::new(TestEntry {
            node: RBNode::new(),
            key: 17,
        });

        tree.insert_unique(
            |n| first.key.cmp(&key_of(n)),
            &first.node as *const RBNode as *mut RBNode,
        )
        .unwrap();
        let err = tree.insert_unique(
            |n| second.key.cmp(&key_of(n)),
            &second.node as *const RBNode as *mut RBNode,
        );
        assert_eq!(err, Err(TreeError::Occupied));
        assert!(!RBNode::is_linked(&second.node));
    }
}

#[test]
/// Inserting and removing a key leaves no observable trace of it.
fn test_insert_remove_roundtrip() {
    unsafe {
        let tree = RBTree::new();
        let anchor_keys = [10u64, 20, 30];
        let anchors: Vec<Box<TestEntry>> = anchor_keys
            .iter()
            .map(|&key| {
                Box::new(TestEntry {
                    node: RBNode::new(),
                    key,
                })
            })
            .collect();
        for e in anchors.iter() {
            tree.insert_unique(|n| e.key.cmp(&key_of(n)), &e.node as *const RBNode as *mut RBNode)
                .unwrap();
        }

        let e = Box::new(TestEntry {
            node: RBNode::new(),
            key: 25,
        });
        let n = &e.node as *const RBNode as *mut RBNode;
        tree.insert_unique(|c| e.key.cmp(&key_of(c)), n).unwrap();
        assert_eq!(tree.find(|c| 25u64.cmp(&key_of(c))), n);

        tree.remove_init(n);
        assert!(tree.find(|c| 25u64.cmp(&key_of(c))).is_null());
        assert!(tree.is_valid_red_black_tree());
        for (e, &key) in anchors.iter().zip(anchor_keys.iter()) {
            assert_eq!(
                tree.find(|c| key.cmp(&key_of(c))),
                &e.node as *const RBNode as *mut RBNode
            );
        }
    }
}
