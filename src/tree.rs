use colored::Colorize;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::node::{Color, RBNode};

/// Root of a red-black tree.
///
/// The tree owns no memory, only the topology of the links it has been
/// handed. All mutating operations must be serialized by the caller; any
/// number of readers may concurrently walk `left`/`right` (and the root)
/// without synchronization, observing a possibly historical topology that is
/// guaranteed to be loop-free and tear-free.
#[repr(C)]
#[derive(Debug, Default)]
pub struct RBTree {
    root: AtomicPtr<RBNode>,
}

impl RBTree {
    pub const fn new() -> Self {
        RBTree {
            root: AtomicPtr::new(ptr::null_mut()),
        }
    }

    #[inline(always)]
    pub fn root(&self) -> *mut RBNode {
        self.root.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.root().is_null()
    }

    /// Address of the root slot, for [`RBTree::add`] on an empty tree.
    #[inline(always)]
    pub fn root_slot(&self) -> *const AtomicPtr<RBNode> {
        &self.root
    }

    /// Returns the logically first node in order, or null if the tree is
    /// empty.
    pub fn first(&self) -> *mut RBNode {
        unsafe { RBNode::leftmost(self.root()) }
    }

    /// Returns the logically last node in order, or null if the tree is
    /// empty.
    pub fn last(&self) -> *mut RBNode {
        unsafe { RBNode::rightmost(self.root()) }
    }

    /// Returns the first node of a left-to-right post-order traversal, the
    /// left-deepest leaf. Null if the tree is empty.
    pub fn first_postorder(&self) -> *mut RBNode {
        unsafe { RBNode::leftdeepest(self.root()) }
    }

    /// Returns the last node of a left-to-right post-order traversal, which
    /// is always the root. Null if the tree is empty.
    pub fn last_postorder(&self) -> *mut RBNode {
        self.root()
    }

    #[inline(always)]
    fn store_root(&self, n: *mut RBNode) {
        self.root.store(n, Ordering::Release);
    }

    // Repoints the child slot of `p` that holds `old` to `new`, or the root
    // slot if `p` is null. The parent pointer of `new` is left alone, the
    // caller maintains it.
    #[inline(always)]
    unsafe fn swap_child(&self, p: *mut RBNode, old: *mut RBNode, new: *mut RBNode) {
        if !p.is_null() {
            if (*p).left() == old {
                (*p).store_left(new);
            } else {
                (*p).store_right(new);
            }
        } else {
            self.store_root(new);
        }
    }

    /// Links `n` into the tree at the given spot and rebalances.
    ///
    /// The caller provides the exact insertion point: `parent` is the node
    /// to link under (null for an empty tree) and `slot` is the matching
    /// child slot, one of `parent.left_slot()`, `parent.right_slot()`, or
    /// `self.root_slot()`. The caller finds that spot by walking the tree
    /// in its own search order, typically via [`RBTree::find_slot`].
    ///
    /// The previous memory contents of `n` do not matter; in particular a
    /// zeroed link is fine, and [`RBNode::init`] is not required.
    ///
    /// # Safety
    /// `n` must point to a link that stays valid and pinned while linked,
    /// `slot` must belong to `parent` (or be the root slot for a null
    /// parent) and currently hold null, and no other mutating operation may
    /// run concurrently on this tree.
    ///
    /// [`RBTree::find_slot`]: RBTree::find_slot
    pub unsafe fn add(&self, parent: *mut RBNode, slot: *const AtomicPtr<RBNode>, n: *mut RBNode) {
        debug_assert!(!slot.is_null());
        debug_assert!(!n.is_null());
        debug_assert!(
            parent.is_null()
                || slot == (*parent).left_slot()
                || slot == (*parent).right_slot()
        );
        debug_assert!(!parent.is_null() || slot == self.root_slot());

        (*n).set_parent_and_color(parent, Color::Red);
        (*n).store_left(ptr::null_mut());
        (*n).store_right(ptr::null_mut());
        (*slot).store(n, Ordering::Release);

        self.paint(n);
    }

    unsafe fn paint(&self, mut n: *mut RBNode) {
        while !n.is_null() {
            n = self.paint_one(n);
        }
    }

    // Paint a single freshly linked red node according to red-black rules,
    // repainting or rotating as required. Returns the next node to repaint
    // when the fix has to continue further up, or null when done.
    //
    //      p: parent
    //      g: grandparent
    //      gg: grandgrandparent
    //      u: uncle
    //      x: temporary
    unsafe fn paint_one(&self, n: *mut RBNode) -> *mut RBNode {
        let mut p = (*n).parent();

        if p.is_null() {
            // Case 1: reached the root. Paint it black. All leaf paths share
            // the root, so every black count moves in lockstep.
            (*n).set_parent_and_color(p, Color::Black);
            ptr::null_mut()
        } else if (*p).is_black() {
            // Case 2: black parent, red node. No path changed its black
            // count and there is no red-red edge.
            ptr::null_mut()
        } else if p == (*(*p).parent()).left() {
            // The parent is red, so a grandparent must exist.
            let g = (*p).parent();
            let gg = (*g).parent();
            let u = (*g).right();

            if !u.is_null() && (*u).is_red() {
                // Case 3: parent and uncle are red, the grandparent black.
                // Push the black level one step down and continue at the
                // grandparent.
                (*p).set_parent_and_color(g, Color::Black);
                (*u).set_parent_and_color(g, Color::Black);
                (*g).set_parent_and_color(gg, Color::Red);
                g
            } else {
                if n == (*p).right() {
                    // Case 4: red inner child. Rotate at the parent so the
                    // node becomes the outer child, then handle it as
                    // case 5 with the former parent in the node role.
                    let x = (*n).left();
                    (*p).store_right(x);
                    (*n).store_left(p);
                    if !x.is_null() {
                        (*x).set_parent_and_color(p, Color::Black);
                    }
                    (*p).set_parent_and_color(n, Color::Red);
                    p = n;
                }

                // Case 5: red outer child under a red parent, black uncle.
                // Rotate at the grandparent and swap colors of parent and
                // grandparent. Black counts are unchanged and the red-red
                // edge is gone.
                let x = (*p).right();
                (*g).store_left(x);
                (*p).store_right(g);
                if !x.is_null() {
                    (*x).set_parent_and_color(g, Color::Black);
                }
                (*p).set_parent_and_color(gg, Color::Black);
                (*g).set_parent_and_color(p, Color::Red);
                self.swap_child(gg, g, p);
                ptr::null_mut()
            }
        } else {
            // Mirror of the block above, left and right exchanged.
            let g = (*p).parent();
            let gg = (*g).parent();
            let u = (*g).left();

            if !u.is_null() && (*u).is_red() {
                (*p).set_parent_and_color(g, Color::Black);
                (*u).set_parent_and_color(g, Color::Black);
                (*g).set_parent_and_color(gg, Color::Red);
                g
            } else {
                if n == (*p).left() {
                    let x = (*n).right();
                    (*p).store_left(x);
                    (*n).store_right(p);
                    if !x.is_null() {
                        (*x).set_parent_and_color(p, Color::Black);
                    }
                    (*p).set_parent_and_color(n, Color::Red);
                    p = n;
                }

                let x = (*p).left();
                (*g).store_right(x);
                (*p).store_left(g);
                if !x.is_null() {
                    (*x).set_parent_and_color(g, Color::Black);
                }
                (*p).set_parent_and_color(gg, Color::Black);
                (*g).set_parent_and_color(p, Color::Red);
                self.swap_child(gg, g, p);
                ptr::null_mut()
            }
        }
    }

    /// Unlinks `n` from the tree and rebalances.
    ///
    /// For performance this never writes to `n` itself: on return `n` still
    /// holds its former neighbors. Call [`RBNode::init`] (or use
    /// [`RBTree::remove_init`]) before relying on [`RBNode::is_linked`].
    ///
    /// # Safety
    /// `n` must be linked in this very tree, and no other mutating
    /// operation may run concurrently on it.
    pub unsafe fn remove(&self, n: *mut RBNode) {
        debug_assert!(RBNode::is_linked(n));

        // Three removal shapes:
        //  * no children: unlink, rebalance if the node was black
        //  * one child: the child must be red, splice it in and turn it
        //    black, adopting the removed node's color
        //  * two children: swap with the in-order successor (which cannot
        //    have a left child) and reduce to one of the above
        //
        //      p: parent of the physically removed position
        //      s: successor
        //      gc: grandchild displaced by the successor
        //      x: temporary
        //      next: node to start rebalancing on, if any
        let mut next: *mut RBNode = ptr::null_mut();

        if (*n).left().is_null() {
            let p = (*n).parent();
            let c = (*n).color();
            let right = (*n).right();
            self.swap_child(p, n, right);
            if !right.is_null() {
                (*right).set_parent_and_color(p, c);
            } else if c == Color::Black {
                next = p;
            }
        } else if (*n).right().is_null() {
            let p = (*n).parent();
            let c = (*n).color();
            let left = (*n).left();
            self.swap_child(p, n, left);
            (*left).set_parent_and_color(p, c);
        } else {
            let mut s = (*n).right();
            let p;
            let gc;
            if (*s).left().is_null() {
                // The right child is the successor itself; its own right
                // subtree stays in place.
                p = s;
                gc = (*s).right();
            } else {
                // Deeper successor: unlink it from under its parent first.
                // Its outgoing links are published before the parent slot
                // is redirected to it, so a lockless reader never sees a
                // transient loop.
                s = RBNode::leftmost(s);
                p = (*s).parent();

                gc = (*s).right();
                (*p).store_left(gc);
                (*s).store_right((*n).right());
                (*(*n).right()).set_parent(s);
            }

            // The successor now takes over the removed node's place.
            (*s).store_left((*n).left());
            (*(*n).left()).set_parent(s);

            let x = (*n).parent();
            let c = (*n).color();
            self.swap_child(x, n, s);
            if !gc.is_null() {
                (*gc).set_parent_and_color(p, Color::Black);
            } else if (*s).is_black() {
                next = p;
            }
            (*s).set_parent_and_color(x, c);
        }

        if !next.is_null() {
            self.rebalance(next);
        }
    }

    /// Removes `n` from the tree if it is linked, then reinitializes it.
    ///
    /// Unlike [`RBTree::remove`] this tolerates null and unlinked nodes, in
    /// which case it is a no-op.
    ///
    /// # Safety
    /// `n` must be null, initialized, or linked in this very tree, and no
    /// other mutating operation may run concurrently on it.
    pub unsafe fn remove_init(&self, n: *mut RBNode) {
        if RBNode::is_linked(n) {
            self.remove(n);
            (*n).init();
        }
    }

    unsafe fn rebalance(&self, mut p: *mut RBNode) {
        let mut n: *mut RBNode = ptr::null_mut();

        loop {
            n = self.rebalance_one(p, n);
            if n.is_null() {
                break;
            }
            p = (*n).parent();
            if p.is_null() {
                break;
            }
        }
    }

    // Rebalance one level after removal of a black node: all paths through
    // `n` (the possibly-null child of `p` on the deficient side) carry one
    // black node less than their siblings. Returns the node to continue the
    // recursive fixup on, or null when done.
    //
    //      s: sibling
    //      g: grandparent
    //      x, y: temporaries
    unsafe fn rebalance_one(&self, p: *mut RBNode, n: *mut RBNode) -> *mut RBNode {
        if n == (*p).left() {
            let mut s = (*p).right();
            if (*s).is_red() {
                // Case 3: red sibling. Rotate it above the parent so the
                // deficient side gains a black ancestor, and continue with
                // the new (black) sibling.
                let g = (*p).parent();
                let x = (*s).left();
                (*p).store_right(x);
                (*s).store_left(p);
                (*x).set_parent_and_color(p, Color::Black);
                (*s).set_parent_and_color(g, (*p).color());
                (*p).set_parent_and_color(s, Color::Red);
                self.swap_child(g, p, s);
                s = x;
            }

            let mut x = (*s).right();
            if x.is_null() || (*x).is_black() {
                let y = (*s).left();
                if y.is_null() || (*y).is_black() {
                    // Case 4: black sibling with two black children. Flip
                    // the sibling red. If the parent is red, turning it
                    // black settles the deficit; otherwise the whole
                    // subtree is now one black short and the fix moves up.
                    (*s).set_parent_and_color(p, Color::Red);
                    if (*p).is_black() {
                        return p;
                    }

                    (*p).set_parent_and_color((*p).parent(), Color::Black);
                    return ptr::null_mut();
                }

                // Case 5: the sibling's near child is red, its far child
                // black. Rotate at the sibling so the far child turns red,
                // then fall through to case 6.
                let x2 = (*y).right();
                (*s).store_left(x2);
                (*y).store_right(s);
                (*p).store_right(y);
                if !x2.is_null() {
                    (*x2).set_parent_and_color(s, Color::Black);
                }
                x = s;
                s = y;
            }

            // Case 6: the sibling's far child is red. Rotate left at the
            // parent and flip colors; the deficient side gains the black
            // node that used to sit on the sibling.
            let g = (*p).parent();
            let y = (*s).left();
            (*p).store_right(y);
            (*s).store_left(p);
            (*x).set_parent_and_color(s, Color::Black);
            if !y.is_null() {
                (*y).set_parent(p);
            }
            (*s).set_parent_and_color(g, (*p).color());
            (*p).set_parent_and_color(s, Color::Black);
            self.swap_child(g, p, s);
        } else {
            // Mirror of the block above, left and right exchanged.
            let mut s = (*p).left();
            if (*s).is_red() {
                let g = (*p).parent();
                let x = (*s).right();
                (*p).store_left(x);
                (*s).store_right(p);
                (*x).set_parent_and_color(p, Color::Black);
                (*s).set_parent_and_color(g, (*p).color());
                (*p).set_parent_and_color(s, Color::Red);
                self.swap_child(g, p, s);
                s = x;
            }

            let mut x = (*s).left();
            if x.is_null() || (*x).is_black() {
                let y = (*s).right();
                if y.is_null() || (*y).is_black() {
                    (*s).set_parent_and_color(p, Color::Red);
                    if (*p).is_black() {
                        return p;
                    }

                    (*p).set_parent_and_color((*p).parent(), Color::Black);
                    return ptr::null_mut();
                }

                let x2 = (*y).left();
                (*s).store_right(x2);
                (*y).store_left(s);
                (*p).store_left(y);
                if !x2.is_null() {
                    (*x2).set_parent_and_color(s, Color::Black);
                }
                x = s;
                s = y;
            }

            let g = (*p).parent();
            let y = (*s).right();
            (*p).store_left(y);
            (*s).store_right(p);
            (*x).set_parent_and_color(s, Color::Black);
            if !y.is_null() {
                (*y).set_parent(p);
            }
            (*s).set_parent_and_color(g, (*p).color());
            (*p).set_parent_and_color(s, Color::Black);
            self.swap_child(g, p, s);
        }

        ptr::null_mut()
    }

    /// Validates the red-black invariants of the whole tree: black root,
    /// no red node with a red child, equal black counts on every path to an
    /// absent child, and parent pointers agreeing with child pointers.
    pub fn is_valid_red_black_tree(&self) -> bool {
        unsafe {
            let root = self.root();
            if root.is_null() {
                return true;
            }
            if (*root).is_red() || !(*root).parent().is_null() {
                return false;
            }

            let mut stack = vec![(root, 0u32)];
            let mut black_count = vec![];

            while let Some((node, mut count)) = stack.pop() {
                count += (*node).is_black() as u32;
                for child in [(*node).left(), (*node).right()] {
                    if child.is_null() {
                        black_count.push(count);
                        continue;
                    }
                    if (*node).is_red() && (*child).is_red() {
                        return false;
                    }
                    if (*child).parent() != node {
                        return false;
                    }
                    stack.push((child, count));
                }
            }
            // All paths to an absent child must carry the same black count.
            black_count.iter().all(|&x| x == black_count[0])
        }
    }

    /// Renders the tree to stdout, red nodes colored, labeling each node
    /// with the caller-supplied formatter.
    pub fn pretty_print<F>(&self, label: F)
    where
        F: Fn(*const RBNode) -> String,
    {
        let mut s = String::new();
        let mut stack = vec![(self.root(), "".to_string(), "".to_string())];

        while let Some((node, mut padding, pointer)) = stack.pop() {
            if node.is_null() {
                continue;
            }
            unsafe {
                s.push_str(&padding);
                s.push_str(&pointer);
                let text = label(node);
                if (*node).is_red() {
                    s.push_str(&format!("{}", text.red()));
                } else {
                    s.push_str(&text);
                }
                s.push('\n');
                padding.push_str("│  ");

                let right_pointer = "└──".to_string();
                let left_pointer = if !(*node).right().is_null() {
                    "├──".to_string()
                } else {
                    "└──".to_string()
                };

                stack.push(((*node).right(), padding.clone(), right_pointer));
                stack.push(((*node).left(), padding.clone(), left_pointer));
            }
        }
        println!("{}", s);
    }
}

#[cfg(test)]
#[repr(C)]
struct TestEntry {
    node: RBNode,
    key: u64,
}

#[cfg(test)]
fn entry(key: u64) -> Box<TestEntry> {
    Box::new(TestEntry {
        node: RBNode::new(),
        key,
    })
}

#[cfg(test)]
fn key_of(n: *const RBNode) -> u64 {
    unsafe { (*(n as *const TestEntry)).key }
}

#[cfg(test)]
unsafe fn insert_entry(tree: &RBTree, e: &TestEntry) {
    let slot = tree.find_slot(|n| e.key.cmp(&key_of(n))).unwrap();
    tree.add(slot.parent, slot.link, &e.node as *const RBNode as *mut RBNode);
}

#[cfg(test)]
unsafe fn inorder_keys(tree: &RBTree) -> Vec<u64> {
    let mut keys = vec![];
    let mut n = tree.first();
    while !n.is_null() {
        keys.push(key_of(n));
        n = RBNode::next(n);
    }
    keys
}

#[cfg(test)]
unsafe fn height(n: *mut RBNode) -> usize {
    if n.is_null() {
        0
    } else {
        1 + height((*n).left()).max(height((*n).right()))
    }
}

#[test]
/// Inserting 3, 1, 2 exercises the inner-child double rotation and must end
/// with 2 as the black root and 1, 3 as red children.
fn test_insert_three_nodes() {
    unsafe {
        let tree = RBTree::new();
        let entries = [entry(3), entry(1), entry(2)];
        for e in entries.iter() {
            insert_entry(&tree, e);
            assert!(tree.is_valid_red_black_tree());
        }

        let root = tree.root();
        assert_eq!(key_of(root), 2);
        assert!((*root).is_black());
        assert_eq!(key_of((*root).left()), 1);
        assert_eq!(key_of((*root).right()), 3);
        assert!((*(*root).left()).is_red());
        assert!((*(*root).right()).is_red());
        assert_eq!(inorder_keys(&tree), vec![1, 2, 3]);
    }
}

#[test]
/// Ascending insertion degenerates without rebalancing; the paint loop must
/// keep the tree at logarithmic height.
fn test_ascending_insert_stays_balanced() {
    unsafe {
        let tree = RBTree::new();
        let entries: Vec<_> = (1..=15u64).map(entry).collect();
        for e in entries.iter() {
            insert_entry(&tree, e);
            assert!(tree.is_valid_red_black_tree());
        }
        assert!(height(tree.root()) <= 6);
        assert_eq!(inorder_keys(&tree), (1..=15).collect::<Vec<_>>());
    }
}

#[test]
fn test_single_node() {
    unsafe {
        let tree = RBTree::new();
        assert!(tree.is_empty());
        assert!(tree.first().is_null());
        assert!(tree.last().is_null());
        assert!(tree.first_postorder().is_null());
        assert!(tree.last_postorder().is_null());

        let e = entry(7);
        insert_entry(&tree, &e);
        let n = &e.node as *const RBNode as *mut RBNode;

        assert!((*n).is_black());
        assert_eq!(tree.first(), n);
        assert_eq!(tree.last(), n);
        assert_eq!(tree.first_postorder(), n);
        assert_eq!(tree.last_postorder(), n);

        tree.remove_init(n);
        assert!(tree.is_empty());
        assert!(!RBNode::is_linked(n));
    }
}

#[test]
fn test_two_nodes_both_orientations() {
    unsafe {
        for keys in [[1u64, 2], [2, 1]] {
            let tree = RBTree::new();
            let entries: Vec<_> = keys.iter().map(|&k| entry(k)).collect();
            for e in entries.iter() {
                insert_entry(&tree, e);
                assert!(tree.is_valid_red_black_tree());
            }

            let root = tree.root();
            assert_eq!(key_of(root), keys[0]);
            assert!((*root).is_black());
            let child = if keys[0] < keys[1] {
                (*root).right()
            } else {
                (*root).left()
            };
            assert_eq!(key_of(child), keys[1]);
            assert!((*child).is_red());

            assert_eq!(key_of(tree.first()), 1);
            assert_eq!(key_of(tree.last()), 2);
            assert_eq!(inorder_keys(&tree), vec![1, 2]);
        }
    }
}

#[test]
/// Removing a black node whose only child is red must repaint that child
/// black in place, with no further rebalancing.
fn test_remove_black_node_with_red_child() {
    unsafe {
        let tree = RBTree::new();
        let entries: Vec<_> = [2u64, 1, 3, 4].iter().map(|&k| entry(k)).collect();
        for e in entries.iter() {
            insert_entry(&tree, e);
        }

        // 3 is black with the single red child 4.
        let n3 = &entries[2].node as *const RBNode as *mut RBNode;
        let n4 = &entries[3].node as *const RBNode as *mut RBNode;
        assert!((*n3).is_black());
        assert!((*n4).is_red());
        assert_eq!((*n3).right(), n4);
        assert!((*n3).left().is_null());

        tree.remove(n3);
        assert!((*n4).is_black());
        assert_eq!((*n4).parent(), tree.root());
        assert!(tree.is_valid_red_black_tree());
        assert_eq!(inorder_keys(&tree), vec![1, 2, 4]);
    }
}

#[test]
/// A bare `remove` never writes to the removed node: it still reads as
/// linked and keeps pointing at its former neighbors until reinitialized.
fn test_remove_does_not_touch_node() {
    unsafe {
        let tree = RBTree::new();
        let entries: Vec<_> = [2u64, 1, 3].iter().map(|&k| entry(k)).collect();
        for e in entries.iter() {
            insert_entry(&tree, e);
        }

        // Remove the root, which has children on both sides.
        let n = &entries[0].node as *const RBNode as *mut RBNode;
        let left = (*n).left();
        let right = (*n).right();
        let parent = (*n).parent();
        let color = (*n).color();

        tree.remove(n);

        assert!(RBNode::is_linked(n));
        assert_eq!((*n).left(), left);
        assert_eq!((*n).right(), right);
        assert_eq!((*n).parent(), parent);
        assert_eq!((*n).color(), color);

        assert!(tree.is_valid_red_black_tree());
        assert_eq!(inorder_keys(&tree), vec![1, 3]);

        (*n).init();
        assert!(!RBNode::is_linked(n));
    }
}

#[test]
/// Removing an interior node with a distant successor exercises the partial
/// successor swap.
fn test_remove_with_deep_successor() {
    unsafe {
        let tree = RBTree::new();
        let entries: Vec<_> = [8u64, 4, 12, 2, 6, 10, 14, 9, 11]
            .iter()
            .map(|&k| entry(k))
            .collect();
        for e in entries.iter() {
            insert_entry(&tree, e);
            assert!(tree.is_valid_red_black_tree());
        }

        // 8 has two children and its successor 9 sits under 10.
        let n8 = &entries[0].node as *const RBNode as *mut RBNode;
        tree.remove(n8);
        assert!(tree.is_valid_red_black_tree());
        assert_eq!(inorder_keys(&tree), vec![2, 4, 6, 9, 10, 11, 12, 14]);
    }
}

#[test]
fn test_add_accepts_zeroed_node() {
    unsafe {
        use bytemuck::Zeroable;

        let tree = RBTree::new();
        let e = Box::new(TestEntry {
            node: RBNode::zeroed(),
            key: 1,
        });
        insert_entry(&tree, &e);
        assert!(RBNode::is_linked(&e.node));
        assert!(tree.is_valid_red_black_tree());
    }
}

#[test]
fn test_invalid_trees_are_rejected() {
    unsafe {
        // Red root.
        let tree = RBTree::new();
        let e = entry(1);
        let n = &e.node as *const RBNode as *mut RBNode;
        insert_entry(&tree, &e);
        (*n).set_parent_and_color(ptr::null_mut(), Color::Red);
        assert!(!tree.is_valid_red_black_tree());
        (*n).set_parent_and_color(ptr::null_mut(), Color::Black);

        // Unequal black counts: a lone black child on one side.
        let e2 = entry(2);
        let n2 = &e2.node as *const RBNode as *mut RBNode;
        (*n).store_right(n2);
        (*n2).set_parent_and_color(n, Color::Black);
        assert!(!tree.is_valid_red_black_tree());

        // Parent pointer disagreeing with the child slot.
        (*n2).set_parent_and_color(ptr::null_mut(), Color::Red);
        assert!(!tree.is_valid_red_black_tree());
    }
}
