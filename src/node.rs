use bytemuck::Zeroable;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

/// Mask of the color bit inside the packed parent word.
pub const COLOR_MASK: usize = 1;

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
pub enum Color {
    Red = 0,
    Black = 1,
}

/// Link record embedded into every object that participates in a tree.
///
/// The container never allocates: callers own the object the link lives in
/// and hand the tree raw `*mut RBNode` references. `left` and `right` are
/// published with single-word release stores, so readers may chase them
/// without holding any lock. The third word packs the parent pointer and the
/// color bit into one value, using the low address bit that is always zero
/// for a node aligned to at least 2 bytes.
///
/// Parent pointers are writer-side state only. A lockless reader must never
/// follow them.
#[repr(C)]
#[derive(Debug, Default)]
pub struct RBNode {
    parent_and_color: AtomicUsize,
    left: AtomicPtr<RBNode>,
    right: AtomicPtr<RBNode>,
}

// An all-zero link is the valid "fresh, never linked" state accepted by
// `RBTree::add`, so payload structs can derive their own `Zeroable` on top.
unsafe impl Zeroable for RBNode {}

const _: () = assert!(std::mem::align_of::<RBNode>() >= 2);

impl RBNode {
    pub const fn new() -> Self {
        RBNode {
            parent_and_color: AtomicUsize::new(0),
            left: AtomicPtr::new(ptr::null_mut()),
            right: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Marks the node as unlinked.
    ///
    /// The node is set to a state that can never occur while linked in a
    /// tree: the parent slot refers to the node itself. `RBTree::add` does
    /// not require this, but initialized nodes can be queried with
    /// [`RBNode::is_linked`] and passed to [`RBTree::remove_init`] at any
    /// point of their lifetime.
    ///
    /// [`RBTree::remove_init`]: crate::tree::RBTree::remove_init
    pub fn init(&self) {
        self.parent_and_color
            .store(self as *const RBNode as usize, Ordering::Relaxed);
        self.left.store(ptr::null_mut(), Ordering::Release);
        self.right.store(ptr::null_mut(), Ordering::Release);
    }

    /// Returns whether `n` is linked in a tree.
    ///
    /// Null and initialized-but-unlinked nodes report false.
    ///
    /// # Safety
    /// `n` must be null, initialized, or linked. Calling this on a node that
    /// was removed but never reinitialized reads stale link state.
    #[inline(always)]
    pub unsafe fn is_linked(n: *const RBNode) -> bool {
        !n.is_null() && (*n).parent_and_color.load(Ordering::Relaxed) != n as usize
    }

    #[inline(always)]
    pub fn left(&self) -> *mut RBNode {
        self.left.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn right(&self) -> *mut RBNode {
        self.right.load(Ordering::Acquire)
    }

    // Returns the parent node, masked out of the packed word. Null for the
    // root, the node itself for an initialized unlinked node. Writer-side
    // state, never handed to readers.
    #[inline(always)]
    pub(crate) fn parent(&self) -> *mut RBNode {
        (self.parent_and_color.load(Ordering::Relaxed) & !COLOR_MASK) as *mut RBNode
    }

    #[inline(always)]
    pub(crate) fn color(&self) -> Color {
        Color::from_usize(self.parent_and_color.load(Ordering::Relaxed) & COLOR_MASK).unwrap()
    }

    #[inline(always)]
    pub(crate) fn is_red(&self) -> bool {
        self.color() == Color::Red
    }

    #[inline(always)]
    pub(crate) fn is_black(&self) -> bool {
        self.color() == Color::Black
    }

    /// Address of the left child slot, for [`RBTree::add`].
    ///
    /// [`RBTree::add`]: crate::tree::RBTree::add
    #[inline(always)]
    pub fn left_slot(&self) -> *const AtomicPtr<RBNode> {
        &self.left
    }

    /// Address of the right child slot, for [`RBTree::add`].
    ///
    /// [`RBTree::add`]: crate::tree::RBTree::add
    #[inline(always)]
    pub fn right_slot(&self) -> *const AtomicPtr<RBNode> {
        &self.right
    }

    // Plain assignment of the packed (parent, color) pair, as one word.
    #[inline(always)]
    pub(crate) fn set_parent_and_color(&self, parent: *mut RBNode, color: Color) {
        debug_assert!(parent as usize & COLOR_MASK == 0);
        self.parent_and_color
            .store(parent as usize | color as usize, Ordering::Relaxed);
    }

    // Same, but keeps the current color.
    #[inline(always)]
    pub(crate) fn set_parent(&self, parent: *mut RBNode) {
        self.set_parent_and_color(parent, self.color());
    }

    // Child pointers are published with release ordering as single words.
    // Readers walking `left`/`right` lock-free then observe every rotation
    // as a sequence of loop-free intermediate trees, never a torn pointer.
    #[inline(always)]
    pub(crate) fn store_left(&self, child: *mut RBNode) {
        self.left.store(child, Ordering::Release);
    }

    #[inline(always)]
    pub(crate) fn store_right(&self, child: *mut RBNode) {
        self.right.store(child, Ordering::Release);
    }

    /// Descends into left children until none remains. Returns `n` itself if
    /// it has no left child, null if `n` is null.
    pub unsafe fn leftmost(mut n: *mut RBNode) -> *mut RBNode {
        if !n.is_null() {
            while !(*n).left().is_null() {
                n = (*n).left();
            }
        }
        n
    }

    /// Mirror of [`RBNode::leftmost`].
    pub unsafe fn rightmost(mut n: *mut RBNode) -> *mut RBNode {
        if !n.is_null() {
            while !(*n).right().is_null() {
                n = (*n).right();
            }
        }
        n
    }

    /// Descends to the deepest node reachable by preferring left children
    /// over right children. This is the first node of a left-to-right
    /// post-order traversal of the subtree under `n`.
    pub unsafe fn leftdeepest(mut n: *mut RBNode) -> *mut RBNode {
        if !n.is_null() {
            loop {
                if !(*n).left().is_null() {
                    n = (*n).left();
                } else if !(*n).right().is_null() {
                    n = (*n).right();
                } else {
                    break;
                }
            }
        }
        n
    }

    /// Mirror of [`RBNode::leftdeepest`].
    pub unsafe fn rightdeepest(mut n: *mut RBNode) -> *mut RBNode {
        if !n.is_null() {
            loop {
                if !(*n).right().is_null() {
                    n = (*n).right();
                } else if !(*n).left().is_null() {
                    n = (*n).left();
                } else {
                    break;
                }
            }
        }
        n
    }

    /// Returns the in-order successor of `n`, or null if `n` is the last
    /// node, unlinked, or null.
    ///
    /// # Safety
    /// `n` must be null, initialized, or linked in a tree, and the caller
    /// must hold off concurrent writers (this walks parent pointers).
    pub unsafe fn next(mut n: *mut RBNode) -> *mut RBNode {
        if !RBNode::is_linked(n) {
            return ptr::null_mut();
        }
        if !(*n).right().is_null() {
            return RBNode::leftmost((*n).right());
        }

        let mut p = (*n).parent();
        while !p.is_null() && n == (*p).right() {
            n = p;
            p = (*p).parent();
        }
        p
    }

    /// Returns the in-order predecessor of `n`, or null if `n` is the first
    /// node, unlinked, or null.
    ///
    /// # Safety
    /// Same contract as [`RBNode::next`].
    pub unsafe fn prev(mut n: *mut RBNode) -> *mut RBNode {
        if !RBNode::is_linked(n) {
            return ptr::null_mut();
        }
        if !(*n).left().is_null() {
            return RBNode::rightmost((*n).left());
        }

        let mut p = (*n).parent();
        while !p.is_null() && n == (*p).left() {
            n = p;
            p = (*p).parent();
        }
        p
    }

    /// Returns the successor of `n` in a left-to-right post-order traversal,
    /// or null if `n` is the root, unlinked, or null.
    ///
    /// # Safety
    /// Same contract as [`RBNode::next`].
    pub unsafe fn next_postorder(n: *mut RBNode) -> *mut RBNode {
        if !RBNode::is_linked(n) {
            return ptr::null_mut();
        }

        let p = (*n).parent();
        if !p.is_null() && n == (*p).left() && !(*p).right().is_null() {
            return RBNode::leftdeepest((*p).right());
        }
        p
    }

    /// Returns the predecessor of `n` in a left-to-right post-order
    /// traversal, or null if `n` is the left-deepest node, unlinked, or
    /// null. Inverse of [`RBNode::next_postorder`] wherever that returns a
    /// node:
    ///
    /// ```text
    /// n == prev_postorder(next_postorder(n))
    /// ```
    ///
    /// Walking this from the tree root performs a right-to-left pre-order
    /// traversal, since a reverse post-order traversal is a pre-order one.
    ///
    /// # Safety
    /// Same contract as [`RBNode::next`].
    pub unsafe fn prev_postorder(mut n: *mut RBNode) -> *mut RBNode {
        if !RBNode::is_linked(n) {
            return ptr::null_mut();
        }
        if !(*n).right().is_null() {
            return (*n).right();
        }
        if !(*n).left().is_null() {
            return (*n).left();
        }

        loop {
            let p = (*n).parent();
            if p.is_null() {
                return ptr::null_mut();
            }
            if !(*p).left().is_null() && n != (*p).left() {
                return (*p).left();
            }
            n = p;
        }
    }
}

#[test]
fn test_parent_and_color_packing() {
    let node = RBNode::new();
    let parent = Box::new(RBNode::new());
    let p = &*parent as *const RBNode as *mut RBNode;

    node.set_parent_and_color(p, Color::Red);
    assert_eq!(node.parent(), p);
    assert_eq!(node.color(), Color::Red);
    assert!(node.is_red());

    node.set_parent_and_color(p, Color::Black);
    assert_eq!(node.parent(), p);
    assert_eq!(node.color(), Color::Black);
    assert!(node.is_black());

    // Reparenting alone must not disturb the color bit.
    node.set_parent(ptr::null_mut());
    assert_eq!(node.parent(), ptr::null_mut());
    assert_eq!(node.color(), Color::Black);
}

#[test]
fn test_init_and_is_linked() {
    unsafe {
        assert!(!RBNode::is_linked(ptr::null()));

        let node = Box::new(RBNode::new());
        node.init();
        assert!(!RBNode::is_linked(&*node));
        assert_eq!(node.parent(), &*node as *const RBNode as *mut RBNode);
        assert_eq!(node.color(), Color::Red);

        // A root-like state (no parent) counts as linked.
        node.set_parent_and_color(ptr::null_mut(), Color::Black);
        assert!(RBNode::is_linked(&*node));
    }
}

#[cfg(test)]
fn link_fixture() -> Vec<Box<RBNode>> {
    // Hand-built tree, indices in in-order positions:
    //        1
    //       / \
    //      0   2
    let nodes: Vec<Box<RBNode>> = (0..3).map(|_| Box::new(RBNode::new())).collect();
    let n0 = &*nodes[0] as *const RBNode as *mut RBNode;
    let n1 = &*nodes[1] as *const RBNode as *mut RBNode;
    let n2 = &*nodes[2] as *const RBNode as *mut RBNode;
    nodes[1].set_parent_and_color(ptr::null_mut(), Color::Black);
    nodes[1].store_left(n0);
    nodes[1].store_right(n2);
    nodes[0].set_parent_and_color(n1, Color::Red);
    nodes[2].set_parent_and_color(n1, Color::Red);
    nodes
}

#[test]
fn test_next_prev_inverse() {
    unsafe {
        let nodes = link_fixture();
        let ptrs: Vec<*mut RBNode> = nodes
            .iter()
            .map(|n| &**n as *const RBNode as *mut RBNode)
            .collect();

        assert_eq!(RBNode::next(ptrs[0]), ptrs[1]);
        assert_eq!(RBNode::next(ptrs[1]), ptrs[2]);
        assert_eq!(RBNode::next(ptrs[2]), ptr::null_mut());

        assert_eq!(RBNode::prev(ptrs[2]), ptrs[1]);
        assert_eq!(RBNode::prev(ptrs[1]), ptrs[0]);
        assert_eq!(RBNode::prev(ptrs[0]), ptr::null_mut());

        for w in ptrs.windows(2) {
            assert_eq!(RBNode::next(RBNode::prev(w[1])), w[1]);
            assert_eq!(RBNode::prev(RBNode::next(w[0])), w[0]);
        }

        let unlinked = Box::new(RBNode::new());
        unlinked.init();
        let u = &*unlinked as *const RBNode as *mut RBNode;
        assert_eq!(RBNode::next(u), ptr::null_mut());
        assert_eq!(RBNode::prev(u), ptr::null_mut());
    }
}

#[test]
fn test_postorder_neighbors() {
    unsafe {
        let nodes = link_fixture();
        let ptrs: Vec<*mut RBNode> = nodes
            .iter()
            .map(|n| &**n as *const RBNode as *mut RBNode)
            .collect();

        // Post-order visits 0, 2, 1.
        assert_eq!(RBNode::leftdeepest(ptrs[1]), ptrs[0]);
        assert_eq!(RBNode::next_postorder(ptrs[0]), ptrs[2]);
        assert_eq!(RBNode::next_postorder(ptrs[2]), ptrs[1]);
        assert_eq!(RBNode::next_postorder(ptrs[1]), ptr::null_mut());

        assert_eq!(RBNode::prev_postorder(ptrs[1]), ptrs[2]);
        assert_eq!(RBNode::prev_postorder(ptrs[2]), ptrs[0]);
        assert_eq!(RBNode::prev_postorder(ptrs[0]), ptr::null_mut());

        for &n in &ptrs[..2] {
            assert_eq!(RBNode::prev_postorder(RBNode::next_postorder(n)), n);
        }
    }
}

#[test]
fn test_deepest_on_chain() {
    unsafe {
        assert_eq!(RBNode::leftmost(ptr::null_mut()), ptr::null_mut());
        assert_eq!(RBNode::rightdeepest(ptr::null_mut()), ptr::null_mut());

        // Zig-zag chain: root -> right child -> its left child.
        let nodes: Vec<Box<RBNode>> = (0..3).map(|_| Box::new(RBNode::new())).collect();
        let root = &*nodes[0] as *const RBNode as *mut RBNode;
        let mid = &*nodes[1] as *const RBNode as *mut RBNode;
        let leaf = &*nodes[2] as *const RBNode as *mut RBNode;
        nodes[0].set_parent_and_color(ptr::null_mut(), Color::Black);
        nodes[0].store_right(mid);
        nodes[1].set_parent_and_color(root, Color::Black);
        nodes[1].store_left(leaf);
        nodes[2].set_parent_and_color(mid, Color::Red);

        assert_eq!(RBNode::leftmost(root), root);
        assert_eq!(RBNode::rightmost(root), mid);
        assert_eq!(RBNode::leftdeepest(root), leaf);
        assert_eq!(RBNode::rightdeepest(root), leaf);
    }
}
