//! Canopy: intrusive red-black trees with lockless concurrent reader
//! traversal.
//!
//! Callers embed an [`RBNode`] link into their own payload structs and hand
//! the tree raw references to it; the tree manages topology and rebalancing
//! only. It allocates nothing, compares nothing, and owns no payload
//! memory. Lookups are driven by the caller (see [`RBTree::find`] and
//! [`RBTree::find_slot`]), which keeps key types entirely out of the core.
//!
//! A single writer may mutate a tree while any number of readers traverse
//! `left`/`right` links without locks. Readers observe a possibly
//! historical topology but never a cycle or a torn pointer. Writers must be
//! serialized externally, and every node linked into a tree must stay valid
//! and pinned in memory until it is removed.

pub mod map;
pub mod node;
pub mod tree;

pub use map::Slot;
pub use map::TreeError;
pub use node::Color;
pub use node::RBNode;
pub use tree::RBTree;
