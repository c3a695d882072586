#![forbid(unsafe_code)]

//! Tree substrate for hierarchical views: node identities, the tree arena,
//! traversal iterators, and synchronous event plumbing.
//!
//! This crate is the data layer. Selection, expansion, and navigation
//! behavior live in `treetop-model`, built on top of these types.
//!
//! # Example
//!
//! ```
//! use treetop_core::iter::{PreOrder, TraversalOptions};
//! use treetop_core::tree::{NodeSpec, Tree};
//!
//! let tree = Tree::build(
//!     NodeSpec::new("root")
//!         .expanded(true)
//!         .child(NodeSpec::new("src").expanded(false).child(NodeSpec::new("lib.rs")))
//!         .child(NodeSpec::new("README")),
//! )
//! .unwrap();
//!
//! let pruned: Vec<_> =
//!     PreOrder::new(&tree, tree.root(), TraversalOptions::new().prune_collapsed(true))
//!         .collect();
//! // "lib.rs" is hidden under the collapsed "src" node.
//! assert_eq!(pruned.len(), 3);
//! ```

pub mod event;
pub mod iter;
pub mod node;
pub mod tree;

pub use event::{Disposable, DisposableCollection, Emitter};
pub use iter::{BottomToTop, BreadthFirst, PreOrder, TopToBottom, TraversalOptions};
pub use node::{NodeId, NodeIdAllocator, TreeNode};
pub use tree::{NodeSpec, Tree, TreeError};
