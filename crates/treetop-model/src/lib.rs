#![forbid(unsafe_code)]

//! Multi-selection machinery for hierarchical tree views.
//!
//! The centerpiece is the gesture-stack [`SelectionState`]: point toggles
//! (ctrl-click) and contiguous ranges (shift-click) are kept as a history of
//! gestures, and the ordered, most-recent-first list of selected nodes is a
//! projection of that history. The [`SelectionService`] turns accepted
//! gestures into flag writes and change events; the [`TreeModel`] façade
//! adds range computation, keyboard navigation, open/navigate wiring, and
//! collapse reconciliation on top.
//!
//! # Example
//!
//! ```
//! use treetop_core::tree::{NodeSpec, Tree};
//! use treetop_model::model::TreeModel;
//! use treetop_model::state::Gesture;
//!
//! let tree = Tree::build(
//!     NodeSpec::new("root")
//!         .expanded(true)
//!         .child(NodeSpec::new("a"))
//!         .child(NodeSpec::new("b"))
//!         .child(NodeSpec::new("c")),
//! )
//! .unwrap();
//! let a = tree.find("a").unwrap();
//! let c = tree.find("c").unwrap();
//!
//! let mut model = TreeModel::from_tree(tree);
//! model.add_selection(Gesture::Toggle(a));
//! model.add_selection(Gesture::Range(c));
//!
//! // Most-recent first: the range head is the shift-clicked node.
//! let selected = model.selected_nodes();
//! assert_eq!(selected.len(), 3);
//! assert_eq!(selected[0], c);
//! ```

pub mod expansion;
pub mod model;
pub mod navigation;
pub mod service;
pub mod state;

pub use expansion::ExpansionService;
pub use model::TreeModel;
pub use navigation::NavigationHistory;
pub use service::SelectionService;
pub use state::{Gesture, SelectionState, SelectionStateError, StackEntry};
