//! Height-balanced (AVL) ordered key storage.
//!
//! [`AvlTree`] keeps its nodes in a generational arena and restores the AVL
//! balance condition with single and double rotations after every insert, so
//! lookups and inserts stay O(log n). Keys are unique; inserting an existing
//! key is a no-op.
//!
//! ```
//! use avltree::{AvlTree, TraversalOrder};
//!
//! let mut tree = AvlTree::new();
//! for key in [10, 20, 30, 40, 50, 25] {
//!     tree.insert(key).unwrap();
//! }
//! let preorder: Vec<_> = tree.traverse(TraversalOrder::PreOrder).copied().collect();
//! assert_eq!(preorder, [30, 20, 10, 25, 40, 50]);
//! ```

pub mod arena;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exitcode;
pub mod iter;
pub mod tree_traits;
pub mod util;

pub use arena::{AvlNode, AvlTree};
pub use errors::{SettingsError, TreeError, TreeResult};
pub use iter::{InOrderIter, ParseOrderError, PostOrderIter, PreOrderIter, Traversal, TraversalOrder};
pub use tree_traits::TreeRender;
