//! Lazy traversals over an [`AvlTree`].
//!
//! Every iterator walks the arena with an explicit stack bounded by the tree
//! height, borrows the tree immutably and yields `&K`.

use std::fmt;
use std::str::FromStr;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arena::AvlTree;

/// Order in which a traversal visits the keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TraversalOrder {
    /// left, node, right: ascending keys
    #[serde(alias = "in-order")]
    InOrder,
    /// node, left, right
    #[default]
    #[serde(alias = "pre-order")]
    PreOrder,
    /// left, right, node: release order
    #[serde(alias = "post-order")]
    PostOrder,
}

impl TraversalOrder {
    pub const ALL: [TraversalOrder; 3] = [Self::InOrder, Self::PreOrder, Self::PostOrder];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InOrder => "inorder",
            Self::PreOrder => "preorder",
            Self::PostOrder => "postorder",
        }
    }
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown traversal order '{0}' (expected inorder, preorder or postorder)")]
pub struct ParseOrderError(pub String);

impl FromStr for TraversalOrder {
    type Err = ParseOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "inorder" => Ok(Self::InOrder),
            "preorder" => Ok(Self::PreOrder),
            "postorder" => Ok(Self::PostOrder),
            _ => Err(ParseOrderError(s.to_string())),
        }
    }
}

/// Ascending keys: left subtree, node, right subtree.
pub struct InOrderIter<'a, K> {
    tree: &'a AvlTree<K>,
    stack: Vec<Index>,
}

impl<'a, K> InOrderIter<'a, K> {
    pub(crate) fn new(tree: &'a AvlTree<K>) -> Self {
        let mut iter = Self {
            tree,
            stack: Vec::new(),
        };
        iter.push_left_spine(tree.root());
        iter
    }

    fn push_left_spine(&mut self, mut current: Option<Index>) {
        while let Some(idx) = current {
            self.stack.push(idx);
            current = self.tree.node(idx).and_then(|n| n.left);
        }
    }
}

impl<'a, K> Iterator for InOrderIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = self.tree.node(idx)?;
        self.push_left_spine(node.right);
        Some(&node.key)
    }
}

/// Node first, then its left and right subtrees.
pub struct PreOrderIter<'a, K> {
    tree: &'a AvlTree<K>,
    stack: Vec<Index>,
}

impl<'a, K> PreOrderIter<'a, K> {
    pub(crate) fn new(tree: &'a AvlTree<K>) -> Self {
        Self {
            tree,
            stack: tree.root().into_iter().collect(),
        }
    }
}

impl<'a, K> Iterator for PreOrderIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = self.tree.node(idx)?;
        // right first so the left subtree comes off the stack first
        self.stack.extend(node.right);
        self.stack.extend(node.left);
        Some(&node.key)
    }
}

/// Children before their parent.
pub struct PostOrderIter<'a, K> {
    tree: &'a AvlTree<K>,
    stack: Vec<(Index, bool)>,
}

impl<'a, K> PostOrderIter<'a, K> {
    pub(crate) fn new(tree: &'a AvlTree<K>) -> Self {
        Self {
            tree,
            stack: tree.root().map(|r| (r, false)).into_iter().collect(),
        }
    }
}

impl<'a, K> Iterator for PostOrderIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((idx, visited)) = self.stack.pop() {
            let Some(node) = self.tree.node(idx) else {
                continue;
            };
            if visited {
                return Some(&node.key);
            }
            self.stack.push((idx, true));
            self.stack.extend(node.right.map(|r| (r, false)));
            self.stack.extend(node.left.map(|l| (l, false)));
        }
        None
    }
}

/// One of the three traversals, chosen at runtime.
pub enum Traversal<'a, K> {
    InOrder(InOrderIter<'a, K>),
    PreOrder(PreOrderIter<'a, K>),
    PostOrder(PostOrderIter<'a, K>),
}

impl<'a, K> Iterator for Traversal<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Traversal::InOrder(it) => it.next(),
            Traversal::PreOrder(it) => it.next(),
            Traversal::PostOrder(it) => it.next(),
        }
    }
}
