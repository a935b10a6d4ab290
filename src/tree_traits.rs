use std::fmt;

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::arena::AvlTree;

/// Marker for the missing side of a node with a single child.
pub const ABSENT: &str = "·";

pub trait TreeRender {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<K: fmt::Display> TreeRender for AvlTree<K> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build<K: fmt::Display>(tree: &AvlTree<K>, idx: Index) -> Tree<String> {
            let Some(node) = tree.node(idx) else {
                return Tree::new(ABSENT.to_string());
            };
            let mut subtree = Tree::new(node.key.to_string());
            // keep left/right distinguishable when only one child exists
            if node.left.is_some() || node.right.is_some() {
                for child in [node.left, node.right] {
                    match child {
                        Some(c) => subtree.push(build(tree, c)),
                        None => subtree.push(Tree::new(ABSENT.to_string())),
                    };
                }
            }
            subtree
        }

        match self.root() {
            Some(root) => build(self, root),
            None => Tree::new("(empty)".to_string()),
        }
    }
}

impl<K: fmt::Display> fmt::Display for AvlTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tree_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_empty_tree_when_rendered_then_placeholder() {
        let tree: AvlTree<i32> = AvlTree::new();
        assert_eq!(tree.to_tree_string().root, "(empty)");
    }

    #[test]
    fn given_single_child_when_rendered_then_absent_side_is_marked() {
        let tree: AvlTree<i32> = [20, 10].into_iter().collect();
        let rendered = tree.to_tree_string();
        assert_eq!(rendered.root, "20");
        let children: Vec<_> = rendered.leaves.iter().map(|t| t.root.clone()).collect();
        assert_eq!(children, vec!["10".to_string(), ABSENT.to_string()]);
    }

    #[test]
    fn given_leaf_when_rendered_then_has_no_children() {
        let tree: AvlTree<i32> = [1].into_iter().collect();
        assert!(tree.to_tree_string().leaves.is_empty());
    }
}
