use std::cmp::Ordering;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use crate::errors::{TreeError, TreeResult};
use crate::iter::{InOrderIter, PostOrderIter, PreOrderIter, Traversal, TraversalOrder};

/// Tree node in the arena-backed AVL tree.
#[derive(Debug, Clone)]
pub struct AvlNode<K> {
    /// Ordering key, never changes after creation
    pub key: K,
    /// Nodes on the longest downward path, counting this one
    pub height: u32,
    /// Index of the left child in the arena
    pub left: Option<Index>,
    /// Index of the right child in the arena
    pub right: Option<Index>,
}

impl<K> AvlNode<K> {
    fn leaf(key: K) -> Self {
        Self {
            key,
            height: 1,
            left: None,
            right: None,
        }
    }
}

/// Result of inserting into a subtree: its new root, and the node created
/// for the key (`None` when the key was already present).
#[derive(Debug, Clone, Copy)]
struct Placement {
    root: Index,
    inserted: Option<Index>,
}

/// Height-balanced binary search tree over an arena of nodes.
///
/// Every node is owned by exactly one slot: the tree's root or a parent's
/// `left`/`right`. After each public call the BST ordering, stored heights
/// and the AVL balance condition `|height(left) - height(right)| <= 1` hold
/// at every node, so the tree height stays within `1.44 * log2(n + 2)`.
///
/// Duplicate keys are ignored.
#[derive(Debug, Clone)]
pub struct AvlTree<K> {
    /// Arena storage for all tree nodes
    arena: Arena<AvlNode<K>>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
    /// Upper bound on live nodes, None when the arena may grow
    capacity: Option<usize>,
}

impl<K> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> AvlTree<K> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            capacity: None,
        }
    }

    /// Creates a tree that holds at most `capacity` nodes (minimum 1).
    ///
    /// Inserting a new key into a full tree fails with
    /// [`TreeError::CapacityExhausted`] and leaves the tree untouched.
    pub fn bounded(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            arena: Arena::with_capacity(capacity),
            root: None,
            capacity: Some(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn node(&self, idx: Index) -> Option<&AvlNode<K>> {
        self.arena.get(idx)
    }

    pub fn root_key(&self) -> Option<&K> {
        self.root.and_then(|idx| self.node(idx)).map(|n| &n.key)
    }

    /// Height of the subtree at `node`; 0 for an absent node.
    pub fn height(&self, node: Option<Index>) -> u32 {
        node.and_then(|idx| self.arena.get(idx))
            .map_or(0, |n| n.height)
    }

    /// `height(left) - height(right)` at `node`; 0 for an absent node.
    ///
    /// Positive means left-heavy, negative right-heavy.
    pub fn balance_factor(&self, node: Option<Index>) -> i32 {
        match node.and_then(|idx| self.arena.get(idx)) {
            Some(n) => self.height(n.left) as i32 - self.height(n.right) as i32,
            None => 0,
        }
    }

    pub fn tree_height(&self) -> u32 {
        self.height(self.root)
    }

    pub fn min(&self) -> Option<&K> {
        let mut node = self.node(self.root?)?;
        while let Some(left) = node.left.and_then(|idx| self.node(idx)) {
            node = left;
        }
        Some(&node.key)
    }

    pub fn max(&self) -> Option<&K> {
        let mut node = self.node(self.root?)?;
        while let Some(right) = node.right.and_then(|idx| self.node(idx)) {
            node = right;
        }
        Some(&node.key)
    }

    pub fn iter(&self) -> InOrderIter<'_, K> {
        InOrderIter::new(self)
    }

    pub fn iter_preorder(&self) -> PreOrderIter<'_, K> {
        PreOrderIter::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIter<'_, K> {
        PostOrderIter::new(self)
    }

    /// Lazy, read-only walk over the keys in the requested order.
    ///
    /// Each call starts a fresh walk from the root.
    pub fn traverse(&self, order: TraversalOrder) -> Traversal<'_, K> {
        match order {
            TraversalOrder::InOrder => Traversal::InOrder(self.iter()),
            TraversalOrder::PreOrder => Traversal::PreOrder(self.iter_preorder()),
            TraversalOrder::PostOrder => Traversal::PostOrder(self.iter_postorder()),
        }
    }

    /// Releases every node, children before parents, and returns the keys in
    /// release order.
    #[instrument(level = "debug", skip(self), fields(len = self.len()))]
    pub fn destroy(mut self) -> Vec<K> {
        self.release_post_order()
    }

    /// Like [`destroy`](Self::destroy) but keeps the tree usable (and its
    /// capacity bound) afterwards.
    #[instrument(level = "debug", skip(self), fields(len = self.len()))]
    pub fn clear(&mut self) {
        let released = self.release_post_order();
        debug!(released = released.len(), "tree cleared");
    }

    fn release_post_order(&mut self) -> Vec<K> {
        let order: Vec<Index> = self.postorder_indices();
        let mut keys = Vec::with_capacity(order.len());
        for idx in order {
            if let Some(node) = self.arena.remove(idx) {
                trace!(?idx, "released node");
                keys.push(node.key);
            }
        }
        self.root = None;
        keys
    }

    fn postorder_indices(&self) -> Vec<Index> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<(Index, bool)> = self.root.map(|r| (r, false)).into_iter().collect();
        while let Some((idx, visited)) = stack.pop() {
            let Some(node) = self.arena.get(idx) else {
                continue;
            };
            if visited {
                out.push(idx);
            } else {
                stack.push((idx, true));
                if let Some(right) = node.right {
                    stack.push((right, false));
                }
                if let Some(left) = node.left {
                    stack.push((left, false));
                }
            }
        }
        out
    }

    fn update_height(&mut self, idx: Index) {
        let (left, right) = {
            let n = &self.arena[idx];
            (n.left, n.right)
        };
        let height = 1 + self.height(left).max(self.height(right));
        self.arena[idx].height = height;
    }

    /// Promotes `y.left` to subtree root; `y` becomes its right child.
    ///
    /// Returns `y` unchanged if it has no left child.
    pub(crate) fn rotate_right(&mut self, y: Index) -> Index {
        let Some(x) = self.arena[y].left else {
            return y;
        };
        let t2 = self.arena[x].right;

        self.arena[x].right = Some(y);
        self.arena[y].left = t2;

        // y is now below x
        self.update_height(y);
        self.update_height(x);
        trace!(?y, ?x, "rotate right");
        x
    }

    /// Mirror of [`rotate_right`](Self::rotate_right): promotes `x.right`.
    pub(crate) fn rotate_left(&mut self, x: Index) -> Index {
        let Some(y) = self.arena[x].right else {
            return x;
        };
        let t2 = self.arena[y].left;

        self.arena[y].left = Some(x);
        self.arena[x].right = t2;

        self.update_height(x);
        self.update_height(y);
        trace!(?x, ?y, "rotate left");
        y
    }

    fn allocate(&mut self, key: K) -> TreeResult<Index> {
        let node = AvlNode::leaf(key);
        match self.capacity {
            None => Ok(self.arena.insert(node)),
            Some(capacity) => self
                .arena
                .try_insert(node)
                .map_err(|_| TreeError::CapacityExhausted { capacity }),
        }
    }
}

impl<K: Ord> AvlTree<K> {
    /// Inserts `key`, rebalancing on the way back up.
    ///
    /// Returns `Ok(true)` when a node was created and `Ok(false)` when the key
    /// was already present. Only a bounded tree can fail.
    #[instrument(level = "debug", skip_all, fields(len = self.len()))]
    pub fn insert(&mut self, key: K) -> TreeResult<bool> {
        let root = self.root;
        let placement = self.insert_at(root, key)?;
        self.root = Some(placement.root);
        match placement.inserted {
            Some(idx) => {
                debug!(?idx, height = self.tree_height(), "inserted");
                Ok(true)
            }
            None => {
                debug!("duplicate key ignored");
                Ok(false)
            }
        }
    }

    fn insert_at(&mut self, node: Option<Index>, key: K) -> TreeResult<Placement> {
        let Some(idx) = node else {
            let created = self.allocate(key)?;
            return Ok(Placement {
                root: created,
                inserted: Some(created),
            });
        };

        let placement = match key.cmp(&self.arena[idx].key) {
            Ordering::Less => {
                let left = self.arena[idx].left;
                let below = self.insert_at(left, key)?;
                self.arena[idx].left = Some(below.root);
                below
            }
            Ordering::Greater => {
                let right = self.arena[idx].right;
                let below = self.insert_at(right, key)?;
                self.arena[idx].right = Some(below.root);
                below
            }
            Ordering::Equal => {
                return Ok(Placement {
                    root: idx,
                    inserted: None,
                })
            }
        };

        let Some(inserted) = placement.inserted else {
            return Ok(Placement {
                root: idx,
                inserted: None,
            });
        };

        self.update_height(idx);
        Ok(Placement {
            root: self.rebalance(idx, inserted),
            inserted: Some(inserted),
        })
    }

    /// Restores the balance condition at `idx` after `inserted` was placed
    /// somewhere below it. Returns the subtree's new root.
    fn rebalance(&mut self, idx: Index, inserted: Index) -> Index {
        let balance = self.balance_factor(Some(idx));
        let (left, right) = (self.arena[idx].left, self.arena[idx].right);

        // the inserted key, not the child's balance, picks single vs double
        match (left, right) {
            (Some(left), _) if balance > 1 => {
                if self.arena[inserted].key < self.arena[left].key {
                    trace!(?idx, "left-left");
                    self.rotate_right(idx)
                } else {
                    trace!(?idx, "left-right");
                    let new_left = self.rotate_left(left);
                    self.arena[idx].left = Some(new_left);
                    self.rotate_right(idx)
                }
            }
            (_, Some(right)) if balance < -1 => {
                if self.arena[inserted].key > self.arena[right].key {
                    trace!(?idx, "right-right");
                    self.rotate_left(idx)
                } else {
                    trace!(?idx, "right-left");
                    let new_right = self.rotate_right(right);
                    self.arena[idx].right = Some(new_right);
                    self.rotate_left(idx)
                }
            }
            _ => idx,
        }
    }

    pub fn find(&self, key: &K) -> Option<Index> {
        let mut current = self.root;
        while let Some(idx) = current {
            let node = self.arena.get(idx)?;
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(idx),
            };
        }
        None
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Checks ordering, stored heights, balance and reachability of every
    /// node. Reports the first violation found.
    #[instrument(level = "debug", skip(self))]
    pub fn validate(&self) -> TreeResult<()> {
        let mut reachable = 0usize;
        if let Some(root) = self.root {
            self.validate_at(root, None, None, &mut reachable)?;
        }
        if reachable != self.arena.len() {
            let node = self
                .arena
                .iter()
                .map(|(idx, _)| idx)
                .find(|idx| !self.is_reachable(*idx));
            if let Some(node) = node {
                return Err(TreeError::InvariantViolation {
                    node,
                    reason: format!(
                        "{} nodes stored but only {} reachable from the root",
                        self.arena.len(),
                        reachable
                    ),
                });
            }
        }
        Ok(())
    }

    fn validate_at(
        &self,
        idx: Index,
        lower: Option<&K>,
        upper: Option<&K>,
        reachable: &mut usize,
    ) -> TreeResult<u32> {
        let violation = |reason: &str| TreeError::InvariantViolation {
            node: idx,
            reason: reason.to_string(),
        };
        let node = self
            .arena
            .get(idx)
            .ok_or_else(|| violation("dangling child index"))?;
        *reachable += 1;

        if lower.is_some_and(|lo| node.key <= *lo) || upper.is_some_and(|hi| node.key >= *hi) {
            return Err(violation("key out of order for its position"));
        }

        let left = match node.left {
            Some(l) => self.validate_at(l, lower, Some(&node.key), reachable)?,
            None => 0,
        };
        let right = match node.right {
            Some(r) => self.validate_at(r, Some(&node.key), upper, reachable)?,
            None => 0,
        };

        if node.height != 1 + left.max(right) {
            return Err(violation(&format!(
                "stored height {} but children give {}",
                node.height,
                1 + left.max(right)
            )));
        }
        if left.abs_diff(right) > 1 {
            return Err(violation(&format!(
                "unbalanced: left height {left}, right height {right}"
            )));
        }
        Ok(node.height)
    }

    fn is_reachable(&self, target: Index) -> bool {
        self.postorder_indices().contains(&target)
    }
}

impl<K: Ord> FromIterator<K> for AvlTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for AvlTree<K> {
    /// Keys that do not fit a bounded tree are skipped.
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            if let Err(e) = self.insert(key) {
                debug!(error = %e, "key skipped");
            }
        }
    }
}

impl<'a, K> IntoIterator for &'a AvlTree<K> {
    type Item = &'a K;
    type IntoIter = InOrderIter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(keys: &[i32]) -> AvlTree<i32> {
        let mut tree = AvlTree::new();
        for &k in keys {
            tree.insert(k).unwrap();
        }
        tree
    }

    fn key_at(tree: &AvlTree<i32>, idx: Option<Index>) -> Option<i32> {
        idx.and_then(|i| tree.node(i)).map(|n| n.key)
    }

    #[test]
    fn given_empty_tree_when_querying_then_heights_are_zero() {
        let tree: AvlTree<i32> = AvlTree::new();
        assert_eq!(tree.height(None), 0);
        assert_eq!(tree.balance_factor(None), 0);
        assert_eq!(tree.tree_height(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.min(), None);
        assert_eq!(tree.root_key(), None);
    }

    #[test]
    fn given_single_key_when_inserted_then_root_is_leaf_of_height_one() {
        let tree = tree_of(&[7]);
        let root = tree.node(tree.root().unwrap()).unwrap();
        assert_eq!(root.key, 7);
        assert_eq!(root.height, 1);
        assert!(root.left.is_none() && root.right.is_none());
    }

    #[test]
    fn given_left_chain_when_rotating_right_then_middle_becomes_root() {
        // build the unbalanced chain 30 <- 20 <- 10 by hand
        let mut tree: AvlTree<i32> = AvlTree::new();
        let a = tree.arena.insert(AvlNode::leaf(30));
        let b = tree.arena.insert(AvlNode::leaf(20));
        let c = tree.arena.insert(AvlNode::leaf(10));
        tree.arena[b].left = Some(c);
        tree.update_height(b);
        tree.arena[a].left = Some(b);
        tree.update_height(a);
        assert_eq!(tree.balance_factor(Some(a)), 2);

        let root = tree.rotate_right(a);
        tree.root = Some(root);

        assert_eq!(root, b);
        assert_eq!(key_at(&tree, tree.arena[b].left), Some(10));
        assert_eq!(key_at(&tree, tree.arena[b].right), Some(30));
        assert_eq!(tree.arena[a].height, 1);
        assert_eq!(tree.arena[b].height, 2);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn given_right_chain_when_rotating_left_then_middle_becomes_root() {
        let mut tree: AvlTree<i32> = AvlTree::new();
        let a = tree.arena.insert(AvlNode::leaf(10));
        let b = tree.arena.insert(AvlNode::leaf(20));
        let c = tree.arena.insert(AvlNode::leaf(30));
        tree.arena[b].right = Some(c);
        tree.update_height(b);
        tree.arena[a].right = Some(b);
        tree.update_height(a);
        assert_eq!(tree.balance_factor(Some(a)), -2);

        let root = tree.rotate_left(a);
        tree.root = Some(root);

        assert_eq!(root, b);
        assert_eq!(key_at(&tree, tree.arena[b].left), Some(10));
        assert_eq!(key_at(&tree, tree.arena[b].right), Some(30));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn given_rotation_with_inner_subtree_then_subtree_is_reattached() {
        //     y=40            x=20
        //    /    \          /    \
        //   x=20   50  =>   10    y=40
        //  /   \                  /   \
        // 10   30(T2)            30    50
        let mut tree: AvlTree<i32> = AvlTree::new();
        let y = tree.arena.insert(AvlNode::leaf(40));
        let x = tree.arena.insert(AvlNode::leaf(20));
        let t1 = tree.arena.insert(AvlNode::leaf(10));
        let t2 = tree.arena.insert(AvlNode::leaf(30));
        let t3 = tree.arena.insert(AvlNode::leaf(50));
        tree.arena[x].left = Some(t1);
        tree.arena[x].right = Some(t2);
        tree.update_height(x);
        tree.arena[y].left = Some(x);
        tree.arena[y].right = Some(t3);
        tree.update_height(y);

        let root = tree.rotate_right(y);
        tree.root = Some(root);

        assert_eq!(root, x);
        assert_eq!(tree.arena[y].left, Some(t2));
        assert_eq!(tree.arena[y].height, 2);
        assert_eq!(tree.arena[x].height, 3);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn given_node_without_child_when_rotating_then_returns_it_unchanged() {
        let mut tree = tree_of(&[1]);
        let root = tree.root().unwrap();
        assert_eq!(tree.rotate_right(root), root);
        assert_eq!(tree.rotate_left(root), root);
    }

    #[test]
    fn given_duplicate_when_inserted_then_reports_false_and_keeps_len() {
        let mut tree = tree_of(&[2, 1, 3]);
        assert!(!tree.insert(2).unwrap());
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn given_bounded_tree_when_full_then_capacity_exhausted() {
        let mut tree = AvlTree::bounded(2);
        assert!(tree.insert(1).unwrap());
        assert!(tree.insert(2).unwrap());
        assert_eq!(
            tree.insert(3),
            Err(TreeError::CapacityExhausted { capacity: 2 })
        );
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn given_corrupted_height_when_validating_then_reports_violation() {
        let mut tree = tree_of(&[1, 2, 3]);
        let root = tree.root().unwrap();
        tree.arena[root].height = 5;
        let err = tree.validate().unwrap_err();
        assert!(matches!(err, TreeError::InvariantViolation { node, .. } if node == root));
    }

    #[test]
    fn given_orphan_node_when_validating_then_reports_violation() {
        let mut tree = tree_of(&[1, 2, 3]);
        tree.arena.insert(AvlNode::leaf(99));
        assert!(tree.validate().is_err());
    }

    #[test]
    fn given_tree_when_cleared_then_reusable() {
        let mut tree = tree_of(&[5, 3, 8]);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        tree.insert(4).unwrap();
        assert_eq!(tree.root_key(), Some(&4));
    }
}
