//! Height-balanced (AVL) frequency tree of top-level domains.
//!
//! Nodes live in a generational arena. Child links own nothing by
//! themselves; the arena owns every node, and `left`/`right`/`parent` are
//! plain indices into it. Dropping the tree releases everything at once.

use std::cmp::Ordering;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use crate::domain::date::Date;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::tld::TldExtractor;

/// One distinct TLD with its occurrence count.
#[derive(Debug)]
pub struct TldEntry {
    key: String,
    count: u64,
    /// Subtree height, leaf = 0
    height: i32,
    /// Index of parent node in the arena, None for the root
    parent: Option<Index>,
    left: Option<Index>,
    right: Option<Index>,
}

impl TldEntry {
    fn new(key: String, parent: Option<Index>) -> Self {
        Self {
            key,
            count: 1,
            height: 0,
            parent,
            left: None,
            right: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub fn left(&self) -> Option<Index> {
        self.left
    }

    pub fn right(&self) -> Option<Index> {
        self.right
    }
}

/// Owned copy of an entry, decoupled from the tree it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TldCount {
    pub key: String,
    pub count: u64,
}

/// Frequency table of TLDs observed within an inclusive date range.
#[derive(Debug)]
pub struct TldTree {
    /// Arena storage for all tree nodes
    arena: Arena<TldEntry>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
    begin: Date,
    end: Date,
    extractor: TldExtractor,
    /// Sum of all entry counts
    accepted: u64,
}

impl TldTree {
    pub fn new(begin: Date, end: Date) -> Self {
        Self::with_extractor(begin, end, TldExtractor::default())
    }

    pub fn with_extractor(begin: Date, end: Date, extractor: TldExtractor) -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            begin,
            end,
            extractor,
            accepted: 0,
        }
    }

    pub fn begin(&self) -> &Date {
        &self.begin
    }

    pub fn end(&self) -> &Date {
        &self.end
    }

    pub fn extractor(&self) -> &TldExtractor {
        &self.extractor
    }

    /// Whether `date` lies in `[begin, end]`.
    pub fn contains_date(&self, date: &Date) -> bool {
        self.begin <= *date && *date <= self.end
    }

    /// Record one observation.
    ///
    /// Returns `Ok(false)` when the date is outside the range and `Ok(true)`
    /// once counted. A hostname the extractor refuses leaves the tree
    /// untouched and is reported as an error.
    #[instrument(level = "debug", skip(self))]
    pub fn add(&mut self, hostname: &str, date: &Date) -> DomainResult<bool> {
        if !self.contains_date(date) {
            trace!("outside [{}, {}]", self.begin, self.end);
            return Ok(false);
        }
        let key = self.extractor.extract(hostname)?;
        self.insert_key(key);
        self.accepted += 1;
        Ok(true)
    }

    /// Number of accepted observations.
    pub fn count(&self) -> u64 {
        self.accepted
    }

    /// Number of distinct TLDs.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    /// Height of the whole tree, -1 when empty.
    pub fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    pub fn get_node(&self, idx: Index) -> Option<&TldEntry> {
        self.arena.get(idx)
    }

    /// Occurrence count for `key`, if present.
    pub fn get(&self, key: &str) -> Option<u64> {
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.arena[idx];
            current = match key.cmp(node.key.as_str()) {
                Ordering::Equal => return Some(node.count),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    /// Entries in ascending key order, fixed at the moment of the call.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Owned `(key, count)` pairs in ascending key order.
    pub fn snapshot(&self) -> Vec<TldCount> {
        self.iter()
            .map(|entry| TldCount {
                key: entry.key.clone(),
                count: entry.count,
            })
            .collect()
    }

    /// Tear the tree down child-before-parent, returning how many nodes were released.
    #[instrument(level = "debug", skip(self))]
    pub fn destroy(mut self) -> usize {
        let order: Vec<Index> = self.iter_postorder().map(|(idx, _)| idx).collect();
        let released = order
            .into_iter()
            .filter(|&idx| self.arena.remove(idx).is_some())
            .count();
        self.root = None;
        debug!(released, "tree destroyed");
        released
    }

    /// Walk every node and confirm balance, stored heights, key order,
    /// parent links and count conservation.
    #[instrument(level = "debug", skip(self))]
    pub fn check_invariants(&self) -> DomainResult<()> {
        let corrupt = |msg: String| Err(DomainError::CorruptTree(msg));

        if let Some(root) = self.root {
            if self.arena[root].parent.is_some() {
                return corrupt(format!("root '{}' has a parent", self.arena[root].key));
            }
        }

        let mut visited = 0usize;
        let mut total = 0u64;
        for (idx, node) in self.iter_postorder() {
            visited += 1;
            total += node.count;

            let (lh, rh) = (self.height_of(node.left), self.height_of(node.right));
            if node.height != 1 + lh.max(rh) {
                return corrupt(format!("stale height at '{}'", node.key));
            }
            if (rh - lh).abs() > 1 {
                return corrupt(format!("unbalanced at '{}': {}", node.key, rh - lh));
            }
            for child in [node.left, node.right].into_iter().flatten() {
                if self.arena[child].parent != Some(idx) {
                    return corrupt(format!("broken parent link below '{}'", node.key));
                }
            }
        }

        let mut previous: Option<&str> = None;
        for entry in self.iter() {
            if let Some(prev) = previous {
                if prev >= entry.key() {
                    return corrupt(format!("keys out of order: '{}' >= '{}'", prev, entry.key()));
                }
            }
            previous = Some(entry.key());
        }

        if visited != self.arena.len() {
            return corrupt(format!(
                "{} reachable nodes, {} allocated",
                visited,
                self.arena.len()
            ));
        }
        if total != self.accepted {
            return corrupt(format!("counts sum to {}, accepted {}", total, self.accepted));
        }
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    fn insert_key(&mut self, key: String) {
        let Some(mut current) = self.root else {
            let idx = self.arena.insert(TldEntry::new(key, None));
            self.root = Some(idx);
            return;
        };

        loop {
            let node = &mut self.arena[current];
            let next = match key.as_str().cmp(node.key.as_str()) {
                Ordering::Equal => {
                    node.count += 1;
                    return;
                }
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
            match next {
                Some(child) => current = child,
                None => break,
            }
        }

        let goes_left = key < self.arena[current].key;
        let idx = self.arena.insert(TldEntry::new(key, Some(current)));
        if goes_left {
            self.arena[current].left = Some(idx);
        } else {
            self.arena[current].right = Some(idx);
        }
        self.rebalance(current);
    }

    fn height_of(&self, idx: Option<Index>) -> i32 {
        idx.map_or(-1, |i| self.arena[i].height)
    }

    fn update_height(&mut self, idx: Index) {
        let node = &self.arena[idx];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.arena[idx].height = height;
    }

    fn balance_factor(&self, idx: Index) -> i32 {
        let node = &self.arena[idx];
        self.height_of(node.right) - self.height_of(node.left)
    }

    /// Restore heights and balance from `start` up to the root.
    #[instrument(level = "trace", skip(self))]
    fn rebalance(&mut self, start: Index) {
        let mut current = Some(start);
        while let Some(idx) = current {
            self.update_height(idx);
            let node = &self.arena[idx];
            let subtree_root = match (self.balance_factor(idx), node.left, node.right) {
                (-2, Some(left), _) => {
                    let l = &self.arena[left];
                    if self.height_of(l.left) >= self.height_of(l.right) {
                        self.rotate_right(idx)
                    } else {
                        self.rotate_left(left);
                        self.rotate_right(idx)
                    }
                }
                (2, _, Some(right)) => {
                    let r = &self.arena[right];
                    if self.height_of(r.right) >= self.height_of(r.left) {
                        self.rotate_left(idx)
                    } else {
                        self.rotate_right(right);
                        self.rotate_left(idx)
                    }
                }
                _ => idx,
            };

            current = self.arena[subtree_root].parent;
            if current.is_none() {
                self.root = Some(subtree_root);
            }
        }
    }

    /// Lift the right child into `idx`'s place. Returns the new subtree root.
    #[instrument(level = "trace", skip(self))]
    fn rotate_left(&mut self, idx: Index) -> Index {
        let Some(pivot) = self.arena[idx].right else {
            return idx;
        };
        let parent = self.arena[idx].parent;
        let inner = self.arena[pivot].left;

        self.arena[pivot].parent = parent;
        self.arena[idx].right = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(idx);
        }
        self.arena[pivot].left = Some(idx);
        self.arena[idx].parent = Some(pivot);
        self.replace_child(parent, idx, pivot);

        self.update_height(idx);
        self.update_height(pivot);
        pivot
    }

    /// Lift the left child into `idx`'s place. Returns the new subtree root.
    #[instrument(level = "trace", skip(self))]
    fn rotate_right(&mut self, idx: Index) -> Index {
        let Some(pivot) = self.arena[idx].left else {
            return idx;
        };
        let parent = self.arena[idx].parent;
        let inner = self.arena[pivot].right;

        self.arena[pivot].parent = parent;
        self.arena[idx].left = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(idx);
        }
        self.arena[pivot].right = Some(idx);
        self.arena[idx].parent = Some(pivot);
        self.replace_child(parent, idx, pivot);

        self.update_height(idx);
        self.update_height(pivot);
        pivot
    }

    fn replace_child(&mut self, parent: Option<Index>, old: Index, new: Index) {
        match parent {
            Some(p) => {
                let node = &mut self.arena[p];
                if node.left == Some(old) {
                    node.left = Some(new);
                } else {
                    node.right = Some(new);
                }
            }
            None => self.root = Some(new),
        }
    }
}

/// In-order snapshot of node indices, taken when the iterator is created.
///
/// The borrow on the tree keeps it from being mutated while the iterator
/// lives; use [`TldTree::snapshot`] for a copy that outlives further adds.
pub struct TreeIterator<'a> {
    tree: &'a TldTree,
    order: std::vec::IntoIter<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a TldTree) -> Self {
        let mut order = Vec::with_capacity(tree.len());
        let mut stack = Vec::new();
        let mut current = tree.root;
        loop {
            while let Some(idx) = current {
                stack.push(idx);
                current = tree.arena[idx].left;
            }
            let Some(idx) = stack.pop() else {
                break;
            };
            order.push(idx);
            current = tree.arena[idx].right;
        }
        Self {
            tree,
            order: order.into_iter(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = &'a TldEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.order.next().and_then(|idx| self.tree.arena.get(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl ExactSizeIterator for TreeIterator<'_> {}

pub struct PostOrderIterator<'a> {
    tree: &'a TldTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a TldTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root {
            stack.push((root, false));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TldEntry);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.arena.get(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for child in [node.right, node.left].into_iter().flatten() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
