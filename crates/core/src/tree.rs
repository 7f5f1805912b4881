//! # Labeled Trees
//!
//! An ordered tree where every node carries a payload and a fixed number of
//! *properties*: named child slots, each holding an ordered list of children.
//! Derivation trees and grammar rules share this representation.
//!
//! ## Identity
//!
//! Nodes live in a flat arena and are addressed by [`NodeId`]. Two nodes with
//! equal payloads and equal subtree shapes are still different nodes, so any
//! per-node table (probabilities, endpoint sets) is keyed by id and never by
//! payload or structure.
//!
//! ## Example
//!
//! ```rust
//! use tsg_core::Tree;
//!
//! // A(B, C)
//! let tree = Tree::node("A", vec![vec![Tree::leaf("B"), Tree::leaf("C")]]);
//!
//! assert_eq!(tree.len(), 3);
//! assert!(!tree.is_leaf(tree.root()));
//! assert_eq!(tree.to_string(), "A(B, C)");
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::eq::NodeEq;
use crate::error::TreeError;

/// Arena index of a node inside one [`Tree`].
///
/// Ids are only meaningful for the tree that produced them.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates an id from a raw arena index.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The arena index as `usize`, for dense per-node tables.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[derive(Debug, Clone)]
struct NodeSlot<T> {
    data: T,
    children: Vec<Vec<NodeId>>,
}

/// A labeled tree stored as an arena. The root is always the first slot.
///
/// Accessors taking a [`NodeId`] panic when the id doesn't belong to the
/// tree, the same way slice indexing does. Use [`Tree::contains`] to check
/// ids of unknown origin.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    nodes: Vec<NodeSlot<T>>,
}

impl<T> Tree<T> {
    /// Create a single-node tree with `n_properties` empty child slots.
    pub fn new(data: T, n_properties: usize) -> Self {
        Self {
            nodes: vec![NodeSlot {
                data,
                children: vec![Vec::new(); n_properties],
            }],
        }
    }

    /// Create a single node without properties.
    pub fn leaf(data: T) -> Self {
        Self::new(data, 0)
    }

    /// Compose a tree from a root payload and its subtrees, one list per
    /// property.
    ///
    /// # Panics
    ///
    /// Panics if the composed tree exceeds `u32::MAX` nodes.
    pub fn node(data: T, properties: Vec<Vec<Tree<T>>>) -> Self {
        let mut tree = Self::new(data, properties.len());
        for (property, subtrees) in properties.into_iter().enumerate() {
            for subtree in subtrees {
                let child = tree
                    .append(subtree)
                    .unwrap_or_else(|e| panic!("cannot compose tree: {e}"));
                tree.nodes[0].children[property].push(child);
            }
        }
        tree
    }

    /// The root node.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `node` addresses a slot of this tree.
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.nodes.len()
    }

    /// All node ids, in arena order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    /// Payload of `node`.
    #[inline]
    pub fn data(&self, node: NodeId) -> &T {
        &self.nodes[node.index()].data
    }

    /// Number of property slots of `node`.
    #[inline]
    pub fn n_properties(&self, node: NodeId) -> usize {
        self.nodes[node.index()].children.len()
    }

    /// Children of `node`, grouped by property.
    #[inline]
    pub fn children_by_property(&self, node: NodeId) -> &[Vec<NodeId>] {
        &self.nodes[node.index()].children
    }

    /// Children of `node` in one property. Missing properties are empty.
    pub fn children(&self, node: NodeId, property: usize) -> &[NodeId] {
        self.nodes[node.index()]
            .children
            .get(property)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The `index`-th child of `node` in `property`, if present.
    pub fn child(&self, node: NodeId, property: usize, index: usize) -> Option<NodeId> {
        self.children(node, property).get(index).copied()
    }

    /// Iterate over every immediate child of `node`, property by property.
    pub fn all_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[node.index()].children.iter().flatten().copied()
    }

    /// A leaf has no children in any property.
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.nodes[node.index()].children.iter().all(Vec::is_empty)
    }

    /// Append a new child under `parent` in slot `property`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        property: usize,
        data: T,
        n_properties: usize,
    ) -> Result<NodeId, TreeError> {
        self.check_slot(parent, property)?;
        let child = self.next_id()?;
        self.nodes.push(NodeSlot {
            data,
            children: vec![Vec::new(); n_properties],
        });
        self.nodes[parent.index()].children[property].push(child);
        Ok(child)
    }

    /// Move every node of `other` into this arena and return its new root.
    /// The moved subtree is not attached to any parent.
    fn append(&mut self, other: Tree<T>) -> Result<NodeId, TreeError> {
        let offset = self.next_id()?;
        if self.nodes.len() + other.nodes.len() > u32::MAX as usize {
            return Err(TreeError::TooManyNodes {
                max: u32::MAX as usize,
            });
        }
        self.nodes.extend(other.nodes.into_iter().map(|mut slot| {
            for id in slot.children.iter_mut().flatten() {
                id.0 += offset.0;
            }
            slot
        }));
        Ok(offset)
    }

    fn next_id(&self) -> Result<NodeId, TreeError> {
        u32::try_from(self.nodes.len())
            .map(NodeId)
            .map_err(|_| TreeError::TooManyNodes {
                max: u32::MAX as usize,
            })
    }

    fn check_slot(&self, node: NodeId, property: usize) -> Result<(), TreeError> {
        let slot = self.nodes.get(node.index()).ok_or(TreeError::UnknownNode {
            node,
            len: self.nodes.len(),
        })?;
        if property >= slot.children.len() {
            return Err(TreeError::InvalidProperty {
                node,
                property,
                n_properties: slot.children.len(),
            });
        }
        Ok(())
    }

    /// Pre-order walk from `node` using an explicit stack.
    ///
    /// Children are pushed property by property, so the last child of the
    /// last property is visited first. Every node precedes all of its
    /// descendants.
    pub fn preorder(&self, node: NodeId) -> Preorder<'_, T> {
        Preorder {
            tree: self,
            stack: vec![node],
        }
    }

    /// Number of nodes in the subtree rooted at `node`.
    pub fn subtree_size(&self, node: NodeId) -> usize {
        self.preorder(node).count()
    }

    /// Number of leaves in the subtree rooted at `node`.
    pub fn leaf_count(&self, node: NodeId) -> usize {
        self.preorder(node).filter(|&n| self.is_leaf(n)).count()
    }

    /// Structural equality of the subtree at `a` with the subtree of `other`
    /// at `b`: payloads agree under `eq` and every property has the same
    /// number of children. Trailing missing properties count as empty.
    pub fn structurally_equal_by<E>(&self, a: NodeId, other: &Tree<T>, b: NodeId, eq: &E) -> bool
    where
        E: NodeEq<T> + ?Sized,
    {
        let mut stack = vec![(a, b)];
        while let Some((left, right)) = stack.pop() {
            if !eq.equal(self.data(left), other.data(right)) {
                return false;
            }
            let n = self.n_properties(left).max(other.n_properties(right));
            for property in 0..n {
                let lhs = self.children(left, property);
                let rhs = other.children(right, property);
                if lhs.len() != rhs.len() {
                    return false;
                }
                stack.extend(lhs.iter().copied().zip(rhs.iter().copied()));
            }
        }
        true
    }
}

impl<T: Clone> Tree<T> {
    /// Copy `subtree` (from any tree) under `parent` in slot `property`.
    pub fn graft(
        &mut self,
        parent: NodeId,
        property: usize,
        subtree: &Tree<T>,
    ) -> Result<NodeId, TreeError> {
        self.check_slot(parent, property)?;
        let child = self.append(subtree.clone())?;
        self.nodes[parent.index()].children[property].push(child);
        Ok(child)
    }

    /// Copy out the subtree rooted at `node` as a standalone tree.
    pub fn subtree(&self, node: NodeId) -> Tree<T> {
        let mut copy = Tree::new(self.data(node).clone(), self.n_properties(node));
        let mut stack = vec![(node, copy.root())];
        while let Some((src, dst)) = stack.pop() {
            for (property, children) in self.children_by_property(src).iter().enumerate() {
                for &child in children {
                    let data = self.data(child).clone();
                    let n_properties = self.n_properties(child);
                    let id = NodeId(copy.nodes.len() as u32);
                    copy.nodes.push(NodeSlot {
                        data,
                        children: vec![Vec::new(); n_properties],
                    });
                    copy.nodes[dst.index()].children[property].push(id);
                    stack.push((child, id));
                }
            }
        }
        copy
    }

    /// The single-level production that expands `node`: its payload with
    /// each immediate child copied as a childless node, keeping every
    /// property slot (including empty ones) in place.
    pub fn one_level_production(&self, node: NodeId) -> Tree<T> {
        let mut production = Tree::new(self.data(node).clone(), self.n_properties(node));
        for (property, children) in self.children_by_property(node).iter().enumerate() {
            for &child in children {
                let id = NodeId(production.nodes.len() as u32);
                production.nodes.push(NodeSlot {
                    data: self.data(child).clone(),
                    children: vec![Vec::new(); self.n_properties(child)],
                });
                production.nodes[0].children[property].push(id);
            }
        }
        production
    }
}

/// Structural equality: same payloads (`PartialEq`), same shape.
impl<T: PartialEq> PartialEq for Tree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.structurally_equal_by(self.root(), other, other.root(), &crate::eq::PayloadEq)
    }
}

impl<T: Eq> Eq for Tree<T> {}

/// Agrees with `PartialEq`: trailing empty properties are not hashed.
impl<T: Hash> Hash for Tree<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for node in self.preorder(self.root()) {
            self.data(node).hash(state);
            let children = self.children_by_property(node);
            let used = match children.iter().rposition(|ids| !ids.is_empty()) {
                Some(last) => last + 1,
                None => 0,
            };
            state.write_usize(used);
            for ids in &children[..used] {
                state.write_usize(ids.len());
            }
        }
    }
}

impl<T: fmt::Display> Tree<T> {
    fn fmt_node(&self, node: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data(node))?;
        if self.is_leaf(node) {
            return Ok(());
        }
        write!(f, "(")?;
        for (property, children) in self.children_by_property(node).iter().enumerate() {
            if property > 0 {
                write!(f, " | ")?;
            }
            for (i, &child) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                self.fmt_node(child, f)?;
            }
        }
        write!(f, ")")
    }
}

/// `A(B, C | D)`: children of one property are comma separated, properties
/// are separated by `|`.
impl<T: fmt::Display> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root(), f)
    }
}

/// Iterator returned by [`Tree::preorder`].
pub struct Preorder<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<NodeId>,
}

impl<T> Iterator for Preorder<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        let children = self.tree.children_by_property(current);
        self.stack.extend(children.iter().flatten().copied());
        Some(current)
    }
}
