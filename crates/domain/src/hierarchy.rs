//! Leadership hierarchy materialization, aggregation and traversal.
//!
//! Nodes live in one arena stored in depth-first pre-order: a node precedes all of
//! its descendants, siblings keep their input order, and every subtree occupies a
//! contiguous slice. Aggregation walks the arena backwards so each node is visited
//! once after all of its children.

mod build;
mod error;
mod payload;
mod verify;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use terreno_core::NonEmptyString;

use crate::Role;

pub use error::StructuralError;
pub use payload::{FlatHierarchyRecord, HierarchyNodePayload, HierarchyPayload, NodeIdPayload};
pub use verify::{AggregateMismatch, AggregateSource, MismatchScope};

/// Counts the upstream pre-aggregated for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportedTotals {
    /// Upstream `total_personas`.
    pub total_personas: Option<u64>,
    /// Upstream `total_subordinados`.
    pub total_subordinados: Option<u64>,
}

/// Network-level totals as reported by the upstream payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportedNetworkSummary {
    /// Upstream `total_personas_red`.
    pub total_people: Option<u64>,
    /// Upstream `total_lideres_red`.
    pub total_leaders: Option<u64>,
    /// Upstream `niveles_jerarquia`.
    pub levels: Option<u64>,
}

/// Network-level totals of a built tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkSummary {
    /// People managed across the whole network.
    pub total_people: u64,
    /// Leaders in the network, root included.
    pub total_leaders: u64,
    /// Distinct depth levels; the root is depth 0, so a lone root has one level.
    pub levels: u64,
}

/// One leader in a built hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    index: usize,
    id: NonEmptyString,
    name: String,
    role: Role,
    direct_person_count: u64,
    parent: Option<usize>,
    children: Vec<usize>,
    depth: usize,
    total_person_count: u64,
    total_subordinate_count: u64,
    reported: ReportedTotals,
}

impl HierarchyNode {
    /// Returns the unique node identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the leader role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns people this leader manages personally.
    #[must_use]
    pub fn direct_person_count(&self) -> u64 {
        self.direct_person_count
    }

    /// Returns the distance from the root, the root being depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the number of direct subordinates.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns whether the node has no subordinates.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns people managed across the node's whole subtree.
    #[must_use]
    pub fn total_person_count(&self) -> u64 {
        self.total_person_count
    }

    /// Returns subordinate nodes across the node's whole subtree.
    #[must_use]
    pub fn total_subordinate_count(&self) -> u64 {
        self.total_subordinate_count
    }

    /// Returns the counts the upstream sent for this node.
    #[must_use]
    pub fn reported(&self) -> ReportedTotals {
        self.reported
    }
}

/// Validated, aggregated leadership tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyTree {
    nodes: Vec<HierarchyNode>,
    index_by_id: HashMap<String, usize>,
    reported_summary: ReportedNetworkSummary,
}

impl HierarchyTree {
    /// Recomputes the derived subtree totals of every node.
    ///
    /// Each node is reset from its own direct count, so repeated calls yield the
    /// same values.
    pub fn aggregate(&mut self) {
        for index in (0..self.nodes.len()).rev() {
            let node = &self.nodes[index];
            let (person_total, subordinate_total) = node.children.iter().fold(
                (node.direct_person_count, node.children.len() as u64),
                |(persons, subordinates), child| {
                    let child = &self.nodes[*child];
                    (
                        persons.saturating_add(child.total_person_count),
                        subordinates.saturating_add(child.total_subordinate_count),
                    )
                },
            );

            let node = &mut self.nodes[index];
            node.total_person_count = person_total;
            node.total_subordinate_count = subordinate_total;
        }
    }

    /// Returns the root leader.
    #[must_use]
    pub fn root(&self) -> &HierarchyNode {
        &self.nodes[0]
    }

    /// Returns the number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the tree holds no nodes. Built trees always hold a root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the direct subordinates of a node in input order.
    pub fn children<'a>(
        &'a self,
        node: &'a HierarchyNode,
    ) -> impl Iterator<Item = &'a HierarchyNode> + 'a {
        node.children
            .iter()
            .filter_map(|index| self.nodes.get(*index))
    }

    /// Returns the parent of a node, `None` for the root.
    #[must_use]
    pub fn parent(&self, node: &HierarchyNode) -> Option<&HierarchyNode> {
        node.parent.and_then(|index| self.nodes.get(index))
    }

    /// Looks up a node by identifier.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&HierarchyNode> {
        self.index_by_id
            .get(id.trim())
            .and_then(|index| self.nodes.get(*index))
    }

    /// Returns the chain of nodes from the root down to `id`, both included.
    #[must_use]
    pub fn path_to(&self, id: &str) -> Option<Vec<&HierarchyNode>> {
        let mut path = Vec::new();
        let mut current = self.find(id);
        while let Some(node) = current {
            path.push(node);
            current = self.parent(node);
        }

        if path.is_empty() {
            return None;
        }

        path.reverse();
        Some(path)
    }

    /// Walks the whole tree depth-first, parents before children.
    ///
    /// The walk is lazy and can be restarted by calling this method again.
    #[must_use]
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            nodes: self.nodes.iter(),
            base_depth: 0,
        }
    }

    /// Walks the subtree rooted at `node`, yielding depths relative to it.
    #[must_use]
    pub fn traverse_subtree(&self, node: &HierarchyNode) -> Traverse<'_> {
        let end = usize::try_from(node.total_subordinate_count)
            .ok()
            .and_then(|subordinates| node.index.checked_add(subordinates))
            .and_then(|last| last.checked_add(1))
            .unwrap_or(node.index);
        let nodes = self.nodes.get(node.index..end).unwrap_or(&[]);

        Traverse {
            nodes: nodes.iter(),
            base_depth: node.depth,
        }
    }

    /// Returns the deepest depth present in the tree.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Returns network totals derived from the tree itself.
    #[must_use]
    pub fn summary(&self) -> NetworkSummary {
        NetworkSummary {
            total_people: self.root().total_person_count,
            total_leaders: self.nodes.len() as u64,
            levels: self.max_depth() as u64 + 1,
        }
    }

    /// Returns network totals as reported by the upstream payload.
    #[must_use]
    pub fn reported_summary(&self) -> ReportedNetworkSummary {
        self.reported_summary
    }
}

/// Lazy depth-first walk over a built tree, yielding `(node, depth)` pairs.
#[derive(Debug, Clone)]
pub struct Traverse<'a> {
    nodes: std::slice::Iter<'a, HierarchyNode>,
    base_depth: usize,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = (&'a HierarchyNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.nodes
            .next()
            .map(|node| (node, node.depth.saturating_sub(self.base_depth)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

impl ExactSizeIterator for Traverse<'_> {}
