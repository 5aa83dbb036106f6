//! Regression trees stored as flat node arrays.
//!
//! Every node, internal or leaf, carries the value the tree would predict if
//! evaluation stopped there. Leaves use it as the prediction; internal nodes
//! keep it so per-split attribution can be read off a decision path.

use serde::{Deserialize, Serialize};

use crate::TreeDefect;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node weight, already scaled by the learning rate.
    pub value: f64,
    /// Sum of hessians of the training rows that reached this node.
    pub cover: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<Split>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub feature: usize,
    /// Rows with `x <= threshold` go left.
    pub threshold: f64,
    /// Direction taken by missing (`NaN`) values.
    pub default_left: bool,
    pub left: usize,
    pub right: usize,
    pub gain: f64,
}

/// A single regression tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Split {
    #[must_use]
    pub fn goes_left(&self, x: f64) -> bool {
        goes_left(x, self.threshold, self.default_left)
    }

    /// Child index taken by `row`. Out-of-range features count as missing.
    #[must_use]
    pub fn next(&self, row: &[f64]) -> usize {
        let x = row.get(self.feature).copied().unwrap_or(f64::NAN);
        if self.goes_left(x) { self.left } else { self.right }
    }
}

pub(crate) fn goes_left(x: f64, threshold: f64, default_left: bool) -> bool {
    if x.is_nan() {
        default_left
    } else {
        x <= threshold
    }
}

impl Tree {
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        debug_assert!(!nodes.is_empty());
        Self { nodes }
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.split.is_none()).count()
    }

    /// Checks the layout produced by the builder: a non-empty node list in
    /// which every child comes after its parent and every split reads one of
    /// the first `n_features` columns. A tree that passes has finite,
    /// in-bounds decision paths.
    ///
    /// On failure returns the offending node index and the defect.
    pub fn validate(&self, n_features: usize) -> Result<(), (usize, TreeDefect)> {
        if self.nodes.is_empty() {
            return Err((0, TreeDefect::Empty));
        }
        let len = self.nodes.len();
        for (parent, node) in self.nodes.iter().enumerate() {
            let Some(split) = &node.split else {
                continue;
            };
            if split.feature >= n_features {
                return Err((
                    parent,
                    TreeDefect::FeatureOutOfRange {
                        feature: split.feature,
                        n_features,
                    },
                ));
            }
            for child in [split.left, split.right] {
                if child <= parent || child >= len {
                    return Err((parent, TreeDefect::ChildOutOfOrder { parent, child, len }));
                }
            }
        }
        Ok(())
    }

    /// Nodes visited by `row`, root first, leaf last.
    ///
    /// The walk stops early at a dangling child index.
    pub fn decision_path<'a>(&'a self, row: &'a [f64]) -> impl Iterator<Item = &'a Node> + 'a {
        let mut next = Some(0);
        std::iter::from_fn(move || {
            let node = self.nodes.get(next?)?;
            next = node.split.as_ref().map(|split| split.next(row));
            Some(node)
        })
    }

    #[must_use]
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.decision_path(row).last().map_or(0.0, |leaf| leaf.value)
    }
}
