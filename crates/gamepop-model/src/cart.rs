//! Second-order regression tree construction.
//!
//! Exact greedy search: for every candidate feature, rows are sorted by
//! value and every boundary between two distinct values is scored with the
//! regularized gain
//!
//! ```text
//! gain = ½ · (G_L² / (H_L + λ) + G_R² / (H_R + λ) − G² / (H + λ)) − γ
//! ```
//!
//! where `G` and `H` are gradient and hessian sums. Rows with a missing value
//! are tried on both sides and the better side becomes the split's default
//! direction. Ties keep the first candidate found (lowest feature index,
//! lowest threshold), so construction is deterministic.

use crate::tree::{Node, Split, Tree, goes_left};

#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: usize,
    pub min_child_weight: f64,
    pub reg_lambda: f64,
    pub gamma: f64,
    pub learning_rate: f64,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    default_left: bool,
    gain: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct GradSum {
    g: f64,
    h: f64,
}

impl GradSum {
    fn add(&mut self, g: f64, h: f64) {
        self.g += g;
        self.h += h;
    }

    fn plus(self, other: Self) -> Self {
        Self {
            g: self.g + other.g,
            h: self.h + other.h,
        }
    }

    fn minus(self, other: Self) -> Self {
        Self {
            g: self.g - other.g,
            h: self.h - other.h,
        }
    }

    fn score(self, lambda: f64) -> f64 {
        self.g * self.g / (self.h + lambda)
    }
}

pub(crate) struct TreeBuilder<'a> {
    rows: &'a [Vec<f64>],
    gradients: &'a [f64],
    hessians: &'a [f64],
    features: &'a [usize],
    params: TreeParams,
    nodes: Vec<Node>,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(
        rows: &'a [Vec<f64>],
        gradients: &'a [f64],
        hessians: &'a [f64],
        features: &'a [usize],
        params: TreeParams,
    ) -> Self {
        assert_eq!(rows.len(), gradients.len());
        assert_eq!(rows.len(), hessians.len());
        Self {
            rows,
            gradients,
            hessians,
            features,
            params,
            nodes: vec![],
        }
    }

    /// Grows a tree over the rows listed in `indices`.
    pub(crate) fn build(mut self, indices: &[usize]) -> Tree {
        self.build_node(indices, 0);
        Tree::from_nodes(self.nodes)
    }

    fn build_node(&mut self, indices: &[usize], depth: usize) -> usize {
        let total = self.sum(indices);
        let node_idx = self.nodes.len();
        self.nodes.push(Node {
            value: self.leaf_weight(total),
            cover: total.h,
            split: None,
        });

        if depth >= self.params.max_depth || indices.len() < 2 {
            return node_idx;
        }
        let Some(best) = self.find_best_split(indices, total) else {
            return node_idx;
        };

        let (left, right) = indices.iter().partition::<Vec<usize>, _>(|&&i| {
            goes_left(
                self.rows[i][best.feature],
                best.threshold,
                best.default_left,
            )
        });
        let left_idx = self.build_node(&left, depth + 1);
        let right_idx = self.build_node(&right, depth + 1);
        self.nodes[node_idx].split = Some(Split {
            feature: best.feature,
            threshold: best.threshold,
            default_left: best.default_left,
            left: left_idx,
            right: right_idx,
            gain: best.gain,
        });
        node_idx
    }

    fn sum(&self, indices: &[usize]) -> GradSum {
        let mut sum = GradSum::default();
        for &i in indices {
            sum.add(self.gradients[i], self.hessians[i]);
        }
        sum
    }

    fn leaf_weight(&self, sum: GradSum) -> f64 {
        let denom = sum.h + self.params.reg_lambda;
        if denom <= 0.0 {
            return 0.0;
        }
        -sum.g / denom * self.params.learning_rate
    }

    fn gain(&self, left: GradSum, right: GradSum, total: GradSum) -> Option<f64> {
        let min = self.params.min_child_weight;
        if left.h < min || right.h < min || left.h <= 0.0 || right.h <= 0.0 {
            return None;
        }
        let lambda = self.params.reg_lambda;
        let gain = 0.5 * (left.score(lambda) + right.score(lambda) - total.score(lambda))
            - self.params.gamma;
        Some(gain)
    }

    fn find_best_split(&self, indices: &[usize], total: GradSum) -> Option<SplitCandidate> {
        let mut best: Option<SplitCandidate> = None;
        let mut sorted = Vec::with_capacity(indices.len());

        for &feature in self.features {
            sorted.clear();
            let mut missing = GradSum::default();
            for &i in indices {
                let x = self.rows[i][feature];
                if x.is_nan() {
                    missing.add(self.gradients[i], self.hessians[i]);
                } else {
                    sorted.push((x, i));
                }
            }
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
            let present = total.minus(missing);

            let mut left = GradSum::default();
            for pair in sorted.windows(2) {
                let [(x, i), (next_x, _)] = [pair[0], pair[1]];
                left.add(self.gradients[i], self.hessians[i]);
                if x >= next_x {
                    continue;
                }
                let threshold = midpoint(x, next_x);
                let right = present.minus(left);

                for default_left in [true, false] {
                    let (l, r) = if default_left {
                        (left.plus(missing), right)
                    } else {
                        (left, right.plus(missing))
                    };
                    let Some(gain) = self.gain(l, r, total) else {
                        continue;
                    };
                    if gain > 0.0 && best.is_none_or(|b| gain > b.gain) {
                        best = Some(SplitCandidate {
                            feature,
                            threshold,
                            default_left,
                            gain,
                        });
                    }
                }
            }
        }
        best
    }
}

/// Midpoint of `a < b` that still separates them.
fn midpoint(a: f64, b: f64) -> f64 {
    let mid = a + (b - a) / 2.0;
    if mid < b { mid } else { a }
}
