//! Second-order regression trees for gradient boosting.
//!
//! Trees are grown greedily on per-row gradients `g` and hessians `h`. A
//! candidate split of a node with sums `G`, `H` into `(GL, HL)` and
//! `(GR, HR)` has gain
//!
//! gain = 1/2 * [GL² / (HL + λ) + GR² / (HR + λ) - G² / (H + λ)] - γ
//!
//! and a leaf predicts `-G / (H + λ)`. Candidate thresholds are midpoints
//! between consecutive distinct feature values; rows with a value at or
//! below the threshold go left.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Growth limits and regularisation for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth (root has depth 0)
    pub max_depth: usize,
    /// L2 regularisation on leaf weights
    pub lambda: f64,
    /// Minimum gain required to split
    pub gamma: f64,
    /// Minimum hessian sum in each child
    pub min_child_weight: f64,
}

/// A node in a regression tree (either internal node or leaf).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal decision node
    Split {
        /// Feature index to split on
        feature: usize,
        /// Rows with `x[feature] <= threshold` go left
        threshold: f64,
        /// Left subtree
        left: Box<TreeNode>,
        /// Right subtree
        right: Box<TreeNode>,
    },
    /// Leaf with its output weight
    Leaf {
        /// Leaf weight
        weight: f64,
    },
}

impl TreeNode {
    /// Depth of the subtree rooted here; leaves have depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Number of leaves in the subtree rooted here.
    pub fn n_leaves(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// A fitted regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode,
}

impl RegressionTree {
    /// Grow a tree on the given rows and candidate features.
    ///
    /// `grad` and `hess` are indexed by row of `x`.
    pub fn fit(
        x: &Array2<f64>,
        grad: &[f64],
        hess: &[f64],
        rows: &[usize],
        features: &[usize],
        params: &TreeParams,
    ) -> Self {
        let builder = TreeBuilder {
            x,
            grad,
            hess,
            features,
            params,
        };
        Self {
            root: builder.build(rows, 0),
        }
    }

    /// Predict a single feature vector.
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { weight } => return *weight,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Root node.
    pub const fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Tree depth.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

/// Best split found for a node.
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    grad: &'a [f64],
    hess: &'a [f64],
    features: &'a [usize],
    params: &'a TreeParams,
}

impl TreeBuilder<'_> {
    fn build(&self, rows: &[usize], depth: usize) -> TreeNode {
        let (g, h) = self.sums(rows);
        let leaf = TreeNode::Leaf {
            weight: leaf_weight(g, h, self.params.lambda),
        };

        if depth >= self.params.max_depth || rows.len() < 2 {
            return leaf;
        }

        let Some(split) = self.best_split(rows, g, h) else {
            return leaf;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .copied()
            .partition(|&r| self.x[[r, split.feature]] <= split.threshold);

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(&left_rows, depth + 1)),
            right: Box::new(self.build(&right_rows, depth + 1)),
        }
    }

    fn sums(&self, rows: &[usize]) -> (f64, f64) {
        rows.iter()
            .fold((0.0, 0.0), |(g, h), &r| (g + self.grad[r], h + self.hess[r]))
    }

    fn best_split(&self, rows: &[usize], g: f64, h: f64) -> Option<SplitCandidate> {
        let lambda = self.params.lambda;
        let parent_score = score(g, h, lambda);
        let mut best: Option<SplitCandidate> = None;

        for &feature in self.features {
            let mut sorted = rows.to_vec();
            sorted.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));

            let (mut gl, mut hl) = (0.0, 0.0);
            for pair in sorted.windows(2) {
                let (current, next) = (pair[0], pair[1]);
                gl += self.grad[current];
                hl += self.hess[current];

                let (value, next_value) = (self.x[[current, feature]], self.x[[next, feature]]);
                if value == next_value {
                    continue;
                }

                let (gr, hr) = (g - gl, h - hl);
                if hl < self.params.min_child_weight || hr < self.params.min_child_weight {
                    continue;
                }

                let gain = 0.5 * (score(gl, hl, lambda) + score(gr, hr, lambda) - parent_score)
                    - self.params.gamma;
                if gain > 1e-12 && best.is_none_or(|b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: value + (next_value - value) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}

fn score(g: f64, h: f64, lambda: f64) -> f64 {
    let denom = h + lambda;
    if denom > 0.0 { g * g / denom } else { 0.0 }
}

fn leaf_weight(g: f64, h: f64, lambda: f64) -> f64 {
    let denom = h + lambda;
    if denom > 0.0 { -g / denom } else { 0.0 }
}
