use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::models::argmax;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: usize,
    },
}

/// A binary classification tree grown by Gini impurity
///
/// Nodes live in a flat vector with the root at index `0`, records go left
/// when their feature value is smaller or equal to the threshold. Impurities
/// are compared on exact class counts, so growing the same tree twice gives
/// the same nodes. A leaf predicts its most frequent class, the smallest
/// class index among equally frequent ones.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClassificationTree {
    nodes: Vec<TreeNode>,
}

impl ClassificationTree {
    /// Grow a tree on the records `rows` of `x`, only looking at `features`
    ///
    /// `rows` may contain repetitions, as bootstrap samples do. Nodes are
    /// split until they are pure, cannot be separated on any of `features`
    /// or reach `max_depth`.
    pub fn fit(
        x: &Array2<f64>,
        y: &Array1<usize>,
        rows: &[usize],
        features: &[usize],
        max_depth: Option<usize>,
        nclasses: usize,
    ) -> Self {
        let mut nodes = Vec::new();
        let mut pending = vec![(rows.to_vec(), 0, None)];

        while let Some((rows, depth, parent)) = pending.pop() {
            let idx = nodes.len();
            let counts = class_counts(y, &rows, nclasses);
            nodes.push(TreeNode::Leaf {
                class: argmax(ArrayView1::from(counts.as_slice())),
            });
            if let Some((parent, is_left)) = parent {
                link(&mut nodes, parent, is_left, idx);
            }

            let pure = counts.iter().filter(|count| **count > 0).count() <= 1;
            if pure || max_depth.map_or(false, |max| depth >= max) {
                continue;
            }
            let (feature, threshold) = match best_split(x, y, &rows, features, &counts) {
                Some(split) => split,
                None => continue,
            };

            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                .iter()
                .copied()
                .partition(|row| x[(*row, feature)] <= threshold);
            nodes[idx] = TreeNode::Split {
                feature,
                threshold,
                left: 0,
                right: 0,
            };
            // right first so the left subtree is grown next
            pending.push((right_rows, depth + 1, Some((idx, false))));
            pending.push((left_rows, depth + 1, Some((idx, true))));
        }

        ClassificationTree { nodes }
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> usize {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if row[feature] <= threshold { left } else { right },
                TreeNode::Leaf { class } => return class,
            }
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Array1<usize> {
        x.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn nleaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, TreeNode::Leaf { .. }))
            .count()
    }

    /// Length of the longest path from the root to a leaf
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(0, 0)];
        while let Some((idx, depth)) = pending.pop() {
            match self.nodes[idx] {
                TreeNode::Leaf { .. } => deepest = deepest.max(depth),
                TreeNode::Split { left, right, .. } => {
                    pending.push((left, depth + 1));
                    pending.push((right, depth + 1));
                }
            }
        }
        deepest
    }
}

fn link(nodes: &mut [TreeNode], parent: usize, is_left: bool, child: usize) {
    if let TreeNode::Split { left, right, .. } = &mut nodes[parent] {
        if is_left {
            *left = child;
        } else {
            *right = child;
        }
    }
}

fn class_counts(y: &Array1<usize>, rows: &[usize], nclasses: usize) -> Vec<usize> {
    let mut counts = vec![0; nclasses];
    for row in rows {
        counts[y[*row]] += 1;
    }
    counts
}

/// Feature and threshold with the smallest weighted Gini impurity
///
/// Minimizing `n_l * gini_l + n_r * gini_r` is the same as maximizing
/// `sq_l / n_l + sq_r / n_r`, where `sq` is the sum of squared class counts
/// of a child. Only splits that lower the impurity of the node qualify.
/// Thresholds lie halfway between consecutive distinct values, earlier
/// features and smaller thresholds win ties.
fn best_split(
    x: &Array2<f64>,
    y: &Array1<usize>,
    rows: &[usize],
    features: &[usize],
    counts: &[usize],
) -> Option<(usize, f64)> {
    let nrows = rows.len();
    let total_sq: usize = counts.iter().map(|count| count * count).sum();
    let mut best_score = total_sq as f64 / nrows as f64;
    let mut best = None;
    let mut order = rows.to_vec();

    for &feature in features {
        order.sort_by(|a, b| x[(*a, feature)].total_cmp(&x[(*b, feature)]));

        let mut left = vec![0usize; counts.len()];
        let mut right = counts.to_vec();
        let (mut left_sq, mut right_sq) = (0, total_sq);
        for pos in 1..nrows {
            let class = y[order[pos - 1]];
            left_sq += 2 * left[class] + 1;
            right_sq -= 2 * right[class] - 1;
            left[class] += 1;
            right[class] -= 1;

            let (low, high) = (x[(order[pos - 1], feature)], x[(order[pos], feature)]);
            if low == high {
                continue;
            }

            let score = left_sq as f64 / pos as f64 + right_sq as f64 / (nrows - pos) as f64;
            if score > best_score {
                let mut threshold = low / 2.0 + high / 2.0;
                if threshold >= high {
                    threshold = low;
                }
                best_score = score;
                best = Some((feature, threshold));
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn separates_classes_exactly() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0], [5.0, 0.0]];
        let y = array![0usize, 0, 1, 1, 2];
        let tree = ClassificationTree::fit(&x, &y, &[0, 1, 2, 3, 4], &[0, 1], None, 3);

        assert_eq!(tree.predict(&x), y);
        assert_eq!(tree.nleaves(), 3);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn tied_leaf_takes_smallest_class() {
        // identical records with different labels cannot be separated
        let x = array![[1.0], [1.0], [1.0], [1.0]];
        let y = array![2usize, 1, 2, 1];
        let tree = ClassificationTree::fit(&x, &y, &[0, 1, 2, 3], &[0], None, 3);

        assert_eq!(tree.nleaves(), 1);
        assert_eq!(tree.predict_row(array![1.0].view()), 1);
    }

    #[test]
    fn only_given_features_are_used() {
        let x = array![[0.0, 9.0], [1.0, 9.0], [0.0, 0.0], [1.0, 0.0]];
        let y = array![1usize, 1, 0, 0];
        let tree = ClassificationTree::fit(&x, &y, &[0, 1, 2, 3], &[0], None, 2);

        // feature 0 carries no information, the root stays a leaf
        assert_eq!(tree.nleaves(), 1);

        let tree = ClassificationTree::fit(&x, &y, &[0, 1, 2, 3], &[0, 1], None, 2);
        assert_eq!(tree.predict(&x), y);
        assert_eq!(tree.predict_row(array![0.5, 4.6].view()), 1);
        assert_eq!(tree.predict_row(array![0.5, 4.4].view()), 0);
    }

    #[test]
    fn depth_is_limited() {
        let x = Array2::from_shape_fn((16, 1), |(i, _)| i as f64);
        let y = (0..16).map(|i| i % 4).collect::<Array1<usize>>();
        let rows = (0..16).collect::<Vec<_>>();

        let tree = ClassificationTree::fit(&x, &y, &rows, &[0], Some(2), 4);
        assert!(tree.depth() <= 2);

        let tree = ClassificationTree::fit(&x, &y, &rows, &[0], None, 4);
        assert_eq!(tree.predict(&x), y);
    }

    #[test]
    fn repeated_rows_weigh_more() {
        let x = array![[0.0], [0.0]];
        let y = array![0usize, 1];
        let tree = ClassificationTree::fit(&x, &y, &[0, 1, 1], &[0], None, 2);

        assert_eq!(tree.predict_row(array![0.0].view()), 1);
    }

    #[test]
    fn growing_twice_gives_the_same_tree() {
        let data = linfa_datasets::iris();
        let (x, y) = (data.records(), data.targets());
        let rows = (0..x.nrows()).rev().collect::<Vec<_>>();

        let a = ClassificationTree::fit(x, y, &rows, &[1, 3], None, 3);
        let b = ClassificationTree::fit(x, y, &rows, &[1, 3], None, 3);
        assert_eq!(a, b);
    }
}
