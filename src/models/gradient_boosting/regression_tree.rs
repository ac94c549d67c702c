use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Growth limits of a [`RegressionTree`]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TreeLimits {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A binary regression tree grown by least squares
///
/// Nodes live in a flat vector with the root at index `0`. A record goes to
/// the left child when its feature value is smaller or equal to the
/// threshold of the node.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Grow a tree on the records `rows` of `x`, every leaf predicts the mean
    /// target of the records it holds
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>, rows: &[usize], limits: &TreeLimits) -> Self {
        let mut tree = RegressionTree { nodes: Vec::new() };
        tree.grow(x, y, rows.to_vec(), 0, limits);
        tree
    }

    fn grow(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: Vec<usize>,
        depth: usize,
        limits: &TreeLimits,
    ) -> usize {
        let idx = self.nodes.len();
        let nrows = rows.len();
        let sum: f64 = rows.iter().map(|row| y[*row]).sum();
        let value = if nrows > 0 { sum / nrows as f64 } else { 0.0 };
        self.nodes.push(TreeNode::Leaf { value });

        let pure = rows.iter().all(|row| y[*row] == y[rows[0]]);
        if depth >= limits.max_depth
            || nrows < limits.min_samples_split
            || nrows < 2 * limits.min_samples_leaf
            || pure
        {
            return idx;
        }

        let (feature, threshold) = match best_split(x, y, &rows, limits.min_samples_leaf) {
            Some(split) => split,
            None => return idx,
        };
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .copied()
            .partition(|row| x[(*row, feature)] <= threshold);

        let left = self.grow(x, y, left_rows, depth + 1, limits);
        let right = self.grow(x, y, right_rows, depth + 1, limits);
        self.nodes[idx] = TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        };

        idx
    }

    /// Index of the leaf `row` ends up in
    pub fn leaf(&self, row: ArrayView1<f64>) -> usize {
        let mut idx = 0;
        while let TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        } = self.nodes[idx]
        {
            idx = if row[feature] <= threshold { left } else { right };
        }
        idx
    }

    /// Overwrite the prediction of a leaf, other nodes are left untouched
    pub fn set_leaf_value(&mut self, leaf: usize, value: f64) {
        if let Some(TreeNode::Leaf { value: current }) = self.nodes.get_mut(leaf) {
            *current = value;
        }
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        match self.nodes[self.leaf(row)] {
            TreeNode::Leaf { value } => value,
            TreeNode::Split { .. } => unreachable!("leaf() always stops at a leaf"),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
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
        fn depth_of(nodes: &[TreeNode], idx: usize) -> usize {
            match nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => {
                    1 + depth_of(nodes, left).max(depth_of(nodes, right))
                }
            }
        }
        depth_of(&self.nodes, 0)
    }
}

/// Feature and threshold minimizing the squared error of both children
///
/// Maximizing `sum_l^2 / n_l + sum_r^2 / n_r` over the sorted prefix sums is
/// equivalent to minimizing the summed squared error. Thresholds lie halfway
/// between consecutive distinct values, earlier features win ties.
fn best_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    rows: &[usize],
    min_samples_leaf: usize,
) -> Option<(usize, f64)> {
    let nrows = rows.len();
    let total: f64 = rows.iter().map(|row| y[*row]).sum();
    let mut best: Option<(usize, f64, f64)> = None;
    let mut order = rows.to_vec();

    for feature in 0..x.ncols() {
        order.sort_by(|a, b| x[(*a, feature)].total_cmp(&x[(*b, feature)]));

        let mut left_sum = 0.0;
        for pos in 1..nrows {
            left_sum += y[order[pos - 1]];
            let (low, high) = (x[(order[pos - 1], feature)], x[(order[pos], feature)]);
            if low == high || pos < min_samples_leaf || nrows - pos < min_samples_leaf {
                continue;
            }

            let right_sum = total - left_sum;
            let score =
                left_sum * left_sum / pos as f64 + right_sum * right_sum / (nrows - pos) as f64;
            if best.map_or(true, |(_, _, best_score)| score > best_score) {
                let mut threshold = low / 2.0 + high / 2.0;
                if threshold >= high {
                    threshold = low;
                }
                best = Some((feature, threshold, score));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn limits(max_depth: usize) -> TreeLimits {
        TreeLimits {
            max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }

    #[test]
    fn fits_small_regression_exactly() {
        let x = array![[1.0], [2.0], [4.0], [5.0]];
        let y = array![1.1, 1.9, 3.9, 5.1];
        let tree = RegressionTree::fit(&x, &y, &[0, 1, 2, 3], &limits(3));

        let predictions = tree.predict(&x);
        assert_abs_diff_eq!(predictions, y, epsilon = 1e-12);
        assert_eq!(tree.nleaves(), 4);
    }

    #[test]
    fn splits_between_distinct_values() {
        let x = array![[0.0, 7.0], [1.0, 7.0], [2.0, 7.0], [3.0, 7.0]];
        let y = array![-1.0, -1.0, 1.0, 1.0];
        let tree = RegressionTree::fit(&x, &y, &[0, 1, 2, 3], &limits(3));

        assert_eq!(tree.depth(), 1);
        assert_abs_diff_eq!(tree.predict_row(array![1.4, 0.0].view()), -1.0);
        assert_abs_diff_eq!(tree.predict_row(array![1.6, 0.0].view()), 1.0);
    }

    #[test]
    fn depth_is_limited() {
        let x = Array2::from_shape_fn((32, 1), |(i, _)| i as f64);
        let y = x.column(0).mapv(|v| v * v);
        let rows = (0..32).collect::<Vec<_>>();

        let tree = RegressionTree::fit(&x, &y, &rows, &limits(3));
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.nleaves(), 8);
    }

    #[test]
    fn constant_target_is_a_single_leaf() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![0.5, 0.5, 0.5];
        let tree = RegressionTree::fit(&x, &y, &[0, 1, 2], &limits(3));

        assert_eq!(tree.nleaves(), 1);
        assert_abs_diff_eq!(tree.predict(&x), y);
    }

    #[test]
    fn only_selected_rows_are_used() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![0.0, 10.0, 20.0, 1000.0];
        let tree = RegressionTree::fit(&x, &y, &[0, 1], &limits(0));

        assert_abs_diff_eq!(tree.predict_row(x.row(3)), 5.0);
    }

    #[test]
    fn leaf_values_can_be_replaced() {
        let x = array![[0.0], [1.0]];
        let y = array![0.0, 1.0];
        let mut tree = RegressionTree::fit(&x, &y, &[0, 1], &limits(1));

        let leaf = tree.leaf(x.row(1));
        tree.set_leaf_value(leaf, 42.0);
        assert_abs_diff_eq!(tree.predict(&x), array![0.0, 42.0]);
    }

    #[test]
    fn min_samples_leaf_is_respected() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
        let y = array![100.0, 0.0, 0.0, 0.0, 0.0];
        let tree = RegressionTree::fit(
            &x,
            &y,
            &[0, 1, 2, 3, 4],
            &TreeLimits {
                max_depth: 1,
                min_samples_split: 2,
                min_samples_leaf: 2,
            },
        );

        // the outlier cannot be isolated, it shares a leaf with its neighbour
        assert_abs_diff_eq!(tree.predict_row(x.row(0)), 50.0);
    }
}
