use autotab_core::Matrix;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{TreeError, TreeResult};

/// Nodes with impurity at or below this are leaves.
const IMPURITY_EPSILON: f64 = 1e-12;

/// A node in the tree arena. Children are indices into the same arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Internal node: rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Leaf: class probabilities for classification, `[mean]` for regression.
    Leaf { value: Vec<f64> },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// `None` grows until leaves are pure or cannot be split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features evaluated per split; `None` means all of them.
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

/// What a tree is fitted against.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// Encoded class labels in `0..n_classes`, split by Gini impurity.
    Classes { labels: &'a [usize], n_classes: usize },
    /// Continuous values, split by variance reduction.
    Values(&'a [f64]),
}

impl Target<'_> {
    fn len(&self) -> usize {
        match self {
            Target::Classes { labels, .. } => labels.len(),
            Target::Values(v) => v.len(),
        }
    }
}

// ─── Node statistics ────────────────────────────────────────────────────────

/// Sufficient statistics of the samples reaching a node.
#[derive(Debug, Clone)]
enum Stats {
    Classes { counts: Vec<f64>, n: f64 },
    Values { n: f64, sum: f64, sum_sq: f64 },
}

impl Stats {
    fn empty(target: &Target<'_>) -> Self {
        match target {
            Target::Classes { n_classes, .. } => Stats::Classes {
                counts: vec![0.0; *n_classes],
                n: 0.0,
            },
            Target::Values(_) => Stats::Values {
                n: 0.0,
                sum: 0.0,
                sum_sq: 0.0,
            },
        }
    }

    fn of(target: &Target<'_>, samples: &[usize]) -> Self {
        let mut stats = Stats::empty(target);
        for &i in samples {
            stats.push(target, i);
        }
        stats
    }

    fn push(&mut self, target: &Target<'_>, i: usize) {
        match (self, target) {
            (Stats::Classes { counts, n }, Target::Classes { labels, .. }) => {
                counts[labels[i]] += 1.0;
                *n += 1.0;
            }
            (Stats::Values { n, sum, sum_sq }, Target::Values(values)) => {
                let v = values[i];
                *n += 1.0;
                *sum += v;
                *sum_sq += v * v;
            }
            _ => {}
        }
    }

    /// Sample count times node impurity.
    fn cost(&self) -> f64 {
        match self {
            Stats::Classes { counts, n } => gini_cost(counts.iter().copied(), *n),
            Stats::Values { n, sum, sum_sq } => variance_cost(*n, *sum, *sum_sq),
        }
    }

    /// Cost of the samples in `self` but not in `part`.
    fn remainder_cost(&self, part: &Stats) -> f64 {
        match (self, part) {
            (Stats::Classes { counts, n }, Stats::Classes { counts: pc, n: pn }) => {
                gini_cost(counts.iter().zip(pc).map(|(a, b)| a - b), n - pn)
            }
            (
                Stats::Values { n, sum, sum_sq },
                Stats::Values {
                    n: pn,
                    sum: ps,
                    sum_sq: pq,
                },
            ) => variance_cost(n - pn, sum - ps, sum_sq - pq),
            _ => 0.0,
        }
    }

    fn n(&self) -> f64 {
        match self {
            Stats::Classes { n, .. } | Stats::Values { n, .. } => *n,
        }
    }

    fn leaf_value(&self) -> Vec<f64> {
        match self {
            Stats::Classes { counts, n } => counts.iter().map(|c| c / n.max(1.0)).collect(),
            Stats::Values { n, sum, .. } => vec![sum / n.max(1.0)],
        }
    }
}

fn gini_cost(counts: impl Iterator<Item = f64>, n: f64) -> f64 {
    if n <= 0.0 {
        return 0.0;
    }
    let sq: f64 = counts.map(|c| c * c).sum();
    n - sq / n
}

fn variance_cost(n: f64, sum: f64, sum_sq: f64) -> f64 {
    if n <= 0.0 {
        return 0.0;
    }
    (sum_sq - sum * sum / n).max(0.0)
}

// ─── Tree ───────────────────────────────────────────────────────────────────

/// A fitted CART tree stored as a flat arena rooted at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    importances: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    cost: f64,
}

impl DecisionTree {
    /// Grow a tree on the rows of `x` listed in `samples`.
    ///
    /// `samples` may repeat rows, which is how bootstrap draws are fed in.
    /// Features considered at each split are drawn from `rng`.
    pub fn fit(
        x: &Matrix,
        target: Target<'_>,
        samples: Vec<usize>,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> TreeResult<Self> {
        if samples.is_empty() {
            return Err(TreeError::EmptyTrainingSet);
        }
        if target.len() != x.n_rows() {
            return Err(TreeError::LengthMismatch {
                x_rows: x.n_rows(),
                y_len: target.len(),
            });
        }
        if let Target::Classes { labels, n_classes } = target {
            if let Some(&label) = labels.iter().find(|&&l| l >= n_classes) {
                return Err(TreeError::LabelOutOfRange { label, n_classes });
            }
        }
        if let Some(&bad) = samples.iter().find(|&&i| i >= x.n_rows()) {
            return Err(TreeError::InvalidParameter(format!(
                "sample index {} out of range for {} rows",
                bad,
                x.n_rows()
            )));
        }

        let p = x.n_cols();
        let max_features = params.max_features.unwrap_or(p).clamp(1, p.max(1));
        let min_split = params.min_samples_split.max(2);

        let mut nodes = vec![Node::Leaf { value: Vec::new() }];
        let mut importances = vec![0.0; p];
        let mut features: Vec<usize> = (0..p).collect();
        let mut stack = vec![(0usize, samples, 0usize)];

        while let Some((id, rows, depth)) = stack.pop() {
            let stats = Stats::of(&target, &rows);
            let splittable = rows.len() >= min_split
                && params.max_depth.map_or(true, |d| depth < d)
                && stats.cost() / stats.n() > IMPURITY_EPSILON;

            let best = if splittable {
                best_split(x, &target, &rows, &stats, &mut features, max_features, rng)
            } else {
                None
            };

            let partition = best.map(|split| {
                let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                    .iter()
                    .partition(|&&i| x.row(i)[split.feature] <= split.threshold);
                (split, left_rows, right_rows)
            });

            match partition {
                Some((split, left_rows, right_rows))
                    if !left_rows.is_empty() && !right_rows.is_empty() =>
                {
                    importances[split.feature] += (stats.cost() - split.cost).max(0.0);
                    let left = nodes.len();
                    let right = left + 1;
                    nodes.push(Node::Leaf { value: Vec::new() });
                    nodes.push(Node::Leaf { value: Vec::new() });
                    nodes[id] = Node::Split {
                        feature: split.feature,
                        threshold: split.threshold,
                        left,
                        right,
                    };
                    stack.push((right, right_rows, depth + 1));
                    stack.push((left, left_rows, depth + 1));
                }
                _ => {
                    nodes[id] = Node::Leaf {
                        value: stats.leaf_value(),
                    };
                }
            }
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        Ok(DecisionTree {
            nodes,
            n_features: p,
            importances,
        })
    }

    /// Leaf payload reached by `row`.
    pub fn leaf_value(&self, row: &[f64]) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Normalized impurity decrease per feature; all zeros for a stump.
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn has_splits(&self) -> bool {
        self.importances.iter().any(|&v| v > 0.0)
    }
}

/// Sweep each candidate feature in sorted order and keep the lowest
/// child cost. Constant features do not count toward `max_features`.
/// A threshold that would not separate `a` from `b` is never proposed.
fn best_split(
    x: &Matrix,
    target: &Target<'_>,
    rows: &[usize],
    stats: &Stats,
    features: &mut [usize],
    max_features: usize,
    rng: &mut StdRng,
) -> Option<BestSplit> {
    features.shuffle(rng);
    let mut best: Option<BestSplit> = None;
    let mut visited = 0;
    let mut column: Vec<(f64, usize)> = Vec::with_capacity(rows.len());

    for &f in features.iter() {
        if visited >= max_features {
            break;
        }
        column.clear();
        column.extend(rows.iter().map(|&i| (x.row(i)[f], i)));
        column.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (lo, hi) = (column[0].0, column[column.len() - 1].0);
        if lo == hi {
            continue;
        }
        visited += 1;

        let mut left = Stats::empty(target);
        for pos in 0..column.len() - 1 {
            left.push(target, column[pos].1);
            let (a, b) = (column[pos].0, column[pos + 1].0);
            if a == b {
                continue;
            }
            let threshold = midpoint(a, b);
            if !(a <= threshold && threshold < b) {
                continue;
            }
            let cost = left.cost() + stats.remainder_cost(&left);
            if best.as_ref().map_or(true, |s| cost < s.cost) {
                best = Some(BestSplit {
                    feature: f,
                    threshold,
                    cost,
                });
            }
        }
    }
    best
}

fn midpoint(a: f64, b: f64) -> f64 {
    let mid = a / 2.0 + b / 2.0;
    if mid >= b || !mid.is_finite() {
        a
    } else {
        mid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_classification_tree_fits_training_data() {
        let x = Matrix::from_rows(&[
            vec![0.0], vec![1.0], vec![2.0], vec![3.0],
            vec![4.0], vec![5.0], vec![6.0], vec![7.0],
        ])
        .unwrap();
        let y: [usize; 8] = [0, 0, 0, 0, 1, 1, 1, 1];
        let target = Target::Classes { labels: &y, n_classes: 2 };
        let tree = DecisionTree::fit(&x, target, (0..8).collect(), &TreeParams::default(), &mut rng()).unwrap();

        assert_eq!(tree.n_leaves(), 2);
        for (i, row) in x.rows().enumerate() {
            assert_eq!(tree.leaf_value(row)[y[i]], 1.0, "Mismatch at {}", i);
        }
        assert!(matches!(tree.nodes()[0], Node::Split { threshold, .. } if threshold == 3.5));
    }

    #[test]
    fn test_regression_tree() {
        let x = Matrix::from_rows(&[vec![1.0], vec![2.0], vec![3.0], vec![4.0]]).unwrap();
        let y = [2.0, 4.0, 6.0, 8.0];
        let tree = DecisionTree::fit(&x, Target::Values(&y), (0..4).collect(), &TreeParams::default(), &mut rng()).unwrap();
        for (i, row) in x.rows().enumerate() {
            assert_abs_diff_eq!(tree.leaf_value(row)[0], y[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x = Matrix::from_rows(&[vec![1.0], vec![2.0], vec![3.0], vec![4.0]]).unwrap();
        let y = [2.0, 4.0, 6.0, 8.0];
        let params = TreeParams { max_depth: Some(0), ..TreeParams::default() };
        let tree = DecisionTree::fit(&x, Target::Values(&y), (0..4).collect(), &params, &mut rng()).unwrap();
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.leaf_value(&[1.0]), &[5.0]);
        assert!(!tree.has_splits());
    }

    #[test]
    fn test_importance_goes_to_informative_feature() {
        let x = Matrix::from_rows(&[
            vec![5.0, 0.0], vec![5.0, 1.0], vec![5.0, 2.0],
            vec![5.0, 3.0], vec![5.0, 4.0], vec![5.0, 5.0],
        ])
        .unwrap();
        let y: [usize; 6] = [0, 0, 0, 1, 1, 1];
        let target = Target::Classes { labels: &y, n_classes: 2 };
        let params = TreeParams { max_features: Some(1), ..TreeParams::default() };
        let tree = DecisionTree::fit(&x, target, (0..6).collect(), &params, &mut rng()).unwrap();
        assert_eq!(tree.feature_importances(), &[0.0, 1.0]);
    }

    #[test]
    fn test_duplicate_rows_with_conflicting_labels_make_a_leaf() {
        let x = Matrix::from_rows(&[vec![1.0], vec![1.0]]).unwrap();
        let y: [usize; 2] = [0, 1];
        let target = Target::Classes { labels: &y, n_classes: 2 };
        let tree = DecisionTree::fit(&x, target, vec![0, 1], &TreeParams::default(), &mut rng()).unwrap();
        assert_eq!(tree.leaf_value(&[1.0]), &[0.5, 0.5]);
    }

    #[test]
    fn test_nan_feature_does_not_split() {
        let x = Matrix::from_rows(&[vec![f64::NAN], vec![f64::NAN], vec![f64::NAN]]).unwrap();
        let y: [usize; 3] = [0, 1, 0];
        let target = Target::Classes { labels: &y, n_classes: 2 };
        let tree = DecisionTree::fit(&x, target, vec![0, 1, 2], &TreeParams::default(), &mut rng()).unwrap();
        assert_eq!(tree.nodes().len(), 1);
        assert!(!tree.has_splits());
    }

    #[test]
    fn test_split_ignores_nan_but_uses_finite_values() {
        let x = Matrix::from_rows(&[vec![1.0], vec![2.0], vec![f64::NAN], vec![f64::NAN]]).unwrap();
        let y = [1.0, 5.0, 5.0, 5.0];
        let tree = DecisionTree::fit(&x, Target::Values(&y), (0..4).collect(), &TreeParams::default(), &mut rng()).unwrap();
        assert!(matches!(tree.nodes()[0], Node::Split { threshold, .. } if threshold == 1.5));
        assert_eq!(tree.leaf_value(&[1.0]), &[1.0]);
    }

    #[test]
    fn test_infinite_values_split_at_finite_side() {
        let x = Matrix::from_rows(&[vec![0.0], vec![f64::INFINITY]]).unwrap();
        let y = [1.0, 3.0];
        let tree = DecisionTree::fit(&x, Target::Values(&y), vec![0, 1], &TreeParams::default(), &mut rng()).unwrap();
        assert!(matches!(tree.nodes()[0], Node::Split { threshold, .. } if threshold == 0.0));
        assert_eq!(tree.leaf_value(&[f64::INFINITY]), &[3.0]);
    }

    #[test]
    fn test_rejects_bad_input() {
        let x = Matrix::from_rows(&[vec![1.0], vec![2.0]]).unwrap();
        let y: [usize; 2] = [0, 3];
        let target = Target::Classes { labels: &y, n_classes: 2 };
        assert_eq!(
            DecisionTree::fit(&x, target, vec![0, 1], &TreeParams::default(), &mut rng()),
            Err(TreeError::LabelOutOfRange { label: 3, n_classes: 2 })
        );
        assert_eq!(
            DecisionTree::fit(&x, Target::Values(&[1.0]), vec![0], &TreeParams::default(), &mut rng()),
            Err(TreeError::LengthMismatch { x_rows: 2, y_len: 1 })
        );
        assert_eq!(
            DecisionTree::fit(&x, Target::Values(&[1.0, 2.0]), vec![], &TreeParams::default(), &mut rng()),
            Err(TreeError::EmptyTrainingSet)
        );
    }
}
