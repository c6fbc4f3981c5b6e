use crate::error::{check_lengths, MetricsResult};

/// Fraction of correct predictions.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> MetricsResult<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let correct = y_true.iter().zip(y_pred).filter(|(a, b)| a == b).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Per-class counts: true positives, predicted positives, actual positives.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ClassCounts {
    tp: usize,
    predicted: usize,
    support: usize,
}

impl ClassCounts {
    fn precision(&self) -> f64 {
        ratio(self.tp, self.predicted)
    }

    fn recall(&self) -> f64 {
        ratio(self.tp, self.support)
    }

    fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

/// `num / den`, or 0 when `den` is 0.
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn class_counts(y_true: &[usize], y_pred: &[usize]) -> Vec<ClassCounts> {
    let n_classes = y_true
        .iter()
        .chain(y_pred)
        .max()
        .map(|m| m + 1)
        .unwrap_or(0);
    let mut counts = vec![ClassCounts::default(); n_classes];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        counts[t].support += 1;
        counts[p].predicted += 1;
        if t == p {
            counts[t].tp += 1;
        }
    }
    counts
}

/// Average a per-class score weighted by true-label support.
fn weighted(y_true: &[usize], y_pred: &[usize], score: fn(&ClassCounts) -> f64) -> MetricsResult<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let counts = class_counts(y_true, y_pred);
    let total: f64 = counts.iter().map(|c| c.support as f64 * score(c)).sum();
    Ok(total / y_true.len() as f64)
}

/// Support-weighted precision. Undefined per-class values count as 0.
pub fn precision_weighted(y_true: &[usize], y_pred: &[usize]) -> MetricsResult<f64> {
    weighted(y_true, y_pred, ClassCounts::precision)
}

/// Support-weighted recall.
pub fn recall_weighted(y_true: &[usize], y_pred: &[usize]) -> MetricsResult<f64> {
    weighted(y_true, y_pred, ClassCounts::recall)
}

/// Support-weighted F1 score. Undefined per-class values count as 0.
pub fn f1_weighted(y_true: &[usize], y_pred: &[usize]) -> MetricsResult<f64> {
    weighted(y_true, y_pred, ClassCounts::f1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_accuracy() {
        let y_true = [0, 1, 1, 0, 1];
        let y_pred = [0, 1, 0, 0, 1];
        assert_abs_diff_eq!(accuracy(&y_true, &y_pred).unwrap(), 0.8, epsilon = 1e-10);
    }

    #[test]
    fn test_weighted_scores() {
        // class 0: support 2, tp 1, predicted 1 -> p 1.0, r 0.5, f1 2/3
        // class 1: support 2, tp 2, predicted 3 -> p 2/3, r 1.0, f1 0.8
        let y_true = [0, 0, 1, 1];
        let y_pred = [0, 1, 1, 1];
        assert_abs_diff_eq!(precision_weighted(&y_true, &y_pred).unwrap(), 5.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(recall_weighted(&y_true, &y_pred).unwrap(), 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(
            f1_weighted(&y_true, &y_pred).unwrap(),
            (2.0 / 3.0 + 0.8) / 2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_zero_division_counts_as_zero() {
        // class 1 is never predicted, class 2 is never true
        let y_true = [0, 1, 1];
        let y_pred = [0, 2, 2];
        assert_abs_diff_eq!(precision_weighted(&y_true, &y_pred).unwrap(), 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(f1_weighted(&y_true, &y_pred).unwrap(), 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_length_checks() {
        assert!(accuracy(&[0, 1], &[0]).is_err());
        assert!(f1_weighted(&[], &[]).is_err());
    }
}
