use crate::error::{check_lengths, MetricsResult};

/// Mean Squared Error.
pub fn mse(y_true: &[f64], y_pred: &[f64]) -> MetricsResult<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    Ok(sum / y_true.len() as f64)
}

/// Root Mean Squared Error.
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> MetricsResult<f64> {
    Ok(mse(y_true, y_pred)?.sqrt())
}

/// Coefficient of determination.
///
/// R² = 1 - SS_res / SS_tot. A constant `y_true` scores 1.0 when predicted
/// exactly and 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> MetricsResult<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean) * (t - mean)).sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mse_and_rmse() {
        let y_true = [1.0, 2.0, 3.0];
        let y_pred = [1.0, 2.0, 5.0];
        assert_abs_diff_eq!(mse(&y_true, &y_pred).unwrap(), 4.0 / 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(rmse(&y_true, &y_pred).unwrap(), (4.0f64 / 3.0).sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_r2_perfect() {
        let y = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(r2_score(&y, &y).unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_r2_mean_predictor_is_zero() {
        let y_true = [1.0, 2.0, 3.0];
        let y_pred = [2.0, 2.0, 2.0];
        assert_abs_diff_eq!(r2_score(&y_true, &y_pred).unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_r2_constant_truth() {
        assert_eq!(r2_score(&[3.0, 3.0], &[3.0, 3.0]).unwrap(), 1.0);
        assert_eq!(r2_score(&[3.0, 3.0], &[3.0, 4.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_empty_is_error() {
        assert!(rmse(&[], &[]).is_err());
    }
}
