//! Regression error metrics.

use crate::error::ModelError;

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> Result<(), ModelError> {
    if y_true.len() != y_pred.len() {
        return Err(ModelError::DimensionMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(ModelError::EmptyData(
            "cannot score an empty prediction set".to_string(),
        ));
    }
    Ok(())
}

/// Mean squared error.
///
/// MSE = mean((y_true - y_pred)^2)
pub fn mse(y_true: &[f64], y_pred: &[f64]) -> Result<f64, ModelError> {
    check_lengths(y_true, y_pred)?;
    let sum_sq: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| (t - p).powi(2))
        .sum();
    Ok(sum_sq / y_true.len() as f64)
}

/// Root mean squared error, in the units of the target.
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> Result<f64, ModelError> {
    mse(y_true, y_pred).map(f64::sqrt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(&[1.0, 2.0, 3.0], &[1.0, 4.0, 0.0], (13.0_f64 / 3.0).sqrt())]
    #[case(&[10.0], &[7.0], 3.0)]
    #[case(&[-1.0, 1.0], &[1.0, -1.0], 2.0)]
    fn test_rmse(#[case] actual: &[f64], #[case] predicted: &[f64], #[case] expected: f64) {
        let value = rmse(actual, predicted).unwrap();
        assert_abs_diff_eq!(value, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_perfect_prediction() {
        assert_eq!(mse(&[5.0, 6.0], &[5.0, 6.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            rmse(&[1.0], &[1.0, 2.0]),
            Err(ModelError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_empty() {
        assert!(matches!(rmse(&[], &[]), Err(ModelError::EmptyData(_))));
    }
}
