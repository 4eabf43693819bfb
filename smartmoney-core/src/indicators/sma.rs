//! Simple Moving Average (SMA).
//!
//! Rolling mean over a fixed window. A position is defined only when the whole
//! window is defined (no NaN inside it).

/// Rolling mean of `values` over `period`. The first `period - 1` positions are NaN,
/// as is any window containing a NaN.
pub fn sma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window.iter().sum::<f64>() / period as f64;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let result = sma_of_series(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0], 5);
        assert_eq!(result.len(), 7);
        for v in result.iter().take(4) {
            assert!(v.is_nan());
        }
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_nan_window_is_undefined() {
        // [NaN, 1, 2, 3] with period 3: first full window without NaN ends at index 3
        let result = sma_of_series(&[f64::NAN, 1.0, 2.0, 3.0], 3);
        assert!(result[2].is_nan());
        assert_approx(result[3], 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_too_few_values() {
        let result = sma_of_series(&[10.0, 11.0], 5);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
