// small numeric helpers shared by the sampler and the cross checks

/// `num_values` evenly spaced points; the first is exactly `start` and the last exactly `end`.
pub fn linspace(start: f64, end: f64, num_values: usize) -> Vec<f64> {
    match num_values {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let mut values = Vec::with_capacity(num_values);
            let step = (end - start) / (num_values as f64 - 1.0);
            for i in 0..num_values - 1 {
                values.push(start + (i as f64 * step));
            }
            values.push(end);
            values
        }
    }
}
/*
    let x_values = vec![0.0, 1.0, 2.0, 3.0, 4.0];
    let h = 0.001;
    let derivatives = numerical_derivative(f, &x_values, h);
*/
/// central differences (f(x+h) - f(x-h)) / 2h at every point
pub fn numerical_derivative<F>(f: F, x_values: &[f64], h: f64) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    x_values
        .iter()
        .map(|&x| (f(x + h) - f(x - h)) / (2.0 * h))
        .collect()
}

/// largest |a - b| over pairs where both values are finite; None if there is no such pair
pub fn max_abs_deviation(a: &[f64], b: &[f64]) -> Option<f64> {
    a.iter()
        .zip(b.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (x - y).abs())
        .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.max(d))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linspace_endpoints() {
        let grid = linspace(-10.0, 10.0, 1000);
        assert_eq!(grid.len(), 1000);
        assert_eq!(grid[0], -10.0);
        assert_eq!(grid[999], 10.0);
        assert_eq!(linspace(3.0, 4.0, 1), vec![3.0]);
        assert!(linspace(3.0, 4.0, 0).is_empty());
    }

    #[test]
    fn test_numerical_derivative_of_square() {
        let derivatives = numerical_derivative(|x| x * x, &[0.0, 1.0, 2.0], 1e-4);
        assert_relative_eq!(derivatives[0], 0.0, epsilon = 1e-8);
        assert_relative_eq!(derivatives[1], 2.0, epsilon = 1e-6);
        assert_relative_eq!(derivatives[2], 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_max_abs_deviation_skips_nan() {
        let a = [1.0, f64::NAN, 3.0];
        let b = [1.5, 2.0, 2.0];
        assert_eq!(max_abs_deviation(&a, &b), Some(1.0));
        assert_eq!(max_abs_deviation(&[f64::NAN], &[1.0]), None);
    }
}
