//! Grid and interpolation helpers.

/// `n` evenly spaced points on `[start, stop]` (both ends included).
///
/// `n == 1` yields `[start]`; `n == 0` yields an empty vector.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as f64 - 1.0);
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Linear interpolation of `(xs, ys)` at `x`.
///
/// `xs` must be sorted ascending. Outside the tabulated range the end values
/// are held constant. Returns `None` for empty or mismatched inputs and for a
/// non-finite `x`.
pub fn interp(x: f64, xs: &[f64], ys: &[f64]) -> Option<f64> {
    if !x.is_finite() || xs.is_empty() || xs.len() != ys.len() {
        return None;
    }
    let last = xs.len() - 1;
    if x <= xs[0] {
        return Some(ys[0]);
    }
    if x >= xs[last] {
        return Some(ys[last]);
    }

    // First index with xs[i] > x; x lies in [xs[i-1], xs[i]).
    let i = xs.partition_point(|&v| v <= x);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    let span = x1 - x0;
    if span <= 0.0 {
        return Some(y0);
    }
    Some(y0 + (y1 - y0) * (x - x0) / span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_endpoints() {
        let v = linspace(1.0, 30.0, 100);
        assert_eq!(v.len(), 100);
        assert_eq!(v[0], 1.0);
        assert_eq!(v[99], 30.0);
        assert!(v.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn interp_is_linear_between_knots_and_flat_outside() {
        let xs = [1.0, 2.0, 4.0];
        let ys = [10.0, 20.0, 0.0];
        assert!((interp(1.5, &xs, &ys).unwrap() - 15.0).abs() < 1e-12);
        assert!((interp(3.0, &xs, &ys).unwrap() - 10.0).abs() < 1e-12);
        assert_eq!(interp(2.0, &xs, &ys), Some(20.0));
        assert_eq!(interp(0.0, &xs, &ys), Some(10.0));
        assert_eq!(interp(9.0, &xs, &ys), Some(0.0));
        assert_eq!(interp(1.0, &[], &[]), None);
        assert_eq!(interp(f64::NAN, &xs, &ys), None);
        assert_eq!(interp(f64::INFINITY, &xs, &ys), None);
    }
}
