//! Small numeric helpers shared by the analyzers.

pub fn to_f64(counts: &[u32]) -> Vec<f64> {
    counts.iter().map(|&c| f64::from(c)).collect()
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation, `None` for an empty slice
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance = values
        .iter()
        .map(|&x| {
            let diff = x - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    Some(variance.sqrt())
}

/// Least-squares slope of `ys` against `xs`.
///
/// `None` with fewer than two points or when every `x` is identical.
pub fn ols_slope(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let x_mean = mean(xs)?;
    let y_mean = mean(ys)?;

    let (covariance, x_variance) = xs.iter().zip(ys).fold((0.0, 0.0), |(cov, var), (&x, &y)| {
        let dx = x - x_mean;
        (cov + dx * (y - y_mean), var + dx * dx)
    });

    if x_variance <= f64::EPSILON {
        return None;
    }
    Some(covariance / x_variance)
}

/// Format seconds as `MM:SS`; minutes are not wrapped at the hour
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

pub fn format_range(start_seconds: f64, end_seconds: f64) -> String {
    format!("{} - {}", format_clock(start_seconds), format_clock(end_seconds))
}
