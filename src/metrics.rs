/// Compute split metrics (mean, median, 25th percentile, 75th percentile) in milliseconds
pub fn compute_split_metrics(splits: &[u64]) -> Option<(f64, f64, f64, f64)> {
    if splits.len() < 2 {
        return None;
    }
    let mut sorted = splits.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    let mean = splits.iter().sum::<u64>() as f64 / n as f64;
    let median = sorted[n / 2] as f64;
    let p25 = sorted[n / 4] as f64;
    let p75 = sorted[3 * n / 4] as f64;
    Some((mean, median, p25, p75))
}

/// Mean split in milliseconds, `None` when there is nothing to average.
pub fn mean_split(splits: &[u64]) -> Option<f64> {
    if splits.is_empty() {
        return None;
    }
    Some(splits.iter().sum::<u64>() as f64 / splits.len() as f64)
}

/// Spread between the slowest and fastest split.
#[cfg(feature = "tui")]
pub fn split_spread(splits: &[u64]) -> Option<u64> {
    let min = splits.iter().min()?;
    let max = splits.iter().max()?;
    Some(max - min)
}
