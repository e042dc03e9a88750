//! Sample standard deviation helpers.

/// Sample standard deviation over values where `None` means "no relationship".
///
/// `None` entries are dropped; with fewer than two remaining values the
/// result is 0.0.
pub fn sigma(values: &[Option<f64>]) -> f64 {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    sample_std_dev(&present)
}

/// Sample standard deviation (n − 1 denominator), 0.0 below two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigma_skips_missing_relationships() {
        let values = [Some(2.0), None, Some(4.0), None];
        assert!((sigma(&values) - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sigma_degenerate_cases() {
        assert_eq!(sigma(&[]), 0.0);
        assert_eq!(sigma(&[None, None]), 0.0);
        assert_eq!(sigma(&[Some(5.0), None]), 0.0);
    }

    #[test]
    fn test_sample_std_dev_two_values() {
        // |a − b| / √2 for two samples
        assert!((sample_std_dev(&[1.0, 4.0]) - 3.0 / 2.0_f64.sqrt()).abs() < 1e-12);
    }
}
