//! Dispersion statistics

use crate::error::{require_samples, Result};
use crate::round1;

/// Minimum samples for a standard deviation
pub const MIN_DISPERSION_SAMPLES: usize = 2;

/// Spread of a series, every figure rounded to one decimal
#[derive(Debug, Clone, PartialEq)]
pub struct Dispersion {
    /// Population standard deviation
    pub sigma: f64,
    pub two_sigma: f64,
    pub three_sigma: f64,
    /// Standard error of the mean, `sigma / sqrt(n)`
    pub sem: f64,
    pub sample_count: usize,
}

/// Population standard deviation and standard error of `values`
pub fn dispersion(values: &[f64]) -> Result<Dispersion> {
    require_samples(values.len(), MIN_DISPERSION_SAMPLES)?;

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let sigma = variance.sqrt();
    let sem = sigma / n.sqrt();

    Ok(Dispersion {
        sigma: round1(sigma),
        two_sigma: round1(sigma * 2.0),
        three_sigma: round1(sigma * 3.0),
        sem: round1(sem),
        sample_count: values.len(),
    })
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::error::TrendError;

    #[test]
    fn test_equal_values_have_zero_spread() {
        let d = dispersion(&[180.0, 180.0]).unwrap();
        assert_eq!(d.sigma, 0.0);
        assert_eq!(d.sem, 0.0);
    }

    #[test]
    fn test_population_std() {
        // mean 5, squared deviations sum to 32, n = 8 -> sigma 2
        let d = dispersion(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(d.sigma, 2.0);
        assert_eq!(d.two_sigma, 4.0);
        assert_eq!(d.three_sigma, 6.0);
        assert_eq!(d.sem, 0.7); // 2 / sqrt(8) = 0.707
    }

    #[test]
    fn test_requires_two_samples() {
        assert_eq!(
            dispersion(&[150.0]),
            Err(TrendError::InsufficientSamples {
                required: 2,
                actual: 1
            })
        );
        assert_eq!(dispersion(&[]), Err(TrendError::EmptySeries));
    }
}
