//! ARIMA(p,1,0) forecasting
//!
//! The series is differenced once and an AR(p) model with a constant is fit
//! to the differences:
//!
//! - **Estimation**: Yule-Walker equations solved with the Levinson-Durbin
//!   recursion, which also yields the innovation variance
//! - **Forecast**: differences are extended recursively and integrated from
//!   the last observed value
//! - **Intervals**: normal approximation using the ψ-weights of the
//!   integrated AR polynomial, `Var(h) = σ² Σ_{k<h} ψ_k²`
//!
//! Samples are treated as evenly spaced steps; calendar gaps are ignored.

use body_model::Series;
use chrono::{Days, NaiveDate};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{require_samples, Result, TrendError};
use crate::round1;

/// AR order of the reported forecast
pub const AR_ORDER: usize = 4;

/// Samples needed for an AR(4) fit on the differenced series
pub const MIN_FORECAST_SAMPLES: usize = AR_ORDER + 1;

/// Forecast horizons reported by the analyzer, in steps (days)
pub const FORECAST_HORIZONS: [usize; 2] = [7, 30];

/// Confidence level of the reported bounds
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Autocovariance below which the differenced series counts as constant
const MIN_VARIANCE: f64 = 1e-10;

/// Fitted ARIMA(p,1,0) model
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// AR coefficients φ_1..φ_p on the differenced series
    ar_coeffs: Vec<f64>,
    /// Mean of the differenced series
    drift: f64,
    /// Innovation variance σ²
    sigma2: f64,
    /// Differenced series used for the fit
    differences: Vec<f64>,
    /// Last observed level
    last_value: f64,
}

/// One forecast step with its interval
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Forecast for one horizon
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub horizon: usize,
    /// Point forecast at the final step, rounded to one decimal
    pub point: f64,
    /// Lower bound at the final step, rounded to one decimal
    pub lower: f64,
    /// Upper bound at the final step, rounded to one decimal
    pub upper: f64,
    pub confidence_level: f64,
    /// Every step, unrounded, dated from the day after the last sample
    pub path: Vec<ForecastPoint>,
}

impl Forecast {
    pub fn final_date(&self) -> Option<NaiveDate> {
        self.path.last().map(|p| p.date)
    }
}

impl ArimaModel {
    /// Fit ARIMA(`order`,1,0) to `values`
    ///
    /// Needs `order + 1` values so the differenced series has `order` points.
    /// Fails with `ModelFit` when the differences are constant or the
    /// estimates are not stationary.
    pub fn fit(values: &[f64], order: usize) -> Result<Self> {
        require_samples(values.len(), order + 1)?;

        if values.iter().any(|v| !v.is_finite()) {
            return Err(TrendError::model_fit("series contains non-finite values"));
        }

        let differences: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
        let n = differences.len();
        let drift = differences.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = differences.iter().map(|d| d - drift).collect();

        // Biased autocovariances keep the Toeplitz system positive definite
        let autocov: Vec<f64> = (0..=order)
            .map(|k| {
                centered[k..]
                    .iter()
                    .zip(&centered)
                    .map(|(a, b)| a * b)
                    .sum::<f64>()
                    / n as f64
            })
            .collect();

        if autocov[0] < MIN_VARIANCE {
            return Err(TrendError::model_fit(
                "differenced series is constant, nothing to estimate",
            ));
        }

        let (ar_coeffs, sigma2) = levinson_durbin(&autocov, order)?;

        if !sigma2.is_finite() || sigma2 <= 0.0 {
            return Err(TrendError::model_fit(format!(
                "degenerate innovation variance {}",
                sigma2
            )));
        }

        let last_value = values[values.len() - 1];

        tracing::debug!(
            order,
            drift,
            sigma2,
            coeffs = ?ar_coeffs,
            "arima fit"
        );

        Ok(Self {
            ar_coeffs,
            drift,
            sigma2,
            differences,
            last_value,
        })
    }

    pub fn order(&self) -> usize {
        self.ar_coeffs.len()
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coeffs
    }

    pub fn drift(&self) -> f64 {
        self.drift
    }

    pub fn innovation_variance(&self) -> f64 {
        self.sigma2
    }

    /// Point forecasts on the original scale for `steps` steps ahead
    pub fn predict(&self, steps: usize) -> Vec<f64> {
        let p = self.ar_coeffs.len();
        let mut extended = self.differences.clone();
        let mut level = self.last_value;
        let mut levels = Vec::with_capacity(steps);

        for _ in 0..steps {
            let len = extended.len();
            let mut next = self.drift;
            for j in 0..p {
                next += self.ar_coeffs[j] * (extended[len - j - 1] - self.drift);
            }
            extended.push(next);
            level += next;
            levels.push(level);
        }

        levels
    }

    /// ψ-weights of the integrated model, `ψ_0 = 1`
    ///
    /// `(1 - φ(B))(1 - B) = 1 - Σ a_j B^j` and `ψ_k = Σ a_j ψ_{k-j}`.
    pub fn psi_weights(&self, steps: usize) -> Vec<f64> {
        let p = self.ar_coeffs.len();
        let mut a = vec![0.0; p + 1];
        for (j, slot) in a.iter_mut().enumerate() {
            let phi_j = if j < p { self.ar_coeffs[j] } else { 0.0 };
            let phi_prev = if j == 0 { -1.0 } else { self.ar_coeffs[j - 1] };
            // a_1 = φ_1 + 1, a_j = φ_j - φ_{j-1}, a_{p+1} = -φ_p
            *slot = phi_j - phi_prev;
        }

        let mut psi = Vec::with_capacity(steps);
        for k in 0..steps {
            if k == 0 {
                psi.push(1.0);
                continue;
            }
            let value = (1..=k.min(p + 1)).map(|j| a[j - 1] * psi[k - j]).sum();
            psi.push(value);
        }
        psi
    }

    /// Standard error of the forecast at each step
    pub fn standard_errors(&self, steps: usize) -> Vec<f64> {
        let mut acc = 0.0;
        self.psi_weights(steps)
            .into_iter()
            .map(|psi| {
                acc += psi * psi;
                (self.sigma2 * acc).sqrt()
            })
            .collect()
    }

    /// Forecast `horizon` steps with `confidence_level` bounds
    ///
    /// Steps are dated one calendar day apart starting the day after
    /// `last_date`.
    pub fn forecast(
        &self,
        horizon: usize,
        last_date: NaiveDate,
        confidence_level: f64,
    ) -> Result<Forecast> {
        if horizon == 0 {
            return Err(TrendError::model_fit("forecast horizon must be positive"));
        }

        let z = z_score(confidence_level)?;
        let points = self.predict(horizon);
        let errors = self.standard_errors(horizon);

        let path: Vec<ForecastPoint> = points
            .iter()
            .zip(&errors)
            .enumerate()
            .map(|(i, (&value, &se))| ForecastPoint {
                date: last_date
                    .checked_add_days(Days::new(i as u64 + 1))
                    .unwrap_or(NaiveDate::MAX),
                value,
                lower: value - z * se,
                upper: value + z * se,
            })
            .collect();

        let last = path
            .last()
            .ok_or_else(|| TrendError::model_fit("empty forecast path"))?;

        if !(last.value.is_finite() && last.lower.is_finite() && last.upper.is_finite()) {
            return Err(TrendError::model_fit("forecast diverged"));
        }

        Ok(Forecast {
            horizon,
            point: round1(last.value),
            lower: round1(last.lower),
            upper: round1(last.upper),
            confidence_level,
            path,
        })
    }
}

/// Fit ARIMA(4,1,0) to `series` and forecast each horizon
pub fn forecast_series(
    series: &Series,
    horizons: &[usize],
    confidence_level: f64,
) -> Result<Vec<Forecast>> {
    require_samples(series.len(), MIN_FORECAST_SAMPLES)?;
    let last_date = series.last().map(|s| s.date).ok_or(TrendError::EmptySeries)?;

    let model = ArimaModel::fit(&series.values(), AR_ORDER)?;
    horizons
        .iter()
        .map(|&h| model.forecast(h, last_date, confidence_level))
        .collect()
}

/// Solve the Yule-Walker equations for AR(`order`)
///
/// Returns the coefficients and the innovation variance.
fn levinson_durbin(autocov: &[f64], order: usize) -> Result<(Vec<f64>, f64)> {
    let mut coeffs = vec![0.0; order];
    let mut variance = autocov[0];

    for k in 0..order {
        let mut acc = autocov[k + 1];
        for j in 0..k {
            acc -= coeffs[j] * autocov[k - j];
        }

        let reflection = acc / variance;
        if !reflection.is_finite() || reflection.abs() >= 1.0 {
            return Err(TrendError::model_fit(format!(
                "non-stationary estimate at lag {} (reflection coefficient {:.4})",
                k + 1,
                reflection
            )));
        }

        let previous = coeffs.clone();
        coeffs[k] = reflection;
        for j in 0..k {
            coeffs[j] = previous[j] - reflection * previous[k - 1 - j];
        }

        variance *= 1.0 - reflection * reflection;
    }

    Ok((coeffs, variance))
}

/// Two-sided standard normal quantile for a confidence level
fn z_score(confidence_level: f64) -> Result<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(TrendError::model_fit(format!(
            "confidence level must be in (0, 1), got {}",
            confidence_level
        )));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| TrendError::model_fit(e.to_string()))?;
    Ok(normal.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0))
}
