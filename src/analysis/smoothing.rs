/// Holt-Winters exponential smoothing over daily-mean series.
///
/// Additive trend, additive seasonality. The weekly cycle dominates urban
/// pollutant series (traffic), so the default seasonal period is 7 days.
/// Coefficients are fixed rather than optimized; the point of this model
/// here is a decomposition baseline, not a tuned forecaster.

use std::fmt;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum SmoothingError {
    /// Seasonal period must be at least 2.
    InvalidPeriod(usize),
    /// A smoothing coefficient was outside [0, 1].
    InvalidCoefficient(&'static str),
    /// Initialization needs at least two full seasons of data.
    InsufficientData { required: usize, actual: usize },
}

impl fmt::Display for SmoothingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmoothingError::InvalidPeriod(p) => {
                write!(f, "seasonal period must be >= 2, got {}", p)
            }
            SmoothingError::InvalidCoefficient(name) => {
                write!(f, "smoothing coefficient '{}' must be in [0, 1]", name)
            }
            SmoothingError::InsufficientData { required, actual } => {
                write!(
                    f,
                    "need at least {} observations (two full seasons), got {}",
                    required, actual
                )
            }
        }
    }
}

impl std::error::Error for SmoothingError {}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Additive Holt-Winters smoothing configuration.
#[derive(Debug, Clone, Copy)]
pub struct HoltWinters {
    /// Level smoothing coefficient.
    pub alpha: f64,
    /// Trend smoothing coefficient.
    pub beta: f64,
    /// Seasonal smoothing coefficient.
    pub gamma: f64,
    /// Seasonal period, in observations.
    pub period: usize,
}

impl HoltWinters {
    /// Weekly seasonality over daily means, the configuration the
    /// air-quality decomposition uses.
    pub fn weekly() -> Self {
        HoltWinters {
            alpha: 0.3,
            beta: 0.05,
            gamma: 0.2,
            period: 7,
        }
    }

    fn validate(&self, len: usize) -> Result<(), SmoothingError> {
        if self.period < 2 {
            return Err(SmoothingError::InvalidPeriod(self.period));
        }
        for (name, value) in [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SmoothingError::InvalidCoefficient(name));
            }
        }
        let required = 2 * self.period;
        if len < required {
            return Err(SmoothingError::InsufficientData {
                required,
                actual: len,
            });
        }
        Ok(())
    }

    /// Fits the model to a series.
    ///
    /// Initialization follows the standard scheme: the level starts at the
    /// first season's mean, the trend at the averaged season-over-season
    /// slope, and the seasonal components at the first season's deviations
    /// from its mean. `fitted[t]` is the one-step-ahead prediction made
    /// before observing `series[t]`.
    pub fn fit(&self, series: &[f64]) -> Result<SmoothingFit, SmoothingError> {
        self.validate(series.len())?;
        let p = self.period;

        let first_season_mean = series[..p].iter().sum::<f64>() / p as f64;
        let second_season_mean = series[p..2 * p].iter().sum::<f64>() / p as f64;

        let mut level = first_season_mean;
        let mut trend = (second_season_mean - first_season_mean) / p as f64;
        let mut seasonals: Vec<f64> = series[..p].iter().map(|x| x - first_season_mean).collect();

        let mut fitted = Vec::with_capacity(series.len());
        let mut sse = 0.0;

        for (t, &x) in series.iter().enumerate() {
            let seasonal = seasonals[t % p];
            let predicted = level + trend + seasonal;
            fitted.push(predicted);
            sse += (x - predicted) * (x - predicted);

            let last_level = level;
            level = self.alpha * (x - seasonal) + (1.0 - self.alpha) * (level + trend);
            trend = self.beta * (level - last_level) + (1.0 - self.beta) * trend;
            seasonals[t % p] = self.gamma * (x - level) + (1.0 - self.gamma) * seasonal;
        }

        Ok(SmoothingFit {
            fitted,
            level,
            trend,
            seasonals,
            sse,
            observations: series.len(),
        })
    }
}

/// The result of fitting: one-step-ahead fitted values plus the final
/// smoothing state, from which forecasts extend.
#[derive(Debug, Clone)]
pub struct SmoothingFit {
    pub fitted: Vec<f64>,
    pub level: f64,
    pub trend: f64,
    pub seasonals: Vec<f64>,
    /// Sum of squared one-step-ahead errors over the fit.
    pub sse: f64,
    observations: usize,
}

impl SmoothingFit {
    /// Forecasts `steps` observations past the end of the fitted series.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let p = self.seasonals.len();
        (1..=steps)
            .map(|h| {
                let seasonal = self.seasonals[(self.observations + h - 1) % p];
                self.level + h as f64 * self.trend + seasonal
            })
            .collect()
    }

    /// Root-mean-square one-step-ahead error of the fit.
    pub fn rmse(&self) -> f64 {
        (self.sse / self.fitted.len() as f64).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
