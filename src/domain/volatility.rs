//! Rolling-window volatility estimate and its display bands.
//!
//! RET[i] = W[i] / W[i+1] - 1   for i in 0..capacity-1 (W[0] newest)
//! VOL    = POP_STDDEV(RET) * scale
//!
//! This is a display measure only. The risk gate uses its own price
//! dispersion measure (see `risk`).

use super::error::MomtraderError;
use super::rolling_window::RollingWindow;
use super::stats::population_stddev;

pub const DEFAULT_VOLATILITY_SCALE: f64 = 500.0;
pub const DEFAULT_BAND_CENTER: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityBands {
    pub volatility: f64,
    pub upper: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityEstimator {
    pub scale: f64,
    pub band_center: f64,
}

impl Default for VolatilityEstimator {
    fn default() -> Self {
        Self {
            scale: DEFAULT_VOLATILITY_SCALE,
            band_center: DEFAULT_BAND_CENTER,
        }
    }
}

impl VolatilityEstimator {
    pub fn new(scale: f64, band_center: f64) -> Self {
        Self { scale, band_center }
    }

    /// Single-period returns, newest first. Requires a full window.
    pub fn returns(window: &RollingWindow<f64>) -> Result<Vec<f64>, MomtraderError> {
        if !window.is_ready() {
            return Err(MomtraderError::NotReady {
                have: window.len(),
                capacity: window.capacity(),
            });
        }
        Ok((0..window.capacity() - 1)
            .map(|i| window[i] / window[i + 1] - 1.0)
            .collect())
    }

    pub fn estimate(&self, window: &RollingWindow<f64>) -> Result<f64, MomtraderError> {
        let returns = Self::returns(window)?;
        Ok(population_stddev(&returns) * self.scale)
    }

    pub fn bands(&self, window: &RollingWindow<f64>) -> Result<VolatilityBands, MomtraderError> {
        let volatility = self.estimate(window)?;
        Ok(VolatilityBands {
            volatility,
            upper: self.band_center + volatility / 2.0,
            lower: self.band_center - volatility / 2.0,
        })
    }
}
