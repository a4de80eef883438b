// src/models/black_scholes.rs
//! Black-Scholes asset model (geometric Brownian motion)
//!
//! Under the risk-neutral measure:
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! ```
//! with exact terminal solution
//! ```text
//! S_T = S_0 * exp((r - σ²/2)T + σ√T * Z),   Z ~ N(0,1)
//! ```
//! so a single normal draw per path is enough for European payoffs.

use super::model::Model;
use crate::error::{validation::*, McResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholesModel {
    spot: f64,
    rate: f64,
    volatility: f64,
}

impl BlackScholesModel {
    pub fn new(spot: f64, rate: f64, volatility: f64) -> McResult<Self> {
        validate_positive("spot", spot)?;
        validate_finite("rate", rate)?;
        validate_positive("volatility", volatility)?;
        Ok(BlackScholesModel {
            spot,
            rate,
            volatility,
        })
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Risk-neutral expectation of S_T, `S_0 * e^{rT}`.
    pub fn forward(&self, t: f64) -> f64 {
        self.spot * (self.rate * t).exp()
    }
}

impl Model for BlackScholesModel {
    fn simulate(&self, t: f64, z: f64) -> f64 {
        let drift = (self.rate - 0.5 * self.volatility * self.volatility) * t;
        self.spot * (drift + self.volatility * t.sqrt() * z).exp()
    }
}
