// src/analytics/bs_analytic.rs
//! Analytical Black-Scholes prices for European options
//!
//! # Mathematical Foundation
//!
//! Under the Black-Scholes model the risk-neutral price is
//! ```text
//! V(S,t) = e^(-r(T-t)) * E^Q[payoff(S_T) | S_t = S]
//! ```
//! which for vanilla European payoffs has a closed form in terms of the
//! cumulative normal distribution Φ(x). These prices are the reference that
//! Monte Carlo estimates are validated against; nothing in the simulation
//! path depends on them.

use crate::mc::payoffs::OptionType;
use crate::math_utils::norm_cdf;

fn d1_d2(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> (f64, f64) {
    let sqrt_t = t.sqrt();
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * sqrt_t);
    (d1, d1 - sigma * sqrt_t)
}

/// Black-Scholes European call option price
///
/// # Formula
/// ```text
/// C(S,K,r,σ,T) = S*Φ(d₁) - K*e^(-rT)*Φ(d₂)
/// d₁ = [ln(S/K) + (r + σ²/2)T] / (σ√T)
/// d₂ = d₁ - σ√T
/// ```
pub fn bs_call_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, d2) = d1_d2(s, k, r, sigma, t);
    s * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2)
}

/// Black-Scholes European put option price
///
/// # Formula
/// ```text
/// P(S,K,r,σ,T) = K*e^(-rT)*Φ(-d₂) - S*Φ(-d₁)
/// ```
pub fn bs_put_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, d2) = d1_d2(s, k, r, sigma, t);
    k * (-r * t).exp() * norm_cdf(-d2) - s * norm_cdf(-d1)
}

/// Closed-form price dispatched on the option kind.
pub fn black_scholes_price(
    spot: f64,
    strike: f64,
    rate: f64,
    volatility: f64,
    maturity: f64,
    option_type: OptionType,
) -> f64 {
    match option_type {
        OptionType::Call => bs_call_price(spot, strike, rate, volatility, maturity),
        OptionType::Put => bs_put_price(spot, strike, rate, volatility, maturity),
    }
}
