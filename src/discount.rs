// src/discount.rs
//! Discount curves
//!
//! The estimation core works in undiscounted payoff units; callers convert
//! means and standard errors to present value by multiplying with `D(T)`.

use crate::error::{validation::*, McResult};

/// Discount factor as a function of time to maturity in years.
pub trait Discount {
    fn factor(&self, t: f64) -> f64;
}

impl<F> Discount for F
where
    F: Fn(f64) -> f64,
{
    fn factor(&self, t: f64) -> f64 {
        self(t)
    }
}

/// Continuously compounded flat curve, `D(T) = e^{-rT}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatDiscount {
    rate: f64,
}

impl FlatDiscount {
    pub fn new(rate: f64) -> McResult<Self> {
        validate_finite("rate", rate)?;
        Ok(FlatDiscount { rate })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Discount for FlatDiscount {
    fn factor(&self, t: f64) -> f64 {
        (-self.rate * t).exp()
    }
}
