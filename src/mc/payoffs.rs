//! Option Payoff Functions
//!
//! # Mathematical Definitions
//!
//! Payoffs here depend on the terminal asset value only:
//! - **Call**: max(S_T - K, 0)
//! - **Put**: max(K - S_T, 0)
//! - **Underlying**: S_T itself, the control leg whose discounted
//!   expectation is the spot price
//!
//! Every payoff carries the maturity at which it is evaluated, so samplers
//! know which horizon to ask the model for.

use crate::error::{validation::*, McResult};
use std::fmt;

/// Cash flow at a fixed maturity as a function of the terminal asset value.
pub trait Payoff {
    fn payoff(&self, st: f64) -> f64;
    fn maturity(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    Call,
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

/// Vanilla European option
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EuropeanOption {
    strike: f64,
    maturity: f64,
    option_type: OptionType,
}

impl EuropeanOption {
    pub fn new(strike: f64, maturity: f64, option_type: OptionType) -> McResult<Self> {
        validate_positive("strike", strike)?;
        validate_positive("maturity", maturity)?;
        Ok(EuropeanOption {
            strike,
            maturity,
            option_type,
        })
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }
}

impl Payoff for EuropeanOption {
    fn payoff(&self, st: f64) -> f64 {
        match self.option_type {
            OptionType::Call => (st - self.strike).max(0.0),
            OptionType::Put => (self.strike - st).max(0.0),
        }
    }

    fn maturity(&self) -> f64 {
        self.maturity
    }
}

/// Degenerate contract paying the underlying at maturity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Underlying {
    maturity: f64,
}

impl Underlying {
    pub fn new(maturity: f64) -> McResult<Self> {
        validate_positive("maturity", maturity)?;
        Ok(Underlying { maturity })
    }
}

impl Payoff for Underlying {
    fn payoff(&self, st: f64) -> f64 {
        st
    }

    fn maturity(&self) -> f64 {
        self.maturity
    }
}

/// Adapter turning any `Fn(f64) -> f64` into a [`Payoff`].
#[derive(Clone, Copy)]
pub struct FnPayoff<F> {
    f: F,
    maturity: f64,
}

impl<F: Fn(f64) -> f64> FnPayoff<F> {
    pub fn new(f: F, maturity: f64) -> Self {
        FnPayoff { f, maturity }
    }
}

impl<F: Fn(f64) -> f64> Payoff for FnPayoff<F> {
    fn payoff(&self, st: f64) -> f64 {
        (self.f)(st)
    }

    fn maturity(&self) -> f64 {
        self.maturity
    }
}
