//! Path Samplers
//!
//! A sampler turns one standard-normal draw into one Monte Carlo observation.
//! The engine only ever sees the [`PathSampler`] trait, so variance-reduction
//! techniques compose by wrapping samplers rather than by changing the loop:
//!
//! | Sampler | Observation for draw Z |
//! |---|---|
//! | [`McSampler`] | `f(S_T(Z))` |
//! | [`AntitheticSampler`] | `½ [f(S_T(Z)) + f(S_T(−Z))]` |
//! | [`ControlSampler`] | `X(Z) − β (Y(Z) − E[Y])` |
//!
//! All samplers are immutable and keep no history, so `sample` is a pure
//! function of its input.

use crate::mc::payoffs::Payoff;
use crate::models::model::Model;

/// One scalar Monte Carlo observation per standard-normal input.
pub trait PathSampler {
    fn sample(&self, z: f64) -> f64;
}

impl<S: PathSampler + ?Sized> PathSampler for &S {
    fn sample(&self, z: f64) -> f64 {
        (**self).sample(z)
    }
}

impl<S: PathSampler + ?Sized> PathSampler for Box<S> {
    fn sample(&self, z: f64) -> f64 {
        (**self).sample(z)
    }
}

/// Plain Monte Carlo: the payoff of the simulated terminal value.
pub struct McSampler<'a, M: ?Sized, P: ?Sized> {
    model: &'a M,
    option: &'a P,
}

impl<'a, M: Model + ?Sized, P: Payoff + ?Sized> McSampler<'a, M, P> {
    pub fn new(model: &'a M, option: &'a P) -> Self {
        McSampler { model, option }
    }
}

impl<M: Model + ?Sized, P: Payoff + ?Sized> PathSampler for McSampler<'_, M, P> {
    fn sample(&self, z: f64) -> f64 {
        let st = self.model.simulate(self.option.maturity(), z);
        self.option.payoff(st)
    }
}

/// Antithetic variates: averages the payoffs at `z` and `-z`.
///
/// One call consumes one draw but evaluates two negatively correlated
/// paths, so a run of `n / 2` draws is comparable to `n` plain draws.
pub struct AntitheticSampler<'a, M: ?Sized, P: ?Sized> {
    model: &'a M,
    option: &'a P,
}

impl<'a, M: Model + ?Sized, P: Payoff + ?Sized> AntitheticSampler<'a, M, P> {
    pub fn new(model: &'a M, option: &'a P) -> Self {
        AntitheticSampler { model, option }
    }
}

impl<M: Model + ?Sized, P: Payoff + ?Sized> PathSampler for AntitheticSampler<'_, M, P> {
    fn sample(&self, z: f64) -> f64 {
        let t = self.option.maturity();
        let st_up = self.model.simulate(t, z);
        let st_down = self.model.simulate(t, -z);
        0.5 * (self.option.payoff(st_up) + self.option.payoff(st_down))
    }
}

/// Control variate adjustment
///
/// Owns both legs; constructing it consumes the target and control
/// samplers. Both legs see the same `z` on every call, which is what makes
/// the control correlated with the target.
///
/// `control_mean` is the known expectation of the control leg in the same
/// (undiscounted) units the samplers produce.
pub struct ControlSampler<T, C> {
    target: T,
    control: C,
    control_mean: f64,
    beta: f64,
}

impl<T: PathSampler, C: PathSampler> ControlSampler<T, C> {
    pub fn new(target: T, control: C, control_mean: f64, beta: f64) -> Self {
        ControlSampler {
            target,
            control,
            control_mean,
            beta,
        }
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn control_mean(&self) -> f64 {
        self.control_mean
    }

    /// Give the legs back, dropping the adjustment.
    pub fn into_parts(self) -> (T, C) {
        (self.target, self.control)
    }
}

impl<T: PathSampler, C: PathSampler> PathSampler for ControlSampler<T, C> {
    fn sample(&self, z: f64) -> f64 {
        let x = self.target.sample(z);
        let y = self.control.sample(z);
        x - self.beta * (y - self.control_mean)
    }
}
