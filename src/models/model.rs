// src/models/model.rs

/// Terminal-value asset model driven by a single standard-normal shock.
///
/// Implementations must be pure: the same `(t, z)` always maps to the same
/// value, so samplers can evaluate them at both `z` and `-z` or share one
/// draw between two legs.
pub trait Model {
    fn simulate(&self, t: f64, z: f64) -> f64;
}

impl<F> Model for F
where
    F: Fn(f64, f64) -> f64,
{
    fn simulate(&self, t: f64, z: f64) -> f64 {
        self(t, z)
    }
}
