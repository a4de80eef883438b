//! One-pass accumulators for Monte Carlo output streams
//!
//! Both accumulators hold O(1) state regardless of how many observations
//! they have seen and use Welford-style updates, so they remain accurate for
//! long runs where the naive `Σx² − n·x̄²` formula cancels catastrophically.

pub mod covariance;
pub mod online;

pub use covariance::OnlineCovariance;
pub use online::OnlineStatistics;
