pub mod black_scholes;
pub mod model;

pub use black_scholes::BlackScholesModel;
pub use model::Model;
