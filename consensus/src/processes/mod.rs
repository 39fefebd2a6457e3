pub mod chain;
pub mod leader;
