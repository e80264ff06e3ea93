pub mod audit;
pub mod risk;
