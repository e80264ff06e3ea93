pub(crate) mod audit;
pub(crate) mod maintenance;
pub(crate) mod risk;
