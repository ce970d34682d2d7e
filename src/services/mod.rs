pub mod energy;
pub mod estimator;
pub mod exporter;
pub mod nasa_power;
