pub mod analyzers;
pub mod batch;
pub mod capacitance;
pub mod crossover;
pub mod cycle;
pub mod points;
pub mod tafel;
pub mod traits;
