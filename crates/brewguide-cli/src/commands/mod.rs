pub mod brew;
pub mod compile;
pub mod config;
pub mod simulate;
