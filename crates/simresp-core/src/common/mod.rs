pub mod config;
pub mod constants;

pub use config::{ReductionConfig, load_reduction_config};
