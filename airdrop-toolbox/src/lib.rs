pub mod distribution;
pub mod utils;
